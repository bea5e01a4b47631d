// Adapter 層: domain port 的實作 (檔案儲存、後端 HTTP)

pub mod rest_backend;
pub mod storage;

pub use rest_backend::{BackendSettings, RestBackend};
pub use storage::{LocalStorage, MemoryStorage};
