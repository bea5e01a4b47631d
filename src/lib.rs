pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
mod test_utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, MemoryStorage, RestBackend};
pub use config::{AppConfig, ImportSettings};
pub use core::{engine::ImportEngine, import::CsvImportPipeline};
pub use utils::error::{CizError, Result};
