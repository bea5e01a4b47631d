pub mod engine;
pub mod import;

pub use crate::domain::model::{ImportSummary, NewEmployee, RawEmployee};
pub use crate::domain::ports::{ConfigProvider, EmployeeStore, Pipeline, Storage};
pub use crate::utils::error::Result;
