pub mod auth_service;
pub mod ciz_service;
pub mod employee_service;
pub mod event_service;

pub use auth_service::{require_admin, AuthService};
pub use ciz_service::CizService;
pub use employee_service::EmployeeService;
pub use event_service::EventService;
