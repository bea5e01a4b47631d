pub mod auth;
pub mod ciz;
pub mod employees;
pub mod events;
