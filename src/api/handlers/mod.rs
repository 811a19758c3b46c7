//! HTTP request handlers.

pub mod auth_handler;
pub mod bian_handler;
pub mod company_handler;
pub mod data_source_handler;
pub mod schema_handler;
pub mod use_case_handler;

pub use auth_handler::{auth_routes, session_routes};
pub use bian_handler::bian_routes;
pub use company_handler::company_routes;
pub use data_source_handler::data_source_routes;
pub use schema_handler::schema_routes;
pub use use_case_handler::use_case_routes;
