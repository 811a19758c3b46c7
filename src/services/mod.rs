//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion; repositories are reached through the Unit of Work.

mod auth_service;
mod company_service;
pub mod container;
mod data_source_service;
pub mod prompts;
mod schema_service;
mod use_case_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, LoginResult, SessionResponse, TokenResponse};
pub use company_service::{CompanyManager, CompanyService, NewMember};
pub use data_source_service::{DataSourceManager, DataSourceService, ValidationReport};
pub use schema_service::{SchemaManager, SchemaService};
pub use use_case_service::{DomainChoice, UseCaseManager, UseCaseService};

#[cfg(test)]
pub use container::MockServiceContainer;
