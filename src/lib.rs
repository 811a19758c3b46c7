//! BIAN-CU - Backend for banking use cases mapped onto BIAN
//!
//! Analysts author use cases, enrich them with AI analysis, and tag them
//! with BIAN service domains and APIs, custom JSON schemas and data sources.
//! Each company sees only its own use cases.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities, status transitions, BIAN catalog
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (Postgres, Redis, Google OAuth, AI provider)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Company, CompanyUser, CurrentUser, UseCase, UseCaseStatus, UserRole};
pub use errors::{AppError, AppResult};
