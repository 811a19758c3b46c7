//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories (Postgres)
//! - Redis cache (OAuth state, rate limiting)
//! - Google OAuth client
//! - OpenAI-compatible AI client

pub mod ai_client;
pub mod cache;
pub mod db;
pub mod google;
pub mod health;
pub mod repositories;
pub mod unit_of_work;

pub use ai_client::{AiClient, OpenAiClient};
pub use cache::{Cache, RateLimiter, StateStore};
pub use db::{Database, Migrator};
pub use google::{GoogleOAuth, GoogleProfile, IdentityProvider};
pub use health::{HealthCheck, Probes};
pub use repositories::{
    CompanyRepository, CompanyStore, CompanyUserRepository, CompanyUserStore, UseCaseRepository,
    UseCaseStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};
