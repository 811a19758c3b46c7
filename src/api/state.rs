//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Database, HealthCheck, Probes, RateLimiter};
use crate::services::{
    AuthService, CompanyService, DataSourceService, SchemaService, ServiceContainer, Services,
    UseCaseService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub company_service: Arc<dyn CompanyService>,
    pub use_case_service: Arc<dyn UseCaseService>,
    pub schema_service: Arc<dyn SchemaService>,
    pub data_source_service: Arc<dyn DataSourceService>,
    /// Request counters for the rate limit middleware
    pub limiter: Arc<dyn RateLimiter>,
    /// Backing store probes for `/health`
    pub health: Arc<dyn HealthCheck>,
    /// Origin allowed by CORS
    pub frontend_url: String,
    /// Front-end page receiving the token (or error) after the OAuth callback
    pub login_redirect_url: String,
}

impl AppState {
    /// Create application state from live connections and config.
    pub fn from_config(database: Arc<Database>, cache: Arc<Cache>, config: Config) -> AppResult<Self> {
        let services = Services::from_connection(database.get_connection(), cache.clone(), config.clone())?;
        let health = Arc::new(Probes::new(database, cache.clone()));

        Ok(Self::new(&services, cache, health, &config))
    }

    /// Create application state from any service container.
    ///
    /// Lets tests swap the stores and the rate limiter for in-memory fakes.
    pub fn new(
        services: &dyn ServiceContainer,
        limiter: Arc<dyn RateLimiter>,
        health: Arc<dyn HealthCheck>,
        config: &Config,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            company_service: services.companies(),
            use_case_service: services.use_cases(),
            schema_service: services.schemas(),
            data_source_service: services.data_sources(),
            limiter,
            health,
            frontend_url: config.frontend_url.clone(),
            login_redirect_url: config.login_redirect_url(),
        }
    }
}
