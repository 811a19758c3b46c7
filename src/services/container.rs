//! Service Container - Centralized service access.
//!
//! Wires the Unit of Work and outbound clients into every service and
//! hands them out as trait objects.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, CompanyManager, CompanyService, DataSourceManager, DataSourceService,
    SchemaManager, SchemaService, UseCaseManager, UseCaseService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{
    AiClient, Cache, GoogleOAuth, IdentityProvider, OpenAiClient, Persistence, StateStore, UnitOfWork,
};

#[cfg(test)]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(test, automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn companies(&self) -> Arc<dyn CompanyService>;

    fn use_cases(&self) -> Arc<dyn UseCaseService>;

    fn schemas(&self) -> Arc<dyn SchemaService>;

    fn data_sources(&self) -> Arc<dyn DataSourceService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    company_service: Arc<dyn CompanyService>,
    use_case_service: Arc<dyn UseCaseService>,
    schema_service: Arc<dyn SchemaService>,
    data_source_service: Arc<dyn DataSourceService>,
}

impl Services {
    /// Build every service over one Unit of Work and a set of outbound clients
    pub fn new<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        states: Arc<dyn StateStore>,
        identity: Arc<dyn IdentityProvider>,
        ai: Arc<dyn AiClient>,
        config: Config,
    ) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), states, identity, config)),
            company_service: Arc::new(CompanyManager::new(uow.clone())),
            use_case_service: Arc::new(UseCaseManager::new(uow.clone(), ai.clone())),
            schema_service: Arc::new(SchemaManager::new(uow.clone(), ai)),
            data_source_service: Arc::new(DataSourceManager::new(uow)),
        }
    }

    /// Create service container from database connection, cache and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        cache: Arc<Cache>,
        config: Config,
    ) -> AppResult<Self> {
        let uow = Arc::new(Persistence::new(db));
        let identity = Arc::new(GoogleOAuth::new(config.google.clone())?);
        let ai = Arc::new(OpenAiClient::new(config.ai.clone())?);

        Ok(Self::new(uow, cache, identity, ai, config))
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn companies(&self) -> Arc<dyn CompanyService> {
        self.company_service.clone()
    }

    fn use_cases(&self) -> Arc<dyn UseCaseService> {
        self.use_case_service.clone()
    }

    fn schemas(&self) -> Arc<dyn SchemaService> {
        self.schema_service.clone()
    }

    fn data_sources(&self) -> Arc<dyn DataSourceService> {
        self.data_source_service.clone()
    }
}
