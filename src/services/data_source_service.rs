//! Data source service - External data providers attached to a use case.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{CurrentUser, DataSource, DataSourceType, Feature, UseCase};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Result of checking a data source's connection settings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationReport {
    pub name: String,
    pub valid: bool,
    pub problems: Vec<String>,
}

/// Data source service trait for dependency injection.
#[async_trait]
pub trait DataSourceService: Send + Sync {
    async fn list(&self, actor: &CurrentUser, use_case_id: Uuid) -> AppResult<Vec<DataSource>>;

    async fn add(
        &self,
        actor: &CurrentUser,
        use_case_id: Uuid,
        name: String,
        source_type: DataSourceType,
        config: Value,
    ) -> AppResult<DataSource>;

    /// Check the connection settings and record the outcome
    async fn validate(&self, actor: &CurrentUser, use_case_id: Uuid, name: &str) -> AppResult<ValidationReport>;

    async fn remove(&self, actor: &CurrentUser, use_case_id: Uuid, name: &str) -> AppResult<()>;
}

/// Concrete implementation of DataSourceService using Unit of Work.
pub struct DataSourceManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DataSourceManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn load(&self, actor: &CurrentUser, id: Uuid) -> AppResult<UseCase> {
        self.uow
            .use_cases()
            .find_by_id(actor.company_id, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn require_feature(&self, actor: &CurrentUser) -> AppResult<()> {
        self.uow
            .companies()
            .find_by_id(actor.company_id)
            .await?
            .ok_or(AppError::NotFound)?
            .require_feature(Feature::DataSources)
    }
}

#[async_trait]
impl<U: UnitOfWork> DataSourceService for DataSourceManager<U> {
    async fn list(&self, actor: &CurrentUser, use_case_id: Uuid) -> AppResult<Vec<DataSource>> {
        Ok(self.load(actor, use_case_id).await?.data_sources)
    }

    async fn add(
        &self,
        actor: &CurrentUser,
        use_case_id: Uuid,
        name: String,
        source_type: DataSourceType,
        config: Value,
    ) -> AppResult<DataSource> {
        self.require_feature(actor).await?;

        let name = name.trim().to_string();
        if name.is_empty() || name.contains('/') {
            return Err(AppError::validation("Data source name must be non-empty and cannot contain '/'"));
        }
        if !config.is_object() {
            return Err(AppError::validation("Data source config must be a JSON object"));
        }

        let mut use_case = self.load(actor, use_case_id).await?;
        let before = use_case.status;
        let source = DataSource::new(name, source_type, config);
        use_case.add_data_source(source.clone())?;

        let saved = self.uow.use_cases().save(use_case).await?;
        if saved.status != before {
            tracing::info!(use_case_id = %saved.id, from = %before, to = %saved.status, "Use case status changed");
        }
        Ok(source)
    }

    async fn validate(&self, actor: &CurrentUser, use_case_id: Uuid, name: &str) -> AppResult<ValidationReport> {
        let mut use_case = self.load(actor, use_case_id).await?;
        let source = use_case.data_source_mut(name)?;
        let problems = source.validate_connection();
        source.is_validated = problems.is_empty();

        let report = ValidationReport {
            name: source.name.clone(),
            valid: source.is_validated,
            problems,
        };
        use_case.touch();
        self.uow.use_cases().save(use_case).await?;
        Ok(report)
    }

    async fn remove(&self, actor: &CurrentUser, use_case_id: Uuid, name: &str) -> AppResult<()> {
        let mut use_case = self.load(actor, use_case_id).await?;
        use_case.remove_data_source(name)?;
        self.uow.use_cases().save(use_case).await?;
        Ok(())
    }
}
