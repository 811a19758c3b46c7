//! Schema service - Custom JSON schemas attached to a use case.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::prompts;
use crate::domain::{CurrentUser, CustomSchema, Feature, SchemaOrigin, UseCase};
use crate::errors::{AppError, AppResult};
use crate::infra::{AiClient, UnitOfWork};

/// Schema service trait for dependency injection.
#[async_trait]
pub trait SchemaService: Send + Sync {
    async fn list(&self, actor: &CurrentUser, use_case_id: Uuid) -> AppResult<Vec<CustomSchema>>;

    /// Attach a hand-written schema
    async fn add(
        &self,
        actor: &CurrentUser,
        use_case_id: Uuid,
        name: String,
        description: Option<String>,
        schema: Value,
    ) -> AppResult<CustomSchema>;

    /// Ask the AI provider for a schema and attach it
    async fn generate(
        &self,
        actor: &CurrentUser,
        use_case_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<CustomSchema>;

    async fn remove(&self, actor: &CurrentUser, use_case_id: Uuid, name: &str) -> AppResult<()>;
}

/// Concrete implementation of SchemaService using Unit of Work.
pub struct SchemaManager<U: UnitOfWork> {
    uow: Arc<U>,
    ai: Arc<dyn AiClient>,
}

impl<U: UnitOfWork> SchemaManager<U> {
    pub fn new(uow: Arc<U>, ai: Arc<dyn AiClient>) -> Self {
        Self { uow, ai }
    }

    async fn load(&self, actor: &CurrentUser, id: Uuid) -> AppResult<UseCase> {
        self.uow
            .use_cases()
            .find_by_id(actor.company_id, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn attach(&self, mut use_case: UseCase, schema: CustomSchema) -> AppResult<CustomSchema> {
        let before = use_case.status;
        use_case.add_schema(schema.clone())?;
        let saved = self.uow.use_cases().save(use_case).await?;
        if saved.status != before {
            tracing::info!(use_case_id = %saved.id, from = %before, to = %saved.status, "Use case status changed");
        }
        Ok(schema)
    }
}

fn clean_name(name: String) -> AppResult<String> {
    let name = name.trim().to_string();
    if name.is_empty() || name.contains('/') {
        return Err(AppError::validation("Schema name must be non-empty and cannot contain '/'"));
    }
    Ok(name)
}

#[async_trait]
impl<U: UnitOfWork> SchemaService for SchemaManager<U> {
    async fn list(&self, actor: &CurrentUser, use_case_id: Uuid) -> AppResult<Vec<CustomSchema>> {
        Ok(self.load(actor, use_case_id).await?.custom_schemas)
    }

    async fn add(
        &self,
        actor: &CurrentUser,
        use_case_id: Uuid,
        name: String,
        description: Option<String>,
        schema: Value,
    ) -> AppResult<CustomSchema> {
        let name = clean_name(name)?;
        if !schema.is_object() {
            return Err(AppError::validation("Schema must be a JSON object"));
        }
        let use_case = self.load(actor, use_case_id).await?;
        self.attach(use_case, CustomSchema::new(name, description, schema, SchemaOrigin::Manual))
            .await
    }

    async fn generate(
        &self,
        actor: &CurrentUser,
        use_case_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<CustomSchema> {
        let company = self
            .uow
            .companies()
            .find_by_id(actor.company_id)
            .await?
            .ok_or(AppError::NotFound)?;
        company.require_feature(Feature::SchemaGeneration)?;

        let name = clean_name(name)?;
        let use_case = self.load(actor, use_case_id).await?;
        if use_case.custom_schemas.iter().any(|s| s.name == name) {
            return Err(AppError::conflict(format!("Schema '{}'", name)));
        }

        let prompt = prompts::schema(&use_case, &name, description.as_deref());
        let schema = self.ai.complete(prompts::SCHEMA_SYSTEM, &prompt).await?;
        tracing::info!(use_case_id = %use_case.id, schema = %name, "Schema generated");

        self.attach(use_case, CustomSchema::new(name, description, schema, SchemaOrigin::Ai))
            .await
    }

    async fn remove(&self, actor: &CurrentUser, use_case_id: Uuid, name: &str) -> AppResult<()> {
        let mut use_case = self.load(actor, use_case_id).await?;
        use_case.remove_schema(name)?;
        self.uow.use_cases().save(use_case).await?;
        Ok(())
    }
}
