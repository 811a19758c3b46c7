//! Use case service - Authoring, AI analysis and BIAN selection.
//!
//! All operations are scoped to the caller's company.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::prompts;
use crate::domain::{
    bian, Company, CurrentUser, Feature, NewUseCase, Recommendations, SelectedApi, SelectedDomain,
    UpdateUseCase, UseCase, UseCaseAction, UseCaseFlow, UseCaseStatus,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{AiClient, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

/// A domain picked by the analyst, with the confidence shown at the time
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DomainChoice {
    #[schema(example = "payment-order")]
    pub domain_id: String,
    pub confidence: Option<f64>,
}

/// Use case service trait for dependency injection.
#[async_trait]
pub trait UseCaseService: Send + Sync {
    async fn list(
        &self,
        actor: &CurrentUser,
        status: Option<UseCaseStatus>,
        params: &PaginationParams,
    ) -> AppResult<Paginated<UseCase>>;

    async fn get(&self, actor: &CurrentUser, id: Uuid) -> AppResult<UseCase>;

    async fn create(&self, actor: &CurrentUser, data: NewUseCase) -> AppResult<UseCase>;

    async fn update(&self, actor: &CurrentUser, id: Uuid, changes: UpdateUseCase) -> AppResult<UseCase>;

    /// Only the creator may delete a use case
    async fn delete(&self, actor: &CurrentUser, id: Uuid) -> AppResult<()>;

    /// Run AI analysis; on failure the previous status is restored
    async fn analyze(&self, actor: &CurrentUser, id: Uuid) -> AppResult<UseCase>;

    /// AI suggestions for one field, relayed untouched
    async fn suggestions(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        field: &str,
        context: Option<String>,
    ) -> AppResult<Value>;

    /// Keyword recommendations from the use case text
    async fn recommendations(&self, actor: &CurrentUser, id: Uuid) -> AppResult<Recommendations>;

    async fn select_domains(&self, actor: &CurrentUser, id: Uuid, choices: Vec<DomainChoice>) -> AppResult<UseCase>;

    async fn select_apis(&self, actor: &CurrentUser, id: Uuid, api_ids: Vec<String>) -> AppResult<UseCase>;
}

/// Concrete implementation of UseCaseService using Unit of Work.
pub struct UseCaseManager<U: UnitOfWork> {
    uow: Arc<U>,
    ai: Arc<dyn AiClient>,
}

impl<U: UnitOfWork> UseCaseManager<U> {
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

    async fn company(&self, actor: &CurrentUser) -> AppResult<Company> {
        self.uow
            .companies()
            .find_by_id(actor.company_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn apply(&self, mut use_case: UseCase, action: UseCaseAction) -> AppResult<UseCase> {
        let from = use_case.status;
        let to = use_case.apply(action)?;
        let saved = self.uow.use_cases().save(use_case).await?;
        tracing::info!(use_case_id = %saved.id, from = %from, to = %to, "Use case status changed");
        Ok(saved)
    }
}

fn clean_required(value: String, field: &str) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::validation(format!("{} cannot be empty", field)));
    }
    Ok(value)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .filter(|s| !s.trim().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Copy structured fields from an analysis into fields the analyst left empty.
fn fill_empty_fields(use_case: &mut UseCase, analysis: &Value) {
    let fields = &mut use_case.fields;
    if fields.objective.is_none() {
        fields.objective = analysis
            .get("objective")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
    }
    if fields.actors.is_empty() {
        fields.actors = string_list(analysis.get("actors"));
    }
    if fields.business_rules.is_empty() {
        fields.business_rules = string_list(analysis.get("business_rules"));
    }
    if fields.flows.is_empty() {
        fields.flows = analysis
            .get("flows")
            .cloned()
            .and_then(|flows| serde_json::from_value::<Vec<UseCaseFlow>>(flows).ok())
            .unwrap_or_default();
    }
}

#[async_trait]
impl<U: UnitOfWork> UseCaseService for UseCaseManager<U> {
    async fn list(
        &self,
        actor: &CurrentUser,
        status: Option<UseCaseStatus>,
        params: &PaginationParams,
    ) -> AppResult<Paginated<UseCase>> {
        let (items, total) = self
            .uow
            .use_cases()
            .list(actor.company_id, status, params)
            .await?;
        Ok(Paginated::new(items, params, total))
    }

    async fn get(&self, actor: &CurrentUser, id: Uuid) -> AppResult<UseCase> {
        self.load(actor, id).await
    }

    async fn create(&self, actor: &CurrentUser, data: NewUseCase) -> AppResult<UseCase> {
        let company = self.company(actor).await?;
        let limit = company.settings.max_use_cases;
        let count = self.uow.use_cases().count_by_company(company.id).await?;
        if count >= u64::from(limit) {
            tracing::warn!(company_id = %company.id, limit, "Use case quota reached");
            return Err(AppError::QuotaExceeded(limit));
        }

        let data = NewUseCase {
            title: clean_required(data.title, "Title")?,
            description: clean_required(data.description, "Description")?,
            ..data
        };
        let use_case = UseCase::new(actor.company_id, actor.id, data);
        let use_case = self.uow.use_cases().create(use_case).await?;
        tracing::info!(use_case_id = %use_case.id, company_id = %use_case.company_id, "Use case created");
        Ok(use_case)
    }

    async fn update(&self, actor: &CurrentUser, id: Uuid, changes: UpdateUseCase) -> AppResult<UseCase> {
        let mut use_case = self.load(actor, id).await?;
        let changes = UpdateUseCase {
            title: changes.title.map(|t| clean_required(t, "Title")).transpose()?,
            description: changes
                .description
                .map(|d| clean_required(d, "Description"))
                .transpose()?,
            ..changes
        };
        use_case.update(changes);
        self.uow.use_cases().save(use_case).await
    }

    async fn delete(&self, actor: &CurrentUser, id: Uuid) -> AppResult<()> {
        let use_case = self.load(actor, id).await?;
        if !use_case.is_created_by(actor.id) {
            return Err(AppError::Forbidden);
        }
        self.uow.use_cases().delete(actor.company_id, id).await?;
        tracing::info!(use_case_id = %id, by = %actor.id, "Use case deleted");
        Ok(())
    }

    async fn analyze(&self, actor: &CurrentUser, id: Uuid) -> AppResult<UseCase> {
        self.company(actor).await?.require_feature(Feature::AiAnalysis)?;
        let use_case = self.load(actor, id).await?;
        let previous = use_case.status_before_analysis();

        let mut use_case = self.apply(use_case, UseCaseAction::BeginAnalysis).await?;
        let prompt = prompts::analysis(&use_case);

        match self.ai.complete(prompts::ANALYST_SYSTEM, &prompt).await {
            Ok(analysis) => {
                fill_empty_fields(&mut use_case, &analysis);
                self.apply(use_case, UseCaseAction::CompleteAnalysis(analysis)).await
            }
            Err(e) => {
                tracing::error!(use_case_id = %id, error = %e, "AI analysis failed");
                if let Err(restore_err) = self
                    .apply(use_case, UseCaseAction::AbortAnalysis { previous })
                    .await
                {
                    tracing::error!(use_case_id = %id, error = %restore_err, "Failed to restore status after analysis error");
                }
                Err(e)
            }
        }
    }

    async fn suggestions(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        field: &str,
        context: Option<String>,
    ) -> AppResult<Value> {
        self.company(actor).await?.require_feature(Feature::AiAnalysis)?;
        let use_case = self.load(actor, id).await?;
        let prompt = prompts::suggestions(&use_case, field, context.as_deref());
        self.ai.complete(prompts::ANALYST_SYSTEM, &prompt).await
    }

    async fn recommendations(&self, actor: &CurrentUser, id: Uuid) -> AppResult<Recommendations> {
        let use_case = self.load(actor, id).await?;
        let chosen: Vec<String> = use_case
            .selected_domains
            .iter()
            .map(|d| d.domain_id.clone())
            .collect();
        Ok(bian::recommend(&use_case.full_text(), &chosen))
    }

    async fn select_domains(&self, actor: &CurrentUser, id: Uuid, choices: Vec<DomainChoice>) -> AppResult<UseCase> {
        let domains = choices
            .iter()
            .map(|c| SelectedDomain::from_catalog(&c.domain_id, c.confidence))
            .collect::<AppResult<Vec<_>>>()?;
        let use_case = self.load(actor, id).await?;
        self.apply(use_case, UseCaseAction::SelectDomains(domains)).await
    }

    async fn select_apis(&self, actor: &CurrentUser, id: Uuid, api_ids: Vec<String>) -> AppResult<UseCase> {
        let apis = api_ids
            .iter()
            .map(|api_id| SelectedApi::from_catalog(api_id))
            .collect::<AppResult<Vec<_>>>()?;
        let use_case = self.load(actor, id).await?;
        self.apply(use_case, UseCaseAction::SelectApis(apis)).await
    }
}
