//! Use case aggregate and its status lifecycle.
//!
//! ```text
//! draft ──analyze──> analyzing ──ok──> analyzed ──domains──> domains_selected
//!                        │                                        │
//!                        └──failure: previous status              apis
//!                                                                 v
//!                      completed <──schemas + data sources── apis_selected
//! ```
//!
//! Domain and API selection may be repeated from any status; the latest
//! submission wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::artifact::{CustomSchema, DataSource};
use super::bian;
use crate::errors::{AppError, AppResult};

/// Lifecycle status of a use case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UseCaseStatus {
    Draft,
    Analyzing,
    Analyzed,
    DomainsSelected,
    ApisSelected,
    Completed,
}

impl UseCaseStatus {
    pub const ALL: [UseCaseStatus; 6] = [
        UseCaseStatus::Draft,
        UseCaseStatus::Analyzing,
        UseCaseStatus::Analyzed,
        UseCaseStatus::DomainsSelected,
        UseCaseStatus::ApisSelected,
        UseCaseStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UseCaseStatus::Draft => "draft",
            UseCaseStatus::Analyzing => "analyzing",
            UseCaseStatus::Analyzed => "analyzed",
            UseCaseStatus::DomainsSelected => "domains_selected",
            UseCaseStatus::ApisSelected => "apis_selected",
            UseCaseStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for UseCaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UseCaseStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UseCaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown use case status '{}'", s)))
    }
}

/// A named flow of steps (main flow, alternative flows)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UseCaseFlow {
    #[schema(example = "Main flow")]
    pub name: String,
    pub steps: Vec<String>,
}

/// A catalog domain attached to a use case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectedDomain {
    #[schema(example = "payment-order")]
    pub domain_id: String,
    pub name: String,
    /// Confidence shown when the domain was recommended
    pub confidence: Option<f64>,
}

impl SelectedDomain {
    /// Resolve a catalog domain id
    pub fn from_catalog(domain_id: &str, confidence: Option<f64>) -> AppResult<Self> {
        let domain = bian::find_domain(domain_id)
            .ok_or_else(|| AppError::validation(format!("Unknown BIAN domain '{}'", domain_id)))?;
        Ok(Self {
            domain_id: domain.id.to_string(),
            name: domain.name.to_string(),
            confidence: confidence.map(|c| c.clamp(0.0, 1.0)),
        })
    }
}

/// A catalog API attached to a use case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SelectedApi {
    #[schema(example = "payment-order-initiate")]
    pub api_id: String,
    pub domain_id: String,
    pub name: String,
    pub method: String,
    pub path: String,
}

impl SelectedApi {
    /// Resolve a catalog API id
    pub fn from_catalog(api_id: &str) -> AppResult<Self> {
        let api = bian::find_api(api_id)
            .ok_or_else(|| AppError::validation(format!("Unknown BIAN API '{}'", api_id)))?;
        Ok(Self {
            api_id: api.id.to_string(),
            domain_id: api.domain_id.to_string(),
            name: api.name.to_string(),
            method: api.method.to_string(),
            path: api.path.to_string(),
        })
    }
}

/// Structured fields of a use case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct StructuredFields {
    pub objective: Option<String>,
    pub actors: Vec<String>,
    pub flows: Vec<UseCaseFlow>,
    pub business_rules: Vec<String>,
}

/// Actions that move a use case through its lifecycle
#[derive(Debug, Clone)]
pub enum UseCaseAction {
    BeginAnalysis,
    CompleteAnalysis(serde_json::Value),
    AbortAnalysis { previous: UseCaseStatus },
    SelectDomains(Vec<SelectedDomain>),
    SelectApis(Vec<SelectedApi>),
}

/// The primary document: a banking process description and its artifacts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UseCase {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub original_text: String,
    pub fields: StructuredFields,
    pub status: UseCaseStatus,
    /// Raw AI analysis as returned by the provider
    #[schema(value_type = Option<Object>)]
    pub ai_analysis: Option<serde_json::Value>,
    pub selected_domains: Vec<SelectedDomain>,
    pub selected_apis: Vec<SelectedApi>,
    pub custom_schemas: Vec<CustomSchema>,
    pub data_sources: Vec<DataSource>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a use case
#[derive(Debug, Clone)]
pub struct NewUseCase {
    pub title: String,
    pub description: String,
    pub original_text: Option<String>,
    pub fields: StructuredFields,
}

/// Partial update of the authored content
#[derive(Debug, Clone, Default)]
pub struct UpdateUseCase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub original_text: Option<String>,
    pub objective: Option<String>,
    pub actors: Option<Vec<String>>,
    pub flows: Option<Vec<UseCaseFlow>>,
    pub business_rules: Option<Vec<String>>,
}

impl UseCase {
    /// Create a draft use case owned by `created_by`
    pub fn new(company_id: Uuid, created_by: Uuid, data: NewUseCase) -> Self {
        let now = Utc::now();
        let original_text = data
            .original_text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| data.description.clone());
        Self {
            id: Uuid::new_v4(),
            company_id,
            title: data.title,
            description: data.description,
            original_text,
            fields: data.fields,
            status: UseCaseStatus::Draft,
            ai_analysis: None,
            selected_domains: Vec::new(),
            selected_apis: Vec::new(),
            custom_schemas: Vec::new(),
            data_sources: Vec::new(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_created_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    /// Status to fall back to if an analysis about to start fails.
    ///
    /// A use case left in `analyzing` by an interrupted run falls back to
    /// `analyzed` when an earlier analysis is stored, otherwise to `draft`.
    pub fn status_before_analysis(&self) -> UseCaseStatus {
        match self.status {
            UseCaseStatus::Analyzing if self.ai_analysis.is_some() => UseCaseStatus::Analyzed,
            UseCaseStatus::Analyzing => UseCaseStatus::Draft,
            status => status,
        }
    }

    /// Apply a lifecycle action and return the resulting status.
    pub fn apply(&mut self, action: UseCaseAction) -> AppResult<UseCaseStatus> {
        match action {
            UseCaseAction::BeginAnalysis => {
                self.status = UseCaseStatus::Analyzing;
            }
            UseCaseAction::CompleteAnalysis(analysis) => {
                self.ai_analysis = Some(analysis);
                self.status = UseCaseStatus::Analyzed;
            }
            UseCaseAction::AbortAnalysis { previous } => {
                self.status = previous;
            }
            UseCaseAction::SelectDomains(domains) => {
                if domains.is_empty() {
                    return Err(AppError::validation("Select at least one domain"));
                }
                self.selected_domains = dedup_by_key(domains, |d| d.domain_id.clone());
                self.status = UseCaseStatus::DomainsSelected;
            }
            UseCaseAction::SelectApis(apis) => {
                if apis.is_empty() {
                    return Err(AppError::validation("Select at least one API"));
                }
                self.selected_apis = dedup_by_key(apis, |a| a.api_id.clone());
                self.status = UseCaseStatus::ApisSelected;
                self.refresh_completion();
            }
        }
        self.touch();
        Ok(self.status)
    }

    /// Re-evaluate completion after schemas or data sources changed.
    ///
    /// Completion requires selected APIs plus at least one schema and one data source.
    pub fn refresh_completion(&mut self) -> UseCaseStatus {
        let has_artifacts = !self.custom_schemas.is_empty() && !self.data_sources.is_empty();
        match self.status {
            UseCaseStatus::ApisSelected if has_artifacts => {
                self.status = UseCaseStatus::Completed;
            }
            UseCaseStatus::Completed if !has_artifacts => {
                self.status = UseCaseStatus::ApisSelected;
            }
            _ => {}
        }
        self.status
    }

    /// Apply authored-content changes
    pub fn update(&mut self, changes: UpdateUseCase) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(original_text) = changes.original_text {
            self.original_text = original_text;
        }
        if let Some(objective) = changes.objective {
            self.fields.objective = Some(objective).filter(|o| !o.trim().is_empty());
        }
        if let Some(actors) = changes.actors {
            self.fields.actors = actors;
        }
        if let Some(flows) = changes.flows {
            self.fields.flows = flows;
        }
        if let Some(rules) = changes.business_rules {
            self.fields.business_rules = rules;
        }
        self.touch();
    }

    pub fn add_schema(&mut self, schema: CustomSchema) -> AppResult<()> {
        if self.custom_schemas.iter().any(|s| s.name == schema.name) {
            return Err(AppError::conflict(format!("Schema '{}'", schema.name)));
        }
        self.custom_schemas.push(schema);
        self.refresh_completion();
        self.touch();
        Ok(())
    }

    pub fn remove_schema(&mut self, name: &str) -> AppResult<()> {
        let before = self.custom_schemas.len();
        self.custom_schemas.retain(|s| s.name != name);
        if self.custom_schemas.len() == before {
            return Err(AppError::NotFound);
        }
        self.refresh_completion();
        self.touch();
        Ok(())
    }

    pub fn add_data_source(&mut self, source: DataSource) -> AppResult<()> {
        if self.data_sources.iter().any(|s| s.name == source.name) {
            return Err(AppError::conflict(format!("Data source '{}'", source.name)));
        }
        self.data_sources.push(source);
        self.refresh_completion();
        self.touch();
        Ok(())
    }

    pub fn data_source_mut(&mut self, name: &str) -> AppResult<&mut DataSource> {
        self.data_sources
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or(AppError::NotFound)
    }

    pub fn remove_data_source(&mut self, name: &str) -> AppResult<()> {
        let before = self.data_sources.len();
        self.data_sources.retain(|s| s.name != name);
        if self.data_sources.len() == before {
            return Err(AppError::NotFound);
        }
        self.refresh_completion();
        self.touch();
        Ok(())
    }

    /// All authored text, used for keyword recommendations and AI prompts
    pub fn full_text(&self) -> String {
        let mut parts = vec![self.title.clone(), self.description.clone()];
        if self.original_text != self.description {
            parts.push(self.original_text.clone());
        }
        if let Some(objective) = &self.fields.objective {
            parts.push(objective.clone());
        }
        parts.extend(self.fields.actors.iter().cloned());
        for flow in &self.fields.flows {
            parts.push(flow.name.clone());
            parts.extend(flow.steps.iter().cloned());
        }
        parts.extend(self.fields.business_rules.iter().cloned());
        parts.retain(|p| !p.trim().is_empty());
        parts.join("\n")
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn dedup_by_key<T, K: PartialEq>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen: Vec<K> = Vec::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let k = key(&item);
        if !seen.contains(&k) {
            seen.push(k);
            out.push(item);
        }
    }
    out
}
