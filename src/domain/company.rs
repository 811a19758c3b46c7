//! Company (tenant) entity and its settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::DEFAULT_MAX_USE_CASES;
use crate::errors::{AppError, AppResult};

/// Features a company administrator can switch on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    AiAnalysis,
    SchemaGeneration,
    DataSources,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::AiAnalysis => "ai_analysis",
            Feature::SchemaGeneration => "schema_generation",
            Feature::DataSources => "data_sources",
        }
    }
}

/// Feature flags stored in the company settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FeatureFlags {
    pub ai_analysis: bool,
    pub schema_generation: bool,
    pub data_sources: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            ai_analysis: true,
            schema_generation: true,
            data_sources: true,
        }
    }
}

/// Per-company configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CompanySettings {
    pub features: FeatureFlags,
    /// Extra email domains whose users join this company on first login
    #[schema(example = json!(["bank-group.com"]))]
    pub allowed_domains: Vec<String>,
    #[schema(example = 100)]
    pub max_use_cases: u32,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            features: FeatureFlags::default(),
            allowed_domains: Vec::new(),
            max_use_cases: DEFAULT_MAX_USE_CASES,
        }
    }
}

impl CompanySettings {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::AiAnalysis => self.features.ai_analysis,
            Feature::SchemaGeneration => self.features.schema_generation,
            Feature::DataSources => self.features.data_sources,
        }
    }

    /// Normalize allowed domains (lowercase, trimmed, deduplicated)
    pub fn normalized(mut self) -> Self {
        let mut domains: Vec<String> = self
            .allowed_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        domains.sort();
        domains.dedup();
        self.allowed_domains = domains;
        self
    }
}

/// A tenant grouping users and use cases
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Banco Ejemplo")]
    pub name: String,
    /// Primary email domain of the company
    #[schema(example = "bancoejemplo.com")]
    pub domain: String,
    pub settings: CompanySettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Create a company with default settings for an email domain
    pub fn new(name: String, domain: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            domain: domain.to_lowercase(),
            settings: CompanySettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive a display name from the email domain ("banco-sur.com" -> "Banco Sur")
    pub fn name_from_domain(domain: &str) -> String {
        let label = domain.split('.').next().unwrap_or(domain);
        label
            .split(|c: char| c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether users with this email domain belong to the company
    pub fn accepts_domain(&self, email_domain: &str) -> bool {
        self.domain == email_domain
            || self
                .settings
                .allowed_domains
                .iter()
                .any(|d| d == email_domain)
    }

    /// Fail when a feature is switched off
    pub fn require_feature(&self, feature: Feature) -> AppResult<()> {
        if self.settings.is_enabled(feature) {
            Ok(())
        } else {
            Err(AppError::FeatureDisabled(feature.as_str()))
        }
    }
}

/// Changes an admin may apply to the company
#[derive(Debug, Clone, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub settings: Option<CompanySettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_domain() {
        assert_eq!(Company::name_from_domain("banco-sur.com"), "Banco Sur");
        assert_eq!(Company::name_from_domain("acme.co.uk"), "Acme");
    }

    #[test]
    fn test_accepts_primary_and_allowed_domains() {
        let mut company = Company::new("Acme".into(), "Acme.com".into());
        company.settings.allowed_domains = vec!["acme-group.com".into()];
        assert!(company.accepts_domain("acme.com"));
        assert!(company.accepts_domain("acme-group.com"));
        assert!(!company.accepts_domain("other.com"));
    }

    #[test]
    fn test_require_feature() {
        let mut company = Company::new("Acme".into(), "acme.com".into());
        assert!(company.require_feature(Feature::AiAnalysis).is_ok());

        company.settings.features.ai_analysis = false;
        let err = company.require_feature(Feature::AiAnalysis).unwrap_err();
        assert!(matches!(err, AppError::FeatureDisabled("ai_analysis")));
    }

    #[test]
    fn test_settings_missing_fields_use_defaults() {
        let settings: CompanySettings =
            serde_json::from_value(serde_json::json!({ "max_use_cases": 3 })).unwrap();
        assert_eq!(settings.max_use_cases, 3);
        assert!(settings.features.ai_analysis);
        assert!(settings.allowed_domains.is_empty());
    }

    #[test]
    fn test_settings_normalized() {
        let settings = CompanySettings {
            allowed_domains: vec![" @Acme.com ".into(), "acme.com".into(), "".into()],
            ..Default::default()
        }
        .normalized();
        assert_eq!(settings.allowed_domains, vec!["acme.com".to_string()]);
    }
}
