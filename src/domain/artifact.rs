//! Artifacts attached to a use case: JSON schemas and data sources.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::AppError;

static HTTP_URL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").ok());

/// Who produced a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SchemaOrigin {
    Ai,
    Manual,
}

/// A named JSON schema describing data used by the use case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomSchema {
    #[schema(example = "PaymentOrder")]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub schema: Value,
    pub generated_by: SchemaOrigin,
    pub created_at: DateTime<Utc>,
}

impl CustomSchema {
    pub fn new(name: String, description: Option<String>, schema: Value, generated_by: SchemaOrigin) -> Self {
        Self {
            name,
            description,
            schema,
            generated_by,
            created_at: Utc::now(),
        }
    }
}

/// Kind of system a data source points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceType {
    RestApi,
    Database,
    File,
    Stream,
}

impl DataSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceType::RestApi => "rest_api",
            DataSourceType::Database => "database",
            DataSourceType::File => "file",
            DataSourceType::Stream => "stream",
        }
    }

    /// Config keys that must hold a non-empty value
    fn required_keys(&self) -> &'static [&'static str] {
        match self {
            DataSourceType::RestApi => &["url"],
            DataSourceType::Database => &["host", "database"],
            DataSourceType::File => &["path"],
            DataSourceType::Stream => &["brokers", "topic"],
        }
    }
}

impl FromStr for DataSourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rest_api" => Ok(DataSourceType::RestApi),
            "database" => Ok(DataSourceType::Database),
            "file" => Ok(DataSourceType::File),
            "stream" => Ok(DataSourceType::Stream),
            other => Err(AppError::validation(format!("Unknown data source type '{}'", other))),
        }
    }
}

/// An external data provider the use case depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DataSource {
    #[schema(example = "core-ledger")]
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    #[schema(value_type = Object)]
    pub config: Value,
    pub is_validated: bool,
    pub created_at: DateTime<Utc>,
}

impl DataSource {
    pub fn new(name: String, source_type: DataSourceType, config: Value) -> Self {
        Self {
            name,
            source_type,
            config,
            is_validated: false,
            created_at: Utc::now(),
        }
    }

    /// Check the connection settings, returning every problem found.
    ///
    /// Only the shape of the config is checked; no connection is opened.
    pub fn validate_connection(&self) -> Vec<String> {
        let Some(config) = self.config.as_object() else {
            return vec!["config must be a JSON object".to_string()];
        };

        let mut problems: Vec<String> = self
            .source_type
            .required_keys()
            .iter()
            .filter(|key| !has_value(config.get(**key)))
            .map(|key| format!("'{}' is required for {} sources", key, self.source_type.as_str()))
            .collect();

        if self.source_type == DataSourceType::RestApi {
            if let Some(url) = config.get("url").and_then(Value::as_str) {
                let is_http = HTTP_URL.as_ref().is_some_and(|re| re.is_match(url));
                if !url.is_empty() && !is_http {
                    problems.push("'url' must be an http(s) URL".to_string());
                }
            }
        }

        if let Some(port) = config.get("port") {
            let valid = port.as_u64().map(|p| (1..=65535).contains(&p)).unwrap_or(false);
            if !valid {
                problems.push("'port' must be between 1 and 65535".to_string());
            }
        }

        problems
    }
}

fn has_value(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rest_api_requires_http_url() {
        let ok = DataSource::new("a".into(), DataSourceType::RestApi, json!({"url": "https://api.bank.com/v1"}));
        assert!(ok.validate_connection().is_empty());

        let bad = DataSource::new("b".into(), DataSourceType::RestApi, json!({"url": "ftp://files"}));
        assert_eq!(bad.validate_connection().len(), 1);

        let missing = DataSource::new("c".into(), DataSourceType::RestApi, json!({}));
        assert!(missing.validate_connection()[0].contains("'url'"));
    }

    #[test]
    fn test_database_reports_every_missing_key() {
        let source = DataSource::new("core".into(), DataSourceType::Database, json!({"port": 70000}));
        let problems = source.validate_connection();
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn test_stream_accepts_broker_list() {
        let source = DataSource::new(
            "events".into(),
            DataSourceType::Stream,
            json!({"brokers": ["kafka:9092"], "topic": "payments"}),
        );
        assert!(source.validate_connection().is_empty());
    }

    #[test]
    fn test_non_object_config_rejected() {
        let source = DataSource::new("x".into(), DataSourceType::File, json!("path"));
        assert_eq!(source.validate_connection(), vec!["config must be a JSON object".to_string()]);
    }

    #[test]
    fn test_type_serializes_as_type_field() {
        let source = DataSource::new("f".into(), DataSourceType::File, json!({"path": "/data"}));
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!("stream".parse::<DataSourceType>().unwrap(), DataSourceType::Stream);
        assert!("queue".parse::<DataSourceType>().is_err());
    }
}
