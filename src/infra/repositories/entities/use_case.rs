//! Use case database entity for SeaORM.
//!
//! Embedded collections live in JSONB columns.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{StructuredFields, UseCase, UseCaseFlow, UseCaseStatus};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "use_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub original_text: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub objective: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub actors: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub flows: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub business_rules: Json,
    pub status: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub ai_analysis: Option<Json>,
    #[sea_orm(column_type = "JsonBinary")]
    pub selected_domains: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub selected_apis: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub custom_schemas: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub data_sources: Json,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_delete = "Cascade"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn decode<T: DeserializeOwned>(id: Uuid, column: &str, value: Json) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::internal(format!("Corrupt {} for use case {}: {}", column, id, e)))
}

fn encode<T: Serialize>(column: &str, value: &T) -> Result<Json, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::internal(format!("Failed to encode {}: {}", column, e)))
}

/// Convert database model to domain entity
impl TryFrom<Model> for UseCase {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let status: UseCaseStatus = model
            .status
            .parse()
            .map_err(|_| AppError::internal(format!("Unknown status '{}' on use case {}", model.status, id)))?;
        let flows: Vec<UseCaseFlow> = decode(id, "flows", model.flows)?;

        Ok(UseCase {
            id,
            company_id: model.company_id,
            title: model.title,
            description: model.description,
            original_text: model.original_text,
            fields: StructuredFields {
                objective: model.objective,
                actors: decode(id, "actors", model.actors)?,
                flows,
                business_rules: decode(id, "business_rules", model.business_rules)?,
            },
            status,
            ai_analysis: model.ai_analysis,
            selected_domains: decode(id, "selected_domains", model.selected_domains)?,
            selected_apis: decode(id, "selected_apis", model.selected_apis)?,
            custom_schemas: decode(id, "custom_schemas", model.custom_schemas)?,
            data_sources: decode(id, "data_sources", model.data_sources)?,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Build a full active model from a domain entity
pub fn active_model(use_case: &UseCase) -> Result<ActiveModel, AppError> {
    Ok(ActiveModel {
        id: Set(use_case.id),
        company_id: Set(use_case.company_id),
        title: Set(use_case.title.clone()),
        description: Set(use_case.description.clone()),
        original_text: Set(use_case.original_text.clone()),
        objective: Set(use_case.fields.objective.clone()),
        actors: Set(encode("actors", &use_case.fields.actors)?),
        flows: Set(encode("flows", &use_case.fields.flows)?),
        business_rules: Set(encode("business_rules", &use_case.fields.business_rules)?),
        status: Set(use_case.status.to_string()),
        ai_analysis: Set(use_case.ai_analysis.clone()),
        selected_domains: Set(encode("selected_domains", &use_case.selected_domains)?),
        selected_apis: Set(encode("selected_apis", &use_case.selected_apis)?),
        custom_schemas: Set(encode("custom_schemas", &use_case.custom_schemas)?),
        data_sources: Set(encode("data_sources", &use_case.data_sources)?),
        created_by: Set(use_case.created_by),
        created_at: Set(use_case.created_at),
        updated_at: Set(use_case.updated_at),
    })
}
