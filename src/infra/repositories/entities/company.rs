//! Company database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Company, CompanySettings};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub domain: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub settings: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::company_user::Entity")]
    Users,
    #[sea_orm(has_many = "super::use_case::Entity")]
    UseCases,
}

impl Related<super::company_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::use_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UseCases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for Company {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let settings: CompanySettings = serde_json::from_value(model.settings)
            .map_err(|e| AppError::internal(format!("Corrupt settings for company {}: {}", model.id, e)))?;
        Ok(Company {
            id: model.id,
            name: model.name,
            domain: model.domain,
            settings,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Build a full active model from a domain entity
pub fn active_model(company: &Company) -> Result<ActiveModel, AppError> {
    use sea_orm::Set;

    let settings = serde_json::to_value(&company.settings)
        .map_err(|e| AppError::internal(format!("Failed to encode company settings: {}", e)))?;
    Ok(ActiveModel {
        id: Set(company.id),
        name: Set(company.name.clone()),
        domain: Set(company.domain.clone()),
        settings: Set(settings),
        created_at: Set(company.created_at),
        updated_at: Set(company.updated_at),
    })
}
