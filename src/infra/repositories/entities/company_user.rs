//! Company member database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{CompanyUser, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "company_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub joined_at: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
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

/// Convert database model to domain entity
impl From<Model> for CompanyUser {
    fn from(model: Model) -> Self {
        CompanyUser {
            id: model.id,
            company_id: model.company_id,
            email: model.email,
            name: model.name,
            picture: model.picture,
            role: UserRole::from(model.role.as_str()),
            is_active: model.is_active,
            joined_at: model.joined_at,
            last_login: model.last_login,
        }
    }
}

impl From<&CompanyUser> for ActiveModel {
    fn from(user: &CompanyUser) -> Self {
        ActiveModel {
            id: Set(user.id),
            company_id: Set(user.company_id),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            picture: Set(user.picture.clone()),
            role: Set(user.role.to_string()),
            is_active: Set(user.is_active),
            joined_at: Set(user.joined_at),
            last_login: Set(user.last_login),
        }
    }
}
