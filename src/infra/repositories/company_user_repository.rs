//! Company member repository implementation.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::company_user::{self, ActiveModel, Entity as CompanyUserEntity};
use crate::domain::CompanyUser;
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// Member repository trait for dependency injection.
///
/// Lookups by id are scoped to a company.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompanyUserRepository: Send + Sync {
    /// Find a member of `company_id` by ID
    async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> AppResult<Option<CompanyUser>>;

    /// Find a member by email address (emails are unique across companies)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CompanyUser>>;

    /// All members of a company, oldest first
    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<CompanyUser>>;

    async fn create(&self, user: CompanyUser) -> AppResult<CompanyUser>;

    /// Persist profile, role, activity and last login
    async fn save(&self, user: CompanyUser) -> AppResult<CompanyUser>;
}

/// Concrete implementation of CompanyUserRepository
pub struct CompanyUserStore {
    db: DatabaseConnection,
}

impl CompanyUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyUserRepository for CompanyUserStore {
    async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> AppResult<Option<CompanyUser>> {
        let result = CompanyUserEntity::find_by_id(id)
            .filter(company_user::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;

        Ok(result.map(CompanyUser::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<CompanyUser>> {
        let result = CompanyUserEntity::find()
            .filter(company_user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await?;

        Ok(result.map(CompanyUser::from))
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<CompanyUser>> {
        let models = CompanyUserEntity::find()
            .filter(company_user::Column::CompanyId.eq(company_id))
            .order_by_asc(company_user::Column::JoinedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(CompanyUser::from).collect())
    }

    async fn create(&self, user: CompanyUser) -> AppResult<CompanyUser> {
        let model = ActiveModel::from(&user).insert(&self.db).await?;
        Ok(CompanyUser::from(model))
    }

    async fn save(&self, user: CompanyUser) -> AppResult<CompanyUser> {
        let model = ActiveModel::from(&user).update(&self.db).await?;
        Ok(CompanyUser::from(model))
    }
}
