//! Use case repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::entities::use_case::{self, Entity as UseCaseEntity};
use crate::domain::{UseCase, UseCaseStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(test)]
use mockall::automock;

/// Use case repository trait for dependency injection.
///
/// Every query is scoped to a company; a use case of another company
/// behaves as if it did not exist.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UseCaseRepository: Send + Sync {
    async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> AppResult<Option<UseCase>>;

    /// Newest first, optionally filtered by status. Returns the page and the total count.
    async fn list(
        &self,
        company_id: Uuid,
        status: Option<UseCaseStatus>,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UseCase>, u64)>;

    async fn count_by_company(&self, company_id: Uuid) -> AppResult<u64>;

    async fn create(&self, use_case: UseCase) -> AppResult<UseCase>;

    /// Overwrite every field of an existing use case
    async fn save(&self, use_case: UseCase) -> AppResult<UseCase>;

    /// Permanently delete; NotFound when nothing matched
    async fn delete(&self, company_id: Uuid, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UseCaseRepository
pub struct UseCaseStore {
    db: DatabaseConnection,
}

impl UseCaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UseCaseRepository for UseCaseStore {
    async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> AppResult<Option<UseCase>> {
        UseCaseEntity::find_by_id(id)
            .filter(use_case::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .map(UseCase::try_from)
            .transpose()
    }

    async fn list(
        &self,
        company_id: Uuid,
        status: Option<UseCaseStatus>,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UseCase>, u64)> {
        let mut query = UseCaseEntity::find().filter(use_case::Column::CompanyId.eq(company_id));
        if let Some(status) = status {
            query = query.filter(use_case::Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await?;
        let models = query
            .order_by_desc(use_case::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.limit())
            .all(&self.db)
            .await?;

        let items = models
            .into_iter()
            .map(UseCase::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    async fn count_by_company(&self, company_id: Uuid) -> AppResult<u64> {
        UseCaseEntity::find()
            .filter(use_case::Column::CompanyId.eq(company_id))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create(&self, use_case: UseCase) -> AppResult<UseCase> {
        let model = use_case::active_model(&use_case)?.insert(&self.db).await?;
        UseCase::try_from(model)
    }

    async fn save(&self, use_case: UseCase) -> AppResult<UseCase> {
        let exists = UseCaseEntity::find_by_id(use_case.id)
            .filter(use_case::Column::CompanyId.eq(use_case.company_id))
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(AppError::NotFound);
        }

        let model = use_case::active_model(&use_case)?.update(&self.db).await?;
        UseCase::try_from(model)
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = UseCaseEntity::delete_many()
            .filter(use_case::Column::Id.eq(id))
            .filter(use_case::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
