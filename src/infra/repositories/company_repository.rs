//! Company repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{company, company_user};
use crate::domain::{Company, CompanyUser};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Company repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>>;

    /// Company whose primary or allowed domains include `email_domain`.
    /// A primary-domain match wins over an allowed-domain match.
    async fn find_by_email_domain(&self, email_domain: &str) -> AppResult<Option<Company>>;

    /// Insert a company together with its first member, atomically
    async fn create_with_owner(&self, company: Company, owner: CompanyUser) -> AppResult<(Company, CompanyUser)>;

    /// Persist name and settings changes
    async fn save(&self, company: Company) -> AppResult<Company>;
}

/// Concrete implementation of CompanyRepository
pub struct CompanyStore {
    db: DatabaseConnection,
}

impl CompanyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyRepository for CompanyStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        company::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Company::try_from)
            .transpose()
    }

    async fn find_by_email_domain(&self, email_domain: &str) -> AppResult<Option<Company>> {
        let models = company::Entity::find()
            .filter(
                Condition::any()
                    .add(company::Column::Domain.eq(email_domain))
                    .add(Expr::cust_with_values(
                        "settings -> 'allowed_domains' @> $1",
                        [serde_json::json!([email_domain])],
                    )),
            )
            .all(&self.db)
            .await?;

        let mut companies = models
            .into_iter()
            .map(Company::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        companies.sort_by_key(|c| c.domain != email_domain);

        Ok(companies.into_iter().next())
    }

    async fn create_with_owner(&self, company: Company, owner: CompanyUser) -> AppResult<(Company, CompanyUser)> {
        let txn = self.db.begin().await?;

        let result = async {
            let company_model = company::active_model(&company)?.insert(&txn).await?;
            let user_model = company_user::ActiveModel::from(&owner).insert(&txn).await?;
            Ok::<_, AppError>((Company::try_from(company_model)?, CompanyUser::from(user_model)))
        }
        .await;

        match result {
            Ok(created) => {
                txn.commit().await?;
                Ok(created)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn save(&self, mut company: Company) -> AppResult<Company> {
        company.updated_at = chrono::Utc::now();
        let model = company::active_model(&company)?.update(&self.db).await?;
        Company::try_from(model)
    }
}
