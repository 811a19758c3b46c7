//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories so services depend on a single
//! seam. Multi-table writes that must be atomic (company onboarding) run in
//! a transaction inside the owning repository.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    CompanyRepository, CompanyStore, CompanyUserRepository, CompanyUserStore, UseCaseRepository,
    UseCaseStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    fn companies(&self) -> Arc<dyn CompanyRepository>;

    fn users(&self) -> Arc<dyn CompanyUserRepository>;

    fn use_cases(&self) -> Arc<dyn UseCaseRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    company_repo: Arc<CompanyStore>,
    user_repo: Arc<CompanyUserStore>,
    use_case_repo: Arc<UseCaseStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            company_repo: Arc::new(CompanyStore::new(db.clone())),
            user_repo: Arc::new(CompanyUserStore::new(db.clone())),
            use_case_repo: Arc::new(UseCaseStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn companies(&self) -> Arc<dyn CompanyRepository> {
        self.company_repo.clone()
    }

    fn users(&self) -> Arc<dyn CompanyUserRepository> {
        self.user_repo.clone()
    }

    fn use_cases(&self) -> Arc<dyn UseCaseRepository> {
        self.use_case_repo.clone()
    }
}
