//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod company_repository;
mod company_user_repository;
pub(crate) mod entities;
mod use_case_repository;

pub use company_repository::{CompanyRepository, CompanyStore};
pub use company_user_repository::{CompanyUserRepository, CompanyUserStore};
pub use use_case_repository::{UseCaseRepository, UseCaseStore};

#[cfg(test)]
pub use company_repository::MockCompanyRepository;
#[cfg(test)]
pub use company_user_repository::MockCompanyUserRepository;
#[cfg(test)]
pub use use_case_repository::MockUseCaseRepository;
