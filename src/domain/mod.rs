//! Domain layer - Core business entities and logic
//!
//! Tenants, their members, use cases with their artifacts, and the
//! static BIAN catalog. Nothing here touches the database or HTTP.

pub mod artifact;
pub mod bian;
pub mod company;
pub mod use_case;
pub mod user;

pub use artifact::{CustomSchema, DataSource, DataSourceType, SchemaOrigin};
pub use bian::{ApiRecommendation, BianApi, BianDomain, DomainRecommendation, Recommendations};
pub use company::{Company, CompanySettings, Feature, FeatureFlags, UpdateCompany};
pub use use_case::{
    NewUseCase, SelectedApi, SelectedDomain, StructuredFields, UpdateUseCase, UseCase, UseCaseAction,
    UseCaseFlow, UseCaseStatus,
};
pub use user::{email_domain, CompanyUser, CurrentUser, UpdateMember, UserResponse, UserRole};
