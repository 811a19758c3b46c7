//! Company service - Tenant profile, settings and membership.
//!
//! Reads are open to every member; changes require the admin role.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    email_domain, Company, CompanyUser, CurrentUser, UpdateCompany, UpdateMember, UserRole,
};
use crate::config::is_public_email_domain;
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Member invited by an admin before their first sign-in
#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Company service trait for dependency injection.
#[async_trait]
pub trait CompanyService: Send + Sync {
    async fn current(&self, actor: &CurrentUser) -> AppResult<Company>;

    async fn update(&self, actor: &CurrentUser, changes: UpdateCompany) -> AppResult<Company>;

    async fn members(&self, actor: &CurrentUser) -> AppResult<Vec<CompanyUser>>;

    async fn add_member(&self, actor: &CurrentUser, member: NewMember) -> AppResult<CompanyUser>;

    async fn update_member(&self, actor: &CurrentUser, id: Uuid, changes: UpdateMember) -> AppResult<CompanyUser>;

    /// Members are never hard-deleted; removal deactivates them
    async fn deactivate_member(&self, actor: &CurrentUser, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CompanyService using Unit of Work.
pub struct CompanyManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CompanyManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn load_member(&self, actor: &CurrentUser, id: Uuid) -> AppResult<CompanyUser> {
        self.uow
            .users()
            .find_by_id(actor.company_id, id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl<U: UnitOfWork> CompanyService for CompanyManager<U> {
    async fn current(&self, actor: &CurrentUser) -> AppResult<Company> {
        self.uow
            .companies()
            .find_by_id(actor.company_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update(&self, actor: &CurrentUser, changes: UpdateCompany) -> AppResult<Company> {
        actor.require_admin()?;
        let mut company = self.current(actor).await?;

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("Company name cannot be empty"));
            }
            company.name = name;
        }
        if let Some(settings) = changes.settings {
            if settings.max_use_cases == 0 {
                return Err(AppError::validation("max_use_cases must be at least 1"));
            }
            let settings = settings.normalized();
            if let Some(public) = settings.allowed_domains.iter().find(|d| is_public_email_domain(d)) {
                return Err(AppError::validation(format!(
                    "'{}' is a public mail provider and cannot be an allowed domain",
                    public
                )));
            }
            company.settings = settings;
        }

        let company = self.uow.companies().save(company).await?;
        tracing::info!(company_id = %company.id, by = %actor.id, "Company settings updated");
        Ok(company)
    }

    async fn members(&self, actor: &CurrentUser) -> AppResult<Vec<CompanyUser>> {
        self.uow.users().list_by_company(actor.company_id).await
    }

    async fn add_member(&self, actor: &CurrentUser, member: NewMember) -> AppResult<CompanyUser> {
        actor.require_admin()?;
        let email = member.email.trim().to_lowercase();
        if email_domain(&email).is_none() {
            return Err(AppError::validation("Invalid email address"));
        }
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Member"));
        }

        let user = CompanyUser::new(actor.company_id, email, member.name, member.role);
        let user = self.uow.users().create(user).await?;
        tracing::info!(user_id = %user.id, company_id = %user.company_id, "Member added");
        Ok(user)
    }

    async fn update_member(&self, actor: &CurrentUser, id: Uuid, changes: UpdateMember) -> AppResult<CompanyUser> {
        actor.require_admin()?;
        let mut user = self.load_member(actor, id).await?;

        if id == actor.id
            && (changes.role == Some(UserRole::User) || changes.is_active == Some(false))
        {
            return Err(AppError::validation("Admins cannot demote or deactivate themselves"));
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }

        self.uow.users().save(user).await
    }

    async fn deactivate_member(&self, actor: &CurrentUser, id: Uuid) -> AppResult<()> {
        actor.require_admin()?;
        if id == actor.id {
            return Err(AppError::validation("Admins cannot deactivate themselves"));
        }

        let mut user = self.load_member(actor, id).await?;
        user.is_active = false;
        self.uow.users().save(user).await?;
        tracing::info!(user_id = %id, by = %actor.id, "Member deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CompanySettings;
    use crate::infra::repositories::{
        CompanyRepository, CompanyUserRepository, MockCompanyRepository, MockCompanyUserRepository,
        UseCaseRepository,
    };

    struct MockUow {
        companies: Arc<MockCompanyRepository>,
        users: Arc<MockCompanyUserRepository>,
    }

    impl UnitOfWork for MockUow {
        fn companies(&self) -> Arc<dyn CompanyRepository> {
            self.companies.clone()
        }

        fn users(&self) -> Arc<dyn CompanyUserRepository> {
            self.users.clone()
        }

        fn use_cases(&self) -> Arc<dyn UseCaseRepository> {
            unreachable!("company service never touches use cases")
        }
    }

    fn manager(companies: MockCompanyRepository, users: MockCompanyUserRepository) -> CompanyManager<MockUow> {
        CompanyManager::new(Arc::new(MockUow {
            companies: Arc::new(companies),
            users: Arc::new(users),
        }))
    }

    fn actor(company_id: Uuid, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            company_id,
            email: "boss@bank.com".into(),
            role,
        }
    }

    #[tokio::test]
    async fn test_update_requires_admin() {
        let service = manager(MockCompanyRepository::new(), MockCompanyUserRepository::new());
        let user = actor(Uuid::new_v4(), UserRole::User);

        let result = service
            .update(&user, UpdateCompany { name: Some("X".into()), settings: None })
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_update_normalizes_allowed_domains() {
        let company = Company::new("Bank".into(), "bank.com".into());
        let admin = actor(company.id, UserRole::Admin);

        let mut companies = MockCompanyRepository::new();
        let stored = company.clone();
        companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        companies.expect_save().returning(|c| Ok(c));

        let settings = CompanySettings {
            allowed_domains: vec![" @Bank-Group.com ".into(), "bank-group.com".into()],
            ..CompanySettings::default()
        };
        let updated = manager(companies, MockCompanyUserRepository::new())
            .update(&admin, UpdateCompany { name: None, settings: Some(settings) })
            .await
            .unwrap();

        assert_eq!(updated.settings.allowed_domains, vec!["bank-group.com".to_string()]);
    }

    #[tokio::test]
    async fn test_public_mail_provider_cannot_be_allowed() {
        let company = Company::new("Bank".into(), "bank.com".into());
        let admin = actor(company.id, UserRole::Admin);

        let mut companies = MockCompanyRepository::new();
        companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(company.clone())));
        companies.expect_save().never();

        let settings = CompanySettings {
            allowed_domains: vec!["bank-group.com".into(), "@GMAIL.com".into()],
            ..CompanySettings::default()
        };
        let result = manager(companies, MockCompanyUserRepository::new())
            .update(&admin, UpdateCompany { name: None, settings: Some(settings) })
            .await;
        assert!(matches!(result, Err(AppError::Validation(ref msg)) if msg.contains("gmail.com")));
    }

    #[tokio::test]
    async fn test_zero_quota_is_rejected() {
        let company = Company::new("Bank".into(), "bank.com".into());
        let admin = actor(company.id, UserRole::Admin);

        let mut companies = MockCompanyRepository::new();
        companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(company.clone())));
        companies.expect_save().never();

        let settings = CompanySettings {
            max_use_cases: 0,
            ..CompanySettings::default()
        };
        let result = manager(companies, MockCompanyUserRepository::new())
            .update(&admin, UpdateCompany { name: None, settings: Some(settings) })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_member_rejects_known_email() {
        let admin = actor(Uuid::new_v4(), UserRole::Admin);
        let existing = CompanyUser::new(Uuid::new_v4(), "ana@bank.com".into(), "Ana".into(), UserRole::User);

        let mut users = MockCompanyUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email.to_string() == "ana@bank.com")
            .returning(move |_| Ok(Some(existing.clone())));
        users.expect_create().never();

        let result = manager(MockCompanyRepository::new(), users)
            .add_member(
                &admin,
                NewMember {
                    email: " Ana@Bank.com ".into(),
                    name: "Ana".into(),
                    role: UserRole::User,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_admin_cannot_deactivate_self() {
        let admin = actor(Uuid::new_v4(), UserRole::Admin);
        let service = manager(MockCompanyRepository::new(), MockCompanyUserRepository::new());

        let result = service.deactivate_member(&admin, admin.id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_deactivate_member_keeps_record() {
        let admin = actor(Uuid::new_v4(), UserRole::Admin);
        let member = CompanyUser::new(admin.company_id, "luis@bank.com".into(), "Luis".into(), UserRole::User);
        let member_id = member.id;

        let mut users = MockCompanyUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(member.clone())));
        users
            .expect_save()
            .withf(|u| !u.is_active)
            .times(1)
            .returning(|u| Ok(u));

        manager(MockCompanyRepository::new(), users)
            .deactivate_member(&admin, member_id)
            .await
            .unwrap();
    }
}
