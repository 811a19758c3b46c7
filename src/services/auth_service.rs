//! Authentication service - Google sign-in, onboarding and JWT handling.
//!
//! Sign-in is delegated to Google. On first login a member is attached to
//! the company owning their email domain, or a new company is created with
//! the member as its admin.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{is_public_email_domain, Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{email_domain, Company, CompanyUser, CurrentUser, UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{GoogleProfile, IdentityProvider, StateStore, UnitOfWork};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token issued after a successful sign-in
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Outcome of the OAuth callback
#[derive(Debug)]
pub struct LoginResult {
    pub token: TokenResponse,
    pub user: CompanyUser,
    pub company: Company,
    /// Whether onboarding created a new company
    pub company_created: bool,
}

/// The signed-in member and their company
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub company: Company,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Issue a CSRF state and return the provider consent URL
    async fn login_url(&self) -> AppResult<String>;

    /// Handle the provider callback: check state, exchange the code, onboard, sign a token
    async fn login_with_google(&self, code: &str, state: &str) -> AppResult<LoginResult>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Verify a token and resolve the active member behind it
    async fn authenticate(&self, token: &str) -> AppResult<CurrentUser>;

    /// Current member and company
    async fn session(&self, actor: &CurrentUser) -> AppResult<SessionResponse>;
}

/// Generate JWT token for a member
fn generate_token(user: &CompanyUser, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        company_id: user.company_id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    states: Arc<dyn StateStore>,
    identity: Arc<dyn IdentityProvider>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(
        uow: Arc<U>,
        states: Arc<dyn StateStore>,
        identity: Arc<dyn IdentityProvider>,
        config: Config,
    ) -> Self {
        Self {
            uow,
            states,
            identity,
            config,
        }
    }

    /// Find or create the member for a verified Google profile.
    async fn onboard(&self, profile: GoogleProfile) -> AppResult<(CompanyUser, Company, bool)> {
        let email = profile.email.to_lowercase();

        if let Some(mut user) = self.uow.users().find_by_email(&email).await? {
            if !user.is_active {
                tracing::warn!(user_id = %user.id, "Sign-in rejected for deactivated member");
                return Err(AppError::AccountDisabled);
            }
            user.record_login(profile.name, profile.picture);
            let user = self.uow.users().save(user).await?;
            let company = self
                .uow
                .companies()
                .find_by_id(user.company_id)
                .await?
                .ok_or_else(|| AppError::internal(format!("Member {} has no company", user.id)))?;
            return Ok((user, company, false));
        }

        let domain = email_domain(&email)
            .ok_or_else(|| AppError::validation("Google account has no usable email address"))?;
        let name = profile
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        // public mailboxes get a personal company keyed by the full address
        let company = if is_public_email_domain(&domain) {
            Company::new(name.clone(), email.clone())
        } else {
            if let Some(company) = self.uow.companies().find_by_email_domain(&domain).await? {
                let mut user = CompanyUser::new(company.id, email, name, UserRole::User);
                user.record_login(None, profile.picture);
                let user = self.uow.users().create(user).await?;
                tracing::info!(user_id = %user.id, company_id = %company.id, "Member joined existing company");
                return Ok((user, company, false));
            }
            Company::new(Company::name_from_domain(&domain), domain)
        };

        let mut owner = CompanyUser::new(company.id, email, name, UserRole::Admin);
        owner.record_login(None, profile.picture);
        let (company, owner) = self.uow.companies().create_with_owner(company, owner).await?;
        tracing::info!(user_id = %owner.id, company_id = %company.id, domain = %company.domain, "Company created on first sign-in");

        Ok((owner, company, true))
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login_url(&self) -> AppResult<String> {
        let state = Uuid::new_v4().simple().to_string();
        let url = self.identity.authorize_url(&state)?;
        self.states.put_state(&state).await?;
        Ok(url)
    }

    async fn login_with_google(&self, code: &str, state: &str) -> AppResult<LoginResult> {
        if state.is_empty() || !self.states.take_state(state).await? {
            tracing::warn!("OAuth callback with unknown or expired state");
            return Err(AppError::BadRequest("Invalid or expired OAuth state".to_string()));
        }
        if code.is_empty() {
            return Err(AppError::BadRequest("Missing authorization code".to_string()));
        }

        let profile = self.identity.exchange_code(code).await?;
        if !profile.email_verified {
            return Err(AppError::Unauthorized);
        }

        let (user, company, company_created) = self.onboard(profile).await?;
        let token = generate_token(&user, &self.config)?;
        tracing::info!(user_id = %user.id, company_id = %company.id, "Signed in with Google");

        Ok(LoginResult {
            token,
            user,
            company,
            company_created,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn authenticate(&self, token: &str) -> AppResult<CurrentUser> {
        let claims = self.verify_token(token)?;
        let user = self
            .uow
            .users()
            .find_by_id(claims.company_id, claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        Ok(CurrentUser::from(&user))
    }

    async fn session(&self, actor: &CurrentUser) -> AppResult<SessionResponse> {
        let users = self.uow.users();
        let companies = self.uow.companies();
        let (user, company) = futures::future::try_join(
            users.find_by_id(actor.company_id, actor.id),
            companies.find_by_id(actor.company_id),
        )
        .await?;
        let user = user.ok_or(AppError::Unauthorized)?;
        let company = company.ok_or(AppError::NotFound)?;

        Ok(SessionResponse {
            user: user.into(),
            company,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::cache::MockStateStore;
    use crate::infra::google::MockIdentityProvider;
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
            unreachable!("auth never touches use cases")
        }
    }

    fn profile(email: &str) -> GoogleProfile {
        GoogleProfile {
            email: email.to_string(),
            email_verified: true,
            name: Some("Ana".into()),
            picture: None,
        }
    }

    fn service(
        companies: MockCompanyRepository,
        users: MockCompanyUserRepository,
        identity: MockIdentityProvider,
        states: MockStateStore,
    ) -> Authenticator<MockUow> {
        let uow = Arc::new(MockUow {
            companies: Arc::new(companies),
            users: Arc::new(users),
        });
        Authenticator::new(
            uow,
            Arc::new(states),
            Arc::new(identity),
            Config::for_secret("test-secret-key-minimum-32-chars!!"),
        )
    }

    fn valid_state() -> MockStateStore {
        let mut states = MockStateStore::new();
        states.expect_take_state().returning(|_| Ok(true));
        states
    }

    #[tokio::test]
    async fn test_first_login_creates_company_with_admin() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_exchange_code()
            .returning(|_| Ok(profile("ana@banco-sur.com")));

        let mut users = MockCompanyUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let mut companies = MockCompanyRepository::new();
        companies.expect_find_by_email_domain().returning(|_| Ok(None));
        companies
            .expect_create_with_owner()
            .withf(|company, owner| company.name == "Banco Sur" && owner.role == UserRole::Admin)
            .returning(|company, owner| Ok((company, owner)));

        let auth = service(companies, users, identity, valid_state());
        let result = auth.login_with_google("code", "state").await.unwrap();

        assert!(result.company_created);
        assert_eq!(result.company.domain, "banco-sur.com");
        assert_eq!(result.user.company_id, result.company.id);

        let claims = auth.verify_token(&result.token.access_token).unwrap();
        assert_eq!(claims.sub, result.user.id);
        assert_eq!(claims.company_id, result.company.id);
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn test_login_joins_company_with_matching_domain() {
        let existing = Company::new("Banco Sur".into(), "banco-sur.com".into());
        let company_id = existing.id;

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_exchange_code()
            .returning(|_| Ok(profile("luis@banco-sur.com")));

        let mut users = MockCompanyUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(move |u| u.company_id == company_id && u.role == UserRole::User)
            .returning(Ok);

        let mut companies = MockCompanyRepository::new();
        companies
            .expect_find_by_email_domain()
            .returning(move |_| Ok(Some(existing.clone())));
        companies.expect_create_with_owner().never();

        let auth = service(companies, users, identity, valid_state());
        let result = auth.login_with_google("code", "state").await.unwrap();
        assert!(!result.company_created);
        assert_eq!(result.user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_public_mailbox_gets_personal_company() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_exchange_code()
            .returning(|_| Ok(profile("Ana.Perez@Gmail.com")));

        let mut users = MockCompanyUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().never();

        let mut companies = MockCompanyRepository::new();
        companies.expect_find_by_email_domain().never();
        companies
            .expect_create_with_owner()
            .withf(|company, owner| company.domain == "ana.perez@gmail.com" && owner.role == UserRole::Admin)
            .returning(|company, owner| Ok((company, owner)));

        let auth = service(companies, users, identity, valid_state());
        let result = auth.login_with_google("code", "state").await.unwrap();
        assert!(result.company_created);
        assert_eq!(result.company.name, "Ana");
    }

    #[tokio::test]
    async fn test_deactivated_member_cannot_sign_in() {
        let mut member = CompanyUser::new(Uuid::new_v4(), "ana@bank.com".into(), "Ana".into(), UserRole::User);
        member.is_active = false;

        let mut identity = MockIdentityProvider::new();
        identity.expect_exchange_code().returning(|_| Ok(profile("ana@bank.com")));

        let mut users = MockCompanyUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(member.clone())));
        users.expect_save().never();

        let auth = service(MockCompanyRepository::new(), users, identity, valid_state());
        let err = auth.login_with_google("code", "state").await.unwrap_err();
        assert!(matches!(err, AppError::AccountDisabled));
    }

    #[tokio::test]
    async fn test_unknown_state_is_rejected_before_exchange() {
        let mut states = MockStateStore::new();
        states.expect_take_state().returning(|_| Ok(false));
        let mut identity = MockIdentityProvider::new();
        identity.expect_exchange_code().never();

        let auth = service(
            MockCompanyRepository::new(),
            MockCompanyUserRepository::new(),
            identity,
            states,
        );
        let err = auth.login_with_google("code", "forged").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_login_url_stores_state() {
        let mut states = MockStateStore::new();
        states.expect_put_state().times(1).returning(|_| Ok(()));
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_authorize_url()
            .returning(|state| Ok(format!("https://accounts.example/auth?state={}", state)));

        let auth = service(
            MockCompanyRepository::new(),
            MockCompanyUserRepository::new(),
            identity,
            states,
        );
        let url = auth.login_url().await.unwrap();
        assert!(url.contains("state="));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_deactivated_member() {
        let mut member = CompanyUser::new(Uuid::new_v4(), "ana@bank.com".into(), "Ana".into(), UserRole::Admin);
        let config = Config::for_secret("test-secret-key-minimum-32-chars!!");
        let token = generate_token(&member, &config).unwrap().access_token;
        member.is_active = false;

        let mut users = MockCompanyUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(member.clone())));

        let auth = service(
            MockCompanyRepository::new(),
            users,
            MockIdentityProvider::new(),
            MockStateStore::new(),
        );
        assert!(matches!(auth.authenticate(&token).await, Err(AppError::AccountDisabled)));
        assert!(auth.verify_token("not-a-jwt").is_err());
    }
}
