//! In-memory fakes shared by the integration tests.
//!
//! They stand in for Postgres, Redis, Google and the AI provider so the
//! services and the router can be exercised end to end.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use bian_cu::config::Config;
use bian_cu::domain::{Company, CompanyUser, CurrentUser, UseCase, UseCaseStatus, UserRole};
use bian_cu::errors::{AppError, AppResult};
use bian_cu::infra::{
    AiClient, CompanyRepository, CompanyUserRepository, GoogleProfile, HealthCheck,
    IdentityProvider, RateLimiter, StateStore, UnitOfWork, UseCaseRepository,
};
use bian_cu::services::Services;
use bian_cu::types::PaginationParams;

pub const JWT_SECRET: &str = "integration-test-secret-with-32-chars!";

pub fn config() -> Config {
    Config::for_secret(JWT_SECRET)
}

// =============================================================================
// Persistence
// =============================================================================

/// Tables kept in process memory
#[derive(Default)]
pub struct MemoryDb {
    companies: Mutex<HashMap<Uuid, Company>>,
    users: Mutex<HashMap<Uuid, CompanyUser>>,
    use_cases: Mutex<Vec<UseCase>>,
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_company(&self, company: Company) -> Company {
        self.companies
            .lock()
            .unwrap()
            .insert(company.id, company.clone());
        company
    }

    pub fn insert_user(&self, user: CompanyUser) -> CompanyUser {
        self.users.lock().unwrap().insert(user.id, user.clone());
        user
    }

    pub fn company_count(&self) -> usize {
        self.companies.lock().unwrap().len()
    }

    /// Change a stored use case behind the services' back
    pub fn edit_use_case(&self, id: Uuid, edit: impl FnOnce(&mut UseCase)) {
        if let Some(use_case) = self.use_cases.lock().unwrap().iter_mut().find(|u| u.id == id) {
            edit(use_case);
        }
    }

    pub fn stored_use_case(&self, id: Uuid) -> Option<UseCase> {
        self.use_cases
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }
}

#[async_trait]
impl CompanyRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        Ok(self.companies.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email_domain(&self, email_domain: &str) -> AppResult<Option<Company>> {
        let companies = self.companies.lock().unwrap();
        let primary = companies.values().find(|c| c.domain == email_domain);
        Ok(primary
            .or_else(|| companies.values().find(|c| c.accepts_domain(email_domain)))
            .cloned())
    }

    async fn create_with_owner(&self, company: Company, owner: CompanyUser) -> AppResult<(Company, CompanyUser)> {
        let company = self.insert_company(company);
        let owner = self.insert_user(owner);
        Ok((company, owner))
    }

    async fn save(&self, company: Company) -> AppResult<Company> {
        let mut companies = self.companies.lock().unwrap();
        if !companies.contains_key(&company.id) {
            return Err(AppError::NotFound);
        }
        companies.insert(company.id, company.clone());
        Ok(company)
    }
}

#[async_trait]
impl CompanyUserRepository for MemoryDb {
    async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> AppResult<Option<CompanyUser>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&id)
            .filter(|u| u.company_id == company_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<CompanyUser>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<CompanyUser>> {
        let mut members: Vec<CompanyUser> = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.company_id == company_id)
            .cloned()
            .collect();
        members.sort_by_key(|u| u.joined_at);
        Ok(members)
    }

    async fn create(&self, user: CompanyUser) -> AppResult<CompanyUser> {
        Ok(self.insert_user(user))
    }

    async fn save(&self, user: CompanyUser) -> AppResult<CompanyUser> {
        Ok(self.insert_user(user))
    }
}

#[async_trait]
impl UseCaseRepository for MemoryDb {
    async fn find_by_id(&self, company_id: Uuid, id: Uuid) -> AppResult<Option<UseCase>> {
        Ok(self
            .stored_use_case(id)
            .filter(|u| u.company_id == company_id))
    }

    async fn list(
        &self,
        company_id: Uuid,
        status: Option<UseCaseStatus>,
        params: &PaginationParams,
    ) -> AppResult<(Vec<UseCase>, u64)> {
        let mut matching: Vec<UseCase> = self
            .use_cases
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.company_id == company_id)
            .filter(|u| status.map_or(true, |s| u.status == s))
            .cloned()
            .collect();
        // insertion order breaks ties between identical timestamps
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Ok((page, total))
    }

    async fn count_by_company(&self, company_id: Uuid) -> AppResult<u64> {
        Ok(self
            .use_cases
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.company_id == company_id)
            .count() as u64)
    }

    async fn create(&self, use_case: UseCase) -> AppResult<UseCase> {
        self.use_cases.lock().unwrap().push(use_case.clone());
        Ok(use_case)
    }

    async fn save(&self, use_case: UseCase) -> AppResult<UseCase> {
        let mut use_cases = self.use_cases.lock().unwrap();
        let slot = use_cases
            .iter_mut()
            .find(|u| u.id == use_case.id)
            .ok_or(AppError::NotFound)?;
        *slot = use_case.clone();
        Ok(use_case)
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut use_cases = self.use_cases.lock().unwrap();
        let before = use_cases.len();
        use_cases.retain(|u| !(u.id == id && u.company_id == company_id));
        if use_cases.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

/// Unit of Work over one `MemoryDb`
pub struct MemoryUow(pub Arc<MemoryDb>);

impl UnitOfWork for MemoryUow {
    fn companies(&self) -> Arc<dyn CompanyRepository> {
        self.0.clone()
    }

    fn users(&self) -> Arc<dyn CompanyUserRepository> {
        self.0.clone()
    }

    fn use_cases(&self) -> Arc<dyn UseCaseRepository> {
        self.0.clone()
    }
}

// =============================================================================
// Outbound clients
// =============================================================================

/// AI provider returning a fixed reply, or failing
pub struct ScriptedAi {
    reply: Option<Value>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedAi {
    pub fn replying(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for ScriptedAi {
    async fn complete(&self, _system: &str, prompt: &str) -> AppResult<Value> {
        self.calls.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| AppError::upstream("provider unavailable"))
    }
}

/// OAuth states kept in a set
#[derive(Default)]
pub struct MemoryStates(Mutex<HashSet<String>>);

impl MemoryStates {
    pub fn issued(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().cloned().collect()
    }
}

#[async_trait]
impl StateStore for MemoryStates {
    async fn put_state(&self, state: &str) -> AppResult<()> {
        self.0.lock().unwrap().insert(state.to_string());
        Ok(())
    }

    async fn take_state(&self, state: &str) -> AppResult<bool> {
        Ok(self.0.lock().unwrap().remove(state))
    }
}

/// Identity provider that signs everyone in as one profile
pub struct FixedIdentity(pub GoogleProfile);

impl FixedIdentity {
    pub fn verified(email: &str, name: &str) -> Arc<Self> {
        Arc::new(Self(GoogleProfile {
            email: email.to_string(),
            email_verified: true,
            name: Some(name.to_string()),
            picture: None,
        }))
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentity {
    fn authorize_url(&self, state: &str) -> AppResult<String> {
        Ok(format!("https://accounts.example/consent?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<GoogleProfile> {
        if code == "good-code" {
            Ok(self.0.clone())
        } else {
            Err(AppError::upstream("invalid_grant"))
        }
    }
}

/// Rate limiter with a fixed allowance per key
pub struct CountingLimiter {
    max: Option<u64>,
    hits: Mutex<HashMap<String, u64>>,
}

impl CountingLimiter {
    pub fn unlimited() -> Arc<Self> {
        Arc::new(Self {
            max: None,
            hits: Mutex::new(HashMap::new()),
        })
    }

    pub fn allowing(max: u64) -> Arc<Self> {
        Arc::new(Self {
            max: Some(max),
            hits: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn hit(&self, identifier: &str, max_requests: u64, _window_seconds: u64) -> AppResult<(u64, bool)> {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(identifier.to_string()).or_insert(0);
        *count += 1;
        let max = self.max.unwrap_or(max_requests);
        Ok((*count, *count <= max))
    }
}

/// Limiter whose counter store is unreachable
pub struct UnreachableLimiter;

#[async_trait]
impl RateLimiter for UnreachableLimiter {
    async fn hit(&self, _identifier: &str, _max_requests: u64, _window_seconds: u64) -> AppResult<(u64, bool)> {
        Err(AppError::internal("redis: connection refused"))
    }
}

/// Probes with a configurable outcome
pub struct StaticHealth {
    pub database_up: bool,
    pub cache_up: bool,
}

#[async_trait]
impl HealthCheck for StaticHealth {
    async fn database(&self) -> AppResult<()> {
        if self.database_up {
            Ok(())
        } else {
            Err(AppError::internal("connection refused"))
        }
    }

    async fn cache(&self) -> AppResult<()> {
        if self.cache_up {
            Ok(())
        } else {
            Err(AppError::internal("connection refused"))
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Everything a test needs to drive the services
pub struct World {
    pub db: Arc<MemoryDb>,
    pub ai: Arc<ScriptedAi>,
    pub states: Arc<MemoryStates>,
    pub services: Services,
}

impl World {
    pub fn new(ai: Arc<ScriptedAi>) -> Self {
        Self::with_identity(ai, FixedIdentity::verified("ana@banco.com", "Ana"))
    }

    pub fn with_identity(ai: Arc<ScriptedAi>, identity: Arc<FixedIdentity>) -> Self {
        let db = MemoryDb::new();
        let states = Arc::new(MemoryStates::default());
        let services = Services::new(
            Arc::new(MemoryUow(db.clone())),
            states.clone(),
            identity,
            ai.clone(),
            config(),
        );
        Self {
            db,
            ai,
            states,
            services,
        }
    }

    /// Services over the same store for a different Google account
    pub fn signing_in_as(&self, identity: Arc<FixedIdentity>) -> Services {
        Services::new(
            Arc::new(MemoryUow(self.db.clone())),
            self.states.clone(),
            identity,
            self.ai.clone(),
            config(),
        )
    }

    /// A company with one member of the given role
    pub fn member(&self, domain: &str, role: UserRole) -> (Company, CurrentUser) {
        let company = self.db.insert_company(Company::new(
            Company::name_from_domain(domain),
            domain.to_string(),
        ));
        let user = self.join(&company, role);
        (company, user)
    }

    /// Add another member to an existing company
    pub fn join(&self, company: &Company, role: UserRole) -> CurrentUser {
        let email = format!("{}@{}", Uuid::new_v4().simple(), company.domain);
        let user = self
            .db
            .insert_user(CompanyUser::new(company.id, email, "Member".into(), role));
        CurrentUser::from(&user)
    }

    /// Replace a company's settings in place
    pub fn configure(&self, company: &Company, edit: impl FnOnce(&mut Company)) {
        let mut updated = company.clone();
        edit(&mut updated);
        self.db.insert_company(updated);
    }
}
