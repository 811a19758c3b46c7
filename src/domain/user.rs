//! Company member entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_USER};
use crate::errors::{AppError, AppResult};

/// Role of a member inside their company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// A person signed in through Google who belongs to exactly one company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyUser {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl CompanyUser {
    /// Create a new active member
    pub fn new(company_id: Uuid, email: String, name: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            email: email.to_lowercase(),
            name,
            picture: None,
            role,
            is_active: true,
            joined_at: Utc::now(),
            last_login: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Record a successful sign-in, refreshing the profile from the identity provider
    pub fn record_login(&mut self, name: Option<String>, picture: Option<String>) {
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            self.name = name;
        }
        if picture.is_some() {
            self.picture = picture;
        }
        self.last_login = Some(Utc::now());
    }
}

/// Authenticated member on whose behalf a request runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Forbidden unless the member is a company admin
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl From<&CompanyUser> for CurrentUser {
    fn from(user: &CompanyUser) -> Self {
        Self {
            id: user.id,
            company_id: user.company_id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Changes an admin may apply to a member
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMember {
    #[schema(example = "admin")]
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Member as returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "analyst@bank.com")]
    pub email: String,
    #[schema(example = "Ana Analyst")]
    pub name: String,
    pub picture: Option<String>,
    #[schema(example = "user")]
    pub role: String,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<CompanyUser> for UserResponse {
    fn from(user: CompanyUser) -> Self {
        Self {
            id: user.id,
            company_id: user.company_id,
            email: user.email,
            name: user.name,
            picture: user.picture,
            role: user.role.to_string(),
            is_active: user.is_active,
            joined_at: user.joined_at,
            last_login: user.last_login,
        }
    }
}

/// Extract the domain part of an email address, lowercased
pub fn email_domain(email: &str) -> Option<String> {
    let (local, domain) = email.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return None;
    }
    Some(domain.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("Ana@Bank.COM"), Some("bank.com".to_string()));
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("@bank.com"), None);
        assert_eq!(email_domain("ana@localhost"), None);
    }

    #[test]
    fn test_new_member_email_is_normalized() {
        let user = CompanyUser::new(Uuid::new_v4(), "Ana@Bank.com".into(), "Ana".into(), UserRole::User);
        assert_eq!(user.email, "ana@bank.com");
        assert!(user.is_active);
        assert!(user.last_login.is_none());
    }

    #[test]
    fn test_record_login_keeps_name_when_blank() {
        let mut user = CompanyUser::new(Uuid::new_v4(), "a@b.com".into(), "Ana".into(), UserRole::User);
        user.record_login(Some("  ".into()), Some("https://img".into()));
        assert_eq!(user.name, "Ana");
        assert_eq!(user.picture.as_deref(), Some("https://img"));
        assert!(user.last_login.is_some());
    }
}
