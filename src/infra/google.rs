//! Google OAuth 2.0 / OpenID Connect client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{
    GoogleSettings, GOOGLE_AUTHORIZE_URL, GOOGLE_OAUTH_SCOPES, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL,
    OAUTH_HTTP_TIMEOUT_SECONDS,
};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Profile returned by the identity provider
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// External identity provider seam.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent screen URL carrying the CSRF `state`
    fn authorize_url(&self, state: &str) -> AppResult<String>;

    /// Exchange an authorization code for the signed-in user's profile
    async fn exchange_code(&self, code: &str) -> AppResult<GoogleProfile>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google implementation backed by reqwest
pub struct GoogleOAuth {
    http: Client,
    settings: GoogleSettings,
}

impl GoogleOAuth {
    pub fn new(settings: GoogleSettings) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(OAUTH_HTTP_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build OAuth HTTP client: {}", e)))?;

        if !settings.is_configured() {
            tracing::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, sign-in is disabled");
        }

        Ok(Self { http, settings })
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.settings.is_configured() {
            Ok(())
        } else {
            Err(AppError::upstream("Google OAuth is not configured"))
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn authorize_url(&self, state: &str) -> AppResult<String> {
        self.ensure_configured()?;
        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&prompt=select_account",
            GOOGLE_AUTHORIZE_URL,
            urlencoding::encode(&self.settings.client_id),
            urlencoding::encode(&self.settings.redirect_uri),
            urlencoding::encode(GOOGLE_OAUTH_SCOPES),
            urlencoding::encode(state)
        ))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<GoogleProfile> {
        self.ensure_configured()?;

        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret()),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.http.post(GOOGLE_TOKEN_URL).form(&params).send().await?;
        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!("Google token exchange failed: {}", detail)));
        }
        let token: TokenResponse = response.json().await?;

        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::upstream(format!(
                "Google userinfo request failed with {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_parameters() {
        let oauth = GoogleOAuth::new(GoogleSettings::new(
            "client-1",
            "secret",
            "http://localhost:3000/auth/google/callback",
        ))
        .unwrap();

        let url = oauth.authorize_url("st ate").unwrap();
        assert!(url.starts_with(GOOGLE_AUTHORIZE_URL));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=st%20ate"));
    }

    #[test]
    fn test_unconfigured_provider_is_rejected() {
        let oauth = GoogleOAuth::new(GoogleSettings::default()).unwrap();
        assert!(matches!(oauth.authorize_url("s"), Err(AppError::Upstream(_))));
    }

    #[test]
    fn test_profile_defaults_unverified() {
        let profile: GoogleProfile =
            serde_json::from_value(serde_json::json!({"email": "a@bank.com"})).unwrap();
        assert!(!profile.email_verified);
        assert!(profile.name.is_none());
    }
}
