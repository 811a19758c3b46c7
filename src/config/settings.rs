//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_AI_API_URL, DEFAULT_AI_MODEL, DEFAULT_AI_TIMEOUT_SECONDS, DEFAULT_DATABASE_URL,
    DEFAULT_FRONTEND_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Google OAuth client registration
#[derive(Clone, Default)]
pub struct GoogleSettings {
    pub client_id: String,
    client_secret: String,
    pub redirect_uri: String,
}

impl GoogleSettings {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// OAuth is usable only when the client is registered.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// External LLM provider settings
#[derive(Clone)]
pub struct AiSettings {
    pub api_url: String,
    api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl AiSettings {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key,
            model: model.into(),
            timeout_seconds: DEFAULT_AI_TIMEOUT_SECONDS,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub frontend_url: String,
    pub google: GoogleSettings,
    pub ai: AiSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("frontend_url", &self.frontend_url)
            .field("google_client_id", &self.google.client_id)
            .field("google_client_secret", &"[REDACTED]")
            .field("ai_api_url", &self.ai.api_url)
            .field("ai_api_key", &"[REDACTED]")
            .field("ai_model", &self.ai.model)
            .field("ai_timeout_seconds", &self.ai.timeout_seconds)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let google = GoogleSettings::new(
            env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
                format!(
                    "http://localhost:{}/auth/google/callback",
                    DEFAULT_SERVER_PORT
                )
            }),
        );
        if !google.is_configured() {
            tracing::warn!("Google OAuth client not configured, login will be unavailable");
        }

        let mut ai = AiSettings::new(
            env::var("AI_API_URL").unwrap_or_else(|_| DEFAULT_AI_API_URL.to_string()),
            env::var("AI_API_KEY").ok().filter(|k| !k.is_empty()),
            env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
        );
        ai.timeout_seconds = env::var("AI_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_AI_TIMEOUT_SECONDS);
        if ai.api_key().is_none() {
            tracing::warn!("AI_API_KEY not set, AI features will report the provider as unavailable");
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            frontend_url: env::var("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            google,
            ai,
        }
    }

    /// Build a configuration for tests and tooling without touching the environment.
    pub fn for_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            google: GoogleSettings::default(),
            ai: AiSettings::new(DEFAULT_AI_API_URL, None, DEFAULT_AI_MODEL),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Front-end page that receives the session token after login.
    pub fn login_redirect_url(&self) -> String {
        format!("{}/auth/callback", self.frontend_url)
    }
}
