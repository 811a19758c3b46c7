//! Authentication handlers.

use axum::{
    extract::{Extension, Query, State},
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::AppState;
use crate::domain::CurrentUser;
use crate::errors::{AppError, AppResult};
use crate::services::SessionResponse;
use crate::types::ApiResponse;

/// Query string Google sends back to the callback
#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    /// Authorization code
    pub code: Option<String>,
    /// CSRF state issued by `/auth/google`
    pub state: Option<String>,
    /// Set when the user declined consent
    pub error: Option<String>,
}

/// Public sign-in routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google", get(google_login))
        .route("/google/callback", get(google_callback))
}

/// Routes that need a signed-in member
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}

/// Start Google sign-in
#[utoipa::path(
    get,
    path = "/auth/google",
    tag = "Authentication",
    responses(
        (status = 307, description = "Redirect to the Google consent screen"),
        (status = 502, description = "Google OAuth is not configured")
    )
)]
pub async fn google_login(State(state): State<AppState>) -> AppResult<Redirect> {
    let url = state.auth_service.login_url().await?;
    Ok(Redirect::temporary(&url))
}

/// Google OAuth callback.
///
/// Always answers with a redirect to the front end, carrying either the
/// session token or an error code.
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "Authentication",
    params(CallbackQuery),
    responses(
        (status = 307, description = "Redirect to the front end with `token` or `error`")
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let result = match (query.error, query.code, query.state) {
        (Some(error), _, _) => {
            tracing::info!(error = %error, "Google sign-in declined");
            Err(AppError::Unauthorized)
        }
        (None, Some(code), Some(oauth_state)) => {
            state.auth_service.login_with_google(&code, &oauth_state).await
        }
        _ => Err(AppError::BadRequest("Missing code or state".into())),
    };

    let target = match result {
        Ok(login) => {
            tracing::info!(
                user_id = %login.user.id,
                company_id = %login.company.id,
                company_created = login.company_created,
                "Google sign-in completed"
            );
            format!(
                "{}?token={}",
                state.login_redirect_url,
                urlencoding::encode(&login.token.access_token)
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Google sign-in failed");
            format!("{}?error={}", state.login_redirect_url, e.code().to_lowercase())
        }
    };

    Redirect::temporary(&target)
}

/// Current member and company
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed-in member and company", body = SessionResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let session = state.auth_service.session(&current_user).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// Sign out.
///
/// Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(Extension(current_user): Extension<CurrentUser>) -> Json<ApiResponse<()>> {
    tracing::info!(user_id = %current_user.id, "Member logged out");
    Json(ApiResponse::message("Logged out"))
}
