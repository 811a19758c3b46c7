//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::AppError;

/// JWT authentication middleware.
///
/// Extracts the bearer token, resolves the active member behind it and
/// injects the `CurrentUser` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let current_user = state.auth_service.authenticate(&token).await?;
    tracing::debug!(user_id = %current_user.id, company_id = %current_user.company_id, "Request authenticated");

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header: &str) -> Request {
        axum::http::Request::builder()
            .header(AUTHORIZATION, header)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        assert_eq!(bearer_token(&request_with("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn test_other_schemes_are_ignored() {
        assert_eq!(bearer_token(&request_with("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&request_with("Bearer ")), None);
    }
}
