//! Router-level tests.
//!
//! The full axum router runs against in-memory fakes, so no database,
//! Redis, Google or AI provider is needed.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use bian_cu::api::{create_router, AppState};
use bian_cu::domain::{CurrentUser, UserRole};
use bian_cu::infra::RateLimiter;
use bian_cu::services::Claims;

use common::{config, CountingLimiter, ScriptedAi, StaticHealth, UnreachableLimiter, World, JWT_SECRET};

fn app(world: &World) -> Router {
    app_with(world, CountingLimiter::unlimited(), true)
}

fn app_with(world: &World, limiter: Arc<dyn RateLimiter>, database_up: bool) -> Router {
    let health = Arc::new(StaticHealth {
        database_up,
        cache_up: true,
    });
    create_router(AppState::new(&world.services, limiter, health, &config()))
}

fn token_for(user: &CurrentUser) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        company_id: user.company_id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn location(response: &axum::response::Response) -> String {
    response.headers()[header::LOCATION].to_str().unwrap().to_string()
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let world = World::new(ScriptedAi::failing());

    let response = app(&world).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = call(&app(&world), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let degraded = app_with(&world, CountingLimiter::unlimited(), false);
    let (status, body) = call(&degraded, get("/health", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
    assert_eq!(body["services"]["redis"]["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let world = World::new(ScriptedAi::failing());
    let (status, body) = call(&app(&world), get("/api-docs/openapi.json", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/use-cases"].is_object());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let world = World::new(ScriptedAi::failing());

    let (status, body) = call(&app(&world), get("/use-cases", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = call(&app(&world), get("/bian/domains", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_google_sign_in_creates_company_and_redirects_with_token() {
    let world = World::new(ScriptedAi::failing());
    let router = app(&world);

    let response = router.clone().oneshot(get("/auth/google", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let states = world.states.issued();
    assert_eq!(states.len(), 1);
    assert!(location(&response).contains(&states[0]));

    let callback = format!("/auth/google/callback?code=good-code&state={}", states[0]);
    let response = router.clone().oneshot(get(&callback, None)).await.unwrap();
    let target = location(&response);
    let prefix = format!("{}?token=", config().login_redirect_url());
    assert!(target.starts_with(&prefix), "{}", target);
    assert_eq!(world.db.company_count(), 1);

    let token = target.trim_start_matches(&prefix).to_string();
    let (status, body) = call(&router, get("/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "ana@banco.com");
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["company"]["domain"], "banco.com");

    // the state is single use
    let response = router.oneshot(get(&callback, None)).await.unwrap();
    assert!(location(&response).ends_with("?error=bad_request"));
}

#[tokio::test]
async fn test_declined_consent_redirects_with_error() {
    let world = World::new(ScriptedAi::failing());

    let response = app(&world)
        .oneshot(get("/auth/google/callback?error=access_denied", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(location(&response).ends_with("?error=unauthorized"));
}

#[tokio::test]
async fn test_deactivated_member_is_rejected() {
    let world = World::new(ScriptedAi::failing());
    let (company, admin) = world.member("banco.com", UserRole::Admin);
    let luis = world.join(&company, UserRole::User);
    let router = app(&world);

    let (status, _) = call(
        &router,
        Request::builder()
            .method("DELETE")
            .uri(format!("/companies/current/users/{}", luis.id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token_for(&admin)))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&router, get("/use-cases", Some(&token_for(&luis)))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ACCOUNT_DISABLED");
}

// =============================================================================
// Use cases
// =============================================================================

#[tokio::test]
async fn test_create_list_and_fetch_use_case() {
    let world = World::new(ScriptedAi::failing());
    let (_, ana) = world.member("banco.com", UserRole::User);
    let token = token_for(&ana);
    let router = app(&world);

    let (status, body) = call(
        &router,
        send_json(
            "POST",
            "/use-cases",
            &token,
            json!({"title": "Transferencia", "description": "El cliente ordena un pago", "actors": ["Cliente"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "draft");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&router, get("/use-cases?status=draft&per_page=5", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["meta"]["total"], 1);
    assert_eq!(body["data"]["meta"]["per_page"], 5);
    assert_eq!(body["data"]["items"][0]["id"], id.as_str());

    let (status, body) = call(&router, get(&format!("/use-cases/{}", id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fields"]["actors"], json!(["Cliente"]));

    let (status, body) = call(&router, get("/use-cases?status=archived", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_payloads_are_rejected() {
    let world = World::new(ScriptedAi::failing());
    let (_, ana) = world.member("banco.com", UserRole::User);
    let token = token_for(&ana);
    let router = app(&world);

    let (status, body) = call(
        &router,
        send_json("POST", "/use-cases", &token, json!({"title": "", "description": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, created) = call(
        &router,
        send_json("POST", "/use-cases", &token, json!({"title": "Pago", "description": "Pago"})),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = call(
        &router,
        send_json("POST", &format!("/use-cases/{}/domains", id), &token, json!({"domains": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Select at least one domain");
}

#[tokio::test]
async fn test_analysis_failure_is_reported_as_upstream() {
    let world = World::new(ScriptedAi::failing());
    let (_, ana) = world.member("banco.com", UserRole::User);
    let token = token_for(&ana);
    let router = app(&world);

    let (_, created) = call(
        &router,
        send_json("POST", "/use-cases", &token, json!({"title": "Pago", "description": "Pago"})),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = call(
        &router,
        send_json("POST", &format!("/use-cases/{}/analyze", id), &token, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");

    let (_, fetched) = call(&router, get(&format!("/use-cases/{}", id), Some(&token))).await;
    assert_eq!(fetched["data"]["status"], "draft");
}

// =============================================================================
// Catalog, companies and rate limiting
// =============================================================================

#[tokio::test]
async fn test_bian_catalog_endpoints() {
    let world = World::new(ScriptedAi::failing());
    let (_, ana) = world.member("banco.com", UserRole::User);
    let token = token_for(&ana);
    let router = app(&world);

    let (status, body) = call(&router, get("/bian/apis?domain_id=payment-order", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let apis = body["data"].as_array().unwrap();
    assert!(!apis.is_empty());
    assert!(apis.iter().all(|a| a["domain_id"] == "payment-order"));

    let (status, _) = call(&router, get("/bian/apis?domain_id=nope", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &router,
        send_json("POST", "/bian/recommendations", &token, json!({"text": "Detectar fraude en pagos"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["domains"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_company_settings_are_admin_only() {
    let world = World::new(ScriptedAi::failing());
    let (company, admin) = world.member("banco.com", UserRole::Admin);
    let ana = world.join(&company, UserRole::User);
    let router = app(&world);
    let change = json!({"settings": {"max_use_cases": 5, "allowed_domains": ["Banco-Group.com"]}});

    let (status, _) = call(&router, send_json("PUT", "/companies/current", &token_for(&ana), change.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&router, send_json("PUT", "/companies/current", &token_for(&admin), change)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settings"]["max_use_cases"], 5);
    assert_eq!(body["data"]["settings"]["allowed_domains"], json!(["banco-group.com"]));
    assert_eq!(body["data"]["settings"]["features"]["ai_analysis"], true);

    let (status, body) = call(&router, get("/companies/current/users", Some(&token_for(&ana)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let world = World::new(ScriptedAi::failing());
    let (_, ana) = world.member("banco.com", UserRole::User);
    let token = token_for(&ana);
    let router = app_with(&world, CountingLimiter::allowing(1), true);

    let (status, _) = call(&router, get("/bian/domains", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let response = router.oneshot(get("/bian/domains", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));
}

#[tokio::test]
async fn test_rate_limit_denies_when_counter_store_is_down() {
    let world = World::new(ScriptedAi::failing());
    let (_, ana) = world.member("banco.com", UserRole::User);
    let router = app_with(&world, Arc::new(UnreachableLimiter), true);

    let response = router
        .clone()
        .oneshot(get("/bian/domains", Some(&token_for(&ana))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));

    let response = router.clone().oneshot(get("/auth/google", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));
    assert!(world.states.issued().is_empty());

    let (status, body) = call(&router, get("/use-cases", Some(&token_for(&ana)))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");
}
