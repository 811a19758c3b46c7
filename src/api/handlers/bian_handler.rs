//! BIAN catalog handlers.

use axum::{
    extract::Query,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{bian, BianApi, BianDomain, Recommendations};
use crate::errors::{AppError, AppResult};
use crate::types::ApiResponse;

/// Catalog domain as returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainResponse {
    #[schema(example = "payment-order")]
    pub id: String,
    #[schema(example = "Payment Order")]
    pub name: String,
    pub business_area: String,
    pub description: String,
}

impl From<&BianDomain> for DomainResponse {
    fn from(domain: &BianDomain) -> Self {
        Self {
            id: domain.id.to_string(),
            name: domain.name.to_string(),
            business_area: domain.business_area.to_string(),
            description: domain.description.to_string(),
        }
    }
}

/// Catalog API as returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogApiResponse {
    pub id: String,
    pub domain_id: String,
    pub name: String,
    #[schema(example = "POST")]
    pub method: String,
    pub path: String,
    pub description: String,
}

impl From<&BianApi> for CatalogApiResponse {
    fn from(api: &BianApi) -> Self {
        Self {
            id: api.id.to_string(),
            domain_id: api.domain_id.to_string(),
            name: api.name.to_string(),
            method: api.method.to_string(),
            path: api.path.to_string(),
            description: api.description.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ApiFilter {
    /// Restrict to one domain
    pub domain_id: Option<String>,
}

/// Free text to score against the catalog
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecommendationRequest {
    #[validate(length(min = 1, message = "Text is required"))]
    #[schema(example = "El cliente realiza un pago con tarjeta")]
    pub text: String,
    /// Score APIs of these domains only
    #[serde(default)]
    pub domain_ids: Vec<String>,
}

/// Create BIAN catalog routes
pub fn bian_routes() -> Router<AppState> {
    Router::new()
        .route("/domains", get(list_domains))
        .route("/apis", get(list_apis))
        .route("/recommendations", post(recommend))
}

/// List catalog domains
#[utoipa::path(
    get,
    path = "/bian/domains",
    tag = "BIAN",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Service domains", body = [DomainResponse])
    )
)]
pub async fn list_domains() -> Json<ApiResponse<Vec<DomainResponse>>> {
    let domains = bian::domains().iter().map(DomainResponse::from).collect();
    Json(ApiResponse::success(domains))
}

/// List catalog APIs
#[utoipa::path(
    get,
    path = "/bian/apis",
    tag = "BIAN",
    security(("bearer_auth" = [])),
    params(ApiFilter),
    responses(
        (status = 200, description = "Service operation APIs", body = [CatalogApiResponse]),
        (status = 404, description = "Unknown domain")
    )
)]
pub async fn list_apis(Query(filter): Query<ApiFilter>) -> AppResult<Json<ApiResponse<Vec<CatalogApiResponse>>>> {
    let apis: Vec<CatalogApiResponse> = match filter.domain_id.as_deref() {
        Some(domain_id) => {
            bian::find_domain(domain_id).ok_or(AppError::NotFound)?;
            bian::apis_for_domain(domain_id)
                .into_iter()
                .map(CatalogApiResponse::from)
                .collect()
        }
        None => bian::apis().iter().map(CatalogApiResponse::from).collect(),
    };

    Ok(Json(ApiResponse::success(apis)))
}

/// Recommend domains and APIs for arbitrary text
#[utoipa::path(
    post,
    path = "/bian/recommendations",
    tag = "BIAN",
    security(("bearer_auth" = [])),
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Scored domains and APIs", body = Recommendations),
        (status = 400, description = "Validation error")
    )
)]
pub async fn recommend(
    ValidatedJson(payload): ValidatedJson<RecommendationRequest>,
) -> Json<ApiResponse<Recommendations>> {
    Json(ApiResponse::success(bian::recommend(
        &payload.text,
        &payload.domain_ids,
    )))
}
