//! Use case handlers: authoring, AI analysis and BIAN selection.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    CurrentUser, NewUseCase, Recommendations, StructuredFields, UpdateUseCase, UseCase, UseCaseFlow,
    UseCaseStatus,
};
use crate::errors::AppResult;
use crate::services::DomainChoice;
use crate::types::{ApiResponse, Created, NoContent, Paginated, PaginationParams};

/// Use case creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUseCaseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    #[schema(example = "Transferencia internacional")]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    #[schema(example = "El cliente ordena un pago a un beneficiario en el extranjero")]
    pub description: String,
    /// Free text as first written; defaults to the description
    pub original_text: Option<String>,
    pub objective: Option<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub flows: Vec<UseCaseFlow>,
    #[serde(default)]
    pub business_rules: Vec<String>,
}

impl From<CreateUseCaseRequest> for NewUseCase {
    fn from(req: CreateUseCaseRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            original_text: req.original_text,
            fields: StructuredFields {
                objective: req.objective,
                actors: req.actors,
                flows: req.flows,
                business_rules: req.business_rules,
            },
        }
    }
}

/// Partial update; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUseCaseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub original_text: Option<String>,
    pub objective: Option<String>,
    pub actors: Option<Vec<String>>,
    pub flows: Option<Vec<UseCaseFlow>>,
    pub business_rules: Option<Vec<String>>,
}

impl From<UpdateUseCaseRequest> for UpdateUseCase {
    fn from(req: UpdateUseCaseRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            original_text: req.original_text,
            objective: req.objective,
            actors: req.actors,
            flows: req.flows,
            business_rules: req.business_rules,
        }
    }
}

/// Optional status filter for the list endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusFilter {
    #[param(example = "draft")]
    pub status: Option<String>,
}

/// Field to improve with AI suggestions
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SuggestionsRequest {
    #[validate(length(min = 1, message = "Field is required"))]
    #[schema(example = "business_rules")]
    pub field: String,
    /// Extra guidance from the analyst
    pub context: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SelectDomainsRequest {
    #[validate(length(min = 1, message = "Select at least one domain"))]
    pub domains: Vec<DomainChoice>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SelectApisRequest {
    #[validate(length(min = 1, message = "Select at least one API"))]
    #[schema(example = json!(["payment-order-initiate"]))]
    pub api_ids: Vec<String>,
}

/// Create use case routes
pub fn use_case_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_use_cases).post(create_use_case))
        .route(
            "/:id",
            get(get_use_case).put(update_use_case).delete(delete_use_case),
        )
        .route("/:id/analyze", post(analyze_use_case))
        .route("/:id/suggestions", post(suggest))
        .route("/:id/recommendations", get(recommendations))
        .route("/:id/domains", post(select_domains))
        .route("/:id/apis", post(select_apis))
}

/// List the company's use cases, newest first
#[utoipa::path(
    get,
    path = "/use-cases",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(StatusFilter, PaginationParams),
    responses(
        (status = 200, description = "Page of use cases with pagination meta", body = [UseCase]),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_use_cases(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<UseCase>>>> {
    let status = filter
        .status
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<UseCaseStatus>())
        .transpose()?;

    let page = state
        .use_case_service
        .list(&current_user, status, &params)
        .await?;

    Ok(Json(ApiResponse::success(page)))
}

/// Create a draft use case
#[utoipa::path(
    post,
    path = "/use-cases",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    request_body = CreateUseCaseRequest,
    responses(
        (status = 201, description = "Use case created", body = UseCase),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Use case quota reached")
    )
)]
pub async fn create_use_case(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUseCaseRequest>,
) -> AppResult<Created<UseCase>> {
    let use_case = state
        .use_case_service
        .create(&current_user, payload.into())
        .await?;

    Ok(Created(use_case))
}

/// Fetch one use case
#[utoipa::path(
    get,
    path = "/use-cases/{id}",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    responses(
        (status = 200, description = "Use case", body = UseCase),
        (status = 404, description = "Use case not found")
    )
)]
pub async fn get_use_case(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UseCase>>> {
    let use_case = state.use_case_service.get(&current_user, id).await?;
    Ok(Json(ApiResponse::success(use_case)))
}

/// Update authored text and structured fields
#[utoipa::path(
    put,
    path = "/use-cases/{id}",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    request_body = UpdateUseCaseRequest,
    responses(
        (status = 200, description = "Use case updated", body = UseCase),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Use case not found")
    )
)]
pub async fn update_use_case(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUseCaseRequest>,
) -> AppResult<Json<ApiResponse<UseCase>>> {
    let use_case = state
        .use_case_service
        .update(&current_user, id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(use_case)))
}

/// Delete a use case (creator only)
#[utoipa::path(
    delete,
    path = "/use-cases/{id}",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    responses(
        (status = 204, description = "Use case deleted"),
        (status = 403, description = "Only the creator may delete"),
        (status = 404, description = "Use case not found")
    )
)]
pub async fn delete_use_case(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.use_case_service.delete(&current_user, id).await?;
    Ok(NoContent)
}

/// Run the AI analysis
#[utoipa::path(
    post,
    path = "/use-cases/{id}/analyze",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    responses(
        (status = 200, description = "Analyzed use case", body = UseCase),
        (status = 403, description = "AI analysis disabled for the company"),
        (status = 502, description = "AI provider failed, status restored")
    )
)]
pub async fn analyze_use_case(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UseCase>>> {
    let use_case = state.use_case_service.analyze(&current_user, id).await?;
    Ok(Json(ApiResponse::with_message(use_case, "Analysis completed")))
}

/// AI suggestions for one field
#[utoipa::path(
    post,
    path = "/use-cases/{id}/suggestions",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    request_body = SuggestionsRequest,
    responses(
        (status = 200, description = "Suggestions as returned by the AI provider"),
        (status = 403, description = "AI analysis disabled for the company"),
        (status = 502, description = "AI provider failed")
    )
)]
pub async fn suggest(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SuggestionsRequest>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let suggestions = state
        .use_case_service
        .suggestions(&current_user, id, &payload.field, payload.context)
        .await?;

    Ok(Json(ApiResponse::success(suggestions)))
}

/// Keyword recommendations from the use case text
#[utoipa::path(
    get,
    path = "/use-cases/{id}/recommendations",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    responses(
        (status = 200, description = "Scored domains and APIs", body = Recommendations),
        (status = 404, description = "Use case not found")
    )
)]
pub async fn recommendations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Recommendations>>> {
    let recs = state
        .use_case_service
        .recommendations(&current_user, id)
        .await?;

    Ok(Json(ApiResponse::success(recs)))
}

/// Tag the use case with BIAN domains
#[utoipa::path(
    post,
    path = "/use-cases/{id}/domains",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    request_body = SelectDomainsRequest,
    responses(
        (status = 200, description = "Domains selected", body = UseCase),
        (status = 400, description = "Empty selection or unknown domain")
    )
)]
pub async fn select_domains(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SelectDomainsRequest>,
) -> AppResult<Json<ApiResponse<UseCase>>> {
    let use_case = state
        .use_case_service
        .select_domains(&current_user, id, payload.domains)
        .await?;

    Ok(Json(ApiResponse::success(use_case)))
}

/// Tag the use case with BIAN APIs
#[utoipa::path(
    post,
    path = "/use-cases/{id}/apis",
    tag = "Use Cases",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    request_body = SelectApisRequest,
    responses(
        (status = 200, description = "APIs selected", body = UseCase),
        (status = 400, description = "Empty selection or unknown API")
    )
)]
pub async fn select_apis(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SelectApisRequest>,
) -> AppResult<Json<ApiResponse<UseCase>>> {
    let use_case = state
        .use_case_service
        .select_apis(&current_user, id, payload.api_ids)
        .await?;

    Ok(Json(ApiResponse::success(use_case)))
}
