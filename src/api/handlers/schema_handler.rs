//! Custom JSON schema handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{CurrentUser, CustomSchema};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

/// Hand-written schema
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddSchemaRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "PaymentOrder")]
    pub name: String,
    pub description: Option<String>,
    /// JSON Schema document
    #[schema(value_type = Object)]
    pub schema: Value,
}

/// Entity to generate a schema for
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateSchemaRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Beneficiary")]
    pub name: String,
    pub description: Option<String>,
}

/// Create schema routes
pub fn schema_routes() -> Router<AppState> {
    Router::new()
        .route("/use-case/:id", get(list_schemas).post(add_schema))
        .route("/use-case/:id/generate", post(generate_schema))
        .route("/use-case/:id/:name", delete(remove_schema))
}

/// Schemas attached to a use case
#[utoipa::path(
    get,
    path = "/schemas/use-case/{id}",
    tag = "Schemas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    responses(
        (status = 200, description = "Schemas", body = [CustomSchema]),
        (status = 404, description = "Use case not found")
    )
)]
pub async fn list_schemas(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<CustomSchema>>>> {
    let schemas = state.schema_service.list(&current_user, id).await?;
    Ok(Json(ApiResponse::success(schemas)))
}

/// Attach a hand-written schema
#[utoipa::path(
    post,
    path = "/schemas/use-case/{id}",
    tag = "Schemas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    request_body = AddSchemaRequest,
    responses(
        (status = 201, description = "Schema attached", body = CustomSchema),
        (status = 400, description = "Schema is not a JSON object"),
        (status = 409, description = "A schema with this name exists")
    )
)]
pub async fn add_schema(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddSchemaRequest>,
) -> AppResult<Created<CustomSchema>> {
    let schema = state
        .schema_service
        .add(&current_user, id, payload.name, payload.description, payload.schema)
        .await?;

    Ok(Created(schema))
}

/// Generate a schema with the AI provider
#[utoipa::path(
    post,
    path = "/schemas/use-case/{id}/generate",
    tag = "Schemas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    request_body = GenerateSchemaRequest,
    responses(
        (status = 201, description = "Schema generated and attached", body = CustomSchema),
        (status = 403, description = "Schema generation disabled for the company"),
        (status = 409, description = "A schema with this name exists"),
        (status = 502, description = "AI provider failed")
    )
)]
pub async fn generate_schema(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<GenerateSchemaRequest>,
) -> AppResult<Created<CustomSchema>> {
    let schema = state
        .schema_service
        .generate(&current_user, id, payload.name, payload.description)
        .await?;

    Ok(Created(schema))
}

/// Remove a schema by name
#[utoipa::path(
    delete,
    path = "/schemas/use-case/{id}/{name}",
    tag = "Schemas",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Use case ID"),
        ("name" = String, Path, description = "Schema name")
    ),
    responses(
        (status = 204, description = "Schema removed"),
        (status = 404, description = "Use case or schema not found")
    )
)]
pub async fn remove_schema(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> AppResult<NoContent> {
    state.schema_service.remove(&current_user, id, &name).await?;
    Ok(NoContent)
}
