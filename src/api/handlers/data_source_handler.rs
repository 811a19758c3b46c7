//! Data source handlers.

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
use crate::domain::{CurrentUser, DataSource, DataSourceType};
use crate::errors::AppResult;
use crate::services::ValidationReport;
use crate::types::{ApiResponse, Created, NoContent};

/// Data source registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddDataSourceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "core-banking")]
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    /// Connection settings; required keys depend on the type
    #[schema(value_type = Object, example = json!({"host": "db.internal", "database": "core"}))]
    pub config: Value,
}

/// Create data source routes
pub fn data_source_routes() -> Router<AppState> {
    Router::new()
        .route("/use-case/:id", get(list_data_sources).post(add_data_source))
        .route("/use-case/:id/:name/validate", post(validate_data_source))
        .route("/use-case/:id/:name", delete(remove_data_source))
}

/// Data sources of a use case
#[utoipa::path(
    get,
    path = "/data-sources/use-case/{id}",
    tag = "Data Sources",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    responses(
        (status = 200, description = "Data sources", body = [DataSource]),
        (status = 404, description = "Use case not found")
    )
)]
pub async fn list_data_sources(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<DataSource>>>> {
    let sources = state.data_source_service.list(&current_user, id).await?;
    Ok(Json(ApiResponse::success(sources)))
}

/// Register a data source
#[utoipa::path(
    post,
    path = "/data-sources/use-case/{id}",
    tag = "Data Sources",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Use case ID")),
    request_body = AddDataSourceRequest,
    responses(
        (status = 201, description = "Data source added", body = DataSource),
        (status = 403, description = "Data sources disabled for the company"),
        (status = 409, description = "A data source with this name exists")
    )
)]
pub async fn add_data_source(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddDataSourceRequest>,
) -> AppResult<Created<DataSource>> {
    let source = state
        .data_source_service
        .add(&current_user, id, payload.name, payload.source_type, payload.config)
        .await?;

    Ok(Created(source))
}

/// Check a data source's connection settings
#[utoipa::path(
    post,
    path = "/data-sources/use-case/{id}/{name}/validate",
    tag = "Data Sources",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Use case ID"),
        ("name" = String, Path, description = "Data source name")
    ),
    responses(
        (status = 200, description = "Validation outcome", body = ValidationReport),
        (status = 404, description = "Use case or data source not found")
    )
)]
pub async fn validate_data_source(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> AppResult<Json<ApiResponse<ValidationReport>>> {
    let report = state
        .data_source_service
        .validate(&current_user, id, &name)
        .await?;

    Ok(Json(ApiResponse::success(report)))
}

/// Remove a data source by name
#[utoipa::path(
    delete,
    path = "/data-sources/use-case/{id}/{name}",
    tag = "Data Sources",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Use case ID"),
        ("name" = String, Path, description = "Data source name")
    ),
    responses(
        (status = 204, description = "Data source removed"),
        (status = 404, description = "Use case or data source not found")
    )
)]
pub async fn remove_data_source(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> AppResult<NoContent> {
    state
        .data_source_service
        .remove(&current_user, id, &name)
        .await?;
    Ok(NoContent)
}
