//! Company handlers: profile, settings and members.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Company, CompanySettings, CurrentUser, UpdateCompany, UpdateMember, UserResponse, UserRole};
use crate::errors::AppResult;
use crate::services::NewMember;
use crate::types::{ApiResponse, Created, NoContent};

/// Company update request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Banco Ejemplo")]
    pub name: Option<String>,
    /// Replaces the whole settings document
    pub settings: Option<CompanySettings>,
}

/// Member invitation (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddMemberRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "analyst@bancoejemplo.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ana Analyst")]
    pub name: String,
    /// Defaults to `user`
    pub role: Option<UserRole>,
}

/// Create company routes
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(get_company).put(update_company))
        .route("/current/users", get(list_members).post(add_member))
        .route("/current/users/:id", put(update_member).delete(remove_member))
}

/// The caller's company
#[utoipa::path(
    get,
    path = "/companies/current",
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Company profile and settings", body = Company),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_company(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let company = state.company_service.current(&current_user).await?;
    Ok(Json(ApiResponse::success(company)))
}

/// Update company name or settings
#[utoipa::path(
    put,
    path = "/companies/current",
    tag = "Companies",
    security(("bearer_auth" = [])),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn update_company(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateCompanyRequest>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let changes = UpdateCompany {
        name: payload.name,
        settings: payload.settings,
    };
    let company = state.company_service.update(&current_user, changes).await?;
    Ok(Json(ApiResponse::success(company)))
}

/// Members of the caller's company
#[utoipa::path(
    get,
    path = "/companies/current/users",
    tag = "Companies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Members", body = [UserResponse])
    )
)]
pub async fn list_members(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let members = state.company_service.members(&current_user).await?;
    Ok(Json(ApiResponse::success(
        members.into_iter().map(UserResponse::from).collect(),
    )))
}

/// Add a member ahead of their first sign-in
#[utoipa::path(
    post,
    path = "/companies/current/users",
    tag = "Companies",
    security(("bearer_auth" = [])),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = UserResponse),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn add_member(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddMemberRequest>,
) -> AppResult<Created<UserResponse>> {
    let member = NewMember {
        email: payload.email,
        name: payload.name,
        role: payload.role.unwrap_or(UserRole::User),
    };
    let user = state.company_service.add_member(&current_user, member).await?;
    Ok(Created(UserResponse::from(user)))
}

/// Change a member's role or active flag
#[utoipa::path(
    put,
    path = "/companies/current/users/{id}",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Member ID")),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = UserResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update_member(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMember>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .company_service
        .update_member(&current_user, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(UserResponse::from(user))))
}

/// Deactivate a member
#[utoipa::path(
    delete,
    path = "/companies/current/users/{id}",
    tag = "Companies",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deactivated"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn remove_member(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .company_service
        .deactivate_member(&current_user, id)
        .await?;
    Ok(NoContent)
}
