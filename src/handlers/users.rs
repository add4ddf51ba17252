// src/handlers/users.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{rbac::RequireAdmin, tenancy::TenantContext},
    models::auth::{CreateUserPayload, User},
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Users of the caller's store", body = Vec<User>),
        (status = 403, description = "Admin role required")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    tenant: TenantContext,
) -> Result<Json<Vec<User>>, AppError> {
    let users = app_state.tenant_service.list_users(tenant.0).await?;
    Ok(Json(users))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "Username or e-mail already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    tenant: TenantContext,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.tenant_service.create_user(tenant.0, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
