// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::RequireSuperadmin,
    models::tenancy::{CreateTenantPayload, Tenant, TenantStatusPayload, TenantWithAdmin},
};

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenants",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Store and its admin created", body = TenantWithAdmin),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "E-mail, subdomain or username already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state.tenant_service.create_tenant(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenants",
    responses((status = 200, description = "All stores", body = Vec<Tenant>)),
    security(("api_jwt" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
) -> Result<Json<Vec<Tenant>>, AppError> {
    Ok(Json(app_state.tenant_service.list_tenants().await?))
}

// GET /api/tenants/{id}
#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "Tenant id")),
    responses(
        (status = 200, description = "The store", body = Tenant),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tenant(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Tenant>, AppError> {
    Ok(Json(app_state.tenant_service.get_tenant(id).await?))
}

// PATCH /api/tenants/{id}/status
#[utoipa::path(
    patch,
    path = "/api/tenants/{id}/status",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "Tenant id")),
    request_body = TenantStatusPayload,
    responses(
        (status = 200, description = "Store activated or disabled", body = Tenant),
        (status = 409, description = "The default store cannot be disabled")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_tenant_status(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<TenantStatusPayload>,
) -> Result<Json<Tenant>, AppError> {
    let tenant = app_state
        .tenant_service
        .set_tenant_active(id, payload.is_active)
        .await?;
    Ok(Json(tenant))
}

// DELETE /api/tenants/{id}
#[utoipa::path(
    delete,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = Uuid, Path, description = "Tenant id")),
    responses(
        (status = 204, description = "Store and all its data deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "The default store cannot be deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tenant(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.tenant_service.delete_tenant(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
