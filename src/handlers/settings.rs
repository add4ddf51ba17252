// src/handlers/settings.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{RequireAdmin, RequireCashier},
        tenancy::TenantContext,
    },
    models::tenancy::{HardwareSettings, Tenant, TenantInfo},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Store details and hardware settings", body = Tenant)),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
) -> Result<Json<Tenant>, AppError> {
    Ok(Json(app_state.tenant_service.get_settings(tenant.0).await?))
}

// PUT /api/settings/store
#[utoipa::path(
    put,
    path = "/api/settings/store",
    tag = "Settings",
    request_body = TenantInfo,
    responses(
        (status = 200, description = "Store details updated", body = Tenant),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "E-mail already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_store_info(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    tenant: TenantContext,
    Json(payload): Json<TenantInfo>,
) -> Result<Json<Tenant>, AppError> {
    let updated = app_state
        .tenant_service
        .update_tenant_info(tenant.0, payload)
        .await?;
    Ok(Json(updated))
}

// PUT /api/settings/hardware
#[utoipa::path(
    put,
    path = "/api/settings/hardware",
    tag = "Settings",
    request_body = HardwareSettings,
    responses(
        (status = 200, description = "Hardware settings updated", body = Tenant),
        (status = 400, description = "Port or paper width out of range")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_hardware_settings(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    tenant: TenantContext,
    Json(payload): Json<HardwareSettings>,
) -> Result<Json<Tenant>, AppError> {
    let updated = app_state
        .tenant_service
        .update_hardware_settings(tenant.0, payload)
        .await?;
    Ok(Json(updated))
}
