// src/handlers/crm.rs

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
    middleware::{
        rbac::{RequireCashier, RequireManager},
        tenancy::TenantContext,
    },
    models::crm::{Customer, CustomerFields, CustomerWithStats},
};

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses((status = 200, description = "Customers with their purchase totals", body = Vec<CustomerWithStats>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
) -> Result<Json<Vec<CustomerWithStats>>, AppError> {
    Ok(Json(app_state.crm_service.list_customers(tenant.0).await?))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer", body = CustomerWithStats),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerWithStats>, AppError> {
    Ok(Json(app_state.crm_service.get_customer(tenant.0, id).await?))
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CustomerFields,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
    Json(payload): Json<CustomerFields>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.crm_service.create_customer(tenant.0, payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    request_body = CustomerFields,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerFields>,
) -> Result<Json<Customer>, AppError> {
    let customer = app_state
        .crm_service
        .update_customer(tenant.0, id, payload)
        .await?;
    Ok(Json(customer))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.crm_service.delete_customer(tenant.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
