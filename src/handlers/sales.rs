// src/handlers/sales.rs

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
        auth::AuthenticatedUser,
        rbac::{RequireCashier, RequireManager},
        tenancy::TenantContext,
    },
    models::sales::{CreateSalePayload, Sale, SaleDetail, SaleItemQuantityPayload},
};

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Sale recorded", body = SaleDetail),
        (status = 400, description = "Invalid items, tax or discount"),
        (status = 404, description = "Product or customer not found"),
        (status = 409, description = "Insufficient stock")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sales_service
        .create_sale(tenant.0, user.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    responses((status = 200, description = "Sales of the store, newest first", body = Vec<Sale>)),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
) -> Result<Json<Vec<Sale>>, AppError> {
    Ok(Json(app_state.sales_service.list_sales(tenant.0).await?))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "Sale id")),
    responses(
        (status = 200, description = "The sale with its items", body = SaleDetail),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleDetail>, AppError> {
    Ok(Json(app_state.sales_service.get_sale(tenant.0, id).await?))
}

// PUT /api/sales/{sale_id}/items/{item_id}
#[utoipa::path(
    put,
    path = "/api/sales/{sale_id}/items/{item_id}",
    tag = "Sales",
    params(
        ("sale_id" = Uuid, Path, description = "Sale id"),
        ("item_id" = Uuid, Path, description = "Sale item id")
    ),
    request_body = SaleItemQuantityPayload,
    responses(
        (status = 200, description = "Item and sale totals recomputed", body = SaleDetail),
        (status = 404, description = "Sale or item not found"),
        (status = 409, description = "Insufficient stock")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale_item(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Path((sale_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SaleItemQuantityPayload>,
) -> Result<Json<SaleDetail>, AppError> {
    let sale = app_state
        .sales_service
        .update_item_quantity(tenant.0, sale_id, item_id, payload.quantity)
        .await?;
    Ok(Json(sale))
}
