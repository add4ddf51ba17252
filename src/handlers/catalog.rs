// src/handlers/catalog.rs

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
    models::catalog::{Category, CategoryPayload, NewProduct, Product, ProductChanges, StockAdjustment},
};

// =============================================================================
//  PRODUCTS
// =============================================================================

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "Products of the store", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.catalog_service.list_products(tenant.0).await?))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(app_state.catalog_service.get_product(tenant.0, id).await?))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Name or SKU already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.catalog_service.create_product(tenant.0, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductChanges>,
) -> Result<Json<Product>, AppError> {
    let product = app_state
        .catalog_service
        .update_product(tenant.0, id, payload)
        .await?;
    Ok(Json(product))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "The product has sales")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_product(tenant.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/products/{id}/stock
#[utoipa::path(
    post,
    path = "/api/products/{id}/stock",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Stock adjusted", body = Product),
        (status = 400, description = "Stock would become negative"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<Product>, AppError> {
    let product = app_state
        .catalog_service
        .adjust_stock(tenant.0, id, payload.delta)
        .await?;
    Ok(Json(product))
}

// =============================================================================
//  CATEGORIES
// =============================================================================

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Products",
    responses((status = 200, description = "Categories of the store", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(app_state.catalog_service.list_categories(tenant.0).await?))
}

// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Products",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "A category with this name already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.catalog_service.create_category(tenant.0, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted; its products become uncategorized"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _guard: RequireManager,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_category(tenant.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
