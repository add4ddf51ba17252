// src/handlers/marketplace.rs

use std::str::FromStr;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{RequireCashier, RequireSuperadmin},
        tenancy::TenantContext,
    },
    models::marketplace::{
        ImageUpload, MarketplaceItem, MarketplaceItemFields, RestockPayload, RestockResult,
    },
};

/// Multipart form used to create or edit a marketplace item (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct MarketplaceItemForm {
    #[schema(example = "Kopi Bubuk 200g")]
    name: String,
    description: Option<String>,
    #[schema(example = "25000.00")]
    price: String,
    #[schema(example = 100)]
    stock: i32,
    sku: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

fn bad_form(err: MultipartError) -> AppError {
    AppError::invalid(format!("Malformed form data: {}", err.body_text()))
}

/// Reads the item fields and optional image out of a multipart body.
async fn read_item_form(
    mut multipart: Multipart,
) -> Result<(MarketplaceItemFields, Option<ImageUpload>), AppError> {
    let mut name = None;
    let mut description = None;
    let mut price = None;
    let mut stock = None;
    let mut sku = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                // Browsers send an empty part when no file was picked.
                if !file_name.is_empty() || !bytes.is_empty() {
                    image = Some(ImageUpload { file_name, content_type, bytes: bytes.to_vec() });
                }
            }
            "name" => name = Some(field.text().await.map_err(bad_form)?),
            "description" => description = Some(field.text().await.map_err(bad_form)?),
            "price" => price = Some(field.text().await.map_err(bad_form)?),
            "stock" => stock = Some(field.text().await.map_err(bad_form)?),
            "sku" => sku = Some(field.text().await.map_err(bad_form)?),
            other => tracing::debug!("ignoring form field {}", other),
        }
    }

    let price = price.ok_or_else(|| AppError::invalid("Price is required."))?;
    let price = Decimal::from_str(price.trim())
        .map_err(|_| AppError::invalid("Price must be a decimal number."))?;
    let stock = match stock.as_deref().map(str::trim) {
        Some("") | None => 0,
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| AppError::invalid("Stock must be a whole number."))?,
    };

    let fields = MarketplaceItemFields {
        name: name.unwrap_or_default(),
        description,
        price,
        stock,
        sku,
    };
    Ok((fields, image))
}

// =============================================================================
//  TENANT BROWSING AND RESTOCK
// =============================================================================

// GET /api/marketplace
#[utoipa::path(
    get,
    path = "/api/marketplace",
    tag = "Marketplace",
    responses((status = 200, description = "Items in stock, newest first", body = Vec<MarketplaceItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_available(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
) -> Result<Json<Vec<MarketplaceItem>>, AppError> {
    Ok(Json(app_state.marketplace_service.list_available().await?))
}

// GET /api/marketplace/{id}
#[utoipa::path(
    get,
    path = "/api/marketplace/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "Marketplace item id")),
    responses(
        (status = 200, description = "The item", body = MarketplaceItem),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    Path(id): Path<Uuid>,
) -> Result<Json<MarketplaceItem>, AppError> {
    Ok(Json(app_state.marketplace_service.get_item(id).await?))
}

// POST /api/marketplace/{id}/restock
#[utoipa::path(
    post,
    path = "/api/marketplace/{id}/restock",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "Marketplace item id")),
    request_body = RestockPayload,
    responses(
        (status = 200, description = "Product created or stock merged", body = RestockResult),
        (status = 400, description = "Quantity must be positive"),
        (status = 404, description = "Marketplace item not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn restock(
    State(app_state): State<AppState>,
    _guard: RequireCashier,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockPayload>,
) -> Result<Json<RestockResult>, AppError> {
    let result = app_state
        .marketplace_service
        .restock(tenant.0, id, payload.quantity)
        .await?;
    Ok(Json(result))
}

// =============================================================================
//  SUPERADMIN MANAGEMENT
// =============================================================================

// GET /api/admin/marketplace
#[utoipa::path(
    get,
    path = "/api/admin/marketplace",
    tag = "Marketplace",
    responses((status = 200, description = "Every item, by name", body = Vec<MarketplaceItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_all(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
) -> Result<Json<Vec<MarketplaceItem>>, AppError> {
    Ok(Json(app_state.marketplace_service.list_all().await?))
}

// POST /api/admin/marketplace
#[utoipa::path(
    post,
    path = "/api/admin/marketplace",
    tag = "Marketplace",
    request_body(content = MarketplaceItemForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Item created", body = MarketplaceItem),
        (status = 400, description = "Invalid data or image type"),
        (status = 409, description = "Name or SKU already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (fields, image) = read_item_form(multipart).await?;
    let item = app_state.marketplace_service.create_item(fields, image).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /api/admin/marketplace/{id}
#[utoipa::path(
    put,
    path = "/api/admin/marketplace/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "Marketplace item id")),
    request_body(content = MarketplaceItemForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Item updated", body = MarketplaceItem),
        (status = 404, description = "Not found"),
        (status = 409, description = "Name or SKU already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<MarketplaceItem>, AppError> {
    let (fields, image) = read_item_form(multipart).await?;
    let item = app_state.marketplace_service.update_item(id, fields, image).await?;
    Ok(Json(item))
}

// DELETE /api/admin/marketplace/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/marketplace/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "Marketplace item id")),
    responses(
        (status = 204, description = "Item and its image deleted"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    _guard: RequireSuperadmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.marketplace_service.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
