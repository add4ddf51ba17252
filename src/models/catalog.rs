// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::marketplace::MarketplaceItem;

// --- Categories ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Products (tenant-owned) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub stock_alert: i32,
    #[schema(example = "pcs")]
    pub unit: String,
    pub carton_quantity: i32,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_on_stock(&self) -> bool {
        self.stock_quantity <= self.stock_alert
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 100, message = "Category name is required (max 100 characters)."))]
    #[schema(example = "Minuman")]
    pub name: String,
    pub description: Option<String>,
}

/// Everything needed to insert a product; the owning tenant is passed separately.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub category_id: Option<Uuid>,
    #[schema(example = "Teh Botol 350ml")]
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_stock_alert")]
    pub stock_alert: i32,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_carton_quantity")]
    pub carton_quantity: i32,
}

impl NewProduct {
    /// The product a restock creates when the tenant has none with the item's name.
    pub fn cloned_from(item: &MarketplaceItem, quantity: i32) -> Self {
        Self {
            category_id: None,
            name: item.name.clone(),
            description: item.description.clone(),
            sku: item.sku.clone(),
            barcode: None,
            price: item.price,
            cost_price: None,
            stock_quantity: quantity,
            stock_alert: DEFAULT_STOCK_ALERT,
            unit: DEFAULT_UNIT.to_string(),
            carton_quantity: 1,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_product_fields(
            &self.name,
            self.price,
            self.cost_price,
            self.stock_quantity,
            &self.unit,
            self.carton_quantity,
        )
    }
}

pub const DEFAULT_STOCK_ALERT: i32 = 10;
pub const DEFAULT_UNIT: &str = "pcs";
const UNITS: [&str; 2] = ["pcs", "carton"];

fn default_stock_alert() -> i32 {
    DEFAULT_STOCK_ALERT
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_carton_quantity() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// Full replacement of a product's editable fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: i32,
    #[serde(default = "default_stock_alert")]
    pub stock_alert: i32,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_carton_quantity")]
    pub carton_quantity: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StockAdjustment {
    /// Signed change applied to the current stock.
    #[schema(example = -3)]
    pub delta: i32,
}

impl ProductChanges {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_product_fields(
            &self.name,
            self.price,
            self.cost_price,
            self.stock_quantity,
            &self.unit,
            self.carton_quantity,
        )
    }
}

fn validate_product_fields(
    name: &str,
    price: Decimal,
    cost_price: Option<Decimal>,
    stock_quantity: i32,
    unit: &str,
    carton_quantity: i32,
) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::invalid("Product name is required."));
    }
    if price.is_sign_negative() || cost_price.is_some_and(|c| c.is_sign_negative()) {
        return Err(AppError::invalid("Prices cannot be negative."));
    }
    if stock_quantity < 0 {
        return Err(AppError::invalid("Stock quantity cannot be negative."));
    }
    if !UNITS.contains(&unit) {
        return Err(AppError::invalid("Unit must be 'pcs' or 'carton'."));
    }
    if carton_quantity < 1 {
        return Err(AppError::invalid("Carton quantity must be at least 1."));
    }
    Ok(())
}

/// Stock after applying `delta`, refusing to go below zero.
pub fn apply_stock_delta(current: i32, delta: i32) -> Result<i32, AppError> {
    let next = current
        .checked_add(delta)
        .ok_or_else(|| AppError::invalid("Stock quantity is out of range."))?;
    if next < 0 {
        return Err(AppError::invalid(format!(
            "Stock cannot go negative (current: {}, change: {}).",
            current, delta
        )));
    }
    Ok(next)
}
