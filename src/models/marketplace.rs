// src/models/marketplace.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::catalog::Product;

// Shared catalog entry, not owned by any tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceItem {
    pub id: Uuid,
    #[schema(example = "Kopi Bubuk 200g")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 25000.0)]
    pub price: Decimal,
    pub stock: i32,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a marketplace item.
#[derive(Debug, Clone)]
pub struct MarketplaceItemFields {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub sku: Option<String>,
}

impl MarketplaceItemFields {
    /// Trims text fields and turns blank optionals into `None`.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.sku = self
            .sku
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.description = self.description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() {
            return Err(AppError::invalid("Item name is required."));
        }
        if self.name.chars().count() > 100 {
            return Err(AppError::invalid("Item name must have at most 100 characters."));
        }
        if self.price.is_sign_negative() {
            return Err(AppError::invalid("Price cannot be negative."));
        }
        if self.stock < 0 {
            return Err(AppError::invalid("Stock cannot be negative."));
        }
        if self.sku.as_ref().is_some_and(|s| s.chars().count() > 50) {
            return Err(AppError::invalid("SKU must have at most 50 characters."));
        }
        Ok(())
    }
}

/// An uploaded image travelling from the HTTP layer to object storage.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

impl ImageUpload {
    /// Lower-cased extension, if it is one of the accepted image types.
    pub fn extension(&self) -> Result<String, AppError> {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::invalid("Only jpg, jpeg, png, gif or webp images are accepted."));
        }
        if self.bytes.is_empty() {
            return Err(AppError::invalid("The uploaded image is empty."));
        }
        Ok(ext)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RestockPayload {
    /// Units to add. Omitted means one.
    #[serde(default = "default_restock_quantity")]
    #[schema(example = 12, default = 1)]
    pub quantity: i32,
}

fn default_restock_quantity() -> i32 {
    1
}

/// Which branch a restock took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RestockOutcome {
    /// Stock was added to an existing product with the same name.
    Merged,
    /// A new product was cloned from the marketplace item.
    Created,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestockResult {
    pub product: Product,
    pub outcome: RestockOutcome,
    pub message: String,
}

impl RestockResult {
    pub fn new(product: Product, outcome: RestockOutcome, quantity: i32) -> Self {
        let message = match outcome {
            RestockOutcome::Merged => format!(
                "Stock for \"{}\" has been increased by {}.",
                product.name, quantity
            ),
            RestockOutcome::Created => {
                format!("\"{}\" has been added to your products.", product.name)
            }
        };
        Self { product, outcome, message }
    }
}
