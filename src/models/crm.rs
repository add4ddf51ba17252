// src/models/crm.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub loyalty_points: i32,
    pub created_at: DateTime<Utc>,
}

// Derived from the sales table on every read; there is no stored copy to drift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total_spent: Decimal,
    pub sales_count: i64,
    pub last_sale_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithStats {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub customer: Customer,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub stats: CustomerStats,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFields {
    #[validate(length(min = 1, max = 100, message = "Customer name is required (max 100 characters)."))]
    #[schema(example = "Budi Santoso")]
    pub name: String,
    #[validate(email(message = "Invalid e-mail."))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Phone is too long."))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0, message = "Loyalty points cannot be negative."))]
    #[serde(default)]
    pub loyalty_points: i32,
}
