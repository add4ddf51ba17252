// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::User;

// ---
// 1. Tenant (one store / business account)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    #[schema(example = "Toko Makmur")]
    pub name: String,
    #[schema(example = "owner@tokomakmur.id")]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub subdomain: Option<String>,
    pub is_active: bool,
    // The tenant created at bootstrap; it hosts the superadmin and cannot be deleted.
    pub is_default: bool,
    #[schema(value_type = HardwareSettings)]
    pub hardware_settings: Json<HardwareSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Hardware settings (stored as a JSONB blob on the tenant)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrinterType {
    Thermal,
    Label,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScannerType {
    Keyboard,
    Serial,
    Bluetooth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrinterSettings {
    #[serde(rename = "type")]
    pub kind: PrinterType,
    #[schema(example = "192.168.1.50")]
    pub host: Option<String>,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535."))]
    #[schema(example = 9100)]
    pub port: i32,
    #[validate(range(min = 32, max = 80, message = "Paper width must be between 32 and 80 columns."))]
    #[schema(example = 42)]
    pub width: i32,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            kind: PrinterType::Thermal,
            host: Some("localhost".to_string()),
            port: 9100,
            width: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSettings {
    #[validate(nested)]
    pub printer: PrinterSettings,
    pub scanner_type: ScannerType,
}

impl Default for HardwareSettings {
    fn default() -> Self {
        Self {
            printer: PrinterSettings::default(),
            scanner_type: ScannerType::Keyboard,
        }
    }
}

// ---
// 3. Inputs
// ---
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    #[validate(length(min = 1, max = 100, message = "Store name is required (max 100 characters)."))]
    pub name: String,
    #[validate(email(message = "Invalid e-mail."), length(max = 120))]
    pub email: String,
    #[validate(length(max = 20, message = "Phone is too long."))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTenant {
    pub info: TenantInfo,
    pub subdomain: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccountPayload {
    #[validate(length(min = 3, max = 64, message = "Username must have 3 to 64 characters."))]
    pub username: String,
    #[validate(email(message = "Invalid e-mail."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A new store together with the admin account that will run it.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(nested)]
    pub store: TenantInfo,
    #[validate(length(min = 2, max = 50, message = "Subdomain must have 2 to 50 characters."))]
    #[schema(example = "tokomakmur")]
    pub subdomain: Option<String>,
    #[validate(nested)]
    pub admin: AdminAccountPayload,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantStatusPayload {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenantWithAdmin {
    pub tenant: Tenant,
    pub admin: User,
}
