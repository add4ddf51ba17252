// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Postgres SQLSTATE codes we translate instead of surfacing as 500.
const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";
const PG_NUMERIC_OUT_OF_RANGE: &str = "22003";
const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_DEADLOCK_DETECTED: &str = "40P01";
const PG_QUERY_CANCELED: &str = "57014";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient stock for '{product}': requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i32,
        available: i32,
    },

    #[error("transient store failure: {0}")]
    TransientStoreFailure(String),

    #[error("object storage failure: {0}")]
    UpstreamStorageFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidArgument(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            AppError::TransientStoreFailure(_)
            | AppError::UpstreamStorageFailure(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, user-facing message. Never includes storage internals.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => "One or more fields are invalid.".to_string(),
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::Unauthorized => "Missing or invalid authentication token.".to_string(),
            AppError::InvalidCredentials => "Invalid email or password.".to_string(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(entity) => format!("{} not found.", capitalize(entity)),
            AppError::Conflict(msg) => msg.clone(),
            AppError::InsufficientStock { product, available, .. } => {
                format!("Insufficient stock for '{}' (available: {}).", product, available)
            }
            AppError::TransientStoreFailure(_) => {
                "The service is temporarily unavailable. Please try again.".to_string()
            }
            AppError::UpstreamStorageFailure(_) => "Failed to store the uploaded file.".to_string(),
            AppError::Internal(_) => "An unexpected error occurred.".to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Storage errors are classified here so no raw sqlx error crosses a repository.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("record"),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code();
                match code.as_deref() {
                    Some(PG_UNIQUE_VIOLATION) => {
                        AppError::Conflict(conflict_message(db_err.constraint()))
                    }
                    Some(PG_FOREIGN_KEY_VIOLATION) => AppError::Conflict(
                        "The record is still referenced by other data.".to_string(),
                    ),
                    Some(PG_CHECK_VIOLATION) => {
                        AppError::InvalidArgument("A value is out of the allowed range.".to_string())
                    }
                    // Stock counters are int4; a merge or return past i32::MAX lands here.
                    Some(PG_NUMERIC_OUT_OF_RANGE) => {
                        AppError::InvalidArgument("Stock quantity is out of range.".to_string())
                    }
                    Some(PG_SERIALIZATION_FAILURE)
                    | Some(PG_DEADLOCK_DETECTED)
                    | Some(PG_QUERY_CANCELED) => AppError::TransientStoreFailure(err.to_string()),
                    _ => AppError::Internal(err.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => AppError::TransientStoreFailure(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

fn conflict_message(constraint: Option<&str>) -> String {
    match constraint.unwrap_or_default() {
        "products_sku_key" => "A product with this SKU already exists.",
        "products_tenant_name_key" => "A product with this name already exists.",
        "categories_tenant_name_key" => "A category with this name already exists.",
        "marketplace_items_name_key" => "A marketplace item with this name already exists.",
        "marketplace_items_sku_key" => "A marketplace item with this SKU already exists.",
        "sales_receipt_number_key" => "Receipt number already in use.",
        "tenants_email_key" => "A tenant with this email already exists.",
        "tenants_subdomain_key" => "This subdomain is already taken.",
        "users_email_key" => "This e-mail is already in use.",
        "users_username_key" => "This username is already in use.",
        _ => "The record conflicts with an existing one.",
    }
    .to_string()
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("bcrypt: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("jwt: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": self.public_message(),
                "details": details,
            }));
            return (status, body).into_response();
        }

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}
