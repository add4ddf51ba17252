// src/common/db_utils.rs

use std::{str::FromStr, time::Duration};

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::{common::error::AppError, config::DatabaseConfig};

/// Opens the pool. Every connection carries a server-side statement timeout, so a
/// stuck statement aborts its transaction instead of holding row locks.
pub async fn connect_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let statement_timeout = config.statement_timeout_ms.to_string();
    let options = PgConnectOptions::from_str(&config.url)?
        .options([("statement_timeout", statement_timeout.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Turns "no row" into a typed NotFound for the given entity.
pub(crate) fn found<T>(row: Option<T>, entity: &'static str) -> Result<T, AppError> {
    row.ok_or(AppError::NotFound(entity))
}
