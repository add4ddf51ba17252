// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;
use sqlx::PgPool;

use crate::{
    common::db_utils::connect_pool,
    db::{
        CatalogRepository, CustomerRepository, MarketplaceRepository, PgCatalogRepository,
        PgCustomerRepository, PgMarketplaceRepository, PgSalesRepository, PgTenantRepository,
        PgUserRepository, SalesRepository, TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        crm_service::CrmService,
        marketplace_service::MarketplaceService,
        object_storage::{LocalObjectStorage, ObjectStorage},
        sales_service::SalesService,
        tenancy_service::TenantService,
    },
};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub statement_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub superadmin_email: String,
    pub superadmin_password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub bootstrap: Option<BootstrapConfig>,
}

impl Config {
    /// Reads the process environment (after loading `.env`, if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bootstrap = match (env::var("SUPERADMIN_EMAIL"), env::var("SUPERADMIN_PASSWORD")) {
            (Ok(superadmin_email), Ok(superadmin_password)) => Some(BootstrapConfig {
                superadmin_email,
                superadmin_password,
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
                acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?,
                statement_timeout_ms: env_or("DB_STATEMENT_TIMEOUT_MS", 5_000)?,
            },
            storage: StorageConfig {
                root: env_or("STORAGE_ROOT", PathBuf::from("./uploads"))?,
                public_url: env_or(
                    "STORAGE_PUBLIC_URL",
                    "http://localhost:3000/uploads".to_string(),
                )?,
            },
            bootstrap,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

/// The data-access layer, one handle per aggregate.
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub users: Arc<dyn UserRepository>,
    pub marketplace: Arc<dyn MarketplaceRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub sales: Arc<dyn SalesRepository>,
    pub customers: Arc<dyn CustomerRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tenants: Arc::new(PgTenantRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            marketplace: Arc::new(PgMarketplaceRepository::new(pool.clone())),
            catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
            sales: Arc::new(PgSalesRepository::new(pool.clone())),
            customers: Arc::new(PgCustomerRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub catalog_service: CatalogService,
    pub marketplace_service: MarketplaceService,
    pub sales_service: SalesService,
    pub crm_service: CrmService,
}

impl AppState {
    /// Wires the services over any repository/storage implementation.
    pub fn new(repos: Repositories, storage: Arc<dyn ObjectStorage>, jwt_secret: String) -> Self {
        let auth_service = AuthService::new(repos.users.clone(), repos.tenants.clone(), jwt_secret);
        let tenant_service = TenantService::new(repos.tenants.clone(), repos.users.clone());
        let catalog_service = CatalogService::new(repos.catalog.clone());
        let marketplace_service =
            MarketplaceService::new(repos.marketplace.clone(), repos.catalog.clone(), storage);
        let sales_service = SalesService::new(repos.sales.clone());
        let crm_service = CrmService::new(repos.customers.clone());

        Self {
            auth_service,
            tenant_service,
            catalog_service,
            marketplace_service,
            sales_service,
            crm_service,
        }
    }

    /// Production wiring: Postgres repositories and filesystem object storage.
    pub async fn connect(config: &Config) -> anyhow::Result<(Self, PgPool)> {
        let db_pool = connect_pool(&config.database).await?;
        tracing::info!("✅ Database connection established");

        let storage = LocalObjectStorage::new(
            config.storage.root.clone(),
            config.storage.public_url.clone(),
        );
        let state = Self::new(
            Repositories::postgres(db_pool.clone()),
            Arc::new(storage),
            config.jwt_secret.clone(),
        );
        Ok((state, db_pool))
    }
}
