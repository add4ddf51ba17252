// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::user_repo::insert_user,
    models::{
        auth::{NewUser, User},
        tenancy::{HardwareSettings, NewTenant, Tenant, TenantInfo},
    },
};

#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Creates the tenant and its first user in one transaction.
    async fn create_tenant_with_admin(
        &self,
        tenant_id: Uuid,
        tenant: &NewTenant,
        admin: &NewUser,
    ) -> Result<(Tenant, User), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError>;

    async fn find_default(&self) -> Result<Option<Tenant>, AppError>;

    async fn list(&self) -> Result<Vec<Tenant>, AppError>;

    async fn update_info(&self, id: Uuid, info: &TenantInfo) -> Result<Option<Tenant>, AppError>;

    async fn update_hardware(
        &self,
        id: Uuid,
        settings: &HardwareSettings,
    ) -> Result<Option<Tenant>, AppError>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<Tenant>, AppError>;

    /// Removes the tenant and, by cascade, everything it owns.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_tenant<'e, E>(executor: E, id: Uuid, tenant: &NewTenant) -> Result<Tenant, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, Tenant>(
        r#"
        INSERT INTO tenants (id, name, email, phone, address, subdomain, is_default, hardware_settings)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&tenant.info.name)
    .bind(&tenant.info.email)
    .bind(&tenant.info.phone)
    .bind(&tenant.info.address)
    .bind(&tenant.subdomain)
    .bind(tenant.is_default)
    .bind(Json(HardwareSettings::default()))
    .fetch_one(executor)
    .await?;
    Ok(row)
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn create_tenant_with_admin(
        &self,
        tenant_id: Uuid,
        tenant: &NewTenant,
        admin: &NewUser,
    ) -> Result<(Tenant, User), AppError> {
        let mut tx = self.pool.begin().await?;

        let tenant = insert_tenant(&mut *tx, tenant_id, tenant).await?;
        // A failure here drops `tx` and the tenant row goes with it.
        let user = insert_user(&mut *tx, Uuid::new_v4(), admin).await?;

        tx.commit().await?;
        Ok((tenant, user))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    async fn find_default(&self) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE is_default ORDER BY created_at LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn list(&self) -> Result<Vec<Tenant>, AppError> {
        let tenants = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(tenants)
    }

    async fn update_info(&self, id: Uuid, info: &TenantInfo) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET name = $2, email = $3, phone = $4, address = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&info.name)
        .bind(&info.email)
        .bind(&info.phone)
        .bind(&info.address)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn update_hardware(
        &self,
        id: Uuid,
        settings: &HardwareSettings,
    ) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET hardware_settings = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(settings))
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
