// src/db/marketplace_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::marketplace::{MarketplaceItem, MarketplaceItemFields},
};

/// The shared catalog. No method here takes a tenant: items belong to nobody.
#[async_trait]
pub trait MarketplaceRepository: Send + Sync {
    /// Items tenants can restock from: stock above zero, newest first.
    async fn list_available(&self) -> Result<Vec<MarketplaceItem>, AppError>;

    async fn list_all(&self) -> Result<Vec<MarketplaceItem>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MarketplaceItem>, AppError>;

    /// An item, other than `exclude`, that already uses `name` or `sku`.
    async fn find_conflicting(
        &self,
        name: &str,
        sku: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<Option<MarketplaceItem>, AppError>;

    async fn create(
        &self,
        id: Uuid,
        fields: &MarketplaceItemFields,
        image_url: Option<&str>,
    ) -> Result<MarketplaceItem, AppError>;

    /// `image_url: None` keeps the current image.
    async fn update(
        &self,
        id: Uuid,
        fields: &MarketplaceItemFields,
        image_url: Option<&str>,
    ) -> Result<Option<MarketplaceItem>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgMarketplaceRepository {
    pool: PgPool,
}

impl PgMarketplaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketplaceRepository for PgMarketplaceRepository {
    async fn list_available(&self) -> Result<Vec<MarketplaceItem>, AppError> {
        let items = sqlx::query_as::<_, MarketplaceItem>(
            "SELECT * FROM marketplace_items WHERE stock > 0 ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn list_all(&self) -> Result<Vec<MarketplaceItem>, AppError> {
        let items =
            sqlx::query_as::<_, MarketplaceItem>("SELECT * FROM marketplace_items ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MarketplaceItem>, AppError> {
        let item =
            sqlx::query_as::<_, MarketplaceItem>("SELECT * FROM marketplace_items WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(item)
    }

    async fn find_conflicting(
        &self,
        name: &str,
        sku: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<Option<MarketplaceItem>, AppError> {
        let item = sqlx::query_as::<_, MarketplaceItem>(
            r#"
            SELECT * FROM marketplace_items
            WHERE (name = $1 OR ($2::text IS NOT NULL AND sku = $2))
              AND ($3::uuid IS NULL OR id <> $3)
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(sku)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn create(
        &self,
        id: Uuid,
        fields: &MarketplaceItemFields,
        image_url: Option<&str>,
    ) -> Result<MarketplaceItem, AppError> {
        let item = sqlx::query_as::<_, MarketplaceItem>(
            r#"
            INSERT INTO marketplace_items (id, name, description, price, stock, sku, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(fields.stock)
        .bind(&fields.sku)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update(
        &self,
        id: Uuid,
        fields: &MarketplaceItemFields,
        image_url: Option<&str>,
    ) -> Result<Option<MarketplaceItem>, AppError> {
        let item = sqlx::query_as::<_, MarketplaceItem>(
            r#"
            UPDATE marketplace_items
            SET name = $2, description = $3, price = $4, stock = $5, sku = $6,
                image_url = COALESCE($7, image_url), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(fields.stock)
        .bind(&fields.sku)
        .bind(image_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM marketplace_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
