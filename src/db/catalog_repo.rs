// src/db/catalog_repo.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    models::{
        catalog::{apply_stock_delta, Category, CategoryPayload, NewProduct, Product, ProductChanges},
        marketplace::{MarketplaceItem, RestockOutcome},
    },
};

/// Tenant-owned products and categories. Every method takes the owning tenant;
/// a row of another tenant is indistinguishable from a missing one.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError>;

    async fn find_product(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn create_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        product: &NewProduct,
    ) -> Result<Product, AppError>;

    async fn update_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError>;

    async fn delete_product(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Applies `delta` to the stock. Fails with InvalidArgument if the result would be negative.
    async fn adjust_stock(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<Product>, AppError>;

    /// Copies or merges a marketplace item into the tenant's catalog atomically.
    /// Products are matched by exact name.
    async fn restock_from_marketplace(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(Product, RestockOutcome), AppError>;

    async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, AppError>;

    async fn find_category(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Category>, AppError>;

    async fn create_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        category: &CategoryPayload,
    ) -> Result<Category, AppError>;

    async fn delete_category(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// `xmax = 0` holds only for a freshly inserted tuple, which tells the two upsert branches apart.
#[derive(FromRow)]
struct UpsertedProduct {
    #[sqlx(flatten)]
    product: Product,
    inserted: bool,
}

const PRODUCTS_SKU_KEY: &str = "products_sku_key";

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}

/// Inserts the restocked copy, or adds its stock to the tenant's product of the same
/// name. The unique (tenant_id, name) index makes the loser of an insert race take
/// the DO UPDATE branch instead of failing.
async fn upsert_restocked(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    clone: &NewProduct,
) -> Result<UpsertedProduct, sqlx::Error> {
    sqlx::query_as::<_, UpsertedProduct>(
        r#"
        INSERT INTO products
            (id, tenant_id, name, description, sku, price, stock_quantity,
             stock_alert, unit, carton_quantity)
        VALUES (
            $1, $2, $3, $4,
            CASE WHEN EXISTS (SELECT 1 FROM products WHERE sku = $5) THEN NULL ELSE $5 END,
            $6, $7, $8, $9, $10
        )
        ON CONFLICT (tenant_id, name) DO UPDATE
        SET stock_quantity = products.stock_quantity + EXCLUDED.stock_quantity,
            updated_at = NOW()
        RETURNING products.*, (xmax = 0) AS inserted
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tenant_id)
    .bind(&clone.name)
    .bind(&clone.description)
    .bind(&clone.sku)
    .bind(clone.price)
    .bind(clone.stock_quantity)
    .bind(clone.stock_alert)
    .bind(&clone.unit)
    .bind(clone.carton_quantity)
    .fetch_one(&mut *conn)
    .await
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 ORDER BY name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find_product(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn create_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        product: &NewProduct,
    ) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (id, tenant_id, category_id, name, description, sku, barcode, price,
                 cost_price, stock_quantity, stock_alert, unit, carton_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.price)
        .bind(product.cost_price)
        .bind(product.stock_quantity)
        .bind(product.stock_alert)
        .bind(&product.unit)
        .bind(product.carton_quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = $3, name = $4, description = $5, sku = $6, barcode = $7,
                price = $8, cost_price = $9, stock_quantity = $10, stock_alert = $11,
                unit = $12, carton_quantity = $13, is_active = $14, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(changes.category_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.sku)
        .bind(&changes.barcode)
        .bind(changes.price)
        .bind(changes.cost_price)
        .bind(changes.stock_quantity)
        .bind(changes.stock_alert)
        .bind(&changes.unit)
        .bind(changes.carton_quantity)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_product(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                // sale_items restricts the delete: the product has sales history.
                AppError::Conflict(_) => {
                    AppError::conflict("The product has sales and cannot be deleted.")
                }
                other => other,
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn adjust_stock(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<Product>, AppError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i32> = sqlx::query_scalar(
            "SELECT stock_quantity FROM products WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };
        let next = apply_stock_delta(current, delta)?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock_quantity = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(product))
    }

    async fn restock_from_marketplace(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(Product, RestockOutcome), AppError> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, MarketplaceItem>(
            "SELECT * FROM marketplace_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;
        let item = found(item, "marketplace item")?;
        let mut clone = NewProduct::cloned_from(&item, quantity);

        // SKUs are unique system-wide. The EXISTS check drops a taken SKU up front, but
        // it cannot see a competitor that has not committed yet; that race surfaces as a
        // products_sku_key violation, which is retried without a SKU inside a savepoint.
        let mut savepoint = sqlx::Connection::begin(&mut *tx).await?;
        let upserted = match upsert_restocked(&mut savepoint, tenant_id, &clone).await {
            Ok(upserted) => {
                savepoint.commit().await?;
                upserted
            }
            Err(err) if violates(&err, PRODUCTS_SKU_KEY) => {
                savepoint.rollback().await?;
                tracing::debug!(
                    %tenant_id,
                    %item_id,
                    "restock SKU taken concurrently, storing the copy without one"
                );
                clone.sku = None;
                upsert_restocked(&mut tx, tenant_id, &clone).await?
            }
            Err(err) => return Err(err.into()),
        };

        tx.commit().await?;

        let outcome = if upserted.inserted {
            RestockOutcome::Created
        } else {
            RestockOutcome::Merged
        };
        Ok((upserted.product, outcome))
    }

    async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE tenant_id = $1 ORDER BY name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn create_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        category: &CategoryPayload,
    ) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, tenant_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_category(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
