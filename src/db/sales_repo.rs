// src/db/sales_repo.rs

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    models::{
        catalog::Product,
        sales::{
            generate_receipt_number, sale_total, NewSale, Sale, SaleDetail, SaleItem,
            PAYMENT_COMPLETED,
        },
    },
};

#[async_trait]
pub trait SalesRepository: Send + Sync {
    /// Writes the sale, its items and the stock decrements as one unit.
    async fn create_sale(&self, tenant_id: Uuid, sale: &NewSale) -> Result<SaleDetail, AppError>;

    async fn list_sales(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError>;

    async fn find_sale(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<SaleDetail>, AppError>;

    /// Changes one item's quantity, moving the difference in and out of stock
    /// and recomputing the item and sale totals.
    async fn update_item_quantity(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<SaleDetail, AppError>;
}

#[derive(Clone)]
pub struct PgSalesRepository {
    pool: PgPool,
}

impl PgSalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_ITEMS: &str = r#"
    SELECT si.id, si.sale_id, si.product_id, p.name AS product_name,
           si.quantity, si.unit_price, si.total_price
    FROM sale_items si
    JOIN products p ON p.id = si.product_id
    WHERE si.sale_id = $1
    ORDER BY p.name
"#;

/// Takes `quantity` out of stock. The guarded UPDATE holds the row lock until
/// commit, so two sales can never both consume the last units.
async fn take_stock(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - $3, updated_at = NOW()
        WHERE id = $1 AND tenant_id = $2 AND stock_quantity >= $3
        RETURNING *
        "#,
    )
    .bind(product_id)
    .bind(tenant_id)
    .bind(quantity)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(product) = product {
        return Ok(product);
    }

    let current = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE id = $1 AND tenant_id = $2",
    )
    .bind(product_id)
    .bind(tenant_id)
    .fetch_optional(&mut **tx)
    .await?;

    let current = found(current, "product")?;
    Err(AppError::InsufficientStock {
        product: current.name,
        requested: quantity,
        available: current.stock_quantity,
    })
}

async fn load_items(
    tx: &mut Transaction<'_, Postgres>,
    sale_id: Uuid,
) -> Result<Vec<SaleItem>, AppError> {
    let items = sqlx::query_as::<_, SaleItem>(SELECT_ITEMS)
        .bind(sale_id)
        .fetch_all(&mut **tx)
        .await?;
    Ok(items)
}

#[async_trait]
impl SalesRepository for PgSalesRepository {
    async fn create_sale(&self, tenant_id: Uuid, sale: &NewSale) -> Result<SaleDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(customer_id) = sale.customer_id {
            let owned: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1 AND tenant_id = $2)",
            )
            .bind(customer_id)
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;
            if !owned {
                return Err(AppError::NotFound("customer"));
            }
        }

        let sale_id = Uuid::new_v4();
        let mut items = Vec::with_capacity(sale.lines.len());
        for &(product_id, quantity) in &sale.lines {
            let product = take_stock(&mut tx, tenant_id, product_id, quantity).await?;
            items.push(SaleItem::priced(sale_id, &product, quantity));
        }

        let total = sale_total(
            items.iter().map(SaleItem::total_price),
            sale.tax_amount,
            sale.discount_amount,
        )?;

        let row = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales
                (id, tenant_id, customer_id, user_id, receipt_number, total_amount,
                 tax_amount, discount_amount, payment_method, payment_status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(tenant_id)
        .bind(sale.customer_id)
        .bind(sale.user_id)
        .bind(generate_receipt_number(Utc::now()))
        .bind(total)
        .bind(sale.tax_amount)
        .bind(sale.discount_amount)
        .bind(sale.payment_method)
        .bind(PAYMENT_COMPLETED)
        .bind(&sale.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id)
            .bind(item.sale_id)
            .bind(item.product_id)
            .bind(item.quantity())
            .bind(item.unit_price())
            .bind(item.total_price())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(SaleDetail { sale: row, items })
    }

    async fn list_sales(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    async fn find_sale(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<SaleDetail>, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(sale) = sale else {
            return Ok(None);
        };
        let items = load_items(&mut tx, sale.id).await?;

        tx.commit().await?;
        Ok(Some(SaleDetail { sale, items }))
    }

    async fn update_item_quantity(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<SaleDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(sale_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;
        let sale = found(sale, "sale")?;

        let mut items = load_items(&mut tx, sale.id).await?;
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(AppError::NotFound("sale item"))?;

        let delta = quantity - item.quantity();
        if delta > 0 {
            take_stock(&mut tx, tenant_id, item.product_id, delta).await?;
        } else if delta < 0 {
            sqlx::query(
                r#"
                UPDATE products SET stock_quantity = stock_quantity + $3, updated_at = NOW()
                WHERE id = $1 AND tenant_id = $2
                "#,
            )
            .bind(item.product_id)
            .bind(tenant_id)
            .bind(-delta)
            .execute(&mut *tx)
            .await?;
        }

        item.set_quantity(quantity);
        sqlx::query("UPDATE sale_items SET quantity = $2, total_price = $3 WHERE id = $1")
            .bind(item.id)
            .bind(item.quantity())
            .bind(item.total_price())
            .execute(&mut *tx)
            .await?;

        let total: Decimal = sale_total(
            items.iter().map(SaleItem::total_price),
            sale.tax_amount,
            sale.discount_amount,
        )?;
        let sale = sqlx::query_as::<_, Sale>(
            "UPDATE sales SET total_amount = $2 WHERE id = $1 RETURNING *",
        )
        .bind(sale.id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SaleDetail { sale, items })
    }
}
