// src/db/crm_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Customer, CustomerFields, CustomerWithStats},
};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list_customers(&self, tenant_id: Uuid) -> Result<Vec<CustomerWithStats>, AppError>;

    async fn find_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CustomerWithStats>, AppError>;

    async fn create_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        fields: &CustomerFields,
    ) -> Result<Customer, AppError>;

    async fn update_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        fields: &CustomerFields,
    ) -> Result<Option<Customer>, AppError>;

    async fn delete_customer(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// The aggregates are folded from `sales` on every read.
const SELECT_WITH_STATS: &str = r#"
    SELECT c.*,
           COALESCE(SUM(s.total_amount), 0) AS total_spent,
           COUNT(s.id) AS sales_count,
           MAX(s.created_at) AS last_sale_date
    FROM customers c
    LEFT JOIN sales s ON s.customer_id = c.id AND s.tenant_id = c.tenant_id
    WHERE c.tenant_id = $1
"#;

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn list_customers(&self, tenant_id: Uuid) -> Result<Vec<CustomerWithStats>, AppError> {
        let query = format!("{} GROUP BY c.id ORDER BY c.name", SELECT_WITH_STATS);
        let customers = sqlx::query_as::<_, CustomerWithStats>(&query)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    async fn find_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CustomerWithStats>, AppError> {
        let query = format!("{} AND c.id = $2 GROUP BY c.id", SELECT_WITH_STATS);
        let customer = sqlx::query_as::<_, CustomerWithStats>(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn create_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        fields: &CustomerFields,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, tenant_id, name, email, phone, address, loyalty_points)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.address)
        .bind(fields.loyalty_points)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn update_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        fields: &CustomerFields,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $3, email = $4, phone = $5, address = $6, loyalty_points = $7
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.address)
        .bind(fields.loyalty_points)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn delete_customer(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
