// src/services/sales_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    db::SalesRepository,
    models::sales::{aggregate_lines, CreateSalePayload, NewSale, Sale, SaleDetail},
};

#[derive(Clone)]
pub struct SalesService {
    repo: Arc<dyn SalesRepository>,
}

impl SalesService {
    pub fn new(repo: Arc<dyn SalesRepository>) -> Self {
        Self { repo }
    }

    /// Records a sale by `user_id`. Stock, items and totals are written together
    /// or not at all.
    pub async fn create_sale(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        payload: CreateSalePayload,
    ) -> Result<SaleDetail, AppError> {
        if payload.tax_amount.is_sign_negative() || payload.discount_amount.is_sign_negative() {
            return Err(AppError::invalid("Tax and discount cannot be negative."));
        }
        let lines = aggregate_lines(&payload.items)?;

        let sale = NewSale {
            customer_id: payload.customer_id,
            user_id,
            lines,
            tax_amount: payload.tax_amount,
            discount_amount: payload.discount_amount,
            payment_method: payload.payment_method,
            notes: payload.notes.filter(|n| !n.trim().is_empty()),
        };

        let detail = self.repo.create_sale(tenant_id, &sale).await?;
        tracing::info!(
            "sale {} recorded in tenant {} (total {})",
            detail.sale.receipt_number,
            tenant_id,
            detail.sale.total_amount
        );
        Ok(detail)
    }

    pub async fn list_sales(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError> {
        self.repo.list_sales(tenant_id).await
    }

    pub async fn get_sale(&self, tenant_id: Uuid, id: Uuid) -> Result<SaleDetail, AppError> {
        found(self.repo.find_sale(tenant_id, id).await?, "sale")
    }

    pub async fn update_item_quantity(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<SaleDetail, AppError> {
        if quantity <= 0 {
            return Err(AppError::invalid("Item quantities must be greater than zero."));
        }

        let detail = self
            .repo
            .update_item_quantity(tenant_id, sale_id, item_id, quantity)
            .await?;
        tracing::info!("sale {} item {} set to {}", sale_id, item_id, quantity);
        Ok(detail)
    }
}
