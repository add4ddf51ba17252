// src/services/catalog_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::found, error::AppError},
    db::CatalogRepository,
    models::catalog::{Category, CategoryPayload, NewProduct, Product, ProductChanges},
};

#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    // --- Products ---

    pub async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.repo.list_products(tenant_id).await
    }

    pub async fn get_product(&self, tenant_id: Uuid, id: Uuid) -> Result<Product, AppError> {
        found(self.repo.find_product(tenant_id, id).await?, "product")
    }

    pub async fn create_product(
        &self,
        tenant_id: Uuid,
        mut product: NewProduct,
    ) -> Result<Product, AppError> {
        product.name = product.name.trim().to_string();
        product.sku = blank_to_none(product.sku);
        product.barcode = blank_to_none(product.barcode);
        product.validate()?;
        self.check_category(tenant_id, product.category_id).await?;

        let product = self.repo.create_product(tenant_id, Uuid::new_v4(), &product).await?;
        tracing::info!("product {} created in tenant {}", product.id, tenant_id);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        mut changes: ProductChanges,
    ) -> Result<Product, AppError> {
        changes.name = changes.name.trim().to_string();
        changes.sku = blank_to_none(changes.sku);
        changes.barcode = blank_to_none(changes.barcode);
        changes.validate()?;
        self.check_category(tenant_id, changes.category_id).await?;

        found(self.repo.update_product(tenant_id, id, &changes).await?, "product")
    }

    pub async fn delete_product(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_product(tenant_id, id).await? {
            return Err(AppError::NotFound("product"));
        }
        tracing::info!("product {} deleted from tenant {}", id, tenant_id);
        Ok(())
    }

    pub async fn adjust_stock(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        delta: i32,
    ) -> Result<Product, AppError> {
        let product = found(self.repo.adjust_stock(tenant_id, id, delta).await?, "product")?;
        tracing::info!(
            "stock of product {} changed by {} to {}",
            product.id,
            delta,
            product.stock_quantity
        );
        Ok(product)
    }

    // --- Categories ---

    pub async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories(tenant_id).await
    }

    pub async fn create_category(
        &self,
        tenant_id: Uuid,
        mut payload: CategoryPayload,
    ) -> Result<Category, AppError> {
        payload.name = payload.name.trim().to_string();
        payload.validate()?;
        self.repo.create_category(tenant_id, Uuid::new_v4(), &payload).await
    }

    pub async fn delete_category(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_category(tenant_id, id).await? {
            return Err(AppError::NotFound("category"));
        }
        Ok(())
    }

    // A category of another tenant is reported exactly like a missing one.
    async fn check_category(&self, tenant_id: Uuid, category_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(category_id) = category_id {
            found(self.repo.find_category(tenant_id, category_id).await?, "category")?;
        }
        Ok(())
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
