// src/services/crm_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::found, error::AppError},
    db::CustomerRepository,
    models::crm::{Customer, CustomerFields, CustomerWithStats},
};

#[derive(Clone)]
pub struct CrmService {
    repo: Arc<dyn CustomerRepository>,
}

impl CrmService {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_customers(&self, tenant_id: Uuid) -> Result<Vec<CustomerWithStats>, AppError> {
        self.repo.list_customers(tenant_id).await
    }

    pub async fn get_customer(&self, tenant_id: Uuid, id: Uuid) -> Result<CustomerWithStats, AppError> {
        found(self.repo.find_customer(tenant_id, id).await?, "customer")
    }

    pub async fn create_customer(
        &self,
        tenant_id: Uuid,
        fields: CustomerFields,
    ) -> Result<Customer, AppError> {
        let fields = normalize(fields);
        fields.validate()?;

        let customer = self.repo.create_customer(tenant_id, Uuid::new_v4(), &fields).await?;
        tracing::info!("customer {} created in tenant {}", customer.id, tenant_id);
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        fields: CustomerFields,
    ) -> Result<Customer, AppError> {
        let fields = normalize(fields);
        fields.validate()?;
        found(self.repo.update_customer(tenant_id, id, &fields).await?, "customer")
    }

    // Past sales keep their rows; their customer reference is cleared.
    pub async fn delete_customer(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_customer(tenant_id, id).await? {
            return Err(AppError::NotFound("customer"));
        }
        tracing::info!("customer {} deleted from tenant {}", id, tenant_id);
        Ok(())
    }
}

fn normalize(mut fields: CustomerFields) -> CustomerFields {
    fields.name = fields.name.trim().to_string();
    fields.email = fields.email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty());
    fields.phone = fields.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    fields
}
