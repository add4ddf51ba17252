// src/services/tenancy_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::found, error::AppError},
    config::BootstrapConfig,
    db::{TenantRepository, UserRepository},
    models::{
        auth::{CreateUserPayload, NewUser, User, UserRole},
        tenancy::{
            CreateTenantPayload, HardwareSettings, NewTenant, Tenant, TenantInfo, TenantWithAdmin,
        },
    },
    services::auth::hash_password,
};

const DEFAULT_TENANT_NAME: &str = "Default Store";
const SUPERADMIN_USERNAME: &str = "superadmin";

/// Tenants, their users and their settings.
#[derive(Clone)]
pub struct TenantService {
    tenant_repo: Arc<dyn TenantRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl TenantService {
    pub fn new(tenant_repo: Arc<dyn TenantRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { tenant_repo, user_repo }
    }

    // --- Superadmin: tenant management ---

    pub async fn create_tenant(&self, payload: CreateTenantPayload) -> Result<TenantWithAdmin, AppError> {
        payload.validate()?;

        let tenant_id = Uuid::new_v4();
        let password_hash = hash_password(&payload.admin.password).await?;
        let admin = NewUser {
            tenant_id,
            username: payload.admin.username.trim().to_string(),
            email: payload.admin.email.trim().to_lowercase(),
            password_hash,
            role: UserRole::Admin,
            first_name: payload.admin.first_name,
            last_name: payload.admin.last_name,
            phone: None,
            is_superadmin: false,
        };
        let tenant = NewTenant {
            info: payload.store,
            subdomain: payload
                .subdomain
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            is_default: false,
        };

        let (tenant, admin) = self
            .tenant_repo
            .create_tenant_with_admin(tenant_id, &tenant, &admin)
            .await?;

        tracing::info!("tenant {} created with admin {}", tenant.id, admin.id);
        Ok(TenantWithAdmin { tenant, admin })
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        self.tenant_repo.list().await
    }

    pub async fn get_tenant(&self, id: Uuid) -> Result<Tenant, AppError> {
        found(self.tenant_repo.find_by_id(id).await?, "tenant")
    }

    pub async fn set_tenant_active(&self, id: Uuid, is_active: bool) -> Result<Tenant, AppError> {
        let tenant = self.get_tenant(id).await?;
        if tenant.is_default && !is_active {
            return Err(AppError::conflict("The default store cannot be disabled."));
        }

        let tenant = found(self.tenant_repo.set_active(id, is_active).await?, "tenant")?;
        tracing::info!("tenant {} active = {}", tenant.id, is_active);
        Ok(tenant)
    }

    pub async fn delete_tenant(&self, id: Uuid) -> Result<(), AppError> {
        let tenant = self.get_tenant(id).await?;
        if tenant.is_default {
            return Err(AppError::conflict("The default store cannot be deleted."));
        }

        if !self.tenant_repo.delete(id).await? {
            return Err(AppError::NotFound("tenant"));
        }
        tracing::info!("tenant {} deleted", id);
        Ok(())
    }

    // --- Tenant admin: users ---

    pub async fn list_users(&self, tenant_id: Uuid) -> Result<Vec<User>, AppError> {
        self.user_repo.list_for_tenant(tenant_id).await
    }

    pub async fn create_user(
        &self,
        tenant_id: Uuid,
        payload: CreateUserPayload,
    ) -> Result<User, AppError> {
        payload.validate()?;

        let password_hash = hash_password(&payload.password).await?;
        let user = self
            .user_repo
            .create_user(&NewUser {
                tenant_id,
                username: payload.username.trim().to_string(),
                email: payload.email.trim().to_lowercase(),
                password_hash,
                role: payload.role,
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
                is_superadmin: false,
            })
            .await?;

        tracing::info!("user {} ({}) created in tenant {}", user.id, user.role.as_str(), tenant_id);
        Ok(user)
    }

    // --- Settings ---

    pub async fn get_settings(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.get_tenant(tenant_id).await
    }

    pub async fn update_tenant_info(
        &self,
        tenant_id: Uuid,
        info: TenantInfo,
    ) -> Result<Tenant, AppError> {
        info.validate()?;
        found(self.tenant_repo.update_info(tenant_id, &info).await?, "tenant")
    }

    pub async fn update_hardware_settings(
        &self,
        tenant_id: Uuid,
        settings: HardwareSettings,
    ) -> Result<Tenant, AppError> {
        settings.validate()?;
        found(self.tenant_repo.update_hardware(tenant_id, &settings).await?, "tenant")
    }

    // --- Startup ---

    /// Makes sure a default tenant and a superadmin exist. Idempotent.
    pub async fn bootstrap(&self, config: &BootstrapConfig) -> Result<(), AppError> {
        if self.user_repo.any_superadmin().await? {
            return Ok(());
        }

        let email = config.superadmin_email.trim().to_lowercase();
        let password_hash = hash_password(&config.superadmin_password).await?;

        let superadmin = |tenant_id: Uuid| NewUser {
            tenant_id,
            username: SUPERADMIN_USERNAME.to_string(),
            email: email.clone(),
            password_hash: password_hash.clone(),
            role: UserRole::Admin,
            first_name: None,
            last_name: None,
            phone: None,
            is_superadmin: true,
        };

        match self.tenant_repo.find_default().await? {
            Some(tenant) => {
                self.user_repo.create_user(&superadmin(tenant.id)).await?;
            }
            None => {
                let tenant_id = Uuid::new_v4();
                let tenant = NewTenant {
                    info: TenantInfo {
                        name: DEFAULT_TENANT_NAME.to_string(),
                        email: email.clone(),
                        phone: None,
                        address: None,
                    },
                    subdomain: None,
                    is_default: true,
                };
                self.tenant_repo
                    .create_tenant_with_admin(tenant_id, &tenant, &superadmin(tenant_id))
                    .await?;
            }
        }

        tracing::info!("✅ Superadmin {} bootstrapped", email);
        Ok(())
    }
}
