// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TenantRepository, UserRepository},
    models::auth::{Claims, User},
};

const TOKEN_TTL_DAYS: i64 = 7;

/// The caller behind a valid token, with its tenant already checked.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tenant_id: Uuid,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    tenant_repo: Arc<dyn TenantRepository>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        tenant_repo: Arc<dyn TenantRepository>,
        jwt_secret: String,
    ) -> Self {
        Self { user_repo, tenant_repo, jwt_secret }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // bcrypt is CPU-bound; keep it off the async workers.
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AppError::Forbidden("This account is disabled.".to_string()));
        }
        self.ensure_tenant_active(user.tenant_id).await?;

        self.user_repo.record_login(user.id).await?;
        tracing::info!("user {} logged in", user.id);

        self.create_token(user.id)
    }

    /// Resolves a bearer token to an active user of an active tenant.
    pub async fn authenticate(&self, token: &str) -> Result<Session, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::Forbidden("This account is disabled.".to_string()));
        }

        self.ensure_tenant_active(user.tenant_id).await?;

        Ok(Session { tenant_id: user.tenant_id, user })
    }

    async fn ensure_tenant_active(&self, tenant_id: Uuid) -> Result<(), AppError> {
        let tenant = self
            .tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !tenant.is_active {
            return Err(AppError::Forbidden("This store is disabled.".to_string()));
        }
        Ok(())
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;
    Ok(hashed)
}
