// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{User, UserRole},
};

/// 1. What a guard checks
pub trait AccessRule: Send + Sync + 'static {
    fn allows(user: &User) -> bool;
    fn describe() -> &'static str;
}

/// 2. The guard extractor. Put it in a handler's arguments to require `T`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: AccessRule,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::Unauthorized)?;

        if !T::allows(&user.0) {
            return Err(AppError::Forbidden(format!(
                "This action requires the {} role.",
                T::describe()
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// RULES
// ---

fn has_role(user: &User, required: UserRole) -> bool {
    user.role.includes(required)
}

pub struct CashierAccess;
impl AccessRule for CashierAccess {
    fn allows(user: &User) -> bool { has_role(user, UserRole::Cashier) }
    fn describe() -> &'static str { "cashier" }
}

pub struct ManagerAccess;
impl AccessRule for ManagerAccess {
    fn allows(user: &User) -> bool { has_role(user, UserRole::Manager) }
    fn describe() -> &'static str { "manager" }
}

pub struct AdminAccess;
impl AccessRule for AdminAccess {
    fn allows(user: &User) -> bool { has_role(user, UserRole::Admin) }
    fn describe() -> &'static str { "admin" }
}

/// Marketplace and tenant management. Independent of the tenant role.
pub struct SuperadminAccess;
impl AccessRule for SuperadminAccess {
    fn allows(user: &User) -> bool { user.is_superadmin }
    fn describe() -> &'static str { "superadmin" }
}

pub type RequireCashier = RequireRole<CashierAccess>;
pub type RequireManager = RequireRole<ManagerAccess>;
pub type RequireAdmin = RequireRole<AdminAccess>;
pub type RequireSuperadmin = RequireRole<SuperadminAccess>;
