// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_store_info,
        handlers::settings::update_hardware_settings,

        // --- Tenants ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::list_tenants,
        handlers::tenancy::get_tenant,
        handlers::tenancy::set_tenant_status,
        handlers::tenancy::delete_tenant,

        // --- Products ---
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::adjust_stock,
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::delete_category,

        // --- Marketplace ---
        handlers::marketplace::list_available,
        handlers::marketplace::get_item,
        handlers::marketplace::restock,
        handlers::marketplace::list_all,
        handlers::marketplace::create_item,
        handlers::marketplace::update_item,
        handlers::marketplace::delete_item,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::update_sale_item,

        // --- Customers ---
        handlers::crm::list_customers,
        handlers::crm::get_customer,
        handlers::crm::create_customer,
        handlers::crm::update_customer,
        handlers::crm::delete_customer,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::CreateUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::Tenant,
            models::tenancy::TenantInfo,
            models::tenancy::PrinterType,
            models::tenancy::ScannerType,
            models::tenancy::PrinterSettings,
            models::tenancy::HardwareSettings,
            models::tenancy::AdminAccountPayload,
            models::tenancy::CreateTenantPayload,
            models::tenancy::TenantStatusPayload,
            models::tenancy::TenantWithAdmin,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::CategoryPayload,
            models::catalog::Product,
            models::catalog::NewProduct,
            models::catalog::ProductChanges,
            models::catalog::StockAdjustment,

            // --- Marketplace ---
            models::marketplace::MarketplaceItem,
            models::marketplace::RestockPayload,
            models::marketplace::RestockOutcome,
            models::marketplace::RestockResult,
            handlers::marketplace::MarketplaceItemForm,

            // --- Sales ---
            models::sales::PaymentMethod,
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::SaleDetail,
            models::sales::SaleLineRequest,
            models::sales::CreateSalePayload,
            models::sales::SaleItemQuantityPayload,

            // --- Customers ---
            models::crm::Customer,
            models::crm::CustomerStats,
            models::crm::CustomerWithStats,
            models::crm::CustomerFields,
        )
    ),
    tags(
        (name = "Auth", description = "Login and current user"),
        (name = "Users", description = "Store staff accounts"),
        (name = "Settings", description = "Store details and POS hardware"),
        (name = "Tenants", description = "Store management (superadmin)"),
        (name = "Products", description = "Store products, categories and stock"),
        (name = "Marketplace", description = "Shared catalog and restock"),
        (name = "Sales", description = "Sales ledger"),
        (name = "Customers", description = "Customers and purchase totals")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
