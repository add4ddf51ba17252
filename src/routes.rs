// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

const MAX_IMAGE_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    // Public
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Everything below requires a bearer token; role guards sit on the handlers.
    let user_routes = Router::new()
        .route("/",
               get(handlers::users::list_users)
               .post(handlers::users::create_user)
        );

    let settings_routes = Router::new()
        .route("/", get(handlers::settings::get_settings))
        .route("/store", put(handlers::settings::update_store_info))
        .route("/hardware", put(handlers::settings::update_hardware_settings));

    let tenant_routes = Router::new()
        .route("/",
               post(handlers::tenancy::create_tenant)
               .get(handlers::tenancy::list_tenants)
        )
        .route("/{id}",
               get(handlers::tenancy::get_tenant)
               .delete(handlers::tenancy::delete_tenant)
        )
        .route("/{id}/status", patch(handlers::tenancy::set_tenant_status));

    let product_routes = Router::new()
        .route("/",
               get(handlers::catalog::list_products)
               .post(handlers::catalog::create_product)
        )
        .route("/{id}",
               get(handlers::catalog::get_product)
               .put(handlers::catalog::update_product)
               .delete(handlers::catalog::delete_product)
        )
        .route("/{id}/stock", post(handlers::catalog::adjust_stock));

    let category_routes = Router::new()
        .route("/",
               get(handlers::catalog::list_categories)
               .post(handlers::catalog::create_category)
        )
        .route("/{id}", delete(handlers::catalog::delete_category));

    let marketplace_routes = Router::new()
        .route("/", get(handlers::marketplace::list_available))
        .route("/{id}", get(handlers::marketplace::get_item))
        .route("/{id}/restock", post(handlers::marketplace::restock));

    let marketplace_admin_routes = Router::new()
        .route("/",
               get(handlers::marketplace::list_all)
               .post(handlers::marketplace::create_item)
        )
        .route("/{id}",
               put(handlers::marketplace::update_item)
               .delete(handlers::marketplace::delete_item)
        )
        .layer(DefaultBodyLimit::max(MAX_IMAGE_UPLOAD_BYTES));

    let sales_routes = Router::new()
        .route("/",
               get(handlers::sales::list_sales)
               .post(handlers::sales::create_sale)
        )
        .route("/{id}", get(handlers::sales::get_sale))
        .route("/{sale_id}/items/{item_id}", put(handlers::sales::update_sale_item));

    let customer_routes = Router::new()
        .route("/",
               get(handlers::crm::list_customers)
               .post(handlers::crm::create_customer)
        )
        .route("/{id}",
               get(handlers::crm::get_customer)
               .put(handlers::crm::update_customer)
               .delete(handlers::crm::delete_customer)
        );

    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .nest("/users", user_routes)
        .nest("/settings", settings_routes)
        .nest("/tenants", tenant_routes)
        .nest("/products", product_routes)
        .nest("/categories", category_routes)
        .nest("/marketplace", marketplace_routes)
        .nest("/admin/marketplace", marketplace_admin_routes)
        .nest("/sales", sales_routes)
        .nest("/customers", customer_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .with_state(app_state)
}
