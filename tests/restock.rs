mod common;

use common::TestApp;
use pos_admin::{common::error::AppError, models::marketplace::RestockOutcome};
use uuid::Uuid;

#[tokio::test]
async fn restock_rejects_non_positive_quantity_without_side_effects() {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Toko A").await;
    let item = app.seed_marketplace_item("Kopi Bubuk 200g", 25_000, 40).await;

    for quantity in [0, -3] {
        let err = app
            .state
            .marketplace_service
            .restock(tenant.id, item.id, quantity)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
    assert!(app.products_of(tenant.id).await.is_empty());
}

#[tokio::test]
async fn first_restock_clones_the_item_then_merges() {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Toko A").await;
    let item = app.seed_marketplace_item("Gula Pasir 1kg", 14_500, 100).await;

    let first = app.state.marketplace_service.restock(tenant.id, item.id, 4).await.unwrap();
    assert_eq!(first.outcome, RestockOutcome::Created);
    assert_eq!(first.product.name, item.name);
    assert_eq!(first.product.price, item.price);
    assert_eq!(first.product.description, item.description);
    assert_eq!(first.product.stock_quantity, 4);

    let second = app.state.marketplace_service.restock(tenant.id, item.id, 6).await.unwrap();
    assert_eq!(second.outcome, RestockOutcome::Merged);
    assert_eq!(second.product.id, first.product.id);
    assert_eq!(second.product.stock_quantity, 10);

    assert_eq!(app.products_of(tenant.id).await.len(), 1);
}

#[tokio::test]
async fn restock_leaves_marketplace_stock_untouched() {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Toko A").await;
    let item = app.seed_marketplace_item("Minyak Goreng 2L", 36_000, 12).await;

    app.state.marketplace_service.restock(tenant.id, item.id, 50).await.unwrap();

    let after = app.state.marketplace_service.get_item(item.id).await.unwrap();
    assert_eq!(after.stock, 12);
}

#[tokio::test]
async fn restock_merges_into_a_product_created_by_hand() {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Toko A").await;
    let own = app.seed_product(tenant.id, "Teh Celup", 8_000, 3).await;
    let item = app.seed_marketplace_item("Teh Celup", 7_500, 30).await;

    let result = app.state.marketplace_service.restock(tenant.id, item.id, 2).await.unwrap();
    assert_eq!(result.outcome, RestockOutcome::Merged);
    assert_eq!(result.product.id, own.id);
    // Merging only adds stock; the tenant's own price stays.
    assert_eq!(result.product.price, own.price);
    assert_eq!(app.stock_of(own.id).await, 5);
}

#[tokio::test]
async fn concurrent_restocks_end_in_one_product() {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Toko A").await;
    let item = app.seed_marketplace_item("Beras 5kg", 70_000, 20).await;

    let service = &app.state.marketplace_service;
    let (a, b) = tokio::join!(
        service.restock(tenant.id, item.id, 5),
        service.restock(tenant.id, item.id, 3),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let mut outcomes = vec![a.outcome, b.outcome];
    outcomes.sort_by_key(|o| *o == RestockOutcome::Merged);
    assert_eq!(outcomes, vec![RestockOutcome::Created, RestockOutcome::Merged]);

    let products = app.products_of(tenant.id).await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].stock_quantity, 8);
}

#[tokio::test]
async fn restock_is_scoped_to_the_calling_tenant() {
    let app = TestApp::new();
    let a = app.seed_tenant("Toko A").await;
    let b = app.seed_tenant("Toko B").await;
    let item = app.seed_marketplace_item("Sabun Mandi", 4_000, 90).await;

    app.state.marketplace_service.restock(a.id, item.id, 7).await.unwrap();
    let in_b = app.state.marketplace_service.restock(b.id, item.id, 2).await.unwrap();

    // Tenant B gets its own clone instead of merging into A's product.
    assert_eq!(in_b.outcome, RestockOutcome::Created);
    assert_eq!(in_b.product.tenant_id, b.id);
    assert_eq!(app.products_of(a.id).await[0].stock_quantity, 7);
    assert_eq!(app.products_of(b.id).await[0].stock_quantity, 2);
}

#[tokio::test]
async fn cloned_product_drops_a_sku_already_in_use() {
    let app = TestApp::new();
    let a = app.seed_tenant("Toko A").await;
    let b = app.seed_tenant("Toko B").await;
    let item = app.seed_marketplace_item("Susu UHT", 6_000, 50).await;
    {
        let mut data = app.db.data.lock().await;
        data.marketplace[0].sku = Some("UHT-250".to_string());
    }

    let in_a = app.state.marketplace_service.restock(a.id, item.id, 1).await.unwrap();
    let in_b = app.state.marketplace_service.restock(b.id, item.id, 1).await.unwrap();

    assert_eq!(in_a.product.sku.as_deref(), Some("UHT-250"));
    assert_eq!(in_b.outcome, RestockOutcome::Created);
    assert_eq!(in_b.product.sku, None);
}

#[tokio::test]
async fn restock_of_unknown_item_is_not_found() {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Toko A").await;

    let err = app
        .state
        .marketplace_service
        .restock(tenant.id, Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("marketplace item")));
}

#[tokio::test]
async fn merge_past_the_stock_limit_is_rejected() {
    let app = TestApp::new();
    let tenant = app.seed_tenant("Toko A").await;
    let item = app.seed_marketplace_item("Beras 5kg", 70_000, 10).await;
    let product = app.seed_product(tenant.id, "Beras 5kg", 70_000, i32::MAX - 1).await;

    let err = app
        .state
        .marketplace_service
        .restock(tenant.id, item.id, 2)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert_eq!(app.stock_of(product.id).await, i32::MAX - 1);
}
