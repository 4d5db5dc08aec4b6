mod common;

use engine::{EngineError, NewProductCmd, ProviderService, RequestFilter, RequestStatus};

use common::{admin, balance, customer, engine_with_db, fund};

#[tokio::test]
async fn rejected_order_refunds_and_restocks() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    fund(&engine, &admin, &ali, 10_000).await;

    let router = engine
        .new_product(admin.id, NewProductCmd::new("4G Router", 3000).stock(2))
        .await
        .unwrap();

    let order = engine
        .place_order(ali.id, router.id, 2, Some("deliver to Aden"))
        .await
        .unwrap();
    assert_eq!(order.amount, 6000);
    assert_eq!(order.debited, 6000);
    assert_eq!(order.quantity, Some(2));
    assert_eq!(balance(&engine, &ali).await, 4000);
    assert_eq!(engine.list_products(false).await.unwrap()[0].stock, Some(0));

    assert!(matches!(
        engine.place_order(ali.id, router.id, 1, None).await,
        Err(EngineError::SoldOut(_))
    ));

    let rejected = engine
        .reject_request(order.id, admin.id, Some("out of stock at warehouse"))
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(balance(&engine, &ali).await, 10_000);
    assert_eq!(engine.list_products(false).await.unwrap()[0].stock, Some(2));
}

#[tokio::test]
async fn deleting_a_buyer_releases_reserved_stock() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    fund(&engine, &admin, &ali, 10_000).await;

    let router = engine
        .new_product(admin.id, NewProductCmd::new("4G Router", 3000).stock(2))
        .await
        .unwrap();
    engine.place_order(ali.id, router.id, 2, None).await.unwrap();
    assert_eq!(engine.list_products(false).await.unwrap()[0].stock, Some(0));

    engine.delete_user(admin.id, ali.id).await.unwrap();

    assert_eq!(engine.list_products(false).await.unwrap()[0].stock, Some(2));
    let pending = engine
        .list_requests(admin.id, &RequestFilter::pending())
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn approved_order_keeps_the_charge() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    fund(&engine, &admin, &ali, 1000).await;

    let service = engine
        .new_product(admin.id, NewProductCmd::new("SIM swap", 800))
        .await
        .unwrap();
    let order = engine.place_order(ali.id, service.id, 1, None).await.unwrap();
    engine.approve_request(order.id, admin.id, None).await.unwrap();
    assert_eq!(balance(&engine, &ali).await, 200);

    engine
        .set_product_active(admin.id, service.id, false)
        .await
        .unwrap();
    assert!(engine.list_products(false).await.unwrap().is_empty());
    assert_eq!(engine.list_products(true).await.unwrap().len(), 1);
    assert!(matches!(
        engine.place_order(ali.id, service.id, 1, None).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn order_without_funds_keeps_stock() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    let phone = engine
        .new_product(admin.id, NewProductCmd::new("Phone", 50_000).stock(1))
        .await
        .unwrap();

    assert!(matches!(
        engine.place_order(ali.id, phone.id, 1, None).await,
        Err(EngineError::InsufficientFunds(_))
    ));
    assert_eq!(engine.list_products(false).await.unwrap()[0].stock, Some(1));
}

#[tokio::test]
async fn saved_subscribers_follow_service_rules() {
    let (engine, _db) = engine_with_db().await;
    let ali = customer(&engine, "Ali", "771234567").await;

    let home = engine
        .add_subscriber(ali.id, "Home 4G", ProviderService::Baity, "791234567")
        .await
        .unwrap();
    assert!(matches!(
        engine
            .add_subscriber(ali.id, "Bad", ProviderService::Baity, "771234567")
            .await,
        Err(EngineError::InvalidPhone(_))
    ));
    assert!(matches!(
        engine
            .add_subscriber(ali.id, "Again", ProviderService::Baity, "79 123 4567")
            .await,
        Err(EngineError::ExistingKey(_))
    ));

    let saved = engine.list_subscribers(ali.id).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, home.id);
    assert_eq!(saved[0].phone_number, "791234567");
    engine.remove_subscriber(ali.id, home.id).await.unwrap();
    assert!(engine.list_subscribers(ali.id).await.unwrap().is_empty());
    assert!(matches!(
        engine.remove_subscriber(ali.id, home.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
