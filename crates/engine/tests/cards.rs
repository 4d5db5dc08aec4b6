mod common;

use engine::{EngineError, NewCard};

use common::{admin, balance, customer, engine_with_db, fund};

#[tokio::test]
async fn last_card_sells_once() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    let sara = customer(&engine, "Sara", "711234567").await;
    fund(&engine, &admin, &ali, 5000).await;
    fund(&engine, &admin, &sara, 5000).await;

    let network = engine.new_network(admin.id, "Yemen Net").await.unwrap();
    let category = engine
        .new_card_category(admin.id, network.id, "1 GB", 1000)
        .await
        .unwrap();
    let added = engine
        .add_cards(
            admin.id,
            category.id,
            vec![NewCard::new("1111-2222").serial("S1")],
        )
        .await
        .unwrap();
    assert_eq!(added, 1);

    let sold = engine.purchase_card(ali.id, category.id).await.unwrap();
    assert_eq!(sold.code, "1111-2222");
    assert_eq!(sold.serial.as_deref(), Some("S1"));
    assert_eq!(sold.commission, 50);
    // 1000 + 5% card commission
    assert_eq!(balance(&engine, &ali).await, 3950);

    let categories = engine.list_card_categories(network.id).await.unwrap();
    assert_eq!(categories[0].available, 0);

    let err = engine.purchase_card(sara.id, category.id).await.unwrap_err();
    assert!(matches!(err, EngineError::SoldOut(_)));
    assert_eq!(balance(&engine, &sara).await, 5000);

    let mine = engine.list_sold_cards(ali.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].transaction_id, sold.transaction_id);
    assert!(engine.list_sold_cards(sara.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn cards_sell_oldest_first_and_need_funds() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    fund(&engine, &admin, &ali, 1100).await;

    let network = engine.new_network(admin.id, "Sabafon").await.unwrap();
    let category = engine
        .new_card_category(admin.id, network.id, "500", 500)
        .await
        .unwrap();
    engine
        .add_cards(admin.id, category.id, vec![NewCard::new("A")])
        .await
        .unwrap();
    engine
        .add_cards(admin.id, category.id, vec![NewCard::new("B")])
        .await
        .unwrap();

    assert_eq!(engine.purchase_card(ali.id, category.id).await.unwrap().code, "A");
    // 575 left, 525 needed
    assert_eq!(engine.purchase_card(ali.id, category.id).await.unwrap().code, "B");

    let poor = customer(&engine, "Sara", "711234567").await;
    engine
        .add_cards(admin.id, category.id, vec![NewCard::new("C")])
        .await
        .unwrap();
    assert!(matches!(
        engine.purchase_card(poor.id, category.id).await,
        Err(EngineError::InsufficientFunds(_))
    ));
    // the card was not consumed by the failed purchase
    assert_eq!(
        engine.list_card_categories(network.id).await.unwrap()[0].available,
        1
    );
}

#[tokio::test]
async fn duplicate_cards_reject_the_batch() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let network = engine.new_network(admin.id, "YOU").await.unwrap();
    let category = engine
        .new_card_category(admin.id, network.id, "250", 250)
        .await
        .unwrap();
    engine
        .add_cards(admin.id, category.id, vec![NewCard::new("X1")])
        .await
        .unwrap();

    assert_eq!(
        engine
            .add_cards(
                admin.id,
                category.id,
                vec![NewCard::new("X2"), NewCard::new("X2")]
            )
            .await,
        Err(EngineError::ExistingKey("card X2".to_string()))
    );
    assert_eq!(
        engine
            .add_cards(
                admin.id,
                category.id,
                vec![NewCard::new("X3"), NewCard::new("X1")]
            )
            .await,
        Err(EngineError::ExistingKey("card X1".to_string()))
    );
    assert_eq!(
        engine.list_card_categories(network.id).await.unwrap()[0].available,
        1
    );
}

#[tokio::test]
async fn catalog_is_admin_managed() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;

    assert!(matches!(
        engine.new_network(ali.id, "Rogue").await,
        Err(EngineError::Forbidden(_))
    ));
    engine.new_network(admin.id, "Y").await.unwrap();
    assert!(matches!(
        engine.new_network(admin.id, " y ").await,
        Err(EngineError::ExistingKey(_))
    ));
    assert_eq!(engine.list_networks().await.unwrap().len(), 1);
}
