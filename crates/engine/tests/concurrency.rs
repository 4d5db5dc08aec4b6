mod common;

use std::{collections::HashSet, path::PathBuf, sync::Arc};

use engine::{Engine, EngineError, NewCard};
use migration::MigratorTrait;
use sea_orm::Database;
use tokio::task::JoinSet;

use common::{admin, balance, customer, fund, pricing};

/// SQLite file removed when the test ends.
struct TempDb(PathBuf);

impl TempDb {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("mahfaza-{}.db", uuid::Uuid::new_v4())))
    }

    fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.0.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

async fn file_engine(file: &TempDb) -> Arc<Engine> {
    let db = Database::connect(file.url()).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .pricing(pricing())
        .build()
        .await
        .unwrap();
    Arc::new(engine)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_never_overdraw() {
    let file = TempDb::new();
    let engine = file_engine(&file).await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    let sara = customer(&engine, "Sara", "711234567").await;
    // three transfers of 1000 plus the 1% fee
    fund(&engine, &admin, &ali, 3030).await;

    let mut tasks = JoinSet::new();
    for _ in 0..10 {
        let engine = Arc::clone(&engine);
        let payer = ali.id;
        tasks.spawn(async move { engine.transfer(payer, "711234567", 1000, None).await });
    }

    let (mut ok, mut insufficient) = (0, 0);
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => ok += 1,
            Err(EngineError::InsufficientFunds(_)) => insufficient += 1,
            Err(other) => panic!("unexpected transfer error: {other}"),
        }
    }

    assert_eq!(ok, 3);
    assert_eq!(insufficient, 7);
    assert_eq!(balance(&engine, &ali).await, 0);
    assert_eq!(balance(&engine, &sara).await, 3000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_buyers_share_limited_cards() {
    let file = TempDb::new();
    let engine = file_engine(&file).await;
    let admin = admin(&engine).await;

    let network = engine.new_network(admin.id, "Yemen Net").await.unwrap();
    let category = engine
        .new_card_category(admin.id, network.id, "1 GB", 1000)
        .await
        .unwrap();
    engine
        .add_cards(
            admin.id,
            category.id,
            vec![NewCard::new("C-1"), NewCard::new("C-2"), NewCard::new("C-3")],
        )
        .await
        .unwrap();

    let mut buyers = Vec::new();
    for i in 0..8 {
        let buyer = customer(&engine, &format!("Buyer {i}"), &format!("77100000{i}")).await;
        fund(&engine, &admin, &buyer, 2000).await;
        buyers.push(buyer);
    }

    let mut tasks = JoinSet::new();
    for buyer in &buyers {
        let engine = Arc::clone(&engine);
        let (buyer_id, category_id) = (buyer.id, category.id);
        tasks.spawn(async move { engine.purchase_card(buyer_id, category_id).await });
    }

    let mut codes = HashSet::new();
    let mut sold_out = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(card) => assert!(codes.insert(card.code)),
            Err(EngineError::SoldOut(_)) => sold_out += 1,
            Err(other) => panic!("unexpected purchase error: {other}"),
        }
    }

    assert_eq!(codes.len(), 3);
    assert_eq!(sold_out, 5);

    let mut charged = 0;
    for buyer in &buyers {
        let left = balance(&engine, buyer).await;
        assert!(left >= 0);
        if left == 950 {
            charged += 1;
        } else {
            assert_eq!(left, 2000);
        }
    }
    assert_eq!(charged, 3);
    let categories = engine.list_card_categories(network.id).await.unwrap();
    assert_eq!(categories[0].available, 0);
}
