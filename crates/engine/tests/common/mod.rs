#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gateway::{Endpoint, GatewayError, GatewayRequest, GatewayResponse, TelecomGateway};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    AccountType, CommissionRate, Engine, NewUserCmd, Pricing, RequestCmd, User,
};
use migration::MigratorTrait;

pub const PASSWORD: &str = "secret-1";

pub fn pricing() -> Pricing {
    Pricing {
        default_rate: CommissionRate::from_percent(10),
        transfer_rate: CommissionRate::from_percent(1),
        withdrawal_rate: CommissionRate::from_percent(2),
        card_rate: CommissionRate::from_percent(5),
        ..Default::default()
    }
}

pub async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = database().await;
    let engine = Engine::builder()
        .database(db.clone())
        .pricing(pricing())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_gateway(gateway: Arc<FakeGateway>) -> Engine {
    Engine::builder()
        .database(database().await)
        .pricing(pricing())
        .gateway(gateway)
        .build()
        .await
        .unwrap()
}

pub async fn customer(engine: &Engine, name: &str, phone: &str) -> User {
    engine
        .new_user(NewUserCmd::new(name, phone, PASSWORD))
        .await
        .unwrap()
}

pub async fn admin(engine: &Engine) -> User {
    engine
        .new_user(NewUserCmd::new("Admin", "700000001", PASSWORD).account_type(AccountType::Admin))
        .await
        .unwrap()
}

/// Credits `amount` to `user` through an approved deposit request.
pub async fn fund(engine: &Engine, admin: &User, user: &User, amount: i64) {
    let deposit = engine
        .submit_request(RequestCmd::deposit(user.id, amount).details("cash at agent"))
        .await
        .unwrap();
    engine
        .approve_request(deposit.id, admin.id, None)
        .await
        .unwrap();
}

pub async fn balance(engine: &Engine, user: &User) -> i64 {
    engine.user(user.id).await.unwrap().balance
}

/// Provider stand-in answering every call with a fixed result.
pub struct FakeGateway {
    answer: Answer,
    pub calls: Mutex<Vec<(Endpoint, GatewayRequest)>>,
}

enum Answer {
    Code(&'static str, Option<&'static str>),
    Unreachable,
}

impl FakeGateway {
    pub fn answering(code: &'static str) -> Arc<Self> {
        Arc::new(Self {
            answer: Answer::Code(code, None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn refusing(code: &'static str, message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            answer: Answer::Code(code, Some(message)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            answer: Answer::Unreachable,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Endpoint, GatewayRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelecomGateway for FakeGateway {
    async fn call(
        &self,
        endpoint: Endpoint,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        self.calls.lock().unwrap().push((endpoint, request.clone()));
        match self.answer {
            Answer::Code(code, message) => Ok(GatewayResponse {
                result_code: code.to_string(),
                message: message.map(str::to_string),
                ..Default::default()
            }),
            Answer::Unreachable => Err(GatewayError::Status {
                status: 504,
                body: "gateway timeout".to_string(),
            }),
        }
    }
}
