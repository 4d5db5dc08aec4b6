use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{AccountType, Engine, NewUserCmd};

const ADMIN_PHONE: &str = "700000001";
const PASSWORD: &str = "secret-1";

async fn setup() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .new_user(NewUserCmd::new("Admin", ADMIN_PHONE, PASSWORD).account_type(AccountType::Admin))
        .await
        .unwrap();
    server::app(Arc::new(engine))
}

fn basic(phone: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{phone}:{password}"));
    format!("Basic {token}")
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((phone, password)) = auth {
        builder = builder.header(header::AUTHORIZATION, basic(phone, password));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn sign_up(app: &Router, name: &str, phone: &str) {
    let (status, _) = call(
        app,
        "POST",
        "/signup",
        None,
        Some(json!({ "display_name": name, "phone_number": phone, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn deposit(app: &Router, phone: &str, amount: i64) {
    let (status, request) = call(
        app,
        "POST",
        "/requests",
        Some((phone, PASSWORD)),
        Some(json!({ "kind": "deposit", "amount": amount })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = request["id"].as_str().unwrap();
    let (status, _) = call(
        app,
        "POST",
        &format!("/admin/requests/{id}/approve"),
        Some((ADMIN_PHONE, PASSWORD)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let app = setup().await;
    let (status, _) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn sign_up_then_read_profile() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (status, me) = call(&app, "GET", "/me", Some(("771234567", PASSWORD)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["display_name"], "Salem");
    assert_eq!(me["balance"], 0);
    assert_eq!(me["account_type"], "customer");
}

#[tokio::test]
async fn duplicate_phone_is_a_conflict() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (status, body) = call(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({ "display_name": "Other", "phone_number": "771234567", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_or_missing_credentials_are_unauthorized() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (status, _) = call(&app, "GET", "/me", Some(("771234567", "wrong-pass")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customers_cannot_reach_admin_routes() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (status, _) = call(
        &app,
        "GET",
        "/admin/requests",
        Some(("771234567", PASSWORD)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn approved_deposit_credits_and_cannot_be_resolved_twice() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (_, request) = call(
        &app,
        "POST",
        "/requests",
        Some(("771234567", PASSWORD)),
        Some(json!({ "kind": "deposit", "amount": 5000 })),
    )
    .await;
    assert_eq!(request["status"], "pending");
    let id = request["id"].as_str().unwrap().to_string();

    let (status, queue) = call(
        &app,
        "GET",
        "/admin/requests",
        Some((ADMIN_PHONE, PASSWORD)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().unwrap().len(), 1);

    let uri = format!("/admin/requests/{id}/approve");
    let (status, resolved) = call(
        &app,
        "POST",
        &uri,
        Some((ADMIN_PHONE, PASSWORD)),
        Some(json!({ "note": "cash received" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "approved");
    assert_eq!(resolved["resolution_note"], "cash received");

    let (status, _) = call(&app, "POST", &uri, Some((ADMIN_PHONE, PASSWORD)), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, me) = call(&app, "GET", "/me", Some(("771234567", PASSWORD)), None).await;
    assert_eq!(me["balance"], 5000);

    let (_, notifications) = call(
        &app,
        "GET",
        "/notifications?unread_only=true",
        Some(("771234567", PASSWORD)),
        None,
    )
    .await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn transfer_moves_money_and_lists_history() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;
    sign_up(&app, "Huda", "733222111").await;
    deposit(&app, "771234567", 10_000).await;

    let (status, _) = call(
        &app,
        "POST",
        "/transfer",
        Some(("771234567", PASSWORD)),
        Some(json!({ "to_phone": "733222111", "amount": 20_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, tx) = call(
        &app,
        "POST",
        "/transfer",
        Some(("771234567", PASSWORD)),
        Some(json!({ "to_phone": "733222111", "amount": 4000, "note": "rent" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["transaction_type"], "transfer_out");

    let (_, payee) = call(&app, "GET", "/me", Some(("733222111", PASSWORD)), None).await;
    assert_eq!(payee["balance"], 4000);

    let (status, page) = call(
        &app,
        "GET",
        "/transactions?limit=1",
        Some(("771234567", PASSWORD)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["transactions"].as_array().unwrap().len(), 1);
    assert!(page["next_cursor"].is_string());
}

#[tokio::test]
async fn bill_payment_without_provider_is_bad_gateway() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (status, _) = call(
        &app,
        "POST",
        "/bills/pay",
        Some(("771234567", PASSWORD)),
        Some(json!({ "service": "yemen_mobile", "number": "771234567", "amount": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = call(
        &app,
        "POST",
        "/bills/pay",
        Some(("771234567", PASSWORD)),
        Some(json!({ "service": "electricity", "number": "1", "amount": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_adds_commission() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (status, quote) = call(
        &app,
        "GET",
        "/quote?price=1000",
        Some(("771234567", PASSWORD)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        quote["total"].as_i64().unwrap(),
        1000 + quote["commission"].as_i64().unwrap()
    );
    assert_eq!(quote["affordable"], json!(false));

    deposit(&app, "771234567", 10_000).await;
    let (_, quote) = call(
        &app,
        "GET",
        "/quote?price=1000",
        Some(("771234567", PASSWORD)),
        None,
    )
    .await;
    assert_eq!(quote["affordable"], json!(true));
}

#[tokio::test]
async fn unknown_lookup_action_is_rejected() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;

    let (status, body) = call(
        &app,
        "POST",
        "/bills/query",
        Some(("771234567", PASSWORD)),
        Some(json!({ "service": "sabafon", "number": "711234567", "action": "bill" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.to_string().contains("unknown lookup action"));
}

#[tokio::test]
async fn card_catalog_and_purchase() {
    let app = setup().await;
    sign_up(&app, "Salem", "771234567").await;
    deposit(&app, "771234567", 10_000).await;
    let admin = Some((ADMIN_PHONE, PASSWORD));

    let (status, network) = call(
        &app,
        "POST",
        "/admin/networks",
        admin,
        Some(json!({ "name": "Sky Net" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let network_id = network["id"].as_str().unwrap().to_string();

    let (status, category) = call(
        &app,
        "POST",
        &format!("/admin/networks/{network_id}/categories"),
        admin,
        Some(json!({ "name": "1 GB", "price": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, added) = call(
        &app,
        "POST",
        &format!("/admin/categories/{category_id}/cards"),
        admin,
        Some(json!([{ "code": "AAAA-1111" }])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["added"], 1);

    let customer = Some(("771234567", PASSWORD));
    let uri = format!("/categories/{category_id}/purchase");
    let (status, card) = call(&app, "POST", &uri, customer, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["code"], "AAAA-1111");

    let (status, _) = call(&app, "POST", &uri, customer, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, sold) = call(&app, "GET", "/cards", customer, None).await;
    assert_eq!(sold.as_array().unwrap().len(), 1);
}
