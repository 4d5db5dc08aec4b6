use axum::{Json, Router, http::StatusCode, routing::post};
use gateway::{
    Endpoint, GatewayError, GatewayRequest, HttpGateway, Outcome, TelecomGateway,
};
use serde_json::{Value, json};

async fn telecom(Json(body): Json<Value>) -> Json<Value> {
    let code = match body["mobile"].as_str() {
        Some("771111111") => "0",
        Some("772222222") => "-2",
        _ => "7",
    };
    Json(json!({
        "resultCode": code,
        "resultDesc": "echo",
        "action": body["action"],
        "transid": body["transid"],
    }))
}

async fn spawn_provider() -> String {
    let app = Router::new()
        .route("/api/telecom", post(telecom))
        .route(
            "/api/pubg",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route("/api/baity", post(|| async { "not json" }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn posts_request_and_decodes_outcome() {
    let base = spawn_provider().await;
    let gw = HttpGateway::new(reqwest::Client::new(), base).api_key("secret");

    let req = GatewayRequest::bill("771111111", "yemen_mobile", 1000);
    let resp = gw.call(Endpoint::Telecom, &req).await.unwrap();
    assert_eq!(resp.outcome(), Outcome::Success);
    assert_eq!(resp.extra.get("action"), Some(&json!("bill")));
    assert_eq!(
        resp.extra.get("transid"),
        Some(&json!(req.transid.as_str()))
    );

    let resp = gw
        .call(
            Endpoint::Telecom,
            &GatewayRequest::query("772222222", "yemen_mobile"),
        )
        .await
        .unwrap();
    assert_eq!(resp.outcome(), Outcome::Pending);

    let resp = gw
        .call(
            Endpoint::Telecom,
            &GatewayRequest::query("779999999", "yemen_mobile"),
        )
        .await
        .unwrap();
    assert!(matches!(resp.outcome(), Outcome::Failed { code, .. } if code == "7"));
}

#[tokio::test]
async fn base_url_with_trailing_slash_reaches_the_same_route() {
    let base = format!("{}/", spawn_provider().await);
    let gw = HttpGateway::new(reqwest::Client::new(), base);

    let resp = gw
        .call(
            Endpoint::Telecom,
            &GatewayRequest::solfa("771111111", "yemen_mobile"),
        )
        .await
        .unwrap();
    assert_eq!(resp.outcome(), Outcome::Success);
    assert_eq!(resp.extra.get("action"), Some(&json!("solfa")));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base = spawn_provider().await;
    let gw = HttpGateway::new(reqwest::Client::new(), base);

    let err = gw
        .call(Endpoint::Pubg, &GatewayRequest::bill("5123456789", "pubg_uc", 300))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 503, .. }));

    let err = gw
        .call(Endpoint::Baity, &GatewayRequest::query("791234567", "baity"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}
