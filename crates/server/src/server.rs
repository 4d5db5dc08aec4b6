use axum::{
    Extension, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{admin, bills, cards, notifications, requests, store, subscribers, transactions, user};
use engine::{Engine, User};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves Basic credentials (phone number, password) to a wallet user.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::debug!("authentication refused: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn require_admin(
    Extension(user): Extension<User>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !user.account_type.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "ok"
}

fn admin_router() -> Router<ServerState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/account-type", put(admin::set_account_type))
        .route("/requests", get(admin::list_requests))
        .route("/requests/{id}/approve", post(admin::approve))
        .route("/requests/{id}/reject", post(admin::reject))
        .route("/networks", post(admin::network_new))
        .route("/networks/{id}/categories", post(admin::category_new))
        .route("/categories/{id}/cards", post(admin::cards_add))
        .route(
            "/products",
            get(admin::list_products).post(admin::product_new),
        )
        .route("/products/{id}/active", put(admin::product_active))
        .route_layer(middleware::from_fn(require_admin))
}

/// Full HTTP surface of the wallet.
pub fn app(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    let authenticated = Router::new()
        .route("/me", get(user::me))
        .route("/transactions", get(transactions::list))
        .route("/transfer", post(transactions::transfer))
        .route("/requests", get(requests::list).post(requests::submit))
        .route("/requests/{id}", get(requests::get))
        .route("/quote", get(bills::quote))
        .route("/bills/query", post(bills::query))
        .route("/bills/pay", post(bills::pay))
        .route("/networks", get(cards::list_networks))
        .route("/networks/{id}/categories", get(cards::list_categories))
        .route("/categories/{id}/purchase", post(cards::purchase))
        .route("/cards", get(cards::list_sold))
        .route("/products", get(store::list_products))
        .route("/orders", post(store::order))
        .route("/notifications", get(notifications::list))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route(
            "/subscribers",
            get(subscribers::list).post(subscribers::add),
        )
        .route("/subscribers/{id}", delete(subscribers::remove))
        .nest("/admin", admin_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health))
        .route("/signup", post(user::sign_up))
        .merge(authenticated)
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(Arc::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
