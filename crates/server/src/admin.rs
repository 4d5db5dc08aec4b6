//! Administrator endpoints, mounted under `/admin`.
//!
//! The router already refuses non-admin callers; the engine checks again
//! for every operation.

use api_types::{
    card::{CardNew, CardsAdded, CategoryNew, CategoryView, NetworkNew, NetworkView},
    request::{RequestQuery, RequestView, Resolution},
    store::{ProductActive, ProductNew, ProductView},
    user::{AccountTypeUpdate, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{AccountType, NewCard, NewProductCmd, RequestFilter, User};
use uuid::Uuid;

use crate::{
    ServerError,
    cards::{category_view, network_view},
    requests::{self, parse_kind, parse_status},
    server::ServerState,
    store::product_view,
    user,
};

pub async fn list_users(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users(admin.id).await?;
    Ok(Json(users.into_iter().map(user::view).collect()))
}

pub async fn set_account_type(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountTypeUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let account_type = AccountType::try_from(payload.account_type.as_str())
        .map_err(|_| ServerError::Generic("unknown account type".to_string()))?;
    let user = state
        .engine
        .set_account_type(admin.id, id, account_type)
        .await?;
    Ok(Json(user::view(user)))
}

pub async fn delete_user(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(admin.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request queue. Defaults to pending requests only.
pub async fn list_requests(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<RequestQuery>,
) -> Result<Json<Vec<RequestView>>, ServerError> {
    let mut filter = RequestFilter::pending();
    if params.status.is_some() {
        filter.status = parse_status(params.status.as_deref())?;
    }
    filter.kind = parse_kind(params.kind.as_deref())?;
    filter.limit = params.limit;

    let requests = state.engine.list_requests(admin.id, &filter).await?;
    Ok(Json(requests.into_iter().map(requests::view).collect()))
}

pub async fn approve(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<Resolution>>,
) -> Result<Json<RequestView>, ServerError> {
    let note = payload.and_then(|Json(r)| r.note);
    let request = state
        .engine
        .approve_request(id, admin.id, note.as_deref())
        .await?;
    Ok(Json(requests::view(request)))
}

pub async fn reject(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<Resolution>>,
) -> Result<Json<RequestView>, ServerError> {
    let note = payload.and_then(|Json(r)| r.note);
    let request = state
        .engine
        .reject_request(id, admin.id, note.as_deref())
        .await?;
    Ok(Json(requests::view(request)))
}

pub async fn network_new(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<NetworkNew>,
) -> Result<(StatusCode, Json<NetworkView>), ServerError> {
    let network = state.engine.new_network(admin.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(network_view(network))))
}

pub async fn category_new(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Path(network_id): Path<Uuid>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .new_card_category(admin.id, network_id, &payload.name, payload.price)
        .await?;
    Ok((StatusCode::CREATED, Json(category_view(category))))
}

pub async fn cards_add(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<Vec<CardNew>>,
) -> Result<(StatusCode, Json<CardsAdded>), ServerError> {
    let cards = payload
        .into_iter()
        .map(|card| {
            let new = NewCard::new(card.code);
            match card.serial {
                Some(serial) => new.serial(serial),
                None => new,
            }
        })
        .collect();
    let added = state.engine.add_cards(admin.id, category_id, cards).await?;
    Ok((StatusCode::CREATED, Json(CardsAdded { added })))
}

pub async fn list_products(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProductView>>, ServerError> {
    let products = state.engine.list_products(true).await?;
    Ok(Json(products.into_iter().map(product_view).collect()))
}

pub async fn product_new(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<ProductView>), ServerError> {
    let mut cmd = NewProductCmd::new(payload.name, payload.price);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(stock) = payload.stock {
        cmd = cmd.stock(stock);
    }
    let product = state.engine.new_product(admin.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(product_view(product))))
}

pub async fn product_active(
    Extension(admin): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductActive>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state
        .engine
        .set_product_active(admin.id, id, payload.active)
        .await?;
    Ok(Json(product_view(product)))
}
