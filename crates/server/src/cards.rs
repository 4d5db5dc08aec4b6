use api_types::card::{CategoryView, NetworkView, SoldCardView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CardCategory, Network, SoldCard, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn network_view(network: Network) -> NetworkView {
    NetworkView {
        id: network.id,
        name: network.name,
    }
}

pub(crate) fn category_view(category: CardCategory) -> CategoryView {
    CategoryView {
        id: category.id,
        network_id: category.network_id,
        name: category.name,
        price: category.price,
        available: category.available,
    }
}

fn sold_view(card: SoldCard) -> SoldCardView {
    SoldCardView {
        id: card.id,
        category_id: card.category_id,
        code: card.code,
        serial: card.serial,
        price: card.price,
        commission: card.commission,
        sold_at: card.sold_at,
    }
}

pub async fn list_networks(
    State(state): State<ServerState>,
) -> Result<Json<Vec<NetworkView>>, ServerError> {
    let networks = state.engine.list_networks().await?;
    Ok(Json(networks.into_iter().map(network_view).collect()))
}

pub async fn list_categories(
    State(state): State<ServerState>,
    Path(network_id): Path<Uuid>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_card_categories(network_id).await?;
    Ok(Json(categories.into_iter().map(category_view).collect()))
}

pub async fn purchase(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SoldCardView>), ServerError> {
    let card = state.engine.purchase_card(user.id, category_id).await?;
    Ok((StatusCode::CREATED, Json(sold_view(card))))
}

pub async fn list_sold(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<SoldCardView>>, ServerError> {
    let cards = state.engine.list_sold_cards(user.id).await?;
    Ok(Json(cards.into_iter().map(sold_view).collect()))
}
