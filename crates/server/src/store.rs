use api_types::{
    request::RequestView,
    store::{OrderNew, ProductView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Product, User};

use crate::{ServerError, requests, server::ServerState};

pub(crate) fn product_view(product: Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        description: product.description,
        price: product.price,
        stock: product.stock,
        active: product.active,
    }
}

pub async fn list_products(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProductView>>, ServerError> {
    let products = state.engine.list_products(false).await?;
    Ok(Json(products.into_iter().map(product_view).collect()))
}

pub async fn order(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<OrderNew>,
) -> Result<(StatusCode, Json<RequestView>), ServerError> {
    let request = state
        .engine
        .place_order(
            user.id,
            payload.product_id,
            payload.quantity,
            payload.note.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(requests::view(request))))
}
