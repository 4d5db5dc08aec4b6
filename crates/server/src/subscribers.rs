//! Saved subscriber numbers.

use api_types::subscriber::{SubscriberNew, SubscriberView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Subscriber, User};
use uuid::Uuid;

use crate::{ServerError, parse_service, server::ServerState};

fn view(subscriber: Subscriber) -> SubscriberView {
    SubscriberView {
        id: subscriber.id,
        label: subscriber.label,
        service: subscriber.service.as_str().to_string(),
        phone_number: subscriber.phone_number,
    }
}

pub async fn add(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<SubscriberNew>,
) -> Result<(StatusCode, Json<SubscriberView>), ServerError> {
    let service = parse_service(&payload.service)?;
    let subscriber = state
        .engine
        .add_subscriber(user.id, &payload.label, service, &payload.number)
        .await?;
    Ok((StatusCode::CREATED, Json(view(subscriber))))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<SubscriberView>>, ServerError> {
    let subscribers = state.engine.list_subscribers(user.id).await?;
    Ok(Json(subscribers.into_iter().map(view).collect()))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_subscriber(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
