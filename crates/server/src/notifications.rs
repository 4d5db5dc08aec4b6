use api_types::notification::{NotificationQuery, NotificationView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<NotificationQuery>,
) -> Result<Json<Vec<NotificationView>>, ServerError> {
    let notifications = state
        .engine
        .list_notifications(user.id, params.unread_only.unwrap_or(false))
        .await?;

    let res = notifications
        .into_iter()
        .map(|n| NotificationView {
            id: n.id,
            title: n.title,
            body: n.body,
            created_at: n.created_at,
            read: n.read,
        })
        .collect();
    Ok(Json(res))
}

pub async fn mark_read(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.mark_notification_read(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
