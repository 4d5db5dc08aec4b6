//! Sign-up and profile endpoints.

use api_types::user::{SignUp, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{NewUserCmd, User};

use crate::{ServerError, server::ServerState};

pub(crate) fn view(user: User) -> UserView {
    UserView {
        id: user.id,
        display_name: user.display_name,
        phone_number: user.phone_number,
        balance: user.balance,
        account_type: user.account_type.as_str().to_string(),
        created_at: user.created_at,
    }
}

/// Self-service registration. Always creates a customer account.
pub async fn sign_up(
    State(state): State<ServerState>,
    Json(payload): Json<SignUp>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .new_user(NewUserCmd::new(
            payload.display_name,
            payload.phone_number,
            payload.password,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(view(user))))
}

pub async fn me(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(user.id).await?;
    Ok(Json(view(user)))
}
