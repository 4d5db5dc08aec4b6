//! Transaction history and direct transfers.

use api_types::transaction::{
    TransactionList, TransactionListResponse, TransactionView, TransferNew,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{Transaction, User};

use crate::{ServerError, server::ServerState};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 200;

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        transaction_date: tx.transaction_date,
        amount: tx.amount,
        transaction_type: tx.transaction_type,
        notes: tx.notes,
        request_id: tx.request_id,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let (items, next_cursor) = state
        .engine
        .list_transactions_page(user.id, limit, params.cursor.as_deref())
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: items.into_iter().map(view).collect(),
        next_cursor,
    }))
}

pub async fn transfer(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .transfer(
            user.id,
            &payload.to_phone,
            payload.amount,
            payload.note.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}
