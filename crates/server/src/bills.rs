//! Quotes and provider bill payments.

use api_types::bill::{BillPay, BillPaymentView, BillQuery, QuoteQuery, QuoteView};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{ProviderAction, User};

use crate::{ServerError, parse_service, requests, server::ServerState};

/// Price breakdown for the caller, flagged with whether the current balance
/// covers it.
pub async fn quote(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<QuoteQuery>,
) -> Result<Json<QuoteView>, ServerError> {
    let service = params.service.as_deref().map(parse_service).transpose()?;
    let quote = state.engine.quote(service, params.price)?;
    let balance = state.engine.user(user.id).await?.balance;
    Ok(Json(QuoteView {
        price: quote.price,
        commission: quote.commission,
        total: quote.total,
        affordable: quote.ensure_affordable(balance).is_ok(),
    }))
}

fn parse_action(raw: Option<&str>) -> Result<ProviderAction, ServerError> {
    match raw.unwrap_or("query") {
        "query" => Ok(ProviderAction::Query),
        "solfa" => Ok(ProviderAction::Solfa),
        "billover" => Ok(ProviderAction::Billover),
        other => Err(ServerError::Generic(format!("unknown lookup action: {other}"))),
    }
}

pub async fn query(
    State(state): State<ServerState>,
    Json(payload): Json<BillQuery>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let service = parse_service(&payload.service)?;
    let action = parse_action(payload.action.as_deref())?;
    let response = state
        .engine
        .lookup_provider(service, &payload.number, action)
        .await?;
    serde_json::to_value(response)
        .map(Json)
        .map_err(|err| ServerError::Generic(format!("unreadable provider answer: {err}")))
}

/// Charges the user and forwards the payment to the provider.
///
/// `201` once the provider accepted it, `202` while it is still pending.
pub async fn pay(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BillPay>,
) -> Result<(StatusCode, Json<BillPaymentView>), ServerError> {
    let service = parse_service(&payload.service)?;
    let payment = state
        .engine
        .pay_bill(user.id, service, &payload.number, payload.amount)
        .await?;

    let status = if payment.request.status.is_final() {
        StatusCode::CREATED
    } else {
        StatusCode::ACCEPTED
    };
    let provider = payment
        .response
        .map(serde_json::to_value)
        .transpose()
        .map_err(|err| ServerError::Generic(format!("unreadable provider answer: {err}")))?;

    Ok((
        status,
        Json(BillPaymentView {
            request: requests::view(payment.request),
            transid: payment.transid,
            provider,
        }),
    ))
}
