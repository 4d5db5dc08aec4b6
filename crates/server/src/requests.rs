//! Requests submitted by the signed-in user.

use api_types::request::{RequestNew, RequestQuery, RequestView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{LedgerRequest, RequestCmd, RequestKind, RequestStatus, User};
use uuid::Uuid;

use crate::{ServerError, parse_service, server::ServerState};

pub(crate) fn view(request: LedgerRequest) -> RequestView {
    RequestView {
        id: request.id,
        kind: request.kind.as_str().to_string(),
        status: request.status.as_str().to_string(),
        requester_id: request.requester_id,
        target: request.target,
        service: request.service.map(|s| s.as_str().to_string()),
        amount: request.amount,
        fee: request.fee,
        debited: request.debited,
        quantity: request.quantity,
        details: request.details,
        requested_at: request.requested_at,
        resolved_at: request.resolved_at,
        resolved_by: request.resolved_by,
        resolution_note: request.resolution_note,
    }
}

pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<RequestStatus>, ServerError> {
    raw.map(RequestStatus::try_from)
        .transpose()
        .map_err(|_| ServerError::Generic("unknown request status".to_string()))
}

pub(crate) fn parse_kind(raw: Option<&str>) -> Result<Option<RequestKind>, ServerError> {
    raw.map(RequestKind::try_from)
        .transpose()
        .map_err(|_| ServerError::Generic("unknown request kind".to_string()))
}

pub async fn submit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<RequestNew>,
) -> Result<(StatusCode, Json<RequestView>), ServerError> {
    let kind = parse_kind(Some(payload.kind.as_str()))?
        .ok_or_else(|| ServerError::Generic("missing request kind".to_string()))?;

    let mut cmd = RequestCmd::new(kind, user.id, payload.amount);
    if let Some(target) = payload.target {
        cmd = cmd.target(target);
    }
    if let Some(service) = payload.service.as_deref() {
        cmd = cmd.service(parse_service(service)?);
    }
    if let Some(details) = payload.details {
        cmd = cmd.details(details);
    }

    let request = state.engine.submit_request(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(request))))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(params): Query<RequestQuery>,
) -> Result<Json<Vec<RequestView>>, ServerError> {
    let status = parse_status(params.status.as_deref())?;
    let requests = state.engine.list_requests_for_user(user.id, status).await?;
    Ok(Json(requests.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestView>, ServerError> {
    let request = state.engine.request(id, user.id).await?;
    Ok(Json(view(request)))
}
