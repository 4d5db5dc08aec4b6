//! Request resolver.
//!
//! A resolution is one DB transaction: the status moves out of `pending`
//! with a conditional update, then the settlement effects for the request
//! kind are applied. A request that was already resolved matches no row, so a
//! repeated approve or reject fails with `InvalidTransition` before any money
//! moves.

use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    ApproveEffect, EngineError, LedgerRequest, Money, RejectEffect, RequestKind, RequestStatus,
    ResultEngine, Transaction, TransactionKind, products, requests,
    util::{normalize_optional_text, parse_uuid},
};

use super::{Engine, ledger, notifications::notify, with_tx};

/// `resolved_by` of requests settled from the provider's answer.
pub const SYSTEM_RESOLVER: &str = "system";

/// Filters for the administrator request queue.
#[derive(Clone, Debug, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub kind: Option<RequestKind>,
    pub requester_id: Option<Uuid>,
    /// Maximum number of requests returned (all when `None`).
    pub limit: Option<u64>,
}

impl RequestFilter {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            status: Some(RequestStatus::Pending),
            ..Self::default()
        }
    }
}

impl Engine {
    /// Lists requests for administrators, newest first.
    pub async fn list_requests(
        &self,
        admin_id: Uuid,
        filter: &RequestFilter,
    ) -> ResultEngine<Vec<LedgerRequest>> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;

            let mut query = requests::Entity::find();
            if let Some(status) = filter.status {
                query = query.filter(requests::Column::Status.eq(status.as_str()));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(requests::Column::Kind.eq(kind.as_str()));
            }
            if let Some(requester_id) = filter.requester_id {
                query = query.filter(requests::Column::RequesterId.eq(requester_id.to_string()));
            }
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }
            query
                .order_by_desc(requests::Column::RequestedAt)
                .order_by_desc(requests::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(LedgerRequest::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn approve_request(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        note: Option<&str>,
    ) -> ResultEngine<LedgerRequest> {
        with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, admin_id).await?;
            self.resolve_in(&db_tx, request_id, RequestStatus::Approved, &admin.id, note)
                .await
        })
    }

    pub async fn reject_request(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        note: Option<&str>,
    ) -> ResultEngine<LedgerRequest> {
        with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, admin_id).await?;
            self.resolve_in(&db_tx, request_id, RequestStatus::Rejected, &admin.id, note)
                .await
        })
    }

    /// Resolves a request on behalf of the provider gateway.
    pub(super) async fn resolve_as_system(
        &self,
        request_id: Uuid,
        next: RequestStatus,
        note: Option<&str>,
    ) -> ResultEngine<LedgerRequest> {
        with_tx!(self, |db_tx| {
            self.resolve_in(&db_tx, request_id, next, SYSTEM_RESOLVER, note)
                .await
        })
    }

    pub(super) async fn resolve_in(
        &self,
        db: &DatabaseTransaction,
        request_id: Uuid,
        next: RequestStatus,
        resolved_by: &str,
        note: Option<&str>,
    ) -> ResultEngine<LedgerRequest> {
        let mut request = self.require_request(db, request_id).await?;
        request.status.transition(next)?;

        let now = Utc::now();
        let note = normalize_optional_text(note);
        let updated = requests::Entity::update_many()
            .col_expr(requests::Column::Status, Expr::value(next.as_str()))
            .col_expr(requests::Column::ResolvedAt, Expr::value(now))
            .col_expr(requests::Column::ResolvedBy, Expr::value(resolved_by))
            .col_expr(requests::Column::ResolutionNote, Expr::value(note.clone()))
            .filter(requests::Column::Id.eq(request_id.to_string()))
            .filter(requests::Column::Status.eq(RequestStatus::Pending.as_str()))
            .exec(db)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::InvalidTransition(format!(
                "request {request_id} was already resolved"
            )));
        }

        request.status = next;
        request.resolved_at = Some(now);
        request.resolved_by = Some(resolved_by.to_string());
        request.resolution_note = note;

        match next {
            RequestStatus::Approved => self.apply_approval(db, &request).await?,
            RequestStatus::Rejected => self.apply_rejection(db, &request).await?,
            RequestStatus::Pending => {}
        }

        let verb = if next == RequestStatus::Approved {
            "approved"
        } else {
            "rejected"
        };
        let mut body = format!(
            "Your {} request of {} was {verb}.",
            request.kind.as_str().replace('_', " "),
            Money::new(request.amount)
        );
        if let Some(note) = &request.resolution_note {
            body.push(' ');
            body.push_str(note);
        }
        notify(db, request.requester_id, format!("Request {verb}"), body).await?;

        tracing::info!(
            request_id = %request.id,
            kind = request.kind.as_str(),
            status = next.as_str(),
            resolved_by,
            "request resolved"
        );
        Ok(request)
    }

    async fn apply_approval(
        &self,
        db: &DatabaseTransaction,
        request: &LedgerRequest,
    ) -> ResultEngine<()> {
        let now = request.resolved_at.unwrap_or_else(Utc::now);
        match request.kind.settlement().on_approve {
            ApproveEffect::Finalize => {
                ledger::record(
                    db,
                    Transaction::new(
                        request.requester_id,
                        0,
                        TransactionKind::Approved(request.kind),
                        now,
                    )
                    .notes(request.resolution_note.clone())
                    .request(request.id),
                )
                .await?;
            }
            ApproveEffect::CreditTarget => {
                let phone = request.target.as_deref().ok_or_else(|| {
                    EngineError::KeyNotFound("transfer recipient".to_string())
                })?;
                let payee = self.require_user_by_phone(db, phone).await?;
                let payee_id = parse_uuid(&payee.id, "user")?;
                let payer = self.require_user(db, request.requester_id).await?;

                ledger::credit(db, payee_id, request.amount).await?;
                ledger::record(
                    db,
                    Transaction::new(payee_id, request.amount, TransactionKind::TransferIn, now)
                        .notes(Some(format!("from {}", payer.phone_number)))
                        .request(request.id),
                )
                .await?;
                ledger::record(
                    db,
                    Transaction::new(
                        request.requester_id,
                        0,
                        TransactionKind::Approved(request.kind),
                        now,
                    )
                    .notes(Some(format!("to {phone}")))
                    .request(request.id),
                )
                .await?;
                notify(
                    db,
                    payee_id,
                    "Money received",
                    format!(
                        "You received {} from {}.",
                        Money::new(request.amount),
                        payer.display_name
                    ),
                )
                .await?;
            }
            ApproveEffect::CreditRequester => {
                ledger::credit(db, request.requester_id, request.amount).await?;
                ledger::record(
                    db,
                    Transaction::new(
                        request.requester_id,
                        request.amount,
                        TransactionKind::Deposit,
                        now,
                    )
                    .notes(request.details.clone())
                    .request(request.id),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn apply_rejection(
        &self,
        db: &DatabaseTransaction,
        request: &LedgerRequest,
    ) -> ResultEngine<()> {
        let effect = request.kind.settlement().on_reject;
        if matches!(effect, RejectEffect::Refund | RejectEffect::RefundAndRestock)
            && request.debited > 0
        {
            let now = request.resolved_at.unwrap_or_else(Utc::now);
            ledger::credit(db, request.requester_id, request.debited).await?;
            ledger::record(
                db,
                Transaction::new(request.requester_id, request.debited, TransactionKind::Refund, now)
                    .notes(request.resolution_note.clone())
                    .request(request.id),
            )
            .await?;
        }

        if effect == RejectEffect::RefundAndRestock
            && let (Some(product_id), Some(quantity)) = (request.target.as_deref(), request.quantity)
        {
            products::Entity::update_many()
                .col_expr(
                    products::Column::Stock,
                    Expr::col(products::Column::Stock).add(quantity),
                )
                .filter(products::Column::Id.eq(product_id))
                .filter(products::Column::Stock.is_not_null())
                .exec(db)
                .await?;
        }
        Ok(())
    }
}
