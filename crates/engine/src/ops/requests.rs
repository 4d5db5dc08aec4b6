//! Request writer: validates a request, takes the money and stores it as
//! pending, all in one DB transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    AccountType, EngineError, LedgerRequest, PhoneNumber, ProviderService, RequestCmd,
    RequestKind, RequestStatus, ResultEngine, Transaction, TransactionKind, requests,
    util::{normalize_optional_text, require_positive},
};

use super::{Engine, ledger, with_tx};

impl LedgerRequest {
    pub(super) fn pending(kind: RequestKind, requester_id: Uuid, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            status: RequestStatus::Pending,
            requester_id,
            target: None,
            service: None,
            amount,
            fee: 0,
            debited: 0,
            quantity: None,
            details: None,
            requested_at: Utc::now(),
            resolved_at: None,
            resolved_by: None,
            resolution_note: None,
        }
    }
}

impl Engine {
    /// Fee charged on top of `amount` for a request of `kind`.
    pub(super) fn request_fee(
        &self,
        kind: RequestKind,
        service: Option<ProviderService>,
        amount: i64,
    ) -> ResultEngine<i64> {
        match kind {
            RequestKind::Renewal | RequestKind::BillPayment => {
                self.pricing.rate_for(service).commission(amount)
            }
            RequestKind::Transfer => self.pricing.transfer_rate.commission(amount),
            RequestKind::Withdrawal => self.pricing.withdrawal_rate.commission(amount),
            RequestKind::Deposit | RequestKind::StoreOrder => Ok(0),
        }
    }

    /// Charges the requester per the settlement table and stores `request`
    /// as pending. `request.fee` must already be set.
    pub(super) async fn insert_pending(
        &self,
        db: &DatabaseTransaction,
        mut request: LedgerRequest,
    ) -> ResultEngine<LedgerRequest> {
        request.debited = request
            .kind
            .settlement()
            .debited(request.amount, request.fee)?;

        if request.debited > 0 {
            ledger::debit(db, request.requester_id, request.debited).await?;
            ledger::record(
                db,
                Transaction::new(
                    request.requester_id,
                    -request.debited,
                    TransactionKind::submission(request.kind),
                    request.requested_at,
                )
                .notes(request.details.clone())
                .request(request.id),
            )
            .await?;
        }

        requests::ActiveModel::from(&request).insert(db).await?;
        tracing::info!(
            request_id = %request.id,
            kind = request.kind.as_str(),
            requester_id = %request.requester_id,
            amount = request.amount,
            debited = request.debited,
            "request submitted"
        );
        Ok(request)
    }

    /// Submits a renewal, transfer, withdrawal, deposit or bill payment
    /// request.
    ///
    /// The requester is charged immediately (deposits excepted); the charge is
    /// finalized or refunded when an administrator resolves the request.
    /// Store orders go through [`Engine::place_order`].
    pub async fn submit_request(&self, cmd: RequestCmd) -> ResultEngine<LedgerRequest> {
        require_positive(cmd.amount, "amount")?;
        if cmd.kind == RequestKind::StoreOrder {
            return Err(EngineError::InvalidId(
                "store orders are placed through the store".to_string(),
            ));
        }

        let target = match cmd.kind {
            RequestKind::Renewal | RequestKind::BillPayment => {
                let service = cmd.service.ok_or_else(|| {
                    EngineError::InvalidId(format!(
                        "service is required for {}",
                        cmd.kind.as_str()
                    ))
                })?;
                let raw = cmd.target.as_deref().ok_or_else(|| {
                    EngineError::InvalidPhone("subscriber number is required".to_string())
                })?;
                Some(service.normalize_subscriber(raw)?)
            }
            RequestKind::Transfer => {
                let raw = cmd.target.as_deref().ok_or_else(|| {
                    EngineError::InvalidPhone("recipient number is required".to_string())
                })?;
                Some(PhoneNumber::parse(raw)?.to_string())
            }
            _ => normalize_optional_text(cmd.target.as_deref()),
        };

        let mut request = LedgerRequest::pending(cmd.kind, cmd.requester_id, cmd.amount);
        request.fee = self.request_fee(cmd.kind, cmd.service, cmd.amount)?;
        request.service = cmd.service;
        request.target = target;
        request.details = normalize_optional_text(cmd.details.as_deref());

        with_tx!(self, |db_tx| {
            let requester = self.require_user(&db_tx, cmd.requester_id).await?;
            if cmd.kind == RequestKind::Transfer
                && let Some(phone) = request.target.as_deref()
            {
                let payee = self.require_user_by_phone(&db_tx, phone).await?;
                if payee.id == requester.id {
                    return Err(EngineError::InvalidPhone(
                        "cannot transfer to yourself".to_string(),
                    ));
                }
            }
            self.insert_pending(&db_tx, request).await
        })
    }

    /// Requests submitted by `user_id`, newest first.
    pub async fn list_requests_for_user(
        &self,
        user_id: Uuid,
        status: Option<RequestStatus>,
    ) -> ResultEngine<Vec<LedgerRequest>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let mut query = requests::Entity::find()
                .filter(requests::Column::RequesterId.eq(user_id.to_string()));
            if let Some(status) = status {
                query = query.filter(requests::Column::Status.eq(status.as_str()));
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

    /// Loads a request visible to `viewer_id`: its requester or an
    /// administrator.
    pub async fn request(&self, request_id: Uuid, viewer_id: Uuid) -> ResultEngine<LedgerRequest> {
        with_tx!(self, |db_tx| {
            let viewer = self.require_user(&db_tx, viewer_id).await?;
            let request = self.require_request(&db_tx, request_id).await?;
            let is_admin = AccountType::try_from(viewer.account_type.as_str())?.is_admin();
            if request.requester_id != viewer_id && !is_admin {
                return Err(EngineError::KeyNotFound("request not exists".to_string()));
            }
            Ok(request)
        })
    }

    pub(super) async fn require_request(
        &self,
        db: &DatabaseTransaction,
        request_id: Uuid,
    ) -> ResultEngine<LedgerRequest> {
        let model = requests::Entity::find_by_id(request_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("request not exists".to_string()))?;
        LedgerRequest::try_from(model)
    }
}
