//! Ledger requests.
//!
//! A request is an operation that needs an administrator (or the provider
//! gateway) to confirm it. The requester is charged at submission and the
//! charge is either finalized or refunded when the request is resolved.
//!
//! Everything kind-specific about money movement lives in [`Settlement`], so
//! the writer and the resolver read the same table.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, services::ProviderService, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Renewal,
    Transfer,
    Withdrawal,
    Deposit,
    BillPayment,
    StoreOrder,
}

impl RequestKind {
    pub const ALL: [RequestKind; 6] = [
        Self::Renewal,
        Self::Transfer,
        Self::Withdrawal,
        Self::Deposit,
        Self::BillPayment,
        Self::StoreOrder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Renewal => "renewal",
            Self::Transfer => "transfer",
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
            Self::BillPayment => "bill_payment",
            Self::StoreOrder => "store_order",
        }
    }

    pub fn settlement(self) -> Settlement {
        match self {
            Self::Renewal | Self::Withdrawal | Self::BillPayment => Settlement {
                debit: Debit::AmountAndFee,
                on_approve: ApproveEffect::Finalize,
                on_reject: RejectEffect::Refund,
            },
            Self::Transfer => Settlement {
                debit: Debit::AmountAndFee,
                on_approve: ApproveEffect::CreditTarget,
                on_reject: RejectEffect::Refund,
            },
            Self::Deposit => Settlement {
                debit: Debit::Nothing,
                on_approve: ApproveEffect::CreditRequester,
                on_reject: RejectEffect::Nothing,
            },
            Self::StoreOrder => Settlement {
                debit: Debit::Amount,
                on_approve: ApproveEffect::Finalize,
                on_reject: RejectEffect::RefundAndRestock,
            },
        }
    }
}

impl TryFrom<&str> for RequestKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == value)
            .ok_or_else(|| EngineError::InvalidId(format!("invalid request kind: {value}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_final(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// `Pending -> Approved | Rejected`; final states never move.
    pub fn transition(self, next: RequestStatus) -> ResultEngine<RequestStatus> {
        match (self, next) {
            (Self::Pending, Self::Approved | Self::Rejected) => Ok(next),
            (from, to) => Err(EngineError::InvalidTransition(format!(
                "request is {}, cannot become {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidId(format!(
                "invalid request status: {other}"
            ))),
        }
    }
}

/// What is taken from the requester at submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Debit {
    Nothing,
    Amount,
    AmountAndFee,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproveEffect {
    /// The debit stands; only a zero-amount record is written.
    Finalize,
    /// The user owning `target` receives `amount`.
    CreditTarget,
    /// The requester receives `amount`.
    CreditRequester,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectEffect {
    Nothing,
    Refund,
    RefundAndRestock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub debit: Debit,
    pub on_approve: ApproveEffect,
    pub on_reject: RejectEffect,
}

impl Settlement {
    /// Amount charged at submission for `amount` with `fee`.
    pub fn debited(&self, amount: i64, fee: i64) -> ResultEngine<i64> {
        match self.debit {
            Debit::Nothing => Ok(0),
            Debit::Amount => Ok(amount),
            Debit::AmountAndFee => amount
                .checked_add(fee)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRequest {
    pub id: Uuid,
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub requester_id: Uuid,
    /// Phone number, subscriber id or product id, depending on `kind`.
    pub target: Option<String>,
    pub service: Option<ProviderService>,
    pub amount: i64,
    pub fee: i64,
    pub debited: i64,
    pub quantity: Option<i64>,
    pub details: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub resolution_note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub status: String,
    pub requester_id: String,
    pub target: Option<String>,
    pub service: Option<String>,
    pub amount: i64,
    pub fee: i64,
    pub debited: i64,
    pub quantity: Option<i64>,
    pub details: Option<String>,
    pub requested_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
    pub resolved_by: Option<String>,
    pub resolution_note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RequesterId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerRequest> for ActiveModel {
    fn from(request: &LedgerRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            kind: ActiveValue::Set(request.kind.as_str().to_string()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            requester_id: ActiveValue::Set(request.requester_id.to_string()),
            target: ActiveValue::Set(request.target.clone()),
            service: ActiveValue::Set(request.service.map(|s| s.as_str().to_string())),
            amount: ActiveValue::Set(request.amount),
            fee: ActiveValue::Set(request.fee),
            debited: ActiveValue::Set(request.debited),
            quantity: ActiveValue::Set(request.quantity),
            details: ActiveValue::Set(request.details.clone()),
            requested_at: ActiveValue::Set(request.requested_at),
            resolved_at: ActiveValue::Set(request.resolved_at),
            resolved_by: ActiveValue::Set(request.resolved_by.clone()),
            resolution_note: ActiveValue::Set(request.resolution_note.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "request")?,
            kind: RequestKind::try_from(model.kind.as_str())?,
            status: RequestStatus::try_from(model.status.as_str())?,
            requester_id: parse_uuid(&model.requester_id, "user")?,
            target: model.target,
            service: model
                .service
                .as_deref()
                .map(ProviderService::try_from)
                .transpose()?,
            amount: model.amount,
            fee: model.fee,
            debited: model.debited,
            quantity: model.quantity,
            details: model.details,
            requested_at: model.requested_at,
            resolved_at: model.resolved_at,
            resolved_by: model.resolved_by,
            resolution_note: model.resolution_note,
        })
    }
}
