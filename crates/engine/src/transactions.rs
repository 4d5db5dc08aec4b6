//! Transaction records.
//!
//! A `Transaction` is the append-only audit record of one balance change for
//! one user. `amount` is the signed delta applied to the balance; resolution
//! records (`*_approved`) carry `0`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, requests::RequestKind, util::parse_uuid};

/// Labels the engine writes in `transaction_type`.
///
/// The column itself is free text: records imported from elsewhere may carry
/// any label, so reads keep it as a `String`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    TransferOut,
    TransferIn,
    Withdrawal,
    Deposit,
    Renewal,
    BillPayment,
    CardPurchase,
    StoreOrder,
    Refund,
    Approved(RequestKind),
}

impl TransactionKind {
    pub fn label(self) -> String {
        match self {
            Self::TransferOut => "transfer_out".to_string(),
            Self::TransferIn => "transfer_in".to_string(),
            Self::Withdrawal => "withdrawal".to_string(),
            Self::Deposit => "deposit".to_string(),
            Self::Renewal => "renewal".to_string(),
            Self::BillPayment => "bill_payment".to_string(),
            Self::CardPurchase => "card_purchase".to_string(),
            Self::StoreOrder => "store_order".to_string(),
            Self::Refund => "refund".to_string(),
            Self::Approved(kind) => format!("{}_approved", kind.as_str()),
        }
    }

    /// Label of the debit recorded when a request of `kind` is submitted.
    pub fn submission(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Renewal => Self::Renewal,
            RequestKind::Transfer => Self::TransferOut,
            RequestKind::Withdrawal => Self::Withdrawal,
            RequestKind::Deposit => Self::Deposit,
            RequestKind::BillPayment => Self::BillPayment,
            RequestKind::StoreOrder => Self::StoreOrder,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub amount: i64,
    pub transaction_type: String,
    pub notes: Option<String>,
    pub request_id: Option<Uuid>,
}

impl Transaction {
    pub(crate) fn new(
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        transaction_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            transaction_date,
            amount,
            transaction_type: kind.label(),
            notes: None,
            request_id: None,
        }
    }

    #[must_use]
    pub(crate) fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    #[must_use]
    pub(crate) fn request(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub transaction_date: DateTimeUtc,
    pub amount: i64,
    pub transaction_type: String,
    pub notes: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.to_string()),
            transaction_date: ActiveValue::Set(tx.transaction_date),
            amount: ActiveValue::Set(tx.amount),
            transaction_type: ActiveValue::Set(tx.transaction_type.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
            request_id: ActiveValue::Set(tx.request_id.map(|id| id.to_string())),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            transaction_date: model.transaction_date,
            amount: model.amount,
            transaction_type: model.transaction_type,
            notes: model.notes,
            request_id: model
                .request_id
                .as_deref()
                .map(|id| parse_uuid(id, "request"))
                .transpose()?,
        })
    }
}
