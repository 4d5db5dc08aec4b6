//! JSON bodies exchanged with the HTTP API.
//!
//! Amounts are integer rials. Timestamps are RFC 3339 in UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub display_name: String,
        pub phone_number: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub display_name: String,
        pub phone_number: String,
        pub balance: i64,
        /// `customer`, `agent` or `admin`.
        pub account_type: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountTypeUpdate {
        pub account_type: String,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub transaction_date: DateTime<Utc>,
        /// Signed balance change.
        pub amount: i64,
        pub transaction_type: String,
        pub notes: Option<String>,
        pub request_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub to_phone: String,
        pub amount: i64,
        pub note: Option<String>,
    }
}

pub mod request {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestNew {
        /// `renewal`, `transfer`, `withdrawal` or `deposit`.
        pub kind: String,
        pub amount: i64,
        pub target: Option<String>,
        pub service: Option<String>,
        pub details: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RequestQuery {
        pub status: Option<String>,
        pub kind: Option<String>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Resolution {
        pub note: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RequestView {
        pub id: Uuid,
        pub kind: String,
        pub status: String,
        pub requester_id: Uuid,
        pub target: Option<String>,
        pub service: Option<String>,
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
}

pub mod bill {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteQuery {
        pub service: Option<String>,
        pub price: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct QuoteView {
        pub price: i64,
        pub commission: i64,
        pub total: i64,
        /// Whether the caller's balance covers `total`.
        pub affordable: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillQuery {
        pub service: String,
        pub number: String,
        /// `query` (default), `solfa` or `billover`.
        pub action: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillPay {
        pub service: String,
        pub number: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillPaymentView {
        pub request: super::request::RequestView,
        pub transid: String,
        /// Raw provider answer, absent when the provider was unreachable.
        pub provider: Option<serde_json::Value>,
    }
}

pub mod card {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NetworkView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetworkNew {
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub network_id: Uuid,
        pub name: String,
        pub price: i64,
        pub available: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub price: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CardNew {
        pub code: String,
        pub serial: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CardsAdded {
        pub added: u64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SoldCardView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub code: String,
        pub serial: Option<String>,
        pub price: i64,
        pub commission: i64,
        pub sold_at: DateTime<Utc>,
    }
}

pub mod store {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProductView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub price: i64,
        pub stock: Option<i64>,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNew {
        pub name: String,
        pub price: i64,
        pub description: Option<String>,
        pub stock: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductActive {
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderNew {
        pub product_id: Uuid,
        pub quantity: i64,
        pub note: Option<String>,
    }
}

pub mod notification {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct NotificationQuery {
        pub unread_only: Option<bool>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NotificationView {
        pub id: Uuid,
        pub title: String,
        pub body: String,
        pub created_at: DateTime<Utc>,
        pub read: bool,
    }
}

pub mod subscriber {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriberNew {
        pub label: String,
        pub service: String,
        pub number: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SubscriberView {
        pub id: Uuid,
        pub label: String,
        pub service: String,
        pub phone_number: String,
    }
}
