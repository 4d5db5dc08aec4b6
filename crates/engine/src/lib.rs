//! Ledger engine of the mahfaza wallet.
//!
//! The database is the source of truth: every operation opens a DB
//! transaction, applies balance changes with conditional updates and appends
//! the matching [`Transaction`] records before committing.

pub use card_categories::CardCategory;
pub use commands::{NewCard, NewProductCmd, NewUserCmd, RequestCmd};
pub use error::EngineError;
pub use gateway::Action as ProviderAction;
pub use money::Money;
pub use network_cards::CardStatus;
pub use networks::Network;
pub use notifications::Notification;
pub use ops::{BillPayment, Engine, EngineBuilder, RequestFilter, SYSTEM_RESOLVER};
pub use phone::{Operator, PhoneNumber, PhoneRule};
pub use pricing::{CommissionRate, Pricing, Quote};
pub use products::Product;
pub use requests::{
    ApproveEffect, Debit, LedgerRequest, RejectEffect, RequestKind, RequestStatus, Settlement,
};
pub use services::{ProviderService, SubscriberRule};
pub use sold_cards::SoldCard;
pub use subscribers::Subscriber;
pub use transactions::{Transaction, TransactionKind};
pub use users::{AccountType, User};

mod card_categories;
mod commands;
mod error;
mod money;
mod network_cards;
mod networks;
mod notifications;
mod ops;
mod phone;
mod pricing;
mod products;
mod requests;
mod services;
mod sold_cards;
mod subscribers;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
