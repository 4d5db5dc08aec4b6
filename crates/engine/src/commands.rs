//! Command structs for engine operations.
//!
//! These types group parameters for write operations (sign-up, request
//! submission, catalog management), keeping call sites readable and avoiding
//! long argument lists.

use uuid::Uuid;

use crate::{AccountType, ProviderService, RequestKind};

/// Register a new wallet user.
#[derive(Clone, Debug)]
pub struct NewUserCmd {
    pub display_name: String,
    pub phone_number: String,
    pub password: String,
    pub account_type: AccountType,
}

impl NewUserCmd {
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        phone_number: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            phone_number: phone_number.into(),
            password: password.into(),
            account_type: AccountType::Customer,
        }
    }

    #[must_use]
    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }
}

/// Submit a request that waits for resolution.
#[derive(Clone, Debug)]
pub struct RequestCmd {
    pub kind: RequestKind,
    pub requester_id: Uuid,
    pub amount: i64,
    pub target: Option<String>,
    pub service: Option<ProviderService>,
    pub details: Option<String>,
}

impl RequestCmd {
    #[must_use]
    pub fn new(kind: RequestKind, requester_id: Uuid, amount: i64) -> Self {
        Self {
            kind,
            requester_id,
            amount,
            target: None,
            service: None,
            details: None,
        }
    }

    #[must_use]
    pub fn renewal(
        requester_id: Uuid,
        service: ProviderService,
        subscriber: impl Into<String>,
        amount: i64,
    ) -> Self {
        Self::new(RequestKind::Renewal, requester_id, amount)
            .service(service)
            .target(subscriber)
    }

    #[must_use]
    pub fn transfer(requester_id: Uuid, target_phone: impl Into<String>, amount: i64) -> Self {
        Self::new(RequestKind::Transfer, requester_id, amount).target(target_phone)
    }

    #[must_use]
    pub fn withdrawal(requester_id: Uuid, amount: i64) -> Self {
        Self::new(RequestKind::Withdrawal, requester_id, amount)
    }

    #[must_use]
    pub fn deposit(requester_id: Uuid, amount: i64) -> Self {
        Self::new(RequestKind::Deposit, requester_id, amount)
    }

    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn service(mut self, service: ProviderService) -> Self {
        self.service = Some(service);
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Create a store product.
#[derive(Clone, Debug)]
pub struct NewProductCmd {
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub stock: Option<i64>,
}

impl NewProductCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
            description: None,
            stock: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }
}

/// One prepaid card to load into a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCard {
    pub code: String,
    pub serial: Option<String>,
}

impl NewCard {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            serial: None,
        }
    }

    #[must_use]
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }
}
