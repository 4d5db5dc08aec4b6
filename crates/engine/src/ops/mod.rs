use std::{fmt, sync::Arc};

use gateway::TelecomGateway;
use sea_orm::DatabaseConnection;

use crate::{Pricing, ResultEngine};

mod access;
mod bills;
mod cards;
mod ledger;
mod notifications;
mod requests;
mod resolver;
mod store;
mod subscribers;
mod transactions;
mod transfer;
mod users;

pub use bills::BillPayment;
pub use resolver::{RequestFilter, SYSTEM_RESOLVER};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    gateway: Option<Arc<dyn TelecomGateway>>,
    pricing: Pricing,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("gateway", &self.gateway.is_some())
            .field("pricing", &self.pricing)
            .finish()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    gateway: Option<Arc<dyn TelecomGateway>>,
    pricing: Pricing,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Provider gateway used for bill payments and queries.
    pub fn gateway(mut self, gateway: Arc<dyn TelecomGateway>) -> EngineBuilder {
        self.gateway = Some(gateway);
        self
    }

    pub fn pricing(mut self, pricing: Pricing) -> EngineBuilder {
        self.pricing = pricing;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            gateway: self.gateway,
            pricing: self.pricing,
        })
    }
}
