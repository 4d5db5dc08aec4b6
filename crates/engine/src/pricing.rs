//! Commission arithmetic.
//!
//! Rates are stored in basis points (1/100 of a percent) so the computation
//! stays in integers: `commission = ceil(price × bps / 10_000)`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine, services::ProviderService};

const BPS_SCALE: i128 = 10_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommissionRate(u32);

impl CommissionRate {
    pub const ZERO: CommissionRate = CommissionRate(0);

    #[must_use]
    pub const fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    #[must_use]
    pub const fn from_percent(percent: u32) -> Self {
        Self(percent * 100)
    }

    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// Commission due on `price`, rounded up to the next rial.
    pub fn commission(self, price: i64) -> ResultEngine<i64> {
        if price < 0 {
            return Err(EngineError::InvalidAmount(
                "price must be >= 0".to_string(),
            ));
        }
        let raw = (i128::from(price) * i128::from(self.0) + BPS_SCALE - 1) / BPS_SCALE;
        i64::try_from(raw).map_err(|_| EngineError::InvalidAmount("amount too large".to_string()))
    }
}

/// Price breakdown shown to the user before confirming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub price: i64,
    pub commission: i64,
    pub total: i64,
}

impl Quote {
    pub fn new(price: i64, rate: CommissionRate) -> ResultEngine<Self> {
        if price <= 0 {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        let commission = rate.commission(price)?;
        let total = price
            .checked_add(commission)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        Ok(Self {
            price,
            commission,
            total,
        })
    }

    /// Pre-flight check against a balance snapshot.
    ///
    /// The ledger enforces the same condition when debiting, so this only
    /// saves a round trip for requests that are bound to fail.
    pub fn ensure_affordable(&self, balance: i64) -> ResultEngine<()> {
        if balance < self.total {
            return Err(EngineError::InsufficientFunds(format!(
                "balance {}, required {}",
                Money::new(balance),
                Money::new(self.total)
            )));
        }
        Ok(())
    }
}

/// Commission rates applied by the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pricing {
    pub default_rate: CommissionRate,
    pub transfer_rate: CommissionRate,
    pub withdrawal_rate: CommissionRate,
    pub card_rate: CommissionRate,
    pub overrides: HashMap<ProviderService, CommissionRate>,
}

impl Pricing {
    pub fn rate_for(&self, service: Option<ProviderService>) -> CommissionRate {
        service
            .and_then(|s| self.overrides.get(&s).copied())
            .unwrap_or(self.default_rate)
    }

    pub fn quote(&self, service: Option<ProviderService>, price: i64) -> ResultEngine<Quote> {
        Quote::new(price, self.rate_for(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_percent_of_3000() {
        let quote = Quote::new(3000, CommissionRate::from_percent(10)).unwrap();
        assert_eq!(
            quote,
            Quote {
                price: 3000,
                commission: 300,
                total: 3300
            }
        );
    }

    #[test]
    fn commission_rounds_up() {
        let rate = CommissionRate::from_basis_points(250);
        // 1001 * 2.5% = 25.025
        assert_eq!(rate.commission(1001).unwrap(), 26);
        assert_eq!(rate.commission(1000).unwrap(), 25);
        assert_eq!(CommissionRate::ZERO.commission(1234).unwrap(), 0);
        assert_eq!(rate.commission(0).unwrap(), 0);
    }

    #[test]
    fn quote_rejects_non_positive_price() {
        assert!(Quote::new(0, CommissionRate::ZERO).is_err());
        assert!(Quote::new(-5, CommissionRate::ZERO).is_err());
    }

    #[test]
    fn affordability_includes_commission() {
        let quote = Quote::new(3000, CommissionRate::from_percent(10)).unwrap();
        assert!(quote.ensure_affordable(3300).is_ok());
        assert_eq!(
            quote.ensure_affordable(3299),
            Err(EngineError::InsufficientFunds(
                "balance 3,299 YER, required 3,300 YER".to_string()
            ))
        );
    }

    #[test]
    fn overrides_win_over_default() {
        let mut pricing = Pricing {
            default_rate: CommissionRate::from_percent(5),
            ..Default::default()
        };
        pricing
            .overrides
            .insert(ProviderService::PubgUc, CommissionRate::from_percent(10));

        assert_eq!(pricing.quote(Some(ProviderService::PubgUc), 3000).unwrap().total, 3300);
        assert_eq!(pricing.quote(Some(ProviderService::Sabafon), 3000).unwrap().total, 3150);
        assert_eq!(pricing.quote(None, 3000).unwrap().total, 3150);
    }
}
