//! Settings for the `mahfaza` binary, read from `settings.toml` and
//! `MAHFAZA__SECTION__KEY` environment variables.

use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use engine::{CommissionRate, Pricing, ProviderService};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Gateway {
    /// Prefix of every endpoint path, `/api` included when the provider uses it.
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Rates in basis points (`1000` = 10 %).
#[derive(Debug, Default, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub commission_bps: u32,
    #[serde(default)]
    pub transfer_fee_bps: u32,
    #[serde(default)]
    pub withdrawal_fee_bps: u32,
    #[serde(default)]
    pub card_commission_bps: u32,
    /// Per-service commission, keyed by service code (`yemen_mobile`, ...).
    #[serde(default)]
    pub overrides: HashMap<String, u32>,
}

impl PricingSettings {
    pub fn pricing(&self) -> Result<Pricing, ConfigError> {
        let mut overrides = HashMap::with_capacity(self.overrides.len());
        for (code, bps) in &self.overrides {
            let service = ProviderService::try_from(code.as_str())
                .map_err(|_| ConfigError::Message(format!("unknown service in pricing: {code}")))?;
            overrides.insert(service, CommissionRate::from_basis_points(*bps));
        }

        Ok(Pricing {
            default_rate: CommissionRate::from_basis_points(self.commission_bps),
            transfer_rate: CommissionRate::from_basis_points(self.transfer_fee_bps),
            withdrawal_rate: CommissionRate::from_basis_points(self.withdrawal_fee_bps),
            card_rate: CommissionRate::from_basis_points(self.card_commission_bps),
            overrides,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
    pub gateway: Option<Gateway>,
    #[serde(default)]
    pub pricing: PricingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .add_source(Environment::with_prefix("MAHFAZA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
