//! Catalog of provider services sold through the gateway.

use gateway::Endpoint;
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine,
    phone::{Operator, PhoneRule},
};

/// How a service identifies the subscriber being charged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriberRule {
    /// A mobile number restricted to some prefixes.
    Mobile(PhoneRule),
    /// A fixed line: area code starting with `0`, 8 digits total.
    Landline,
    /// An opaque account/player id.
    Account,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderService {
    YemenMobile,
    YemenMobilePostpaid,
    Sabafon,
    You,
    Y,
    Baity,
    BaityNet,
    Adsl,
    Landline,
    PubgUc,
}

impl ProviderService {
    pub const ALL: [ProviderService; 10] = [
        Self::YemenMobile,
        Self::YemenMobilePostpaid,
        Self::Sabafon,
        Self::You,
        Self::Y,
        Self::Baity,
        Self::BaityNet,
        Self::Adsl,
        Self::Landline,
        Self::PubgUc,
    ];

    /// `service` code sent to the gateway. Also the stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::YemenMobile => "yemen_mobile",
            Self::YemenMobilePostpaid => "yemen_mobile_postpaid",
            Self::Sabafon => "sabafon",
            Self::You => "you",
            Self::Y => "y",
            Self::Baity => "baity",
            Self::BaityNet => "baity_net",
            Self::Adsl => "adsl",
            Self::Landline => "landline",
            Self::PubgUc => "pubg_uc",
        }
    }

    pub fn endpoint(self) -> Endpoint {
        match self {
            Self::Baity => Endpoint::Baity,
            Self::BaityNet => Endpoint::BaityNet,
            Self::Adsl | Self::Landline => Endpoint::YemQuery,
            Self::PubgUc => Endpoint::Pubg,
            _ => Endpoint::Telecom,
        }
    }

    pub fn subscriber_rule(self) -> SubscriberRule {
        match self {
            Self::YemenMobile | Self::YemenMobilePostpaid => {
                SubscriberRule::Mobile(PhoneRule::for_operator(Operator::YemenMobile))
            }
            Self::Sabafon => SubscriberRule::Mobile(PhoneRule::for_operator(Operator::Sabafon)),
            Self::You => SubscriberRule::Mobile(PhoneRule::for_operator(Operator::You)),
            Self::Y => SubscriberRule::Mobile(PhoneRule::for_operator(Operator::Y)),
            Self::Baity | Self::BaityNet => SubscriberRule::Mobile(PhoneRule::new(&["79"])),
            Self::Adsl | Self::Landline => SubscriberRule::Landline,
            Self::PubgUc => SubscriberRule::Account,
        }
    }

    /// Validates and normalizes the subscriber identifier for this service.
    pub fn normalize_subscriber(self, raw: &str) -> ResultEngine<String> {
        match self.subscriber_rule() {
            SubscriberRule::Mobile(rule) => Ok(rule.parse(raw)?.to_string()),
            SubscriberRule::Landline => {
                let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                if digits.len() == 8
                    && digits.starts_with('0')
                    && digits.chars().all(|c| c.is_ascii_digit())
                {
                    Ok(digits)
                } else {
                    Err(EngineError::InvalidPhone(format!(
                        "landline must be 8 digits starting with 0, got '{raw}'"
                    )))
                }
            }
            SubscriberRule::Account => {
                let id = raw.trim();
                if id.is_empty() || id.len() > 20 || !id.chars().all(|c| c.is_ascii_alphanumeric())
                {
                    return Err(EngineError::InvalidPhone(format!(
                        "invalid account id '{raw}'"
                    )));
                }
                Ok(id.to_string())
            }
        }
    }
}

impl TryFrom<&str> for ProviderService {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| EngineError::KeyNotFound(format!("service {value}")))
    }
}
