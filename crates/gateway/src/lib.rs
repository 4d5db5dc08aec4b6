//! Client for the telecom provider gateway.
//!
//! Every provider operation (balance query, bill payment, airtime advance)
//! is a JSON `POST` to one of a handful of endpoints. The gateway answers with
//! a `resultCode`:
//!
//! - `"0"`: the operation succeeded;
//! - `"-2"`: the provider accepted the operation but has not settled it yet;
//! - anything else: failure, described by `message` or `resultDesc`.
//!
//! [`TelecomGateway`] is the seam used by the engine, [`HttpGateway`] is the
//! production implementation.

use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use http::HttpGateway;

mod http;

/// Result code the gateway uses for a settled operation.
pub const RESULT_OK: &str = "0";
/// Result code the gateway uses for an accepted, not yet settled operation.
pub const RESULT_PENDING: &str = "-2";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid gateway response: {0}")]
    Decode(String),
}

/// Gateway endpoint families.
///
/// Paths are relative to the gateway base URL, which carries any `/api`
/// prefix the deployment uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Telecom,
    Baity,
    BaityNet,
    YemQuery,
    Pubg,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Telecom => "telecom",
            Self::Baity => "baity",
            Self::BaityNet => "baitynet",
            Self::YemQuery => "yem-query",
            Self::Pubg => "pubg",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Balance / subscription lookup.
    Query,
    /// Pay a bill or top up.
    Bill,
    /// Airtime advance ("solfa") eligibility and outstanding amount.
    Solfa,
    /// Amount carried over from previous bills.
    Billover,
}

impl Action {
    /// Whether the action only reads provider state.
    pub fn is_lookup(self) -> bool {
        !matches!(self, Self::Bill)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Bill => "bill",
            Self::Solfa => "solfa",
            Self::Billover => "billover",
        }
    }
}

/// Client-generated transaction id.
///
/// The gateway has no idempotency key other than this value, so it is derived
/// from the request timestamp plus a random suffix to keep ids unique across
/// requests issued in the same millisecond.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransId(String);

impl TransId {
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        let suffix = uuid::Uuid::new_v4().as_u128() % 10_000;
        Self(format!("{}{suffix:04}", timestamp.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub mobile: String,
    pub action: Action,
    pub service: String,
    pub transid: TransId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

impl GatewayRequest {
    pub fn query(mobile: impl Into<String>, service: impl Into<String>) -> Self {
        Self::lookup(Action::Query, mobile, service)
    }

    pub fn solfa(mobile: impl Into<String>, service: impl Into<String>) -> Self {
        Self::lookup(Action::Solfa, mobile, service)
    }

    pub fn billover(mobile: impl Into<String>, service: impl Into<String>) -> Self {
        Self::lookup(Action::Billover, mobile, service)
    }

    /// Amount-less request for `action`.
    pub fn lookup(action: Action, mobile: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            mobile: mobile.into(),
            action,
            service: service.into(),
            transid: TransId::generate(),
            amount: None,
        }
    }

    pub fn bill(mobile: impl Into<String>, service: impl Into<String>, amount: i64) -> Self {
        Self {
            mobile: mobile.into(),
            action: Action::Bill,
            service: service.into(),
            transid: TransId::generate(),
            amount: Some(amount),
        }
    }
}

/// Raw gateway answer. Fields the client does not model are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    #[serde(deserialize_with = "code_as_string")]
    pub result_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Providers are inconsistent about `resultCode` being a string or a number.
fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected resultCode: {other}"
        ))),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success,
    Pending,
    Failed { code: String, message: String },
}

impl GatewayResponse {
    pub fn outcome(&self) -> Outcome {
        match self.result_code.trim() {
            RESULT_OK => Outcome::Success,
            RESULT_PENDING => Outcome::Pending,
            code => Outcome::Failed {
                code: code.to_string(),
                message: self
                    .message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .or_else(|| self.result_desc.clone())
                    .unwrap_or_else(|| format!("provider error {code}")),
            },
        }
    }
}

#[async_trait]
pub trait TelecomGateway: Send + Sync {
    async fn call(
        &self,
        endpoint: Endpoint,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn response(value: serde_json::Value) -> GatewayResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn zero_is_success() {
        let resp = response(json!({"resultCode": "0", "resultDesc": "ok", "balance": "1200"}));
        assert_eq!(resp.outcome(), Outcome::Success);
        assert_eq!(resp.balance, Some(json!("1200")));
    }

    #[test]
    fn minus_two_is_pending() {
        let resp = response(json!({"resultCode": -2}));
        assert_eq!(resp.outcome(), Outcome::Pending);
    }

    #[test]
    fn failure_prefers_message_over_desc() {
        let resp = response(json!({
            "resultCode": "12",
            "resultDesc": "generic",
            "message": "subscriber not found"
        }));
        assert_eq!(
            resp.outcome(),
            Outcome::Failed {
                code: "12".to_string(),
                message: "subscriber not found".to_string(),
            }
        );

        let resp = response(json!({"resultCode": "5", "resultDesc": "insufficient agent balance"}));
        assert_eq!(
            resp.outcome(),
            Outcome::Failed {
                code: "5".to_string(),
                message: "insufficient agent balance".to_string(),
            }
        );
    }

    #[test]
    fn unknown_fields_are_kept() {
        let resp = response(json!({"resultCode": "0", "packageName": "Mazaya"}));
        assert_eq!(resp.extra.get("packageName"), Some(&json!("Mazaya")));
    }

    #[test]
    fn request_serializes_gateway_shape() {
        let req = GatewayRequest {
            mobile: "771234567".to_string(),
            action: Action::Bill,
            service: "yemen_mobile".to_string(),
            transid: TransId::from("17000000000001234".to_string()),
            amount: Some(500),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "mobile": "771234567",
                "action": "bill",
                "service": "yemen_mobile",
                "transid": "17000000000001234",
                "amount": 500
            })
        );
        let query = GatewayRequest::query("771234567", "yemen_mobile");
        assert!(serde_json::to_value(&query).unwrap().get("amount").is_none());
    }

    #[test]
    fn lookup_actions_carry_no_amount() {
        let solfa = GatewayRequest::solfa("771234567", "yemen_mobile");
        assert_eq!(
            serde_json::to_value(&solfa).unwrap()["action"],
            json!("solfa")
        );
        assert_eq!(solfa.amount, None);

        let billover = GatewayRequest::billover("711234567", "sabafon");
        assert_eq!(billover.action.as_str(), "billover");
        assert!(billover.action.is_lookup());
        assert!(!Action::Bill.is_lookup());
    }

    #[test]
    fn endpoint_paths_are_relative() {
        for endpoint in [
            Endpoint::Telecom,
            Endpoint::Baity,
            Endpoint::BaityNet,
            Endpoint::YemQuery,
            Endpoint::Pubg,
        ] {
            assert!(!endpoint.path().starts_with('/'));
            assert!(!endpoint.path().starts_with("api"));
        }
    }

    #[test]
    fn transid_starts_with_timestamp() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = TransId::at(at);
        assert!(id.as_str().starts_with("1700000000123"));
        assert_eq!(id.as_str().len(), "1700000000123".len() + 4);
    }
}
