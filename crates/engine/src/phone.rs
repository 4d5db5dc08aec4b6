//! Yemeni mobile numbers.
//!
//! A local mobile number is 9 digits; the first two select the operator.
//! Input coming from contacts often carries the `+967`/`00967` country code,
//! spaces or dashes, which are stripped before validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

pub const LOCAL_LENGTH: usize = 9;

/// A validated, normalized 9-digit local mobile number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> ResultEngine<Self> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        let local = compact
            .strip_prefix("+967")
            .or_else(|| compact.strip_prefix("00967"))
            .unwrap_or(&compact);

        if local.len() != LOCAL_LENGTH || !local.chars().all(|c| c.is_ascii_digit()) {
            return Err(EngineError::InvalidPhone(format!(
                "expected {LOCAL_LENGTH} digits, got '{raw}'"
            )));
        }
        Ok(Self(local.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn prefix(&self) -> &str {
        &self.0[..2]
    }

    /// Mobile operator owning the number, if the prefix is known.
    pub fn operator(&self) -> Option<Operator> {
        Operator::route(self)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    YemenMobile,
    Sabafon,
    You,
    Y,
}

impl Operator {
    pub fn route(number: &PhoneNumber) -> Option<Self> {
        match number.prefix() {
            "77" | "78" => Some(Self::YemenMobile),
            "71" => Some(Self::Sabafon),
            "73" => Some(Self::You),
            "70" => Some(Self::Y),
            _ => None,
        }
    }

    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            Self::YemenMobile => &["77", "78"],
            Self::Sabafon => &["71"],
            Self::You => &["73"],
            Self::Y => &["70"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::YemenMobile => "yemen_mobile",
            Self::Sabafon => "sabafon",
            Self::You => "you",
            Self::Y => "y",
        }
    }
}

/// Prefix restriction for a service that only accepts some numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhoneRule {
    prefixes: &'static [&'static str],
}

impl PhoneRule {
    pub const fn new(prefixes: &'static [&'static str]) -> Self {
        Self { prefixes }
    }

    pub fn for_operator(operator: Operator) -> Self {
        Self::new(operator.prefixes())
    }

    pub fn prefixes(&self) -> &'static [&'static str] {
        self.prefixes
    }

    pub fn check(&self, number: &PhoneNumber) -> ResultEngine<()> {
        if self.prefixes.iter().any(|p| number.as_str().starts_with(p)) {
            return Ok(());
        }
        Err(EngineError::InvalidPhone(format!(
            "{number} must start with {}",
            self.prefixes.join(" or ")
        )))
    }

    /// Parses `raw` and checks the prefix in one step.
    pub fn parse(&self, raw: &str) -> ResultEngine<PhoneNumber> {
        let number = PhoneNumber::parse(raw)?;
        self.check(&number)?;
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_country_code_and_separators() {
        assert_eq!(PhoneNumber::parse("+967 77 123 4567").unwrap().as_str(), "771234567");
        assert_eq!(PhoneNumber::parse("00967-711234567").unwrap().as_str(), "711234567");
        assert_eq!(PhoneNumber::parse("733334444").unwrap().as_str(), "733334444");
    }

    #[test]
    fn rejects_wrong_length_or_letters() {
        assert!(PhoneNumber::parse("77123456").is_err());
        assert!(PhoneNumber::parse("7712345678").is_err());
        assert!(PhoneNumber::parse("77123456x").is_err());
        assert!(PhoneNumber::parse("").is_err());
    }

    #[test]
    fn routes_by_prefix() {
        let route = |raw: &str| PhoneNumber::parse(raw).unwrap().operator();
        assert_eq!(route("771234567"), Some(Operator::YemenMobile));
        assert_eq!(route("781234567"), Some(Operator::YemenMobile));
        assert_eq!(route("711234567"), Some(Operator::Sabafon));
        assert_eq!(route("731234567"), Some(Operator::You));
        assert_eq!(route("701234567"), Some(Operator::Y));
        assert_eq!(route("791234567"), None);
    }

    #[test]
    fn rule_blocks_numbers_without_required_prefix() {
        let rule = PhoneRule::new(&["79"]);
        assert!(rule.parse("791234567").is_ok());
        assert_eq!(
            rule.parse("771234567"),
            Err(EngineError::InvalidPhone(
                "771234567 must start with 79".to_string()
            ))
        );
        let rule = PhoneRule::for_operator(Operator::YemenMobile);
        assert!(rule.parse("781234567").is_ok());
        assert!(rule.parse("711234567").is_err());
    }
}
