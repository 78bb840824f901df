/*
[INPUT]:  Environment and datetime format names used by the OANDA API
[OUTPUT]: Typed Rust enums with string conversions
[POS]:    Data layer - symbolic names shared by modifiers and client
[UPDATE]: When OANDA adds an environment or datetime format
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Provider domain that environment hosts are derived from.
pub const PROVIDER_DOMAIN: &str = "oanda.com";

/// Deployment target of the OANDA REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Demo accounts with real market data
    FxPractice,
    /// Live trading accounts
    FxTrade,
    /// Throwaway accounts, plain http, no credentials
    Sandbox,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::FxPractice => "fxpractice",
            Environment::FxTrade => "fxtrade",
            Environment::Sandbox => "sandbox",
        }
    }

    /// URL scheme used to reach this environment
    pub fn scheme(&self) -> &'static str {
        match self {
            Environment::Sandbox => "http",
            _ => "https",
        }
    }

    /// Host name, e.g. `api-fxtrade.oanda.com`
    pub fn host(&self) -> String {
        format!("api-{}.{}", self.as_str(), PROVIDER_DOMAIN)
    }

    /// Scheme and host, e.g. `https://api-fxtrade.oanda.com`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme(), self.host())
    }

    /// Whether this environment needs an access token
    pub fn requires_token(&self) -> bool {
        !matches!(self, Environment::Sandbox)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fxpractice" | "practice" => Ok(Environment::FxPractice),
            "fxtrade" | "live" | "trade" => Ok(Environment::FxTrade),
            "sandbox" | "fxsandbox" => Ok(Environment::Sandbox),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Timestamp format requested through `X-Accept-Datetime-Format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "RFC3339")]
    Rfc3339,
    #[serde(rename = "UNIX")]
    Unix,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormat::Rfc3339 => "RFC3339",
            DateFormat::Unix => "UNIX",
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
