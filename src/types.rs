//! Core types and errors for the card generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while serving requests.
#[derive(Error, Debug)]
pub enum CardgenError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Telegram error: {0}")]
    TelegramError(String),

    #[error("No digits found in BIN query: {0:?}")]
    InvalidBin(String),

    #[error("Regeneration data not found for session {0}")]
    SessionNotFound(String),
}

pub type Result<T> = std::result::Result<T, CardgenError>;

/// Wildcard marker as emitted by the parser.
pub const WILDCARD: char = 'x';

/// Expiration date parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthYear {
    /// No date given; rendered as `XX/XX`.
    Unknown,
    /// Zero-padded month and the year as written (4-digit years truncated to 2).
    Known { month: String, year: String },
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthYear::Unknown => write!(f, "XX/XX"),
            MonthYear::Known { month, year } => write!(f, "{}/{}", month, year),
        }
    }
}

/// Security code parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cvv {
    /// No code given; rendered as `XXX`.
    Unknown,
    Known(String),
}

impl fmt::Display for Cvv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cvv::Unknown => write!(f, "XXX"),
            Cvv::Known(code) => write!(f, "{}", code),
        }
    }
}

/// Structured card data extracted from free-form text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    /// 6-19 characters, each a digit or [`WILDCARD`].
    pub card_number: String,
    pub month_year: MonthYear,
    pub cvv: Cvv,
}

impl CardSpec {
    /// Spec returned when no input pattern matches.
    pub fn fallback() -> Self {
        Self {
            card_number: WILDCARD.to_string().repeat(16),
            month_year: MonthYear::Unknown,
            cvv: Cvv::Unknown,
        }
    }
}

/// Issuer metadata returned by the BIN lookup service.
///
/// Every field is independently optional; the service omits what it does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinInfo {
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub level: Option<String>,
    pub bank: Option<String>,
    pub country_name: Option<String>,
    #[serde(rename = "country")]
    pub country_code: Option<String>,
    pub country_flag: Option<String>,
}

/// A single generated card line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCard {
    pub number: String,
    /// Two-digit month.
    pub month: String,
    /// Four-digit year when drawn; the user's year widened to `20YY` otherwise.
    pub year: String,
    pub cvv: String,
}

impl fmt::Display for GeneratedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}|{}", self.number, self.month, self.year, self.cvv)
    }
}

/// Parameters remembered for a later regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub base_card: String,
    pub base_month_year: MonthYear,
    pub base_cvv: Cvv,
    /// Month reused for every card, when the user supplied a date.
    pub resolved_month: Option<String>,
    /// Year reused for every card, when the user supplied a date.
    pub resolved_year: Option<String>,
    /// Six-digit prefix sent to the BIN lookup.
    pub bin_prefix: String,
}
