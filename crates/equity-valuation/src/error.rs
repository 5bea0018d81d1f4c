//! Error types for fundamentals retrieval and valuation

use thiserror::Error;

/// Fatal errors: the run cannot produce a report without fundamentals.
#[derive(Debug, Error)]
pub enum EquityError {
    /// Invalid ticker symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Provider answered but had nothing usable for the symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chart output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fetch and pipeline operations
pub type Result<T> = std::result::Result<T, EquityError>;

/// Why a single valuation has no value.
///
/// These never abort a run: the report prints them in place of a price.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// A fundamental the formula needs was not supplied by the provider
    #[error("missing {field}")]
    MissingData { field: &'static str },

    /// The fundamental is present but cannot produce a meaningful price
    #[error("{field} is {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// The caller's assumptions make the formula undefined
    #[error("{0}")]
    InvalidAssumption(String),
}

impl ValuationError {
    pub(crate) fn growth_exceeds_return() -> Self {
        Self::InvalidAssumption("growth rate exceeds required return".to_string())
    }
}

/// Result of a single valuation
pub type ValuationResult<T> = std::result::Result<T, ValuationError>;
