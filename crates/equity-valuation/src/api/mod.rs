//! API clients for fundamentals and price history

pub mod alpha_vantage;
pub mod yahoo;

pub use alpha_vantage::{AlphaVantageClient, CompanyOverview};
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::config::{AnalysisConfig, DataProvider};
use crate::error::{EquityError, Result};
use crate::record::{FundamentalRecord, PricePoint};

/// Source of fundamentals and closing prices for one ticker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Fetch the fundamental record. Missing fields come back undefined;
    /// an unknown ticker or unreachable provider is an error.
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalRecord>;

    /// Daily closing prices over `range` ("1y", "6mo", ...)
    async fn fetch_price_history(&self, ticker: &str, range: &str) -> Result<Vec<PricePoint>>;
}

/// Build the provider selected in `config`
pub fn provider_from_config(config: &AnalysisConfig) -> Result<Box<dyn FundamentalsProvider>> {
    match config.provider {
        DataProvider::Yahoo => Ok(Box::new(YahooFinanceClient::with_timeout(
            config.request_timeout,
        )?)),
        DataProvider::AlphaVantage => {
            let key = config.alpha_vantage_api_key.clone().ok_or_else(|| {
                EquityError::Config("Alpha Vantage API key not configured".to_string())
            })?;
            Ok(Box::new(AlphaVantageClient::with_timeout(
                key,
                config.alpha_vantage_rate_limit,
                config.request_timeout,
            )?))
        }
    }
}

/// Start of a history range ending at `end`
pub(crate) fn range_start(range: &str, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let start = match range {
        "1mo" => end - chrono::Duration::days(30),
        "3mo" => end - chrono::Duration::days(90),
        "6mo" => end - chrono::Duration::days(180),
        "1y" => end - chrono::Duration::days(365),
        "2y" => end - chrono::Duration::days(730),
        "5y" => end - chrono::Duration::days(1825),
        "ytd" => NaiveDate::from_ymd_opt(end.year(), 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
            .ok_or_else(|| EquityError::Config(format!("cannot compute start of {}", end.year())))?,
        _ => return Err(EquityError::Config(format!("Invalid range: {range}"))),
    };
    Ok(start)
}

/// Trim and upper-case a ticker, rejecting anything that is not a symbol
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() || symbol.len() > 16 {
        return Err(EquityError::InvalidSymbol(raw.to_string()));
    }
    let valid = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if !valid {
        return Err(EquityError::InvalidSymbol(raw.to_string()));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" pru ").unwrap(), "PRU");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_symbol("^gspc").unwrap(), "^GSPC");
    }

    #[test]
    fn test_normalize_symbol_rejects_garbage() {
        assert!(matches!(normalize_symbol(""), Err(EquityError::InvalidSymbol(_))));
        assert!(matches!(normalize_symbol("PR U"), Err(EquityError::InvalidSymbol(_))));
        assert!(matches!(normalize_symbol("AAPL&x=1"), Err(EquityError::InvalidSymbol(_))));
    }

    #[test]
    fn test_range_start() {
        use chrono::TimeZone;

        let end = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        assert_eq!(
            range_start("1y", end).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
        );
        assert_eq!(
            range_start("ytd", end).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(range_start("forever", end).is_err());
    }

    #[test]
    fn test_provider_from_config() {
        let provider = provider_from_config(&AnalysisConfig::default()).unwrap();
        assert_eq!(provider.name(), "yahoo");

        let config = AnalysisConfig {
            provider: DataProvider::AlphaVantage,
            alpha_vantage_api_key: Some("demo".to_string()),
            ..Default::default()
        };
        assert_eq!(provider_from_config(&config).unwrap().name(), "alpha_vantage");
    }
}
