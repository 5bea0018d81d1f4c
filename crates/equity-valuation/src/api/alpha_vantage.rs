//! Alpha Vantage API client

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use super::{FundamentalsProvider, range_start};
use crate::config::ALPHA_VANTAGE_KEY_VAR;
use crate::error::{EquityError, Result};
use crate::record::{FundamentalRecord, PricePoint};

const BASE_URL: &str = "https://www.alphavantage.co/query";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Company overview data.
///
/// Alpha Vantage sends every number as a string and uses `"None"` or `"-"`
/// for values it does not have.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CompanyOverview {
    pub symbol: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    pub price_to_book_ratio: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity_ttm: Option<String>,
    pub dividend_per_share: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    pub book_value: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
}

impl CompanyOverview {
    /// Convert to a record. The overview carries no leverage or cash-flow
    /// figures, so those stay undefined.
    pub fn into_record(self, ticker: &str) -> FundamentalRecord {
        FundamentalRecord::builder(ticker)
            .name(self.name)
            .price_to_earnings(parse_number(self.pe_ratio.as_deref()))
            .price_to_book(parse_number(self.price_to_book_ratio.as_deref()))
            .return_on_equity(parse_number(self.return_on_equity_ttm.as_deref()))
            .dividend_rate(parse_number(self.dividend_per_share.as_deref()))
            .trailing_eps(parse_number(self.eps.as_deref()))
            .book_value_per_share(parse_number(self.book_value.as_deref()))
            .market_cap(parse_number(self.market_cap.as_deref()))
            .build()
    }
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        Self::with_client(Client::new(), api_key, rate_limit)
    }

    pub fn with_timeout(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key, rate_limit))
    }

    fn with_client(client: Client, api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));

        Self {
            client,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with the free-tier limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ALPHA_VANTAGE_KEY_VAR).map_err(|_| {
            EquityError::Config(format!("{ALPHA_VANTAGE_KEY_VAR} environment variable not set"))
        })?;

        Ok(Self::new(api_key, 5))
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(BASE_URL)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EquityError::AlphaVantage(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;
        check_api_errors(&data)?;
        Ok(data)
    }

    /// Get company overview and fundamental data
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let data = self
            .query(&[("function", "OVERVIEW"), ("symbol", symbol)])
            .await?;

        // Check if data is empty (symbol not found)
        if data.as_object().is_none_or(|o| o.is_empty()) {
            return Err(EquityError::InvalidSymbol(symbol.to_string()));
        }

        Ok(serde_json::from_value(data)?)
    }

    /// Get daily closes (compact series, the last 100 sessions)
    pub async fn get_daily(&self, symbol: &str) -> Result<Vec<PricePoint>> {
        let data = self
            .query(&[("function", "TIME_SERIES_DAILY"), ("symbol", symbol)])
            .await?;

        parse_daily_series(&data)
    }
}

#[async_trait]
impl FundamentalsProvider for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalRecord> {
        let overview = self.get_company_overview(ticker).await?;
        Ok(overview.into_record(ticker))
    }

    async fn fetch_price_history(&self, ticker: &str, range: &str) -> Result<Vec<PricePoint>> {
        let start = range_start(range, Utc::now())?;
        let mut points = self.get_daily(ticker).await?;
        points.retain(|p| p.timestamp >= start);
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }
}

fn check_api_errors(data: &serde_json::Value) -> Result<()> {
    if let Some(error) = data.get("Error Message") {
        return Err(EquityError::AlphaVantage(error.to_string()));
    }

    // Throttled responses carry a "Note" (older API) or "Information" key.
    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(EquityError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }

    Ok(())
}

fn parse_daily_series(data: &serde_json::Value) -> Result<Vec<PricePoint>> {
    let series = data
        .get("Time Series (Daily)")
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| EquityError::AlphaVantage("No daily data found".to_string()))?;

    let mut result = Vec::with_capacity(series.len());
    for (date, values) in series {
        let Some(timestamp) = parse_date(date) else {
            tracing::debug!(date = %date, "skipping row with unparseable date");
            continue;
        };
        let Some(close) = parse_number(values["4. close"].as_str()) else {
            continue;
        };
        result.push(PricePoint { timestamp, close });
    }

    result.sort_by_key(|p| p.timestamp);
    Ok(result)
}

fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("test_key", 5);
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_overview_into_record() {
        let overview: CompanyOverview = serde_json::from_value(json!({
            "Symbol": "PRU",
            "Name": "Prudential Financial Inc",
            "PERatio": "14.15",
            "PriceToBookRatio": "1.45",
            "ReturnOnEquityTTM": "0.106",
            "DividendPerShare": "5.4",
            "EPS": "7.5",
            "BookValue": "78.609",
            "MarketCapitalization": "41200000000",
            "Sector": "FINANCE"
        }))
        .unwrap();

        let record = overview.into_record("PRU");
        assert_eq!(record.name(), Some("Prudential Financial Inc"));
        assert_eq!(record.price_to_earnings(), Some(14.15));
        assert_eq!(record.dividend_rate(), Some(5.4));
        assert_eq!(record.book_value_per_share(), Some(78.609));
        assert_eq!(record.market_cap(), Some(4.12e10));
        assert_eq!(record.debt_to_equity(), None);
        assert_eq!(record.operating_cash_flow(), None);
    }

    #[test]
    fn test_none_strings_are_undefined() {
        let overview: CompanyOverview = serde_json::from_value(json!({
            "Symbol": "XYZ",
            "PERatio": "None",
            "DividendPerShare": "-",
            "EPS": "-1.2"
        }))
        .unwrap();

        let record = overview.into_record("XYZ");
        assert_eq!(record.price_to_earnings(), None);
        assert_eq!(record.dividend_rate(), None);
        assert_eq!(record.trailing_eps(), Some(-1.2));
    }

    #[test]
    fn test_parse_daily_series() {
        let data = json!({
            "Meta Data": {"2. Symbol": "PRU"},
            "Time Series (Daily)": {
                "2025-03-04": {"4. close": "110.20"},
                "2025-03-03": {"4. close": "108.75"},
                "bad-date": {"4. close": "1.0"},
                "2025-03-05": {"4. close": "n/a"}
            }
        });

        let points = parse_daily_series(&data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 108.75);
        assert_eq!(points[1].close, 110.20);
    }

    #[test]
    fn test_api_errors() {
        assert!(matches!(
            check_api_errors(&json!({"Error Message": "Invalid API call"})),
            Err(EquityError::AlphaVantage(_))
        ));
        assert!(matches!(
            check_api_errors(&json!({"Information": "rate limit is 25 requests per day"})),
            Err(EquityError::RateLimitExceeded { .. })
        ));
        assert!(check_api_errors(&json!({"Symbol": "PRU"})).is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_get_company_overview() {
        let client = AlphaVantageClient::from_env().unwrap();
        let record = client.fetch_fundamentals("PRU").await.unwrap();
        assert_eq!(record.ticker(), "PRU");
    }
}
