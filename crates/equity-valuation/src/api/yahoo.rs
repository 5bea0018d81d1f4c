//! Yahoo Finance API client
//!
//! Fundamentals come from the `quoteSummary` endpoint, which needs a session
//! cookie plus a crumb token. Price history goes through `yahoo_finance_api`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use yahoo_finance_api as yahoo;

use super::{FundamentalsProvider, range_start};
use crate::error::{EquityError, Result};
use crate::record::{FundamentalRecord, PricePoint};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,cashflowStatementHistory";
const REFERER: &str = "https://finance.yahoo.com/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    client: Client,
    crumb: Mutex<Option<String>>,
    connector: yahoo::YahooConnector,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client with a 30s request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let connector = yahoo::YahooConnector::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EquityError::YahooFinance(e.to_string()))?;

        Ok(Self {
            client,
            crumb: Mutex::new(None),
            connector,
        })
    }

    /// Crumb token for the current session, fetched on first use
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the Set-Cookie header matters; fc.yahoo.com answers 404.
        self.client
            .get(COOKIE_URL)
            .header(reqwest::header::REFERER, REFERER)
            .send()
            .await?;

        for endpoint in CRUMB_URLS {
            let response = match self
                .client
                .get(endpoint)
                .header(reqwest::header::REFERER, REFERER)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(endpoint, error = %e, "crumb request failed");
                    continue;
                }
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(EquityError::RateLimitExceeded {
                    provider: "Yahoo Finance".to_string(),
                });
            }
            if !response.status().is_success() {
                continue;
            }

            let body = response.text().await?;
            let body = body.trim();
            if is_valid_crumb(body) {
                tracing::debug!(endpoint, "obtained Yahoo crumb");
                *cached = Some(body.to_string());
                return Ok(body.to_string());
            }
        }

        Err(EquityError::YahooFinance(
            "failed to obtain crumb from all endpoints".to_string(),
        ))
    }

    /// Get historical quotes for a symbol
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>> {
        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| EquityError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| EquityError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        let response = self
            .connector
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| EquityError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| EquityError::YahooFinance(e.to_string()))?;

        Ok(quotes
            .iter()
            .filter_map(|q| {
                Some(PricePoint {
                    timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)?,
                    close: q.adjclose,
                })
            })
            .collect())
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalRecord> {
        let crumb = self.crumb().await?;
        let url = format!("{QUOTE_SUMMARY_URL}/{ticker}");

        tracing::debug!(ticker, "requesting quoteSummary");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::REFERER, REFERER)
            .query(&[("modules", MODULES), ("crumb", crumb.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EquityError::RateLimitExceeded {
                provider: "Yahoo Finance".to_string(),
            });
        }

        // Unknown tickers come back as 404 with an error body worth parsing.
        let body = response.text().await?;
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(EquityError::YahooFinance(format!("HTTP error: {status}")));
        }

        parse_quote_summary(ticker, &body)
    }

    async fn fetch_price_history(&self, ticker: &str, range: &str) -> Result<Vec<PricePoint>> {
        let end = Utc::now();
        let start = range_start(range, end)?;
        self.get_historical_quotes(ticker, start, end).await
    }
}

fn is_valid_crumb(body: &str) -> bool {
    !body.is_empty()
        && body.len() < 100
        && !body.contains(char::is_whitespace)
        && !body.contains('<')
        && !body.to_ascii_lowercase().contains("too many requests")
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<QuoteSummaryError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    financial_data: Option<FinancialDataModule>,
    cashflow_statement_history: Option<CashflowHistoryModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    short_name: Option<String>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    dividend_rate: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatisticsModule {
    price_to_book: Option<RawValue>,
    trailing_eps: Option<RawValue>,
    book_value: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialDataModule {
    return_on_equity: Option<RawValue>,
    debt_to_equity: Option<RawValue>,
    operating_cashflow: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CashflowHistoryModule {
    cashflow_statements: Vec<CashflowStatement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CashflowStatement {
    capital_expenditures: Option<RawValue>,
}

/// Yahoo wraps numbers as `{"raw": 1.5, "fmt": "1.50"}`, or `{}` when absent
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: Option<&RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

/// Map a `quoteSummary` body onto a record
fn parse_quote_summary(ticker: &str, body: &str) -> Result<FundamentalRecord> {
    let response: QuoteSummaryResponse = serde_json::from_str(body)?;
    let summary = response.quote_summary;

    if let Some(error) = summary.error {
        if error.code.eq_ignore_ascii_case("not found") {
            return Err(EquityError::InvalidSymbol(ticker.to_string()));
        }
        return Err(EquityError::YahooFinance(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| EquityError::DataUnavailable {
            symbol: ticker.to_string(),
            reason: "quoteSummary returned no result".to_string(),
        })?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let capex = result
        .cashflow_statement_history
        .and_then(|h| h.cashflow_statements.into_iter().next())
        .and_then(|s| s.capital_expenditures)
        .and_then(|v| v.raw);

    let record = FundamentalRecord::builder(ticker)
        .name(price.short_name)
        .price_to_earnings(raw(detail.trailing_pe.as_ref()))
        .price_to_book(raw(stats.price_to_book.as_ref()))
        .return_on_equity(raw(financial.return_on_equity.as_ref()))
        .debt_to_equity(raw(financial.debt_to_equity.as_ref()))
        .operating_cash_flow(raw(financial.operating_cashflow.as_ref()))
        .capital_expenditures(capex)
        .dividend_rate(raw(detail.dividend_rate.as_ref()))
        .trailing_eps(raw(stats.trailing_eps.as_ref()))
        .book_value_per_share(raw(stats.book_value.as_ref()))
        .market_cap(raw(price.market_cap.as_ref()).or_else(|| raw(detail.market_cap.as_ref())))
        .build();

    if record.missing_count() > 0 {
        tracing::warn!(
            ticker,
            missing = record.missing_count(),
            "Yahoo response is missing some fundamentals"
        );
    }
    Ok(record)
}
