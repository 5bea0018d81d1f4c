//! Fundamental data for a single ticker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat set of fundamentals for one company, as fetched for a single run.
///
/// Every metric is optional: providers regularly omit fields, and an
/// absent value must stay absent rather than turn into zero. Non-finite
/// inputs are dropped by the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRecord {
    ticker: String,
    name: Option<String>,
    price_to_earnings: Option<f64>,
    price_to_book: Option<f64>,
    return_on_equity: Option<f64>,
    debt_to_equity: Option<f64>,
    operating_cash_flow: Option<f64>,
    capital_expenditures: Option<f64>,
    dividend_rate: Option<f64>,
    trailing_eps: Option<f64>,
    book_value_per_share: Option<f64>,
    market_cap: Option<f64>,
}

impl FundamentalRecord {
    /// Start building a record for `ticker`
    pub fn builder(ticker: impl Into<String>) -> FundamentalRecordBuilder {
        FundamentalRecordBuilder::new(ticker)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn price_to_earnings(&self) -> Option<f64> {
        self.price_to_earnings
    }

    pub fn price_to_book(&self) -> Option<f64> {
        self.price_to_book
    }

    /// Return on equity as a fraction (0.12 = 12%)
    pub fn return_on_equity(&self) -> Option<f64> {
        self.return_on_equity
    }

    /// Debt to equity, percent-scaled (45.0 = 0.45x)
    pub fn debt_to_equity(&self) -> Option<f64> {
        self.debt_to_equity
    }

    pub fn operating_cash_flow(&self) -> Option<f64> {
        self.operating_cash_flow
    }

    pub fn capital_expenditures(&self) -> Option<f64> {
        self.capital_expenditures
    }

    /// Operating cash flow minus capital expenditures.
    ///
    /// Capex is subtracted as reported. Yahoo reports it as a negative
    /// outflow, so for Yahoo records the result is OCF plus the capex amount.
    /// Undefined unless both inputs are defined.
    pub fn unlevered_free_cash_flow(&self) -> Option<f64> {
        match (self.operating_cash_flow, self.capital_expenditures) {
            (Some(ocf), Some(capex)) => Some(ocf - capex),
            _ => None,
        }
    }

    /// Annual dividend per share
    pub fn dividend_rate(&self) -> Option<f64> {
        self.dividend_rate
    }

    pub fn trailing_eps(&self) -> Option<f64> {
        self.trailing_eps
    }

    pub fn book_value_per_share(&self) -> Option<f64> {
        self.book_value_per_share
    }

    pub fn market_cap(&self) -> Option<f64> {
        self.market_cap
    }

    /// Labeled metrics in report order
    pub fn metrics(&self) -> [(&'static str, Option<f64>); 11] {
        [
            ("P/E", self.price_to_earnings),
            ("P/B", self.price_to_book),
            ("ROE", self.return_on_equity),
            ("Debt/Equity", self.debt_to_equity),
            ("Operating Cash Flow", self.operating_cash_flow),
            ("Capital Expenditures", self.capital_expenditures),
            ("Unlevered Free Cash Flow", self.unlevered_free_cash_flow()),
            ("Dividend Rate", self.dividend_rate),
            ("Trailing EPS", self.trailing_eps),
            ("Book Value", self.book_value_per_share),
            ("Market Cap", self.market_cap),
        ]
    }

    /// Number of metrics the provider left undefined
    pub fn missing_count(&self) -> usize {
        self.metrics().iter().filter(|(_, v)| v.is_none()).count()
    }
}

/// Builder for [`FundamentalRecord`]
#[derive(Debug, Clone)]
pub struct FundamentalRecordBuilder {
    record: FundamentalRecord,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl FundamentalRecordBuilder {
    fn new(ticker: impl Into<String>) -> Self {
        Self {
            record: FundamentalRecord {
                ticker: ticker.into(),
                name: None,
                price_to_earnings: None,
                price_to_book: None,
                return_on_equity: None,
                debt_to_equity: None,
                operating_cash_flow: None,
                capital_expenditures: None,
                dividend_rate: None,
                trailing_eps: None,
                book_value_per_share: None,
                market_cap: None,
            },
        }
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.record.name = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn price_to_earnings(mut self, value: Option<f64>) -> Self {
        self.record.price_to_earnings = finite(value);
        self
    }

    pub fn price_to_book(mut self, value: Option<f64>) -> Self {
        self.record.price_to_book = finite(value);
        self
    }

    pub fn return_on_equity(mut self, value: Option<f64>) -> Self {
        self.record.return_on_equity = finite(value);
        self
    }

    pub fn debt_to_equity(mut self, value: Option<f64>) -> Self {
        self.record.debt_to_equity = finite(value);
        self
    }

    pub fn operating_cash_flow(mut self, value: Option<f64>) -> Self {
        self.record.operating_cash_flow = finite(value);
        self
    }

    pub fn capital_expenditures(mut self, value: Option<f64>) -> Self {
        self.record.capital_expenditures = finite(value);
        self
    }

    pub fn dividend_rate(mut self, value: Option<f64>) -> Self {
        self.record.dividend_rate = finite(value);
        self
    }

    pub fn trailing_eps(mut self, value: Option<f64>) -> Self {
        self.record.trailing_eps = finite(value);
        self
    }

    pub fn book_value_per_share(mut self, value: Option<f64>) -> Self {
        self.record.book_value_per_share = finite(value);
        self
    }

    pub fn market_cap(mut self, value: Option<f64>) -> Self {
        self.record.market_cap = finite(value);
        self
    }

    pub fn build(self) -> FundamentalRecord {
        self.record
    }
}

/// One closing price in the historical series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}
