//! Configuration for a valuation run

use crate::error::{EquityError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable holding the Alpha Vantage key
pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

/// Price history ranges accepted by the providers
pub const HISTORY_RANGES: &[&str] = &["1mo", "3mo", "6mo", "1y", "2y", "5y", "ytd"];

/// Longest explicit dividend projection, in years
pub const MAX_FORECAST_YEARS: u32 = 100;

/// Data provider for stock information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataProvider {
    /// Yahoo Finance (default, no API key required)
    #[default]
    Yahoo,
    /// Alpha Vantage (requires API key)
    AlphaVantage,
}

impl fmt::Display for DataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yahoo => f.write_str("Yahoo Finance"),
            Self::AlphaVantage => f.write_str("Alpha Vantage"),
        }
    }
}

impl FromStr for DataProvider {
    type Err = EquityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "alpha-vantage" | "alphavantage" | "av" => Ok(Self::AlphaVantage),
            other => Err(EquityError::Config(format!("unknown provider: {other}"))),
        }
    }
}

/// Caller-supplied constants for the three valuation formulas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    /// Multiple applied to trailing EPS
    pub assumed_pe: f64,
    /// Multiple applied to book value per share
    pub target_pb: f64,
    /// Perpetual dividend growth rate (fraction)
    pub growth_rate: f64,
    /// Required rate of return used as the discount rate (fraction)
    pub required_return: f64,
    /// Number of explicit years in the dividend projection
    pub forecast_years: u32,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            assumed_pe: 12.0,
            target_pb: 1.0,
            growth_rate: 0.03,
            required_return: 0.08,
            forecast_years: 5,
        }
    }
}

impl ValuationAssumptions {
    /// Reject assumptions no formula can use.
    ///
    /// `required_return <= growth_rate` passes: it only makes the DDM
    /// undefined.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("assumed P/E", self.assumed_pe),
            ("target P/B", self.target_pb),
            ("growth rate", self.growth_rate),
            ("required return", self.required_return),
        ];
        for (label, value) in finite {
            if !value.is_finite() {
                return Err(EquityError::Config(format!("{label} must be finite, got {value}")));
            }
        }

        if self.assumed_pe < 0.0 || self.target_pb < 0.0 {
            return Err(EquityError::Config(
                "valuation multiples must not be negative".to_string(),
            ));
        }

        if self.required_return <= -1.0 || self.growth_rate <= -1.0 {
            return Err(EquityError::Config(
                "rates must be greater than -100%".to_string(),
            ));
        }

        if self.forecast_years == 0 || self.forecast_years > MAX_FORECAST_YEARS {
            return Err(EquityError::Config(format!(
                "forecast_years must be between 1 and {MAX_FORECAST_YEARS}"
            )));
        }

        Ok(())
    }
}

/// Configuration for a single-ticker valuation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Data provider to fetch fundamentals and prices from
    pub provider: DataProvider,

    /// Valuation constants
    pub assumptions: ValuationAssumptions,

    /// Range of the historical price series, e.g. "1y"
    pub history_range: String,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Alpha Vantage API key (optional)
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::Yahoo,
            assumptions: ValuationAssumptions::default(),
            history_range: "1y".to_string(),
            request_timeout: Duration::from_secs(30),
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: 5, // free tier
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider == DataProvider::AlphaVantage && self.alpha_vantage_api_key.is_none() {
            return Err(EquityError::Config(format!(
                "{ALPHA_VANTAGE_KEY_VAR} required when using the Alpha Vantage provider"
            )));
        }

        if !HISTORY_RANGES.contains(&self.history_range.as_str()) {
            return Err(EquityError::Config(format!(
                "invalid history range '{}', expected one of {}",
                self.history_range,
                HISTORY_RANGES.join(", ")
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(EquityError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        self.assumptions.validate()
    }
}

/// Builder for AnalysisConfig
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    provider: Option<DataProvider>,
    assumed_pe: Option<f64>,
    target_pb: Option<f64>,
    growth_rate: Option<f64>,
    required_return: Option<f64>,
    forecast_years: Option<u32>,
    history_range: Option<String>,
    request_timeout: Option<Duration>,
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
}

impl AnalysisConfigBuilder {
    /// Set the data provider
    pub fn provider(mut self, provider: DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn assumed_pe(mut self, pe: f64) -> Self {
        self.assumed_pe = Some(pe);
        self
    }

    pub fn target_pb(mut self, pb: f64) -> Self {
        self.target_pb = Some(pb);
        self
    }

    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = Some(rate);
        self
    }

    pub fn required_return(mut self, rate: f64) -> Self {
        self.required_return = Some(rate);
        self
    }

    pub fn forecast_years(mut self, years: u32) -> Self {
        self.forecast_years = Some(years);
        self
    }

    /// Set the price history range
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Load Alpha Vantage API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(ALPHA_VANTAGE_KEY_VAR) {
            if !key.trim().is_empty() {
                self.alpha_vantage_api_key = Some(key);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();
        let base = defaults.assumptions;

        let config = AnalysisConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            assumptions: ValuationAssumptions {
                assumed_pe: self.assumed_pe.unwrap_or(base.assumed_pe),
                target_pb: self.target_pb.unwrap_or(base.target_pb),
                growth_rate: self.growth_rate.unwrap_or(base.growth_rate),
                required_return: self.required_return.unwrap_or(base.required_return),
                forecast_years: self.forecast_years.unwrap_or(base.forecast_years),
            },
            history_range: self.history_range.unwrap_or(defaults.history_range),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
