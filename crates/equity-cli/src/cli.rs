//! Command-line arguments

use clap::Parser;
use equity_valuation::config::ALPHA_VANTAGE_KEY_VAR;
use equity_valuation::{AnalysisConfig, DataProvider, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "equity-research")]
#[command(about = "Fundamentals and valuation estimates for a single stock", long_about = None)]
pub struct Args {
    /// Ticker symbol to analyze
    #[arg(default_value = "PRU")]
    pub ticker: String,

    /// Data provider: yahoo or alpha-vantage
    #[arg(long, default_value = "yahoo")]
    pub provider: DataProvider,

    /// P/E multiple for the earnings based valuation
    #[arg(long, default_value_t = 12.0)]
    pub assumed_pe: f64,

    /// P/B multiple for the price-to-book valuation
    #[arg(long, default_value_t = 1.0)]
    pub target_pb: f64,

    /// Perpetual dividend growth rate, as a fraction
    #[arg(long, default_value_t = 0.03, allow_negative_numbers = true)]
    pub growth_rate: f64,

    /// Required rate of return, as a fraction
    #[arg(long, default_value_t = 0.08, allow_negative_numbers = true)]
    pub required_return: f64,

    /// Years in the explicit dividend projection
    #[arg(long, default_value_t = 5)]
    pub forecast_years: u32,

    /// Price history range (1mo, 3mo, 6mo, 1y, 2y, 5y, ytd)
    #[arg(long, default_value = "1y")]
    pub range: String,

    /// Write chart data as JSON into this directory
    #[arg(long)]
    pub chart_dir: Option<PathBuf>,

    /// Skip the dividend projection table and chart output
    #[arg(long)]
    pub no_charts: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Alpha Vantage API key
    #[arg(long, env = ALPHA_VANTAGE_KEY_VAR, hide_env_values = true)]
    pub alpha_vantage_key: Option<String>,
}

impl Args {
    pub fn to_config(&self) -> Result<AnalysisConfig> {
        let mut builder = AnalysisConfig::builder()
            .provider(self.provider)
            .assumed_pe(self.assumed_pe)
            .target_pb(self.target_pb)
            .growth_rate(self.growth_rate)
            .required_return(self.required_return)
            .forecast_years(self.forecast_years)
            .history_range(&self.range)
            .request_timeout(Duration::from_secs(self.timeout));

        if let Some(key) = self.alpha_vantage_key.as_deref().filter(|k| !k.trim().is_empty()) {
            builder = builder.alpha_vantage_api_key(key);
        }

        builder.build()
    }
}
