//! Single-ticker equity valuation
//!
//! Fetches a flat set of fundamentals for one ticker and derives three
//! price estimates:
//!
//! - Earnings based: an assumed P/E applied to trailing EPS
//! - Price-to-book: a target P/B applied to book value per share
//! - Dividend discount: single-stage Gordon growth on the annual dividend
//!
//! Values a provider does not supply stay undefined all the way to the
//! report; a valuation that cannot be computed says why instead of
//! printing zero.
//!
//! # Example
//!
//! ```rust,ignore
//! use equity_valuation::{AnalysisConfig, analyze, api::provider_from_config};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AnalysisConfig::builder().with_env_api_key().build()?;
//!     let provider = provider_from_config(&config)?;
//!
//!     let report = analyze(provider.as_ref(), "PRU", &config).await?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod valuation;

// Re-export main types for convenience
pub use analysis::{AnalysisReport, analyze};
pub use api::{FundamentalsProvider, provider_from_config};
pub use chart::ChartSet;
pub use config::{AnalysisConfig, DataProvider, ValuationAssumptions};
pub use error::{EquityError, Result, ValuationError};
pub use record::{FundamentalRecord, PricePoint};
pub use report::SummaryReport;
pub use valuation::{DividendProjection, ValuationCalculator, ValuationSummary};
