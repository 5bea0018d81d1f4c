//! Fetch → value → report pipeline for one ticker

use crate::api::{FundamentalsProvider, normalize_symbol};
use crate::chart::{ChartSet, DividendChart, PriceChart};
use crate::config::AnalysisConfig;
use crate::error::{Result, ValuationResult};
use crate::record::FundamentalRecord;
use crate::report::SummaryReport;
use crate::valuation::{DividendProjection, ValuationCalculator, ValuationSummary};

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub record: FundamentalRecord,
    pub valuations: ValuationSummary,
    pub projection: ValuationResult<DividendProjection>,
    pub charts: ChartSet,
}

impl AnalysisReport {
    pub fn summary(&self) -> SummaryReport<'_> {
        SummaryReport::new(&self.record, &self.valuations)
    }
}

/// Analyze a single ticker.
///
/// A fundamentals fetch failure aborts the run. A price history failure only
/// drops the price chart.
pub async fn analyze(
    provider: &dyn FundamentalsProvider,
    ticker: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let ticker = normalize_symbol(ticker)?;
    tracing::info!(ticker = %ticker, provider = provider.name(), "fetching fundamentals");

    let record = provider.fetch_fundamentals(&ticker).await?;

    let calculator = ValuationCalculator::new(config.assumptions);
    let valuations = calculator.evaluate(&record);
    let projection = calculator.dividend_projection(&record);

    if let Err(reason) = &projection {
        tracing::info!(ticker = %ticker, %reason, "no dividend projection");
    }

    let price = match provider
        .fetch_price_history(&ticker, &config.history_range)
        .await
    {
        Ok(history) => {
            let chart = PriceChart::from_history(&ticker, &config.history_range, &history);
            if chart.is_none() {
                tracing::warn!(ticker = %ticker, "no historical data available");
            }
            chart
        }
        Err(e) => {
            tracing::warn!(ticker = %ticker, error = %e, "price history unavailable");
            None
        }
    };

    let charts = ChartSet {
        price,
        dividends: projection
            .as_ref()
            .ok()
            .map(|p| DividendChart::from_projection(&ticker, p)),
    };

    Ok(AnalysisReport {
        record,
        valuations,
        projection,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockFundamentalsProvider;
    use crate::error::{EquityError, ValuationError};
    use crate::record::PricePoint;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;

    fn pru_record() -> FundamentalRecord {
        FundamentalRecord::builder("PRU")
            .trailing_eps(Some(7.5))
            .book_value_per_share(Some(78.609))
            .dividend_rate(Some(5.4))
            .build()
    }

    fn history() -> Vec<PricePoint> {
        (1..=3)
            .map(|day| PricePoint {
                timestamp: Utc.with_ymd_and_hms(2025, 1, day, 21, 0, 0).unwrap(),
                close: 100.0 + f64::from(day),
            })
            .collect()
    }

    fn mock_provider() -> MockFundamentalsProvider {
        let mut provider = MockFundamentalsProvider::new();
        provider.expect_name().return_const("mock");
        provider
    }

    #[tokio::test]
    async fn test_analyze_full_run() {
        let mut provider = mock_provider();
        provider
            .expect_fetch_fundamentals()
            .with(eq("PRU"))
            .times(1)
            .returning(|_| Ok(pru_record()));
        provider
            .expect_fetch_price_history()
            .with(eq("PRU"), eq("1y"))
            .times(1)
            .returning(|_, _| Ok(history()));

        let report = analyze(&provider, "pru", &AnalysisConfig::default())
            .await
            .unwrap();

        assert_eq!(report.valuations.defined_count(), 3);
        assert_eq!(report.projection.as_ref().map(|p| p.years.len()), Ok(5));
        assert!(report.charts.price.is_some());
        assert!(report.charts.dividends.is_some());

        let text = report.summary().render();
        assert!(text.contains("Intrinsic Value (DDM): $111.24"));
        assert!(text.contains("Earnings Based Valuation (Assumed P/E of 12): $90.00"));
        assert!(text.contains("Price-to-Book Valuation (Target P/B of 1.0): $78.61"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let mut provider = mock_provider();
        provider
            .expect_fetch_fundamentals()
            .returning(|t| Err(EquityError::InvalidSymbol(t.to_string())));
        provider.expect_fetch_price_history().never();

        let result = analyze(&provider, "ZZZZ", &AnalysisConfig::default()).await;
        assert!(matches!(result, Err(EquityError::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn test_invalid_ticker_never_reaches_provider() {
        let mut provider = mock_provider();
        provider.expect_fetch_fundamentals().never();

        let result = analyze(&provider, "  ", &AnalysisConfig::default()).await;
        assert!(matches!(result, Err(EquityError::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn test_history_failure_only_drops_price_chart() {
        let mut provider = mock_provider();
        provider
            .expect_fetch_fundamentals()
            .returning(|_| Ok(pru_record()));
        provider
            .expect_fetch_price_history()
            .returning(|_, _| Err(EquityError::YahooFinance("no quotes".to_string())));

        let report = analyze(&provider, "PRU", &AnalysisConfig::default())
            .await
            .unwrap();

        assert!(report.charts.price.is_none());
        assert!(report.charts.dividends.is_some());
        assert_eq!(report.valuations.defined_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_dividend_has_no_dividend_chart() {
        let mut provider = mock_provider();
        provider.expect_fetch_fundamentals().returning(|t| {
            Ok(FundamentalRecord::builder(t).trailing_eps(Some(2.0)).build())
        });
        provider
            .expect_fetch_price_history()
            .returning(|_, _| Ok(Vec::new()));

        let report = analyze(&provider, "NODIV", &AnalysisConfig::default())
            .await
            .unwrap();

        assert!(report.charts.is_empty());
        assert!(matches!(
            report.valuations.dividend_discount,
            Err(ValuationError::MissingData { .. })
        ));
        assert_eq!(report.valuations.earnings_based, Ok(24.0));
    }
}
