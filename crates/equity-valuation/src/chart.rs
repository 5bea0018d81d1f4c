//! Chart data for the historical price line and the dividend projection
//!
//! Charts are emitted as JSON series; drawing them is left to whatever
//! plotting front end consumes the files.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::record::PricePoint;
use crate::valuation::{DividendProjection, ProjectedDividend};

/// Point on a line series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Closing price over time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChart {
    pub ticker: String,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub line: Vec<LinePoint>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub min_price: f64,
    pub max_price: f64,
}

impl PriceChart {
    /// Build from a price history; `None` when there is nothing to plot
    pub fn from_history(ticker: &str, range: &str, history: &[PricePoint]) -> Option<Self> {
        let mut line: Vec<_> = history
            .iter()
            .filter(|p| p.close.is_finite())
            .map(|p| LinePoint {
                timestamp: p.timestamp,
                value: p.close,
            })
            .collect();
        line.sort_by_key(|p| p.timestamp);

        let (first, last) = (line.first()?, line.last()?);

        Some(Self {
            ticker: ticker.to_string(),
            title: format!("{ticker} Historical Stock Price ({})", describe_range(range)),
            x_label: "Date",
            y_label: "Price (USD)",
            start_date: first.timestamp,
            end_date: last.timestamp,
            min_price: line.iter().map(|p| p.value).fold(f64::INFINITY, f64::min),
            max_price: line.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max),
            line,
        })
    }
}

fn describe_range(range: &str) -> String {
    match range {
        "1mo" => "1 Month".to_string(),
        "3mo" => "3 Months".to_string(),
        "6mo" => "6 Months".to_string(),
        "1y" => "1 Year".to_string(),
        "2y" => "2 Years".to_string(),
        "5y" => "5 Years".to_string(),
        "ytd" => "Year to Date".to_string(),
        other => other.to_string(),
    }
}

/// Projected vs discounted dividends per year, with the discounted
/// terminal value as a reference line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendChart {
    pub ticker: String,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub bars: Vec<ProjectedDividend>,
    pub discounted_terminal_value: f64,
}

impl DividendChart {
    pub fn from_projection(ticker: &str, projection: &DividendProjection) -> Self {
        Self {
            ticker: ticker.to_string(),
            title: "DDM Analysis - Projected and Discounted Dividends",
            x_label: "Forecast Year",
            y_label: "Dividend (USD)",
            bars: projection.years.clone(),
            discounted_terminal_value: projection.discounted_terminal_value,
        }
    }
}

/// Both charts for one run; either may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSet {
    pub price: Option<PriceChart>,
    pub dividends: Option<DividendChart>,
}

impl ChartSet {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.dividends.is_none()
    }

    /// Write `<ticker>_price.json` and `<ticker>_dividends.json` into `dir`.
    ///
    /// Returns the paths actually written.
    pub fn write_json(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        if let Some(chart) = &self.price {
            let path = dir.join(format!("{}_price.json", file_stem(&chart.ticker)));
            std::fs::write(&path, serde_json::to_vec_pretty(chart)?)?;
            written.push(path);
        }

        if let Some(chart) = &self.dividends {
            let path = dir.join(format!("{}_dividends.json", file_stem(&chart.ticker)));
            std::fs::write(&path, serde_json::to_vec_pretty(chart)?)?;
            written.push(path);
        }

        for path in &written {
            tracing::info!(path = %path.display(), "chart data written");
        }
        Ok(written)
    }
}

fn file_stem(ticker: &str) -> String {
    ticker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint {
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, 20, 0, 0).unwrap(),
            close,
        }
    }

    #[test]
    fn test_price_chart_metadata() {
        let history = vec![point(3, 101.0), point(1, 99.5), point(2, 104.25)];
        let chart = PriceChart::from_history("PRU", "1y", &history).unwrap();

        assert_eq!(chart.title, "PRU Historical Stock Price (1 Year)");
        assert_eq!(chart.line.len(), 3);
        assert_eq!(chart.start_date, point(1, 0.0).timestamp);
        assert_eq!(chart.end_date, point(3, 0.0).timestamp);
        assert_eq!(chart.min_price, 99.5);
        assert_eq!(chart.max_price, 104.25);
    }

    #[test]
    fn test_empty_history_has_no_chart() {
        assert!(PriceChart::from_history("PRU", "1y", &[]).is_none());
        assert!(PriceChart::from_history("PRU", "1y", &[point(1, f64::NAN)]).is_none());
    }

    #[test]
    fn test_write_json() {
        let projection = DividendProjection::project(Some(5.4), 0.03, 0.08, 5).unwrap();
        let charts = ChartSet {
            price: PriceChart::from_history("BRK.B", "1y", &[point(1, 400.0)]),
            dividends: Some(DividendChart::from_projection("BRK.B", &projection)),
        };

        let dir = tempfile::tempdir().unwrap();
        let written = charts.write_json(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("BRK_B_price.json"));

        let raw = std::fs::read_to_string(&written[1]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["bars"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["x_label"], "Forecast Year");
    }

    #[test]
    fn test_empty_chart_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let charts = ChartSet::default();
        assert!(charts.is_empty());
        assert!(charts.write_json(dir.path()).unwrap().is_empty());
    }
}
