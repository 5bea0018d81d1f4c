//! Text report for a single-ticker analysis

use comfy_table::{Table, presets::UTF8_FULL};

use crate::error::ValuationResult;
use crate::record::FundamentalRecord;
use crate::valuation::{DividendProjection, ValuationSummary};

/// Marker printed for any value the provider or formula could not supply
pub const UNDEFINED: &str = "undefined";

const SUMMARY_HEADER: &str = "=== Fundamental Summary ===";
const SUMMARY_FOOTER: &str = "===========================";
const VALUATION_HEADER: &str = "=== DDM Analysis Results ===";

/// Render a fundamental metric, keeping undefined values visible
pub fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |v| v.to_string())
}

/// Render a valuation as dollars and cents, or the reason it is undefined
pub fn format_valuation(value: &ValuationResult<f64>) -> String {
    match value {
        Ok(price) => format!("${price:.2}"),
        Err(reason) => format!("{UNDEFINED} — {reason}"),
    }
}

/// `=== Fundamental Summary ===` block, one `Label: value` line per metric
pub fn format_fundamental_summary(record: &FundamentalRecord) -> String {
    let mut output = String::from(SUMMARY_HEADER);
    output.push('\n');
    for (label, value) in record.metrics() {
        output.push_str(&format!("{label}: {}\n", format_metric(value)));
    }
    output.push_str(SUMMARY_FOOTER);
    output.push('\n');
    output
}

/// `=== DDM Analysis Results ===` block with all three valuations
pub fn format_valuations(summary: &ValuationSummary) -> String {
    let assumptions = &summary.assumptions;
    format!(
        "{VALUATION_HEADER}\n\
         Intrinsic Value (DDM): {}\n\
         Earnings Based Valuation (Assumed P/E of {}): {}\n\
         Price-to-Book Valuation (Target P/B of {:?}): {}\n",
        format_valuation(&summary.dividend_discount),
        assumptions.assumed_pe,
        format_valuation(&summary.earnings_based),
        assumptions.target_pb,
        format_valuation(&summary.price_to_book),
    )
}

/// Table of projected and discounted dividends per forecast year
pub fn format_projection_table(projection: &DividendProjection) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Year", "Projected Dividend", "Discounted Dividend"]);

    for year in &projection.years {
        table.add_row(vec![
            year.year.to_string(),
            format!("${:.2}", year.projected),
            format!("${:.2}", year.discounted),
        ]);
    }

    format!(
        "{table}\nTerminal Value: ${:.2}\nDiscounted Terminal Value: ${:.2}\n",
        projection.terminal_value, projection.discounted_terminal_value
    )
}

/// Full report as printed by the binary
#[derive(Debug, Clone)]
pub struct SummaryReport<'a> {
    pub record: &'a FundamentalRecord,
    pub valuations: &'a ValuationSummary,
}

impl<'a> SummaryReport<'a> {
    pub fn new(record: &'a FundamentalRecord, valuations: &'a ValuationSummary) -> Self {
        Self { record, valuations }
    }

    pub fn render(&self) -> String {
        let heading = match self.record.name() {
            Some(name) => format!("Analyzing stock: {} ({name})", self.record.ticker()),
            None => format!("Analyzing stock: {}", self.record.ticker()),
        };

        format!(
            "{heading}\n\nFundamental Metrics:\n{}\n{}",
            format_fundamental_summary(self.record),
            format_valuations(self.valuations),
        )
    }
}

impl std::fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValuationAssumptions;
    use crate::error::ValuationError;
    use crate::valuation::ValuationCalculator;

    fn pru() -> FundamentalRecord {
        FundamentalRecord::builder("PRU")
            .price_to_earnings(Some(14.145_333))
            .trailing_eps(Some(7.5))
            .book_value_per_share(Some(78.609))
            .dividend_rate(Some(5.4))
            .build()
    }

    #[test]
    fn test_format_metric_undefined() {
        assert_eq!(format_metric(None), "undefined");
        assert_eq!(format_metric(Some(0.0)), "0");
        assert_eq!(format_metric(Some(14.145_333)), "14.145333");
    }

    #[test]
    fn test_fundamental_summary_lines() {
        let text = format_fundamental_summary(&pru());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "=== Fundamental Summary ===");
        assert_eq!(lines[1], "P/E: 14.145333");
        assert!(lines.contains(&"Capital Expenditures: undefined"));
        assert!(lines.contains(&"Unlevered Free Cash Flow: undefined"));
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[12], "===========================");
    }

    #[test]
    fn test_valuation_lines_match_example() {
        let summary = ValuationCalculator::default().evaluate(&pru());
        let text = format_valuations(&summary);

        assert_eq!(
            text,
            "=== DDM Analysis Results ===\n\
             Intrinsic Value (DDM): $111.24\n\
             Earnings Based Valuation (Assumed P/E of 12): $90.00\n\
             Price-to-Book Valuation (Target P/B of 1.0): $78.61\n"
        );
    }

    #[test]
    fn test_undefined_valuations_are_printed_with_reason() {
        let record = FundamentalRecord::builder("XYZ").dividend_rate(Some(1.0)).build();
        let calculator = ValuationCalculator::new(ValuationAssumptions {
            growth_rate: 0.12,
            ..ValuationAssumptions::default()
        });
        let text = format_valuations(&calculator.evaluate(&record));

        assert!(text.contains(
            "Intrinsic Value (DDM): undefined — growth rate exceeds required return"
        ));
        assert!(text.contains("(Assumed P/E of 12): undefined — missing trailing EPS"));
        assert!(!text.contains("$0.00"));
    }

    #[test]
    fn test_format_valuation_out_of_range() {
        let value = Err(ValuationError::OutOfRange {
            field: "dividend rate",
            value: 0.0,
        });
        assert_eq!(format_valuation(&value), "undefined — dividend rate is 0");
    }

    #[test]
    fn test_projection_table() {
        let projection = DividendProjection::project(Some(5.4), 0.03, 0.08, 2).unwrap();
        let text = format_projection_table(&projection);

        assert!(text.contains("Projected Dividend"));
        assert!(text.contains("$5.56"));
        assert!(text.contains("Discounted Terminal Value:"));
    }

    #[test]
    fn test_report_heading_includes_name() {
        let record = FundamentalRecord::builder("PRU")
            .name(Some("Prudential Financial, Inc.".to_string()))
            .build();
        let summary = ValuationCalculator::default().evaluate(&record);
        let report = SummaryReport::new(&record, &summary).to_string();

        assert!(report.starts_with("Analyzing stock: PRU (Prudential Financial, Inc.)\n"));
        assert!(report.contains("\nFundamental Metrics:\n=== Fundamental Summary ===\n"));
        assert!(report.contains("=== DDM Analysis Results ==="));
    }
}
