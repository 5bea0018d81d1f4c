//! Valuation formulas: earnings multiple, price-to-book, dividend discount
//!
//! Every function here is pure. A valuation that cannot be computed comes
//! back as a [`ValuationError`], never as zero, NaN or infinity.

use serde::Serialize;

use crate::config::{MAX_FORECAST_YEARS, ValuationAssumptions};
use crate::error::{ValuationError, ValuationResult};
use crate::record::FundamentalRecord;

/// `assumed_pe * trailing_eps`
pub fn earnings_based_value(trailing_eps: Option<f64>, assumed_pe: f64) -> ValuationResult<f64> {
    let eps = trailing_eps.ok_or(ValuationError::MissingData {
        field: "trailing EPS",
    })?;
    if eps < 0.0 {
        return Err(ValuationError::OutOfRange {
            field: "trailing EPS",
            value: eps,
        });
    }
    finite_multiple("assumed P/E", assumed_pe)?;
    Ok(assumed_pe * eps)
}

/// `target_pb * book_value_per_share`
pub fn price_to_book_value(book_value_per_share: Option<f64>, target_pb: f64) -> ValuationResult<f64> {
    let book_value = book_value_per_share.ok_or(ValuationError::MissingData {
        field: "book value per share",
    })?;
    if book_value < 0.0 {
        return Err(ValuationError::OutOfRange {
            field: "book value per share",
            value: book_value,
        });
    }
    finite_multiple("target P/B", target_pb)?;
    Ok(target_pb * book_value)
}

/// Single-stage Gordon growth value: `D0 * (1 + g) / (r - g)`
pub fn dividend_discount_value(
    dividend_rate: Option<f64>,
    growth_rate: f64,
    required_return: f64,
) -> ValuationResult<f64> {
    let dividend = positive_dividend(dividend_rate)?;
    check_rates(growth_rate, required_return)?;

    let next_year_dividend = dividend * (1.0 + growth_rate);
    Ok(next_year_dividend / (required_return - growth_rate))
}

fn finite_multiple(label: &str, multiple: f64) -> ValuationResult<()> {
    if multiple.is_finite() {
        Ok(())
    } else {
        Err(ValuationError::InvalidAssumption(format!("{label} must be finite")))
    }
}

fn positive_dividend(dividend_rate: Option<f64>) -> ValuationResult<f64> {
    let dividend = dividend_rate.ok_or(ValuationError::MissingData {
        field: "dividend rate",
    })?;
    if dividend <= 0.0 {
        return Err(ValuationError::OutOfRange {
            field: "dividend rate",
            value: dividend,
        });
    }
    Ok(dividend)
}

fn check_rates(growth_rate: f64, required_return: f64) -> ValuationResult<()> {
    if !growth_rate.is_finite() || !required_return.is_finite() {
        return Err(ValuationError::InvalidAssumption(
            "growth rate and required return must be finite".to_string(),
        ));
    }
    if growth_rate <= -1.0 || required_return <= -1.0 {
        return Err(ValuationError::InvalidAssumption(
            "growth rate and required return must be greater than -100%".to_string(),
        ));
    }
    if required_return <= growth_rate {
        return Err(ValuationError::growth_exceeds_return());
    }
    Ok(())
}

/// One explicit year of the dividend projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedDividend {
    pub year: u32,
    pub projected: f64,
    pub discounted: f64,
}

/// Year-by-year dividend projection with a Gordon terminal value.
///
/// With a constant growth rate `intrinsic_value` equals
/// [`dividend_discount_value`]; the breakdown is what the charts show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendProjection {
    pub years: Vec<ProjectedDividend>,
    pub terminal_value: f64,
    pub discounted_terminal_value: f64,
    pub intrinsic_value: f64,
}

impl DividendProjection {
    pub fn project(
        dividend_rate: Option<f64>,
        growth_rate: f64,
        required_return: f64,
        forecast_years: u32,
    ) -> ValuationResult<Self> {
        let dividend = positive_dividend(dividend_rate)?;
        check_rates(growth_rate, required_return)?;
        if forecast_years == 0 || forecast_years > MAX_FORECAST_YEARS {
            return Err(ValuationError::InvalidAssumption(format!(
                "forecast horizon must be between 1 and {MAX_FORECAST_YEARS} years"
            )));
        }

        let years: Vec<_> = (1..=forecast_years)
            .map(|year| {
                let exp = year as i32;
                let projected = dividend * (1.0 + growth_rate).powi(exp);
                ProjectedDividend {
                    year,
                    projected,
                    discounted: projected / (1.0 + required_return).powi(exp),
                }
            })
            .collect();

        let horizon = forecast_years as i32;
        let last_dividend = dividend * (1.0 + growth_rate).powi(horizon);
        let terminal_value = last_dividend * (1.0 + growth_rate) / (required_return - growth_rate);
        let discounted_terminal_value = terminal_value / (1.0 + required_return).powi(horizon);
        let intrinsic_value =
            years.iter().map(|y| y.discounted).sum::<f64>() + discounted_terminal_value;

        let overflowed = years
            .iter()
            .flat_map(|y| [y.projected, y.discounted])
            .chain([terminal_value, discounted_terminal_value, intrinsic_value])
            .any(|v| !v.is_finite());
        if overflowed {
            return Err(ValuationError::InvalidAssumption(
                "dividend projection overflowed".to_string(),
            ));
        }

        Ok(Self {
            years,
            terminal_value,
            discounted_terminal_value,
            intrinsic_value,
        })
    }

    /// Sum of the discounted explicit-year dividends
    pub fn discounted_dividends_total(&self) -> f64 {
        self.years.iter().map(|y| y.discounted).sum()
    }
}

/// Outcome of all valuations for one record.
///
/// Each entry fails independently.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationSummary {
    pub assumptions: ValuationAssumptions,
    pub dividend_discount: ValuationResult<f64>,
    pub earnings_based: ValuationResult<f64>,
    pub price_to_book: ValuationResult<f64>,
}

impl ValuationSummary {
    /// How many of the three valuations produced a price
    pub fn defined_count(&self) -> usize {
        [&self.dividend_discount, &self.earnings_based, &self.price_to_book]
            .iter()
            .filter(|v| v.is_ok())
            .count()
    }
}

/// Applies a fixed set of assumptions to fundamental records
#[derive(Debug, Clone, Copy, Default)]
pub struct ValuationCalculator {
    assumptions: ValuationAssumptions,
}

impl ValuationCalculator {
    pub fn new(assumptions: ValuationAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &ValuationAssumptions {
        &self.assumptions
    }

    pub fn earnings_based(&self, record: &FundamentalRecord) -> ValuationResult<f64> {
        earnings_based_value(record.trailing_eps(), self.assumptions.assumed_pe)
    }

    pub fn price_to_book(&self, record: &FundamentalRecord) -> ValuationResult<f64> {
        price_to_book_value(record.book_value_per_share(), self.assumptions.target_pb)
    }

    pub fn dividend_discount(&self, record: &FundamentalRecord) -> ValuationResult<f64> {
        dividend_discount_value(
            record.dividend_rate(),
            self.assumptions.growth_rate,
            self.assumptions.required_return,
        )
    }

    pub fn dividend_projection(&self, record: &FundamentalRecord) -> ValuationResult<DividendProjection> {
        DividendProjection::project(
            record.dividend_rate(),
            self.assumptions.growth_rate,
            self.assumptions.required_return,
            self.assumptions.forecast_years,
        )
    }

    /// Run all three valuations
    pub fn evaluate(&self, record: &FundamentalRecord) -> ValuationSummary {
        let summary = ValuationSummary {
            assumptions: self.assumptions,
            dividend_discount: self.dividend_discount(record),
            earnings_based: self.earnings_based(record),
            price_to_book: self.price_to_book(record),
        };

        tracing::debug!(
            ticker = record.ticker(),
            defined = summary.defined_count(),
            "valuations computed"
        );
        summary
    }
}
