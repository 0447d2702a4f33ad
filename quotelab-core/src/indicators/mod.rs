//! Indicator pipeline.
//!
//! Every stage is a pure transform: it reads a [`QuoteTable`] and returns an
//! extended copy with new derived columns. Inputs are never mutated, so stages
//! can be chained freely.
//!
//! Column names match what charting front ends expect: `daily_return`,
//! `cumulative_return`, `MA_{w}`, `volatility`, `RSI`.

pub mod returns;
pub mod rsi;
pub mod sma;
pub mod summary;
pub mod volatility;

pub use returns::{compute_returns, CumulativeReturn, DailyReturn};
pub use rsi::{compute_rsi, Rsi};
pub use sma::{compute_moving_averages, Sma};
pub use summary::QuoteSummary;
pub use volatility::{compute_volatility, Volatility};

use crate::domain::{QuoteTable, TableError};
use thiserror::Error;

pub const DAILY_RETURN: &str = "daily_return";
pub const CUMULATIVE_RETURN: &str = "cumulative_return";
pub const VOLATILITY: &str = "volatility";
pub const RSI: &str = "RSI";

pub const DEFAULT_MA_WINDOWS: [usize; 4] = [5, 20, 60, 120];
pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;
pub const DEFAULT_RSI_WINDOW: usize = 14;

/// Moving-average windows for the stock chart view.
pub const STOCK_MA_WINDOWS: [usize; 3] = [5, 25, 75];
/// Moving-average windows for the fund view.
pub const FUND_MA_WINDOWS: [usize; 3] = [5, 20, 60];

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("column '{0}' is required; run the stage that produces it first")]
    MissingColumn(String),

    #[error("{indicator} window must be >= 1, got {window}")]
    InvalidWindow { indicator: String, window: usize },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// A single-series indicator over a quote table.
///
/// `compute` returns one value per row. The first `lookback()` values are
/// `f64::NAN`. No value at row t may depend on rows after t.
pub trait Indicator: Send + Sync {
    /// Output column name (e.g., "MA_20", "RSI").
    fn name(&self) -> &str;

    /// Number of leading rows that are always undefined.
    fn lookback(&self) -> usize;

    fn compute(&self, table: &QuoteTable) -> Result<Vec<f64>, IndicatorError>;
}

/// Compute `indicator` and return a copy of `table` with its column attached.
pub fn apply(table: &QuoteTable, indicator: &dyn Indicator) -> Result<QuoteTable, IndicatorError> {
    let values = indicator.compute(table)?;
    Ok(table.with_column(indicator.name(), values)?)
}

pub(crate) fn check_window(indicator: &str, window: usize) -> Result<(), IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::InvalidWindow {
            indicator: indicator.to_string(),
            window,
        });
    }
    Ok(())
}

/// Apply `f` to each full trailing window of `values`.
///
/// Rows before the first full window, and windows containing NaN, are NaN.
pub(crate) fn rolling(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = f(slice);
    }
    result
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Build a quote table from close prices for testing.
#[cfg(test)]
pub fn make_table(closes: &[f64]) -> QuoteTable {
    QuoteTable::new("TEST", crate::domain::make_bars(closes)).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
