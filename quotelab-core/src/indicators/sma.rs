//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{apply, check_window, mean, rolling, Indicator, IndicatorError};
use crate::domain::QuoteTable;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_window("moving average", period)?;
        Ok(Self {
            period,
            name: format!("MA_{period}"),
        })
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, table: &QuoteTable) -> Result<Vec<f64>, IndicatorError> {
        Ok(rolling(&table.closes(), self.period, mean))
    }
}

/// Add one `MA_{w}` column per window, in the order given.
pub fn compute_moving_averages(
    table: &QuoteTable,
    windows: &[usize],
) -> Result<QuoteTable, IndicatorError> {
    let mut out = table.clone();
    for &window in windows {
        out = apply(&out, &Sma::new(window)?)?;
    }
    Ok(out)
}
