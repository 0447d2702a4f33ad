//! Rolling volatility: sample standard deviation (n - 1) of `daily_return`
//! over a trailing window.
//!
//! Requires `daily_return`; run `compute_returns` first.

use super::{apply, check_window, mean, rolling, Indicator, IndicatorError, DAILY_RETURN, VOLATILITY};
use crate::domain::QuoteTable;

#[derive(Debug, Clone)]
pub struct Volatility {
    window: usize,
}

impl Volatility {
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        check_window(VOLATILITY, window)?;
        Ok(Self { window })
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        VOLATILITY
    }

    /// daily_return is undefined at row 0, so the first full window ends at
    /// row `window`.
    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, table: &QuoteTable) -> Result<Vec<f64>, IndicatorError> {
        let returns = table
            .column(DAILY_RETURN)
            .ok_or_else(|| IndicatorError::MissingColumn(DAILY_RETURN.to_string()))?;
        Ok(rolling(returns, self.window, sample_std))
    }
}

/// Sample standard deviation. A single value yields NaN.
fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}

/// Add `volatility` computed over `window` daily returns.
pub fn compute_volatility(table: &QuoteTable, window: usize) -> Result<QuoteTable, IndicatorError> {
    apply(table, &Volatility::new(window)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, compute_returns, make_table, DEFAULT_VOLATILITY_WINDOW};

    #[test]
    fn requires_daily_return() {
        let err = compute_volatility(&make_table(&[1.0, 2.0, 3.0]), 2).unwrap_err();
        assert_eq!(err, IndicatorError::MissingColumn(DAILY_RETURN.into()));
    }

    #[test]
    fn sample_std_of_known_returns() {
        // daily returns: NaN, 10, -10, 10
        let table = compute_returns(&make_table(&[100.0, 110.0, 99.0, 108.9])).unwrap();
        let out = compute_volatility(&table, 3).unwrap();
        let vol = out.column(VOLATILITY).unwrap();

        for v in &vol[..3] {
            assert!(v.is_nan());
        }
        // mean = 10/3, deviations 20/3, -40/3, 20/3 → ss = 2400/9, var = 1200/9
        assert_approx(vol[3], (1200.0_f64 / 9.0).sqrt(), 1e-9);
    }

    #[test]
    fn constant_growth_has_zero_volatility() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let table = compute_returns(&make_table(&closes)).unwrap();
        let out = compute_volatility(&table, DEFAULT_VOLATILITY_WINDOW).unwrap();
        let vol = out.column(VOLATILITY).unwrap();
        assert!(vol[19].is_nan());
        assert_approx(vol[20], 0.0, 1e-9);
        assert_approx(vol[29], 0.0, 1e-9);
    }

    #[test]
    fn window_of_one_is_undefined() {
        let table = compute_returns(&make_table(&[1.0, 2.0, 3.0])).unwrap();
        let out = compute_volatility(&table, 1).unwrap();
        assert!(out.column(VOLATILITY).unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zero_window_is_rejected() {
        let table = compute_returns(&make_table(&[1.0, 2.0])).unwrap();
        assert!(compute_volatility(&table, 0).is_err());
    }
}
