//! Relative Strength Index (RSI).
//!
//! Simple rolling means (not Wilder smoothing) of gains and losses over the
//! last `window` rows. The first row has no delta and counts as a zero
//! gain and zero loss, so the first value lands on row `window - 1`.
//! RSI = 100 - 100 / (1 + mean_gain / mean_loss)
//! Lookback: window - 1.
//! Edge cases: mean_loss == 0 with gains → RSI = 100; a flat window
//! (0 / 0) stays undefined.

use super::{apply, check_window, mean, rolling, Indicator, IndicatorError, RSI};
use crate::domain::QuoteTable;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        check_window(RSI, window)?;
        Ok(Self { window })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        RSI
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, table: &QuoteTable) -> Result<Vec<f64>, IndicatorError> {
        let closes = table.closes();
        let n = closes.len();

        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];
        for i in 1..n {
            let delta = closes[i] - closes[i - 1];
            gains[i] = delta.max(0.0);
            losses[i] = (-delta).max(0.0);
        }

        let mean_gain = rolling(&gains, self.window, mean);
        let mean_loss = rolling(&losses, self.window, mean);

        Ok(mean_gain
            .iter()
            .zip(&mean_loss)
            .map(|(&g, &l)| 100.0 - 100.0 / (1.0 + g / l))
            .collect())
    }
}

/// Add `RSI` over `window` deltas.
pub fn compute_rsi(table: &QuoteTable, window: usize) -> Result<QuoteTable, IndicatorError> {
    apply(table, &Rsi::new(window)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_table, DEFAULT_EPSILON, DEFAULT_RSI_WINDOW};

    #[test]
    fn rsi_all_up() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = compute_rsi(&make_table(&closes), DEFAULT_RSI_WINDOW).unwrap();
        let rsi = out.column(RSI).unwrap();

        for v in &rsi[..DEFAULT_RSI_WINDOW - 1] {
            assert!(v.is_nan());
        }
        for &v in &rsi[DEFAULT_RSI_WINDOW - 1..] {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn first_value_lands_when_window_fills() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = Rsi::new(14).unwrap().compute(&make_table(&closes)).unwrap();
        assert!(result[12].is_nan());
        assert_eq!(result[13], 100.0);
    }

    #[test]
    fn rsi_all_down() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let result = Rsi::new(3).unwrap().compute(&make_table(&closes)).unwrap();
        assert!(result[1].is_nan());
        assert_approx(result[2], 0.0, DEFAULT_EPSILON);
        assert_approx(result[9], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_known_values() {
        // deltas: +2, -1, +3, -2
        let result = Rsi::new(2)
            .unwrap()
            .compute(&make_table(&[10.0, 12.0, 11.0, 14.0, 12.0]))
            .unwrap();
        assert!(result[0].is_nan());
        // row 0 counts as no move: gain mean 1.0, loss mean 0 → 100
        assert_eq!(result[1], 100.0);
        // gain mean 1.0, loss mean 0.5 → RS 2 → 66.66…
        assert_approx(result[2], 100.0 - 100.0 / 3.0, DEFAULT_EPSILON);
        // gain 1.5, loss 0.5 → RS 3 → 75
        assert_approx(result[3], 75.0, DEFAULT_EPSILON);
        // gain 1.5, loss 1.0 → RS 1.5 → 60
        assert_approx(result[4], 60.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_is_undefined() {
        let result = Rsi::new(3).unwrap().compute(&make_table(&[50.0; 6])).unwrap();
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_stays_in_bounds() {
        let closes = [44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.1, 45.9, 46.0];
        let result = Rsi::new(4).unwrap().compute(&make_table(&closes)).unwrap();
        for v in result.iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v), "RSI out of bounds: {v}");
        }
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).unwrap().lookback(), 13);
        assert_eq!(Rsi::new(1).unwrap().lookback(), 0);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            compute_rsi(&make_table(&[1.0, 2.0]), 0),
            Err(IndicatorError::InvalidWindow { window: 0, .. })
        ));
    }
}
