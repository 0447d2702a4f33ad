//! Daily and cumulative returns, in percent.
//!
//! daily_return[t] = (close[t] / close[t-1] - 1) * 100, undefined at t = 0.
//! cumulative_return[t] = (Π (1 + daily_return / 100) - 1) * 100, compounding
//! over the defined daily returns; undefined where daily_return is.

use super::{apply, Indicator, IndicatorError, CUMULATIVE_RETURN, DAILY_RETURN};
use crate::domain::QuoteTable;

#[derive(Debug, Clone, Default)]
pub struct DailyReturn;

impl Indicator for DailyReturn {
    fn name(&self) -> &str {
        DAILY_RETURN
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, table: &QuoteTable) -> Result<Vec<f64>, IndicatorError> {
        let closes = table.closes();
        let mut result = vec![f64::NAN; closes.len()];
        for i in 1..closes.len() {
            result[i] = (closes[i] / closes[i - 1] - 1.0) * 100.0;
        }
        Ok(result)
    }
}

/// Compounds the table's `daily_return` column.
#[derive(Debug, Clone, Default)]
pub struct CumulativeReturn;

impl Indicator for CumulativeReturn {
    fn name(&self) -> &str {
        CUMULATIVE_RETURN
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, table: &QuoteTable) -> Result<Vec<f64>, IndicatorError> {
        let daily = table
            .column(DAILY_RETURN)
            .ok_or_else(|| IndicatorError::MissingColumn(DAILY_RETURN.to_string()))?;

        // NaN entries are skipped by the running product but stay NaN.
        let mut growth = 1.0;
        Ok(daily
            .iter()
            .map(|&r| {
                if r.is_nan() {
                    f64::NAN
                } else {
                    growth *= 1.0 + r / 100.0;
                    (growth - 1.0) * 100.0
                }
            })
            .collect())
    }
}

/// Add `daily_return` and `cumulative_return`.
pub fn compute_returns(table: &QuoteTable) -> Result<QuoteTable, IndicatorError> {
    let with_daily = apply(table, &DailyReturn)?;
    apply(&with_daily, &CumulativeReturn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_table, DEFAULT_EPSILON};

    #[test]
    fn single_row_has_undefined_return() {
        let out = compute_returns(&make_table(&[100.0])).unwrap();
        assert!(out.column(DAILY_RETURN).unwrap()[0].is_nan());
        assert!(out.column(CUMULATIVE_RETURN).unwrap()[0].is_nan());
    }

    #[test]
    fn empty_table_yields_empty_columns() {
        let table = QuoteTable::new("EMPTY", vec![]).unwrap();
        let out = compute_returns(&table).unwrap();
        assert_eq!(out.column(DAILY_RETURN), Some(&[][..]));
    }

    #[test]
    fn daily_return_matches_formula_exactly() {
        let closes = [100.0, 110.0, 99.0, 99.0];
        let out = compute_returns(&make_table(&closes)).unwrap();
        let daily = out.column(DAILY_RETURN).unwrap();
        assert!(daily[0].is_nan());
        for i in 1..closes.len() {
            assert_eq!(daily[i], (closes[i] / closes[i - 1] - 1.0) * 100.0);
        }
        assert_eq!(daily[3], 0.0);
    }

    #[test]
    fn cumulative_return_compounds() {
        let out = compute_returns(&make_table(&[100.0, 110.0, 121.0, 108.9])).unwrap();
        let cum = out.column(CUMULATIVE_RETURN).unwrap();
        assert_approx(cum[1], 10.0, 1e-9);
        assert_approx(cum[2], 21.0, 1e-9);
        assert_approx(cum[3], 8.9, 1e-9);
    }

    #[test]
    fn last_cumulative_equals_total_return() {
        let closes = [2500.0, 2512.5, 2490.0, 2533.0, 2601.5, 2588.0];
        let out = compute_returns(&make_table(&closes)).unwrap();
        let cum = out.column(CUMULATIVE_RETURN).unwrap();
        let expected = (closes[5] / closes[0] - 1.0) * 100.0;
        assert_approx(cum[5], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn cumulative_requires_daily_column() {
        let err = CumulativeReturn.compute(&make_table(&[1.0, 2.0])).unwrap_err();
        assert_eq!(err, IndicatorError::MissingColumn(DAILY_RETURN.into()));
    }
}
