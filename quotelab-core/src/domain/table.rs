//! Canonical quote table — the provider-independent daily price series.
//!
//! Bars are strictly ascending by date with no duplicates. Derived indicator
//! columns ride alongside the bars as named `f64` series of the same length;
//! `NaN` marks a value as undefined (warmup rows, first-row returns).
//!
//! Tables are never mutated in place by the indicator pipeline. Every stage
//! calls [`QuoteTable::with_column`], which returns an extended copy.

use super::bar::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named derived series aligned with the table's bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedColumn {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("dates out of order: {previous} is followed by {next}")]
    Unordered { previous: NaiveDate, next: NaiveDate },

    #[error("duplicate date {0} in quote table")]
    DuplicateDate(NaiveDate),

    #[error("column '{name}' has {actual} values, table has {expected} rows")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteTable {
    symbol: String,
    bars: Vec<Bar>,
    columns: Vec<DerivedColumn>,
}

impl QuoteTable {
    /// Build a table from bars that are already in ascending date order.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, TableError> {
        check_order(&bars)?;
        Ok(Self {
            symbol: symbol.into(),
            bars,
            columns: Vec::new(),
        })
    }

    /// Sort bars by date, then build. Duplicate dates are still rejected.
    pub fn from_unsorted(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self, TableError> {
        bars.sort_by_key(|b| b.date);
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// True if any bar carries an adjusted close.
    pub fn has_adj_close(&self) -> bool {
        self.bars.iter().any(|b| b.adj_close.is_some())
    }

    /// Look up a derived column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn columns(&self) -> &[DerivedColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Return a copy of this table with `values` attached as column `name`.
    ///
    /// An existing column of the same name is replaced in the copy, keeping
    /// its position.
    pub fn with_column(&self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, TableError> {
        let name = name.into();
        if values.len() != self.bars.len() {
            return Err(TableError::LengthMismatch {
                name,
                expected: self.bars.len(),
                actual: values.len(),
            });
        }

        let mut out = self.clone();
        match out.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => out.columns.push(DerivedColumn { name, values }),
        }
        Ok(out)
    }

    /// Sub-table with `from <= date <= to`. `None` leaves that side unbounded.
    pub fn slice_dates(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let start = match from {
            Some(d) => self.bars.partition_point(|b| b.date < d),
            None => 0,
        };
        let end = match to {
            Some(d) => self.bars.partition_point(|b| b.date <= d),
            None => self.bars.len(),
        };
        let end = end.max(start);

        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| DerivedColumn {
                    name: c.name.clone(),
                    values: c.values[start..end].to_vec(),
                })
                .collect(),
        }
    }
}

fn check_order(bars: &[Bar]) -> Result<(), TableError> {
    for pair in bars.windows(2) {
        let (previous, next) = (pair[0].date, pair[1].date);
        if previous == next {
            return Err(TableError::DuplicateDate(next));
        }
        if previous > next {
            return Err(TableError::Unordered { previous, next });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_bars;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let mut bars = make_bars(&[100.0, 101.0]);
        bars[1].date = bars[0].date;
        let err = QuoteTable::new("7203", bars).unwrap_err();
        assert_eq!(err, TableError::DuplicateDate(d(2024, 1, 2)));
    }

    #[test]
    fn new_rejects_descending_dates() {
        let mut bars = make_bars(&[100.0, 101.0]);
        bars.reverse();
        assert!(matches!(
            QuoteTable::new("7203", bars),
            Err(TableError::Unordered { .. })
        ));
    }

    #[test]
    fn from_unsorted_sorts_ascending() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0]);
        bars.reverse();
        let table = QuoteTable::from_unsorted("AAPL", bars).unwrap();
        assert_eq!(table.closes(), vec![100.0, 101.0, 102.0]);
        assert_eq!(table.first_date(), Some(d(2024, 1, 2)));
        assert_eq!(table.last_date(), Some(d(2024, 1, 4)));
    }

    #[test]
    fn with_column_leaves_receiver_untouched() {
        let table = QuoteTable::new("AAPL", make_bars(&[1.0, 2.0])).unwrap();
        let extended = table.with_column("x", vec![f64::NAN, 1.0]).unwrap();
        assert!(table.column("x").is_none());
        assert_eq!(extended.column_names(), vec!["x"]);
        assert_eq!(extended.bars(), table.bars());
    }

    #[test]
    fn with_column_replaces_same_name() {
        let table = QuoteTable::new("AAPL", make_bars(&[1.0, 2.0])).unwrap();
        let t1 = table.with_column("a", vec![1.0, 1.0]).unwrap();
        let t2 = t1.with_column("b", vec![2.0, 2.0]).unwrap();
        let t3 = t2.with_column("a", vec![3.0, 3.0]).unwrap();
        assert_eq!(t3.column_names(), vec!["a", "b"]);
        assert_eq!(t3.column("a"), Some(&[3.0, 3.0][..]));
    }

    #[test]
    fn with_column_rejects_wrong_length() {
        let table = QuoteTable::new("AAPL", make_bars(&[1.0, 2.0])).unwrap();
        assert!(matches!(
            table.with_column("x", vec![1.0]),
            Err(TableError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn slice_dates_is_inclusive_and_keeps_columns_aligned() {
        let table = QuoteTable::new("AAPL", make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap()
            .with_column("idx", vec![0.0, 1.0, 2.0, 3.0, 4.0])
            .unwrap();

        let sliced = table.slice_dates(Some(d(2024, 1, 3)), Some(d(2024, 1, 5)));
        assert_eq!(sliced.closes(), vec![2.0, 3.0, 4.0]);
        assert_eq!(sliced.column("idx"), Some(&[1.0, 2.0, 3.0][..]));

        let open_ended = table.slice_dates(Some(d(2024, 1, 5)), None);
        assert_eq!(open_ended.len(), 2);

        let empty = table.slice_dates(Some(d(2025, 1, 1)), Some(d(2024, 1, 1)));
        assert!(empty.is_empty());
    }
}
