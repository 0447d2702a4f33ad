//! Domain types: the daily bar and the canonical quote table.

pub mod bar;
pub mod table;

pub use bar::Bar;
pub use table::{DerivedColumn, QuoteTable, TableError};

/// Create synthetic bars from close prices for testing.
///
/// Dates start at 2024-01-02 and advance one calendar day per bar.
/// open = prev_close (or close for the first bar), high/low = max/min ± 1.0,
/// volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
                adj_close: None,
            }
        })
        .collect()
}
