//! Headline figures for a quote table: pure functions, table in, scalars out.
//!
//! All returns are percentages.

use crate::domain::QuoteTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub last_close: f64,
    /// Last close against the previous one; 0 for a single row.
    pub daily_return: f64,
    /// Last close against the first one.
    pub period_return: f64,
    /// Highest high against lowest low.
    pub high_low_range: f64,
}

impl QuoteSummary {
    /// `None` for an empty table.
    pub fn compute(table: &QuoteTable) -> Option<Self> {
        let closes = table.closes();
        let last_close = *closes.last()?;
        Some(Self {
            last_close,
            daily_return: daily_return(&closes),
            period_return: period_return(&closes),
            high_low_range: high_low_range(table),
        })
    }
}

// ─── Individual figures ─────────────────────────────────────────────

pub fn daily_return(closes: &[f64]) -> f64 {
    match closes {
        [.., prev, last] => (last / prev - 1.0) * 100.0,
        _ => 0.0,
    }
}

pub fn period_return(closes: &[f64]) -> f64 {
    match (closes.first(), closes.last()) {
        (Some(first), Some(last)) => (last / first - 1.0) * 100.0,
        _ => 0.0,
    }
}

pub fn high_low_range(table: &QuoteTable) -> f64 {
    let high = table.bars().iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = table.bars().iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    if table.is_empty() {
        return 0.0;
    }
    (high / low - 1.0) * 100.0
}
