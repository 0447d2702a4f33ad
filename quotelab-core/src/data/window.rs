//! Date-range validation against a provider's subscription window.
//!
//! An overlapping request is silently clamped to the window; a disjoint one is
//! an error. Malformed dates fail before any range logic runs.

use super::error::{ParseError, RangeError, WindowError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Closed date interval a data subscription is authorized to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SubscriptionWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The J-Quants plan window: 2023-02-10 ..= 2025-02-10.
    pub fn jquants_default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2023, 2, 10).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap_or_default(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for SubscriptionWindow {
    fn default() -> Self {
        Self::jquants_default()
    }
}

impl fmt::Display for SubscriptionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// The window actually queried, plus what the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
}

impl EffectiveRange {
    /// True if clamping moved either bound.
    pub fn was_narrowed(&self) -> bool {
        self.from != self.requested_from || self.to != self.requested_to
    }

    pub fn from_param(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }
}

/// Parse a strict `YYYY-MM-DD` date. `field` names the bound in the error.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = value.trim();
    // chrono accepts unpadded fields ("2023-3-1"); require the canonical width.
    if trimmed.len() != 10 {
        return Err(ParseError {
            field,
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ParseError {
        field,
        value: value.to_string(),
    })
}

/// Clamp `[from, to]` to `window`. Missing `from` is the window start; missing
/// `to` is `today`.
pub fn validate(
    from: Option<&str>,
    to: Option<&str>,
    window: &SubscriptionWindow,
    today: NaiveDate,
) -> Result<EffectiveRange, WindowError> {
    let requested_from = match from {
        Some(s) => parse_date("from", s)?,
        None => window.start,
    };
    let requested_to = match to {
        Some(s) => parse_date("to", s)?,
        None => today,
    };

    if requested_from > window.end || requested_to < window.start {
        return Err(RangeError {
            from: requested_from,
            to: requested_to,
            window: *window,
        }
        .into());
    }

    Ok(EffectiveRange {
        from: requested_from.max(window.start),
        to: requested_to.min(window.end),
        requested_from,
        requested_to,
    })
}

/// [`validate`] with `today` taken from the local clock.
pub fn validate_today(
    from: Option<&str>,
    to: Option<&str>,
    window: &SubscriptionWindow,
) -> Result<EffectiveRange, WindowError> {
    validate(from, to, window, chrono::Local::now().date_naive())
}
