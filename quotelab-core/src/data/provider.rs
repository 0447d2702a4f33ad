//! Quote provider trait and shared HTTP plumbing.
//!
//! The QuoteProvider trait abstracts over J-Quants and Alpha Vantage so a
//! front end can dispatch on market without knowing which API answers.

use super::error::RetrievalError;
use crate::domain::QuoteTable;
use reqwest::blocking::Client;
use std::time::Duration;

/// Trait for daily-quote providers.
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily quotes for `symbol`, optionally bounded by `YYYY-MM-DD`
    /// dates. The returned table is ascending by date and never empty.
    fn fetch(
        &self,
        symbol: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<QuoteTable, RetrievalError>;
}

/// Build a blocking client with a per-request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, RetrievalError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("quotelab/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RetrievalError::Network(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error, calling out timeouts explicitly.
pub(crate) fn network_error(e: reqwest::Error) -> RetrievalError {
    if e.is_timeout() {
        RetrievalError::Network(format!("request timed out: {e}"))
    } else {
        RetrievalError::Network(e.to_string())
    }
}

/// Coerce a JSON scalar to `f64`. Accepts numbers and numeric strings.
pub(crate) fn coerce_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_number(&json!(2500.5)), Some(2500.5));
        assert_eq!(coerce_number(&json!(1200)), Some(1200.0));
        assert_eq!(coerce_number(&json!("187.4400")), Some(187.44));
        assert_eq!(coerce_number(&json!(" 52 ")), Some(52.0));
    }

    #[test]
    fn coerce_number_rejects_everything_else() {
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!([1.0])), None);
    }
}
