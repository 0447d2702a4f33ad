//! Structured error types for retrieval and validation.
//!
//! Every failure carries enough context (HTTP status, provider message, the
//! violated bound) for a front end to show a useful message.

use super::window::SubscriptionWindow;
use crate::domain::TableError;
use chrono::NaiveDate;
use thiserror::Error;

/// A date string that is not a `YYYY-MM-DD` calendar date.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {field} date '{value}': expected YYYY-MM-DD")]
pub struct ParseError {
    pub field: &'static str,
    pub value: String,
}

/// A requested window that does not overlap the subscription window at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("requested range {from} ~ {to} is outside the subscription window {window}")]
pub struct RangeError {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub window: SubscriptionWindow,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Credential exchange failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    #[error("auth endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("auth response has no '{field}' field")]
    MissingToken { field: &'static str },

    #[error("could not decode auth response: {0}")]
    Decode(String),

    #[error("network error during auth: {0}")]
    Network(String),
}

/// Diagnostic text a provider embedded in place of the expected data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("provider rejected the request: {message}")]
pub struct ProviderError {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("invalid date range: {0}")]
    Range(#[from] WindowError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    #[error("quotes endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("no quotes for {symbol} between {from} and {to}")]
    EmptyResult {
        symbol: String,
        from: String,
        to: String,
    },

    #[error("response is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("non-numeric {field} '{value}' on {date}")]
    InvalidValue {
        date: String,
        field: String,
        value: String,
    },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed quote table: {0}")]
    Table(#[from] TableError),
}

impl RetrievalError {
    /// HTTP status attached to this failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Auth(AuthError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Uses the JSON `message` field when the body is structured, otherwise the
/// raw (trimmed) body text.
pub(crate) fn body_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
