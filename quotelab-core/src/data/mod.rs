//! Data retrieval: authentication, date-range validation, provider clients,
//! and conversion/export of the canonical quote table.

pub mod alphavantage;
pub mod auth;
pub mod error;
pub mod export;
pub mod jquants;
pub mod provider;
pub mod schema;
pub mod window;

pub use alphavantage::{AlphaVantageProvider, OutputSize, SeriesFunction};
pub use auth::{IdToken, JQuantsAuth, JQuantsCredentials, RefreshToken};
pub use error::{AuthError, ParseError, ProviderError, RangeError, RetrievalError, WindowError};
pub use export::{export_table_csv, write_table_csv, ExportError};
pub use jquants::{strip_market_suffix, JQuantsProvider};
pub use provider::QuoteProvider;
pub use schema::{QuoteSchema, SchemaError};
pub use window::{parse_date, validate, validate_today, EffectiveRange, SubscriptionWindow};
