//! Alpha Vantage data provider (US tickers).
//!
//! A single unauthenticated GET per ticker. The response is a date-keyed
//! object rather than a row list, so it is pivoted into bars here. When the
//! expected time-series container is missing, Alpha Vantage has put a
//! rate-limit notice or error message in its place; that text becomes the
//! failure cause.

use super::error::{body_message, ProviderError, RetrievalError, WindowError};
use super::provider::{coerce_number, http_client, network_error, QuoteProvider};
use super::window::{parse_date, DATE_FORMAT};
use crate::config::{mask_secret, AlphaVantageConfig};
use crate::domain::{Bar, QuoteTable};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

const TIME_SERIES_KEY: &str = "Time Series (Daily)";

static NULL: Value = Value::Null;

/// Keys Alpha Vantage uses for diagnostics, in the order they are preferred.
const DIAGNOSTIC_KEYS: [&str; 3] = ["Note", "Information", "Error Message"];

/// Which daily time-series endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeriesFunction {
    #[default]
    #[serde(rename = "TIME_SERIES_DAILY")]
    Daily,
    #[serde(rename = "TIME_SERIES_DAILY_ADJUSTED")]
    DailyAdjusted,
}

impl SeriesFunction {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Daily => "TIME_SERIES_DAILY",
            Self::DailyAdjusted => "TIME_SERIES_DAILY_ADJUSTED",
        }
    }

    fn volume_label(&self) -> &'static str {
        match self {
            Self::Daily => "5. volume",
            Self::DailyAdjusted => "6. volume",
        }
    }

    fn adjusted_close_label(&self) -> Option<&'static str> {
        match self {
            Self::Daily => None,
            Self::DailyAdjusted => Some("5. adjusted close"),
        }
    }

    fn required_labels(&self) -> [&'static str; 5] {
        ["1. open", "2. high", "3. low", "4. close", self.volume_label()]
    }
}

/// `compact` returns the latest 100 points; `full` the whole history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSize {
    Compact,
    #[default]
    Full,
}

impl OutputSize {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown output size '{other}' (expected compact or full)")),
        }
    }
}

pub struct AlphaVantageProvider {
    client: Client,
    base_url: String,
    api_key: String,
    function: SeriesFunction,
}

impl AlphaVantageProvider {
    pub fn new(config: &AlphaVantageConfig) -> Result<Self, RetrievalError> {
        Ok(Self {
            client: http_client(config.timeout())?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            function: config.function,
        })
    }

    /// Fetch the daily history for `ticker`, ascending by date.
    pub fn fetch_series(
        &self,
        ticker: &str,
        output_size: OutputSize,
    ) -> Result<QuoteTable, RetrievalError> {
        let ticker = ticker.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(RetrievalError::InvalidSymbol(ticker));
        }

        let url = format!("{}/query", self.base_url);
        tracing::debug!(
            url = %url,
            function = self.function.as_param(),
            ticker = %ticker,
            output_size = output_size.as_param(),
            api_key = %mask_secret(&self.api_key),
            "fetching time series"
        );

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("function", self.function.as_param()),
                ("symbol", ticker.as_str()),
                ("outputsize", output_size.as_param()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .map_err(network_error)?;

        let status = resp.status();
        let text = resp.text().map_err(network_error)?;
        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                message: body_message(&text),
            });
        }

        let table = parse_time_series(&ticker, self.function, &text)?;
        tracing::info!(
            provider = "alphavantage",
            ticker = %ticker,
            rows = table.len(),
            "time series fetched"
        );
        Ok(table)
    }
}

impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alphavantage"
    }

    /// Fetches the full history, then keeps `from <= date <= to`.
    fn fetch(
        &self,
        symbol: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<QuoteTable, RetrievalError> {
        let from_date = from
            .map(|s| parse_date("from", s))
            .transpose()
            .map_err(WindowError::from)?;
        let to_date = to
            .map(|s| parse_date("to", s))
            .transpose()
            .map_err(WindowError::from)?;

        let table = self
            .fetch_series(symbol, OutputSize::Full)?
            .slice_dates(from_date, to_date);

        if table.is_empty() {
            return Err(RetrievalError::EmptyResult {
                symbol: table.symbol().to_string(),
                from: from.unwrap_or_default().to_string(),
                to: to.unwrap_or_default().to_string(),
            });
        }
        Ok(table)
    }
}

/// Pivot a date-keyed time-series body into a quote table.
fn parse_time_series(
    ticker: &str,
    function: SeriesFunction,
    body: &str,
) -> Result<QuoteTable, RetrievalError> {
    let root: Map<String, Value> =
        serde_json::from_str(body).map_err(|e| RetrievalError::Decode(e.to_string()))?;

    let series = match root.get(TIME_SERIES_KEY).and_then(Value::as_object) {
        Some(series) => series,
        None => {
            let message = DIAGNOSTIC_KEYS
                .iter()
                .find_map(|key| root.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| body.trim().to_string());
            return Err(ProviderError { message }.into());
        }
    };

    if series.is_empty() {
        return Err(RetrievalError::EmptyResult {
            symbol: ticker.to_string(),
            from: String::new(),
            to: String::new(),
        });
    }

    let required = function.required_labels();
    let missing: Vec<String> = required
        .iter()
        .filter(|label| {
            series
                .values()
                .any(|fields| fields.get(**label).is_none())
        })
        .map(|label| label.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(RetrievalError::MissingColumns(missing));
    }

    let mut bars = Vec::with_capacity(series.len());
    for (date_text, fields) in series {
        let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|_| {
            RetrievalError::InvalidValue {
                date: date_text.clone(),
                field: "date".into(),
                value: date_text.clone(),
            }
        })?;

        let number = |label: &str| -> Result<f64, RetrievalError> {
            let value = fields.get(label).unwrap_or(&NULL);
            coerce_number(value).ok_or_else(|| RetrievalError::InvalidValue {
                date: date_text.clone(),
                field: label.to_string(),
                value: value.to_string(),
            })
        };

        let [open, high, low, close, volume] = required;
        let bar = Bar {
            date,
            open: number(open)?,
            high: number(high)?,
            low: number(low)?,
            close: number(close)?,
            volume: number(volume)?,
            adj_close: function
                .adjusted_close_label()
                .and_then(|label| fields.get(label))
                .and_then(coerce_number),
        };
        if !bar.is_sane() {
            return Err(RetrievalError::InvalidValue {
                date: date_text.clone(),
                field: "bar".into(),
                value: format!(
                    "open={} high={} low={} close={} volume={}",
                    bar.open, bar.high, bar.low, bar.close, bar.volume
                ),
            });
        }
        bars.push(bar);
    }

    Ok(QuoteTable::from_unsorted(ticker, bars)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY_BODY: &str = r#"{
        "Meta Data": {"1. Information": "Daily Prices", "2. Symbol": "AAPL"},
        "Time Series (Daily)": {
            "2024-01-04": {"1. open": "182.1500", "2. high": "183.0872", "3. low": "180.8800", "4. close": "181.9100", "5. volume": "71983570"},
            "2024-01-02": {"1. open": "187.1500", "2. high": "188.4400", "3. low": "183.8850", "4. close": "185.6400", "5. volume": "82488674"},
            "2024-01-03": {"1. open": "184.2200", "2. high": "185.8800", "3. low": "183.4300", "4. close": "184.2500", "5. volume": "58414460"}
        }
    }"#;

    #[test]
    fn pivots_and_sorts_ascending() {
        let table = parse_time_series("AAPL", SeriesFunction::Daily, DAILY_BODY).unwrap();
        assert_eq!(table.symbol(), "AAPL");
        assert_eq!(table.closes(), vec![185.64, 184.25, 181.91]);
        assert_eq!(table.bars()[0].volume, 82_488_674.0);
        assert_eq!(table.bars()[0].adj_close, None);
        assert_eq!(
            table.first_date(),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }

    #[test]
    fn adjusted_series_maps_adjusted_close_and_volume() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-02": {"1. open": "10", "2. high": "11", "3. low": "9", "4. close": "10.5",
                           "5. adjusted close": "10.25", "6. volume": "1000", "7. dividend amount": "0.0000"}
        }}"#;
        let table = parse_time_series("MSFT", SeriesFunction::DailyAdjusted, body).unwrap();
        let bar = &table.bars()[0];
        assert_eq!(bar.adj_close, Some(10.25));
        assert_eq!(bar.volume, 1000.0);
    }

    #[test]
    fn adjusted_close_is_optional() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-02": {"1. open": "10", "2. high": "11", "3. low": "9", "4. close": "10.5",
                           "6. volume": "1000"}
        }}"#;
        let table = parse_time_series("MSFT", SeriesFunction::DailyAdjusted, body).unwrap();
        assert_eq!(table.bars()[0].adj_close, None);
        assert_eq!(table.bars()[0].close, 10.5);
    }

    #[test]
    fn zero_close_is_rejected() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-03": {"1. open": "10", "2. high": "11", "3. low": "9", "4. close": "10", "5. volume": "1"},
            "2024-01-02": {"1. open": "10", "2. high": "11", "3. low": "9", "4. close": "0", "5. volume": "1"}
        }}"#;
        match parse_time_series("AAPL", SeriesFunction::Daily, body).unwrap_err() {
            RetrievalError::InvalidValue { date, field, .. } => {
                assert_eq!(date, "2024-01-02");
                assert_eq!(field, "bar");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn rate_limit_note_becomes_provider_error() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        match parse_time_series("AAPL", SeriesFunction::Daily, body).unwrap_err() {
            RetrievalError::Provider(ProviderError { message }) => {
                assert!(message.starts_with("Thank you for using Alpha Vantage"))
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn error_message_becomes_provider_error() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        let err = parse_time_series("NOPE", SeriesFunction::Daily, body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "provider rejected the request: Invalid API call. Please retry or visit the documentation."
        );
    }

    #[test]
    fn unknown_shape_falls_back_to_raw_body() {
        let err = parse_time_series("AAPL", SeriesFunction::Daily, r#"{"foo": 1}"#).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::Provider(ProviderError { ref message }) if message == r#"{"foo": 1}"#
        ));
    }

    #[test]
    fn missing_labels_are_named() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-02": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1"}
        }}"#;
        // adjusted endpoint expects "6. volume"
        let err = parse_time_series("AAPL", SeriesFunction::DailyAdjusted, body).unwrap_err();
        match err {
            RetrievalError::MissingColumns(cols) => assert_eq!(cols, vec!["6. volume"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_value_is_a_hard_failure() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-02": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "-", "5. volume": "1"}
        }}"#;
        match parse_time_series("AAPL", SeriesFunction::Daily, body).unwrap_err() {
            RetrievalError::InvalidValue { date, field, .. } => {
                assert_eq!(date, "2024-01-02");
                assert_eq!(field, "4. close");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn output_size_parses_from_cli_text() {
        assert_eq!("full".parse::<OutputSize>(), Ok(OutputSize::Full));
        assert_eq!("Compact".parse::<OutputSize>(), Ok(OutputSize::Compact));
        assert!("huge".parse::<OutputSize>().is_err());
        assert_eq!(OutputSize::default(), OutputSize::Full);
    }
}
