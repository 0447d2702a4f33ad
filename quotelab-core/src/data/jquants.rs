//! J-Quants data provider (Japanese equities, ETFs and fund proxies).
//!
//! Every fetch validates the requested dates against the subscription window,
//! performs a fresh two-step token exchange, then issues a single
//! authenticated GET against `/prices/daily_quotes`. No retries.

use super::auth::{JQuantsAuth, JQuantsCredentials};
use super::error::{body_message, RetrievalError};
use super::provider::{coerce_number, http_client, network_error, QuoteProvider};
use super::window::{validate_today, EffectiveRange, SubscriptionWindow, DATE_FORMAT};
use crate::config::JQuantsConfig;
use crate::domain::{Bar, QuoteTable};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Columns every `daily_quotes` row must carry.
const REQUIRED_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

const ADJUSTED_CLOSE_COLUMN: &str = "AdjustmentClose";

static NULL: Value = Value::Null;

/// Tokyo Stock Exchange suffix used by front ends (`7203.T`).
const MARKET_SUFFIX: &str = ".T";

#[derive(Debug, Deserialize)]
struct DailyQuotesResponse {
    #[serde(default)]
    daily_quotes: Option<Vec<Map<String, Value>>>,
}

pub struct JQuantsProvider {
    client: Client,
    base_url: String,
    auth: JQuantsAuth,
    window: SubscriptionWindow,
}

impl JQuantsProvider {
    pub fn new(config: &JQuantsConfig) -> Result<Self, RetrievalError> {
        let client = http_client(config.timeout())?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let auth = JQuantsAuth::new(
            client.clone(),
            base_url.clone(),
            JQuantsCredentials::new(config.email.clone(), config.password.clone()),
        );

        Ok(Self {
            client,
            base_url,
            auth,
            window: SubscriptionWindow::jquants_default(),
        })
    }

    /// Replace the subscription window. Not reachable from configuration.
    #[doc(hidden)]
    pub fn with_window(mut self, window: SubscriptionWindow) -> Self {
        self.window = window;
        self
    }

    pub fn subscription_window(&self) -> &SubscriptionWindow {
        &self.window
    }

    /// Fetch daily quotes and report the window that was actually queried.
    ///
    /// The effective window may be narrower than the requested one; check
    /// [`EffectiveRange::was_narrowed`].
    pub fn fetch_with_range(
        &self,
        code: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<(QuoteTable, EffectiveRange), RetrievalError> {
        let raw_code = code;
        let code = strip_market_suffix(raw_code);
        if code.is_empty() {
            return Err(RetrievalError::InvalidSymbol(raw_code.to_string()));
        }

        let range = validate_today(from, to, &self.window)?;
        if range.was_narrowed() {
            tracing::warn!(
                code,
                requested_from = %range.requested_from,
                requested_to = %range.requested_to,
                from = %range.from,
                to = %range.to,
                "requested range narrowed to subscription window"
            );
        }

        let id_token = self.auth.session()?;

        let url = format!("{}/prices/daily_quotes", self.base_url);
        let (from_param, to_param) = (range.from_param(), range.to_param());
        tracing::debug!(url = %url, code, from = %from_param, to = %to_param, "fetching daily quotes");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(id_token.secret())
            .query(&[
                ("code", code),
                ("from", from_param.as_str()),
                ("to", to_param.as_str()),
            ])
            .send()
            .map_err(network_error)?;

        let status = resp.status();
        let text = resp.text().map_err(network_error)?;
        if status != reqwest::StatusCode::OK {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                message: body_message(&text),
            });
        }

        let table = parse_daily_quotes(code, &text, &from_param, &to_param)?;
        tracing::info!(
            provider = "jquants",
            code,
            rows = table.len(),
            "daily quotes fetched"
        );
        Ok((table, range))
    }

    pub fn fetch(
        &self,
        code: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<QuoteTable, RetrievalError> {
        self.fetch_with_range(code, from, to).map(|(table, _)| table)
    }
}

impl QuoteProvider for JQuantsProvider {
    fn name(&self) -> &str {
        "jquants"
    }

    fn fetch(
        &self,
        symbol: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<QuoteTable, RetrievalError> {
        JQuantsProvider::fetch(self, symbol, from, to)
    }
}

/// Drop the exchange marker from a code: `7203.T` → `7203`.
pub fn strip_market_suffix(code: &str) -> &str {
    let code = code.trim();
    match code.len().checked_sub(MARKET_SUFFIX.len()) {
        Some(cut)
            if code.is_char_boundary(cut)
                && code[cut..].eq_ignore_ascii_case(MARKET_SUFFIX) =>
        {
            &code[..cut]
        }
        _ => code,
    }
}

/// Map a `daily_quotes` response body onto a quote table.
fn parse_daily_quotes(
    code: &str,
    body: &str,
    from: &str,
    to: &str,
) -> Result<QuoteTable, RetrievalError> {
    let parsed: DailyQuotesResponse =
        serde_json::from_str(body).map_err(|e| RetrievalError::Decode(e.to_string()))?;

    let rows = parsed.daily_quotes.unwrap_or_default();
    if rows.is_empty() {
        return Err(RetrievalError::EmptyResult {
            symbol: code.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| rows.iter().any(|row| !row.contains_key(**col)))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(RetrievalError::MissingColumns(missing));
    }

    let bars = rows
        .iter()
        .map(parse_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuoteTable::from_unsorted(code, bars)?)
}

fn parse_row(row: &Map<String, Value>) -> Result<Bar, RetrievalError> {
    let field = |name: &str| row.get(name).unwrap_or(&NULL);

    let raw_date = field("Date");
    let date_text = raw_date.as_str().unwrap_or_default();
    let date = parse_quote_date(date_text).ok_or_else(|| RetrievalError::InvalidValue {
        date: raw_date.to_string(),
        field: "Date".into(),
        value: raw_date.to_string(),
    })?;

    let number = |name: &str| -> Result<f64, RetrievalError> {
        let value = field(name);
        coerce_number(value).ok_or_else(|| RetrievalError::InvalidValue {
            date: date_text.to_string(),
            field: name.to_string(),
            value: value.to_string(),
        })
    };

    let bar = Bar {
        date,
        open: number("Open")?,
        high: number("High")?,
        low: number("Low")?,
        close: number("Close")?,
        volume: number("Volume")?,
        adj_close: row.get(ADJUSTED_CLOSE_COLUMN).and_then(coerce_number),
    };
    // Suspended or unlisted days come back with zero prices.
    if !bar.is_sane() {
        return Err(RetrievalError::InvalidValue {
            date: date_text.to_string(),
            field: "bar".into(),
            value: format!(
                "open={} high={} low={} close={} volume={}",
                bar.open, bar.high, bar.low, bar.close, bar.volume
            ),
        });
    }
    Ok(bar)
}

/// J-Quants dates are `YYYY-MM-DD`; older plans returned `YYYYMMDD`.
fn parse_quote_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tokyo_suffix() {
        assert_eq!(strip_market_suffix("7203.T"), "7203");
        assert_eq!(strip_market_suffix("1321.t"), "1321");
        assert_eq!(strip_market_suffix(" 9984 "), "9984");
        assert_eq!(strip_market_suffix("72030"), "72030");
        assert_eq!(strip_market_suffix(".T"), "");
        assert_eq!(strip_market_suffix("T"), "T");
    }

    #[test]
    fn parses_and_sorts_rows() {
        let body = r#"{"daily_quotes":[
            {"Date":"2023-03-02","Code":"72030","Open":1800.0,"High":1820.0,"Low":1790.0,"Close":1810.0,"Volume":2000000.0,"AdjustmentClose":1810.0},
            {"Date":"2023-03-01","Code":"72030","Open":1780,"High":"1805","Low":1775.0,"Close":1800.0,"Volume":"1500000"}
        ]}"#;
        let table = parse_daily_quotes("7203", body, "2023-03-01", "2023-03-02").unwrap();

        assert_eq!(table.symbol(), "7203");
        assert_eq!(table.len(), 2);
        assert_eq!(table.closes(), vec![1800.0, 1810.0]);
        assert_eq!(table.bars()[0].high, 1805.0);
        assert_eq!(table.bars()[0].volume, 1_500_000.0);
        assert_eq!(table.bars()[0].adj_close, None);
        assert_eq!(table.bars()[1].adj_close, Some(1810.0));
    }

    #[test]
    fn accepts_compact_dates() {
        let body = r#"{"daily_quotes":[{"Date":"20230301","Open":1,"High":2,"Low":1,"Close":2,"Volume":10}]}"#;
        let table = parse_daily_quotes("1321", body, "", "").unwrap();
        assert_eq!(
            table.first_date(),
            NaiveDate::from_ymd_opt(2023, 3, 1)
        );
    }

    #[test]
    fn zero_close_is_rejected() {
        let body = r#"{"daily_quotes":[{"Date":"2023-03-01","Open":1,"High":2,"Low":1,"Close":0,"Volume":10}]}"#;
        match parse_daily_quotes("1321", body, "", "").unwrap_err() {
            RetrievalError::InvalidValue { date, field, value } => {
                assert_eq!(date, "2023-03-01");
                assert_eq!(field, "bar");
                assert!(value.contains("close=0"));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn inverted_high_low_is_rejected() {
        let body = r#"{"daily_quotes":[{"Date":"2023-03-01","Open":5,"High":4,"Low":6,"Close":5,"Volume":10}]}"#;
        assert!(matches!(
            parse_daily_quotes("1321", body, "", ""),
            Err(RetrievalError::InvalidValue { .. })
        ));
    }

    #[test]
    fn empty_or_absent_rows_are_an_error() {
        for body in [r#"{"daily_quotes":[]}"#, r#"{}"#, r#"{"daily_quotes":null}"#] {
            let err = parse_daily_quotes("7203", body, "2023-03-01", "2023-03-31").unwrap_err();
            match err {
                RetrievalError::EmptyResult { symbol, from, to } => {
                    assert_eq!(symbol, "7203");
                    assert_eq!(from, "2023-03-01");
                    assert_eq!(to, "2023-03-31");
                }
                other => panic!("expected EmptyResult, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_columns_are_named() {
        let body = r#"{"daily_quotes":[
            {"Date":"2023-03-01","Open":1,"Low":1,"Close":1,"Volume":1},
            {"Date":"2023-03-02","Open":1,"High":1,"Low":1,"Close":1}
        ]}"#;
        let err = parse_daily_quotes("7203", body, "", "").unwrap_err();
        match err {
            RetrievalError::MissingColumns(cols) => assert_eq!(cols, vec!["High", "Volume"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn null_price_is_a_hard_failure() {
        let body = r#"{"daily_quotes":[{"Date":"2023-03-01","Open":null,"High":1,"Low":1,"Close":1,"Volume":0}]}"#;
        let err = parse_daily_quotes("7203", body, "", "").unwrap_err();
        match err {
            RetrievalError::InvalidValue { date, field, value } => {
                assert_eq!(date, "2023-03-01");
                assert_eq!(field, "Open");
                assert_eq!(value, "null");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let row = r#"{"Date":"2023-03-01","Open":1,"High":1,"Low":1,"Close":1,"Volume":1}"#;
        let body = format!(r#"{{"daily_quotes":[{row},{row}]}}"#);
        assert!(matches!(
            parse_daily_quotes("7203", &body, "", ""),
            Err(RetrievalError::Table(_))
        ));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        assert!(matches!(
            parse_daily_quotes("7203", "<html>", "", ""),
            Err(RetrievalError::Decode(_))
        ));
    }
}
