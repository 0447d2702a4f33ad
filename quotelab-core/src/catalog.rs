//! Markets, lookback periods, and the featured fund list.

use crate::data::jquants::strip_market_suffix;
use crate::data::window::DATE_FORMAT;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which exchange a code belongs to. Japan is served by J-Quants, the US by
/// Alpha Vantage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    #[default]
    #[serde(rename = "jp")]
    Japan,
    Us,
}

impl Market {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Market::Japan => "jquants",
            Market::Us => "alphavantage",
        }
    }

    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Market::Japan => "¥",
            Market::Us => "$",
        }
    }

    /// Code as shown to users: Japanese codes lose their `.T` marker.
    pub fn display_code<'a>(&self, code: &'a str) -> &'a str {
        match self {
            Market::Japan => strip_market_suffix(code),
            Market::Us => code,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Japan => write!(f, "jp"),
            Market::Us => write!(f, "us"),
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jp" | "japan" => Ok(Market::Japan),
            "us" => Ok(Market::Us),
            other => Err(format!("unknown market '{other}' (expected jp or us)")),
        }
    }
}

/// Trim and uppercase; a bare 4-digit Japanese code gets the `.T` marker.
pub fn normalize_code(code: &str, market: Market) -> String {
    let code = code.trim().to_uppercase();
    if market == Market::Japan && code.len() == 4 && code.chars().all(|c| c.is_ascii_digit()) {
        format!("{code}.T")
    } else {
        code
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
    #[default]
    TwoYears,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Week,
        Period::Month,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::Year,
        Period::TwoYears,
    ];

    pub fn days(&self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::Year => 365,
            Period::TwoYears => 730,
        }
    }

    /// `(from, to)` as `YYYY-MM-DD`, ending at `today`.
    pub fn window_ending(&self, today: NaiveDate) -> (String, String) {
        let from = today - Duration::days(self.days());
        (
            from.format(DATE_FORMAT).to_string(),
            today.format(DATE_FORMAT).to_string(),
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::Week => "1w",
            Period::Month => "1m",
            Period::ThreeMonths => "3m",
            Period::SixMonths => "6m",
            Period::Year => "1y",
            Period::TwoYears => "2y",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.to_string() == wanted)
            .ok_or_else(|| format!("unknown period '{s}' (expected one of 1w, 1m, 3m, 6m, 1y, 2y)"))
    }
}

/// A fund tracked through a listed ETF proxy on the Tokyo exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fund {
    pub name: &'static str,
    pub code: &'static str,
}

pub const FUNDS: [Fund; 3] = [
    Fund {
        name: "オルカン（eMAXIS Slim 全世界株式）",
        code: "2559.T",
    },
    Fund {
        name: "S&P500（eMAXIS Slim）",
        code: "2558.T",
    },
    Fund {
        name: "日経225インデックス",
        code: "1321.T",
    },
];

/// Look a fund up by exact name or by proxy code (with or without `.T`).
pub fn find_fund(query: &str) -> Option<&'static Fund> {
    let query = query.trim();
    let code = normalize_code(query, Market::Japan);
    FUNDS.iter().find(|f| f.name == query || f.code == code)
}
