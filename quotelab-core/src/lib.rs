//! QuoteLab Core — daily quote retrieval, normalization, and indicators.
//!
//! This crate contains:
//! - Domain types (bars, the canonical quote table)
//! - J-Quants authentication and subscription-windowed quote retrieval
//! - Alpha Vantage daily time-series retrieval
//! - Date-range validation against a subscription window
//! - Indicator pipeline (returns, moving averages, volatility, RSI)
//! - Market/fund catalog and configuration

pub mod catalog;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
