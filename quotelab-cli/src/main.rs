//! QuoteLab CLI — fetch daily quotes, derive indicators, export tables.
//!
//! Commands:
//! - `fetch` — fetch a Japanese (J-Quants) or US (Alpha Vantage) code and
//!   print the latest rows with indicators
//! - `fund` — fund view over an ETF proxy: MA 5/20/60, returns, summary
//! - `funds` — list the featured funds

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use quotelab_core::catalog::{find_fund, normalize_code, Market, Period, FUNDS};
use quotelab_core::config::QuotelabConfig;
use quotelab_core::data::{
    write_table_csv, AlphaVantageProvider, JQuantsProvider, QuoteProvider, RetrievalError,
};
use quotelab_core::domain::QuoteTable;
use quotelab_core::indicators::{
    compute_moving_averages, compute_returns, compute_rsi, compute_volatility, QuoteSummary,
    CUMULATIVE_RETURN, DAILY_RETURN, DEFAULT_RSI_WINDOW, DEFAULT_VOLATILITY_WINDOW,
    FUND_MA_WINDOWS, STOCK_MA_WINDOWS,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quotelab",
    about = "QuoteLab CLI — daily quotes and technical indicators"
)]
struct Cli {
    /// Log filter when RUST_LOG is unset (e.g., info, quotelab_core=debug).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Path to a TOML config file. Environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily quotes for one code and derive indicators.
    Fetch {
        /// Security code (e.g., 7203, 1321.T, AAPL).
        code: String,

        /// Market: jp (J-Quants) or us (Alpha Vantage).
        #[arg(long, default_value_t = Market::Japan)]
        market: Market,

        /// Lookback period ending today: 1w, 1m, 3m, 6m, 1y, 2y.
        #[arg(long, default_value_t = Period::TwoYears)]
        period: Period,

        /// Start date (YYYY-MM-DD). Overrides --period.
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD). Overrides --period.
        #[arg(long)]
        to: Option<String>,

        /// Moving-average windows, comma separated.
        #[arg(long, value_delimiter = ',', default_values_t = STOCK_MA_WINDOWS)]
        ma: Vec<usize>,

        /// Add RSI.
        #[arg(long, default_value_t = false)]
        rsi: bool,

        /// Add rolling volatility of daily returns.
        #[arg(long, default_value_t = false)]
        volatility: bool,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Write the full table to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Fund view for a featured fund (by name or proxy code).
    Fund {
        /// Fund name or proxy code (see `quotelab funds`).
        fund: String,

        /// Lookback period ending today: 1w, 1m, 3m, 6m, 1y, 2y.
        #[arg(long, default_value_t = Period::TwoYears)]
        period: Period,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Write the full table to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List the featured funds.
    Funds,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Fetch {
            code,
            market,
            period,
            from,
            to,
            ma,
            rsi,
            volatility,
            rows,
            csv,
        } => {
            let opts = FetchOptions {
                market,
                period,
                from,
                to,
                ma,
                rsi,
                volatility,
                rows,
                csv,
            };
            run_fetch(cli.config.as_deref(), &code, &opts)
        }
        Commands::Fund {
            fund,
            period,
            rows,
            csv,
        } => run_fund(cli.config.as_deref(), &fund, period, rows, csv.as_deref()),
        Commands::Funds => {
            run_funds();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        if let Some(hint) = hint_for(&err) {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
    Ok(())
}

struct FetchOptions {
    market: Market,
    period: Period,
    from: Option<String>,
    to: Option<String>,
    ma: Vec<usize>,
    rsi: bool,
    volatility: bool,
    rows: usize,
    csv: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<QuotelabConfig> {
    let mut config = match path {
        Some(path) => QuotelabConfig::from_file(path)?,
        None => QuotelabConfig::default(),
    };
    config.apply_env();
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Explicit bounds win; otherwise the period ending today.
fn request_range(period: Period, from: Option<String>, to: Option<String>) -> (String, String) {
    let (period_from, period_to) = period.window_ending(chrono::Local::now().date_naive());
    (from.unwrap_or(period_from), to.unwrap_or(period_to))
}

fn fetch_table(
    config: &QuotelabConfig,
    market: Market,
    code: &str,
    from: &str,
    to: &str,
) -> Result<QuoteTable> {
    match market {
        Market::Japan => {
            let provider = JQuantsProvider::new(&config.jquants)?;
            let (table, range) = provider.fetch_with_range(code, Some(from), Some(to))?;
            if range.was_narrowed() {
                println!(
                    "Note: range narrowed to {} .. {} (subscription window {})",
                    range.from,
                    range.to,
                    provider.subscription_window()
                );
            }
            Ok(table)
        }
        Market::Us => {
            let provider = AlphaVantageProvider::new(&config.alphavantage)?;
            Ok(provider.fetch(code, Some(from), Some(to))?)
        }
    }
}

fn run_fetch(config_path: Option<&Path>, code: &str, opts: &FetchOptions) -> Result<()> {
    let config = load_config(config_path)?;
    let code = normalize_code(code, opts.market);
    if code.is_empty() {
        bail!("security code is empty");
    }
    let (from, to) = request_range(opts.period, opts.from.clone(), opts.to.clone());

    let table = fetch_table(&config, opts.market, &code, &from, &to)?;

    let mut table = compute_returns(&table)?;
    table = compute_moving_averages(&table, &opts.ma)?;
    if opts.volatility {
        table = compute_volatility(&table, DEFAULT_VOLATILITY_WINDOW)?;
    }
    if opts.rsi {
        table = compute_rsi(&table, DEFAULT_RSI_WINDOW)?;
    }

    print_header(opts.market.display_code(&code), opts.market, &table);
    print_rows(&table, opts.rows);

    if let Some(path) = &opts.csv {
        write_table_csv(&table, path)?;
        println!("CSV written to: {}", path.display());
    }
    Ok(())
}

fn run_fund(
    config_path: Option<&Path>,
    query: &str,
    period: Period,
    rows: usize,
    csv: Option<&Path>,
) -> Result<()> {
    let Some(fund) = find_fund(query) else {
        bail!("unknown fund '{query}'. Run `quotelab funds` for the list");
    };
    let config = load_config(config_path)?;
    let (from, to) = request_range(period, None, None);

    let table = fetch_table(&config, Market::Japan, fund.code, &from, &to)?;
    let table = compute_moving_averages(&compute_returns(&table)?, &FUND_MA_WINDOWS)?;

    println!();
    println!("=== {} ({}) ===", fund.name, fund.code);
    print_header(Market::Japan.display_code(fund.code), Market::Japan, &table);
    if let Some(cum) = table
        .column(CUMULATIVE_RETURN)
        .and_then(|c| c.iter().rev().find(|v| !v.is_nan()))
    {
        println!("Cumulative:     {cum:+.2}%");
    }
    print_rows(&table, rows);

    if let Some(path) = csv {
        write_table_csv(&table, path)?;
        println!("CSV written to: {}", path.display());
    }
    Ok(())
}

fn run_funds() {
    println!("{:<8} NAME", "CODE");
    for fund in FUNDS {
        println!("{:<8} {}", fund.code, fund.name);
    }
}

fn print_header(display_code: &str, market: Market, table: &QuoteTable) {
    let currency = market.currency_symbol();
    println!();
    println!("Symbol:         {display_code}");
    if let (Some(first), Some(last)) = (table.first_date(), table.last_date()) {
        println!("Period:         {first} to {last}");
    }
    println!("Rows:           {}", table.len());
    if let Some(summary) = QuoteSummary::compute(table) {
        println!("Last close:     {currency}{:.2}", summary.last_close);
        println!("Daily return:   {:+.2}%", summary.daily_return);
        println!("Period return:  {:+.2}%", summary.period_return);
        println!("High/low range: {:.2}%", summary.high_low_range);
    }
}

fn print_rows(table: &QuoteTable, rows: usize) {
    let names: Vec<&str> = table
        .column_names()
        .into_iter()
        .filter(|n| *n != DAILY_RETURN)
        .collect();

    println!();
    let mut header = format!("{:<10} {:>12} {:>12} {:>14}", "date", "close", "return%", "volume");
    for name in &names {
        header.push_str(&format!(" {name:>17}"));
    }
    println!("{header}");

    let start = table.len().saturating_sub(rows);
    let daily = table.column(DAILY_RETURN);
    for (i, bar) in table.bars().iter().enumerate().skip(start) {
        let ret = daily.map(|d| d[i]).unwrap_or(f64::NAN);
        let mut line = format!(
            "{:<10} {:>12.2} {:>12} {:>14.0}",
            bar.date.format("%Y-%m-%d"),
            bar.close,
            fmt_value(ret),
            bar.volume
        );
        for name in &names {
            let v = table.column(name).map(|c| c[i]).unwrap_or(f64::NAN);
            line.push_str(&format!(" {:>17}", fmt_value(v)));
        }
        println!("{line}");
    }
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else {
        format!("{v:.2}")
    }
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    let retrieval = err.downcast_ref::<RetrievalError>()?;
    Some(match retrieval {
        RetrievalError::Auth(_) => "set JQUANTS_EMAIL and JQUANTS_PASSWORD (a .env file works)",
        RetrievalError::Range(_) => "J-Quants only serves dates inside the subscription window",
        RetrievalError::Provider(_) => {
            "Alpha Vantage rate limit or bad key; set ALPHAVANTAGE_API_KEY or retry later"
        }
        _ => "check the code, e.g. 7203, 1321.T for --market jp or AAPL for --market us",
    })
}
