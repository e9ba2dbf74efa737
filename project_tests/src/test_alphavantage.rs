//! # Alpha Vantage Live Data Test
//!
//! Connects to the Alpha Vantage API via lib_alphavantage and reports what came
//! back for each requested function. Needs `ALPHAVANTAGE_API_KEY` (or a `.env`).
//!
//! The free tier allows only a few calls per minute; keep the function list short.

use clap::Parser;
use lib_alphavantage::configs::config_sys::{load_config, load_dotenv};
use lib_alphavantage::loggers::tracing_setup::{LoggingOptions, init_logging};
use lib_alphavantage::markets::alphavantage::{AlphaVantage, Function, QueryParams};

/// Arguments for the live runner.
#[derive(Parser)]
#[clap(name = "test_alphavantage", about = "Live smoke test for the Alpha Vantage client.")]
struct Args {
    /// Ticker symbol to query.
    #[clap(long, default_value = "IBM")]
    symbol: String,

    /// Provider functions to call, in order.
    #[clap(long = "function", default_values_t = [String::from("TIME_SERIES_DAILY")])]
    functions: Vec<String>,
}

/// Executes the live calls.
///
/// // Statement: Exits non-zero if any call fails.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // // Statement: Pick up .env files, then resolve the layered config
    let env_files = load_dotenv()?;
    let config = load_config()?;
    let _guard = init_logging(&LoggingOptions {
        level: config.log_level.clone(),
        ..LoggingOptions::default()
    })?;
    for path in &env_files {
        println!("[*] Loaded {}", path.display());
    }

    let client = AlphaVantage::from_config(&config)?;
    let mut failures = 0usize;

    for name in &args.functions {
        let function: Function = name.parse()?;
        println!("[*] {} {} via {}", function, args.symbol, function.method_name());

        match client.query(function, &args.symbol, &QueryParams::new()) {
            Ok((data, meta)) => {
                // // Statement: Success - Print the envelope and the size of the series
                let points = data.as_object().map_or(0, |m| m.len());
                println!("[SUCCESS] {} data points", points);
                println!("{}", serde_json::to_string_pretty(&meta)?);
            }
            Err(e) => {
                eprintln!("[ERROR] {} failed:", function);
                eprintln!(">>> {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
