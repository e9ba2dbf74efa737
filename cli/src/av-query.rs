//! # av-query
//!
//! Command-line front end for the Alpha Vantage client. Sends one request for
//! a catalog function and prints the unpacked `data` and `meta_data` sections
//! as JSON.
//!
//! Settings come from defaults, an optional JSON config file, `.env` files,
//! the environment and finally the flags below.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, ValueHint};
use lib_alphavantage::configs::config_sys::{ConfigLayer, load_dotenv, load_layers};
use lib_alphavantage::loggers::tracing_setup::{LoggingOptions, init_logging};
use lib_alphavantage::markets::alphavantage::{
    AlphaVantage, CATALOG, Function, ParamSpec, QueryParams, build_query,
};
use serde_json::json;
use tracing::{debug, info, warn};

// load .env files before anything else
use static_init::dynamic;

#[dynamic]
static DOTENV_INIT: Result<Vec<PathBuf>, String> = load_dotenv().map_err(|e| e.to_string());

/// CLI arguments for av-query.
#[derive(Parser)]
#[clap(
    name = "av-query",
    version = "0.1.0",
    author = "ckir",
    about = "Queries the Alpha Vantage API for one time series or indicator.",
    long_about = "Builds a request for a catalog function, sends it once, and prints the \
                  response split into its data and meta_data sections. \
                  Use --list to see the supported functions and their parameters."
)]
pub struct Cli {
    /// Alpha Vantage API key.
    #[clap(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Provider function, e.g. TIME_SERIES_DAILY or MACDEXT (case-insensitive).
    #[clap(long, short = 'f', required_unless_present = "list")]
    pub function: Option<String>,

    /// Ticker symbol, e.g. IBM.
    #[clap(long, short = 's', required_unless_present = "list")]
    pub symbol: Option<String>,

    /// Function parameter as name=value; repeat for several.
    #[clap(long = "param", short = 'p', value_name = "NAME=VALUE", value_parser = parse_param, action = ArgAction::Append)]
    pub params: Vec<(String, String)>,

    /// Override the API endpoint.
    #[clap(long, value_hint = ValueHint::Url)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[clap(long)]
    pub timeout_secs: Option<u64>,

    /// Print the supported functions and exit.
    #[clap(long, action = ArgAction::SetTrue)]
    pub list: bool,

    /// Print the request URL with the key masked and exit without sending it.
    #[clap(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Write the JSON result to this file instead of stdout.
    #[clap(long, short = 'o', value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output minified JSON instead of pretty-printed.
    #[clap(long, action = ArgAction::SetTrue)]
    pub minify: bool,

    /// Also write JSON logs to the configured log directory.
    #[clap(long, action = ArgAction::SetTrue)]
    pub log_file: bool,
}

impl Cli {
    /// The settings given on the command line, as the topmost config layer.
    fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            ..ConfigLayer::default()
        }
    }

    fn query_params(&self) -> QueryParams {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("parameter name missing in {raw:?}"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn print_catalog() {
    for spec in CATALOG.iter() {
        let names = |params: &[ParamSpec]| {
            params.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
        };
        println!(
            "{:<22} {:<14} required: {:<40} optional: {}",
            spec.name(),
            spec.function.method_name(),
            names(spec.required),
            names(spec.optional)
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list {
        print_catalog();
        return Ok(());
    }

    let config = load_layers(|name| std::env::var(name).ok())?
        .merge(cli.config_layer())
        .resolve()?;

    let _guard = init_logging(&LoggingOptions {
        level: config.log_level.clone(),
        log_dir: cli.log_file.then(|| config.log_dir.clone()),
        file_prefix: "av-query".to_string(),
        ..LoggingOptions::default()
    })?;

    match &*DOTENV_INIT {
        Ok(paths) => {
            for path in paths {
                debug!(path = %path.display(), "loaded environment file");
            }
        }
        Err(e) => warn!("Failed to load environment files: {}", e),
    }

    let function: Function = cli
        .function
        .as_deref()
        .ok_or_else(|| anyhow!("--function is required"))?
        .parse()?;
    let symbol = cli.symbol.as_deref().ok_or_else(|| anyhow!("--symbol is required"))?;
    let params = cli.query_params();

    if cli.dry_run {
        let query = build_query(function.spec(), symbol, &params, config.api_key.as_deref().unwrap_or_default())?;
        println!("{}", query.to_redacted_url(&config.base_url));
        return Ok(());
    }

    let client = AlphaVantage::from_config(&config)?;
    info!(function = %function, symbol, "querying");
    let (data, meta_data) = client.query(function, symbol, &params)?;

    let result = json!({ "data": data, "meta_data": meta_data });
    let rendered = if cli.minify {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "result written");
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
