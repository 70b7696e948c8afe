//! # Batch Pricing CLI
//!
//! Prices a JSON file of orders and prints the batch report.
//!
//! ## Usage
//! ```bash
//! # Price a file with config from the default location
//! cargo run -p checkout-batch --bin price-batch -- --input orders.json
//!
//! # Explicit config, promo code and month, on the blocking pool
//! cargo run -p checkout-batch --bin price-batch -- \
//!     --input orders.json --config batch.toml --promo SAVE10 --month 12 --parallel
//!
//! # Write the effective config (file + env + flags) without pricing anything
//! cargo run -p checkout-batch --bin price-batch -- --promo SAVE10 --write-config batch.toml
//! ```
//!
//! The report goes to stdout as JSON; logs go to stderr
//! (`RUST_LOG` overrides the default filter).

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use checkout_batch::{load_orders, BatchAggregator, BatchConfig};
use chrono::{Datelike, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq)]
struct CliArgs {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    promo: Option<String>,
    month: Option<u32>,
    parallel: bool,
    write_config: Option<PathBuf>,
}

const USAGE: &str = "\
Checkout Batch Pricing

Usage: price-batch --input <PATH> [OPTIONS]
       price-batch --write-config <PATH> [OPTIONS]

Options:
  -i, --input <PATH>         JSON file with an array of orders
  -c, --config <PATH>        Config file (default: platform config dir/batch.toml)
      --promo <CODE>         Promotional code applied to every order
      --month <N>            Calendar month 1-12 (default: current month)
      --parallel             Price orders on the blocking pool
      --write-config <PATH>  Save the effective config as TOML and exit
  -h, --help                 Show this help message";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = parse_args(env::args().skip(1).collect())? else {
        println!("{}", USAGE);
        return Ok(());
    };

    init_tracing();

    let mut config = BatchConfig::load(args.config.clone()).context("loading batch config")?;
    if let Some(code) = args.promo {
        config.pricing.promotional_code = Some(code);
    }
    if args.month.is_some() {
        config.pricing.current_month = args.month;
    }
    if args.parallel {
        config.run.parallel = true;
    }
    config.validate().context("validating batch config")?;

    if let Some(path) = args.write_config {
        config
            .save(Some(path.clone()))
            .with_context(|| format!("writing config to {}", path.display()))?;
        return Ok(());
    }

    // The clock month is only a default for this run; it is never persisted.
    if config.pricing.current_month.is_none() {
        config.pricing.current_month = Some(Utc::now().month());
    }

    let Some(input) = args.input else {
        bail!("--input is required\n\n{}", USAGE);
    };
    let orders = load_orders(&input)
        .with_context(|| format!("reading orders from {}", input.display()))?;
    info!(path = %input.display(), orders = orders.len(), "Loaded orders");

    let aggregator = BatchAggregator::from_config(&config);
    let report = aggregator.run_with(orders, config.run.parallel).await?;

    println!("{}", report.to_json_pretty()?);
    Ok(())
}

/// Parses flags; `Ok(None)` means help was requested.
fn parse_args(args: Vec<String>) -> anyhow::Result<Option<CliArgs>> {
    let mut input = None;
    let mut config = None;
    let mut promo = None;
    let mut month = None;
    let mut parallel = false;
    let mut write_config = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" | "-i" => input = Some(PathBuf::from(value_for(&arg, iter.next())?)),
            "--config" | "-c" => config = Some(PathBuf::from(value_for(&arg, iter.next())?)),
            "--promo" => promo = Some(value_for(&arg, iter.next())?),
            "--month" => {
                let raw = value_for(&arg, iter.next())?;
                let parsed: u32 = raw
                    .parse()
                    .with_context(|| format!("--month expects a number, got '{}'", raw))?;
                month = Some(parsed);
            }
            "--parallel" => parallel = true,
            "--write-config" => {
                write_config = Some(PathBuf::from(value_for(&arg, iter.next())?));
            }
            "--help" | "-h" => return Ok(None),
            other => bail!("unknown argument '{}'\n\n{}", other, USAGE),
        }
    }

    if input.is_none() && write_config.is_none() {
        bail!("--input is required\n\n{}", USAGE);
    }

    Ok(Some(CliArgs {
        input,
        config,
        promo,
        month,
        parallel,
        write_config,
    }))
}

fn value_for(flag: &str, value: Option<String>) -> anyhow::Result<String> {
    value.with_context(|| format!("{} expects a value", flag))
}

/// Logs to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,checkout_core=debug,checkout_batch=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_and_flags() {
        let parsed = parse_args(args(&["-i", "orders.json", "--promo", "SAVE10", "--parallel"]))
            .unwrap()
            .unwrap();

        assert_eq!(parsed.input, Some(PathBuf::from("orders.json")));
        assert_eq!(parsed.promo.as_deref(), Some("SAVE10"));
        assert!(parsed.parallel);
        assert_eq!(parsed.write_config, None);
    }

    #[test]
    fn test_write_config_does_not_need_input() {
        let parsed = parse_args(args(&["--write-config", "batch.toml", "--month", "12"]))
            .unwrap()
            .unwrap();

        assert_eq!(parsed.input, None);
        assert_eq!(parsed.write_config, Some(PathBuf::from("batch.toml")));
        assert_eq!(parsed.month, Some(12));
    }

    #[test]
    fn test_input_required_without_write_config() {
        let err = parse_args(args(&["--promo", "SAVE10"])).unwrap_err();
        assert!(err.to_string().contains("--input is required"));
    }

    #[test]
    fn test_write_config_expects_a_path() {
        assert!(parse_args(args(&["--write-config"])).is_err());
    }

    #[test]
    fn test_help() {
        assert_eq!(parse_args(args(&["--help"])).unwrap(), None);
    }
}
