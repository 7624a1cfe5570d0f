use alertstore::alerts::{AlertStore, AlertValue, AlertsByTime};
use alertstore::config::Config;
use alertstore::error::ConfigError;
use alertstore::trends::{detailed_trend_for_date, trend_for_date, JsonTrendProvider};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use log::{error, info, warn, LevelFilter};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Command-line arguments for the alert store
#[derive(Parser)]
#[command(
    name = "alertstore",
    about = "Environmental alert store - define time-of-day alerts and track their read state",
    long_about = "Stores environmental monitoring alerts keyed by time of day in a JSON document. \
                  Saving merges with the document on disk, so alerts written by other tools \
                  under other hours are preserved."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Alert document to operate on, overriding the configuration
    #[arg(short, long, global = true, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        global = true,
        help = "Enable verbose logging output (debug level)"
    )]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Define the alert for a time of day, replacing any existing one
    Add {
        /// Trigger time, HH:MM
        hour: String,
        /// Monitored parameter (e.g. Temperature)
        parameter: String,
        /// Threshold value; numbers are stored as numbers
        value: String,
        /// Human-readable description
        message: String,
    },
    /// Print all alerts keyed by time
    List,
    /// Print alerts not yet read
    Unread,
    /// Mark the alert at a time of day as read
    MarkRead {
        /// Trigger time, HH:MM
        hour: String,
    },
    /// Strictly validate every stored alert
    Check,
    /// Print averaged readings for a date
    Trend {
        /// Date, YYYY-MM-DD
        date: String,
    },
    /// Print hourly readings for a date
    Detail {
        /// Date, YYYY-MM-DD
        date: String,
    },
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() && !config_path.is_file() {
                return Err(format!(
                    "Configuration path is not a file: {}",
                    config_path.display()
                ));
            }
        }

        if let Some(ref file) = self.file {
            if file.is_dir() {
                return Err(format!("Alert file is a directory: {}", file.display()));
            }
        }

        match &self.command {
            Command::Add { hour, .. } | Command::MarkRead { hour } => validate_hour(hour),
            Command::Trend { date } | Command::Detail { date } => validate_date(date),
            Command::List | Command::Unread | Command::Check => Ok(()),
        }
    }
}

/// Check that `hour` is a zero-padded `HH:MM` time of day
fn validate_hour(hour: &str) -> Result<(), String> {
    if hour.len() != 5 || NaiveTime::parse_from_str(hour, "%H:%M").is_err() {
        return Err(format!("Invalid hour '{}', expected HH:MM", hour));
    }
    Ok(())
}

/// Check that `date` is a `YYYY-MM-DD` calendar date
fn validate_date(date: &str) -> Result<(), String> {
    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(format!("Invalid date '{}', expected YYYY-MM-DD", date));
    }
    Ok(())
}

/// Load configuration from the given path, falling back to defaults
///
/// A missing, unreadable or invalid file is reported and replaced by the
/// default configuration.
fn load_config(config_path: Option<&Path>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::ReadError(_)) => {
                    warn!(
                        "Configuration file '{}' not found or unreadable, using defaults",
                        path.display()
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path.display(), e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => Config::default(),
    }
}

/// Log level forced by `--verbose`; otherwise `RUST_LOG` decides
fn verbosity_filter(verbose: bool) -> Option<LevelFilter> {
    verbose.then_some(LevelFilter::Debug)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn trend_provider(config: &Config) -> anyhow::Result<JsonTrendProvider> {
    match &config.trends.data_file {
        Some(path) => Ok(JsonTrendProvider::new(path)),
        None => bail!("No trend data file configured (set trends.data_file)"),
    }
}

fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let path = cli.file.unwrap_or_else(|| config.store.path.clone());
    let mut store = AlertStore::open(&path).with_indent(config.store.indent);

    match cli.command {
        Command::Add {
            hour,
            parameter,
            value,
            message,
        } => {
            store
                .add_alert_by_time(&hour, &parameter, AlertValue::parse(&value), &message)
                .with_context(|| format!("Failed to add alert at {}", hour))?;
        }
        Command::List => print_json(store.alerts_by_time())?,
        Command::Unread => {
            let unread: AlertsByTime = store
                .unread_alerts()
                .into_iter()
                .map(|(hour, record)| (hour.to_string(), record.clone()))
                .collect();
            print_json(&unread)?;
        }
        Command::MarkRead { hour } => {
            let found = store
                .mark_alert_read(&hour)
                .with_context(|| format!("Failed to mark alert at {} as read", hour))?;
            if !found {
                bail!("No alert defined at {}", hour);
            }
        }
        Command::Check => {
            let count = store.validate()?;
            println!("{}: {} alerts OK", store.location(), count);
        }
        Command::Trend { date } => {
            let provider = trend_provider(&config)?;
            print_json(&trend_for_date(&provider, &date)?)?;
        }
        Command::Detail { date } => {
            let provider = trend_provider(&config)?;
            print_json(&detailed_trend_for_date(&provider, &date)?)?;
        }
    }

    Ok(())
}

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let mut logger = env_logger::Builder::from_default_env();
    if let Some(level) = verbosity_filter(cli.verbose) {
        logger.filter_level(level);
    }
    logger.init();

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(2);
    }

    let config = load_config(cli.config.as_deref());

    if let Err(e) = run(cli, config) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
