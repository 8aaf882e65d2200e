mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::ReplayConfig;
use std::path::PathBuf;
use tilib_indicators::AnyIndicator;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tilib")]
#[command(about = "Replay price data through streaming technical indicators")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV of bars through the configured indicators
    Replay {
        /// Path to CSV data file
        #[arg(short, long)]
        data: PathBuf,

        /// TOML file with [[indicator]] entries
        #[arg(short, long)]
        config: PathBuf,

        /// Write every indicator's value history to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available indicators and their default parameters
    Indicators,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Replay {
            data,
            config,
            output,
        } => run_replay(data, config, output)?,
        Commands::Indicators => {
            println!("Available indicators (kind = ...):");
            println!("  sma        - Simple Moving Average          (period = 20)");
            println!("  ema        - Exponential Moving Average     (alpha = 0.2, or period)");
            println!("  rsi        - Relative Strength Index        (period = 14)");
            println!("  bollinger  - Bollinger Bands                (period = 20, num_std = 2)");
            println!("  cci        - Commodity Channel Index        (period = 20, factor = 0.015)");
            println!("  atr        - Average True Range             (period = 14)");
            println!("  stochastic - Stochastic Oscillator          (period = 14, smoothing_period = 3, oversold = 20, overbought = 80)");
            println!("  stoch_rsi  - Stochastic RSI                 (period = 15, rsi_period = 14, k_period = 14)");
            println!("  vwap       - Volume Weighted Average Price  (mvwap_period = 20)");
        }
    }

    Ok(())
}

fn run_replay(data_path: PathBuf, config_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let config = ReplayConfig::load(&config_path)?;

    let mut indicators: Vec<(String, AnyIndicator)> = config
        .indicators
        .iter()
        .enumerate()
        .map(|(i, entry)| Ok((entry.display_name(i), entry.config.build()?)))
        .collect::<Result<_>>()?;

    tracing::info!(
        data = %data_path.display(),
        indicators = indicators.len(),
        "Starting replay"
    );

    let bars = tilib_data::load_bars_from_csv(&data_path)?;
    tracing::info!(bars = bars.len(), "Loaded historical data");

    if bars.is_empty() {
        anyhow::bail!("No bars loaded from CSV file");
    }

    for bar in &bars {
        for (_, indicator) in indicators.iter_mut() {
            indicator.update(bar);
        }
    }

    let sep = "=".repeat(60);
    println!("\n{sep}");
    println!("  INDICATOR VALUES after {} bars", bars.len());
    println!("{sep}");
    for (name, indicator) in &indicators {
        let current = match indicator.current_json()? {
            Some(value) => value.to_string(),
            None => format!("not ready ({:?})", indicator.phase()),
        };
        println!("  {:<16} {:<11} {}", name, indicator.name(), current);
    }
    println!("{sep}\n");

    if let Some(path) = output {
        let mut histories = serde_json::Map::new();
        for (name, indicator) in &indicators {
            histories.insert(name.clone(), indicator.history_json()?);
        }
        let json = serde_json::to_string_pretty(&serde_json::Value::Object(histories))?;
        std::fs::write(&path, json)?;
        tracing::info!(file = %path.display(), "Wrote value histories");
    }

    Ok(())
}
