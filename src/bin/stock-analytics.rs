//! stock-analytics CLI - Command-line interface for the analysis engine
//!
//! Reads daily histories from a directory of CSV exports and prints the
//! analysis for one symbol, its trend forecast, or a sector comparison.
//!
//! ## Example Usage
//!
//! ```bash
//! # Full analysis of one symbol
//! stock-analytics analyze RELIANCE.NS
//!
//! # Save the report as JSON
//! stock-analytics analyze RELIANCE.NS --output reliance.json
//!
//! # 30-day trend forecast
//! stock-analytics forecast INFY.NS --days 30
//!
//! # Sector comparison (symbols default to the configured list)
//! stock-analytics sector TCS.NS INFY.NS WIPRO.NS
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rusty_stock_analytics::analysis::{calculate_sector_performance, AnalysisFrame, SectorMatrix, Trend};
use rusty_stock_analytics::config::AnalysisConfig;
use rusty_stock_analytics::data::{
    fetch_or_empty, CsvDirectoryProvider, Fundamentals, MarketDataProvider,
};
use rusty_stock_analytics::report::{format_compact, AnalysisReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// stock-analytics: Technical and seasonal analysis of daily price histories
#[derive(Parser)]
#[command(name = "stock-analytics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Technical and seasonal analysis of daily price histories", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding <SYMBOL>.csv files (overrides the config)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every analysis stage for one symbol
    Analyze {
        /// Ticker symbol, e.g. RELIANCE.NS
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Extrapolate the price trend one step ahead
    Forecast {
        /// Ticker symbol
        #[arg(value_name = "SYMBOL")]
        symbol: String,

        /// Trailing rows used to fit the trend (default from config)
        #[arg(short = 'n', long)]
        days: Option<usize>,
    },

    /// Compare cumulative returns across symbols
    Sector {
        /// Symbols to compare (default from config)
        #[arg(value_name = "SYMBOLS")]
        symbols: Vec<String>,
    },

    /// Show version and effective configuration
    Info,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_sector")]
    sector: Vec<String>,
    #[serde(default)]
    analysis: AnalysisConfig,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-stock-analytics")
        .join("data")
}

fn default_sector() -> Vec<String> {
    ["TCS.NS", "INFY.NS", "WIPRO.NS", "TECHM.NS", "LTIM.NS"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sector: default_sector(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => dirs::home_dir().map(|home| home.join(".rusty-stock-analytics").join("config.toml")),
        };

        let Some(config_path) = config_path else {
            return Config::default();
        };
        if !config_path.exists() {
            if path.is_some() {
                eprintln!(
                    "{} Config file {} not found, using defaults",
                    "Warning:".yellow(),
                    config_path.display()
                );
            }
            return Config::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                    Config::default()
                }
            },
            Err(e) => {
                eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
                Config::default()
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = Config::load(cli.config.as_deref());
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Err(e) = config.analysis.validate() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "stock-analytics".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Data dir: {}",
            config.data_dir.display().to_string().dimmed()
        );
    }

    let provider = CsvDirectoryProvider::new(&config.data_dir);

    let result = match cli.command {
        Commands::Analyze {
            symbol,
            json,
            output,
        } => analyze(&provider, &config, &symbol, json, output.as_deref()),
        Commands::Forecast { symbol, days } => {
            forecast(&provider, &config, &symbol, days.unwrap_or(config.analysis.forecast_days))
        }
        Commands::Sector { symbols } => {
            let symbols = if symbols.is_empty() {
                config.sector.clone()
            } else {
                symbols
            };
            sector(&provider, &symbols)
        }
        Commands::Info => show_info(&config),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn analyze(
    provider: &dyn MarketDataProvider,
    config: &Config,
    symbol: &str,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let history = fetch_or_empty(provider, symbol);
    if history.is_empty() {
        print_no_data(symbol);
        return Ok(());
    }

    let fundamentals = provider.fundamentals(symbol).unwrap_or_else(|e| {
        log::warn!("Failed to load fundamentals for {}: {}", symbol, e);
        Fundamentals::default()
    });
    let report = AnalysisReport::build(symbol, &history, &config.analysis)?
        .with_fundamentals(fundamentals);

    if let Some(path) = output {
        let contents = serde_json::to_string_pretty(&report)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!(
            "{} Report saved to {}",
            "✓".green().bold(),
            path.display()
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn forecast(
    provider: &dyn MarketDataProvider,
    config: &Config,
    symbol: &str,
    days: usize,
) -> Result<()> {
    if days < 2 {
        anyhow::bail!("Forecast needs at least 2 days, got {}", days);
    }

    let history = fetch_or_empty(provider, symbol);
    if history.is_empty() {
        print_no_data(symbol);
        return Ok(());
    }

    let frame = AnalysisFrame::build(history, &config.analysis);
    let complete = frame.complete_rows().len();
    let Some(result) = frame.forecast(days) else {
        println!(
            "{} Not enough history to forecast {}: {} complete rows, {} required",
            "Warning:".yellow(),
            symbol,
            complete,
            days
        );
        return Ok(());
    };

    println!("{}", format!("Price Prediction: {}", symbol).bold());
    println!("{}", "================".dimmed());
    println!("  {} {:.2}", "Current price:".bold(), result.current_price);
    println!("  {} {:.2}", "Predicted price:".bold(), result.predicted_price);
    let change = format!("{:+.2}%", result.expected_change_percent());
    match result.trend() {
        Trend::Up => println!("  {} {} {}", "Expected change:".bold(), change.green(), "▲".green()),
        Trend::Down => println!("  {} {} {}", "Expected change:".bold(), change.red(), "▼".red()),
    }
    println!("  {} {:.3}", "Fit score (R²):".bold(), result.fit_score);
    println!("  {} {} of {}", "Training rows:".bold(), days, complete);
    Ok(())
}

fn sector(provider: &dyn MarketDataProvider, symbols: &[String]) -> Result<()> {
    if symbols.is_empty() {
        anyhow::bail!("No sector symbols given and none configured");
    }

    let pb = ProgressBar::new(symbols.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓▒░ "),
    );

    let mut histories = BTreeMap::new();
    for symbol in symbols {
        pb.set_message(symbol.clone());
        let loaded = provider.sector_histories(std::slice::from_ref(symbol));
        if loaded.is_empty() {
            pb.println(format!("{} No data found for {}", "Warning:".yellow(), symbol));
        }
        histories.extend(loaded);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let matrix = SectorMatrix::from_histories(&histories);
    if matrix.is_empty() {
        println!("{} No data available for any sector symbol", "Warning:".yellow());
        return Ok(());
    }

    let performance = calculate_sector_performance(&matrix);
    let (first, last) = match (performance.index().first(), performance.index().last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(()),
    };

    println!("{}", "Sector Performance".bold());
    println!("{}", "==================".dimmed());
    println!(
        "  {} {} to {} ({} dates)",
        "Period:".bold(),
        first,
        last,
        performance.index().len()
    );
    println!();

    let mut ranked: Vec<(&str, Option<f64>)> = performance.latest().into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&a.1.unwrap_or(f64::NEG_INFINITY))
    });
    for (symbol, value) in ranked {
        let cell = match value {
            Some(v) if v >= 0.0 => format!("{:+.2}%", v * 100.0).green(),
            Some(v) => format!("{:+.2}%", v * 100.0).red(),
            None => "n/a".dimmed(),
        };
        println!("  {:<12} {}", symbol.bold(), cell);
    }
    println!();
    Ok(())
}

fn print_no_data(symbol: &str) {
    println!(
        "{} No data found for {}. Check the symbol and data directory.",
        "Warning:".yellow(),
        symbol
    );
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.3}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

fn print_report(report: &AnalysisReport) {
    println!("{}", format!("Stock Analysis: {}", report.symbol).cyan().bold());
    if let (Some(start), Some(end)) = (report.start_date, report.end_date) {
        println!("{} to {}, {} trading days", start, end, report.rows);
    }
    println!();

    let f = &report.fundamentals;
    if !f.is_empty() {
        println!("{}", "Market Data".bold());
        println!("{}", "===========".dimmed());
        if let Some(price) = f.current_price {
            print!("  {} {} {:.2}", "Current price:".bold(), f.currency, price);
            match f.day_change() {
                Some((abs, pct)) if abs >= 0.0 => {
                    println!(" {}", format!("{:+.2} ({:+.2}%)", abs, pct).green())
                }
                Some((abs, pct)) => println!(" {}", format!("{:+.2} ({:+.2}%)", abs, pct).red()),
                None => println!(),
            }
        }
        if let Some(cap) = f.market_cap {
            println!("  {} {}", "Market cap:".bold(), format_compact(cap));
        }
        println!("  {} {}", "P/E ratio:".bold(), fmt_opt(f.trailing_pe, 2));
        println!("  {} {}", "Price/Book:".bold(), fmt_opt(f.price_to_book, 2));
        if let Some(dy) = f.dividend_yield {
            println!("  {} {:.2}%", "Dividend yield:".bold(), dy * 100.0);
        }
        if let Some(volume) = f.volume {
            println!("  {} {}", "Volume:".bold(), format_compact(volume as f64));
        }
        println!();
    }

    let s = &report.snapshot;
    println!("{}", "Technical Indicators".bold());
    println!("{}", "====================".dimmed());
    println!("  {} {}", "Adjusted close:".bold(), fmt_opt(s.price, 2));
    for (window, value) in &s.sma {
        println!("  {} {}", format!("SMA {}:", window).bold(), fmt_opt(*value, 2));
    }
    let rsi = fmt_opt(s.rsi, 2);
    let rsi = match s.rsi {
        Some(v) if v >= 70.0 => format!("{} (overbought)", rsi).red(),
        Some(v) if v <= 30.0 => format!("{} (oversold)", rsi).green(),
        _ => rsi.normal(),
    };
    println!("  {} {}", "RSI:".bold(), rsi);
    println!(
        "  {} {} / {} / {}",
        "MACD / signal / hist:".bold(),
        fmt_opt(s.macd, 3),
        fmt_opt(s.signal, 3),
        fmt_opt(s.histogram, 3)
    );
    for (window, value) in &s.volatility {
        println!(
            "  {} {}",
            format!("{}-day volatility:", window).bold(),
            fmt_pct(*value)
        );
    }
    println!();

    let seasonal = &report.seasonal;
    println!("{}", "Seasonal Returns".bold());
    println!("{}", "================".dimmed());
    for (month, mean) in &seasonal.monthly {
        let name = MONTHS.get(*month as usize - 1).copied().unwrap_or("?");
        println!("  {:<10} {}", name, fmt_pct(*mean));
    }
    println!();
    for (day, mean) in seasonal.weekdays() {
        println!("  {:<10} {}", day.name(), fmt_pct(mean));
    }
    println!();
    for (year, mean) in &seasonal.yearly {
        println!("  {:<10} {}", year, fmt_pct(*mean));
    }
    println!();

    println!("{}", "Average Volume by Month".bold());
    println!("{}", "=======================".dimmed());
    for (month, volume) in &report.volume.monthly_average_volume {
        let name = MONTHS.get(*month as usize - 1).copied().unwrap_or("?");
        println!("  {:<10} {}", name, format_compact(*volume));
    }
    println!();

    println!("{}", "Forecast".bold());
    println!("{}", "========".dimmed());
    match &report.forecast {
        Some(result) => {
            let change = format!("{:+.2}%", result.expected_change_percent());
            let change = match result.trend() {
                Trend::Up => change.green(),
                Trend::Down => change.red(),
            };
            println!(
                "  {} {:.2} ({}), R² {:.3}",
                "Next close:".bold(),
                result.predicted_price,
                change,
                result.fit_score
            );
        }
        None => println!("  {}", "Not enough history to forecast".dimmed()),
    }
    println!();
}

fn show_info(config: &Config) -> Result<()> {
    println!(
        "{} {}",
        "stock-analytics".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "System Information".bold());
    println!("{}", "==================".dimmed());
    println!("  {} {}", "Platform:".bold(), std::env::consts::OS);
    println!("  {} {}", "Architecture:".bold(), std::env::consts::ARCH);
    println!("  {} {}", "Worker threads:".bold(), rayon::current_num_threads());
    println!();

    let a = &config.analysis;
    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    println!("  {} {}", "Data directory:".bold(), config.data_dir.display());
    println!("  {} {}", "Sector symbols:".bold(), config.sector.join(", "));
    println!("  {} {:?}", "Volatility windows:".bold(), a.volatility_windows);
    println!("  {} {:?}", "SMA windows:".bold(), a.sma_windows);
    println!("  {} {}", "RSI period:".bold(), a.rsi_period);
    println!(
        "  {} {}/{}/{}",
        "MACD spans:".bold(),
        a.macd_fast,
        a.macd_slow,
        a.macd_signal
    );
    println!("  {} {}", "Volume MA window:".bold(), a.volume_ma_window);
    println!("  {} {}", "Forecast days:".bold(), a.forecast_days);
    println!();

    println!("  {} Apache-2.0", "License:".bold());
    println!();
    Ok(())
}
