//! TickerScan CLI: scan a symbol list and publish indicator snapshots.
//!
//! Commands:
//! - `scan`: resolve symbols, analyze each one, write the results table
//! - `analyze`: analyze the given symbols and print them, no sink
//! - `symbols`: show which symbol source answers and what it returns
//! - `config init`: write the default configuration as TOML

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tickerscan_core::data::YahooProvider;
use tickerscan_core::symbols::{StaticSymbols, SymbolChain};
use tickerscan_runner::sink::console::render_table;
use tickerscan_runner::{
    build_symbol_chain, run_scan, ConsoleSink, CsvSink, PublishOutcome, ResultSink, ScanConfig,
    ScanReport, Scanner, SheetSink, SilentProgress, SinkError, StdoutProgress, ThreadSleeper,
    DEFAULT_CONFIG_FILE,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickerscan",
    about = "TickerScan CLI: SMA/RSI stock scanner with Google Sheets output"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    Sheets,
    Csv,
    Console,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve symbols, analyze each, and publish the results table.
    Scan {
        /// Path to a TOML config file. Defaults to ./tickerscan.toml if present.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write results.
        #[arg(long, value_enum, default_value_t = SinkKind::Sheets)]
        sink: SinkKind,

        /// Output file for `--sink csv`.
        #[arg(long, default_value = "tickerscan-results.csv")]
        csv_path: PathBuf,

        /// Comma-separated symbols; skips the symbol sources entirely.
        #[arg(long, value_delimiter = ',')]
        symbols: Option<Vec<String>>,
    },
    /// Analyze symbols and print the snapshots. Needs no credentials.
    Analyze {
        /// Symbols to analyze (e.g., AAPL MSFT BRK.B).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Print snapshots as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Resolve and print the symbol list.
    Symbols {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Configuration file commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration.
    Init {
        /// Destination file.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            config,
            sink,
            csv_path,
            symbols,
        } => run_scan_cmd(config.as_deref(), sink, csv_path, symbols),
        Commands::Analyze {
            symbols,
            json,
            config,
        } => run_analyze(config.as_deref(), &symbols, json),
        Commands::Symbols { config } => run_symbols(config.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => run_config_init(&path, force),
        },
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run_scan_cmd(
    config_path: Option<&Path>,
    sink: SinkKind,
    csv_path: PathBuf,
    symbols: Option<Vec<String>>,
) -> Result<()> {
    let config = ScanConfig::resolve(config_path)?;
    let provider = YahooProvider::new(config.provider.yahoo.clone())?;

    let chain = match symbols {
        Some(list) => SymbolChain::new().with(StaticSymbols::new(list)),
        None => build_symbol_chain(&config),
    };

    println!("{}", "=".repeat(60));
    println!("Stock Analysis Scan");
    println!("{}", "=".repeat(60));

    let sleeper = ThreadSleeper;
    let progress = StdoutProgress;
    let scanner = Scanner::new(&config, &provider, &sleeper, &progress);

    let sheets = config.sheets.clone();
    let open_sink = move || -> Result<Box<dyn ResultSink>, SinkError> {
        debug!(?sink, "opening sink");
        let opened: Box<dyn ResultSink> = match sink {
            SinkKind::Sheets => Box::new(SheetSink::open(&sheets)?),
            SinkKind::Csv => Box::new(CsvSink::new(csv_path)),
            SinkKind::Console => Box::new(ConsoleSink::stdout()),
        };
        Ok(opened)
    };

    let mut stdout = io::stdout();
    let report = run_scan(&config, &chain, &scanner, open_sink, &mut stdout);
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &ScanReport) {
    if let Some(source) = &report.source {
        info!(%source, symbols = report.snapshots.len(), "scan summary");
    }
    match &report.outcome {
        PublishOutcome::Published(receipt) => {
            println!("\nWrote {} rows to {}", receipt.rows, receipt.destination);
        }
        PublishOutcome::ConsoleFallback { .. } | PublishOutcome::WriteFailed { .. } => {
            println!("\nResults were printed above instead of being saved.");
        }
        PublishOutcome::NothingToScan => return,
    }

    let buys = report.buy_candidates();
    let sells = report.sell_candidates();
    if !buys.is_empty() {
        println!("Buy candidates:  {}", buys.join(", "));
    }
    if !sells.is_empty() {
        println!("Sell candidates: {}", sells.join(", "));
    }
    println!("{}", "=".repeat(60));
}

fn run_analyze(config_path: Option<&Path>, symbols: &[String], json: bool) -> Result<()> {
    let config = ScanConfig::resolve(config_path)?;
    let provider = YahooProvider::new(config.provider.yahoo.clone())?;
    let symbols: Vec<String> = symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        bail!("no symbols given");
    }

    let sleeper = ThreadSleeper;
    let snapshots = if json {
        Scanner::new(&config, &provider, &sleeper, &SilentProgress).analyze_all(&symbols)
    } else {
        Scanner::new(&config, &provider, &sleeper, &StdoutProgress).analyze_all(&symbols)
    };

    if json {
        let text = serde_json::to_string_pretty(&snapshots)
            .context("failed to serialize snapshots to JSON")?;
        println!("{text}");
    } else {
        let now = chrono::Local::now().naive_local();
        println!("\n{}", render_table(&snapshots, now));
    }
    Ok(())
}

fn run_symbols(config_path: Option<&Path>) -> Result<()> {
    let config = ScanConfig::resolve(config_path)?;
    let Some(resolved) = build_symbol_chain(&config).resolve() else {
        bail!("no symbol source produced any symbols");
    };
    println!(
        "Source: {} ({} symbols)",
        resolved.source,
        resolved.symbols.len()
    );
    for symbol in &resolved.symbols {
        println!("{symbol}");
    }
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let text = ScanConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
