//! Scan orchestration: resolve symbols, analyze them one by one, publish.
//!
//! The loop is sequential on purpose; the price provider throttles bursts, and
//! the `Pacer` keeps a fixed gap between requests with longer cooldowns after
//! failures.

use std::io::{self, Write};
use std::time::Duration;

use chrono::NaiveDateTime;
use tickerscan_core::data::PriceProvider;
use tickerscan_core::symbols::SymbolChain;
use tickerscan_core::{Analyzer, IndicatorSnapshot, INSUFFICIENT_DATA};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::pacing::{Pacer, Pause, Sleeper};
use crate::sink::console::render_table;
use crate::sink::{PublishReceipt, ResultSink, SinkError};

/// Progress callbacks for a scan.
pub trait ScanProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, snapshot: &IndicatorSnapshot, index: usize, total: usize);

    /// A cooldown is about to start after a failed symbol.
    fn on_cooldown(&self, symbol: &str, pause: Pause, duration: Duration);

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Prints one line per symbol to stdout.
pub struct StdoutProgress;

impl ScanProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        print!("[{}/{}] Analyzing {symbol}... ", index + 1, total);
        if let Err(e) = io::stdout().flush() {
            debug!(error = %e, "could not flush progress line");
        }
    }

    fn on_complete(&self, snapshot: &IndicatorSnapshot, _index: usize, _total: usize) {
        match (&snapshot.error, snapshot.rsi) {
            (Some(e), _) => println!("Error: {}", e.chars().take(50).collect::<String>()),
            (None, Some(rsi)) => println!("RSI: {rsi:.2} {}", snapshot.signal_label()),
            (None, None) => println!("Success"),
        }
    }

    fn on_cooldown(&self, _symbol: &str, pause: Pause, duration: Duration) {
        if pause == Pause::AfterRateLimit {
            println!("  Rate limited. Waiting {}s...", duration.as_secs());
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nAnalysis complete: {succeeded}/{total} succeeded, {failed} with errors");
    }
}

/// Ignores all progress events.
pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn on_start(&self, _: &str, _: usize, _: usize) {}
    fn on_complete(&self, _: &IndicatorSnapshot, _: usize, _: usize) {}
    fn on_cooldown(&self, _: &str, _: Pause, _: Duration) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize) {}
}

/// Fetches and analyzes symbols sequentially.
pub struct Scanner<'a> {
    analyzer: Analyzer,
    provider: &'a dyn PriceProvider,
    pacer: Pacer<'a>,
    progress: &'a dyn ScanProgress,
    lookback_days: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(
        config: &ScanConfig,
        provider: &'a dyn PriceProvider,
        sleeper: &'a dyn Sleeper,
        progress: &'a dyn ScanProgress,
    ) -> Self {
        Self {
            analyzer: Analyzer::new(config.analysis.clone()),
            provider,
            pacer: Pacer::new(config.pacing.clone(), sleeper),
            progress,
            lookback_days: config.provider.lookback_days,
        }
    }

    /// Fetch and analyze one symbol. The pause, if any, is the cooldown the
    /// caller should apply before moving on.
    pub fn analyze_symbol(&self, symbol: &str) -> (IndicatorSnapshot, Option<Pause>) {
        match self.provider.fetch_daily_closes(symbol, self.lookback_days) {
            Ok(series) => {
                let snapshot = self.analyzer.analyze(symbol, &series);
                let pause = snapshot.is_error().then_some(Pause::AfterError);
                (snapshot, pause)
            }
            Err(e) if e.is_insufficient() => {
                debug!(%symbol, error = %e, "not enough history");
                (
                    IndicatorSnapshot::failed(symbol, INSUFFICIENT_DATA),
                    Some(Pause::AfterError),
                )
            }
            Err(e) => {
                let pause = if e.is_rate_limited() {
                    Pause::AfterRateLimit
                } else {
                    Pause::AfterError
                };
                warn!(%symbol, error = %e, "fetch failed");
                (IndicatorSnapshot::failed(symbol, e.to_string()), Some(pause))
            }
        }
    }

    /// One snapshot per input symbol, in input order.
    pub fn analyze_all(&self, symbols: &[String]) -> Vec<IndicatorSnapshot> {
        let total = symbols.len();
        let mut snapshots = Vec::with_capacity(total);
        let mut failed = 0;

        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 {
                self.pacer.pause(Pause::BetweenRequests);
            }
            self.progress.on_start(symbol, i, total);

            let (snapshot, cooldown) = self.analyze_symbol(symbol);
            self.progress.on_complete(&snapshot, i, total);
            if snapshot.is_error() {
                failed += 1;
            }
            if let Some(pause) = cooldown {
                self.progress
                    .on_cooldown(symbol, pause, self.pacer.duration(pause));
                self.pacer.pause(pause);
            }
            snapshots.push(snapshot);
        }

        self.progress.on_batch_complete(total - failed, failed, total);
        info!(total, failed, "analysis finished");
        snapshots
    }
}

/// What happened to the computed table.
#[derive(Debug)]
pub enum PublishOutcome {
    Published(PublishReceipt),
    /// The sink could not be opened; the table went to the console.
    ConsoleFallback { reason: String },
    /// The write failed; the table went to the console.
    WriteFailed {
        error: String,
        location: Option<String>,
    },
    /// No symbol source produced anything.
    NothingToScan,
}

#[derive(Debug)]
pub struct ScanReport {
    /// Name of the symbol source that was used.
    pub source: Option<String>,
    pub snapshots: Vec<IndicatorSnapshot>,
    pub outcome: PublishOutcome,
}

impl ScanReport {
    pub fn succeeded(&self) -> usize {
        self.snapshots.iter().filter(|s| !s.is_error()).count()
    }

    pub fn buy_candidates(&self) -> Vec<&str> {
        self.snapshots
            .iter()
            .filter(|s| s.buy_signal == Some(true))
            .map(|s| s.symbol.as_str())
            .collect()
    }

    pub fn sell_candidates(&self) -> Vec<&str> {
        self.snapshots
            .iter()
            .filter(|s| s.sell_signal == Some(true))
            .map(|s| s.symbol.as_str())
            .collect()
    }
}

/// Steps for finding the results when no URL is known.
pub fn manual_lookup_guidance(sheet_name: &str) -> String {
    format!(
        "To find your sheet manually:\n   \
         1. Go to https://drive.google.com\n   \
         2. Search for: '{sheet_name}'\n   \
         3. Or look in 'Shared with me' or 'My Drive'\n"
    )
}

/// Full pass: resolve symbols, analyze, then publish through the sink.
///
/// The sink is opened only after analysis. Sink failures never lose the
/// computed rows; they are written to `out` instead.
pub fn run_scan<F>(
    config: &ScanConfig,
    chain: &SymbolChain,
    scanner: &Scanner<'_>,
    open_sink: F,
    out: &mut dyn Write,
) -> ScanReport
where
    F: FnOnce() -> Result<Box<dyn ResultSink>, SinkError>,
{
    let Some(resolved) = chain.resolve() else {
        write_fallback(out, "No stocks to analyze.\n");
        return ScanReport {
            source: None,
            snapshots: Vec::new(),
            outcome: PublishOutcome::NothingToScan,
        };
    };
    info!(source = %resolved.source, count = resolved.symbols.len(), "scanning");

    let snapshots = scanner.analyze_all(&resolved.symbols);
    let updated_at = chrono::Local::now().naive_local();
    let outcome = publish(config, snapshots.as_slice(), updated_at, open_sink, out);

    ScanReport {
        source: Some(resolved.source),
        snapshots,
        outcome,
    }
}

fn publish<F>(
    config: &ScanConfig,
    snapshots: &[IndicatorSnapshot],
    updated_at: NaiveDateTime,
    open_sink: F,
    out: &mut dyn Write,
) -> PublishOutcome
where
    F: FnOnce() -> Result<Box<dyn ResultSink>, SinkError>,
{
    let result = open_sink().and_then(|mut sink| {
        debug!(sink = %sink.describe(), "publishing");
        sink.publish(snapshots, updated_at)
    });

    match result {
        Ok(receipt) => {
            info!(destination = %receipt.destination, rows = receipt.rows, "published");
            PublishOutcome::Published(receipt)
        }
        Err(SinkError::Configuration(reason)) => {
            warn!(%reason, "sink unavailable, printing results instead");
            write_fallback(out, &format!("Results not saved: {reason}\n\n"));
            write_fallback(out, &render_table(snapshots, updated_at));
            PublishOutcome::ConsoleFallback { reason }
        }
        Err(SinkError::Write { message, location }) => {
            warn!(error = %message, "publish failed");
            let guidance = match &location {
                Some(loc) => format!(
                    "The destination was opened but the write failed. \
                     Try accessing it at:\n   {loc}\n"
                ),
                None => manual_lookup_guidance(&config.sheets.sheet_name),
            };
            write_fallback(out, &format!("Error writing results: {message}\n\n{guidance}\n"));
            write_fallback(out, &render_table(snapshots, updated_at));
            PublishOutcome::WriteFailed {
                error: message,
                location,
            }
        }
    }
}

fn write_fallback(out: &mut dyn Write, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        warn!(error = %e, "could not write fallback output");
    }
}
