//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_metadata_adapter::CsvMetadataAdapter;
use crate::adapters::csv_signal_store::CsvSignalStore;
use crate::adapters::file_cache::FileCache;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_cache::{CachingDataPort, MemoryCache};
use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::report::{build_report, simulate_signals, Report};
use crate::domain::screener::{screen_universe, ScreenResult};
use crate::domain::settings::Settings;
use crate::ports::cache_port::{BarCache, StalenessPolicy};
use crate::ports::data_port::DataPort;
use crate::ports::metadata_port::MetadataPort;
use crate::ports::signal_store::SignalStore;

#[derive(Parser, Debug)]
#[command(name = "candlescreen", about = "Candlestick pullback screener and outcome reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the universe and write today's signals
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Run date (YYYY-MM-DD); bars after it are ignored
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Directory for the dated signal file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Simulate outcomes of every stored signal
    Report {
        #[arg(short, long)]
        config: PathBuf,
        /// Date used to name the report file
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Directory for the dated report file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Screen {
            config,
            date,
            output,
        } => run_screen(&config, date.unwrap_or_else(today), output),
        Command::Report {
            config,
            date,
            output,
        } => run_report(&config, date.unwrap_or_else(today), output),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_settings(path: &Path) -> Result<Settings, ScreenerError> {
    tracing::info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    Settings::from_config(&adapter)
}

fn data_port(settings: &Settings) -> CachingDataPort<CsvAdapter, Box<dyn BarCache>> {
    let mut csv = CsvAdapter::new(settings.data.dir.clone())
        .drop_flat_body(settings.data.drop_flat_body);
    if let Some(listing) = &settings.data.listing {
        csv = csv.with_listing(listing.clone(), settings.data.exchanges.clone());
    }
    let cache: Box<dyn BarCache> = match &settings.data.cache_dir {
        Some(dir) => Box::new(FileCache::new(dir.clone())),
        None => Box::new(MemoryCache::new()),
    };
    CachingDataPort::new(
        csv,
        cache,
        StalenessPolicy::hours(settings.data.cache_max_age_hours),
    )
}

fn signal_store(settings: &Settings) -> CsvSignalStore {
    CsvSignalStore::new(settings.report.screener_dir.clone(), settings.report.report_dir.clone())
}

fn run_screen(
    config_path: &Path,
    run_date: NaiveDate,
    output: Option<PathBuf>,
) -> Result<(), ScreenerError> {
    let mut settings = load_settings(config_path)?;
    if let Some(dir) = output {
        settings.report.screener_dir = dir;
    }

    let data = data_port(&settings);
    let metadata = match &settings.data.metadata {
        Some(path) => Some(CsvMetadataAdapter::from_path(path)?),
        None => None,
    };
    let store = signal_store(&settings);

    let result = run_screen_pipeline(
        &data,
        metadata.as_ref().map(|m| m as &dyn MetadataPort),
        &store,
        &settings,
        run_date,
    )?;
    print_signals(&result);
    Ok(())
}

/// Lists the universe, screens it and persists the signals.
pub fn run_screen_pipeline(
    data: &dyn DataPort,
    metadata: Option<&dyn MetadataPort>,
    store: &dyn SignalStore,
    settings: &Settings,
    run_date: NaiveDate,
) -> Result<ScreenResult, ScreenerError> {
    let symbols = data.list_symbols()?;
    if symbols.is_empty() {
        return Err(ScreenerError::Data {
            reason: "universe is empty".to_string(),
        });
    }
    tracing::info!(symbols = symbols.len(), %run_date, "screening universe");

    let result = screen_universe(data, metadata, &symbols, settings, run_date);
    let path = store.write_signals(run_date, &result.signals)?;
    tracing::info!(path = %path.display(), signals = result.signals.len(), "signals written");
    Ok(result)
}

fn print_signals(result: &ScreenResult) {
    if result.signals.is_empty() {
        println!("No signals.");
        return;
    }
    println!(
        "{:<8} {:<6} {:>10} {:>10} {:>10} {:>6} {:>6} {:>6}  {}",
        "symbol", "dir", "kk", "sl", "tp", "dist", "adx_d", "adx_w", "industry"
    );
    for s in &result.signals {
        let opt = |v: Option<f64>| v.map(|x| format!("{x}")).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<6} {:>10.2} {:>10.2} {:>10.2} {:>6} {:>6} {:>6}  {}",
            s.symbol,
            s.direction,
            s.trigger_price,
            s.stop_loss,
            s.take_profit,
            opt(s.metadata.distance_tp_atr),
            opt(s.metadata.adx_day),
            opt(s.metadata.adx_week),
            s.metadata.industry.as_deref().unwrap_or("")
        );
    }
}

fn run_report(
    config_path: &Path,
    date: NaiveDate,
    output: Option<PathBuf>,
) -> Result<(), ScreenerError> {
    let mut settings = load_settings(config_path)?;
    if let Some(dir) = output {
        settings.report.report_dir = dir;
    }

    let data = data_port(&settings);
    let store = signal_store(&settings);
    let report = run_report_pipeline(&data, &store, &settings, date)?;
    print_report(&report);
    Ok(())
}

/// Loads stored signals, simulates them and persists the report.
pub fn run_report_pipeline(
    data: &dyn DataPort,
    store: &dyn SignalStore,
    settings: &Settings,
    date: NaiveDate,
) -> Result<Report, ScreenerError> {
    let signals = store.load_signals()?;
    if signals.is_empty() {
        return Err(ScreenerError::Report {
            reason: format!("no signals under {}", settings.report.screener_dir.display()),
        });
    }

    let symbols: BTreeSet<&str> = signals.iter().map(|s| s.symbol.as_str()).collect();
    let earliest = signals
        .iter()
        .map(|s| s.signal_date)
        .min()
        .unwrap_or(settings.data.history_start);

    let mut bars_by_symbol: HashMap<String, Vec<OhlcvBar>> = HashMap::new();
    for symbol in symbols {
        match data.fetch_ohlcv(symbol, earliest) {
            Ok(bars) => {
                bars_by_symbol.insert(symbol.to_string(), bars);
            }
            Err(e) => tracing::warn!(symbol, error = %e, "no bars for signal symbol"),
        }
    }

    let report = build_report(simulate_signals(&signals, &bars_by_symbol, settings.report.horizon));
    let path = store.write_report(date, &report)?;
    tracing::info!(path = %path.display(), rows = report.rows.len(), "report written");
    Ok(report)
}

fn print_report(report: &Report) {
    let opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".to_string());
    println!(
        "{:<10} {:<8} {:<6} {:>9} {:>9} {:>6} {:>4} {:>6} {:>6}",
        "date", "symbol", "dir", "entry", "exit", "status", "bars", "r", "r_sum"
    );
    for row in &report.rows {
        let signal = &row.trade.signal;
        let status = match (&row.trade.status, &row.trade.anomaly) {
            (Some(status), _) => status.to_string(),
            (None, Some(_)) => "tie".to_string(),
            (None, None) => String::new(),
        };
        println!(
            "{:<10} {:<8} {:<6} {:>9} {:>9} {:>6} {:>4} {:>6} {:>6}",
            signal.signal_date,
            signal.symbol,
            signal.direction,
            opt(row.trade.entry),
            opt(row.trade.exit),
            status,
            row.trade.duration.map(|d| d.to_string()).unwrap_or_default(),
            opt(row.r),
            opt(row.r_sum),
        );
    }

    let s = &report.summary;
    println!("\n=== Summary ===");
    println!("Signals:      {}", s.signals);
    println!("Take profit:  {}", s.take_profit);
    println!("Stop loss:    {}", s.stop_loss);
    println!("Time exit:    {}", s.time_exit);
    println!("Provisional:  {}", s.provisional);
    println!("Untriggered:  {}", s.untriggered);
    println!("Gap-through:  {}", s.gap_through);
    println!("Ties:         {}", s.anomalies);
    if let Some(win_rate) = s.win_rate {
        println!("Win rate:     {:.1}%", win_rate);
    }
    println!("Total R:      {:.1}", s.total_r);
    if let Some(avg) = s.average_r {
        println!("Average R:    {:.2}", avg);
    }
}

fn run_validate(config_path: &Path) -> Result<(), ScreenerError> {
    let settings = load_settings(config_path)?;
    let f = &settings.features;
    let p = &settings.pattern;

    eprintln!("Data directory:   {}", settings.data.dir.display());
    eprintln!("History start:    {}", settings.data.history_start);
    eprintln!("Exchanges:        {}", settings.data.exchanges.join(", "));
    eprintln!(
        "Indicators:       SMA {}/{}, ATR {} ({}), ADX {} (weekly {}), momentum {}/{}, breakout {}/{}",
        f.sma_short,
        f.sma_long,
        f.atr_period,
        f.atr_smoothing,
        f.adx_period,
        f.weekly_adx_period,
        f.momentum_short,
        f.momentum_medium,
        f.breakout_short,
        f.breakout_long
    );
    eprintln!(
        "Eligibility:      {} bars, avg volume >= {} over {}, close >= {}",
        f.min_bars, f.min_avg_volume, f.volume_avg_period, f.min_close
    );
    eprintln!(
        "Pattern:          distance > {}, pullback < {}, weekly ADX > {}",
        p.breakout_distance_min, p.pullback_distance_max, p.weekly_adx_min
    );
    eprintln!(
        "Levels:           stop {} x ATR, target {} x ATR",
        p.stop_atr_mult, p.target_atr_mult
    );
    eprintln!("Horizon:          {} bars", settings.report.horizon);
    eprintln!("\nConfig validated successfully");
    Ok(())
}
