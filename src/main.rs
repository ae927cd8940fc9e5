//! Bioreactor Monitor - Main Entry Point
//!
//! Batch-then-stream pipeline:
//! `collect` (fault-free stream -> baseline.csv), `train` (baseline.csv ->
//! baseline_stats.json), `detect` (live stream -> decision log + confusion
//! matrix), and `replay` (recorded payloads -> same as detect, offline).

mod constants;
mod logic;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use logic::baseline::{self, BaselineStats, TrainerConfig};
use logic::collector::BaselineCollector;
use logic::config::Config;
use logic::dataset::{BaselineLogWriter, LogLayout};
use logic::detector::{AnomalyDetector, CsvDecisionLog, DetectionHandler, RunSummary};
use logic::stream::{self, topic_for, StopCondition};

#[derive(Parser)]
#[command(name = "bioreactor-monitor")]
#[command(author, version, about = "Bioreactor baseline training and anomaly detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// MQTT broker host (env: BIOREACTOR_BROKER_HOST)
    #[arg(long, global = true)]
    broker_host: Option<String>,

    /// MQTT broker port (env: BIOREACTOR_BROKER_PORT)
    #[arg(long, global = true)]
    broker_port: Option<u16>,

    /// Directory for baseline, stats and decision logs (env: BIOREACTOR_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record fault-free telemetry into the baseline log
    Collect {
        /// Baseline log path (default: <data-dir>/baseline.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stream to record (default: nofaults)
        #[arg(short, long)]
        stream: Option<String>,

        /// Stop after this many recorded samples
        #[arg(short = 'n', long)]
        max_samples: Option<u64>,

        /// Stop after this many seconds
        #[arg(short, long)]
        duration_secs: Option<u64>,
    },

    /// Compute baseline statistics from the baseline log
    Train {
        /// Baseline log path (default: <data-dir>/baseline.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Statistics output path (default: <data-dir>/baseline_stats.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tolerance multiplier k (tolerance = k * σ)
        #[arg(short = 'k', long)]
        multiplier: Option<f64>,

        /// Minimum tolerance for a signal, e.g. --min-tolerance temperature_C=0.5
        #[arg(long = "min-tolerance", value_name = "SIGNAL=VALUE", value_parser = baseline::parse_floor)]
        min_tolerance: Vec<(String, f64)>,
    },

    /// Classify a live stream against the baseline
    Detect {
        /// Stream name: nofaults, single_fault, three_faults, variable_setpoints
        #[arg(short, long)]
        stream: Option<String>,

        /// Baseline statistics path (default: <data-dir>/baseline_stats.json)
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Stop after this many classified samples
        #[arg(short = 'n', long)]
        max_samples: Option<u64>,

        /// Stop after this many seconds
        #[arg(short, long)]
        duration_secs: Option<u64>,
    },

    /// Classify recorded payloads (JSON lines) against the baseline
    Replay {
        /// File with one simulator payload per line
        input: PathBuf,

        /// Stream name used for the decision log file name
        #[arg(short, long)]
        stream: Option<String>,

        /// Baseline statistics path (default: <data-dir>/baseline_stats.json)
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Stop after this many classified samples
        #[arg(short = 'n', long)]
        max_samples: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(host) = cli.broker_host {
        config.broker.host = host;
    }
    if let Some(port) = cli.broker_port {
        config.broker.port = port;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    match cli.command {
        Commands::Collect { output, stream, max_samples, duration_secs } => {
            if let Some(stream) = stream {
                config.baseline_stream = stream;
            }
            let output = output.unwrap_or_else(|| config.baseline_log_path());
            collect(&config, &output, StopCondition::new(max_samples, duration_secs)).await
        }
        Commands::Train { input, output, multiplier, min_tolerance } => {
            let input = input.unwrap_or_else(|| config.baseline_log_path());
            let output = output.unwrap_or_else(|| config.stats_path());
            let trainer = min_tolerance.iter().fold(
                TrainerConfig::new(multiplier.unwrap_or(config.tolerance_multiplier)),
                |t, (signal, floor)| t.with_floor(signal, *floor),
            );
            train(&input, &output, &trainer)
        }
        Commands::Detect { stream, stats, max_samples, duration_secs } => {
            if let Some(stream) = stream {
                config.stream = stream;
            }
            let stats = stats.unwrap_or_else(|| config.stats_path());
            detect(&config, &stats, StopCondition::new(max_samples, duration_secs)).await
        }
        Commands::Replay { input, stream, stats, max_samples } => {
            if let Some(stream) = stream {
                config.stream = stream;
            }
            let stats = stats.unwrap_or_else(|| config.stats_path());
            replay(&config, &input, &stats, StopCondition::new(max_samples, None))
        }
    }
}

async fn collect(config: &Config, output: &Path, stop: StopCondition) -> Result<()> {
    let layout = LogLayout::new(config.signals.clone(), config.actuators.clone());
    let writer = BaselineLogWriter::open(output, layout)
        .with_context(|| format!("failed to open baseline log {:?}", output))?;
    let mut collector = BaselineCollector::new(writer, &config.faults_key);

    let topic = config.baseline_topic();
    log::info!("Collecting baseline data from {}", topic);

    let result = stream::run_stream(&config.broker, &topic, &mut collector, stop).await;
    let summary = collector.finish().context("failed to flush baseline log")?;

    log::info!("Collection finished: {}", summary);
    println!("Baseline collection: {} -> {:?}", summary, output);

    result?;
    Ok(())
}

fn train(input: &Path, output: &Path, trainer: &TrainerConfig) -> Result<()> {
    let stats = baseline::train_from_file(input, output, trainer)
        .with_context(|| format!("failed to train baseline from {:?}", input))?;

    println!("Saved baseline stats to {:?} ({} rows, k={})", output, stats.samples, stats.multiplier);
    println!("Tolerances:");
    for (name, s) in &stats.signals {
        println!("  {:<16} = {:.3} (mean {:+.4}, std {:.4})", name, s.tolerance, s.mean, s.std);
    }
    Ok(())
}

async fn detect(config: &Config, stats_path: &Path, stop: StopCondition) -> Result<()> {
    let mut handler = detection_handler(config, stats_path, &config.decision_log_path(&config.stream))?;
    let topic = config.detection_topic();
    log::info!("Running detector on {}", topic);

    let result = stream::run_stream(&config.broker, &topic, &mut handler, stop).await;
    report(handler.finish());

    result?;
    Ok(())
}

fn replay(config: &Config, input: &Path, stats_path: &Path, stop: StopCondition) -> Result<()> {
    let log_path = config.replay_log_path(&config.stream);
    let mut handler = detection_handler(config, stats_path, &log_path)?;

    let result = stream::replay_file(input, &topic_for(&config.stream), &mut handler, stop);
    report(handler.finish());

    result.with_context(|| format!("replay of {:?} failed", input))?;
    Ok(())
}

/// Load statistics (fatal when missing) and open the decision log at `log_path`
fn detection_handler(config: &Config, stats_path: &Path, log_path: &Path) -> Result<DetectionHandler> {
    let stats: BaselineStats = baseline::load_stats(stats_path)
        .with_context(|| format!("refusing to start without baseline statistics ({:?})", stats_path))?;

    let sink = CsvDecisionLog::create(log_path, stats.signal_names())
        .with_context(|| format!("failed to create decision log {:?}", log_path))?;

    let detector = AnomalyDetector::new(stats, Box::new(sink));
    Ok(DetectionHandler::new(detector, &config.faults_key))
}

fn report(summary: RunSummary) {
    log::info!("Run summary: {}", summary);
    if summary.write_failures > 0 || summary.flush_failed {
        log::error!("Decision log is incomplete ({} write failures)", summary.write_failures);
    }
    if summary.vacuous {
        log::warn!("Baseline statistics were empty - every sample was classified normal");
    }
    println!("{}", summary.matrix);
    println!("{}", summary);
}
