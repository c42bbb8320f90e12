use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod engine;
mod engines;
mod error;
mod io;
mod preprocessing;
mod runner;
mod segmentation;

use config::{FilterStrategy, SplitMode};
use preprocessing::pipeline::DEFAULT_THRESHOLD;
use preprocessing::Preset;
use segmentation::contours::{ApproximationMode, RetrievalMode};
use segmentation::filter::{DEFAULT_AREA_RATIO, MINIMAL_NOTE_SIZE};

#[derive(Parser, Debug)]
#[command(name = "note-splitter")]
#[command(about = "Split a scanned page into individual notes and prepare them for OCR")]
#[command(version)]
pub struct Args {
    /// Page image to split
    pub input: PathBuf,

    /// Directory the split and prepared notes are written to
    #[arg(long, env = "NOTES_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Splitting strategy
    #[arg(long, value_enum, default_value_t = SplitMode::Notes)]
    pub mode: SplitMode,

    /// Preprocessing preset for `--mode sequence` (none, notes, outline, adaptive, prepare)
    #[arg(long, default_value = "outline", value_parser = parse_preset)]
    pub preset: Preset,

    /// Gray level separating notes from the background
    #[arg(long, env = "NOTES_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Area filter (defaults to absolute for notes, relative for sequence)
    #[arg(long, value_enum)]
    pub filter: Option<FilterStrategy>,

    /// Borders to trace (defaults to list for notes, external for sequence)
    #[arg(long, value_enum)]
    pub retrieval: Option<RetrievalMode>,

    /// Border point storage
    #[arg(long, value_enum)]
    pub approximation: Option<ApproximationMode>,

    /// Smallest note bounding box, in pixels
    #[arg(long, env = "NOTES_MIN_SIZE", default_value_t = MINIMAL_NOTE_SIZE)]
    pub min_note_size: f64,

    /// Share of the largest region a region must reach
    #[arg(long, default_value_t = DEFAULT_AREA_RATIO)]
    pub area_ratio: f64,

    /// Number notes top-to-bottom, then left-to-right
    #[arg(long)]
    pub sort: bool,

    /// OCR engine (ocrs, leptess or none)
    #[arg(long, env = "NOTES_ENGINE", default_value = "ocrs")]
    pub engine: String,

    /// OCR language (e.g., "eng", "deu", "fra")
    #[arg(long, env = "NOTES_LANGUAGE", default_value = "eng")]
    pub language: String,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    Preset::from_str(s).ok_or_else(|| format!("unknown preset '{}'", s))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr, stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::from(args);

    tracing::info!("note-splitter v{}", env!("CARGO_PKG_VERSION"));

    runner::run(config)
}
