use crate::preprocessing::Preset;
use crate::segmentation::contours::{ApproximationMode, RetrievalMode};
use crate::segmentation::{AreaFilter, SplitterConfig};
use crate::Args;
use clap::ValueEnum;
use std::path::PathBuf;

/// How the page is turned into notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SplitMode {
    /// Binarize at `--threshold`, mask and crop the detected notes
    #[default]
    Notes,
    /// Run `--preset` and crop the outer regions of its output
    Sequence,
}

/// Which area policy drops noise regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterStrategy {
    /// Bounding box area of at least `--min-note-size` pixels
    Absolute,
    /// Contour area of at least `--area-ratio` times the largest one
    Relative,
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub mode: SplitMode,
    pub preset: Preset,
    pub threshold: f64,
    pub filter: Option<FilterStrategy>,
    pub retrieval: Option<RetrievalMode>,
    pub approximation: Option<ApproximationMode>,
    pub min_note_size: f64,
    pub area_ratio: f64,
    pub reading_order: bool,
    pub engine: String,
    pub language: String,
    pub tessdata_path: Option<String>,
    pub json: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            input: args.input,
            output_dir: args.output_dir,
            mode: args.mode,
            preset: args.preset,
            threshold: args.threshold,
            filter: args.filter,
            retrieval: args.retrieval,
            approximation: args.approximation,
            min_note_size: args.min_note_size,
            area_ratio: args.area_ratio,
            reading_order: args.sort,
            engine: args.engine,
            language: args.language,
            tessdata_path: args.tessdata_path,
            json: args.json,
        }
    }
}

impl Config {
    /// Area policy; notes mode defaults to the absolute floor, sequence mode
    /// to the ratio of the largest region
    pub fn area_filter(&self) -> AreaFilter {
        let strategy = self.filter.unwrap_or(match self.mode {
            SplitMode::Notes => FilterStrategy::Absolute,
            SplitMode::Sequence => FilterStrategy::Relative,
        });

        match strategy {
            FilterStrategy::Absolute => AreaFilter::absolute(self.min_note_size),
            FilterStrategy::Relative => AreaFilter::relative(self.area_ratio),
        }
    }

    pub fn splitter(&self) -> SplitterConfig {
        let (retrieval, approximation) = self.contour_modes();
        SplitterConfig {
            threshold: self.threshold,
            area_filter: self.area_filter(),
            retrieval,
            approximation,
            reading_order: self.reading_order,
            ..SplitterConfig::default()
        }
    }

    /// Contour settings; notes mode lists every border, sequence mode keeps
    /// only the outer ones
    pub fn contour_modes(&self) -> (RetrievalMode, ApproximationMode) {
        let retrieval = self.retrieval.unwrap_or(match self.mode {
            SplitMode::Notes => RetrievalMode::List,
            SplitMode::Sequence => RetrievalMode::External,
        });
        (retrieval, self.approximation.unwrap_or_default())
    }
}
