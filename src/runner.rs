//! One run of the tool: split the page, write the notes, prepare them for
//! recognition and report what was found.

use crate::config::{Config, SplitMode};
use crate::engine::{OcrEngine, OcrResult};
use crate::engines::EngineRegistry;
use crate::error::NoteError;
use crate::io;
use crate::preprocessing::{execute_timed, Preset, StepTiming};
use crate::segmentation::{split_with_sequence, Note, Rectangle, Splitter};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct PageReport {
    pub input: PathBuf,
    pub total_time_ms: u64,
    pub notes: Vec<NoteReport>,
}

#[derive(Debug, Serialize)]
pub struct NoteReport {
    pub index: usize,
    pub rect: Rectangle,
    pub split: PathBuf,
    pub prepared: PathBuf,
    pub prepare_steps: Vec<StepTiming>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrResult>,
}

pub fn run(config: Config) -> anyhow::Result<()> {
    let start = Instant::now();
    let notes = split_input(&config)?;

    let registry = EngineRegistry::new(&config).context("cannot initialize OCR engine")?;
    tracing::debug!("Initialized engines: {:?}", registry.list());
    let engine = registry.default();
    if let Some(engine) = &engine {
        tracing::info!("Using {}: {}", engine.name(), engine.description());
        if !engine.supported_languages().contains(&config.language) {
            tracing::warn!("{} does not list language '{}'", engine.name(), config.language);
        }
    }

    let mut report = process_notes(&config, notes, engine.as_deref())?;
    report.total_time_ms = start.elapsed().as_millis() as u64;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

/// Load the configured page and cut it into notes
pub fn split_input(config: &Config) -> anyhow::Result<Vec<Note>> {
    let cannot_load = || format!("cannot load image {}", config.input.display());

    match config.mode {
        SplitMode::Notes => {
            let splitter = Splitter::new(config.splitter())?;
            splitter.split_file(&config.input).map_err(|e| match e {
                NoteError::ImageLoad { .. } => anyhow::Error::new(e).context(cannot_load()),
                other => other.into(),
            })
        }
        SplitMode::Sequence => {
            let page = io::load_image(&config.input).with_context(cannot_load)?;
            let (retrieval, approximation) = config.contour_modes();
            tracing::info!("Splitting with preset '{}'", config.preset.as_str());

            let mut notes = split_with_sequence(
                &page,
                &config.preset.sequence(),
                retrieval,
                approximation,
                &config.area_filter(),
            )?;
            if config.reading_order {
                notes.sort_by_key(|n| (n.rect().y, n.rect().x));
            }
            Ok(notes)
        }
    }
}

/// Write, prepare and optionally recognize every note
pub fn process_notes(
    config: &Config,
    notes: Vec<Note>,
    engine: Option<&dyn OcrEngine>,
) -> anyhow::Result<PageReport> {
    let start = Instant::now();
    let written = io::write_notes(&notes, &config.output_dir)
        .with_context(|| format!("cannot write notes to {}", config.output_dir.display()))?;

    let prepare = Preset::Prepare.sequence();
    let mut reports = Vec::with_capacity(notes.len());

    for (index, (note, split)) in notes.into_iter().zip(written).enumerate() {
        let rect = note.rect();
        let prepared_report = execute_timed(note.into_image(), &prepare)
            .with_context(|| format!("cannot prepare note {}", index))?;

        let prepared = io::prepared_path(&split);
        io::write_image(&prepared_report.image, &prepared)?;

        let ocr = engine.and_then(|engine| recognize(engine, &prepared));

        reports.push(NoteReport {
            index,
            rect,
            split,
            prepared,
            prepare_steps: prepared_report.steps,
            ocr,
        });
    }

    tracing::info!(
        "Wrote {} note(s) to {:?} in {}ms",
        reports.len(),
        config.output_dir,
        start.elapsed().as_millis()
    );

    Ok(PageReport {
        input: config.input.clone(),
        total_time_ms: start.elapsed().as_millis() as u64,
        notes: reports,
    })
}

/// A note that cannot be read is reported without text
fn recognize(engine: &dyn OcrEngine, path: &Path) -> Option<OcrResult> {
    match engine.process(path) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!("{} failed on {:?}: {}", engine.name(), path, e);
            None
        }
    }
}

fn print_text(report: &PageReport) {
    for note in &report.notes {
        let r = note.rect;
        println!(
            "{} ({}x{} at {},{})",
            note.split.display(),
            r.width,
            r.height,
            r.x,
            r.y
        );
        if let Some(ocr) = &note.ocr {
            println!("{}", ocr.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Args;
    use clap::Parser;
    use image::{Rgb, RgbImage};

    fn config(dir: &Path, extra: &[&str]) -> Config {
        let input = dir.join("page.png");
        let output = dir.join("out");
        let mut argv = vec![
            "note-splitter".to_string(),
            input.display().to_string(),
            "--output-dir".to_string(),
            output.display().to_string(),
            "--engine".to_string(),
            "none".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Config::from(Args::parse_from(argv))
    }

    fn process(config: &Config) -> PageReport {
        let notes = split_input(config).unwrap();
        process_notes(config, notes, None).unwrap()
    }

    fn write_page(dir: &Path) {
        let mut img = RgbImage::from_pixel(160, 120, Rgb([15, 15, 15]));
        for (x0, y0, w, h) in [(90, 60, 50, 40), (10, 10, 40, 30)] {
            for y in y0..y0 + h {
                for x in x0..x0 + w {
                    img.put_pixel(x, y, Rgb([240, 240, 200]));
                }
            }
        }
        img.save(dir.join("page.png")).unwrap();
    }

    #[test]
    fn test_process_notes_writes_split_and_prepared_notes() {
        let dir = tempfile::tempdir().unwrap();
        write_page(dir.path());
        let config = config(dir.path(), &["--sort"]);

        let report = process(&config);

        assert_eq!(report.notes.len(), 2);
        assert_eq!(report.notes[0].rect, Rectangle::new(10, 10, 40, 30));
        for note in &report.notes {
            assert!(note.split.exists());
            assert!(note.prepared.exists());
            assert!(note.ocr.is_none());
        }

        let prepared = io::load_image(&report.notes[1].prepared).unwrap();
        assert_eq!(prepared.color().channel_count(), 1);
        assert_eq!((prepared.width(), prepared.height()), (50, 40));
    }

    #[test]
    fn test_sequence_mode() {
        let dir = tempfile::tempdir().unwrap();
        write_page(dir.path());
        let config = config(dir.path(), &["--mode", "sequence", "--preset", "notes", "--sort"]);

        let report = process(&config);

        // Relative filter: 39x29 is under 0.8 of 49x39
        assert_eq!(report.notes.len(), 1);
        assert_eq!(report.notes[0].rect, Rectangle::new(90, 60, 50, 40));
    }

    #[test]
    fn test_missing_input_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        for mode in ["notes", "sequence"] {
            let err = split_input(&config(dir.path(), &["--mode", mode])).unwrap_err();
            assert!(err.to_string().starts_with("cannot load image"), "{}", err);
        }
    }
}
