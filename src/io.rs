//! Reading pages and writing notes

use crate::error::NoteError;
use crate::segmentation::Note;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};

/// Decode an image file; undecodable and empty files are both load errors
pub fn load_image(path: &Path) -> Result<DynamicImage, NoteError> {
    let image = image::open(path).map_err(|e| NoteError::ImageLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if !is_valid(&image) {
        return Err(NoteError::ImageLoad {
            path: path.display().to_string(),
            reason: format!("image has no pixels ({}x{})", image.width(), image.height()),
        });
    }

    tracing::debug!(
        "Loaded {:?}: {}x{}, {:?}",
        path,
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// Non-zero width and height
pub fn is_valid(image: &DynamicImage) -> bool {
    image.width() > 0 && image.height() > 0
}

pub fn ensure_not_empty(image: &DynamicImage) -> Result<(), NoteError> {
    if is_valid(image) {
        Ok(())
    } else {
        Err(NoteError::EmptyImage {
            width: image.width(),
            height: image.height(),
        })
    }
}

/// `<dir>/split_<index>.png`
pub fn note_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("split_{}.png", index))
}

/// Sibling of a note file with `split` replaced by `prepared` in its name
pub fn prepared_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().replacen("split", "prepared", 1))
        .unwrap_or_else(|| "prepared.png".to_string());
    path.with_file_name(name)
}

/// Encode as PNG
pub fn write_image(image: &DynamicImage, path: &Path) -> Result<(), NoteError> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| NoteError::Encode(format!("{}: {}", path.display(), e)))
}

/// Write every note as `split_<i>.png` under `dir`, returning the paths in note order
pub fn write_notes(notes: &[Note], dir: &Path) -> Result<Vec<PathBuf>, NoteError> {
    std::fs::create_dir_all(dir)?;

    notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let path = note_path(dir, i);
            write_image(note.image(), &path)?;
            tracing::debug!("Wrote {:?}", path);
            Ok(path)
        })
        .collect()
}
