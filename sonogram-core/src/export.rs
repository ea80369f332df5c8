use std::path::{Path, PathBuf};

use image::{ColorType, ImageFormat};

use crate::error::ExportError;
use crate::render::SpectrogramArtifact;

pub const DEFAULT_EXTENSION: &str = "png";

/// Normalise a save target: no extension gets `.png`, anything other than
/// `png` (case-insensitive) is rejected.
pub fn resolve_png_path(path: &Path) -> Result<PathBuf, ExportError> {
    match path.extension().and_then(|e| e.to_str()) {
        None => Ok(path.with_extension(DEFAULT_EXTENSION)),
        Some(ext) if ext.eq_ignore_ascii_case(DEFAULT_EXTENSION) => Ok(path.to_path_buf()),
        Some(ext) => Err(ExportError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension: ext.to_string(),
        }),
    }
}

/// Write `artifact` as a PNG. Returns the path actually written.
///
/// An existing file is replaced.
pub fn export_png(artifact: &SpectrogramArtifact, path: &Path) -> Result<PathBuf, ExportError> {
    let path = resolve_png_path(path)?;

    let expected = artifact.width as usize * artifact.height as usize * 3;
    if artifact.width == 0 || artifact.height == 0 || artifact.pixels.len() != expected {
        return Err(ExportError::InvalidArtifact {
            width: artifact.width,
            height: artifact.height,
        });
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.is_dir() {
            return Err(ExportError::MissingDirectory {
                dir: dir.to_path_buf(),
            });
        }
    }

    if path.exists() {
        log::warn!("overwriting {}", path.display());
    }

    image::save_buffer_with_format(
        &path,
        &artifact.pixels,
        artifact.width,
        artifact.height,
        ColorType::Rgb8,
        ImageFormat::Png,
    )
    .map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    log::info!(
        "saved {}x{} spectrogram to {}",
        artifact.width,
        artifact.height,
        path.display()
    );
    Ok(path)
}
