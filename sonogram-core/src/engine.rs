use std::path::{Path, PathBuf};

use crate::colormap::Colormap;
use crate::config::EngineConfig;
use crate::decode::{AudioDecoder, FileDecoder};
use crate::error::{DecodeError, ExportError, RenderError, TransformError};
use crate::export::export_png;
use crate::render::{render_with_font, RenderSpec, SpectrogramArtifact};
use crate::stft;
use crate::types::{AudioSignal, SpectrogramMatrix};

/// Decode, transform, render and export with one fixed set of parameters.
#[derive(Clone, Debug, Default)]
pub struct SpectrogramEngine {
    config: EngineConfig,
}

impl SpectrogramEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decoder for the filesystem, producing signals at the engine rate.
    pub fn file_decoder(&self) -> FileDecoder {
        FileDecoder::new(self.config.sample_rate)
    }

    pub fn decode(&self, path: &Path) -> Result<AudioSignal, DecodeError> {
        self.file_decoder().decode(path)
    }

    pub fn compute_spectrogram(&self, signal: &AudioSignal) -> Result<SpectrogramMatrix, TransformError> {
        stft::compute_spectrogram(signal, &self.config)
    }

    pub fn render(
        &self,
        matrix: &SpectrogramMatrix,
        spec: &RenderSpec,
    ) -> Result<SpectrogramArtifact, RenderError> {
        render_with_font(matrix, spec, self.config.font_path.as_deref())
    }

    pub fn export(&self, artifact: &SpectrogramArtifact, path: &Path) -> Result<PathBuf, ExportError> {
        export_png(artifact, path)
    }

    // ── Front-end contract ──

    pub fn load_file(&self, path: &Path) -> Result<AudioSignal, DecodeError> {
        self.decode(path)
    }

    /// Transform `signal` and draw it at `width × height`.
    pub fn compute_and_render(
        &self,
        signal: &AudioSignal,
        colormap: Colormap,
        width: u32,
        height: u32,
    ) -> Result<(SpectrogramMatrix, SpectrogramArtifact), EngineError> {
        let spec = RenderSpec::new(colormap, width, height);
        // Reject bad sizes before paying for the transform.
        spec.validate()?;
        let matrix = self.compute_spectrogram(signal)?;
        let artifact = self.render(&matrix, &spec)?;
        Ok((matrix, artifact))
    }

    /// Re-draw a cached matrix with another colormap. No decoding or FFT.
    pub fn change_colormap(
        &self,
        matrix: &SpectrogramMatrix,
        colormap: Colormap,
        width: u32,
        height: u32,
    ) -> Result<SpectrogramArtifact, RenderError> {
        self.render(matrix, &RenderSpec::new(colormap, width, height))
    }

    pub fn save_artifact(&self, artifact: &SpectrogramArtifact, path: &Path) -> Result<PathBuf, ExportError> {
        self.export(artifact, path)
    }
}

/// Failure of a combined transform-and-render step.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
