//! Explicit per-window session state and the transitions user actions drive.
//!
//! ```text
//! Idle ──load ok──▶ Displaying ──colormap / resize──▶ Displaying (re-render, no decode)
//!                        │
//!                        └──save──▶ Displaying (unchanged)
//! ```
//!
//! Every transition computes its result first and commits it only on
//! success, so a failed action never leaves a half-updated session.

use std::path::{Path, PathBuf};

use sonogram_core::render::RenderSpec;
use sonogram_core::{
    AudioDecoder, Colormap, FileDecoder, SpectrogramArtifact, SpectrogramEngine, SpectrogramMatrix,
};

use crate::action::{Action, Outcome};
use crate::error::SessionError;

/// Default canvas: the 10 × 6 inch figure.
pub const DEFAULT_CANVAS: (u32, u32) = (1000, 600);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Displaying,
}

/// Spectrogram of the currently loaded file.
#[derive(Clone, Debug)]
pub struct CachedMatrix {
    pub path: PathBuf,
    pub matrix: SpectrogramMatrix,
}

#[derive(Clone, Debug)]
pub struct SessionState {
    pub current_file: Option<PathBuf>,
    pub colormap: Colormap,
    pub artifact: Option<SpectrogramArtifact>,
    pub cache: Option<CachedMatrix>,
    pub canvas: (u32, u32),
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_file: None,
            colormap: Colormap::default(),
            artifact: None,
            cache: None,
            canvas: DEFAULT_CANVAS,
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        if self.artifact.is_some() {
            Phase::Displaying
        } else {
            Phase::Idle
        }
    }

    fn render_spec(&self) -> RenderSpec {
        RenderSpec::new(self.colormap, self.canvas.0, self.canvas.1)
    }
}

/// One viewer window: an engine, a decoder and the state they act on.
pub struct Session<D: AudioDecoder = FileDecoder> {
    engine: SpectrogramEngine,
    decoder: D,
    state: SessionState,
}

impl Session<FileDecoder> {
    pub fn new(engine: SpectrogramEngine) -> Self {
        let decoder = engine.file_decoder();
        Self::with_decoder(engine, decoder)
    }
}

impl<D: AudioDecoder> Session<D> {
    pub fn with_decoder(engine: SpectrogramEngine, decoder: D) -> Self {
        Self {
            engine,
            decoder,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn artifact(&self) -> Option<&SpectrogramArtifact> {
        self.state.artifact.as_ref()
    }

    pub fn matrix(&self) -> Option<&SpectrogramMatrix> {
        self.state.cache.as_ref().map(|c| &c.matrix)
    }

    /// Text for the status bar under the canvas.
    pub fn status_line(&self) -> String {
        match &self.state.current_file {
            Some(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("Loaded file: {name}")
            }
            None => "No file loaded".to_string(),
        }
    }

    pub fn apply(&mut self, action: &Action) -> Result<Outcome, SessionError> {
        match action {
            Action::LoadFile(path) => self.load_file(path).map(|_| Outcome::Rendered),
            Action::ChangeColormap(colormap) => self.change_colormap(*colormap),
            Action::Resize { width, height } => self.resize(*width, *height),
            Action::SaveArtifact(path) => self.save(path).map(Outcome::Saved),
            Action::Quit => Ok(Outcome::Quit),
        }
    }

    /// Decode, transform and render `path`, replacing whatever was displayed.
    /// Re-loading the same path decodes it again.
    pub fn load_file(&mut self, path: &Path) -> Result<&SpectrogramArtifact, SessionError> {
        let spec = self.state.render_spec();
        spec.validate()?;

        let signal = self.decoder.decode(path)?;
        let (matrix, artifact) =
            self.engine
                .compute_and_render(&signal, spec.colormap, spec.width, spec.height)?;

        log::info!(
            "loaded {} ({:.2} s, {} frames)",
            path.display(),
            signal.duration_secs(),
            matrix.frame_count()
        );

        self.state.current_file = Some(path.to_path_buf());
        self.state.cache = Some(CachedMatrix {
            path: path.to_path_buf(),
            matrix,
        });
        Ok(self.state.artifact.insert(artifact))
    }

    /// Select `colormap`; when a file is displayed, redraw it from the cache.
    pub fn change_colormap(&mut self, colormap: Colormap) -> Result<Outcome, SessionError> {
        let Some(matrix) = self.cached_matrix() else {
            self.state.colormap = colormap;
            return Ok(Outcome::Unchanged);
        };
        let (w, h) = self.state.canvas;
        let artifact = self.engine.change_colormap(matrix, colormap, w, h)?;

        log::debug!("colormap -> {colormap}");
        self.state.colormap = colormap;
        self.state.artifact = Some(artifact);
        Ok(Outcome::Rendered)
    }

    /// Track a new canvas size; when a file is displayed, redraw it.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Outcome, SessionError> {
        let spec = RenderSpec::new(self.state.colormap, width, height);
        spec.validate()?;

        let Some(matrix) = self.cached_matrix() else {
            self.state.canvas = (width, height);
            return Ok(Outcome::Unchanged);
        };
        let artifact = self.engine.render(matrix, &spec)?;

        self.state.canvas = (width, height);
        self.state.artifact = Some(artifact);
        Ok(Outcome::Rendered)
    }

    /// Export the displayed artifact. Returns the path written.
    pub fn save(&self, path: &Path) -> Result<PathBuf, SessionError> {
        let artifact = self.state.artifact.as_ref().ok_or(SessionError::NothingToSave)?;
        Ok(self.engine.save_artifact(artifact, path)?)
    }

    /// Matrix for the current file, if one is loaded and cached.
    fn cached_matrix(&self) -> Option<&SpectrogramMatrix> {
        let current = self.state.current_file.as_deref()?;
        self.state
            .cache
            .as_ref()
            .filter(|c| c.path == current)
            .map(|c| &c.matrix)
    }
}
