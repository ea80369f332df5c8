//! User actions and the table that maps menu identifiers to them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sonogram_core::{AudioDecoder, Colormap};

use crate::error::SessionError;
use crate::session::Session;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    LoadFile(PathBuf),
    ChangeColormap(Colormap),
    Resize { width: u32, height: u32 },
    SaveArtifact(PathBuf),
    Quit,
}

/// What an applied action did to the display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A new artifact is ready for the canvas.
    Rendered,
    Saved(PathBuf),
    /// State changed but there is nothing new to draw.
    Unchanged,
    Quit,
}

pub const LOAD_ID: &str = "file.load";
pub const SAVE_ID: &str = "file.save";
pub const QUIT_ID: &str = "file.quit";

pub fn colormap_id(colormap: Colormap) -> String {
    format!("colormap.{colormap}")
}

/// Builds an action from the path a file dialog returned, if any.
type Handler = Box<dyn Fn(Option<&Path>) -> Result<Action, SessionError>>;

/// Action identifier → handler. Each handler owns everything it needs, so
/// registering in a loop binds each entry to its own value.
pub struct ActionTable {
    handlers: BTreeMap<String, Handler>,
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ActionTable {
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// File actions plus one entry per catalog colormap.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(LOAD_ID, |path| {
            path.map(|p| Action::LoadFile(p.to_path_buf()))
                .ok_or_else(|| SessionError::MissingPath(LOAD_ID.into()))
        });
        table.register(SAVE_ID, |path| {
            path.map(|p| Action::SaveArtifact(p.to_path_buf()))
                .ok_or_else(|| SessionError::MissingPath(SAVE_ID.into()))
        });
        table.register(QUIT_ID, |_| Ok(Action::Quit));

        for colormap in Colormap::catalog() {
            table.register(&colormap_id(colormap), move |_| Ok(Action::ChangeColormap(colormap)));
        }
        table
    }

    pub fn register<F>(&mut self, id: &str, handler: F)
    where
        F: Fn(Option<&Path>) -> Result<Action, SessionError> + 'static,
    {
        self.handlers.insert(id.to_string(), Box::new(handler));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Resolve `id` into an action without applying it.
    pub fn resolve(&self, id: &str, path: Option<&Path>) -> Result<Action, SessionError> {
        let handler = self
            .handlers
            .get(id)
            .ok_or_else(|| SessionError::UnknownAction(id.to_string()))?;
        handler(path)
    }

    /// Resolve `id` and apply the action to `session`.
    pub fn dispatch<D: AudioDecoder>(
        &self,
        session: &mut Session<D>,
        id: &str,
        path: Option<&Path>,
    ) -> Result<Outcome, SessionError> {
        let action = self.resolve(id, path)?;
        log::debug!("dispatch {id} -> {action:?}");
        session.apply(&action)
    }
}
