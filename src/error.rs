use sonogram_core::{
    DecodeError, EngineError, ExportError, RenderError, TransformError, UnknownColormap,
};
use thiserror::Error;

/// Anything a user action can fail with. The session is left as it was.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    UnknownColormap(#[from] UnknownColormap),

    #[error("nothing to save: no spectrogram is displayed")]
    NothingToSave,

    #[error("no handler registered for action {0:?}")]
    UnknownAction(String),

    #[error("action {0:?} needs a file path")]
    MissingPath(String),
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Transform(e) => SessionError::Transform(e),
            EngineError::Render(e) => SessionError::Render(e),
        }
    }
}
