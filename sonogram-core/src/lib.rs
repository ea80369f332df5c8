//! Spectrogram engine: audio decoding, STFT, dB scaling, figure rendering
//! and PNG export. No UI dependency.

pub mod axis;
pub mod colormap;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod export;
pub mod fonts;
pub mod render;
pub mod resample;
pub mod stft;
pub mod types;

pub use colormap::{Colormap, Palette};
pub use config::EngineConfig;
pub use decode::{AudioDecoder, FileDecoder, SUPPORTED_EXTENSIONS};
pub use engine::{EngineError, SpectrogramEngine};
pub use error::{DecodeError, ExportError, RenderError, TransformError, UnknownColormap};
pub use render::{RenderSpec, SpectrogramArtifact};
pub use types::{AudioSignal, SpectrogramColumn, SpectrogramMatrix};
