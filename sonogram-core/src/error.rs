use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a file on disk into an [`AudioSignal`](crate::AudioSignal).
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported audio format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("corrupt audio stream in {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("no audio samples decoded from {path}")]
    NoAudio { path: PathBuf },

    #[error("resampling {from} Hz -> {to} Hz failed: {reason}")]
    Resample { from: u32, to: u32, reason: String },
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("cannot compute a spectrogram of an empty signal")]
    EmptySignal,

    #[error("invalid STFT parameters: fft_size={fft_size}, hop_size={hop_size}")]
    InvalidParameters { fft_size: usize, hop_size: usize },

    #[error("FFT failed: {0}")]
    Fft(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("canvas {width}x{height} is smaller than the minimum {min_width}x{min_height}")]
    InvalidSize {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("spectrogram has no frames to draw")]
    EmptyMatrix,

    #[error("drawing failed: {0}")]
    Draw(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{path} has extension {extension:?}, only .png is supported")]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("directory {dir} does not exist")]
    MissingDirectory { dir: PathBuf },

    #[error("artifact pixel buffer does not match {width}x{height}")]
    InvalidArtifact { width: u32, height: u32 },

    #[error("writing {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown colormap {0:?}")]
pub struct UnknownColormap(pub String);
