use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecognizerError>;

/// Errors produced while loading artifacts or serving a recognition request.
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// The input could not be decoded as a raster image.
    #[error("invalid image")]
    InvalidImage(#[source] image::ImageError),

    #[error("invalid target dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { height: usize, width: usize },

    /// The classifier artifact could not be read or prepared for inference.
    #[error("cannot load model from '{}'", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cannot load class identifiers from '{}': {message}", path.display())]
    ClassListLoad { path: PathBuf, message: String },

    #[error("configuration: {message}")]
    Config { message: String },

    /// The glyph table and the class identifier list disagree.
    #[error("glyph alignment: {message}")]
    Alignment { message: String },

    /// A transform step received a stage it does not handle.
    #[error("transform: {0}")]
    Transform(&'static str),

    #[error("inference")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("predicted index {index} has no class identifier ({classes} known)")]
    ClassIndexOutOfRange { index: usize, classes: usize },

    #[error("classifier returned an empty probability vector")]
    EmptyPrediction,
}

impl RecognizerError {
    pub fn config(message: impl Into<String>) -> Self {
        RecognizerError::Config {
            message: message.into(),
        }
    }

    /// Whether the failure belongs to the caller's input rather than to the loaded artifacts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RecognizerError::InvalidImage(_) | RecognizerError::InvalidDimensions { .. }
        )
    }
}
