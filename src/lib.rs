//! Handwritten Amharic (Fidel) character recognition.
//!
//! Raw images go through [`ImagePreprocessor`] into an [`ImageTensor`], a [`Classifier`] scores
//! the tensor, and the winning class identifier is resolved to a glyph through a [`GlyphMap`].
//! [`Recognizer`] ties the three together for one request at a time.

pub mod charset;
pub mod classifier;
pub mod config;
pub mod error;
pub mod glyph;
pub mod labels;
pub mod pipeline;
pub mod recognizer;
pub mod transformer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use charset::{AMHARIC_TABLE, UNKNOWN_GLYPH};
pub use classifier::{argmax, Classifier, OnnxClassifier};
pub use config::{RecognizerConfig, DEFAULT_CLASSES_PATH, DEFAULT_MODEL_PATH};
pub use error::{RecognizerError, Result};
pub use glyph::{check_alignment, Alignment, GlyphMap, GlyphTable};
pub use labels::{load_class_identifiers, parse_class_identifiers};
pub use pipeline::{ImagePreprocessor, ImageTensor, Polarity};
pub use recognizer::{Prediction, Recognizer};
pub use transformer::{GenericTransform, ImageTransform, ImageTransformResult};

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub fn new(height: usize, width: usize) -> Self {
        ImageSize { width, height }
    }

    /// Fails with `InvalidDimensions` unless both sides are positive and fit an image buffer.
    pub fn validate(&self) -> Result<()> {
        let fits = |v: usize| v > 0 && u32::try_from(v).is_ok();
        if fits(self.width) && fits(self.height) {
            Ok(())
        } else {
            Err(RecognizerError::InvalidDimensions {
                height: self.height,
                width: self.width,
            })
        }
    }
}

/// `WIDTHxHEIGHT`
impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| format!("bad dimension '{v}': {e}"))
        };
        Ok(ImageSize {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}
