use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::pipeline::{ImagePreprocessor, Polarity};
use super::transformer::FilterOption;
use super::{ImageSize, RecognizerError, Result};

pub const DEFAULT_MODEL_PATH: &str = "Models/amharic_cnn.onnx";
pub const DEFAULT_CLASSES_PATH: &str = "Models/class_names.json";

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_classes_path() -> PathBuf {
    PathBuf::from(DEFAULT_CLASSES_PATH)
}

fn default_filter() -> FilterType {
    FilterType::CatmullRom
}

/// Artifact locations and preprocessing policy, read once at startup.
///
/// ```json
/// {
///   "model_path": "Models/amharic_cnn.onnx",
///   "classes_path": "Models/class_names.json",
///   "input_size": "28x28",
///   "filter": "CatmullRom",
///   "polarity": "ink_bright"
/// }
/// ```
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecognizerConfig {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_classes_path")]
    pub classes_path: PathBuf,
    /// Overrides the input shape declared by the model, `{"width":..,"height":..}` or `"WxH"`.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub input_size: Option<ImageSize>,
    #[serde(with = "FilterOption", default = "default_filter")]
    pub filter: FilterType,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default)]
    pub canvas_channel: usize,
    /// Refuse to start unless every glyph has exactly one class identifier.
    #[serde(default)]
    pub strict_alignment: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        RecognizerConfig {
            model_path: default_model_path(),
            classes_path: default_classes_path(),
            input_size: None,
            filter: default_filter(),
            polarity: Polarity::default(),
            canvas_channel: 0,
            strict_alignment: false,
        }
    }
}

impl RecognizerConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: RecognizerConfig =
            serde_json::from_str(content).map_err(|e| RecognizerError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecognizerError::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_channel >= 4 {
            return Err(RecognizerError::config(format!(
                "canvas_channel must be 0..=3, got {}",
                self.canvas_channel
            )));
        }
        if let Some(size) = self.input_size {
            size.validate()?;
        }
        Ok(())
    }

    pub fn preprocessor(&self) -> ImagePreprocessor {
        ImagePreprocessor::new(self.filter, self.polarity, self.canvas_channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = RecognizerConfig::from_json("{}").unwrap();
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.classes_path, PathBuf::from(DEFAULT_CLASSES_PATH));
        assert_eq!(config.input_size, None);
        assert_eq!(config.filter, FilterType::CatmullRom);
        assert_eq!(config.polarity, Polarity::InkBright);
        assert!(!config.strict_alignment);
    }

    #[test]
    fn input_size_as_string_or_struct() {
        let a = RecognizerConfig::from_json(r#"{"input_size": "32x28"}"#).unwrap();
        assert_eq!(a.input_size, Some(ImageSize::new(28, 32)));
        let b = RecognizerConfig::from_json(r#"{"input_size": {"width": 32, "height": 28}}"#)
            .unwrap();
        assert_eq!(b.input_size, a.input_size);
    }

    #[test]
    fn full_config() {
        let config = RecognizerConfig::from_json(
            r#"{
                "model_path": "m.onnx",
                "classes_path": "c.txt",
                "filter": "Nearest",
                "polarity": "ink_dark",
                "canvas_channel": 1,
                "strict_alignment": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("m.onnx"));
        assert_eq!(config.filter, FilterType::Nearest);
        assert_eq!(config.polarity, Polarity::InkDark);
        assert!(config.strict_alignment);
        assert_eq!(config.preprocessor().polarity(), Polarity::InkDark);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(RecognizerConfig::from_json(r#"{"input_size": "0x28"}"#).is_err());
        assert!(RecognizerConfig::from_json(r#"{"canvas_channel": 4}"#).is_err());
        assert!(RecognizerConfig::from_json(r#"{"filter": "Bicubic"}"#).is_err());
        assert!(RecognizerConfig::from_json(r#"{"modelpath": "x"}"#).is_err());
    }
}
