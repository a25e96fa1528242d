use std::path::Path;

use image::{DynamicImage, RgbaImage};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{info, warn};

use super::charset::UNKNOWN_GLYPH;
use super::classifier::{argmax, Classifier, OnnxClassifier};
use super::config::RecognizerConfig;
use super::glyph::{check_alignment, GlyphMap, GlyphTable};
use super::labels::load_class_identifiers;
use super::pipeline::{ImagePreprocessor, ImageTensor};
use super::{RecognizerError, Result};

/// Outcome of one recognition request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub class_index: usize,
    pub class_id: String,
    /// The mapped glyph, or [`UNKNOWN_GLYPH`].
    pub glyph: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn is_unknown(&self) -> bool {
        self.glyph == UNKNOWN_GLYPH
    }
}

/// Serves one synchronous request per image against artifacts loaded once.
///
/// Nothing here is mutated after construction apart from the glyph map, which is built on first
/// use and then only read.
pub struct Recognizer<C> {
    classifier: C,
    class_ids: Vec<String>,
    table: GlyphTable,
    glyph_map: OnceCell<GlyphMap>,
    preprocessor: ImagePreprocessor,
}

impl Recognizer<OnnxClassifier> {
    /// Loads the model and class identifiers named by `config`. Any error is fatal.
    pub fn from_config(config: &RecognizerConfig) -> Result<Self> {
        config.validate()?;
        let classifier = OnnxClassifier::load(&config.model_path, config.input_size)?;
        let class_ids = load_class_identifiers(&config.classes_path)?;
        Recognizer::new(
            classifier,
            class_ids,
            GlyphTable::amharic(),
            config.preprocessor(),
            config.strict_alignment,
        )
    }
}

impl<C: Classifier> Recognizer<C> {
    pub fn new(
        classifier: C,
        class_ids: Vec<String>,
        table: GlyphTable,
        preprocessor: ImagePreprocessor,
        strict_alignment: bool,
    ) -> Result<Self> {
        if table.total_cells() == 0 {
            return Err(RecognizerError::Alignment {
                message: "glyph table is empty".to_string(),
            });
        }
        check_alignment(&table, &class_ids).validate(strict_alignment)?;
        classifier.input_size().validate()?;
        Ok(Recognizer {
            classifier,
            class_ids,
            table,
            glyph_map: OnceCell::new(),
            preprocessor,
        })
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn class_ids(&self) -> &[String] {
        &self.class_ids
    }

    pub fn preprocessor(&self) -> &ImagePreprocessor {
        &self.preprocessor
    }

    pub fn glyph_map(&self) -> &GlyphMap {
        self.glyph_map
            .get_or_init(|| GlyphMap::build(&self.table, &self.class_ids))
    }

    pub fn recognize(&self, image: &DynamicImage) -> Result<Prediction> {
        let size = self.classifier.input_size();
        let tensor = self.preprocessor.prepare(image, size.height, size.width)?;
        self.classify(&tensor)
    }

    pub fn recognize_bytes(&self, bytes: &[u8]) -> Result<Prediction> {
        let size = self.classifier.input_size();
        let tensor = self
            .preprocessor
            .prepare_bytes(bytes, size.height, size.width)?;
        self.classify(&tensor)
    }

    pub fn recognize_path<P: AsRef<Path>>(&self, path: P) -> Result<Prediction> {
        let size = self.classifier.input_size();
        let tensor = self
            .preprocessor
            .prepare_path(path, size.height, size.width)?;
        self.classify(&tensor)
    }

    pub fn recognize_canvas(&self, capture: &RgbaImage) -> Result<Prediction> {
        let size = self.classifier.input_size();
        let tensor = self
            .preprocessor
            .prepare_canvas(capture, size.height, size.width)?;
        self.classify(&tensor)
    }

    /// Runs the classifier on a prepared tensor and resolves the winning class.
    pub fn classify(&self, tensor: &ImageTensor) -> Result<Prediction> {
        let scores = self.classifier.predict(tensor)?;
        if scores.len() != self.class_ids.len() {
            warn!(
                outputs = scores.len(),
                classes = self.class_ids.len(),
                "classifier output length differs from class identifiers"
            );
        }
        let (class_index, confidence) = argmax(&scores).ok_or(RecognizerError::EmptyPrediction)?;
        let class_id = self.class_ids.get(class_index).ok_or(
            RecognizerError::ClassIndexOutOfRange {
                index: class_index,
                classes: self.class_ids.len(),
            },
        )?;
        let glyph = self.glyph_map().lookup(class_id);
        info!(class_index, class_id = %class_id, glyph, confidence, "recognized character");

        Ok(Prediction {
            class_index,
            class_id: class_id.clone(),
            glyph: glyph.to_string(),
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageSize;
    use image::{GrayImage, Luma, Rgba};
    use std::cell::Cell;

    struct Fixed {
        scores: Vec<f32>,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn new(scores: Vec<f32>) -> Self {
            Fixed {
                scores,
                calls: Cell::new(0),
            }
        }
    }

    impl Classifier for Fixed {
        fn input_size(&self) -> ImageSize {
            ImageSize::new(28, 28)
        }

        fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
            assert_eq!(tensor.shape(), [1, 28, 28, 1]);
            self.calls.set(self.calls.get() + 1);
            Ok(self.scores.clone())
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    fn small_table() -> GlyphTable {
        GlyphTable::from_rows([["ሀ", "ሁ"], ["ለ", "ሉ"]])
    }

    fn blank() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([0])))
    }

    #[test]
    fn resolves_argmax_to_glyph() {
        let recognizer = Recognizer::new(
            Fixed::new(vec![0.1, 0.2, 0.7]),
            ids(3),
            small_table(),
            ImagePreprocessor::default(),
            false,
        )
        .unwrap();
        let prediction = recognizer.recognize(&blank()).unwrap();
        assert_eq!(prediction.class_index, 2);
        assert_eq!(prediction.class_id, "c2");
        assert_eq!(prediction.glyph, "ለ");
        assert_eq!(prediction.confidence, 0.7);
        assert!(!prediction.is_unknown());
    }

    #[test]
    fn class_past_table_is_unknown() {
        let recognizer = Recognizer::new(
            Fixed::new(vec![0.0, 0.0, 0.0, 0.0, 0.9]),
            ids(5),
            small_table(),
            ImagePreprocessor::default(),
            false,
        )
        .unwrap();
        let prediction = recognizer.recognize(&blank()).unwrap();
        assert_eq!(prediction.class_id, "c4");
        assert_eq!(prediction.glyph, UNKNOWN_GLYPH);
        assert!(prediction.is_unknown());
    }

    #[test]
    fn index_past_class_list_is_an_error() {
        let recognizer = Recognizer::new(
            Fixed::new(vec![0.0, 0.0, 1.0]),
            ids(2),
            small_table(),
            ImagePreprocessor::default(),
            false,
        )
        .unwrap();
        assert!(matches!(
            recognizer.recognize(&blank()),
            Err(RecognizerError::ClassIndexOutOfRange { index: 2, classes: 2 })
        ));
    }

    #[test]
    fn empty_scores_are_an_error() {
        let recognizer = Recognizer::new(
            Fixed::new(vec![]),
            ids(2),
            small_table(),
            ImagePreprocessor::default(),
            false,
        )
        .unwrap();
        assert!(matches!(
            recognizer.recognize(&blank()),
            Err(RecognizerError::EmptyPrediction)
        ));
    }

    #[test]
    fn bad_upload_never_reaches_classifier() {
        let recognizer = Recognizer::new(
            Fixed::new(vec![1.0]),
            ids(1),
            small_table(),
            ImagePreprocessor::default(),
            false,
        )
        .unwrap();
        let err = recognizer.recognize_bytes(b"not an image").unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(recognizer.classifier().calls.get(), 0);
    }

    #[test]
    fn canvas_path_runs_the_classifier() {
        let recognizer = Recognizer::new(
            Fixed::new(vec![0.9, 0.1]),
            ids(2),
            small_table(),
            ImagePreprocessor::default(),
            false,
        )
        .unwrap();
        let capture = RgbaImage::from_pixel(200, 200, Rgba([238, 238, 238, 255]));
        let prediction = recognizer.recognize_canvas(&capture).unwrap();
        assert_eq!(prediction.glyph, "ሀ");
        assert_eq!(recognizer.classifier().calls.get(), 1);
    }

    #[test]
    fn glyph_map_built_once() {
        let recognizer = Recognizer::new(
            Fixed::new(vec![1.0]),
            ids(3),
            small_table(),
            ImagePreprocessor::default(),
            false,
        )
        .unwrap();
        let first = recognizer.glyph_map() as *const GlyphMap;
        let second = recognizer.glyph_map() as *const GlyphMap;
        assert_eq!(first, second);
        assert_eq!(recognizer.glyph_map().len(), 3);
    }

    #[test]
    fn strict_alignment_rejects_short_list() {
        let result = Recognizer::new(
            Fixed::new(vec![1.0]),
            ids(3),
            small_table(),
            ImagePreprocessor::default(),
            true,
        );
        assert!(matches!(result, Err(RecognizerError::Alignment { .. })));
    }

    #[test]
    fn duplicate_identifiers_rejected() {
        let result = Recognizer::new(
            Fixed::new(vec![1.0]),
            vec!["a".to_string(), "a".to_string()],
            small_table(),
            ImagePreprocessor::default(),
            false,
        );
        assert!(matches!(result, Err(RecognizerError::Alignment { .. })));
    }

    #[test]
    fn empty_table_rejected() {
        let result = Recognizer::new(
            Fixed::new(vec![1.0]),
            ids(1),
            GlyphTable::new(vec![]),
            ImagePreprocessor::default(),
            false,
        );
        assert!(result.is_err());
    }
}
