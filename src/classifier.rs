use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;
use tract_onnx::tract_hir::infer::Factoid;
use tract_onnx::tract_hir::internal::DimLike;
use tracing::{debug, info};

use super::pipeline::ImageTensor;
use super::{ImageSize, RecognizerError, Result};

type TractSimplePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Opaque pretrained classifier.
pub trait Classifier {
    /// Height and width the classifier was trained on.
    fn input_size(&self) -> ImageSize;

    /// One probability per class, in training order.
    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn input_size(&self) -> ImageSize {
        (**self).input_size()
    }

    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        (**self).predict(tensor)
    }
}

/// An ONNX export of the character CNN, taking NHWC `(1, height, width, 1)` input.
pub struct OnnxClassifier {
    model: TractSimplePlan,
    input_size: ImageSize,
    path: PathBuf,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("path", &self.path)
            .field("input_size", &self.input_size)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Loads and optimizes the model.
    ///
    /// The input size comes from the model's declared input shape; `input_size` takes over when
    /// given, and is required when the model leaves height or width symbolic.
    pub fn load<P: AsRef<Path>>(path: P, input_size: Option<ImageSize>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            RecognizerError::ModelLoad {
                path: path.to_path_buf(),
                source,
            }
        };

        if !path.exists() {
            return Err(load_error(format!("{} is not found", path.display()).into()));
        }

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| load_error(e.into()))?;
        Self::from_model(model, path, input_size)
    }

    /// Prepares an already parsed ONNX graph. `origin` only labels logs and errors.
    pub fn from_model(
        model: InferenceModel,
        origin: &Path,
        input_size: Option<ImageSize>,
    ) -> Result<Self> {
        let load_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            RecognizerError::ModelLoad {
                path: origin.to_path_buf(),
                source,
            }
        };

        let declared = declared_input_size(&model);
        debug!(declared = ?declared, "model input shape");
        let input_size = input_size.or(declared).ok_or_else(|| {
            RecognizerError::config(format!(
                "{} does not declare a concrete input height and width; set input_size",
                origin.display()
            ))
        })?;
        input_size.validate()?;

        let input_shape = tvec!(1, input_size.height, input_size.width, 1);
        let model = model
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), input_shape))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| load_error(e.into()))?;

        info!(path = %origin.display(), input = %input_size, "loaded classifier");
        Ok(OnnxClassifier {
            model,
            input_size,
            path: origin.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Classifier for OnnxClassifier {
    fn input_size(&self) -> ImageSize {
        self.input_size
    }

    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        if tensor.shape() != [1, self.input_size.height, self.input_size.width, 1] {
            return Err(RecognizerError::Inference(
                format!(
                    "tensor shape {:?} does not match model input {}",
                    tensor.shape(),
                    self.input_size
                )
                .into(),
            ));
        }
        let result = self
            .model
            .run(tvec!(tensor.to_tensor()))
            .map_err(|e| RecognizerError::Inference(e.into()))?;
        let output = result
            .first()
            .ok_or(RecognizerError::EmptyPrediction)?
            .to_array_view::<f32>()
            .map_err(|e| RecognizerError::Inference(e.into()))?;
        Ok(output.iter().copied().collect())
    }
}

/// NHWC models declare `(batch, height, width, channels)`; the batch is usually symbolic.
fn declared_input_size(model: &InferenceModel) -> Option<ImageSize> {
    let fact = model.input_fact(0).ok()?;
    let dims: Vec<Option<usize>> = fact
        .shape
        .dims()
        .map(|d| d.concretize().and_then(|d| d.to_usize().ok()))
        .collect();
    match dims.as_slice() {
        [_, Some(height), Some(width), _] => Some(ImageSize::new(*height, *width)),
        _ => None,
    }
}

/// Index and value of the highest score. Ties go to the lowest index; NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
}
