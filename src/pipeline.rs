use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tract_onnx::prelude::tract_ndarray::Array4;
use tract_onnx::prelude::Tensor;
use tracing::debug;

use super::transformer::{
    ExtractChannel, GenericTransform, Grayscale, ImageTransform, ImageTransformResult, Invert,
    Normalization, ResizeGrayImage, ToArray,
};
use super::{ImageSize, RecognizerError, Result};

/// Which way round strokes end up in the tensor for canvas captures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Dark ink on a light canvas is inverted so strokes are bright on a dark ground.
    #[default]
    InkBright,
    /// The capture channel is used as-is.
    InkDark,
}

/// Normalized `(1, height, width, 1)` input for one classifier call.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        let s = self.data.shape();
        [s[0], s[1], s[2], s[3]]
    }

    pub fn height(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.data.shape()[2]
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn into_array(self) -> Array4<f32> {
        self.data
    }

    pub fn to_tensor(&self) -> Tensor {
        self.data.clone().into()
    }
}

/// Turns raw images into classifier input.
///
/// The resampling filter is fixed when the preprocessor is built, so the same image and target
/// size always produce bit-identical tensors.
#[derive(Clone, Debug)]
pub struct ImagePreprocessor {
    filter: FilterType,
    polarity: Polarity,
    canvas_channel: usize,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        ImagePreprocessor {
            filter: FilterType::CatmullRom,
            polarity: Polarity::InkBright,
            canvas_channel: 0,
        }
    }
}

impl ImagePreprocessor {
    pub fn new(filter: FilterType, polarity: Polarity, canvas_channel: usize) -> Self {
        ImagePreprocessor {
            filter,
            polarity,
            canvas_channel,
        }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Grayscale, resize, scale into [0, 1], reshape to NHWC.
    pub fn steps(&self, image_size: ImageSize) -> Vec<ImageTransform> {
        vec![
            Grayscale {}.into(),
            ResizeGrayImage {
                image_size,
                filter: self.filter,
            }
            .into(),
            ToArray {}.into(),
            Normalization::default().into(),
        ]
    }

    /// Channel extraction and optional inversion ahead of [`Self::steps`].
    pub fn canvas_steps(&self, image_size: ImageSize) -> Vec<ImageTransform> {
        let mut steps: Vec<ImageTransform> = vec![ExtractChannel {
            channel: self.canvas_channel,
        }
        .into()];
        if self.polarity == Polarity::InkBright {
            steps.push(Invert {}.into());
        }
        steps.extend(self.steps(image_size));
        steps
    }

    pub fn prepare(&self, image: &DynamicImage, height: usize, width: usize) -> Result<ImageTensor> {
        let image_size = ImageSize::new(height, width);
        image_size.validate()?;
        debug!(
            source = %format!("{}x{}", image.width(), image.height()),
            target = %image_size,
            "preparing image"
        );
        self.run(&self.steps(image_size), image.clone().into())
    }

    /// Decodes an uploaded file (any format `image` can guess) before preparing it.
    pub fn prepare_bytes(&self, bytes: &[u8], height: usize, width: usize) -> Result<ImageTensor> {
        ImageSize::new(height, width).validate()?;
        let image = image::load_from_memory(bytes).map_err(RecognizerError::InvalidImage)?;
        self.prepare(&image, height, width)
    }

    pub fn prepare_path<P: AsRef<Path>>(
        &self,
        path: P,
        height: usize,
        width: usize,
    ) -> Result<ImageTensor> {
        ImageSize::new(height, width).validate()?;
        let image = image::open(path).map_err(RecognizerError::InvalidImage)?;
        self.prepare(&image, height, width)
    }

    /// Freehand canvas capture: RGBA strokes over a filled background.
    pub fn prepare_canvas(
        &self,
        capture: &RgbaImage,
        height: usize,
        width: usize,
    ) -> Result<ImageTensor> {
        let image_size = ImageSize::new(height, width);
        image_size.validate()?;
        debug!(
            channel = self.canvas_channel,
            polarity = ?self.polarity,
            target = %image_size,
            "preparing canvas capture"
        );
        self.run(
            &self.canvas_steps(image_size),
            DynamicImage::ImageRgba8(capture.clone()).into(),
        )
    }

    fn run(&self, steps: &[ImageTransform], input: ImageTransformResult) -> Result<ImageTensor> {
        let mut result = input;

        for step in steps {
            result = step.transform(result)?;
        }

        match result {
            ImageTransformResult::Array4(data) => Ok(ImageTensor { data }),
            _ => Err(RecognizerError::Transform("Should be converted to array already")),
        }
    }
}
