use enum_dispatch::enum_dispatch;
use image::imageops::{resize, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tract_onnx::prelude::tract_ndarray::{self, Array4};

use super::{ImageSize, RecognizerError, Result};

#[enum_dispatch]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ImageTransform {
    ExtractChannel(ExtractChannel),
    Invert(Invert),
    Grayscale(Grayscale),
    ResizeGrayImage(ResizeGrayImage),
    ToArray(ToArray),
    Normalization(Normalization),
}

#[enum_dispatch(ImageTransform)]
pub trait GenericTransform {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult>;
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "FilterType")]
pub(crate) enum FilterOption {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// Keeps a single raw color channel, discarding the rest (alpha included).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractChannel {
    pub channel: usize,
}

impl GenericTransform for ExtractChannel {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult> {
        match input {
            ImageTransformResult::Image(image) => {
                if self.channel >= 4 {
                    return Err(RecognizerError::Transform("Channel index out of range for RGBA"));
                }
                let rgba = image.to_rgba8();
                let (width, height) = rgba.dimensions();
                let gray = GrayImage::from_fn(width, height, |x, y| {
                    Luma([rgba.get_pixel(x, y)[self.channel]])
                });
                Ok(gray.into())
            }
            ImageTransformResult::GrayImage(image) => {
                if self.channel != 0 {
                    return Err(RecognizerError::Transform("Gray image only has channel 0"));
                }
                Ok(image.into())
            }
            ImageTransformResult::Array4(_) => {
                Err(RecognizerError::Transform("Channel extraction not implemented for Array4"))
            }
        }
    }
}

/// `v -> 255 - v`, swapping figure and ground.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invert {}

impl GenericTransform for Invert {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult> {
        match input {
            ImageTransformResult::GrayImage(mut image) => {
                image.pixels_mut().for_each(|p| p[0] = u8::MAX - p[0]);
                Ok(image.into())
            }
            ImageTransformResult::Image(_) => {
                Err(RecognizerError::Transform("Invert expects a single channel image"))
            }
            ImageTransformResult::Array4(_) => {
                Err(RecognizerError::Transform("Invert not implemented for Array4"))
            }
        }
    }
}

/// ITU-R 601-2 luma in 16-bit fixed point: `L = R * 299/1000 + G * 587/1000 + B * 114/1000`.
pub fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Luminance conversion. Images without color keep their own intensity; a single channel image
/// passes through untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grayscale {}

impl GenericTransform for Grayscale {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult> {
        match input {
            ImageTransformResult::Image(image) if image.color().has_color() => {
                let rgb = image.to_rgb8();
                let (width, height) = rgb.dimensions();
                let gray = GrayImage::from_fn(width, height, |x, y| {
                    let [r, g, b] = rgb.get_pixel(x, y).0;
                    Luma([luma_601(r, g, b)])
                });
                Ok(gray.into())
            }
            ImageTransformResult::Image(image) => Ok(image.to_luma8().into()),
            ImageTransformResult::GrayImage(image) => Ok(image.into()),
            ImageTransformResult::Array4(_) => {
                Err(RecognizerError::Transform("Grayscale not implemented for Array4"))
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResizeGrayImage {
    pub image_size: ImageSize,
    #[serde(with = "FilterOption")]
    pub filter: FilterType,
}

impl GenericTransform for ResizeGrayImage {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult> {
        match input {
            ImageTransformResult::GrayImage(image) => Ok(resize(
                &image,
                self.image_size.width as u32,
                self.image_size.height as u32,
                self.filter,
            )
            .into()),
            ImageTransformResult::Image(_) => {
                Err(RecognizerError::Transform("Image resize expects a gray image"))
            }
            ImageTransformResult::Array4(_) => {
                Err(RecognizerError::Transform("Image resize not implemented for Array4"))
            }
        }
    }
}

/// Lays a gray image out as `(1, height, width, 1)` raw intensities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToArray {}

impl GenericTransform for ToArray {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult> {
        match input {
            ImageTransformResult::GrayImage(image) => {
                let (width, height) = image.dimensions();
                let arr = tract_ndarray::Array4::from_shape_fn(
                    (1_usize, height as usize, width as usize, 1_usize),
                    |(_, y, x, _)| image[(x as _, y as _)][0] as f32,
                );
                Ok(ImageTransformResult::Array4(arr))
            }
            ImageTransformResult::Image(_) => {
                Err(RecognizerError::Transform("ToArray expects a gray image"))
            }
            // already an array
            ImageTransformResult::Array4(arr4) => Ok(ImageTransformResult::Array4(arr4)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Normalization {
    pub div: f32,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization {
            div: u8::MAX as f32,
        }
    }
}

impl GenericTransform for Normalization {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult> {
        match input {
            ImageTransformResult::Array4(arr) => {
                Ok(ImageTransformResult::Array4(arr / self.div))
            }
            _ => Err(RecognizerError::Transform("Normalization expects an Array4")),
        }
    }
}

pub enum ImageTransformResult {
    Image(DynamicImage),
    GrayImage(GrayImage),
    Array4(Array4<f32>),
}

impl From<DynamicImage> for ImageTransformResult {
    fn from(image: DynamicImage) -> Self {
        ImageTransformResult::Image(image)
    }
}

impl From<GrayImage> for ImageTransformResult {
    fn from(image: GrayImage) -> Self {
        ImageTransformResult::GrayImage(image)
    }
}
