use std::str::FromStr;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

use crate::error::PredictError;

/// Side length of the square model input.
pub const INPUT_SIZE: u32 = 224;

// Clients are not consistent about padding, accept both.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How an arbitrary image is brought to `INPUT_SIZE` x `INPUT_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Scale both axes independently, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Scale the longer side to fit and pad the rest with black.
    Letterbox,
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stretch" => Ok(ResizeMode::Stretch),
            "letterbox" => Ok(ResizeMode::Letterbox),
            other => Err(format!("unknown resize mode: {other}")),
        }
    }
}

/// Decodes the base64 payload, tolerating a `data:` URL prefix and
/// embedded whitespace.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, PredictError> {
    let payload = match text.trim_start().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => text,
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(LENIENT_BASE64.decode(compact)?)
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, PredictError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

pub fn resize(image: &RgbImage, mode: ResizeMode) -> RgbImage {
    match mode {
        ResizeMode::Stretch => {
            imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        }
        ResizeMode::Letterbox => letterbox(image),
    }
}

fn letterbox(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();

    let (new_width, new_height) = if width > height {
        (INPUT_SIZE, scale_side(height, width))
    } else {
        (scale_side(width, height), INPUT_SIZE)
    };
    let resized = imageops::resize(image, new_width, new_height, FilterType::CatmullRom);

    let mut canvas = RgbImage::new(INPUT_SIZE, INPUT_SIZE);
    let pad_x = (INPUT_SIZE - new_width) / 2;
    let pad_y = (INPUT_SIZE - new_height) / 2;

    for (x, y, pixel) in resized.enumerate_pixels() {
        canvas.put_pixel(x + pad_x, y + pad_y, *pixel);
    }

    canvas
}

// Shorter side after scaling the longer one to INPUT_SIZE, never zero.
fn scale_side(short: u32, long: u32) -> u32 {
    let scaled = u64::from(INPUT_SIZE) * u64::from(short) / u64::from(long);
    (scaled as u32).clamp(1, INPUT_SIZE)
}

/// NHWC float tensor with a leading batch axis, pixel values in `[0, 1]`.
pub fn to_input_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    Array4::from_shape_fn(
        (1, height as usize, width as usize, 3),
        |(_, y, x, c)| f32::from(image.get_pixel(x as u32, y as u32)[c]) / 255.0,
    )
}

/// Full chain from the request's base64 text to the model input.
pub fn prepare(encoded: &str, mode: ResizeMode) -> Result<Array4<f32>, PredictError> {
    let bytes = decode_base64(encoded)?;
    let image = decode_image(&bytes)?;
    log::debug!(
        "decoded {} bytes into a {}x{} image",
        bytes.len(),
        image.width(),
        image.height()
    );
    Ok(to_input_tensor(&resize(&image, mode)))
}
