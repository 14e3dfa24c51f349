use crate::error::AnalysisError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::error::{ParameterError, ParameterErrorKind};
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat, RgbImage};

/// Pixels decoded from an inbound byte stream, plus the container format they came in.
#[derive(Debug)]
pub struct DecodedImage {
    pub pixels: RgbImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Decodes any format `image` can sniff from the leading bytes into 8-bit RGB.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, AnalysisError> {
    let format = image::guess_format(bytes).map_err(AnalysisError::ImageDecode)?;
    let pixels = image::load_from_memory_with_format(bytes, format)
        .map_err(AnalysisError::ImageDecode)?
        .into_rgb8();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(AnalysisError::ImageDecode(ImageError::Parameter(
            ParameterError::from_kind(ParameterErrorKind::DimensionMismatch),
        )));
    }
    Ok(DecodedImage { pixels, format })
}

/// Format an annotated frame is sent back in: PNG stays lossless, anything else is JPEG.
pub fn output_format(input_format: ImageFormat) -> ImageFormat {
    match input_format {
        ImageFormat::Png => ImageFormat::Png,
        _ => ImageFormat::Jpeg,
    }
}

/// Compresses `pixels` in the output format matching `input_format`.
pub fn encode(
    pixels: &RgbImage,
    input_format: ImageFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, AnalysisError> {
    let mut encoded: Vec<u8> = Vec::new();
    let (width, height) = pixels.dimensions();
    let result = match output_format(input_format) {
        ImageFormat::Png => PngEncoder::new(&mut encoded).write_image(
            pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
        _ => JpegEncoder::new_with_quality(&mut encoded, jpeg_quality).write_image(
            pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
    };
    result.map_err(AnalysisError::ImageEncode)?;
    Ok(encoded)
}
