use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Gray used by YOLO-family models for letterbox borders.
pub const LETTERBOX_FILL: Rgb<u8> = Rgb([114, 114, 114]);

/// An image resized into a square model input, and the factor it was scaled by.
pub struct Letterbox {
    pub image: RgbImage,
    /// Model-input pixels per source pixel.
    pub scale: f32,
}

/// Pads an rgb8 image by adding pixels to the right and bottom of the image.
pub fn pad_right_bottom_img_rbg8(
    original_image: &RgbImage,
    new_width: u32,
    new_height: u32,
    fill: Rgb<u8>,
) -> RgbImage {
    let mut padded_image: RgbImage = RgbImage::from_pixel(new_width, new_height, fill);
    for (x, y, pixel) in original_image.enumerate_pixels() {
        if x < new_width && y < new_height {
            padded_image.put_pixel(x, y, *pixel);
        }
    }
    padded_image
}

/// Scales `original_image` so its longer side is `size`, keeping the aspect ratio, then
/// pads it into a `size` x `size` square anchored at the top-left corner. Box coordinates
/// predicted on the result map back to the source by dividing by `scale`.
pub fn letterbox(original_image: &RgbImage, size: u32) -> Letterbox {
    let (width, height) = original_image.dimensions();
    let scale = size as f32 / width.max(height) as f32;
    let new_width = ((width as f32 * scale).round() as u32).clamp(1, size);
    let new_height = ((height as f32 * scale).round() as u32).clamp(1, size);
    let resized = if (new_width, new_height) == (width, height) {
        original_image.clone()
    } else {
        imageops::resize(original_image, new_width, new_height, FilterType::Triangle)
    };
    Letterbox {
        image: pad_right_bottom_img_rbg8(&resized, size, size, LETTERBOX_FILL),
        scale,
    }
}
