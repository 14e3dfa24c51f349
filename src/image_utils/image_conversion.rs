use image::RgbImage;
use ndarray::Array4;

/// Converts an rgb8 image into the `(1, 3, height, width)` float tensor detection models
/// take as input, with every channel scaled into `[0, 1]`.
pub fn convert_rgb_image_to_owned_array(rgb_image: &RgbImage) -> Array4<f32> {
    let mut image_array = Array4::zeros((
        1,
        3,
        rgb_image.height() as usize,
        rgb_image.width() as usize,
    ));
    for (x, y, pixel) in rgb_image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let [r, g, b] = pixel.0;
        image_array[[0, 0, y, x]] = (r as f32) / 255.;
        image_array[[0, 1, y, x]] = (g as f32) / 255.;
        image_array[[0, 2, y, x]] = (b as f32) / 255.;
    }
    image_array
}
