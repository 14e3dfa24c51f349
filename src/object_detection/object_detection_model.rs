use crate::annotations::detection::RawDetection;
use crate::error::DetectorError;
use image::RgbImage;

/// Defines a trait that all object detection models must follow.
///
/// A detector is loaded once and shared across analysis calls, so implementations must be
/// safe to call from several threads at once. Whether concurrent calls actually run in
/// parallel is up to the implementation.
pub trait ObjectDetector: Send + Sync {
    /// Returns every object scoring at least `confidence`, in pixel coordinates of
    /// `image`, ordered by descending confidence.
    fn detect(&self, image: &RgbImage, confidence: f32) -> Result<Vec<RawDetection>, DetectorError>;

    /// Returns a copy of `image` with `detections` drawn onto it.
    fn render_boxes(&self, image: &RgbImage, detections: &[RawDetection]) -> RgbImage;
}
