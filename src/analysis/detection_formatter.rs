use crate::annotations::detection::Detection;
use crate::error::AnalysisError;
use crate::image_utils::image_codec::{decode, encode};
use crate::object_detection::object_detection_model::ObjectDetector;
use itertools::Itertools;
use std::sync::Arc;
use tracing::debug;

/// Builds the labeled-object inventory for the monitoring view.
pub struct DetectionFormatter<D: ObjectDetector> {
    detector: Arc<D>,
    confidence_threshold: f32,
    jpeg_quality: u8,
}

impl<D: ObjectDetector> DetectionFormatter<D> {
    pub fn new(detector: Arc<D>, confidence_threshold: f32, jpeg_quality: u8) -> Self {
        Self {
            detector,
            confidence_threshold,
            jpeg_quality,
        }
    }

    /// One `Detection` per object found, in the detector's order, and the frame with the
    /// detector's boxes drawn on it. An image with nothing in it gives an empty list and
    /// an unmarked frame.
    pub fn format_detections(
        &self,
        image_bytes: &[u8],
    ) -> Result<(Vec<Detection>, Vec<u8>), AnalysisError> {
        let image = decode(image_bytes)?;
        let raw_detections = self
            .detector
            .detect(&image.pixels, self.confidence_threshold)?;
        let detections: Vec<Detection> = raw_detections.iter().map(Detection::from).collect();
        debug!(
            "Inventory: {}",
            detections
                .iter()
                .map(|d| d.object_type.as_str())
                .counts()
                .into_iter()
                .sorted()
                .map(|(label, count)| format!("{label} x{count}"))
                .join(", ")
        );

        let annotated = self.detector.render_boxes(&image.pixels, &raw_detections);
        let encoded = encode(&annotated, image.format, self.jpeg_quality)?;
        Ok((detections, encoded))
    }
}
