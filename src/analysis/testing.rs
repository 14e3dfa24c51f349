//! In-memory detector and fixtures for exercising the analysis paths without a model.

use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::RawDetection;
use crate::error::DetectorError;
use crate::image_utils::drawing::{BoxRenderer, BoxStyle, bundled_font};
use crate::object_detection::object_detection_model::ObjectDetector;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::Mutex;

pub fn raw(label: &str, confidence: f32, xyxy: (f32, f32, f32, f32)) -> RawDetection {
    RawDetection {
        annotation: BoundingBox::new(xyxy.0, xyxy.1, xyxy.2, xyxy.3, label.to_string()).unwrap(),
        confidence,
    }
}

/// A black image encoded in `format`.
pub fn encode_blank(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut bytes, format)
        .unwrap();
    bytes.into_inner()
}

/// Returns canned detections, filtered by the requested threshold, and records every
/// threshold it was called with.
pub struct FakeDetector {
    detections: Option<Vec<RawDetection>>,
    thresholds: Mutex<Vec<f32>>,
    renderer: BoxRenderer,
}

impl FakeDetector {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            detections: Some(detections),
            thresholds: Mutex::new(Vec::new()),
            renderer: BoxRenderer::new(
                BoxStyle {
                    thickness: 2,
                    label_scale: 12.0,
                },
                bundled_font().unwrap(),
            ),
        }
    }

    /// A detector whose inference always fails.
    pub fn failing() -> Self {
        Self {
            detections: None,
            ..Self::new(Vec::new())
        }
    }

    pub fn thresholds(&self) -> Vec<f32> {
        self.thresholds.lock().unwrap().clone()
    }
}

impl ObjectDetector for FakeDetector {
    fn detect(
        &self,
        _image: &RgbImage,
        confidence: f32,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        self.thresholds.lock().unwrap().push(confidence);
        let detections = self
            .detections
            .as_ref()
            .ok_or_else(|| DetectorError::Output("inference crashed".to_string()))?;
        Ok(detections
            .iter()
            .filter(|d| d.confidence > confidence)
            .cloned()
            .collect())
    }

    fn render_boxes(&self, image: &RgbImage, detections: &[RawDetection]) -> RgbImage {
        self.renderer.render(image, detections)
    }
}
