use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::detection::RawDetection;
use crate::config::ModelConfig;
use crate::error::DetectorError;
use crate::image_utils::drawing::BoxRenderer;
use crate::image_utils::image_conversion::convert_rgb_image_to_owned_array;
use crate::image_utils::padding::letterbox;
use crate::object_detection::object_detection_model::ObjectDetector;
use crate::object_detection::object_detection_utils::{
    coco_class_names, non_maximum_suppression, read_classes_txt_file,
};
use crate::object_detection::ort_inference_session::{OrtInferenceSession, RawOutput};
use image::RgbImage;
use ndarray::{ArrayView2, Axis};
use std::time::Instant;
use tracing::{debug, info};

/// A YOLOv8/YOLOv11 detection head exported to ONNX.
///
/// The model takes a letterboxed `(1, 3, size, size)` tensor and produces
/// `(1, 4 + classes, proposals)`: box center, width and height followed by one score per
/// class for every proposal.
pub struct YoloDetector {
    ort_session: OrtInferenceSession,
    class_names: Vec<String>,
    input_size: u32,
    iou_threshold: f32,
    max_detections: usize,
    renderer: BoxRenderer,
}

impl YoloDetector {
    pub fn new(config: &ModelConfig, renderer: BoxRenderer) -> Result<Self, DetectorError> {
        let class_names = match &config.classes_path {
            Some(path) => read_classes_txt_file(path).map_err(|source| DetectorError::Classes {
                path: path.clone(),
                source,
            })?,
            None => coco_class_names(),
        };
        let ort_session = OrtInferenceSession::new(&config.path)?;
        info!(
            "YOLO detector ready: {} classes, {}px input",
            class_names.len(),
            config.input_size
        );
        Ok(YoloDetector {
            ort_session,
            class_names,
            input_size: config.input_size,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
            renderer,
        })
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(
        &self,
        image: &RgbImage,
        confidence: f32,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        let started = Instant::now();
        let letterboxed = letterbox(image, self.input_size);
        let input_array = convert_rgb_image_to_owned_array(&letterboxed.image);
        let output = self.ort_session.run(input_array)?;
        let candidates = decode_predictions(
            &output,
            &self.class_names,
            confidence,
            letterboxed.scale,
            image.dimensions(),
        )?;
        let candidate_count = candidates.len();
        let mut detections = non_maximum_suppression(candidates, self.iou_threshold);
        detections.truncate(self.max_detections);
        debug!(
            "YOLO inference: {} candidates, {} after NMS in {:?}",
            candidate_count,
            detections.len(),
            started.elapsed()
        );
        Ok(detections)
    }

    fn render_boxes(&self, image: &RgbImage, detections: &[RawDetection]) -> RgbImage {
        self.renderer.render(image, detections)
    }
}

/// Turns the raw output tensor into detections in source-image pixels.
///
/// Only scores strictly above `confidence` are kept. `scale` is the letterbox factor the
/// input was resized by; boxes are clipped to `image_size` and empty ones are dropped.
/// No suppression happens here.
pub fn decode_predictions(
    output: &RawOutput,
    class_names: &[String],
    confidence: f32,
    scale: f32,
    image_size: (u32, u32),
) -> Result<Vec<RawDetection>, DetectorError> {
    let &[batch, rows, proposals] = output.shape.as_slice() else {
        return Err(DetectorError::Output(format!(
            "expected a rank 3 output, got shape {:?}",
            output.shape
        )));
    };
    if batch != 1 || rows <= 4 {
        return Err(DetectorError::Output(format!(
            "expected shape (1, 4 + classes, proposals), got {:?}",
            output.shape
        )));
    }
    let predictions = ArrayView2::from_shape((rows, proposals), &output.data)
        .map_err(|e| DetectorError::Output(e.to_string()))?;

    let mut detections: Vec<RawDetection> = Vec::new();
    for row in predictions.t().axis_iter(Axis(0)) {
        let Some((class_id, prob)) = row
            .iter()
            .skip(4) // skips bounding box coords.
            .copied()
            .enumerate()
            .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
        else {
            continue;
        };
        if prob <= confidence {
            continue;
        }
        let label = match class_names.get(class_id) {
            Some(v) => v.clone(),
            None => class_id.to_string(),
        };
        let (x, y, w, h) = (row[0], row[1], row[2], row[3]);
        let Ok(mut bbox) = BoundingBox::new(
            (x - (w / 2.0)) / scale,
            (y - (h / 2.0)) / scale,
            (x + (w / 2.0)) / scale,
            (y + (h / 2.0)) / scale,
            label,
        ) else {
            continue;
        };
        bbox.clip_to(image_size.0, image_size.1);
        if bbox.area() <= 0.0 {
            continue;
        }
        detections.push(RawDetection {
            annotation: bbox,
            confidence: prob,
        });
    }
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lays out proposals the way the model does: one row per field, one column per
    /// proposal.
    fn output_from_proposals(proposals: &[[f32; 6]]) -> RawOutput {
        let rows = 6;
        let mut data = vec![0.0; rows * proposals.len()];
        for (column, proposal) in proposals.iter().enumerate() {
            for (row, value) in proposal.iter().enumerate() {
                data[row * proposals.len() + column] = *value;
            }
        }
        RawOutput {
            shape: vec![1, rows, proposals.len()],
            data,
        }
    }

    fn names() -> Vec<String> {
        vec!["truck".to_string(), "bottle".to_string()]
    }

    #[test]
    fn decodes_and_rescales_boxes() {
        // cx, cy, w, h, truck score, bottle score
        let output = output_from_proposals(&[
            [32.0, 32.0, 20.0, 10.0, 0.9, 0.1],
            [10.0, 10.0, 4.0, 4.0, 0.05, 0.4],
            [50.0, 50.0, 4.0, 4.0, 0.1, 0.1],
        ]);
        let detections = decode_predictions(&output, &names(), 0.25, 0.5, (200, 200)).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label(), "truck");
        assert_eq!(detections[0].annotation.as_xyxy(), (44.0, 54.0, 84.0, 74.0));
        assert_eq!(detections[1].label(), "bottle");
        assert_eq!(detections[1].confidence, 0.4);
    }

    #[test]
    fn scores_equal_to_the_threshold_are_dropped() {
        let output = output_from_proposals(&[
            [10.0, 10.0, 4.0, 4.0, 0.25, 0.0],
            [30.0, 30.0, 4.0, 4.0, 0.26, 0.0],
        ]);
        let detections = decode_predictions(&output, &names(), 0.25, 1.0, (100, 100)).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].confidence, 0.26);
    }

    #[test]
    fn clips_to_image_and_drops_empty_boxes() {
        let output = output_from_proposals(&[
            [0.0, 0.0, 10.0, 10.0, 0.9, 0.0],
            [300.0, 300.0, 10.0, 10.0, 0.9, 0.0],
        ]);
        let detections = decode_predictions(&output, &names(), 0.25, 1.0, (100, 100)).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].annotation.as_xyxy(), (0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn unknown_class_ids_fall_back_to_the_number() {
        let output = output_from_proposals(&[[5.0, 5.0, 2.0, 2.0, 0.0, 0.7]]);
        let names = vec!["truck".to_string()];
        let detections = decode_predictions(&output, &names, 0.25, 1.0, (10, 10)).unwrap();
        assert_eq!(detections[0].label(), "1");
    }

    #[test]
    fn rejects_unexpected_shapes() {
        let output = RawOutput {
            shape: vec![1, 4, 2],
            data: vec![0.0; 8],
        };
        assert!(matches!(
            decode_predictions(&output, &names(), 0.25, 1.0, (10, 10)),
            Err(DetectorError::Output(_))
        ));
        let output = RawOutput {
            shape: vec![6, 2],
            data: vec![0.0; 12],
        };
        assert!(decode_predictions(&output, &names(), 0.25, 1.0, (10, 10)).is_err());
    }
}
