use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::analysis::rounding::round_half_even;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw detection is what is produced as output from an object detection model.
///
/// It is a bounding box combined with a confidence score: a probability value that
/// encodes the model's belief that the detection is true. Raw detections only live for
/// the duration of a single analysis call.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    pub annotation: BoundingBox,
    pub confidence: f32,
}

impl RawDetection {
    pub fn label(&self) -> &str {
        self.annotation.category()
    }
}

impl fmt::Display for RawDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.annotation, self.confidence)
    }
}

/// A labeled object as shown to consumers of the inventory view.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Detection {
    #[serde(rename = "type")]
    pub object_type: String,
    /// Rounded to two decimals, always within `[0.00, 1.00]`.
    pub confidence: f64,
}

impl From<&RawDetection> for Detection {
    fn from(raw: &RawDetection) -> Self {
        let confidence = round_half_even(f64::from(raw.confidence), 2).clamp(0.0, 1.0);
        Detection {
            object_type: raw.label().to_string(),
            confidence,
        }
    }
}
