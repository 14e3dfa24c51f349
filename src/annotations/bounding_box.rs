use serde::{Deserialize, Serialize};
use std::fmt;

/// A struct representing a bounding box.
///
/// A bounding box is the axis-aligned rectangle a detection model draws around an object,
/// together with the category the model assigned to it. Coordinates are in pixel space of
/// the source image, using the convention that the left side of the image is x=0 and the
/// top of the image is y=0.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    category: String,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        category: String,
    ) -> Result<Self, String> {
        if !(left.is_finite() && top.is_finite() && right.is_finite() && bottom.is_finite()) {
            Err(format!(
                "Failed to create BoundingBox, non-finite coordinate in ({}, {}, {}, {}).",
                left, top, right, bottom
            ))
        } else if left > right {
            Err(format!(
                "Failed to create BoundingBox, value for left > value for right ({} > {}).",
                left, right
            ))
        } else if top > bottom {
            Err(format!(
                "Failed to create BoundingBox, value for top > value for bottom ({} > {}).",
                top, bottom
            ))
        } else {
            Ok(BoundingBox {
                left,
                top,
                right,
                bottom,
                category,
            })
        }
    }

    /// Clips the box to `[0, width] x [0, height]`.
    pub fn clip_to(&mut self, width: u32, height: u32) {
        let (w, h) = (width as f32, height as f32);
        self.left = self.left.clamp(0.0, w);
        self.right = self.right.clamp(0.0, w);
        self.top = self.top.clamp(0.0, h);
        self.bottom = self.bottom.clamp(0.0, h);
    }

    /// Area of the box after truncating every coordinate to a whole pixel.
    ///
    /// The load heuristic works on integer pixel boxes, so `(10.9, 0) - (20.2, 1)` covers
    /// `(20 - 10) * (1 - 0) = 10` pixels here, not `9.3`.
    pub fn pixel_area(&self) -> u64 {
        let (x1, y1, x2, y2) = self.as_pixel_xyxy();
        u64::from(x2.saturating_sub(x1)) * u64::from(y2.saturating_sub(y1))
    }

    /// Coordinates truncated toward zero.
    pub fn as_pixel_xyxy(&self) -> (u32, u32, u32, u32) {
        (
            self.left.max(0.0) as u32,
            self.top.max(0.0) as u32,
            self.right.max(0.0) as u32,
            self.bottom.max(0.0) as u32,
        )
    }
}

/// Read access to the geometry of anything carrying a bounding box.
pub trait BoundingBoxGeometry {
    fn left(&self) -> f32;
    fn top(&self) -> f32;
    fn right(&self) -> f32;
    fn bottom(&self) -> f32;
    fn category(&self) -> &str;

    fn width(&self) -> f32 {
        self.right() - self.left()
    }

    fn height(&self) -> f32 {
        self.bottom() - self.top()
    }

    fn area(&self) -> f32 {
        self.width() * self.height()
    }

    fn as_xyxy(&self) -> (f32, f32, f32, f32) {
        (self.left(), self.top(), self.right(), self.bottom())
    }

    fn intersection_over_union(&self, other: &impl BoundingBoxGeometry) -> f32 {
        let intersection_width = (self.right().min(other.right())
            - self.left().max(other.left()))
        .max(0.0);
        let intersection_height = (self.bottom().min(other.bottom())
            - self.top().max(other.top()))
        .max(0.0);
        let intersection = intersection_width * intersection_height;
        if intersection == 0.0 {
            return 0.0;
        }
        intersection / (self.area() + other.area() - intersection)
    }
}

impl BoundingBoxGeometry for BoundingBox {
    fn left(&self) -> f32 {
        self.left
    }

    fn top(&self) -> f32 {
        self.top
    }

    fn right(&self) -> f32 {
        self.right
    }

    fn bottom(&self) -> f32 {
        self.bottom
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.1}, {:.1}, {:.1}, {:.1}]",
            self.category, self.left, self.top, self.right, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_boxes() {
        assert!(BoundingBox::new(5.0, 0.0, 1.0, 1.0, "truck".to_string()).is_err());
        assert!(BoundingBox::new(0.0, 5.0, 1.0, 1.0, "truck".to_string()).is_err());
        assert!(BoundingBox::new(0.0, 0.0, f32::NAN, 1.0, "truck".to_string()).is_err());
    }

    #[test]
    fn pixel_area_truncates_coordinates() {
        let bbox = BoundingBox::new(10.9, 0.0, 20.2, 1.7, "bottle".to_string()).unwrap();
        assert_eq!(bbox.pixel_area(), 10);
        let bbox = BoundingBox::new(100.0, 100.0, 400.0, 400.0, "truck".to_string()).unwrap();
        assert_eq!(bbox.pixel_area(), 90_000);
    }

    #[test]
    fn clip_to_image_bounds() {
        let mut bbox = BoundingBox::new(-4.0, -2.0, 120.0, 80.0, "car".to_string()).unwrap();
        bbox.clip_to(100, 50);
        assert_eq!(bbox.as_xyxy(), (0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn iou_of_partially_overlapping_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 4.0, 4.0, "a".to_string()).unwrap();
        let b = BoundingBox::new(2.0, 0.0, 6.0, 4.0, "a".to_string()).unwrap();
        let c = BoundingBox::new(10.0, 10.0, 11.0, 11.0, "a".to_string()).unwrap();
        assert!((a.intersection_over_union(&b) - 8.0 / 24.0).abs() < 1e-6);
        assert_eq!(a.intersection_over_union(&c), 0.0);
    }
}
