use crate::analysis::rounding::{percentage_of, round_half_even};
use crate::annotations::detection::RawDetection;
use crate::config::{RenderConfig, TruckLoadParams};
use crate::error::AnalysisError;
use crate::image_utils::drawing::draw_overlay_text;
use crate::image_utils::image_codec::{decode, encode};
use crate::object_detection::object_detection_model::ObjectDetector;
use ab_glyph::FontArc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Label the detector vocabulary uses for trucks.
pub const TRUCK_LABEL: &str = "truck";

/// Fill, volume and weight estimate for one truck image.
///
/// Volume and weight are always derived from the fill percentage:
/// `round(fill / 100 * capacity, 1)`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TruckLoadStats {
    /// Within `0..=100`.
    pub fill_percentage: u8,
    pub estimated_volume_m3: f64,
    pub estimated_weight_tons: f64,
    pub truck_detected: bool,
}

impl TruckLoadStats {
    pub fn is_overloaded(&self, overload_percentage: u8) -> bool {
        self.fill_percentage > overload_percentage
    }

    /// Text burned into the annotated frame.
    pub fn overlay_text(&self) -> String {
        format!(
            "ANALYSIS: {}% FULL | VOL: {:.1}m3",
            self.fill_percentage, self.estimated_volume_m3
        )
    }
}

/// Estimates how full a truck is from the largest box the detector reported.
///
/// The largest box's share of the image, scaled by the fill correction, is taken as the
/// fill percentage and capped at 100. Any box that is a truck, or that is the largest seen
/// so far whatever its label, marks a truck as detected; a large debris pile alone is
/// enough to set the flag.
pub fn estimate_truck_load(
    detections: &[RawDetection],
    image_width: u32,
    image_height: u32,
    params: &TruckLoadParams,
) -> TruckLoadStats {
    let mut max_box_area: u64 = 0;
    let mut truck_detected = false;
    for detection in detections {
        let area = detection.annotation.pixel_area();
        if detection.label() == TRUCK_LABEL || area > max_box_area {
            truck_detected = true;
        }
        if area > max_box_area {
            max_box_area = area;
        }
    }

    let total_image_area = u64::from(image_width) * u64::from(image_height);
    let fill_percentage = if max_box_area == 0 {
        0
    } else {
        let raw_ratio = percentage_of(max_box_area, total_image_area);
        round_half_even(raw_ratio * params.fill_correction, 0).clamp(0.0, 100.0) as u8
    };

    let fill_fraction = f64::from(fill_percentage) / 100.0;
    TruckLoadStats {
        fill_percentage,
        estimated_volume_m3: round_half_even(fill_fraction * params.max_volume_m3, 1),
        estimated_weight_tons: round_half_even(fill_fraction * params.max_weight_tons, 1),
        truck_detected,
    }
}

/// Runs the detector on a truck photo and produces load stats plus an annotated frame.
pub struct TruckLoadEstimator<D: ObjectDetector> {
    detector: Arc<D>,
    params: TruckLoadParams,
    render: RenderConfig,
    font: FontArc,
}

impl<D: ObjectDetector> TruckLoadEstimator<D> {
    pub fn new(
        detector: Arc<D>,
        params: TruckLoadParams,
        render: RenderConfig,
        font: FontArc,
    ) -> Self {
        Self {
            detector,
            params,
            render,
            font,
        }
    }

    pub fn params(&self) -> &TruckLoadParams {
        &self.params
    }

    /// Decodes `image_bytes`, estimates the load and returns the stats with the boxed,
    /// captioned frame re-encoded.
    pub fn analyze_truck_load(
        &self,
        image_bytes: &[u8],
    ) -> Result<(TruckLoadStats, Vec<u8>), AnalysisError> {
        let image = decode(image_bytes)?;
        let (width, height) = (image.width(), image.height());
        let detections = self
            .detector
            .detect(&image.pixels, self.params.confidence_threshold)?;
        for detection in &detections {
            trace!("Truck view detection: {}", detection);
        }
        let stats = estimate_truck_load(&detections, width, height, &self.params);
        debug!(
            "Truck load: {} detections on {}x{} -> {:?}",
            detections.len(),
            width,
            height,
            stats
        );

        let mut annotated = self.detector.render_boxes(&image.pixels, &detections);
        draw_overlay_text(
            &mut annotated,
            &stats.overlay_text(),
            self.render.overlay_anchor,
            self.render.overlay_scale,
            &self.font,
        );
        let encoded = encode(&annotated, image.format, self.render.jpeg_quality)?;
        Ok((stats, encoded))
    }
}
