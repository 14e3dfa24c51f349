use crate::analysis::detection_formatter::DetectionFormatter;
use crate::analysis::truck_load::{TruckLoadEstimator, TruckLoadStats};
use crate::annotations::detection::Detection;
use crate::config::{AnalysisConfig, RenderConfig};
use crate::error::{AnalysisError, ConfigError};
use crate::image_utils::drawing::{BoxRenderer, BoxStyle, bundled_font, load_font};
use crate::object_detection::object_detection_model::ObjectDetector;
use ab_glyph::FontArc;
use std::sync::Arc;
use tracing::info;

/// The caption/overlay font: the one named in the config, or the bundled one.
pub fn load_overlay_font(render: &RenderConfig) -> Result<FontArc, ConfigError> {
    match &render.font_path {
        Some(path) => {
            let font = load_font(path)?;
            info!("Loaded overlay font from {:?}", path);
            Ok(font)
        }
        None => bundled_font(),
    }
}

/// Box renderer matching the config's render section.
pub fn box_renderer(render: &RenderConfig, font: FontArc) -> BoxRenderer {
    BoxRenderer::new(
        BoxStyle {
            thickness: render.box_thickness,
            label_scale: render.label_scale,
        },
        font,
    )
}

/// Both consumer-facing operations over one shared detector.
///
/// The detector is loaded once by the caller and handed in; every call only reads it.
pub struct Analyzer<D: ObjectDetector> {
    formatter: DetectionFormatter<D>,
    estimator: TruckLoadEstimator<D>,
}

impl<D: ObjectDetector> Analyzer<D> {
    pub fn new(detector: Arc<D>, config: &AnalysisConfig, font: FontArc) -> Self {
        let formatter = DetectionFormatter::new(
            Arc::clone(&detector),
            config.inventory.confidence_threshold,
            config.render.jpeg_quality,
        );
        let estimator =
            TruckLoadEstimator::new(detector, config.truck.clone(), config.render.clone(), font);
        Self {
            formatter,
            estimator,
        }
    }

    pub fn format_detections(
        &self,
        image_bytes: &[u8],
    ) -> Result<(Vec<Detection>, Vec<u8>), AnalysisError> {
        self.formatter.format_detections(image_bytes)
    }

    pub fn analyze_truck_load(
        &self,
        image_bytes: &[u8],
    ) -> Result<(TruckLoadStats, Vec<u8>), AnalysisError> {
        self.estimator.analyze_truck_load(image_bytes)
    }

    pub fn overload_percentage(&self) -> u8 {
        self.estimator.params().overload_percentage
    }
}
