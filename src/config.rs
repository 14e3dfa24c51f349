//! Tunable constants and the TOML configuration they can be overridden from.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "./data/models/yolov8n.onnx";
pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

/// Inventory view: suppresses low-confidence noise.
pub const DEFAULT_INVENTORY_CONFIDENCE: f32 = 0.25;

/// Truck view: partially occluded loads score low, and a missed positive costs more than
/// a false one.
pub const DEFAULT_TRUCK_CONFIDENCE: f32 = 0.15;
/// Compensates for camera-angle foreshortening of the load volume.
pub const DEFAULT_FILL_CORRECTION: f64 = 1.5;
pub const DEFAULT_MAX_VOLUME_M3: f64 = 20.0;
pub const DEFAULT_MAX_WEIGHT_TONS: f64 = 12.0;
pub const DEFAULT_OVERLOAD_PERCENTAGE: u8 = 80;

pub const DEFAULT_BOX_THICKNESS: u32 = 2;
pub const DEFAULT_OVERLAY_ANCHOR: (i32, i32) = (20, 50);
pub const DEFAULT_OVERLAY_SCALE: f32 = 32.0;
pub const DEFAULT_LABEL_SCALE: f32 = 16.0;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub model: ModelConfig,
    pub inventory: InventoryConfig,
    pub truck: TruckLoadParams,
    pub render: RenderConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// One class name per line. The COCO names are used when absent.
    pub classes_path: Option<PathBuf>,
    pub input_size: u32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            classes_path: None,
            input_size: DEFAULT_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub confidence_threshold: f32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_INVENTORY_CONFIDENCE,
        }
    }
}

/// Parameters of the truck fill heuristic.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct TruckLoadParams {
    pub confidence_threshold: f32,
    pub fill_correction: f64,
    pub max_volume_m3: f64,
    pub max_weight_tons: f64,
    /// Fill percentage above which a load is reported as overloaded.
    pub overload_percentage: u8,
}

impl Default for TruckLoadParams {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_TRUCK_CONFIDENCE,
            fill_correction: DEFAULT_FILL_CORRECTION,
            max_volume_m3: DEFAULT_MAX_VOLUME_M3,
            max_weight_tons: DEFAULT_MAX_WEIGHT_TONS,
            overload_percentage: DEFAULT_OVERLOAD_PERCENTAGE,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// TTF/OTF font for captions and the load overlay, replacing the bundled DejaVu Sans.
    pub font_path: Option<PathBuf>,
    pub box_thickness: u32,
    pub overlay_anchor: (i32, i32),
    pub overlay_scale: f32,
    pub label_scale: f32,
    pub jpeg_quality: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            box_thickness: DEFAULT_BOX_THICKNESS,
            overlay_anchor: DEFAULT_OVERLAY_ANCHOR,
            overlay_scale: DEFAULT_OVERLAY_SCALE,
            label_scale: DEFAULT_LABEL_SCALE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl AnalysisConfig {
    /// Reads and validates a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_range = |name: &str, value: f32| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )))
            }
        };
        unit_range("model.iou_threshold", self.model.iou_threshold)?;
        unit_range(
            "inventory.confidence_threshold",
            self.inventory.confidence_threshold,
        )?;
        unit_range("truck.confidence_threshold", self.truck.confidence_threshold)?;

        if self.model.input_size == 0 {
            return Err(ConfigError::Invalid(
                "model.input_size must be non-zero".to_string(),
            ));
        }
        for (name, value) in [
            ("truck.fill_correction", self.truck.fill_correction),
            ("truck.max_volume_m3", self.truck.max_volume_m3),
            ("truck.max_weight_tons", self.truck.max_weight_tons),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.truck.overload_percentage > 100 {
            return Err(ConfigError::Invalid(
                "truck.overload_percentage must be within 0..=100".to_string(),
            ));
        }
        if !(1..=100).contains(&self.render.jpeg_quality) {
            return Err(ConfigError::Invalid(
                "render.jpeg_quality must be within 1..=100".to_string(),
            ));
        }
        Ok(())
    }
}
