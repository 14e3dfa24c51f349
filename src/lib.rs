//! Turns object-detector output for a single image into domain statistics: a labeled
//! inventory for monitoring, and a fill/volume/weight estimate for a loading truck.

pub mod analysis;
pub mod annotations;
pub mod config;
pub mod error;
pub mod image_utils;
pub mod object_detection;

pub use analysis::analyzer::Analyzer;
pub use analysis::truck_load::TruckLoadStats;
pub use annotations::detection::{Detection, RawDetection};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, ConfigError, DetectorError};
pub use object_detection::object_detection_model::ObjectDetector;
