use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use load_scan::analysis::analyzer::{box_renderer, load_overlay_font};
use load_scan::object_detection::yolo::YoloDetector;
use load_scan::{AnalysisConfig, Analyzer};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "webp", "tiff"];

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file. Built-in defaults are used without one.
    #[arg(long, env = "LOAD_SCAN_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides the model path from the configuration.
    #[arg(long)]
    model: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the labeled objects found in each image.
    Inventory {
        /// Image file, or a directory searched recursively for images.
        path: PathBuf,
        /// Directory the annotated images are written to.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Estimate the fill level, volume and weight of a loading truck.
    TruckLoad {
        /// Image file, or a directory searched recursively for images.
        path: PathBuf,
        /// Directory the annotated images are written to.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {:?}", path))?,
        None => AnalysisConfig::default(),
    };
    if let Some(model) = args.model {
        config.model.path = model;
    }
    if !config.model.path.exists() {
        return Err(anyhow!(
            "Model path does not exist, or cannot be read: {:?}",
            config.model.path
        ));
    }

    let font = load_overlay_font(&config.render)?;
    let detector = YoloDetector::new(&config.model, box_renderer(&config.render, font.clone()))
        .context("failed to initialize the object detector")?;
    let analyzer = Analyzer::new(Arc::new(detector), &config, font);

    match args.command {
        Command::Inventory { path, out } => {
            for image_path in collect_images(&path)? {
                let bytes = std::fs::read(&image_path)
                    .with_context(|| format!("failed to read {:?}", image_path))?;
                let (detections, annotated) = analyzer
                    .format_detections(&bytes)
                    .with_context(|| format!("inventory failed for {:?}", image_path))?;
                write_annotated(out.as_deref(), &image_path, &annotated)?;
                println!(
                    "{}",
                    json!({"image": image_path, "detections": detections})
                );
            }
        }
        Command::TruckLoad { path, out } => {
            for image_path in collect_images(&path)? {
                let bytes = std::fs::read(&image_path)
                    .with_context(|| format!("failed to read {:?}", image_path))?;
                let (stats, annotated) = analyzer
                    .analyze_truck_load(&bytes)
                    .with_context(|| format!("truck load analysis failed for {:?}", image_path))?;
                if stats.is_overloaded(analyzer.overload_percentage()) {
                    warn!(
                        "{:?}: truck is {}% full, above the {}% limit",
                        image_path,
                        stats.fill_percentage,
                        analyzer.overload_percentage()
                    );
                }
                write_annotated(out.as_deref(), &image_path, &annotated)?;
                println!("{}", json!({"image": image_path, "stats": stats}));
            }
        }
    }
    Ok(())
}

/// A single file as given, or every image below a directory in a stable order.
fn collect_images(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut images = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {:?}", path))?;
        let is_image = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if entry.file_type().is_file() && is_image {
            images.push(entry.into_path());
        }
    }
    info!("Found {} images under {:?}", images.len(), path);
    Ok(images)
}

fn write_annotated(out_dir: Option<&Path>, image_path: &Path, annotated: &[u8]) -> Result<()> {
    let Some(out_dir) = out_dir else {
        return Ok(());
    };
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {:?}", out_dir))?;
    let extension = match image::guess_format(annotated) {
        Ok(image::ImageFormat::Png) => "png",
        _ => "jpg",
    };
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let target = out_dir.join(format!("{stem}_annotated.{extension}"));
    std::fs::write(&target, annotated).with_context(|| format!("failed to write {:?}", target))?;
    Ok(())
}
