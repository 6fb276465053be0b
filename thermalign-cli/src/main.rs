//! Batch driver: aligns every thermal/RGB pair found in a directory.
//!
//! For each `<base>_T.JPG` / `<base>_Z.JPG` pair the driver decodes both
//! images, runs the alignment engine, writes the result as `<base>_AT.JPG`,
//! and copies the untouched RGB file alongside it for overlaying.
//! Unreadable or unpaired files are logged and skipped; the batch never
//! aborts on a single bad pair.

use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use thermalign::io as raster_io;
use thermalign::{align_with_config, AlignConfig, DetectorConfig, RansacConfig};
use tracing_subscriber::EnvFilter;

mod pairs;
use pairs::{find_pairs, ImagePair};

#[derive(Parser, Debug)]
#[command(author, version, about = "Align thermal images to their RGB counterparts")]
struct Cli {
    /// Input folder containing image pairs.
    #[arg(short, long, value_name = "DIR", default_value = "input-images")]
    input: PathBuf,
    /// Output folder for aligned thermal images.
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output: PathBuf,
    /// Good matches required to attempt the geometric path.
    #[arg(long, default_value_t = 10)]
    min_matches: usize,
    /// Lowe ratio-test threshold.
    #[arg(long, default_value_t = 0.75)]
    ratio: f32,
    /// RANSAC reprojection threshold in pixels.
    #[arg(long, default_value_t = 5.0)]
    reproj: f64,
    /// Keypoint cap per image.
    #[arg(long, default_value_t = 2000)]
    max_features: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if !cli.input.is_dir() {
        return Err(format!("input directory not found: {}", cli.input.display()).into());
    }
    fs::create_dir_all(&cli.output)?;

    let config = AlignConfig {
        detector: DetectorConfig {
            max_features: cli.max_features,
            ..DetectorConfig::default()
        },
        ratio_threshold: cli.ratio,
        min_good_matches: cli.min_matches,
        ransac: RansacConfig {
            reproj_threshold: cli.reproj,
            ..RansacConfig::default()
        },
    };

    let pairs = find_pairs(&cli.input)?;
    if pairs.is_empty() {
        tracing::warn!(input = %cli.input.display(), "no image pairs found");
        return Ok(());
    }

    let mut processed = 0usize;
    for pair in &pairs {
        match process_pair(pair, &cli.output, &config) {
            Ok(()) => processed += 1,
            Err(err) => tracing::warn!(base = %pair.base, error = %err, "skipping pair"),
        }
    }
    tracing::info!(processed, total = pairs.len(), "batch finished");
    Ok(())
}

fn process_pair(
    pair: &ImagePair,
    output: &Path,
    config: &AlignConfig,
) -> Result<(), Box<dyn Error>> {
    let thermal = raster_io::load_raster(&pair.thermal)?;
    let rgb = raster_io::load_raster(&pair.rgb)?;
    let aligned = align_with_config(&thermal, &rgb, config)?;

    let aligned_path = output.join(format!("{}_AT.JPG", pair.base));
    raster_io::save_raster(&aligned_path, &aligned)?;

    // Copy the untouched RGB next to the aligned thermal for overlaying.
    let rgb_name = pair.rgb.file_name().ok_or("rgb path has no file name")?;
    fs::copy(&pair.rgb, output.join(rgb_name))?;

    tracing::info!(aligned = %aligned_path.display(), "wrote aligned thermal");
    Ok(())
}
