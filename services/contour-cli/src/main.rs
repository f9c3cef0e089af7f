//! Contour renderer.
//!
//! Reads an image, stamps marching-squares contours into it on a fixed pool
//! of workers and writes the result. Stencils are read from `./contours`;
//! logging follows `RUST_LOG` and defaults to `info`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use contour_cli::init_tracing;
use marching::config::MAX_WORKERS;
use marching::{ContourPipeline, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "contour")]
#[command(about = "Render marching-squares contours into an image")]
struct Args {
    /// Input image (PPM or any format recognized by extension)
    input: PathBuf,

    /// Output image
    output: PathBuf,

    /// Number of worker threads
    #[arg(value_parser = clap::value_parser!(u16).range(1..=MAX_WORKERS as i64))]
    workers: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("info");

    let config = PipelineConfig::default().with_workers(args.workers.into());
    let pipeline = ContourPipeline::new(config).context("Failed to start contour pipeline")?;

    let image = raster::read_image(&args.input)
        .with_context(|| format!("Failed to read input image {}", args.input.display()))?;

    let output = pipeline.run(image).context("Contour pipeline failed")?;

    raster::write_image(&output.image, &args.output)
        .with_context(|| format!("Failed to write output image {}", args.output.display()))?;

    let s = &output.summary;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        width = s.output_width,
        height = s.output_height,
        rescaled = s.rescaled,
        grid = %format!("{}x{}", s.grid_cols, s.grid_rows),
        workers = s.workers,
        elapsed_ms = s.elapsed.as_millis() as u64,
        "Wrote contour image"
    );

    Ok(())
}
