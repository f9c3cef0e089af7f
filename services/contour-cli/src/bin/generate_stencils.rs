//! Writes the sixteen marching-squares stencils the `contour` binary reads.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use contour_cli::init_tracing;
use marching::config::{DEFAULT_STENCIL_DIR, DEFAULT_STEP};
use marching::StencilSet;

#[derive(Parser, Debug)]
#[command(name = "generate-stencils")]
#[command(about = "Generate the marching-squares stencil images 0.ppm .. 15.ppm")]
struct Args {
    /// Output directory, created if missing
    #[arg(default_value = DEFAULT_STENCIL_DIR)]
    dir: PathBuf,

    /// Stencil size in pixels (the contour sample step)
    #[arg(long, default_value_t = DEFAULT_STEP as u16, value_parser = clap::value_parser!(u16).range(1..))]
    step: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("info");

    let step = usize::from(args.step);
    let stencils = StencilSet::synthesize(step, step)
        .with_context(|| format!("Failed to draw {step}x{step} stencils"))?;
    stencils
        .save(&args.dir)
        .with_context(|| format!("Failed to write stencils to {}", args.dir.display()))?;

    info!(dir = %args.dir.display(), step, "Wrote stencil set");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["generate-stencils"]).unwrap();
        assert_eq!(args.dir, PathBuf::from(DEFAULT_STENCIL_DIR));
        assert_eq!(usize::from(args.step), DEFAULT_STEP);
    }

    #[test]
    fn test_step_flag() {
        let args = Args::try_parse_from(["generate-stencils", "out", "--step", "16"]).unwrap();
        assert_eq!(args.dir, PathBuf::from("out"));
        assert_eq!(args.step, 16);
        assert!(Args::try_parse_from(["generate-stencils", "out", "--step", "0"]).is_err());
    }
}
