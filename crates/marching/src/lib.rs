//! Marching-squares contour rendering over a fixed worker pool.
//!
//! The pipeline runs four phases, each split across N workers by
//! [`partition::partition_range`] and separated by barriers:
//!
//! 1. stencil loading ([`stencil`])
//! 2. optional bicubic downscale ([`rescale`]), only when the input exceeds
//!    the configured maximum resolution
//! 3. occupancy grid sampling ([`grid`])
//! 4. contour stamping ([`march`])
//!
//! Workers share the image, grid and stencil slots without locks. Each phase
//! hands every worker a disjoint index range, see [`shared::PhaseBuffer`].

pub mod config;
pub mod error;
pub mod grid;
pub mod march;
pub mod partition;
pub mod pipeline;
pub mod rescale;
pub mod shared;
pub mod stencil;

pub use config::PipelineConfig;
pub use error::{MarchError, MarchResult};
pub use grid::{sample_grid, GridGeometry, GridView, OccupancyGrid};
pub use march::{configuration_index, march};
pub use partition::{partition_range, Partition};
pub use pipeline::{run_sequential, ContourOutput, ContourPipeline, RunSummary};
pub use rescale::{needs_rescale, rescale};
pub use stencil::{DirectoryStencils, StencilRefs, StencilSet, StencilSource};
