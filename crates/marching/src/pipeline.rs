//! The four-phase contour pipeline on a fixed worker pool.
//!
//! ```text
//! load stencils ─▶ barrier ─▶ [rescale ─▶ barrier] ─▶ sample grid ─▶ barrier ─▶ march
//! ```
//!
//! Each phase splits its index space with [`Partition`]: stencil indices
//! `0..16`, destination rows `0..max_height`, grid rows `0..q` plus the last
//! grid row `0..p+1`, and cell rows `0..q`. The rescale barrier is only
//! entered when rescaling happens. That decision is made once from the input
//! size, before any worker starts, and every worker reads the same answer, so
//! all workers wait on the barrier the same number of times.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Barrier;
use std::time::{Duration, Instant};

use raster::{PixelBuffer, Rgb};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, info};

use crate::config::{PipelineConfig, STENCIL_COUNT};
use crate::error::{MarchError, MarchResult};
use crate::grid::{fill_last_row, fill_rows, sample_grid, GridGeometry, GridView};
use crate::march::{march, stamp_rows};
use crate::partition::Partition;
use crate::rescale::{needs_rescale, rescale, rescale_rows};
use crate::shared::{PhaseBuffer, SharedImage};
use crate::stencil::{load_stencil, DirectoryStencils, StencilRefs, StencilSet, StencilSource};

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub input_width: usize,
    pub input_height: usize,
    pub output_width: usize,
    pub output_height: usize,
    pub rescaled: bool,
    /// Grid points per row (`p + 1`).
    pub grid_cols: usize,
    /// Grid rows (`q + 1`).
    pub grid_rows: usize,
    pub workers: usize,
    pub elapsed: Duration,
}

/// The contoured image and its run summary.
#[derive(Debug)]
pub struct ContourOutput {
    pub image: PixelBuffer,
    pub summary: RunSummary,
}

/// Contour pipeline bound to a worker pool of fixed size.
pub struct ContourPipeline {
    config: PipelineConfig,
    pool: ThreadPool,
}

impl ContourPipeline {
    /// Validate `config` and start `config.workers` threads.
    ///
    /// Fails before any work is scheduled if a thread cannot be spawned.
    pub fn new(config: PipelineConfig) -> MarchResult<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("contour-worker-{i}"))
            .build()
            .map_err(|e| MarchError::ThreadPool(e.to_string()))?;
        debug!(workers = config.workers, "Started worker pool");
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run with stencils read from the configured stencil directory.
    pub fn run(&self, image: PixelBuffer) -> MarchResult<ContourOutput> {
        let stencils = DirectoryStencils::new(&self.config.stencil_dir);
        self.run_with(image, &stencils)
    }

    /// Run with stencils from `stencils`.
    pub fn run_with(
        &self,
        image: PixelBuffer,
        stencils: &dyn StencilSource,
    ) -> MarchResult<ContourOutput> {
        let started = Instant::now();
        let cfg = &self.config;
        if image.is_empty() {
            return Err(MarchError::config("input image is empty"));
        }
        let (input_width, input_height) = (image.width(), image.height());
        let rescaled = needs_rescale(input_width, input_height, cfg.max_width, cfg.max_height);

        // The active buffer is chosen once: a fresh max-size buffer when
        // rescaling (the input is then only read), else the input itself.
        let input;
        let (rescale_source, active) = if rescaled {
            input = image;
            let pixels = vec![Rgb::BLACK; cfg.max_width * cfg.max_height];
            (
                Some(&input),
                SharedImage::new(cfg.max_width, cfg.max_height, pixels),
            )
        } else {
            (
                None,
                SharedImage::new(input_width, input_height, image.into_pixels()),
            )
        };

        let geometry = GridGeometry::new(active.width(), active.height(), cfg.step_x, cfg.step_y);
        let shared = Shared {
            config: cfg,
            workers: cfg.workers,
            stencil_source: stencils,
            rescale_source,
            image: active,
            geometry,
            stencils: PhaseBuffer::new((0..STENCIL_COUNT).map(|_| None).collect()),
            grid: PhaseBuffer::new(vec![0u8; geometry.len()]),
            barrier: Barrier::new(cfg.workers),
        };

        let results = self.pool.broadcast(|ctx| {
            debug_assert_eq!(ctx.num_threads(), shared.workers);
            run_worker(&shared, ctx.index())
        });
        first_error(results)?;

        let (output_width, output_height) = (shared.image.width(), shared.image.height());
        let output = PixelBuffer::from_pixels(output_width, output_height, shared.image.into_pixels())?;

        let summary = RunSummary {
            input_width,
            input_height,
            output_width,
            output_height,
            rescaled,
            grid_cols: geometry.points_x(),
            grid_rows: geometry.points_y(),
            workers: cfg.workers,
            elapsed: started.elapsed(),
        };
        info!(
            workers = summary.workers,
            input = %format!("{input_width}x{input_height}"),
            output = %format!("{output_width}x{output_height}"),
            rescaled,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Contour pipeline finished"
        );

        Ok(ContourOutput {
            image: output,
            summary,
        })
    }
}

/// Prefer a worker's own failure over the follow-up errors the other
/// workers report for the same incomplete stencil set.
fn first_error(results: Vec<MarchResult<()>>) -> MarchResult<()> {
    let mut secondary = None;
    for result in results {
        match result {
            Ok(()) => {}
            Err(e) if e.is_secondary() => {
                secondary.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    secondary.map_or(Ok(()), Err)
}

/// State shared by reference with every worker.
struct Shared<'a> {
    config: &'a PipelineConfig,
    workers: usize,
    stencil_source: &'a dyn StencilSource,
    /// Set only when the input exceeds the maximum resolution.
    rescale_source: Option<&'a PixelBuffer>,
    /// Active image: the rescale target, or the input itself.
    image: SharedImage,
    geometry: GridGeometry,
    stencils: PhaseBuffer<Option<PixelBuffer>>,
    grid: PhaseBuffer<u8>,
    barrier: Barrier,
}

/// Load one stencil, turning a panic in the source into an error so the
/// worker still reaches the load barrier.
fn load_guarded(
    source: &dyn StencilSource,
    index: usize,
    step_x: usize,
    step_y: usize,
) -> MarchResult<PixelBuffer> {
    panic::catch_unwind(AssertUnwindSafe(|| load_stencil(source, index, step_x, step_y)))
        .unwrap_or_else(|payload| {
            Err(MarchError::StencilPanic {
                index,
                message: panic_message(payload.as_ref()),
            })
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

fn run_worker(shared: &Shared<'_>, id: usize) -> MarchResult<()> {
    let part = Partition::new(id, shared.workers);
    let cfg = shared.config;

    // Phase 1: stencils
    let range = part.range(STENCIL_COUNT);
    let loaded = {
        // SAFETY: slots are only written in this phase, each worker inside
        // its own partition range.
        let slots = unsafe { shared.stencils.range_mut(range.clone()) };
        slots
            .iter_mut()
            .zip(range.clone())
            .try_for_each(|(slot, index)| {
                *slot = Some(load_guarded(shared.stencil_source, index, cfg.step_x, cfg.step_y)?);
                Ok::<_, MarchError>(())
            })
    };
    match &loaded {
        Ok(()) => debug!(worker = id, start = range.start, end = range.end, "Loaded stencils"),
        Err(e) => error!(worker = id, error = %e, "Stencil load failed"),
    }
    shared.barrier.wait();

    // SAFETY: no slot is written after the barrier above.
    let slots = unsafe { shared.stencils.as_slice() };
    let Some(stencils) = StencilRefs::from_slots(slots) else {
        // Every worker sees the same slots and stops here, before any
        // further barrier.
        loaded?;
        return Err(MarchError::StencilSetIncomplete {
            loaded: slots.iter().flatten().count(),
            expected: STENCIL_COUNT,
        });
    };

    // Phase 2: rescale, same branch on every worker
    if let Some(source) = shared.rescale_source {
        let (width, height) = (shared.image.width(), shared.image.height());
        let rows = part.range(height);
        {
            // SAFETY: destination rows are split by the partition; the source
            // is a separate buffer that is only read.
            let band = unsafe { shared.image.rows_mut(rows.clone()) };
            rescale_rows(source, band, width, height, rows.clone());
        }
        debug!(worker = id, start = rows.start, end = rows.end, "Rescaled rows");
        shared.barrier.wait();
    }

    // Phase 3: occupancy grid
    let geom = shared.geometry;
    let cols = geom.points_x();
    {
        // SAFETY: the image is not written until phase 4, after the barrier.
        let image = unsafe { shared.image.view() };

        let rows = part.range(geom.cells_y);
        // SAFETY: grid rows are split by the partition.
        let band = unsafe { shared.grid.range_mut(rows.start * cols..rows.end * cols) };
        fill_rows(image, &geom, cfg.threshold, band, rows.clone());

        let last = part.range(cols);
        let base = geom.cells_y * cols;
        // SAFETY: the last grid row lies past every band above and is split
        // by the partition.
        let tail = unsafe { shared.grid.range_mut(base + last.start..base + last.end) };
        fill_last_row(image, &geom, cfg.threshold, tail, last);

        debug!(worker = id, start = rows.start, end = rows.end, "Sampled grid rows");
    }
    shared.barrier.wait();

    // Phase 4: march
    // SAFETY: the grid is read-only from here on.
    let grid = GridView::new(cols, geom.points_y(), unsafe { shared.grid.as_slice() });
    let rows = part.range(geom.cells_y);
    // SAFETY: disjoint cell rows cover disjoint pixel row bands, and no
    // worker reads the image in this phase.
    let band = unsafe {
        shared
            .image
            .rows_mut(rows.start * geom.step_y..rows.end * geom.step_y)
    };
    stamp_rows(band, &geom, grid, &stencils, rows.clone());
    debug!(worker = id, start = rows.start, end = rows.end, "Marched cell rows");

    Ok(())
}

/// Single-threaded run with the same semantics as [`ContourPipeline`].
pub fn run_sequential(
    image: PixelBuffer,
    stencils: &StencilSet,
    config: &PipelineConfig,
) -> MarchResult<ContourOutput> {
    let started = Instant::now();
    config.validate()?;
    if image.is_empty() {
        return Err(MarchError::config("input image is empty"));
    }
    if (stencils.width(), stencils.height()) != (config.step_x, config.step_y) {
        return Err(MarchError::StencilSize {
            index: 0,
            width: stencils.width(),
            height: stencils.height(),
            expected_width: config.step_x,
            expected_height: config.step_y,
        });
    }

    let (input_width, input_height) = (image.width(), image.height());
    let rescaled = needs_rescale(input_width, input_height, config.max_width, config.max_height);
    let mut active = if rescaled {
        rescale(&image, config.max_width, config.max_height).into_owned()
    } else {
        image
    };

    let grid = sample_grid(&active, config.step_x, config.step_y, config.threshold);
    march(&mut active, &grid, stencils, config.step_x, config.step_y);

    let summary = RunSummary {
        input_width,
        input_height,
        output_width: active.width(),
        output_height: active.height(),
        rescaled,
        grid_cols: grid.cols(),
        grid_rows: grid.rows(),
        workers: 1,
        elapsed: started.elapsed(),
    };
    Ok(ContourOutput {
        image: active,
        summary,
    })
}
