//! Scanline work distribution.
//!
//! The driver turns a frame into `height` scanline tasks (row `height-1`
//! down to row `0`), fans them out across a fixed pool of workers under one
//! of three strategies, and flushes finished rows to the sink in strict
//! descending row order regardless of completion order:
//!
//! - [`Strategy::BarrierRounds`]: rounds of up to N rows with a full join
//!   barrier per round; rows flush in assignment order after each barrier.
//! - [`Strategy::StaticPartition`]: one contiguous descending slice per
//!   worker, fixed up front; a single join point, then batches flush in
//!   slice order.
//! - [`Strategy::PollingPool`]: N reusable worker slots; an idle slot is
//!   immediately rebound to the next unassigned row. Results accumulate in
//!   arrival order and flush descending once every row has been published.

use tracing::info;

use crate::color::Color;
use crate::core::Frame;
use crate::error::{ScanrayError, ScanrayResult};
use crate::shader::PixelShader;
use crate::sink::RowSink;

mod barrier;
mod partition;
mod pool;

pub use partition::{RowRange, partition_rows};

/// The unit of work: shade one row of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanlineTask {
    pub row: u32,
}

/// One finished row. Owned by the worker that produced it until it is handed
/// to the collector; never mutated after that.
#[derive(Clone, Debug)]
pub struct RowBuffer {
    pub row: u32,
    pub pixels: Vec<Color>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    BarrierRounds,
    StaticPartition,
    PollingPool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rows_rendered: u64,
    pub workers: usize,
}

/// Render `frame` through `shader`, writing every row to `sink` in
/// descending row order. Returns only after the last row has been written.
///
/// The worker pool size is fixed at `workers` for the whole render and the
/// number of concurrently shading threads never exceeds it. Any worker
/// failure is fatal to the whole render; rows already flushed stay flushed,
/// nothing else is written.
pub fn render(
    frame: &Frame,
    shader: &dyn PixelShader,
    sink: &mut dyn RowSink,
    workers: usize,
    strategy: Strategy,
) -> ScanrayResult<RenderStats> {
    if frame.width == 0 || frame.height == 0 {
        return Err(ScanrayError::validation(
            "frame width and height must be >= 1",
        ));
    }
    if workers == 0 {
        return Err(ScanrayError::validation("worker count must be >= 1"));
    }

    let rows_rendered = match strategy {
        Strategy::BarrierRounds => barrier::render(frame, shader, sink, workers)?,
        Strategy::StaticPartition => partition::render(frame, shader, sink, workers)?,
        Strategy::PollingPool => pool::render(frame, shader, sink, workers)?,
    };

    let stats = RenderStats {
        rows_rendered,
        workers,
    };
    info!(
        rows = stats.rows_rendered,
        workers,
        ?strategy,
        "render complete"
    );
    Ok(stats)
}

/// Shared worker body: shade every pixel of one row, left to right.
fn render_scanline(frame: &Frame, shader: &dyn PixelShader, task: ScanlineTask) -> RowBuffer {
    let mut pixels = Vec::with_capacity(frame.width as usize);
    for x in 0..frame.width {
        pixels.push(shader.shade(x, task.row, frame));
    }
    RowBuffer {
        row: task.row,
        pixels,
    }
}
