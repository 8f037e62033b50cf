//! Strategy B: static range partition.
//!
//! The `height` rows are split once into contiguous, disjoint, descending
//! slices, one per worker. Every worker renders its whole slice into an
//! owned batch, there is a single join point at the end of the render, and
//! batches flush in slice order (which is descending row order by
//! construction). No rebalancing happens after assignment: total latency is
//! the cost of the most expensive slice.

use std::thread;

use tracing::debug;

use crate::core::Frame;
use crate::error::{ScanrayError, ScanrayResult};
use crate::shader::PixelShader;
use crate::sink::RowSink;

use super::{RowBuffer, ScanlineTask, render_scanline};

/// Inclusive descending row range: `top >= bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    pub top: u32,
    pub bottom: u32,
}

impl RowRange {
    /// Number of rows in the range. Never zero by construction.
    pub fn row_count(&self) -> u32 {
        self.top - self.bottom + 1
    }

    pub fn rows_desc(&self) -> impl Iterator<Item = u32> {
        (self.bottom..=self.top).rev()
    }
}

/// Split `[0, height)` into at most `workers` contiguous descending slices.
///
/// Every slice gets `height / slices` rows except the last, which absorbs
/// the remainder down to row 0. The slice count is clamped to `height` so no
/// slice is ever empty; the ranges are pairwise disjoint and cover
/// `[0, height)` exactly.
pub fn partition_rows(height: u32, workers: usize) -> Vec<RowRange> {
    debug_assert!(height > 0 && workers > 0);
    let slices = workers.min(height as usize);
    let per_slice = height / slices as u32;

    let mut ranges = Vec::with_capacity(slices);
    let mut top = height - 1;
    for i in 0..slices {
        let bottom = if i == slices - 1 {
            0
        } else {
            top + 1 - per_slice
        };
        ranges.push(RowRange { top, bottom });
        if bottom > 0 {
            top = bottom - 1;
        }
    }
    ranges
}

pub(super) fn render(
    frame: &Frame,
    shader: &dyn PixelShader,
    sink: &mut dyn RowSink,
    workers: usize,
) -> ScanrayResult<u64> {
    let ranges = partition_rows(frame.height, workers);
    debug!(slices = ranges.len(), "partitioned frame");

    // One worker per slice; each returns an owned dense batch through its
    // join handle, so no result memory is ever shared between workers.
    let batches: Vec<Vec<RowBuffer>> = thread::scope(|s| {
        let handles: Vec<_> = ranges
            .iter()
            .map(|&range| {
                s.spawn(move || {
                    range
                        .rows_desc()
                        .map(|row| render_scanline(frame, shader, ScanlineTask { row }))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| ScanrayError::scheduling("slice worker panicked"))
            })
            .collect::<ScanrayResult<Vec<_>>>()
    })?;

    let mut rows_written = 0u64;
    for batch in batches {
        for buffer in batch {
            sink.write_row(&buffer.pixels)?;
            rows_written += 1;
        }
    }
    Ok(rows_written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(height: u32, workers: usize) {
        let ranges = partition_rows(height, workers);
        assert!(ranges.len() <= workers);

        let mut seen = vec![false; height as usize];
        let mut previous_bottom = height;
        for range in &ranges {
            assert!(range.top >= range.bottom);
            // Contiguous and descending.
            assert_eq!(range.top + 1, previous_bottom);
            previous_bottom = range.bottom;
            for row in range.rows_desc() {
                assert!(!seen[row as usize], "row {row} assigned twice");
                seen[row as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s), "{height}/{workers} left gaps");
    }

    #[test]
    fn partition_covers_exactly_for_many_shapes() {
        for height in 1..=40 {
            for workers in 1..=12 {
                assert_exact_cover(height, workers);
            }
        }
    }

    #[test]
    fn seven_rows_three_workers_matches_reference_rule() {
        // height / workers == 2 rows per slice, last absorbs the remainder.
        let ranges = partition_rows(7, 3);
        assert_eq!(
            ranges,
            vec![
                RowRange { top: 6, bottom: 5 },
                RowRange { top: 4, bottom: 3 },
                RowRange { top: 2, bottom: 0 },
            ]
        );
    }

    #[test]
    fn more_workers_than_rows_clamps_slice_count() {
        let ranges = partition_rows(3, 8);
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().all(|r| r.row_count() == 1));
    }
}
