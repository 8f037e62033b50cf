//! Strategy A: round-barrier dispatch.
//!
//! The image is processed in successive rounds of up to N rows. Each round
//! launches one worker per row, joins every one of them (a full barrier),
//! then flushes the round's rows in assignment order. Ordering is trivially
//! correct because a round is fully drained before any of it is written; the
//! cost is that every round waits on its slowest row.

use std::thread;

use tracing::debug;

use crate::core::Frame;
use crate::error::{ScanrayError, ScanrayResult};
use crate::shader::PixelShader;
use crate::sink::RowSink;

use super::{RowBuffer, ScanlineTask, render_scanline};

pub(super) fn render(
    frame: &Frame,
    shader: &dyn PixelShader,
    sink: &mut dyn RowSink,
    workers: usize,
) -> ScanrayResult<u64> {
    let mut rows_written = 0u64;
    let mut next_row = frame.height as i64 - 1;

    while next_row >= 0 {
        let round_size = workers.min(next_row as usize + 1);
        let rows: Vec<u32> = (0..round_size)
            .map(|i| (next_row - i as i64) as u32)
            .collect();
        next_row -= round_size as i64;
        debug!(
            rows_remaining = next_row + 1,
            round_size, "dispatching round"
        );

        let buffers: Vec<RowBuffer> = thread::scope(|s| {
            let handles: Vec<_> = rows
                .iter()
                .map(|&row| s.spawn(move || render_scanline(frame, shader, ScanlineTask { row })))
                .collect();
            // Full barrier: every worker of the round joins before any row
            // is flushed.
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .map_err(|_| ScanrayError::scheduling("scanline worker panicked"))
                })
                .collect::<ScanrayResult<Vec<_>>>()
        })?;

        for buffer in buffers {
            sink.write_row(&buffer.pixels)?;
            rows_written += 1;
        }
    }

    Ok(rows_written)
}
