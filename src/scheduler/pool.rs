//! Strategy C: polling reuse pool.
//!
//! N persistent worker slots, a descending row cursor, and the result table
//! all live in one mutex-guarded state value owned by this call (never a
//! process-wide global). Whenever a slot is idle and rows remain, the
//! coordinator immediately binds it to the next unassigned row. A worker
//! publishes its finished row into the result table and clears its busy flag
//! under the *same* lock acquisition, so a slot can never be observed idle
//! before its row is visible. The reference design's two busy-wait loops are
//! replaced by condvar waits; flush order is fixed descending regardless of
//! arrival order.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread;

use tracing::trace;

use crate::core::Frame;
use crate::error::{ScanrayError, ScanrayResult};
use crate::shader::PixelShader;
use crate::sink::RowSink;

use super::{RowBuffer, ScanlineTask, render_scanline};

struct PoolState {
    /// Next unassigned row; counts down to -1.
    next_row: i64,
    /// Busy flag per worker slot.
    busy: Vec<bool>,
    /// Published rows, indexed by row. Storage order is arrival order.
    results: Vec<Option<RowBuffer>>,
    /// Assigned but not yet published rows.
    in_flight: usize,
    /// Set when a worker panicked instead of publishing its row.
    worker_panicked: bool,
}

fn lock<'a>(state: &'a Mutex<PoolState>) -> ScanrayResult<MutexGuard<'a, PoolState>> {
    state
        .lock()
        .map_err(|_| ScanrayError::scheduling("pool state lock poisoned"))
}

pub(super) fn render(
    frame: &Frame,
    shader: &dyn PixelShader,
    sink: &mut dyn RowSink,
    workers: usize,
) -> ScanrayResult<u64> {
    let state = Mutex::new(PoolState {
        next_row: frame.height as i64 - 1,
        busy: vec![false; workers],
        results: (0..frame.height).map(|_| None).collect(),
        in_flight: 0,
        worker_panicked: false,
    });
    let slot_freed = Condvar::new();

    thread::scope(|s| -> ScanrayResult<()> {
        let state = &state;
        let slot_freed = &slot_freed;

        // Assignment loop: bind every row to the first slot that frees up.
        loop {
            let (slot, row) = {
                let mut st = lock(state)?;
                if st.next_row < 0 {
                    break;
                }
                loop {
                    if st.worker_panicked {
                        return Err(ScanrayError::scheduling("scanline worker panicked"));
                    }
                    if let Some(idle) = st.busy.iter().position(|&busy| !busy) {
                        let row = st.next_row as u32;
                        st.busy[idle] = true;
                        st.next_row -= 1;
                        st.in_flight += 1;
                        break (idle, row);
                    }
                    st = slot_freed
                        .wait(st)
                        .map_err(|_| ScanrayError::scheduling("pool state lock poisoned"))?;
                }
            };
            trace!(row, slot, "assigning scanline");

            s.spawn(move || {
                // A panicking shader must not strand the coordinator: the
                // slot is restored and the failure recorded either way.
                let result = catch_unwind(AssertUnwindSafe(|| {
                    render_scanline(frame, shader, ScanlineTask { row })
                }));
                let mut st = state.lock().expect("pool state lock poisoned");
                // Publish and free under one lock acquisition: the collector
                // can only see the slot idle after the row is in the table.
                match result {
                    Ok(buffer) => st.results[row as usize] = Some(buffer),
                    Err(_) => st.worker_panicked = true,
                }
                st.busy[slot] = false;
                st.in_flight -= 1;
                slot_freed.notify_all();
            });
        }

        // Every row is assigned; wait for the stragglers to publish instead
        // of spinning on the flag table.
        let mut st = lock(state)?;
        while st.in_flight > 0 {
            st = slot_freed
                .wait(st)
                .map_err(|_| ScanrayError::scheduling("pool state lock poisoned"))?;
        }
        if st.worker_panicked {
            return Err(ScanrayError::scheduling("scanline worker panicked"));
        }
        Ok(())
    })?;

    let state = state
        .into_inner()
        .map_err(|_| ScanrayError::scheduling("pool state lock poisoned"))?;

    let mut rows_written = 0u64;
    for entry in state.results.into_iter().rev() {
        let buffer =
            entry.ok_or_else(|| ScanrayError::scheduling("row missing from result table"))?;
        sink.write_row(&buffer.pixels)?;
        rows_written += 1;
    }
    Ok(rows_written)
}
