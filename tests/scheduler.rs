use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use scanray::color::color;
use scanray::{Color, Frame, PixelShader, RowSink, ScanrayResult, Strategy, render};

const ALL_STRATEGIES: [Strategy; 3] = [
    Strategy::BarrierRounds,
    Strategy::StaticPartition,
    Strategy::PollingPool,
];

/// Shades pixel (x, y) as `(row, col, 0)`.
struct StubShader;

impl PixelShader for StubShader {
    fn shade(&self, x: u32, y: u32, _frame: &Frame) -> Color {
        color(y as f64, x as f64, 0.0)
    }
}

/// Stub shader with a per-row artificial delay so completion order differs
/// from assignment order.
struct DelayShader;

impl PixelShader for DelayShader {
    fn shade(&self, x: u32, y: u32, _frame: &Frame) -> Color {
        if x == 0 {
            std::thread::sleep(Duration::from_millis((y as u64 * 7) % 5));
        }
        color(y as f64, x as f64, 0.0)
    }
}

/// Counts how many times each pixel is shaded and tracks the peak number of
/// concurrently shading workers.
struct InstrumentedShader {
    calls: Mutex<HashMap<(u32, u32), u32>>,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

impl InstrumentedShader {
    fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            active: AtomicUsize::new(0),
            peak_active: AtomicUsize::new(0),
        }
    }
}

impl PixelShader for InstrumentedShader {
    fn shade(&self, x: u32, y: u32, _frame: &Frame) -> Color {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(active, Ordering::SeqCst);

        *self.calls.lock().unwrap().entry((x, y)).or_insert(0) += 1;
        std::thread::sleep(Duration::from_micros(200));

        self.active.fetch_sub(1, Ordering::SeqCst);
        color(y as f64, x as f64, 0.0)
    }
}

/// Panics partway through one specific row.
struct PanickingShader {
    fatal_row: u32,
}

impl PixelShader for PanickingShader {
    fn shade(&self, x: u32, y: u32, _frame: &Frame) -> Color {
        if y == self.fatal_row && x == 1 {
            panic!("shader failure injected for testing");
        }
        color(y as f64, x as f64, 0.0)
    }
}

/// Records every flushed row.
#[derive(Default)]
struct VecSink {
    rows: Vec<Vec<Color>>,
}

impl RowSink for VecSink {
    fn write_row(&mut self, row: &[Color]) -> ScanrayResult<()> {
        self.rows.push(row.to_vec());
        Ok(())
    }
}

fn flushed_row_indices(sink: &VecSink) -> Vec<u32> {
    sink.rows.iter().map(|row| row[0].x as u32).collect()
}

#[test]
fn four_by_four_scenario_flushes_descending_for_every_strategy() {
    let frame = Frame::new(4, 4, 1, 0).unwrap();
    for strategy in ALL_STRATEGIES {
        let mut sink = VecSink::default();
        let stats = render(&frame, &StubShader, &mut sink, 2, strategy).unwrap();
        assert_eq!(stats.rows_rendered, 4);

        let expected: Vec<Vec<Color>> = (0..4)
            .rev()
            .map(|row| {
                (0..4)
                    .map(|col| color(row as f64, col as f64, 0.0))
                    .collect()
            })
            .collect();
        assert_eq!(sink.rows, expected, "{strategy:?}");
    }
}

#[test]
fn every_row_is_flushed_exactly_once_in_descending_order() {
    let frame = Frame::new(3, 13, 1, 0).unwrap();
    for strategy in ALL_STRATEGIES {
        for workers in [1, 2, 4, 13, 20] {
            let mut sink = VecSink::default();
            render(&frame, &DelayShader, &mut sink, workers, strategy).unwrap();

            let rows = flushed_row_indices(&sink);
            let expected: Vec<u32> = (0..13).rev().collect();
            assert_eq!(rows, expected, "{strategy:?} with {workers} workers");
        }
    }
}

#[test]
fn no_pixel_is_dispatched_twice() {
    let frame = Frame::new(4, 16, 1, 0).unwrap();
    for strategy in ALL_STRATEGIES {
        let shader = InstrumentedShader::new();
        let mut sink = VecSink::default();
        render(&frame, &shader, &mut sink, 3, strategy).unwrap();

        let calls = shader.calls.lock().unwrap();
        assert_eq!(calls.len(), 4 * 16, "{strategy:?}");
        assert!(
            calls.values().all(|&count| count == 1),
            "{strategy:?} shaded a pixel more than once"
        );
    }
}

#[test]
fn concurrent_shading_never_exceeds_the_worker_budget() {
    let frame = Frame::new(2, 24, 1, 0).unwrap();
    for strategy in ALL_STRATEGIES {
        for workers in [1, 3] {
            let shader = InstrumentedShader::new();
            let mut sink = VecSink::default();
            render(&frame, &shader, &mut sink, workers, strategy).unwrap();

            let peak = shader.peak_active.load(Ordering::SeqCst);
            assert!(
                peak <= workers,
                "{strategy:?}: {peak} concurrent workers with a budget of {workers}"
            );
        }
    }
}

#[test]
fn single_row_frame_renders_under_every_strategy() {
    let frame = Frame::new(5, 1, 1, 0).unwrap();
    for strategy in ALL_STRATEGIES {
        let mut sink = VecSink::default();
        render(&frame, &StubShader, &mut sink, 4, strategy).unwrap();
        assert_eq!(flushed_row_indices(&sink), vec![0]);
    }
}

#[test]
fn a_panicking_worker_aborts_the_render() {
    // Row 5 blows up mid-scanline; every strategy must surface an error
    // instead of hanging on the dead worker's slot or deadlocking a round.
    let frame = Frame::new(3, 8, 1, 0).unwrap();
    for strategy in ALL_STRATEGIES {
        let shader = PanickingShader { fatal_row: 5 };
        let mut sink = VecSink::default();
        let err = render(&frame, &shader, &mut sink, 2, strategy).unwrap_err();
        assert!(
            err.to_string().contains("panicked"),
            "{strategy:?}: {err}"
        );
    }
}

#[test]
fn worker_count_of_zero_is_rejected_before_spawning() {
    let frame = Frame::new(4, 4, 1, 0).unwrap();
    for strategy in ALL_STRATEGIES {
        let mut sink = VecSink::default();
        let err = render(&frame, &StubShader, &mut sink, 0, strategy).unwrap_err();
        assert!(err.to_string().contains("worker count"));
        assert!(sink.rows.is_empty());
    }
}
