//! Resource accounting.
//!
//! Counters are owned by whoever needs instrumentation (normally the runtime)
//! and passed by reference. There is no process-wide state.

use std::cell::Cell;
use std::fmt;

/// Per-runtime resource counters.
///
/// Single-threaded by construction: the run loop, the user hooks and every
/// resource-creating call execute on the same thread.
#[derive(Debug, Default)]
pub struct ResourceMetrics {
    file_loads: Cell<u64>,
    bytes_loaded: Cell<u64>,
    file_saves: Cell<u64>,
    bytes_saved: Cell<u64>,
    compiled_stages: Cell<u64>,
    linked_programs: Cell<u64>,
    pipelines: Cell<u64>,
    buffers: Cell<u64>,
}

/// Copy of the counters at a point in time.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MetricsSnapshot {
    pub file_loads: u64,
    pub bytes_loaded: u64,
    pub file_saves: u64,
    pub bytes_saved: u64,
    pub compiled_stages: u64,
    pub linked_programs: u64,
    pub pipelines: u64,
    pub buffers: u64,
}

fn bump(cell: &Cell<u64>, by: u64) {
    cell.set(cell.get().saturating_add(by));
}

impl ResourceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_load(&self, bytes: usize) {
        bump(&self.file_loads, 1);
        bump(&self.bytes_loaded, bytes as u64);
    }

    pub fn record_save(&self, bytes: usize) {
        bump(&self.file_saves, 1);
        bump(&self.bytes_saved, bytes as u64);
    }

    pub fn record_stage(&self) {
        bump(&self.compiled_stages, 1);
    }

    pub fn record_program(&self) {
        bump(&self.linked_programs, 1);
    }

    pub fn record_pipeline(&self) {
        bump(&self.pipelines, 1);
    }

    pub fn record_buffer(&self) {
        bump(&self.buffers, 1);
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        for c in [
            &self.file_loads,
            &self.bytes_loaded,
            &self.file_saves,
            &self.bytes_saved,
            &self.compiled_stages,
            &self.linked_programs,
            &self.pipelines,
            &self.buffers,
        ] {
            c.set(0);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            file_loads: self.file_loads.get(),
            bytes_loaded: self.bytes_loaded.get(),
            file_saves: self.file_saves.get(),
            bytes_saved: self.bytes_saved.get(),
            compiled_stages: self.compiled_stages.get(),
            linked_programs: self.linked_programs.get(),
            pipelines: self.pipelines.get(),
            buffers: self.buffers.get(),
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loads: {} ({} bytes), saves: {} ({} bytes), stages: {}, programs: {}, pipelines: {}, buffers: {}",
            self.file_loads,
            self.bytes_loaded,
            self.file_saves,
            self.bytes_saved,
            self.compiled_stages,
            self.linked_programs,
            self.pipelines,
            self.buffers,
        )
    }
}
