//! Plugins that disturb microarchitectural state between measurements, so no function
//! profits from what the previously measured one left behind.

use std::any::Any;

use super::{EventListener, HarnessEvents};

/// When a trasher does its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashOn {
    /// Before every measurement, including the baseline's.
    #[default]
    EveryMeasurement,
    /// Once at the start of every run.
    RunStart,
}

impl TrashOn {
    fn matches(self, event: &HarnessEvents) -> bool {
        matches!(
            (self, event),
            (TrashOn::EveryMeasurement, HarnessEvents::MeasureStart { .. })
                | (TrashOn::RunStart, HarnessEvents::RunStart { .. })
        )
    }
}

/// Performs dummy reads from memory to spoil a given amount of CPU cache.
///
/// Uses cache aligned data arrays to perform minimum amount of reads possible to spoil the cache
#[derive(Clone)]
pub struct CacheTrasher {
    cache_lines: Vec<CacheLine>,
    seed: u64,
    trash_on: TrashOn,
    reads: u64,
}
impl Default for CacheTrasher {
    fn default() -> Self {
        Self::new(1024 * 1024 * 32) // 32MB
    }
}

impl CacheTrasher {
    /// Creates a new instance of `CacheTrasher`.
    ///
    /// The `bytes` parameter is the amount of memory to read to spoil the cache.
    pub fn new(bytes: usize) -> Self {
        let n = (bytes / std::mem::size_of::<CacheLine>()).max(1);
        Self {
            cache_lines: vec![CacheLine::default(); n],
            seed: 0,
            trash_on: TrashOn::default(),
            reads: 0,
        }
    }

    /// Sets when the cache is trashed.
    pub fn trash_on(mut self, trash_on: TrashOn) -> Self {
        self.trash_on = trash_on;
        self
    }

    /// Number of cache lines read so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Linear Congruential Generator (LCG) for pseudo-random numbers
    fn lcg_rand(&mut self) -> usize {
        const A: u64 = 1664525;
        const C: u64 = 1013904223;

        self.seed = A.wrapping_mul(self.seed).wrapping_add(C);
        (self.seed % (self.cache_lines.len() as u64)) as usize
    }

    fn issue_read(&mut self) {
        let num_reads = self.cache_lines.len();
        for _ in 0..num_reads {
            let idx = self.lcg_rand();
            // CacheLine is aligned on 64 bytes, reading one element spoils the whole line
            // SAFETY: the reference points into a live, initialized element.
            unsafe { std::ptr::read_volatile(&self.cache_lines[idx].0[0]) };
        }
        self.reads += num_reads as u64;
    }
}

#[repr(C)]
#[repr(align(64))]
#[derive(Default, Clone, Copy)]
struct CacheLine([u16; 32]);

impl EventListener for CacheTrasher {
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
    fn name(&self) -> &'static str {
        "cache_trasher"
    }
    fn on_event(&mut self, event: HarnessEvents) {
        if self.trash_on.matches(&event) {
            self.issue_read();
        }
    }
}

/// Trashes the branch predictor.
#[cfg(feature = "branch_predictor")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BPUTrasher {
    trash_on: TrashOn,
}

#[cfg(feature = "branch_predictor")]
impl BPUTrasher {
    /// Trashes before every measurement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets when the branch predictor is trashed.
    pub fn trash_on(mut self, trash_on: TrashOn) -> Self {
        self.trash_on = trash_on;
        self
    }
}

#[cfg(feature = "branch_predictor")]
impl EventListener for BPUTrasher {
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
    fn name(&self) -> &'static str {
        "bpu_trasher"
    }
    fn on_event(&mut self, event: HarnessEvents) {
        if self.trash_on.matches(&event) {
            bpu_trasher::trash_bpu();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: HarnessEvents<'static> = HarnessEvents::MeasureStart {
        id: "quick",
        iterations: 10,
    };

    #[test]
    fn reads_every_line_per_measurement() {
        let mut trasher = CacheTrasher::new(64 * 16);
        trasher.on_event(HarnessEvents::RunStart { pending: 1 });
        assert_eq!(trasher.reads(), 0);
        trasher.on_event(START);
        assert_eq!(trasher.reads(), 16);
    }

    #[test]
    fn reads_once_per_run() {
        let mut trasher = CacheTrasher::new(64 * 4).trash_on(TrashOn::RunStart);
        trasher.on_event(START);
        trasher.on_event(HarnessEvents::RunStart { pending: 3 });
        trasher.on_event(HarnessEvents::RunStop { measured: 3 });
        assert_eq!(trasher.reads(), 4);
    }

    #[cfg(feature = "branch_predictor")]
    #[test]
    fn bpu_trasher_handles_events() {
        let mut trasher = BPUTrasher::new().trash_on(TrashOn::RunStart);
        trasher.on_event(HarnessEvents::RunStart { pending: 1 });
        trasher.on_event(START);
        assert_eq!(trasher.name(), "bpu_trasher");
    }
}
