use std::any::Any;

use peakmem_alloc::PeakMemAllocTrait;

use crate::plugins::{EventListener, HarnessEvents, PerCandidateData};

/// Plugin to track peak memory consumption.
///
/// The peak is reset when a measurement starts and read when it stops, so it covers the
/// working set copies and everything the function allocates. Adding this plugin enables
/// the Memory column in the report. Peaks of a failed run are discarded.
pub struct PeakMemAllocPlugin {
    peak_per_id: PerCandidateData<usize>,
    /// Ids measured since the last `RunStart`.
    in_run: Vec<String>,
    alloc: &'static dyn PeakMemAllocTrait,
}

impl PeakMemAllocPlugin {
    /// Creates a new instance of `PeakMemAllocPlugin`.
    /// The `alloc` parameter is the allocator that will be used to track memory consumption.
    pub fn new(alloc: &'static dyn PeakMemAllocTrait) -> Self {
        Self {
            peak_per_id: PerCandidateData::new(),
            in_run: Vec::new(),
            alloc,
        }
    }

    /// Returns the peak memory of the last measurement of `id`.
    pub fn peak_memory(&self, id: &str) -> Option<usize> {
        self.peak_per_id.get(id).copied()
    }
}

/// The plugin name for PeakMemAllocPlugin.
pub static ALLOC_EVENT_LISTENER_NAME: &str = "_benchcmp_alloc";

impl EventListener for PeakMemAllocPlugin {
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
    fn name(&self) -> &'static str {
        ALLOC_EVENT_LISTENER_NAME
    }
    fn on_event(&mut self, event: HarnessEvents) {
        match event {
            HarnessEvents::RunStart { .. } => self.in_run.clear(),
            HarnessEvents::MeasureStart { id, .. } => {
                self.in_run.push(id.to_string());
                self.peak_per_id.insert_if_absent(id, || 0);
                self.alloc.reset_peak_memory();
            }
            HarnessEvents::MeasureStop { id, .. } => {
                let peak = self.alloc.get_peak_memory();
                *self.peak_per_id.insert_if_absent(id, || 0) = peak;
            }
            HarnessEvents::RunFailed { .. } => {
                for id in self.in_run.drain(..) {
                    self.peak_per_id.remove(&id);
                }
            }
            HarnessEvents::RunStop { .. } => self.in_run.clear(),
        }
    }
}
