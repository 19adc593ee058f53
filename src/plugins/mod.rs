//! The plugin system works by registering to events.
//!
//! # Example
//! ```rust
//! use benchcmp::*;
//! use benchcmp::plugins::*;
//!
//! #[derive(Default)]
//! struct Slowest {
//!     worst: Option<(String, f64)>,
//! }
//!
//! impl EventListener for Slowest {
//!     fn name(&self) -> &'static str {
//!         "slowest"
//!     }
//!     fn on_event(&mut self, event: HarnessEvents) {
//!         if let HarnessEvents::MeasureStop { id, average_ns } = event {
//!             if self.worst.as_ref().map_or(true, |(_, ns)| average_ns > *ns) {
//!                 self.worst = Some((id.to_string(), average_ns));
//!             }
//!         }
//!     }
//!     fn as_any(&mut self) -> &mut dyn std::any::Any {
//!         self
//!     }
//! }
//!
//! let mut bench = BenchmarkBuilder::new(10)
//!     .add_plugin(Slowest::default())
//!     .output_only(|x: &mut u64| *x + 1, (41u64,))
//!     .unwrap();
//! bench.insert(|x: &mut u64| *x * 2 - 41, "doubled").unwrap();
//! bench.run().unwrap();
//! let slowest = bench
//!     .events()
//!     .downcast_listener::<Slowest>("slowest")
//!     .unwrap();
//! assert!(slowest.worst.is_some());
//! ```

pub(crate) mod alloc;
pub mod events;
mod trashers;

pub use alloc::{PeakMemAllocPlugin, ALLOC_EVENT_LISTENER_NAME};
pub use events::*;
#[cfg(feature = "branch_predictor")]
pub use trashers::BPUTrasher;
pub use trashers::{CacheTrasher, TrashOn};
