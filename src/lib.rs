#![deny(
    missing_copy_implementations,
    trivial_casts,
    unused_import_braces,
    unused_imports,
    missing_docs
)]

//! benchcmp compares the runtime of candidate functions against a baseline function.
//!
//! Every function shares one signature. The harness measures the average runtime over a
//! fixed number of calls, computes an error between each candidate's output and the
//! baseline's output with a metric you provide, ranks candidates by speed and prints a
//! report.
//!
//! # Arguments
//! The arguments are passed once, as a tuple. Before every call each function gets its own
//! copy, so no call ever observes the mutations of another one:
//! * scalars (numbers, `bool`, `char`, [Scalar]) are copied,
//! * containers (`Vec`, `String`, maps, sets, arrays, [Container]) are cloned,
//! * raw buffers ([RawPtr]) have their elements copied into a fresh [RawBuffer]. A pointer
//!   directly followed by an integer copies that many elements.
//!
//! Functions take one `&mut` per argument, e.g. `Fn(&mut RawBuffer<f32>, &mut usize) -> f32`
//! for the arguments `(RawPtr<f32>, usize)`. See the [args] module for details.
//!
//! # Comparisons
//! * [Benchmark::new] or [BenchmarkBuilder::value]: compare return values with a metric.
//! * [BenchmarkBuilder::output_only]: show return values only.
//! * [BenchmarkBuilder::void_with_state]: compare state captured from the arguments of
//!   functions returning `()`.
//! * [BenchmarkBuilder::void]: compare runtimes only.
//!
//! # Example
//! ```rust
//! use benchcmp::{black_box, Benchmark, RawBuffer, RawPtr};
//!
//! fn sum(values: &mut RawBuffer<f32>, _len: &mut usize) -> f32 {
//!     values.iter().sum()
//! }
//!
//! fn sum_sorted(values: &mut RawBuffer<f32>, _len: &mut usize) -> f32 {
//!     values.sort_by(f32::total_cmp);
//!     black_box(values.iter().sum())
//! }
//!
//! fn sum_pairwise(values: &mut RawBuffer<f32>, len: &mut usize) -> f32 {
//!     values[..*len]
//!         .chunks(2)
//!         .map(|pair| pair.iter().sum::<f32>())
//!         .sum()
//! }
//!
//! let data: Vec<f32> = (0..1000).map(|i| (i % 17) as f32 * 0.25).collect();
//! let mut bench = Benchmark::new(
//!     sum,
//!     |reference: &f32, output: &f32| (reference - output).abs(),
//!     100,
//!     (RawPtr::from_slice(&data), data.len()),
//! )
//! .unwrap();
//! bench.insert(sum_sorted, "sorted").unwrap();
//! bench.insert(sum_pairwise, "pairwise").unwrap();
//! bench.run().unwrap();
//! bench.print();
//!
//! // Candidates sorted their own copies, the data is untouched.
//! assert_eq!(data[1], 0.25);
//! ```
//!
//! ## Reporting
//! See the [report] module for more information on how to customize the output.
//!
//! ## Peak memory
//! With [PeakMemAlloc] as global allocator, [BenchmarkBuilder::track_memory] adds the peak
//! memory of every measurement to the report.
//! ```rust
//! use benchcmp::{BenchmarkBuilder, PeakMemAlloc, INSTRUMENTED_SYSTEM};
//!
//! #[global_allocator]
//! pub static GLOBAL: &PeakMemAlloc<std::alloc::System> = &INSTRUMENTED_SYSTEM;
//!
//! fn main() {
//!     let bench = BenchmarkBuilder::new(10)
//!         .track_memory(GLOBAL)
//!         .output_only(|v: &mut Vec<u64>| v.len(), (vec![0u64; 1024],))
//!         .unwrap();
//!     assert!(bench.baseline().peak_memory.is_some());
//! }
//! ```

pub use peakmem_alloc::*;

pub mod args;
mod bench_fn;
mod benchmark;
pub mod comparison;
mod config;
mod error;
mod output_value;
pub mod plugins;
mod record;
pub mod report;
pub mod timing;

pub use args::{
    first_of_type, ArgDescriptor, ArgPlan, ArgSet, BenchArg, BufferDescriptor, Container,
    ParamShape, RawBuffer, RawPtr, Scalar,
};
pub use bench_fn::BenchFn;
pub use benchmark::{Benchmark, BenchmarkBuilder, BASELINE_ID};
pub use comparison::{Comparison, OutputOnly, StateMetric, TimingOnly, ValueMetric};
pub use config::Config;
pub use error::{HarnessError, Result};
pub use output_value::OutputValue;
pub use record::Record;

/// A function that is opaque to the optimizer, used to prevent the compiler from
/// optimizing away computations in a benchmark.
pub use std::hint::black_box;
