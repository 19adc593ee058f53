//! The timing protocol.
//!
//! Only the call itself is inside the timed window. Materializing arguments, dropping
//! outputs and shifting the stack happen outside of it.

use quanta::Instant;

use crate::{
    args::{ArgPlan, ArgSet, WorkingSlot},
    black_box,
    error::{HarnessError, Result},
};

/// Stack offsets cycle through this many bytes.
const STACK_OFFSET_RANGE: usize = 64;

/// Which iteration's output is kept by [time_n].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPick {
    /// The output of the first iteration. Used for the baseline, so the reference does not
    /// depend on later iterations.
    First,
    /// The output of the last iteration. Used for candidates.
    Last,
}

/// The outcome of [time_n].
#[derive(Debug)]
pub struct Measurement<R, W> {
    /// Mean runtime of one call in nanoseconds.
    pub average_ns: f64,
    /// The output picked by [OutputPick].
    pub output: R,
    /// The working set of the final iteration, after the call.
    pub working: W,
}

/// Times a single call. Returns the output and the elapsed nanoseconds.
#[inline]
pub fn time_once<W, R, F>(fun: &F, working: &mut W) -> (R, f64)
where
    F: Fn(&mut W) -> R + ?Sized,
{
    let start = Instant::now();
    let output = fun(working);
    let end = Instant::now();
    (output, end.duration_since(start).as_nanos() as f64)
}

/// Calls `fun` `iterations` times and averages the runtime.
///
/// The working set is materialized anew before every call if the plan
/// [needs fresh copies](ArgPlan::needs_fresh_copy), otherwise one working set is reused
/// and its scalars restored between calls.
pub fn time_n<A, R, F>(
    plan: &ArgPlan<A>,
    fun: &F,
    iterations: usize,
    pick: OutputPick,
) -> Result<Measurement<R, A::Working>>
where
    A: ArgSet,
    F: Fn(&mut A::Working) -> R + ?Sized,
{
    if iterations == 0 {
        return Err(HarnessError::invalid("iterations must be at least 1"));
    }
    let fresh_copy = plan.needs_fresh_copy();
    let mut slot = WorkingSlot::new();
    let mut total_ns = 0.0f64;
    let mut picked = None;

    for iteration in 0..iterations {
        let working = if fresh_copy {
            slot.refill(plan)?
        } else {
            slot.reuse(plan)?
        };
        let (output, elapsed_ns) =
            on_shifted_stack(iteration % STACK_OFFSET_RANGE, || time_once(fun, working));
        total_ns += elapsed_ns;

        let keep = match pick {
            OutputPick::First => iteration == 0,
            OutputPick::Last => iteration + 1 == iterations,
        };
        if keep {
            picked = Some(output);
        } else {
            black_box(output);
        }
    }

    match (picked, slot.into_inner()) {
        (Some(output), Some(working)) => Ok(Measurement {
            average_ns: total_ns / iterations as f64,
            output,
            working,
        }),
        _ => Err(HarnessError::invalid("measurement produced no output")),
    }
}

/// Runs `f` with the stack moved down by `offset` bytes.
///
/// Moving the stack a little for every iteration spreads out effects of memory layout and
/// alignment on the measurement.
#[inline]
fn on_shifted_stack<T>(offset: usize, f: impl FnOnce() -> T) -> T {
    #[cfg(any(target_family = "unix", target_family = "windows"))]
    {
        alloca::with_alloca(offset, |_memory: &mut [core::mem::MaybeUninit<u8>]| f())
    }
    #[cfg(not(any(target_family = "unix", target_family = "windows")))]
    {
        let _ = offset;
        f()
    }
}
