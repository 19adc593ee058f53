use std::cmp::Ordering;

/// Measurement of one function, the baseline or a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<O, E> {
    /// Identifier, unique per harness.
    pub id: String,
    /// Average runtime of one call in nanoseconds. 0 until measured.
    pub runtime_ns: f64,
    /// Baseline runtime divided by this runtime. `None` until measured.
    pub speedup: Option<f64>,
    /// Captured output, `None` until measured.
    pub output: Option<O>,
    /// Error relative to the baseline, `None` until measured.
    pub error: Option<E>,
    /// Peak memory allocated during the measurement, if tracked.
    pub peak_memory: Option<usize>,
}

impl<O, E> Record<O, E> {
    pub(crate) fn unmeasured(id: String) -> Self {
        Self {
            id,
            runtime_ns: 0.0,
            speedup: None,
            output: None,
            error: None,
            peak_memory: None,
        }
    }

    /// Whether the record was populated by a run.
    pub fn is_measured(&self) -> bool {
        self.speedup.is_some()
    }
}

/// Orders candidates for the report: measured ones by ascending runtime, unmeasured ones
/// last. Used with a stable sort, so ties keep insertion order.
pub(crate) fn by_runtime<O, E>(a: &&Record<O, E>, b: &&Record<O, E>) -> Ordering {
    match (a.is_measured(), b.is_measured()) {
        (true, true) => a.runtime_ns.total_cmp(&b.runtime_ns),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

/// References to `baseline` followed by `candidates` in report order.
pub(crate) fn ranked<'a, O, E>(
    baseline: &'a Record<O, E>,
    candidates: &'a [Record<O, E>],
) -> Vec<&'a Record<O, E>> {
    let mut sorted: Vec<&Record<O, E>> = candidates.iter().collect();
    sorted.sort_by(by_runtime);
    std::iter::once(baseline).chain(sorted).collect()
}
