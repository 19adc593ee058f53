use super::{check_descriptors, infer_descriptors, ArgDescriptor, ArgSet};
use crate::error::Result;

/// The originally captured arguments together with their descriptors.
///
/// Descriptors are fixed at construction. The plan itself is never handed to a benchmarked
/// function, only the working sets it materializes.
pub struct ArgPlan<A: ArgSet> {
    original: A,
    descriptors: Vec<ArgDescriptor>,
    fresh_copy: bool,
}

impl<A: ArgSet> ArgPlan<A> {
    /// Classifies the arguments by their shapes.
    pub fn new(original: A) -> Result<Self> {
        let descriptors = infer_descriptors(&original.shapes())?;
        Self::with_descriptors(original, descriptors)
    }

    /// Uses explicitly given descriptors, which must fit the argument shapes.
    pub fn with_descriptors(original: A, descriptors: Vec<ArgDescriptor>) -> Result<Self> {
        check_descriptors(&original.shapes(), &descriptors)?;
        original.validate(&descriptors)?;
        let fresh_copy = descriptors.iter().any(ArgDescriptor::needs_fresh_copy);
        Ok(Self {
            original,
            descriptors,
            fresh_copy,
        })
    }

    /// One descriptor per argument position.
    pub fn descriptors(&self) -> &[ArgDescriptor] {
        &self.descriptors
    }

    /// Whether any argument is a container or raw buffer.
    ///
    /// If not, a single working set can be reused across iterations.
    pub fn needs_fresh_copy(&self) -> bool {
        self.fresh_copy
    }

    /// The arguments as passed at construction.
    pub fn original(&self) -> &A {
        &self.original
    }

    /// Produces a working set copied from the original arguments.
    pub fn materialize(&self) -> Result<A::Working> {
        self.original.materialize(&self.descriptors)
    }

    pub(crate) fn restore(&self, working: &mut A::Working) -> Result<()> {
        self.original.restore(&self.descriptors, working)
    }
}

/// Holds the working set of the current iteration.
///
/// The previous working set is dropped before the next one is materialized, so at most one
/// set of copies is alive at any time.
pub(crate) struct WorkingSlot<W> {
    current: Option<W>,
}

impl<W> WorkingSlot<W> {
    pub(crate) fn new() -> Self {
        Self { current: None }
    }

    /// Releases the current working set and materializes a new one.
    pub(crate) fn refill<A: ArgSet<Working = W>>(&mut self, plan: &ArgPlan<A>) -> Result<&mut W> {
        self.current = None;
        let working = plan.materialize()?;
        Ok(self.current.insert(working))
    }

    /// Keeps the current working set, restoring it in place.
    pub(crate) fn reuse<A: ArgSet<Working = W>>(&mut self, plan: &ArgPlan<A>) -> Result<&mut W> {
        match self.current.take() {
            Some(mut working) => {
                plan.restore(&mut working)?;
                Ok(self.current.insert(working))
            }
            None => self.refill(plan),
        }
    }

    pub(crate) fn into_inner(self) -> Option<W> {
        self.current
    }
}
