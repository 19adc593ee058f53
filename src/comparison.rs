//! What is compared between the baseline and a candidate.
//!
//! The harness only times functions and stores whatever a [Comparison] captures from them.
//! Four comparisons cover the supported signatures:
//!
//! | comparison     | function returns | stored output       | error column           |
//! |----------------|------------------|---------------------|------------------------|
//! | [ValueMetric]  | a value          | the return value    | `metric(&reference, &output)` |
//! | [OutputOnly]   | a value          | the return value    | none                   |
//! | [StateMetric]  | `()`             | state captured from the arguments | `metric(&reference, &state)` |
//! | [TimingOnly]   | `()`             | nothing             | none                   |

use std::{any::type_name, marker::PhantomData};

use crate::{
    error::{HarnessError, Result},
    output_value::OutputValue,
};

/// Title of the error column.
pub const ERROR_COLUMN_TITLE: &str = "Error";

/// Which comparison columns show up in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    /// Title of the output column, if outputs are shown.
    pub output: Option<&'static str>,
    /// Whether the error column is shown.
    pub error: bool,
}

/// Captures a comparable output from a measured function and compares it to the reference.
///
/// `W` is the working argument set, `R` the return type of the benchmarked functions.
pub trait Comparison<W, R> {
    /// What is stored per record.
    type Output;
    /// What the metric computes.
    type Error;

    /// Extracts the output after the measured calls. `output` is the return value of the
    /// picked iteration, `working` the working set after the final call.
    fn capture(&self, output: R, working: &W) -> Result<Self::Output>;

    /// Computes the error of `candidate` relative to `reference`.
    fn compare(&self, reference: &Self::Output, candidate: &Self::Output) -> Self::Error;

    /// The columns shown in the report.
    fn columns(&self) -> Columns;

    /// Formats a stored output for its column.
    fn format_output(&self, output: &Self::Output) -> Option<String>;

    /// Formats an error for its column.
    fn format_error(&self, error: &Self::Error) -> Option<String>;
}

/// Compares return values with a metric.
pub struct ValueMetric<M, E> {
    metric: M,
    _error: PhantomData<fn() -> E>,
}

impl<M, E> ValueMetric<M, E> {
    /// Uses `metric(reference, candidate)` as error.
    pub fn new(metric: M) -> Self {
        Self {
            metric,
            _error: PhantomData,
        }
    }
}

impl<W, R, M, E> Comparison<W, R> for ValueMetric<M, E>
where
    R: OutputValue,
    E: OutputValue,
    M: Fn(&R, &R) -> E,
{
    type Output = R;
    type Error = E;

    fn capture(&self, output: R, _working: &W) -> Result<R> {
        Ok(output)
    }
    fn compare(&self, reference: &R, candidate: &R) -> E {
        (self.metric)(reference, candidate)
    }
    fn columns(&self) -> Columns {
        Columns {
            output: Some(R::column_title()),
            error: true,
        }
    }
    fn format_output(&self, output: &R) -> Option<String> {
        output.format()
    }
    fn format_error(&self, error: &E) -> Option<String> {
        error.format()
    }
}

/// Keeps return values for display without computing an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOnly;

impl<W, R: OutputValue> Comparison<W, R> for OutputOnly {
    type Output = R;
    type Error = ();

    fn capture(&self, output: R, _working: &W) -> Result<R> {
        Ok(output)
    }
    fn compare(&self, _reference: &R, _candidate: &R) {}
    fn columns(&self) -> Columns {
        Columns {
            output: Some(R::column_title()),
            error: false,
        }
    }
    fn format_output(&self, output: &R) -> Option<String> {
        output.format()
    }
    fn format_error(&self, _error: &()) -> Option<String> {
        None
    }
}

/// Captures state of type `S` from the arguments of a void function and compares it with
/// a metric.
///
/// The accessor sees the working set after the final call. Returning `None` fails the
/// measurement with [HarnessError::TypeNotFoundInArguments].
pub struct StateMetric<G, M, S, E> {
    accessor: G,
    metric: M,
    _marker: PhantomData<fn() -> (S, E)>,
}

impl<G, M, S, E> StateMetric<G, M, S, E> {
    /// Captures via `accessor` and compares via `metric(reference, candidate)`.
    pub fn new(accessor: G, metric: M) -> Self {
        Self {
            accessor,
            metric,
            _marker: PhantomData,
        }
    }
}

impl<W, G, M, S, E> Comparison<W, ()> for StateMetric<G, M, S, E>
where
    G: Fn(&W) -> Option<S>,
    M: Fn(&S, &S) -> E,
    E: OutputValue,
{
    type Output = S;
    type Error = E;

    fn capture(&self, _output: (), working: &W) -> Result<S> {
        (self.accessor)(working).ok_or(HarnessError::TypeNotFoundInArguments {
            type_name: type_name::<S>(),
        })
    }
    fn compare(&self, reference: &S, candidate: &S) -> E {
        (self.metric)(reference, candidate)
    }
    fn columns(&self) -> Columns {
        Columns {
            output: None,
            error: true,
        }
    }
    fn format_output(&self, _output: &S) -> Option<String> {
        None
    }
    fn format_error(&self, error: &E) -> Option<String> {
        error.format()
    }
}

/// Only runtime and speedup are reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingOnly;

impl<W> Comparison<W, ()> for TimingOnly {
    type Output = ();
    type Error = ();

    fn capture(&self, _output: (), _working: &W) -> Result<()> {
        Ok(())
    }
    fn compare(&self, _reference: &(), _candidate: &()) {}
    fn columns(&self) -> Columns {
        Columns {
            output: None,
            error: false,
        }
    }
    fn format_output(&self, _output: &()) -> Option<String> {
        None
    }
    fn format_error(&self, _error: &()) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::first_of_type;

    #[test]
    fn value_metric() {
        let comparison = ValueMetric::new(|a: &f64, b: &f64| a - b);
        let output = Comparison::<(), f64>::capture(&comparison, 12.0, &()).unwrap();
        assert_eq!(Comparison::<(), f64>::compare(&comparison, &12.5, &output), 0.5);
        assert_eq!(
            Comparison::<(), f64>::columns(&comparison),
            Columns {
                output: Some("Result"),
                error: true
            }
        );
    }

    #[test]
    fn state_metric_captures_from_arguments() {
        let comparison = StateMetric::<_, _, Vec<i32>, i64>::new(
            first_of_type::<(Vec<i32>, usize), Vec<i32>>,
            |a: &Vec<i32>, b: &Vec<i32>| (b.len() as i64) - (a.len() as i64),
        );
        let working = (vec![1, 2, 3], 4usize);
        let state = comparison.capture((), &working).unwrap();
        assert_eq!(state, vec![1, 2, 3]);
        assert_eq!(
            Comparison::<(Vec<i32>, usize), ()>::compare(&comparison, &vec![1], &state),
            2
        );
    }

    #[test]
    fn state_metric_without_state_fails() {
        let comparison = StateMetric::<_, _, String, u8>::new(
            first_of_type::<(u32,), String>,
            |_: &String, _: &String| 0u8,
        );
        let result = comparison.capture((), &(1u32,));
        assert_eq!(
            result,
            Err(HarnessError::TypeNotFoundInArguments {
                type_name: type_name::<String>()
            })
        );
    }

    #[test]
    fn timing_only_has_no_columns() {
        let columns = Comparison::<(), ()>::columns(&TimingOnly);
        assert_eq!(columns.output, None);
        assert!(!columns.error);
    }
}
