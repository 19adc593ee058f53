use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors surfaced by construction, [insert](crate::Benchmark::insert) and
/// [run](crate::Benchmark::run).
///
/// None of them are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Zero iterations, or argument descriptors that do not fit the arguments.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The state accessor of a void benchmark found nothing to capture.
    #[error("type `{type_name}` not found in arguments")]
    TypeNotFoundInArguments {
        /// Name of the type that was looked up.
        type_name: &'static str,
    },
    /// A candidate with this id is already registered.
    #[error("duplicate identifier `{0}`")]
    DuplicateIdentifier(String),
    /// The copy of a raw buffer could not be allocated.
    #[error("could not allocate {bytes} bytes for a copy of {count} elements")]
    AllocationFailure {
        /// Number of elements requested.
        count: usize,
        /// Number of bytes requested, saturated on overflow.
        bytes: usize,
    },
}

impl HarnessError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        HarnessError::InvalidConfiguration(msg.into())
    }
}
