//! Error types for seams.

/// Errors that can occur while compiling a grammar.
///
/// Scanning itself never fails: a compiled [`Grammar`](crate::Grammar) can be
/// run over any text, and every configuration error is caught up front at
/// compile time.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A limit of zero would make its rule unable to match anything.
    #[error("limit `{name}` must be positive (got {value})")]
    InvalidLimit {
        /// Name of the offending `Limits` field.
        name: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// A limit large enough to make a bounded repetition effectively
    /// unbounded.
    #[error("limit `{name}` is {value}, above the ceiling of {max}")]
    LimitTooLarge {
        /// Name of the offending `Limits` field.
        name: &'static str,
        /// The rejected value.
        value: usize,
        /// The ceiling it exceeded.
        max: usize,
    },

    /// A rule pattern failed to compile. Only reachable when unusually
    /// large (but still validated) limits push a line-shaped pattern past
    /// the regex engine's compiled-size budget; surfaced rather than
    /// panicking.
    #[error("rule pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for seams operations.
pub type Result<T> = std::result::Result<T, Error>;
