//! Fatal error conditions of the rewriting core.
//!
//! "Nothing matched" and "no rule applies" are not errors: they are reported as
//! `None` or empty iterators by the operations that produce them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A linearized term is not a well-formed Euler tour.
    #[error("malformed euler tour: {0}")]
    MalformedInput(String),

    /// Two nodes carrying the same symbol were compared with different child counts.
    #[error("symbol `{symbol}` used with arities {left} and {right}")]
    ArityMismatch {
        symbol: String,
        left: usize,
        right: usize,
    },

    /// An explicit rule no longer strictly decreases under the ordering.
    #[error("rule {rule} does not decrease under the term ordering")]
    OrderingInvariantViolation { rule: String },

    /// The s-expression reader rejected its input.
    #[error("could not parse `{input}`: {reason}")]
    Parse { input: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
