//! Well-founded orderings used to orient equations and to guard rewriting.

use std::cmp::Ordering;

use crate::error::Result;
use crate::tree::EulerTerm;

pub mod left_depth;
pub mod lpo;

pub use left_depth::LeftDepthOrdering;
pub use lpo::LexicographicPathOrdering;

/// A strict order on terms.
///
/// Implementors only decide [`TermOrdering::greater_than`]; the three-way
/// comparison is derived from it.
pub trait TermOrdering {
    /// Whether `a` is strictly greater than `b`.
    ///
    /// # Errors
    ///
    /// Fails when either term is not a well-formed Euler tour or when the
    /// ordering finds the same symbol used with two different arities.
    fn greater_than(&self, a: &EulerTerm, b: &EulerTerm) -> Result<bool>;

    /// `Greater` if `a > b`, `Less` if `b > a`, `Equal` when neither dominates.
    /// `Equal` therefore also covers incomparable terms.
    fn compare(&self, a: &EulerTerm, b: &EulerTerm) -> Result<Ordering> {
        if self.greater_than(a, b)? {
            return Ok(Ordering::Greater);
        }
        if self.greater_than(b, a)? {
            return Ok(Ordering::Less);
        }
        Ok(Ordering::Equal)
    }
}
