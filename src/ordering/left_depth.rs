use std::collections::HashSet;

use super::TermOrdering;
use crate::error::{Error, Result};
use crate::tree::EulerTerm;

/// Orders terms by the position at which their Euler tour first returns to an
/// already visited node, i.e. how deep the leftmost branch goes.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeftDepthOrdering;

fn left_depth(term: &EulerTerm) -> Result<usize> {
    if term.len() <= 1 {
        return Ok(term.len());
    }

    let mut seen = HashSet::new();
    term.ids()
        .iter()
        .position(|id| !seen.insert(*id))
        .ok_or_else(|| {
            Error::MalformedInput(format!("tour {:?} never revisits a node", term.symbols()))
        })
}

impl TermOrdering for LeftDepthOrdering {
    fn greater_than(&self, a: &EulerTerm, b: &EulerTerm) -> Result<bool> {
        Ok(left_depth(a)? > left_depth(b)?)
    }
}
