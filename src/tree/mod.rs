//! Tree form of terms.
//!
//! A [`Term`] is a node carrying an identifier, a symbol and an ordered list of
//! children. Identifiers are unique within one tree and are what the Euler
//! linearization in [`euler`] uses to recover the tree shape.

use serde::{Deserialize, Serialize};

pub mod euler;
pub mod parsing;

pub use euler::{EulerTerm, Occurrences};

/// Identifier of a node, unique within a single tree.
pub type NodeId = usize;

/// Leading marker of variable symbols.
pub const VARIABLE_PREFIX: char = '$';

pub fn is_variable(symbol: &str) -> bool {
    symbol.starts_with(VARIABLE_PREFIX)
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Term {
    pub id: NodeId,
    pub symbol: String,
    pub children: Vec<Term>,
}

impl Term {
    pub fn new(id: NodeId, symbol: impl Into<String>, children: Vec<Term>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            children,
        }
    }

    pub fn leaf(id: NodeId, symbol: impl Into<String>) -> Self {
        Self::new(id, symbol, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Variables are leaves whose symbol carries the [`VARIABLE_PREFIX`].
    pub fn is_variable(&self) -> bool {
        self.is_leaf() && is_variable(&self.symbol)
    }

    /// Depth-first, pre-order walk over all nodes, children left to right.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse { stack: vec![self] }
    }

    /// Equality of symbols and shape, ignoring identifiers.
    pub fn same_structure(&self, other: &Term) -> bool {
        self.symbol == other.symbol
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_structure(b))
    }

    /// Whether `variable` occurs as a variable leaf anywhere in `self`.
    pub fn contains_variable(&self, variable: &str) -> bool {
        self.traverse()
            .any(|node| node.is_variable() && node.symbol == variable)
    }

    pub fn node_count(&self) -> usize {
        self.traverse().count()
    }
}

/// Lazy pre-order traversal returned by [`Term::traverse`]. Each call to
/// [`Term::traverse`] starts a fresh walk.
#[derive(Clone, Debug)]
pub struct Traverse<'t> {
    stack: Vec<&'t Term>,
}

impl<'t> Iterator for Traverse<'t> {
    type Item = &'t Term;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_leaf() {
            return write!(f, "{}", self.symbol);
        }

        write!(f, "({}", self.symbol)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}
