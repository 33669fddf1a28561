//! Euler-tour linearization of terms.
//!
//! The linear form of a tree is produced by a pre-order walk which re-emits a
//! node every time the walk returns to it from one of its children, so a node
//! with `k` children occurs exactly `k + 1` times. Any range starting at the
//! first occurrence of a node and ending at its last occurrence is the linear
//! form of that node's subtree, which turns subtree search into sequence search
//! and subtree replacement into a splice.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{NodeId, Term, is_variable};
use crate::error::{Error, Result};

/// A term as two parallel sequences of identifiers and symbols.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EulerTerm {
    ids: Vec<NodeId>,
    symbols: Vec<String>,
}

impl EulerTerm {
    /// Builds a linear term from raw sequences. Only the lengths are checked here,
    /// the tour structure is checked by [`EulerTerm::to_tree`].
    pub fn from_parts(ids: Vec<NodeId>, symbols: Vec<String>) -> Result<Self> {
        if ids.len() != symbols.len() {
            return Err(Error::MalformedInput(format!(
                "{} identifiers but {} symbols",
                ids.len(),
                symbols.len()
            )));
        }
        if ids.is_empty() {
            return Err(Error::MalformedInput(String::from("empty tour")));
        }

        Ok(Self { ids, symbols })
    }

    /// Callers guarantee equal, non-zero lengths.
    pub(crate) fn from_parts_unchecked(ids: Vec<NodeId>, symbols: Vec<String>) -> Self {
        debug_assert_eq!(ids.len(), symbols.len());
        Self { ids, symbols }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(Term::parse(s)?.linearize())
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn max_id(&self) -> Option<NodeId> {
        self.ids.iter().copied().max()
    }

    /// Equality of the symbol sequences. Identifiers are not compared.
    pub fn same_symbols(&self, other: &EulerTerm) -> bool {
        self.symbols == other.symbols
    }

    /// Variable symbols in order of appearance, repeats included.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .map(String::as_str)
            .filter(|symbol| is_variable(symbol))
    }

    /// Renames symbols, keeping identifiers and shape.
    pub fn map_symbols(&self, mut f: impl FnMut(&str) -> String) -> Self {
        Self {
            ids: self.ids.clone(),
            symbols: self.symbols.iter().map(|s| f(s)).collect(),
        }
    }

    /// Reconstructs the tree. An identifier equal to the parent of the innermost
    /// open node closes that node; any other identifier opens a new child.
    pub fn to_tree(&self) -> Result<Term> {
        if self.ids.len() != self.symbols.len() {
            return Err(Error::MalformedInput(String::from(
                "identifier and symbol sequences differ in length",
            )));
        }

        let Some((&root_id, rest)) = self.ids.split_first() else {
            return Err(Error::MalformedInput(String::from("empty tour")));
        };

        let mut seen = HashSet::from([root_id]);
        let mut open = vec![Term::leaf(root_id, self.symbols[0].clone())];

        for (offset, &id) in rest.iter().enumerate() {
            let symbol = &self.symbols[offset + 1];
            let closes_innermost = open.len() >= 2 && open[open.len() - 2].id == id;

            if closes_innermost {
                let parent_symbol = &open[open.len() - 2].symbol;
                if parent_symbol != symbol {
                    return Err(Error::MalformedInput(format!(
                        "node {id} revisited as `{symbol}` but opened as `{parent_symbol}`"
                    )));
                }

                if let Some(done) = open.pop()
                    && let Some(parent) = open.last_mut()
                {
                    parent.children.push(done);
                }
            } else {
                if !seen.insert(id) {
                    return Err(Error::MalformedInput(format!(
                        "node {id} revisited at position {} without closing its children",
                        offset + 1
                    )));
                }
                open.push(Term::leaf(id, symbol.clone()));
            }
        }

        if open.len() != 1 {
            return Err(Error::MalformedInput(format!(
                "{} nodes left unclosed",
                open.len() - 1
            )));
        }

        open.pop()
            .ok_or_else(|| Error::MalformedInput(String::from("empty tour")))
    }

    pub fn occurrences(&self) -> Occurrences {
        let mut seen = HashSet::new();
        let mut is_first = Vec::with_capacity(self.ids.len());
        let mut last = HashMap::new();

        for (position, &id) in self.ids.iter().enumerate() {
            is_first.push(seen.insert(id));
            last.insert(id, position);
        }

        Occurrences { is_first, last }
    }

    /// Copy of the positions `start..end`. Callers pass a subtree span.
    pub(crate) fn subterm(&self, start: usize, end: usize) -> Self {
        Self {
            ids: self.ids[start..end].to_vec(),
            symbols: self.symbols[start..end].to_vec(),
        }
    }

    /// Replaces the positions `start..end` by `replacement`.
    pub(crate) fn splice(&mut self, start: usize, end: usize, replacement: EulerTerm) {
        self.ids.splice(start..end, replacement.ids);
        self.symbols.splice(start..end, replacement.symbols);
    }

    /// Whether `start..end` spans exactly one subtree: it starts at the first
    /// occurrence of a node and ends at the last occurrence of the same node.
    pub fn is_subtree_span(&self, start: usize, end: usize) -> bool {
        if start >= end || end > self.ids.len() {
            return false;
        }

        let id = self.ids[start];
        self.ids[end - 1] == id
            && !self.ids[..start].contains(&id)
            && !self.ids[end..].contains(&id)
    }
}

impl std::fmt::Display for EulerTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_tree() {
            Ok(tree) => write!(f, "{tree}"),
            Err(_) => write!(f, "[{}]", self.symbols.join(" ")),
        }
    }
}

/// First/last occurrence bookkeeping for the identifiers of a linear term.
#[derive(Clone, Debug)]
pub struct Occurrences {
    is_first: Vec<bool>,
    last: HashMap<NodeId, usize>,
}

impl Occurrences {
    /// `false` for positions past the end.
    pub fn is_first(&self, position: usize) -> bool {
        self.is_first.get(position).copied().unwrap_or(false)
    }

    pub fn last(&self, id: NodeId) -> Option<usize> {
        self.last.get(&id).copied()
    }
}

impl Term {
    pub fn linearize(&self) -> EulerTerm {
        let mut ids = vec![self.id];
        let mut symbols = vec![self.symbol.clone()];
        let mut stack = vec![(self, 0usize)];

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if let Some(child) = node.children.get(next) {
                top.1 += 1;
                ids.push(child.id);
                symbols.push(child.symbol.clone());
                stack.push((child, 0));
            } else {
                stack.pop();
                if let Some(&(parent, _)) = stack.last() {
                    ids.push(parent.id);
                    symbols.push(parent.symbol.clone());
                }
            }
        }

        EulerTerm { ids, symbols }
    }
}
