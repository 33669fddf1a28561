//! Pattern matching and substitution on linearized terms.
//!
//! A pattern is split at its variables into fixed fragments. The fragments are
//! located in the input with a single [`AhoCorasick`] pass, after which every
//! start offset is tried by chaining the fragments: after a fragment, the next
//! input position must be the first occurrence of some node, and the variable
//! captures everything up to the last occurrence of that node (its subtree).
//!
//! Variables appearing in the *input* are plain symbols here, so open terms can
//! be matched and rewritten as they are.

use std::collections::{HashMap, HashSet};

use super::aho_corasick::AhoCorasick;
use crate::error::Result;
use crate::tree::{EulerTerm, NodeId, Occurrences, is_variable};

/// Variable name to the captured subterm of the input.
pub type Bindings = HashMap<String, EulerTerm>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatch {
    pub bindings: Bindings,
    /// Matched positions of the input are `start..end`.
    pub start: usize,
    pub end: usize,
}

fn split_by_variables(symbols: &[String]) -> (Vec<&[String]>, Vec<&str>) {
    let mut fixed = Vec::new();
    let mut variables = Vec::new();
    let mut fragment_start = 0;

    for (position, symbol) in symbols.iter().enumerate() {
        if is_variable(symbol) {
            fixed.push(&symbols[fragment_start..position]);
            variables.push(symbol.as_str());
            fragment_start = position + 1;
        }
    }
    fixed.push(&symbols[fragment_start..]);

    (fixed, variables)
}

/// Lazy iterator over the matches of a pattern, in increasing start offset.
pub struct PatternMatches<'a> {
    input: &'a EulerTerm,
    fixed: Vec<&'a [String]>,
    variables: Vec<&'a str>,
    occurrences: Occurrences,
    /// `(start offset, fragment index)` pairs where a fragment occurs.
    found: HashSet<(usize, usize)>,
    next_start: usize,
}

impl<'a> PatternMatches<'a> {
    fn new(input: &'a EulerTerm, pattern: &'a EulerTerm) -> Self {
        let (fixed, variables) = split_by_variables(pattern.symbols());

        let automaton = AhoCorasick::new(fixed.iter().copied());
        let mut found = HashSet::new();
        for (end, keywords) in automaton.search(input.symbols()) {
            for keyword in keywords {
                let start = end + 1 - keyword.len();
                for (index, fragment) in fixed.iter().enumerate() {
                    if *fragment == keyword {
                        found.insert((start, index));
                    }
                }
            }
        }

        Self {
            input,
            fixed,
            variables,
            occurrences: input.occurrences(),
            found,
            next_start: 0,
        }
    }

    fn match_at(&self, start: usize) -> Option<PatternMatch> {
        let mut bindings = Bindings::new();
        let mut position = start;

        for (index, fragment) in self.fixed.iter().enumerate() {
            if !fragment.is_empty() && !self.found.contains(&(position, index)) {
                return None;
            }
            position += fragment.len();

            let Some(&variable) = self.variables.get(index) else {
                break;
            };

            if !self.occurrences.is_first(position) {
                return None;
            }
            let last = self.occurrences.last(self.input.ids()[position])?;
            let capture = self.input.subterm(position, last + 1);

            match bindings.get(variable) {
                Some(bound) if !bound.same_symbols(&capture) => return None,
                Some(_) => {}
                None => {
                    bindings.insert(variable.to_owned(), capture);
                }
            }
            position = last + 1;
        }

        Some(PatternMatch {
            bindings,
            start,
            end: position,
        })
    }
}

impl Iterator for PatternMatches<'_> {
    type Item = PatternMatch;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_start < self.input.len() {
            let start = self.next_start;
            self.next_start += 1;

            if let Some(found) = self.match_at(start) {
                return Some(found);
            }
        }

        None
    }
}

/// All matches of `pattern` inside `input`.
pub fn pattern_match<'a>(input: &'a EulerTerm, pattern: &'a EulerTerm) -> PatternMatches<'a> {
    PatternMatches::new(input, pattern)
}

/// A match covering the whole of `term`.
pub fn match_at_root(term: &EulerTerm, pattern: &EulerTerm) -> Option<PatternMatch> {
    pattern_match(term, pattern).find(|m| m.start == 0 && m.end == term.len())
}

/// Whether `term` is an instance of `pattern`.
pub fn is_instance_of(term: &EulerTerm, pattern: &EulerTerm) -> bool {
    match_at_root(term, pattern).is_some()
}

/// Whether some subterm of `term` is an instance of `pattern`.
pub fn contains_instance(term: &EulerTerm, pattern: &EulerTerm) -> bool {
    pattern_match(term, pattern).any(|m| term.is_subtree_span(m.start, m.end))
}

/// Whether some non-leaf subterm `t` of `term` contains an instance of
/// `pattern` while `pattern` contains no instance of `t`.
pub fn properly_contains_instance(term: &EulerTerm, pattern: &EulerTerm) -> Result<bool> {
    let tree = term.to_tree()?;

    Ok(tree.traverse().filter(|node| !node.is_leaf()).any(|node| {
        let subterm = node.linearize();
        contains_instance(&subterm, pattern) && !contains_instance(pattern, &subterm)
    }))
}

/// Deterministic source of node identifiers for copied subtrees.
#[derive(Clone, Debug, Default)]
pub struct FreshIds {
    next: NodeId,
}

impl FreshIds {
    pub fn starting_at(next: NodeId) -> Self {
        Self { next }
    }

    /// A counter whose identifiers collide with none of `terms`.
    pub fn above<'t>(terms: impl IntoIterator<Item = &'t EulerTerm>) -> Self {
        let mut fresh = Self::default();
        for term in terms {
            fresh.reserve(term);
        }
        fresh
    }

    /// Moves the counter past every identifier of `term`.
    pub fn reserve(&mut self, term: &EulerTerm) {
        if let Some(max) = term.max_id() {
            self.next = self.next.max(max + 1);
        }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Maps every distinct identifier of `term` to a new one, keeping repeats aligned.
    pub fn renumber(&mut self, term: &EulerTerm) -> EulerTerm {
        let mut mapping = HashMap::new();
        let ids = term
            .ids()
            .iter()
            .map(|id| *mapping.entry(*id).or_insert_with(|| self.next_id()))
            .collect();

        EulerTerm::from_parts_unchecked(ids, term.symbols().to_vec())
    }
}

/// Replaces every bound variable of `term` by a fresh copy of its binding.
/// Replacement is simultaneous: variables inside a binding are left alone.
pub fn instantiate(term: &EulerTerm, bindings: &Bindings, fresh: &mut FreshIds) -> EulerTerm {
    let mut own_ids = HashMap::new();
    let mut ids = Vec::with_capacity(term.len());
    let mut symbols = Vec::with_capacity(term.len());

    for (id, symbol) in term.ids().iter().zip(term.symbols()) {
        match bindings.get(symbol) {
            Some(binding) if is_variable(symbol) => {
                let copy = fresh.renumber(binding);
                ids.extend_from_slice(copy.ids());
                symbols.extend_from_slice(copy.symbols());
            }
            _ => {
                ids.push(*own_ids.entry(*id).or_insert_with(|| fresh.next_id()));
                symbols.push(symbol.clone());
            }
        }
    }

    EulerTerm::from_parts_unchecked(ids, symbols)
}

fn instantiate_symbols(pattern: &EulerTerm, bindings: &Bindings) -> Vec<String> {
    let mut symbols = Vec::with_capacity(pattern.len());
    for symbol in pattern.symbols() {
        match bindings.get(symbol) {
            Some(binding) if is_variable(symbol) => symbols.extend_from_slice(binding.symbols()),
            _ => symbols.push(symbol.clone()),
        }
    }
    symbols
}

fn find_sequence(haystack: &[String], needle: &[String], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }

    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Rewrites `input` with the first match of `pattern`: the pattern and the
/// template are instantiated with that match's bindings, then every subtree of
/// `input` spelling the instantiated pattern is replaced by a fresh copy of the
/// instantiated template. Returns `input` unchanged when nothing matches.
pub fn substitute(
    input: &EulerTerm,
    pattern: &EulerTerm,
    template: &EulerTerm,
    fresh: &mut FreshIds,
) -> EulerTerm {
    fresh.reserve(input);

    let Some(first) = pattern_match(input, pattern).next() else {
        return input.clone();
    };

    let target = instantiate_symbols(pattern, &first.bindings);
    let replacement = instantiate(template, &first.bindings, fresh);

    let mut output = input.clone();
    let mut from = 0;
    while let Some(start) = find_sequence(output.symbols(), &target, from) {
        let end = start + target.len();
        if output.is_subtree_span(start, end) {
            output.splice(start, end, fresh.renumber(&replacement));
            from = start + replacement.len();
        } else {
            from = start + 1;
        }
    }

    output
}
