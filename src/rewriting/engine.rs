//! Applying a rewrite system to a single term.

use std::cmp::Ordering;

use log::{trace, warn};

use super::{Rule, System};
use crate::error::Result;
use crate::matching::{FreshIds, substitute};
use crate::ordering::TermOrdering;
use crate::tree::EulerTerm;

/// Outcome of one successful rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteStep {
    pub term: EulerTerm,
    pub rule: Rule,
}

/// Rewrites terms against a [`System`] under a fixed ordering.
///
/// The rewriter owns the identifier counter used for every copied subtree, so
/// all terms produced through one rewriter have pairwise distinct fresh
/// identifiers and runs are reproducible.
pub struct Rewriter<'o> {
    ordering: &'o dyn TermOrdering,
    fresh: FreshIds,
    max_steps: Option<usize>,
}

impl<'o> Rewriter<'o> {
    pub fn new(ordering: &'o dyn TermOrdering) -> Self {
        Self {
            ordering,
            fresh: FreshIds::default(),
            max_steps: None,
        }
    }

    pub fn with_fresh_ids(mut self, fresh: FreshIds) -> Self {
        self.fresh = fresh;
        self
    }

    /// Caps every [`Rewriter::normalize`] call.
    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn ordering(&self) -> &'o dyn TermOrdering {
        self.ordering
    }

    pub fn fresh_ids(&mut self) -> &mut FreshIds {
        &mut self.fresh
    }

    /// Applies the first rule of `system.rules_with_equations()` that changes
    /// `term`. A rule taken from an equation is skipped unless its result is
    /// strictly smaller than `term`.
    pub fn rewrite_step(&mut self, term: &EulerTerm, system: &System) -> Result<Option<RewriteStep>> {
        for rule in system.rules_with_equations() {
            let rewritten = substitute(term, rule.from(), rule.to(), &mut self.fresh);
            if rewritten.same_symbols(term) {
                continue;
            }

            if rule.is_from_equation() && self.ordering.compare(&rewritten, term)? != Ordering::Less {
                continue;
            }

            trace!("{term} => {rewritten} by {rule}");
            return Ok(Some(RewriteStep {
                term: rewritten,
                rule,
            }));
        }

        Ok(None)
    }

    /// Rewrites until no rule applies or the step cap is reached.
    pub fn normalize(&mut self, term: &EulerTerm, system: &System) -> Result<EulerTerm> {
        let mut current = term.clone();
        let mut steps = 0;

        loop {
            if let Some(max) = self.max_steps
                && steps >= max
            {
                warn!("normalization of {term} stopped after {max} steps at {current}");
                return Ok(current);
            }

            match self.rewrite_step(&current, system)? {
                Some(step) => current = step.term,
                None => return Ok(current),
            }
            steps += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::system;
    use crate::ordering::LexicographicPathOrdering;

    fn lpo() -> LexicographicPathOrdering {
        LexicographicPathOrdering::new(["~", "-", "!", "grade", "*", "^", "+", "="])
    }

    fn euler(s: &str) -> EulerTerm {
        EulerTerm::parse(s).unwrap()
    }

    #[test]
    fn no_applicable_rule() {
        let ordering = lpo();
        let mut rewriter = Rewriter::new(&ordering);
        let system = system!(rules: ["(+ $x 0)" => "$x"], equations: []);
        assert_eq!(rewriter.rewrite_step(&euler("(* a b)"), &system).unwrap(), None);
    }

    #[test]
    fn explicit_rule_reports_itself() {
        let ordering = lpo();
        let mut rewriter = Rewriter::new(&ordering);
        let system = system!(rules: ["(* $x 1)" => "$x", "(+ $x 0)" => "$x"], equations: []);
        let step = rewriter.rewrite_step(&euler("(* (+ a 0) 2)"), &system).unwrap().unwrap();
        assert_eq!(step.term.to_string(), "(* a 2)");
        assert_eq!(step.rule.to_string(), "(+ $x 0) -> $x");
    }

    #[test]
    fn equation_only_applies_when_decreasing() {
        let ordering = lpo();
        let mut rewriter = Rewriter::new(&ordering);
        let system = system!(rules: [], equations: ["(+ $x $y)" = "(+ $y $x)"]);

        let step = rewriter.rewrite_step(&euler("(+ b a)"), &system).unwrap().unwrap();
        assert_eq!(step.term.to_string(), "(+ a b)");
        assert!(step.rule.is_from_equation());

        assert_eq!(rewriter.rewrite_step(&euler("(+ a b)"), &system).unwrap(), None);
    }

    #[test]
    fn normalize_with_commutativity() {
        let ordering = lpo();
        let mut rewriter = Rewriter::new(&ordering);
        let system = system!(
            rules: ["(+ 0 $x)" => "$x"],
            equations: ["(+ $x $y)" = "(+ $y $x)"],
        );

        let normal = rewriter.normalize(&euler("(+ (+ a b) 0)"), &system).unwrap();
        assert_eq!(normal.symbols(), ["+", "a", "+", "b", "+"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let ordering = lpo();
        let mut rewriter = Rewriter::new(&ordering);
        let system = system!(
            rules: ["(+ $x 0)" => "$x", "(* $x 1)" => "$x"],
            equations: [],
        );

        let normal = rewriter.normalize(&euler("(* (+ (* a 1) 0) 1)"), &system).unwrap();
        assert_eq!(normal.to_string(), "a");

        let again = rewriter.normalize(&normal, &system).unwrap();
        assert_eq!(again, normal);
    }

    #[test]
    fn normalize_respects_step_cap() {
        let ordering = lpo();
        let mut rewriter = Rewriter::new(&ordering).with_max_steps(Some(1));
        let system = system!(rules: ["(- (- $x))" => "$x"], equations: []);

        let capped = rewriter.normalize(&euler("(- (- (- (- a))))"), &system).unwrap();
        assert_eq!(capped.to_string(), "(- (- a))");
    }

    #[test]
    fn open_terms_rewrite_without_capture() {
        let ordering = lpo();
        let mut rewriter = Rewriter::new(&ordering);
        let system = system!(rules: ["(! $x $y)" => "(* $y $x)"], equations: []);

        let normal = rewriter.normalize(&euler("(! $y $x)"), &system).unwrap();
        assert_eq!(normal.to_string(), "(* $x $y)");
    }
}
