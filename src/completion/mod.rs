//! Knuth-Bendix completion.
//!
//! Completion repeatedly runs a fixed sequence of [`CompletionStep`]s over a
//! [`System`]. Every step inspects the current system and proposes
//! [`SystemChange`]s; only the first proposal of each step is applied before
//! moving on to the next step. The loop stops once a whole pass leaves the
//! system unchanged, or when the configured number of passes is exhausted.

use std::fmt;
use std::ops::ControlFlow;

use log::{debug, info, trace};

use crate::error::Result;
use crate::matching::FreshIds;
use crate::ordering::TermOrdering;
use crate::rewriting::{Rewriter, System, SystemChange};

mod critical_pairs;
mod steps;

pub use critical_pairs::{CriticalPair, critical_pairs};

/// Limits and switches of a completion run.
#[derive(Clone, Debug, Default)]
pub struct CompletionConfig {
    /// Maximum number of passes
    pub max_iterations: Option<usize>,
    /// Maximum number of rewrite steps per normalization
    pub max_normalize_steps: Option<usize>,
    /// Whether [`CompletionStep::CollapseRules`] takes part in every pass
    pub collapse_rules: bool,
}

/// Reason why completion stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompletionStopReason {
    /// A full pass changed nothing
    Completed,
    /// Hit the maximum number of passes before reaching a fixed point
    MaxIterations,
}

#[derive(Clone, Debug)]
pub struct CompletionOutcome {
    pub system: System,
    pub reason: CompletionStopReason,
    /// Number of passes run
    pub iterations: usize,
}

impl CompletionOutcome {
    pub fn is_complete(&self) -> bool {
        self.reason == CompletionStopReason::Completed
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompletionStep {
    SimplifyEquations,
    NormalizeEquations,
    DeleteTrivialEquations,
    OrientEquations,
    NormalizeRules,
    ComposeRules,
    CollapseRules,
    Deduce,
}

impl CompletionStep {
    /// Steps of one pass, in the order they run.
    pub fn pass(config: &CompletionConfig) -> Vec<CompletionStep> {
        use CompletionStep::*;

        let mut steps = vec![
            SimplifyEquations,
            NormalizeEquations,
            DeleteTrivialEquations,
            OrientEquations,
            NormalizeRules,
            ComposeRules,
        ];
        if config.collapse_rules {
            steps.push(CollapseRules);
        }
        steps.push(Deduce);
        steps
    }
}

impl fmt::Display for CompletionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompletionStep::SimplifyEquations => "simplify equations",
            CompletionStep::NormalizeEquations => "normalize equations",
            CompletionStep::DeleteTrivialEquations => "delete trivial equations",
            CompletionStep::OrientEquations => "orient equations",
            CompletionStep::NormalizeRules => "normalize rules",
            CompletionStep::ComposeRules => "compose rules",
            CompletionStep::CollapseRules => "collapse rules",
            CompletionStep::Deduce => "deduce",
        };
        f.write_str(name)
    }
}

/// Receives proposals; `Break` stops the proposing step.
pub(crate) type Sink<'s> = dyn FnMut(SystemChange) -> ControlFlow<()> + 's;

/// Completion under a fixed term ordering.
pub struct KnuthBendix<'o> {
    ordering: &'o dyn TermOrdering,
    config: CompletionConfig,
}

impl<'o> KnuthBendix<'o> {
    pub fn new(ordering: &'o dyn TermOrdering, config: CompletionConfig) -> Self {
        Self { ordering, config }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// A rewriter whose fresh identifiers avoid every identifier in `system`.
    pub fn rewriter(&self, system: &System) -> Rewriter<'o> {
        let terms = system
            .rules
            .iter()
            .flat_map(|rule| [rule.from(), rule.to()])
            .chain(system.equations.iter().flat_map(|eq| [&eq.lhs, &eq.rhs]));

        Rewriter::new(self.ordering)
            .with_fresh_ids(FreshIds::above(terms))
            .with_max_steps(self.config.max_normalize_steps)
    }

    fn run_step(
        &self,
        step: CompletionStep,
        system: &System,
        rewriter: &mut Rewriter<'o>,
        sink: &mut Sink<'_>,
    ) -> Result<()> {
        match step {
            CompletionStep::SimplifyEquations => steps::simplify_equations(system, rewriter, sink),
            CompletionStep::NormalizeEquations => steps::normalize_equations(system, rewriter, sink),
            CompletionStep::DeleteTrivialEquations => steps::delete_trivial_equations(system, sink),
            CompletionStep::OrientEquations => steps::orient_equations(system, self.ordering, sink),
            CompletionStep::NormalizeRules => steps::normalize_rules(system, rewriter, sink),
            CompletionStep::ComposeRules => steps::compose_rules(system, rewriter, sink),
            CompletionStep::CollapseRules => steps::collapse_rules(system, rewriter, sink),
            CompletionStep::Deduce => critical_pairs::deduce(system, rewriter, sink),
        }
    }

    /// Every change `step` proposes for `system`.
    pub fn proposals(&self, step: CompletionStep, system: &System) -> Result<Vec<SystemChange>> {
        let mut rewriter = self.rewriter(system);
        let mut proposals = Vec::new();
        self.run_step(step, system, &mut rewriter, &mut |change| {
            proposals.push(change);
            ControlFlow::Continue(())
        })?;
        Ok(proposals)
    }

    /// The first change `step` proposes for `system`, if any.
    pub fn first_proposal(&self, step: CompletionStep, system: &System) -> Result<Option<SystemChange>> {
        let mut rewriter = self.rewriter(system);
        self.first_proposal_with(step, system, &mut rewriter)
    }

    fn first_proposal_with(
        &self,
        step: CompletionStep,
        system: &System,
        rewriter: &mut Rewriter<'o>,
    ) -> Result<Option<SystemChange>> {
        let mut first = None;
        self.run_step(step, system, rewriter, &mut |change| {
            first = Some(change);
            ControlFlow::Break(())
        })?;
        Ok(first)
    }

    /// Completes `system`.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::OrderingInvariantViolation`] as soon as an
    /// explicit rule stops decreasing, either in the input or after an applied
    /// change, and with any error raised by the ordering.
    pub fn complete(&self, system: &System) -> Result<CompletionOutcome> {
        let mut current = system.canonical();
        current.validate(self.ordering)?;

        let mut rewriter = self.rewriter(&current);
        let steps = CompletionStep::pass(&self.config);
        let mut iterations = 0;

        loop {
            if let Some(max) = self.config.max_iterations
                && iterations >= max
            {
                info!("completion stopped after {iterations} passes without reaching a fixed point");
                return Ok(CompletionOutcome {
                    system: current,
                    reason: CompletionStopReason::MaxIterations,
                    iterations,
                });
            }

            iterations += 1;
            debug!(
                "pass {iterations}: {} rules, {} equations",
                current.rules.len(),
                current.equations.len()
            );

            let before = current.clone();
            for &step in &steps {
                if let Some(change) = self.first_proposal_with(step, &current, &mut rewriter)? {
                    trace!("{step}: {change}");
                    current = current.apply(&change);
                    current.validate(self.ordering)?;
                }
            }

            if current.same_as(&before) {
                info!("completion reached a fixed point after {iterations} passes");
                return Ok(CompletionOutcome {
                    system: current,
                    reason: CompletionStopReason::Completed,
                    iterations,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::Error;
    use crate::macros::system;
    use crate::ordering::{LeftDepthOrdering, LexicographicPathOrdering};
    use crate::rewriting::Rule;
    use crate::tree::EulerTerm;

    fn lpo() -> LexicographicPathOrdering {
        LexicographicPathOrdering::new(["~", "-", "!", "grade", "*", "^", "+", "="])
    }

    fn euler(s: &str) -> EulerTerm {
        EulerTerm::parse(s).unwrap()
    }

    #[test]
    fn pass_order() {
        use CompletionStep::*;

        assert_eq!(
            CompletionStep::pass(&CompletionConfig::default()),
            [
                SimplifyEquations,
                NormalizeEquations,
                DeleteTrivialEquations,
                OrientEquations,
                NormalizeRules,
                ComposeRules,
                Deduce
            ]
        );

        let ordering = lpo();
        let with_collapse = KnuthBendix::new(
            &ordering,
            CompletionConfig {
                collapse_rules: true,
                ..Default::default()
            },
        );
        assert_eq!(CompletionStep::pass(with_collapse.config())[6], CollapseRules);
    }

    #[test_log::test]
    fn zero_is_neutral_on_both_sides() {
        let ordering = lpo();
        let kb = KnuthBendix::new(&ordering, CompletionConfig::default());
        let system = system!(
            rules: ["(+ $x 0)" => "$x"],
            equations: ["(+ $x $y)" = "(+ $y $x)"],
        );

        let outcome = kb.complete(&system).unwrap();
        assert_eq!(outcome.reason, CompletionStopReason::Completed);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.system.rules.len(), 2);
        assert!(outcome.system.contains_rule(&Rule::from_strings("(+ 0 $x)", "$x").unwrap()));
        assert_eq!(outcome.system.equations.len(), 1);

        let mut rewriter = kb.rewriter(&outcome.system);
        let normal = rewriter.normalize(&euler("(+ (+ 0 a) 0)"), &outcome.system).unwrap();
        assert_eq!(normal.to_string(), "a");
    }

    #[test_log::test]
    fn already_complete() {
        let ordering = lpo();
        let kb = KnuthBendix::new(&ordering, CompletionConfig::default());
        let system = system!(rules: ["(- (- $x))" => "$x"], equations: []);

        let outcome = kb.complete(&system).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.system.same_as(&system));
    }

    #[test_log::test]
    fn orients_and_composes() {
        let ordering = lpo();
        let kb = KnuthBendix::new(&ordering, CompletionConfig::default());
        let system = system!(
            rules: ["(* $x 1)" => "$x"],
            equations: ["$x" = "(+ $x 0)"],
        );

        let outcome = kb.complete(&system).unwrap();
        assert!(outcome.is_complete());
        assert!(outcome.system.equations.is_empty());
        assert!(outcome.system.contains_rule(&Rule::from_strings("(+ $x 0)", "$x").unwrap()));
        assert!(outcome.system.contains_rule(&Rule::from_strings("(* $x 1)", "$x").unwrap()));
    }

    #[test_log::test]
    fn iteration_cap() {
        let ordering = lpo();
        let kb = KnuthBendix::new(
            &ordering,
            CompletionConfig {
                max_iterations: Some(1),
                ..Default::default()
            },
        );
        let system = system!(
            rules: ["(+ $x 0)" => "$x"],
            equations: ["(+ $x $y)" = "(+ $y $x)"],
        );

        let outcome = kb.complete(&system).unwrap();
        assert_eq!(outcome.reason, CompletionStopReason::MaxIterations);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.system.rules.len(), 2);
    }

    #[test]
    fn rejects_increasing_input_rule() {
        let ordering = lpo();
        let kb = KnuthBendix::new(&ordering, CompletionConfig::default());
        let system = system!(rules: ["$x" => "(+ $x 0)"], equations: []);

        assert!(matches!(
            kb.complete(&system),
            Err(Error::OrderingInvariantViolation { .. })
        ));
    }

    /// Answers like the wrapped ordering for the first `budget` comparisons,
    /// then finds every pair of terms incomparable.
    struct Budgeted<O> {
        inner: O,
        budget: Cell<usize>,
    }

    impl<O: TermOrdering> TermOrdering for Budgeted<O> {
        fn greater_than(&self, a: &EulerTerm, b: &EulerTerm) -> Result<bool> {
            let left = self.budget.get();
            if left == 0 {
                return Ok(false);
            }
            self.budget.set(left - 1);
            self.inner.greater_than(a, b)
        }
    }

    #[test_log::test]
    fn aborts_when_an_applied_change_breaks_a_rule() {
        // one comparison validates the input, one orients the equation
        let ordering = Budgeted {
            inner: lpo(),
            budget: Cell::new(2),
        };
        let kb = KnuthBendix::new(&ordering, CompletionConfig::default());
        let system = system!(
            rules: ["(+ $x 0)" => "$x"],
            equations: ["(* $x 1)" = "$x"],
        );

        assert!(matches!(
            kb.complete(&system),
            Err(Error::OrderingInvariantViolation { .. })
        ));
        assert_eq!(ordering.budget.get(), 0);
    }

    #[test_log::test]
    fn identical_input_gives_identical_output() {
        let ordering = lpo();
        let kb = KnuthBendix::new(&ordering, CompletionConfig::default());
        let system = system!(
            rules: ["(+ $x 0)" => "$x"],
            equations: ["(+ $x $y)" = "(+ $y $x)"],
        );

        let first = kb.complete(&system).unwrap();
        let second = kb.complete(&system).unwrap();
        assert_eq!(first.system, second.system);
        assert_eq!(first.iterations, second.iterations);

        let term = euler("(+ (+ 0 b) (+ a 0))");
        let once = kb.rewriter(&first.system).normalize(&term, &first.system).unwrap();
        let again = kb.rewriter(&second.system).normalize(&term, &second.system).unwrap();
        assert_eq!(once, again);
        assert_eq!(once.ids(), again.ids());
    }

    #[test]
    fn left_depth_ordering_is_usable() {
        let ordering = LeftDepthOrdering;
        let kb = KnuthBendix::new(&ordering, CompletionConfig::default());
        let system = system!(rules: ["(f (g $x))" => "(h $x)"], equations: []);

        let outcome = kb.complete(&system).unwrap();
        assert!(outcome.is_complete());
        assert!(outcome.system.same_as(&system));
    }
}
