//! The simplification steps of a completion pass. Critical pairs live in
//! [`super::critical_pairs`].

use std::cmp::Ordering;

use super::Sink;
use crate::error::Result;
use crate::matching::{instantiate, match_at_root, properly_contains_instance};
use crate::ordering::TermOrdering;
use crate::rewriting::rule::{canonical_variables, rename_variables};
use crate::rewriting::{Equation, Rewriter, Rule, System, SystemChange};
use crate::tree::EulerTerm;

/// `side` rewritten by `rule` at the root, when `side` is a variant of `rule.from()`.
fn replace_variant(
    side: &EulerTerm,
    rule: &Rule,
    rewriter: &mut Rewriter<'_>,
) -> Result<Option<EulerTerm>> {
    let canonical_side = rename_variables(side, &canonical_variables([side]));
    let canonical_rule = rule.canonical();
    if !canonical_side.same_symbols(canonical_rule.from()) {
        return Ok(None);
    }
    if rule.is_from_equation()
        && !properly_contains_instance(&canonical_side, canonical_rule.from())?
    {
        return Ok(None);
    }

    Ok(match_at_root(side, rule.from())
        .map(|found| instantiate(rule.to(), &found.bindings, rewriter.fresh_ids())))
}

/// An equation side spelling some rule's left side, up to renaming, is replaced
/// by its right side.
pub(super) fn simplify_equations(
    system: &System,
    rewriter: &mut Rewriter<'_>,
    sink: &mut Sink<'_>,
) -> Result<()> {
    let rules = system.rules_with_equations();

    for equation in &system.equations {
        for rule in &rules {
            let simplified = if let Some(lhs) = replace_variant(&equation.lhs, rule, rewriter)? {
                Equation::new(lhs, equation.rhs.clone())
            } else if let Some(rhs) = replace_variant(&equation.rhs, rule, rewriter)? {
                Equation::new(equation.lhs.clone(), rhs)
            } else {
                continue;
            };

            if sink(SystemChange::replace_equation(equation.clone(), simplified)).is_break() {
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Both sides of every equation are normalized against the rest of the system.
pub(super) fn normalize_equations(
    system: &System,
    rewriter: &mut Rewriter<'_>,
    sink: &mut Sink<'_>,
) -> Result<()> {
    for (index, equation) in system.equations.iter().enumerate() {
        let rest = system.without_equation(index);
        let lhs = rewriter.normalize(&equation.lhs, &rest)?;
        let rhs = rewriter.normalize(&equation.rhs, &rest)?;

        if lhs.same_symbols(&equation.lhs) && rhs.same_symbols(&equation.rhs) {
            continue;
        }

        let change = SystemChange::replace_equation(equation.clone(), Equation::new(lhs, rhs));
        if sink(change).is_break() {
            return Ok(());
        }
    }

    Ok(())
}

pub(super) fn delete_trivial_equations(system: &System, sink: &mut Sink<'_>) -> Result<()> {
    for equation in system.equations.iter().filter(|e| e.is_trivial()) {
        if sink(SystemChange::remove_equation(equation.clone())).is_break() {
            break;
        }
    }

    Ok(())
}

/// Equations with comparable sides become rules from the larger to the smaller side.
pub(super) fn orient_equations(
    system: &System,
    ordering: &dyn TermOrdering,
    sink: &mut Sink<'_>,
) -> Result<()> {
    for equation in &system.equations {
        let rule = match ordering.compare(&equation.lhs, &equation.rhs)? {
            Ordering::Greater => Rule::new(equation.lhs.clone(), equation.rhs.clone()),
            Ordering::Less => Rule::new(equation.rhs.clone(), equation.lhs.clone()),
            Ordering::Equal => continue,
        };

        if sink(SystemChange::orient(equation.clone(), rule)).is_break() {
            break;
        }
    }

    Ok(())
}

/// Right sides are normalized against the whole system.
pub(super) fn normalize_rules(
    system: &System,
    rewriter: &mut Rewriter<'_>,
    sink: &mut Sink<'_>,
) -> Result<()> {
    for rule in &system.rules {
        let to = rewriter.normalize(rule.to(), system)?;
        if to.same_symbols(rule.to()) {
            continue;
        }

        if sink(SystemChange::replace_rule(rule.clone(), rule.with_to(to))).is_break() {
            break;
        }
    }

    Ok(())
}

/// Right sides are normalized against every other rule and all equations.
pub(super) fn compose_rules(
    system: &System,
    rewriter: &mut Rewriter<'_>,
    sink: &mut Sink<'_>,
) -> Result<()> {
    for (index, rule) in system.rules.iter().enumerate() {
        let to = rewriter.normalize(rule.to(), &system.without_rule(index))?;
        if to.same_symbols(rule.to()) {
            continue;
        }

        if sink(SystemChange::replace_rule(rule.clone(), rule.with_to(to))).is_break() {
            break;
        }
    }

    Ok(())
}

/// A rule whose left side is reducible by another rule at a proper subterm is
/// turned back into an equation between the reduced left side and its right
/// side.
pub(super) fn collapse_rules(
    system: &System,
    rewriter: &mut Rewriter<'_>,
    sink: &mut Sink<'_>,
) -> Result<()> {
    for (index, rule) in system.rules.iter().enumerate() {
        let Some(step) = rewriter.rewrite_step(rule.from(), &system.without_rule(index))? else {
            continue;
        };

        if !properly_contains_instance(rule.from(), step.rule.from())? {
            continue;
        }

        let equation = Equation::new(step.term, rule.to().clone());
        if sink(SystemChange::collapse(rule.clone(), equation)).is_break() {
            break;
        }
    }

    Ok(())
}
