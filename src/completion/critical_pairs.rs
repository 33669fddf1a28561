use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

use super::Sink;
use crate::error::Result;
use crate::matching::{instantiate, match_at_root, substitute};
use crate::rewriting::rule::{canonical_variables, rename_variables};
use crate::rewriting::{Equation, Rewriter, Rule, System, SystemChange};
use crate::tree::{EulerTerm, VARIABLE_PREFIX};

/// Two distinct normal forms of one overlap term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriticalPair {
    /// `first.from` instantiated so that one of its subterms is an instance of `second.from`.
    pub overlap: EulerTerm,
    pub left: EulerTerm,
    pub right: EulerTerm,
    pub first: Rule,
    pub second: Rule,
}

/// Renames the variables of `rule` to `$v0, $v1, ...`, skipping every name
/// already used by `rule` or `other`.
fn rename_apart(rule: &Rule, other: &Rule) -> Rule {
    let taken: HashSet<&str> = [rule.from(), rule.to(), other.from(), other.to()]
        .into_iter()
        .flat_map(|term| term.variables())
        .collect();
    let mut fresh = (0..)
        .map(|n| format!("{VARIABLE_PREFIX}v{n}"))
        .filter(|name| !taken.contains(name.as_str()));

    let mut names = HashMap::new();
    for variable in rule.from().variables().chain(rule.to().variables()) {
        if !names.contains_key(variable)
            && let Some(name) = fresh.next()
        {
            names.insert(variable.to_owned(), name);
        }
    }

    let from = rename_variables(rule.from(), &names);
    let to = rename_variables(rule.to(), &names);
    match rule.equation() {
        Some(equation) => Rule::from_equation(from, to, equation.clone()),
        None => Rule::new(from, to),
    }
}

fn for_each_critical_pair(
    system: &System,
    rewriter: &mut Rewriter<'_>,
    f: &mut dyn FnMut(CriticalPair) -> ControlFlow<()>,
) -> Result<()> {
    let rules = system.rules_with_equations();
    let ordering = rewriter.ordering();

    for first in &rules {
        let first_tree = first.from().to_tree()?;

        for second in &rules {
            let second = rename_apart(second, first);

            for node in first_tree.traverse().filter(|node| !node.is_leaf()) {
                let Some(unifier) = match_at_root(second.from(), &node.linearize()) else {
                    continue;
                };

                let overlap = instantiate(first.from(), &unifier.bindings, rewriter.fresh_ids());
                let by_first = substitute(&overlap, first.from(), first.to(), rewriter.fresh_ids());
                let by_second = substitute(&overlap, second.from(), second.to(), rewriter.fresh_ids());

                if ordering.compare(&by_first, &overlap)? == Ordering::Greater
                    || ordering.compare(&by_second, &overlap)? == Ordering::Greater
                {
                    continue;
                }

                let left = rewriter.normalize(&by_first, system)?;
                let right = rewriter.normalize(&by_second, system)?;
                if left.same_symbols(&right) {
                    continue;
                }

                let names = canonical_variables([&left, &right, &overlap]);
                let pair = CriticalPair {
                    overlap: rename_variables(&overlap, &names),
                    left: rename_variables(&left, &names),
                    right: rename_variables(&right, &names),
                    first: first.clone(),
                    second: second.clone(),
                };

                if f(pair).is_break() {
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}

/// Every critical pair of `system` whose sides stay distinct after normalization.
pub fn critical_pairs(system: &System, rewriter: &mut Rewriter<'_>) -> Result<Vec<CriticalPair>> {
    let mut pairs = Vec::new();
    for_each_critical_pair(system, rewriter, &mut |pair| {
        pairs.push(pair);
        ControlFlow::Continue(())
    })?;
    Ok(pairs)
}

/// Proposes a new rule, or an equation when the ordering cannot tell the two
/// sides apart, for every critical pair not already present in `system`.
pub(super) fn deduce(system: &System, rewriter: &mut Rewriter<'_>, sink: &mut Sink<'_>) -> Result<()> {
    let ordering = rewriter.ordering();
    let mut failure = None;

    for_each_critical_pair(system, rewriter, &mut |pair| {
        let change = match ordering.compare(&pair.left, &pair.right) {
            Ok(Ordering::Equal) => {
                let equation = Equation::new(pair.left, pair.right);
                if system.contains_equation(&equation) {
                    return ControlFlow::Continue(());
                }
                SystemChange::add_equation(equation)
            }
            Ok(Ordering::Greater) => {
                let rule = Rule::new(pair.left, pair.right);
                if system.contains_rule(&rule) {
                    return ControlFlow::Continue(());
                }
                SystemChange::add_rule(rule)
            }
            Ok(Ordering::Less) => {
                let rule = Rule::new(pair.right, pair.left);
                if system.contains_rule(&rule) {
                    return ControlFlow::Continue(());
                }
                SystemChange::add_rule(rule)
            }
            Err(error) => {
                failure = Some(error);
                return ControlFlow::Break(());
            }
        };

        sink(change)
    })?;

    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
