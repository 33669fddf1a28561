use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::rule::{Equation, Rule};
use crate::error::{self, Result};
use crate::ordering::TermOrdering;

// Helper struct for reading systems written as s-expressions
#[derive(Serialize, Deserialize)]
struct SerializableRule {
    from: String,
    to: String,
}

#[derive(Serialize, Deserialize)]
struct SerializableEquation {
    lhs: String,
    rhs: String,
}

#[derive(Serialize, Deserialize)]
struct SystemFile {
    #[serde(default)]
    rules: Vec<SerializableRule>,
    #[serde(default)]
    equations: Vec<SerializableEquation>,
}

/// Explicit rules together with the equations that could not be oriented.
///
/// Rules and equations behave as sets: two systems are the same when they hold
/// the same rules and equations up to variable renaming, in any order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub equations: Vec<Equation>,
    pub rules: Vec<Rule>,
}

impl System {
    pub fn new(rules: Vec<Rule>, equations: Vec<Equation>) -> Self {
        Self { equations, rules }
    }

    /// Load a system from a JSON file holding `rules` (`from`/`to`) and
    /// `equations` (`lhs`/`rhs`) as s-expression strings.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, Box<dyn Error>> {
        let file: SystemFile = crate::utils::json::load_json(path)?;
        Ok(Self::from_system_file(file)?)
    }

    /// Write the system in the format read by [`System::from_file`].
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), Box<dyn Error>> {
        crate::utils::json::save_json(&self.to_system_file(), path)
    }

    fn from_system_file(file: SystemFile) -> Result<Self> {
        let rules = file
            .rules
            .iter()
            .map(|r| Rule::from_strings(&r.from, &r.to))
            .collect::<Result<_>>()?;
        let equations = file
            .equations
            .iter()
            .map(|e| Equation::from_strings(&e.lhs, &e.rhs))
            .collect::<Result<_>>()?;

        Ok(Self::new(rules, equations))
    }

    fn to_system_file(&self) -> SystemFile {
        SystemFile {
            rules: self
                .rules
                .iter()
                .map(|rule| SerializableRule {
                    from: rule.from().to_string(),
                    to: rule.to().to_string(),
                })
                .collect(),
            equations: self
                .equations
                .iter()
                .map(|equation| SerializableEquation {
                    lhs: equation.lhs.to_string(),
                    rhs: equation.rhs.to_string(),
                })
                .collect(),
        }
    }

    /// Explicit rules first, then both orientations of every equation.
    pub fn rules_with_equations(&self) -> Vec<Rule> {
        self.rules
            .iter()
            .cloned()
            .chain(self.equations.iter().flat_map(Equation::orientations))
            .collect()
    }

    pub fn canonical(&self) -> Self {
        Self {
            equations: self.equations.iter().map(Equation::canonical).collect(),
            rules: self.rules.iter().map(Rule::canonical).collect(),
        }
    }

    /// Every explicit rule must strictly decrease under `ordering`.
    pub fn validate(&self, ordering: &dyn TermOrdering) -> Result<()> {
        for rule in &self.rules {
            if ordering.compare(rule.from(), rule.to())? != Ordering::Greater {
                return Err(error::Error::OrderingInvariantViolation {
                    rule: rule.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn contains_rule(&self, rule: &Rule) -> bool {
        self.rules.iter().any(|r| r.same_as(rule))
    }

    /// Equations are looked up in both orientations.
    pub fn contains_equation(&self, equation: &Equation) -> bool {
        self.equations.iter().any(|e| e.same_either_way(equation))
    }

    pub fn same_as(&self, other: &System) -> bool {
        self.rules.iter().all(|r| other.contains_rule(r))
            && other.rules.iter().all(|r| self.contains_rule(r))
            && self.equations.iter().all(|e| other.contains_equation(e))
            && other.equations.iter().all(|e| self.contains_equation(e))
    }

    pub fn without_rule(&self, index: usize) -> Self {
        let mut system = self.clone();
        system.rules.remove(index);
        system
    }

    pub fn without_equation(&self, index: usize) -> Self {
        let mut system = self.clone();
        system.equations.remove(index);
        system
    }

    /// Removals are applied before additions. Added rules and equations are
    /// stored in canonical form and skipped when already present.
    pub fn apply(&self, change: &SystemChange) -> Self {
        let mut system = self.clone();

        for change in change.changes() {
            match change {
                Change::RemoveRule(rule) => system.rules.retain(|r| !r.same_as(rule)),
                Change::RemoveEquation(equation) => {
                    system.equations.retain(|e| !e.same_as(equation))
                }
                Change::AddRule(_) | Change::AddEquation(_) => {}
            }
        }

        for change in change.changes() {
            match change {
                Change::AddRule(rule) if !system.contains_rule(rule) => {
                    system.rules.push(rule.canonical())
                }
                Change::AddEquation(equation) if !system.contains_equation(equation) => {
                    system.equations.push(equation.canonical())
                }
                _ => {}
            }
        }

        system
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        for equation in &self.equations {
            writeln!(f, "{equation}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    AddRule(Rule),
    RemoveRule(Rule),
    AddEquation(Equation),
    RemoveEquation(Equation),
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::AddRule(rule) => write!(f, "+ {rule}"),
            Change::RemoveRule(rule) => write!(f, "- {rule}"),
            Change::AddEquation(equation) => write!(f, "+ {equation}"),
            Change::RemoveEquation(equation) => write!(f, "- {equation}"),
        }
    }
}

/// An edit of a [`System`] proposed by one completion step.
///
/// Only the constructors below build changes, so a change touches at most one
/// rule pair and one equation pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemChange {
    changes: Vec<Change>,
}

impl SystemChange {
    pub fn add_rule(rule: Rule) -> Self {
        Self {
            changes: vec![Change::AddRule(rule)],
        }
    }

    pub fn add_equation(equation: Equation) -> Self {
        Self {
            changes: vec![Change::AddEquation(equation)],
        }
    }

    pub fn remove_equation(equation: Equation) -> Self {
        Self {
            changes: vec![Change::RemoveEquation(equation)],
        }
    }

    pub fn replace_rule(old: Rule, new: Rule) -> Self {
        Self {
            changes: vec![Change::RemoveRule(old), Change::AddRule(new)],
        }
    }

    pub fn replace_equation(old: Equation, new: Equation) -> Self {
        Self {
            changes: vec![Change::RemoveEquation(old), Change::AddEquation(new)],
        }
    }

    /// Turns an equation into a rule.
    pub fn orient(equation: Equation, rule: Rule) -> Self {
        Self {
            changes: vec![Change::RemoveEquation(equation), Change::AddRule(rule)],
        }
    }

    /// Turns a rule back into an equation.
    pub fn collapse(rule: Rule, equation: Equation) -> Self {
        Self {
            changes: vec![Change::RemoveRule(rule), Change::AddEquation(equation)],
        }
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn added_rule(&self) -> Option<&Rule> {
        self.changes.iter().find_map(|c| match c {
            Change::AddRule(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn removed_rule(&self) -> Option<&Rule> {
        self.changes.iter().find_map(|c| match c {
            Change::RemoveRule(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn added_equation(&self) -> Option<&Equation> {
        self.changes.iter().find_map(|c| match c {
            Change::AddEquation(equation) => Some(equation),
            _ => None,
        })
    }

    pub fn removed_equation(&self) -> Option<&Equation> {
        self.changes.iter().find_map(|c| match c {
            Change::RemoveEquation(equation) => Some(equation),
            _ => None,
        })
    }
}

impl fmt::Display for SystemChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.changes.iter().format(", "))
    }
}
