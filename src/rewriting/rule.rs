use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::{EulerTerm, VARIABLE_PREFIX, is_variable};

/// Maps every variable of `terms` to `$0, $1, ...` in order of first appearance.
pub fn canonical_variables<'t>(terms: impl IntoIterator<Item = &'t EulerTerm>) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for term in terms {
        for variable in term.variables() {
            if !names.contains_key(variable) {
                let name = format!("{VARIABLE_PREFIX}{}", names.len());
                names.insert(variable.to_owned(), name);
            }
        }
    }
    names
}

pub fn rename_variables(term: &EulerTerm, names: &HashMap<String, String>) -> EulerTerm {
    term.map_symbols(|symbol| match names.get(symbol) {
        Some(name) if is_variable(symbol) => name.clone(),
        _ => symbol.to_owned(),
    })
}

/// An unoriented equation `lhs = rhs`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    pub lhs: EulerTerm,
    pub rhs: EulerTerm,
}

impl Equation {
    pub fn new(lhs: EulerTerm, rhs: EulerTerm) -> Self {
        Self { lhs, rhs }
    }

    pub fn from_strings(lhs: &str, rhs: &str) -> Result<Self> {
        Ok(Self::new(EulerTerm::parse(lhs)?, EulerTerm::parse(rhs)?))
    }

    /// Both sides spell the same symbol sequence.
    pub fn is_trivial(&self) -> bool {
        self.lhs.same_symbols(&self.rhs)
    }

    /// Variables renamed `$0, $1, ...` across both sides, left side first.
    pub fn canonical(&self) -> Self {
        let names = canonical_variables([&self.lhs, &self.rhs]);
        Self::new(rename_variables(&self.lhs, &names), rename_variables(&self.rhs, &names))
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.rhs.clone(), self.lhs.clone())
    }

    /// Equality of canonical forms, keeping the orientation.
    pub fn same_as(&self, other: &Equation) -> bool {
        let (a, b) = (self.canonical(), other.canonical());
        a.lhs.same_symbols(&b.lhs) && a.rhs.same_symbols(&b.rhs)
    }

    /// Equality of canonical forms in either orientation.
    pub fn same_either_way(&self, other: &Equation) -> bool {
        self.same_as(other) || self.same_as(&other.reversed())
    }

    /// `lhs -> rhs` followed by `rhs -> lhs`, both remembering this equation.
    pub fn orientations(&self) -> [Rule; 2] {
        [
            Rule::from_equation(self.lhs.clone(), self.rhs.clone(), self.clone()),
            Rule::from_equation(self.rhs.clone(), self.lhs.clone(), self.clone()),
        ]
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// A directed rule `from -> to`. Rules obtained by orienting an equation on the
/// fly remember that equation and are only applied where they decrease the term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    from: EulerTerm,
    to: EulerTerm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    equation: Option<Equation>,
}

impl Rule {
    pub fn new(from: EulerTerm, to: EulerTerm) -> Self {
        Self {
            from,
            to,
            equation: None,
        }
    }

    pub fn from_equation(from: EulerTerm, to: EulerTerm, equation: Equation) -> Self {
        Self {
            from,
            to,
            equation: Some(equation),
        }
    }

    pub fn from_strings(from: &str, to: &str) -> Result<Self> {
        Ok(Self::new(EulerTerm::parse(from)?, EulerTerm::parse(to)?))
    }

    pub fn from(&self) -> &EulerTerm {
        &self.from
    }

    pub fn to(&self) -> &EulerTerm {
        &self.to
    }

    pub fn equation(&self) -> Option<&Equation> {
        self.equation.as_ref()
    }

    pub fn is_from_equation(&self) -> bool {
        self.equation.is_some()
    }

    /// Same rule with another right side.
    pub fn with_to(&self, to: EulerTerm) -> Self {
        Self {
            from: self.from.clone(),
            to,
            equation: self.equation.clone(),
        }
    }

    /// Variables renamed `$0, $1, ...` across both sides, left side first.
    pub fn canonical(&self) -> Self {
        let names = canonical_variables([&self.from, &self.to]);
        Self {
            from: rename_variables(&self.from, &names),
            to: rename_variables(&self.to, &names),
            equation: self.equation.clone(),
        }
    }

    /// Equality of canonical forms. The source equation is not compared.
    pub fn same_as(&self, other: &Rule) -> bool {
        let (a, b) = (self.canonical(), other.canonical());
        a.from.same_symbols(&b.from) && a.to.same_symbols(&b.to)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::{Equation, Rule, canonical_variables};
    use crate::tree::EulerTerm;

    #[test]
    fn canonical_names_follow_first_appearance() {
        let from = EulerTerm::parse("(+ $y (* $x $y))").unwrap();
        let to = EulerTerm::parse("(- $z $x)").unwrap();
        let names = canonical_variables([&from, &to]);
        assert_eq!(names["$y"], "$0");
        assert_eq!(names["$x"], "$1");
        assert_eq!(names["$z"], "$2");
    }

    #[test]
    fn rule_canonical() {
        let rule = Rule::from_strings("(+ $b $a)", "(+ $a $b)").unwrap();
        assert_eq!(rule.canonical().to_string(), "(+ $0 $1) -> (+ $1 $0)");
    }

    #[test]
    fn rule_same_as_ignores_variable_names() {
        let a = Rule::from_strings("(+ $x 0)", "$x").unwrap();
        let b = Rule::from_strings("(+ $y 0)", "$y").unwrap();
        let c = Rule::from_strings("(+ 0 $y)", "$y").unwrap();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn equation_is_trivial() {
        assert!(Equation::from_strings("(+ $x $y)", "(+ $x $y)").unwrap().is_trivial());
        assert!(!Equation::from_strings("(+ $x $y)", "(+ $y $x)").unwrap().is_trivial());
    }

    #[test]
    fn equation_orientation() {
        let eq = Equation::from_strings("(+ $x 0)", "$x").unwrap();
        let flipped = Equation::from_strings("$y", "(+ $y 0)").unwrap();
        assert!(!eq.same_as(&flipped));
        assert!(eq.same_either_way(&flipped));
    }

    #[test]
    fn orientations_remember_equation() {
        let eq = Equation::from_strings("(+ $x $y)", "(+ $y $x)").unwrap();
        let [forward, backward] = eq.orientations();
        assert!(forward.is_from_equation());
        assert_eq!(forward.equation(), Some(&eq));
        assert_eq!(forward.from(), &eq.lhs);
        assert_eq!(backward.from(), &eq.rhs);
    }

    #[test]
    fn test_rule_serialization() {
        let rule = Rule::from_strings("(* $0 2)", "(<< $0 1)").unwrap();
        let serialized = serde_json::to_string(&rule).unwrap();
        let deserialized: Rule = serde_json::from_str(&serialized).unwrap();
        assert_eq!(rule, deserialized);
        assert!(!serialized.contains("equation"));
    }
}
