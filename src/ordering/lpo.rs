use std::cmp::Ordering;

use super::TermOrdering;
use crate::error::{Error, Result};
use crate::tree::{EulerTerm, Term};

/// Lexicographic path ordering over a symbol precedence.
///
/// The precedence lists symbols from highest to lowest. Listed symbols are
/// above every unlisted one, and unlisted symbols compare by their names.
/// Leaves with a `$` symbol are variables: `s > x` holds exactly when the
/// variable `x` occurs in `s` and `s` is not `x` itself.
#[derive(Clone, Debug, Default)]
pub struct LexicographicPathOrdering {
    precedence: Vec<String>,
}

impl LexicographicPathOrdering {
    pub fn new<S: Into<String>>(precedence: impl IntoIterator<Item = S>) -> Self {
        Self {
            precedence: precedence.into_iter().map(Into::into).collect(),
        }
    }

    pub fn precedence(&self) -> &[String] {
        &self.precedence
    }

    fn rank(&self, symbol: &str) -> Option<usize> {
        self.precedence.iter().position(|s| s == symbol)
    }

    fn compare_symbols(&self, a: &str, b: &str) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }

        match (self.rank(a), self.rank(b)) {
            (Some(rank_a), Some(rank_b)) => rank_b.cmp(&rank_a),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => a.cmp(b),
        }
    }

    pub fn greater(&self, a: &Term, b: &Term) -> Result<bool> {
        if a.is_variable() {
            return Ok(false);
        }
        if b.is_variable() {
            return Ok(a.contains_variable(&b.symbol));
        }

        for child in &a.children {
            if child.same_structure(b) || self.greater(child, b)? {
                return Ok(true);
            }
        }

        match self.compare_symbols(&a.symbol, &b.symbol) {
            Ordering::Greater => self.majorizes(a, &b.children),
            Ordering::Equal => {
                if a.arity() != b.arity() {
                    return Err(Error::ArityMismatch {
                        symbol: a.symbol.clone(),
                        left: a.arity(),
                        right: b.arity(),
                    });
                }
                Ok(self.lexicographic(&a.children, &b.children)? && self.majorizes(a, &b.children)?)
            }
            Ordering::Less => Ok(false),
        }
    }

    /// Decided by the first pair of children that differ.
    fn lexicographic(&self, left: &[Term], right: &[Term]) -> Result<bool> {
        for (a, b) in left.iter().zip(right) {
            if !a.same_structure(b) {
                return self.greater(a, b);
            }
        }
        Ok(false)
    }

    fn majorizes(&self, a: &Term, children: &[Term]) -> Result<bool> {
        for child in children {
            if !self.greater(a, child)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl TermOrdering for LexicographicPathOrdering {
    fn greater_than(&self, a: &EulerTerm, b: &EulerTerm) -> Result<bool> {
        self.greater(&a.to_tree()?, &b.to_tree()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lpo() -> LexicographicPathOrdering {
        LexicographicPathOrdering::new(["-", "!", "*", "^", "+"])
    }

    fn gt(a: &str, b: &str) -> bool {
        lpo()
            .greater(&Term::parse(a).unwrap(), &Term::parse(b).unwrap())
            .unwrap()
    }

    fn compare(a: &str, b: &str) -> Ordering {
        lpo()
            .compare(&EulerTerm::parse(a).unwrap(), &EulerTerm::parse(b).unwrap())
            .unwrap()
    }

    #[test]
    fn constants() {
        assert!(!gt("a", "a"));
        assert!(!gt("a", "b"));
        assert!(gt("b", "a"));
    }

    #[test]
    fn precedence() {
        let ordering = lpo();
        assert_eq!(ordering.precedence()[0], "-");
        assert_eq!(ordering.compare_symbols("-", "+"), Ordering::Greater);
        assert_eq!(ordering.compare_symbols("+", "*"), Ordering::Less);
        assert_eq!(ordering.compare_symbols("+", "zeta"), Ordering::Greater);
        assert_eq!(ordering.compare_symbols("b", "a"), Ordering::Greater);
    }

    #[test]
    fn same_head_is_lexicographic() {
        assert!(gt("(+ a c)", "(+ a b)"));
        assert!(!gt("(+ a b)", "(+ a c)"));
        assert!(gt("(* (+ a b) d)", "(* (+ a b) c)"));
        assert!(!gt("(* (+ a b) c)", "(* (+ a b) c)"));
    }

    #[test]
    fn lower_head() {
        assert!(!gt("(+ a b)", "(* a b)"));
        assert!(gt("(* a b)", "(+ a b)"));
    }

    #[test]
    fn distributivity_expands() {
        assert!(gt("(* (+ a b) c)", "(+ (* a c) (* b c))"));
        assert!(!gt("(+ (* a c) (* b c))", "(* (+ a b) c)"));
    }

    #[test]
    fn subterm_is_smaller() {
        assert!(!gt("(! 0 scalar)", "(* (! 0 scalar) $x)"));
        assert!(gt("(* (! 0 scalar) $x)", "(! 0 scalar)"));
    }

    #[test]
    fn variables() {
        assert!(!gt("$x", "$x"));
        assert!(!gt("$x", "a"));
        assert!(!gt("a", "$x"));
        assert!(gt("(- $x)", "$x"));
        assert!(!gt("(- $y)", "$x"));
        assert!(gt("(! (+ $x $y) $f)", "(+ (! $x $f) (! $y $f))"));
        assert!(gt("(+ (- $x) $x)", "0"));
    }

    #[test]
    fn compare_is_antisymmetric() {
        let pairs = [
            ("(* (+ a b) c)", "(+ (* a c) (* b c))"),
            ("(+ a c)", "(+ a b)"),
            ("(+ $x $y)", "(+ $y $x)"),
            ("a", "b"),
        ];
        for (a, b) in pairs {
            assert_eq!(compare(a, b), compare(b, a).reverse());
            assert_eq!(compare(a, a), Ordering::Equal);
        }
    }

    #[test]
    fn commutativity_is_not_orientable() {
        assert_eq!(compare("(+ $x $y)", "(+ $y $x)"), Ordering::Equal);
    }

    #[test]
    fn arity_mismatch() {
        let result = lpo().greater(&Term::parse("(f a)").unwrap(), &Term::parse("(f a b)").unwrap());
        assert_eq!(
            result,
            Err(Error::ArityMismatch {
                symbol: String::from("f"),
                left: 1,
                right: 2
            })
        );
    }
}
