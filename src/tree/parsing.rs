use super::{NodeId, Term, is_variable};
use crate::error::{Error, Result};

fn tokenize(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in s.char_indices() {
        match c {
            '(' | ')' => {
                if let Some(begin) = start.take() {
                    tokens.push(&s[begin..i]);
                }
                tokens.push(&s[i..i + 1]);
            }
            c if c.is_whitespace() => {
                if let Some(begin) = start.take() {
                    tokens.push(&s[begin..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }

    if let Some(begin) = start {
        tokens.push(&s[begin..]);
    }

    tokens
}

struct Parser<'s> {
    tokens: Vec<&'s str>,
    position: usize,
    next_id: NodeId,
}

impl<'s> Parser<'s> {
    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn next_token(&mut self) -> std::result::Result<&'s str, String> {
        let token = self
            .tokens
            .get(self.position)
            .copied()
            .ok_or_else(|| String::from("unexpected end of input"))?;
        self.position += 1;
        Ok(token)
    }

    fn parse_symbol(&mut self) -> std::result::Result<String, String> {
        match self.next_token()? {
            "(" | ")" => Err(String::from("expected a symbol")),
            symbol => Ok(symbol.to_owned()),
        }
    }

    fn parse_term(&mut self) -> std::result::Result<Term, String> {
        match self.next_token()? {
            ")" => Err(String::from("unbalanced `)`")),
            "(" => {
                let id = self.fresh_id();
                let symbol = self.parse_symbol()?;
                let mut children = Vec::new();

                loop {
                    match self.tokens.get(self.position) {
                        None => return Err(String::from("missing `)`")),
                        Some(&")") => {
                            self.position += 1;
                            break;
                        }
                        Some(_) => children.push(self.parse_term()?),
                    }
                }

                if is_variable(&symbol) && !children.is_empty() {
                    return Err(format!("variable `{symbol}` applied to arguments"));
                }

                Ok(Term::new(id, symbol, children))
            }
            symbol => Ok(Term::leaf(self.fresh_id(), symbol)),
        }
    }
}

impl Term {
    /// Reads an s-expression such as `(+ $x (- 0))`. Leaves are bare symbols,
    /// symbols starting with `$` are variables. Identifiers are assigned in
    /// pre-order starting at 0.
    pub fn parse(s: &str) -> Result<Self> {
        let error = |reason: String| Error::Parse {
            input: s.to_owned(),
            reason,
        };

        let mut parser = Parser {
            tokens: tokenize(s),
            position: 0,
            next_id: 0,
        };

        let term = parser.parse_term().map_err(error)?;
        if parser.position != parser.tokens.len() {
            return Err(error(String::from("trailing input")));
        }

        Ok(term)
    }
}
