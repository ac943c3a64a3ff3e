//! Driving an expression over a whole input.
//!
//! The engine consumes one symbol per `derive` call and tracks no
//! positions of its own; this module owns that loop for callers that have
//! the whole input at hand, and reports where a match died.

use crate::kind::Kind;
use crate::language::{Expr, Language};
use crate::value::Value;
use std::fmt;

/// Why an input failed to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError<S> {
    /// The expression rejected `symbol` at `position` (0-based).
    Mismatch { position: usize, symbol: S },
    /// Input ran out while the expression still required more symbols.
    Incomplete { consumed: usize },
}

impl<S: fmt::Debug> fmt::Display for ParseError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Mismatch { position, symbol } => {
                write!(f, "no match for {:?} at position {}", symbol, position)
            }
            ParseError::Incomplete { consumed } => {
                write!(
                    f,
                    "input ended after {} symbols with the expression still open",
                    consumed
                )
            }
        }
    }
}

impl<S: fmt::Debug> std::error::Error for ParseError<S> {}

impl<S: Clone + 'static> Language<S> {
    /// Folds [`derive`](Language::derive) over `input`, then evaluates the
    /// residual expression.
    ///
    /// Returns the parse forest of a complete match, or the position where
    /// matching died. A residual that collapses to a failure node stops
    /// the walk early; a grammar that is structurally dead without having
    /// collapsed (for instance through a reference cycle) is only detected
    /// once the input is exhausted, and reported as incomplete.
    pub fn parse<I>(&mut self, expr: Expr, input: I) -> Result<Vec<Value<S>>, ParseError<S>>
    where
        I: IntoIterator<Item = S>,
    {
        let mut current = expr;
        let mut consumed = 0;
        for (position, symbol) in input.into_iter().enumerate() {
            current = self.derive(current, &symbol);
            if self.kind(current) == Kind::Failure {
                return Err(ParseError::Mismatch { position, symbol });
            }
            consumed = position + 1;
        }
        if self.accepts_empty(current) {
            Ok(self.evaluate(current))
        } else {
            Err(ParseError::Incomplete { consumed })
        }
    }

    /// Does the expression accept the whole input?
    pub fn matches<I>(&mut self, expr: Expr, input: I) -> bool
    where
        I: IntoIterator<Item = S>,
    {
        self.parse(expr, input).is_ok()
    }
}
