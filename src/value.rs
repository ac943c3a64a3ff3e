//! Parse values and the function payloads carried inside expression nodes.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A value in the parse forest of an expression.
///
/// Matching a terminal produces the matched symbol; sequencing pairs the
/// values of both sides. Semantic actions receive and return sequences of
/// these and may reshape them freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value<S> {
    /// A symbol consumed from the input.
    Symbol(S),
    /// An ordered pair produced by sequencing.
    Pair(Box<Value<S>>, Box<Value<S>>),
}

impl<S> Value<S> {
    /// Pairs two values.
    pub fn pair(left: Value<S>, right: Value<S>) -> Self {
        Value::Pair(Box::new(left), Box::new(right))
    }
}

/// A semantic action over parse-value sequences.
///
/// Also serves as the continuation producer; a producer is invoked with an
/// empty vector when there are no pending values. Actions must be pure and
/// total over the sequences the engine hands them.
pub type Action<S> = Rc<dyn Fn(Vec<Value<S>>) -> Vec<Value<S>>>;

/// A terminal's symbol test. Must be pure and total.
pub type Predicate<S> = Rc<dyn Fn(&S) -> bool>;
