//! Rule bindings: named expressions with forward declaration.
//!
//! Grammar rules may reference rules that are not defined yet, including
//! themselves. `lookup` hands out a placeholder reference for an unknown
//! name; `define` later fills that placeholder's binding in place, so
//! every expression that captured the placeholder observes the definition
//! through the shared handle. This is what ties the knot for recursive and
//! mutually recursive rules without rebuilding any referencing expression.

use crate::kind::Kind;
use crate::language::{Expr, Language};
use std::collections::HashMap;

/// A table of named rule bindings over one [`Language`].
#[derive(Debug, Default)]
pub struct Scope {
    rules: HashMap<String, Expr>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of names bound so far.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the node bound to `name`, creating and binding a fresh
    /// placeholder reference for a name not defined yet.
    ///
    /// The placeholder is the node later patched by
    /// [`define`](Scope::define); embedding it in other expressions before
    /// the definition exists is the supported way to build recursive
    /// grammars.
    pub fn lookup<S: Clone + 'static>(&mut self, language: &mut Language<S>, name: &str) -> Expr {
        if let Some(&bound) = self.rules.get(name) {
            return bound;
        }
        let placeholder = language.reference();
        self.rules.insert(name.to_owned(), placeholder);
        placeholder
    }

    /// Binds `name` to `expression`.
    ///
    /// A name previously handed out as a placeholder keeps its handle: the
    /// placeholder's binding is assigned the canonical union of
    /// `expression` with a failure node. The failure operand is
    /// algebraically inert; it routes the assignment through the same
    /// normalization path as ordinary composition. A name never seen
    /// before is bound to `expression` directly.
    pub fn define<S: Clone + 'static>(&mut self, language: &mut Language<S>, name: &str, expression: Expr) {
        match self.rules.get(name).copied() {
            Some(bound) if language.kind(bound) == Kind::Reference => {
                let inert = language.failure();
                let normalized = language.union(expression, inert);
                language.bind(bound, normalized);
            }
            _ => {
                self.rules.insert(name.to_owned(), expression);
            }
        }
    }
}
