//! The four memoized walks over an expression graph.
//!
//! Expression graphs are cyclic whenever a grammar is recursive, so every
//! walk here follows the same discipline: before recursing into a node's
//! children, its memo cell is pre-seeded with a conservative placeholder
//! stamped with the current generation token, and the real result
//! overwrites the placeholder afterwards. A cyclic path therefore bottoms
//! out at the placeholder instead of recursing forever, and recursion
//! depth is bounded by the graph's structural depth.
//!
//! Generation tokens come from a counter on the arena. Every public entry
//! point starts a fresh pass, so results can never go stale across
//! derivative steps or rule redefinitions; within one pass each traversal
//! kind keeps a single token, so a nullability question asked twice during
//! one derivative is answered from the cell.

use crate::language::{Expr, Language, Node};
use crate::value::{Action, Predicate, Value};
use std::rc::Rc;

/// Generation tokens for one traversal pass, one per walk kind.
pub(crate) struct Pass {
    nullable: u64,
    derive: u64,
    evaluate: u64,
    normalize: u64,
}

/// A shallow, owned view of one node, detached from the arena borrow so a
/// walk can keep allocating while it recurses.
enum Step<S> {
    Union(Expr, Expr),
    Sequence(Expr, Expr),
    Transform(Expr, Action<S>),
    Reference(Option<Expr>),
    Terminal(Predicate<S>),
    Continuation(Action<S>),
    Failure,
}

impl<S: Clone + 'static> Language<S> {
    fn begin_pass(&mut self) -> Pass {
        self.generation += 4;
        Pass {
            nullable: self.generation - 3,
            derive: self.generation - 2,
            evaluate: self.generation - 1,
            normalize: self.generation,
        }
    }

    fn step(&self, expr: Expr) -> Step<S> {
        match self.node(expr) {
            Node::Union { left, right } => Step::Union(*left, *right),
            Node::Sequence { left, right } => Step::Sequence(*left, *right),
            Node::Transform { source, action } => Step::Transform(*source, Rc::clone(action)),
            Node::Reference { binding } => Step::Reference(*binding),
            Node::Terminal { predicate } => Step::Terminal(Rc::clone(predicate)),
            Node::Continuation { producer } => Step::Continuation(Rc::clone(producer)),
            Node::Failure { .. } => Step::Failure,
        }
    }

    /// Does the expression match the empty remaining input?
    ///
    /// Asking this after a run of [`derive`](Language::derive) calls
    /// answers whether the symbols consumed so far form a complete match.
    pub fn accepts_empty(&mut self, expr: Expr) -> bool {
        let pass = self.begin_pass();
        self.nullable_in(expr, &pass)
    }

    pub(crate) fn nullable_in(&mut self, expr: Expr, pass: &Pass) -> bool {
        if let Some((stamp, known)) = self.slots[expr.index()].nullable {
            if stamp == pass.nullable {
                return known;
            }
        }
        // Seed the cell pessimistically so cyclic references bottom out at
        // `false`; the computed result overwrites it below.
        self.slots[expr.index()].nullable = Some((pass.nullable, false));
        let result = match self.step(expr) {
            Step::Union(left, right) => {
                self.nullable_in(left, pass) || self.nullable_in(right, pass)
            }
            Step::Sequence(left, right) => {
                self.nullable_in(left, pass) && self.nullable_in(right, pass)
            }
            Step::Transform(source, _) => self.nullable_in(source, pass),
            Step::Reference(Some(binding)) => self.nullable_in(binding, pass),
            Step::Reference(None) => false,
            Step::Terminal(_) => false,
            Step::Continuation(_) => true,
            Step::Failure => false,
        };
        self.slots[expr.index()].nullable = Some((pass.nullable, result));
        result
    }

    /// The residual expression after consuming one input symbol: the
    /// language of `expr` restricted to strings beginning with `symbol`,
    /// with that symbol consumed.
    ///
    /// Each call starts a fresh generation, so deriving the same node for
    /// different positions of an input never reuses a stale result.
    pub fn derive(&mut self, expr: Expr, symbol: &S) -> Expr {
        let pass = self.begin_pass();
        self.derive_in(expr, symbol, &pass)
    }

    fn derive_in(&mut self, expr: Expr, symbol: &S, pass: &Pass) -> Expr {
        if let Some((stamp, cached)) = self.slots[expr.index()].derived {
            if stamp == pass.derive {
                return cached;
            }
        }
        match self.step(expr) {
            Step::Union(left, right) => {
                let placeholder = self.seed_derived(expr, pass);
                let left = self.derive_in(left, symbol, pass);
                let right = self.derive_in(right, symbol, pass);
                let result = self.union(left, right);
                self.bind(placeholder, result);
                result
            }
            Step::Sequence(left, right) => {
                let placeholder = self.seed_derived(expr, pass);
                let result = if self.nullable_in(left, pass) {
                    // The match may continue inside the left side or step
                    // past it into the right; both alternatives stay live,
                    // with the right branch paired against every parse the
                    // left side has already completed.
                    let ahead = self.derive_in(left, symbol, pass);
                    let ahead = self.sequence(ahead, right);
                    let past = self.derive_in(right, symbol, pass);
                    let completed = self.evaluate_in(left, pass);
                    let past = self.reduce_action(past, pair_with_completed(completed));
                    self.union(ahead, past)
                } else {
                    let ahead = self.derive_in(left, symbol, pass);
                    self.sequence(ahead, right)
                };
                self.bind(placeholder, result);
                result
            }
            Step::Transform(source, action) => {
                let placeholder = self.seed_derived(expr, pass);
                let source = self.derive_in(source, symbol, pass);
                let result = self.reduce_action(source, action);
                self.bind(placeholder, result);
                result
            }
            Step::Reference(Some(binding)) => {
                let placeholder = self.seed_derived(expr, pass);
                let result = self.derive_in(binding, symbol, pass);
                self.bind(placeholder, result);
                result
            }
            Step::Reference(None) => {
                // An unresolved forward declaration is the empty language;
                // the unbound placeholder stands for it.
                self.seed_derived(expr, pass)
            }
            Step::Terminal(predicate) => {
                let result = if predicate(symbol) {
                    let matched = symbol.clone();
                    self.continuation(move |_| vec![Value::Symbol(matched.clone())])
                } else {
                    self.failure_with(Value::Symbol(symbol.clone()))
                };
                self.slots[expr.index()].derived = Some((pass.derive, result));
                result
            }
            Step::Continuation(_) | Step::Failure => {
                // A completed or dead expression cannot consume a symbol.
                let result = self.failure();
                self.slots[expr.index()].derived = Some((pass.derive, result));
                result
            }
        }
    }

    /// Pre-seeds a node's derivative cell with a fresh unbound reference.
    ///
    /// Cyclic paths reached while the node's children are being derived
    /// resolve to this reference; binding it to the finished derivative
    /// afterwards closes the new graph's own cycle.
    fn seed_derived(&mut self, expr: Expr, pass: &Pass) -> Expr {
        let placeholder = self.reference();
        self.slots[expr.index()].derived = Some((pass.derive, placeholder));
        placeholder
    }

    /// The parse forest of a nullable expression: every value the matches
    /// completed so far can denote, semantic actions applied.
    ///
    /// Non-nullable expressions yield an empty forest.
    pub fn evaluate(&mut self, expr: Expr) -> Vec<Value<S>> {
        let pass = self.begin_pass();
        self.evaluate_in(expr, &pass)
    }

    pub(crate) fn evaluate_in(&mut self, expr: Expr, pass: &Pass) -> Vec<Value<S>> {
        if let Some((stamp, cached)) = &self.slots[expr.index()].evaluated {
            if *stamp == pass.evaluate {
                return cached.clone();
            }
        }
        self.slots[expr.index()].evaluated = Some((pass.evaluate, Vec::new()));
        let result = match self.step(expr) {
            Step::Union(left, right) => {
                if self.nullable_in(left, pass) || self.nullable_in(right, pass) {
                    let mut values = self.evaluate_in(left, pass);
                    values.extend(self.evaluate_in(right, pass));
                    values
                } else {
                    Vec::new()
                }
            }
            Step::Sequence(left, right) => {
                if self.nullable_in(left, pass) && self.nullable_in(right, pass) {
                    let lefts = self.evaluate_in(left, pass);
                    let rights = self.evaluate_in(right, pass);
                    let mut values = Vec::new();
                    for l in &lefts {
                        for r in &rights {
                            values.push(Value::pair(l.clone(), r.clone()));
                        }
                    }
                    values
                } else {
                    Vec::new()
                }
            }
            Step::Transform(source, action) => {
                if self.nullable_in(source, pass) {
                    action(self.evaluate_in(source, pass))
                } else {
                    Vec::new()
                }
            }
            Step::Reference(Some(binding)) => self.evaluate_in(binding, pass),
            Step::Continuation(producer) => producer(Vec::new()),
            Step::Reference(None) | Step::Terminal(_) | Step::Failure => Vec::new(),
        };
        self.slots[expr.index()].evaluated = Some((pass.evaluate, result.clone()));
        result
    }

    /// Attaches a semantic action to an already-built expression.
    ///
    /// The runtime counterpart of [`reduce`](Language::reduce): the
    /// reachable graph is renormalized through the canonicalizing
    /// constructors (picking up simplifications unlocked by rule
    /// definitions that happened after construction), and the action is
    /// folded on top with the same fusion rules. Attaching actions
    /// repeatedly therefore keeps transform chains one node deep instead
    /// of growing per call.
    pub fn reduce_with<F>(&mut self, expr: Expr, action: F) -> Expr
    where
        F: Fn(Vec<Value<S>>) -> Vec<Value<S>> + 'static,
    {
        let pass = self.begin_pass();
        let renormalized = self.normalize_in(expr, &pass);
        self.reduce_action(renormalized, Rc::new(action))
    }

    fn normalize_in(&mut self, expr: Expr, pass: &Pass) -> Expr {
        if let Some((stamp, cached)) = self.slots[expr.index()].normalized {
            if stamp == pass.normalize {
                return cached;
            }
        }
        match self.step(expr) {
            Step::Union(left, right) => {
                let placeholder = self.seed_normalized(expr, pass);
                let left = self.normalize_in(left, pass);
                let right = self.normalize_in(right, pass);
                let result = self.union(left, right);
                self.bind(placeholder, result);
                result
            }
            Step::Sequence(left, right) => {
                let placeholder = self.seed_normalized(expr, pass);
                let left = self.normalize_in(left, pass);
                let right = self.normalize_in(right, pass);
                let result = self.sequence(left, right);
                self.bind(placeholder, result);
                result
            }
            Step::Transform(source, action) => {
                let placeholder = self.seed_normalized(expr, pass);
                let source = self.normalize_in(source, pass);
                let result = self.reduce_action(source, action);
                self.bind(placeholder, result);
                result
            }
            Step::Reference(Some(binding)) => {
                let placeholder = self.seed_normalized(expr, pass);
                let result = self.normalize_in(binding, pass);
                self.bind(placeholder, result);
                result
            }
            Step::Reference(None) | Step::Terminal(_) | Step::Continuation(_) | Step::Failure => {
                self.slots[expr.index()].normalized = Some((pass.normalize, expr));
                expr
            }
        }
    }

    fn seed_normalized(&mut self, expr: Expr, pass: &Pass) -> Expr {
        let placeholder = self.reference();
        self.slots[expr.index()].normalized = Some((pass.normalize, placeholder));
        placeholder
    }
}

/// Pairs every completed parse of a sequence's left side (captured when
/// the derivative stepped past it) with the values the right side goes on
/// to produce.
fn pair_with_completed<S: Clone + 'static>(completed: Vec<Value<S>>) -> Action<S> {
    Rc::new(move |rights: Vec<Value<S>>| {
        let mut out = Vec::new();
        for right in rights {
            for left in &completed {
                out.push(Value::pair(left.clone(), right.clone()));
            }
        }
        out
    })
}
