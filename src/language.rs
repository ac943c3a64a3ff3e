//! The expression arena and its canonicalizing constructors.
//!
//! Expressions are stored as a graph of nodes inside a [`Language`] and
//! addressed by copyable [`Expr`] handles. The graph is not a tree: rule
//! references introduce sharing and cycles, so nodes are owned by the
//! arena and never freed while it lives.
//!
//! Construction goes through canonicalizing constructors that apply the
//! simplification rules of the algebra (failure absorption, transform
//! fusion, right-association of sequences) so that equivalent expressions
//! converge to small normal forms. Callers must treat the returned handle
//! as the authoritative representative of the composed language:
//! `union(failure(), x)` is `x`, not a union node.

use crate::kind::Kind;
use crate::value::{Action, Predicate, Value};
use std::fmt;
use std::rc::Rc;

/// Handle to a node inside a [`Language`].
///
/// Handles are plain indices: cheap to copy, stable for the lifetime of
/// the arena, and shared freely between expressions. Two expressions that
/// embed the same handle observe the same node, including later mutation
/// of a reference binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expr(pub(crate) u32);

impl Expr {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the expression graph.
pub(crate) enum Node<S> {
    Union { left: Expr, right: Expr },
    Sequence { left: Expr, right: Expr },
    Transform { source: Expr, action: Action<S> },
    Reference { binding: Option<Expr> },
    Terminal { predicate: Predicate<S> },
    Continuation { producer: Action<S> },
    Failure { offending: Option<Value<S>> },
}

impl<S> Node<S> {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Node::Union { .. } => Kind::Union,
            Node::Sequence { .. } => Kind::Sequence,
            Node::Transform { .. } => Kind::Transform,
            Node::Reference { .. } => Kind::Reference,
            Node::Terminal { .. } => Kind::Terminal,
            Node::Continuation { .. } => Kind::Continuation,
            Node::Failure { .. } => Kind::Failure,
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Union { left, right } => write!(f, "Union({:?}, {:?})", left, right),
            Node::Sequence { left, right } => write!(f, "Sequence({:?}, {:?})", left, right),
            Node::Transform { source, .. } => write!(f, "Transform({:?}, ..)", source),
            Node::Reference { binding } => write!(f, "Reference({:?})", binding),
            Node::Terminal { .. } => write!(f, "Terminal(..)"),
            Node::Continuation { .. } => write!(f, "Continuation(..)"),
            Node::Failure { offending } => write!(f, "Failure({:?})", offending),
        }
    }
}

/// One arena slot: a node plus its per-traversal memo cells.
///
/// Each cell holds the generation token of the pass that wrote it; a
/// traversal only trusts a cell stamped with its own token.
pub(crate) struct Slot<S> {
    pub(crate) node: Node<S>,
    pub(crate) nullable: Option<(u64, bool)>,
    pub(crate) derived: Option<(u64, Expr)>,
    pub(crate) evaluated: Option<(u64, Vec<Value<S>>)>,
    pub(crate) normalized: Option<(u64, Expr)>,
}

/// An expression arena: node storage, memoization cells, and the
/// generation counter that stamps traversal passes.
pub struct Language<S> {
    pub(crate) slots: Vec<Slot<S>>,
    pub(crate) generation: u64,
}

impl<S> fmt::Debug for Language<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("nodes", &self.slots.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl<S> Default for Language<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Language<S> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Language {
            slots: Vec::new(),
            generation: 0,
        }
    }

    /// Number of nodes allocated so far.
    pub fn node_count(&self) -> usize {
        self.slots.len()
    }

    /// The variant the canonicalizing constructors actually produced for
    /// this handle.
    pub fn kind(&self, expr: Expr) -> Kind {
        self.node(expr).kind()
    }

    /// The value that drove a failure node into the empty language, if the
    /// node is a failure and one was recorded.
    pub fn failure_cause(&self, expr: Expr) -> Option<&Value<S>> {
        match self.node(expr) {
            Node::Failure { offending } => offending.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn node(&self, expr: Expr) -> &Node<S> {
        &self.slots[expr.index()].node
    }

    fn alloc(&mut self, node: Node<S>) -> Expr {
        let handle = Expr(self.slots.len() as u32);
        self.slots.push(Slot {
            node,
            nullable: None,
            derived: None,
            evaluated: None,
            normalized: None,
        });
        handle
    }

    /// Assigns a reference node's binding. All expressions holding the
    /// handle observe the new binding; non-reference nodes are left
    /// untouched.
    pub(crate) fn bind(&mut self, reference: Expr, target: Expr) {
        if let Node::Reference { binding } = &mut self.slots[reference.index()].node {
            *binding = Some(target);
        }
    }
}

impl<S: Clone + 'static> Language<S> {
    /// Allocates a terminal matching one input symbol satisfying
    /// `predicate`.
    pub fn terminal<P>(&mut self, predicate: P) -> Expr
    where
        P: Fn(&S) -> bool + 'static,
    {
        self.alloc(Node::Terminal {
            predicate: Rc::new(predicate),
        })
    }

    /// Allocates a terminal matching exactly `symbol`.
    pub fn symbol(&mut self, symbol: S) -> Expr
    where
        S: PartialEq + 'static,
    {
        self.terminal(move |candidate| *candidate == symbol)
    }

    /// Allocates a terminal matching any of `symbols`.
    pub fn one_of<I>(&mut self, symbols: I) -> Expr
    where
        S: PartialEq + 'static,
        I: IntoIterator<Item = S>,
    {
        let symbols: Vec<S> = symbols.into_iter().collect();
        self.terminal(move |candidate| symbols.iter().any(|symbol| symbol == candidate))
    }

    /// Allocates a continuation holding already-produced parse values.
    ///
    /// A continuation is nullable and contributes `producer`'s values to
    /// the parse forest; deriving it fails, since the symbol it stands for
    /// is already consumed.
    pub fn continuation<F>(&mut self, producer: F) -> Expr
    where
        F: Fn(Vec<Value<S>>) -> Vec<Value<S>> + 'static,
    {
        self.alloc(Node::Continuation {
            producer: Rc::new(producer),
        })
    }

    /// Allocates the empty language.
    pub fn failure(&mut self) -> Expr {
        self.alloc(Node::Failure { offending: None })
    }

    /// Allocates the empty language, recording the value that caused it.
    pub fn failure_with(&mut self, offending: Value<S>) -> Expr {
        self.alloc(Node::Failure {
            offending: Some(offending),
        })
    }

    /// Allocates a fresh unbound reference.
    ///
    /// Until bound it behaves as the empty language. Binding it later is
    /// observed by every expression that captured the handle, which is how
    /// forward-declared and recursive rules are tied.
    pub fn reference(&mut self) -> Expr {
        self.alloc(Node::Reference { binding: None })
    }

    /// The language matching either operand.
    ///
    /// Failure is the identity: if one side is a failure node the other
    /// side's canonical form is returned unchanged.
    pub fn union(&mut self, left: Expr, right: Expr) -> Expr {
        if self.kind(left) == Kind::Failure {
            return right;
        }
        if self.kind(right) == Kind::Failure {
            return left;
        }
        self.alloc(Node::Union { left, right })
    }

    /// The language matching `left` followed by `right`, pairing their
    /// parse values.
    ///
    /// Failure is absorbing. A continuation operand folds into a transform
    /// over the other side; a transform operand is hoisted outward so the
    /// underlying sequences fuse; a sequence on the left is re-associated
    /// into a right-leaning chain. The result therefore keeps two
    /// invariants: a sequence node never holds a continuation operand, and
    /// chains lean right, so traversal cost stays linear in chain length.
    pub fn sequence(&mut self, left: Expr, right: Expr) -> Expr {
        if self.kind(left) == Kind::Failure {
            return left;
        }
        if self.kind(right) == Kind::Failure {
            return right;
        }
        if let Node::Continuation { producer } = self.node(left) {
            let action = cross_from_left(Rc::clone(producer));
            return self.reduce_action(right, action);
        }
        if let Node::Continuation { producer } = self.node(right) {
            let action = cross_from_right(Rc::clone(producer));
            return self.reduce_action(left, action);
        }
        if let Node::Transform { source, action } = self.node(left) {
            let (source, action) = (*source, Rc::clone(action));
            let fused = self.sequence(source, right);
            return self.reduce_action(fused, rethread_left(action));
        }
        if let Node::Transform { source, action } = self.node(right) {
            let (source, action) = (*source, Rc::clone(action));
            let fused = self.sequence(left, source);
            return self.reduce_action(fused, rethread_right(action));
        }
        if let Node::Sequence {
            left: first,
            right: second,
        } = self.node(left)
        {
            let (first, second) = (*first, *second);
            let tail = self.sequence(second, right);
            let chain = self.sequence(first, tail);
            return self.reduce_action(chain, reassociate());
        }
        self.alloc(Node::Sequence { left, right })
    }

    /// Wraps `source` with a semantic action over its parse values.
    ///
    /// Failure passes through; wrapping a continuation composes onto its
    /// producer; wrapping a transform composes the two actions into one
    /// node, so chains of reductions never nest.
    pub fn reduce<F>(&mut self, source: Expr, action: F) -> Expr
    where
        F: Fn(Vec<Value<S>>) -> Vec<Value<S>> + 'static,
    {
        self.reduce_action(source, Rc::new(action))
    }

    pub(crate) fn reduce_action(&mut self, source: Expr, action: Action<S>) -> Expr {
        enum Fold<S> {
            Plain,
            IntoContinuation(Action<S>),
            IntoTransform(Expr, Action<S>),
        }
        let fold = match self.node(source) {
            Node::Failure { .. } => return source,
            Node::Continuation { producer } => Fold::IntoContinuation(Rc::clone(producer)),
            Node::Transform {
                source: inner,
                action: existing,
            } => Fold::IntoTransform(*inner, Rc::clone(existing)),
            _ => Fold::Plain,
        };
        match fold {
            Fold::IntoContinuation(producer) => {
                let producer = compose(action, producer);
                self.alloc(Node::Continuation { producer })
            }
            Fold::IntoTransform(inner, existing) => {
                let action = compose(action, existing);
                self.alloc(Node::Transform {
                    source: inner,
                    action,
                })
            }
            Fold::Plain => self.alloc(Node::Transform { source, action }),
        }
    }
}

/// `outer` after `inner`.
fn compose<S: 'static>(outer: Action<S>, inner: Action<S>) -> Action<S> {
    Rc::new(move |values| outer(inner(values)))
}

/// Pairs a consumed continuation's values (left) with the other side's
/// values (right); used when a continuation sits left of a sequence.
fn cross_from_left<S: Clone + 'static>(producer: Action<S>) -> Action<S> {
    Rc::new(move |rights: Vec<Value<S>>| {
        let lefts = producer(Vec::new());
        let mut out = Vec::new();
        for right in rights {
            for left in &lefts {
                out.push(Value::pair(left.clone(), right.clone()));
            }
        }
        out
    })
}

/// Mirror of [`cross_from_left`] for a continuation right of a sequence.
fn cross_from_right<S: Clone + 'static>(producer: Action<S>) -> Action<S> {
    Rc::new(move |lefts: Vec<Value<S>>| {
        let rights = producer(Vec::new());
        let mut out = Vec::new();
        for left in lefts {
            for right in &rights {
                out.push(Value::pair(left.clone(), right.clone()));
            }
        }
        out
    })
}

/// Rethreads a transform hoisted out of a sequence's left side: each pair
/// `(a, b)` becomes `(action([a]), b)`, one pair per rewritten value.
fn rethread_left<S: Clone + 'static>(action: Action<S>) -> Action<S> {
    Rc::new(move |pairs: Vec<Value<S>>| {
        let mut out = Vec::new();
        for value in pairs {
            if let Value::Pair(left, right) = value {
                for rewritten in action(vec![*left]) {
                    out.push(Value::pair(rewritten, (*right).clone()));
                }
            }
        }
        out
    })
}

/// Mirror of [`rethread_left`] for a transform hoisted out of the right
/// side.
fn rethread_right<S: Clone + 'static>(action: Action<S>) -> Action<S> {
    Rc::new(move |pairs: Vec<Value<S>>| {
        let mut out = Vec::new();
        for value in pairs {
            if let Value::Pair(left, right) = value {
                for rewritten in action(vec![*right]) {
                    out.push(Value::pair((*left).clone(), rewritten));
                }
            }
        }
        out
    })
}

/// Reshapes the values of a re-associated chain: `(a, (b, c))` back into
/// the `((a, b), c)` the original left-nested sequence denoted.
fn reassociate<S: Clone>() -> Action<S> {
    Rc::new(|values: Vec<Value<S>>| {
        let mut out = Vec::new();
        for value in values {
            if let Value::Pair(first, rest) = value {
                if let Value::Pair(second, tail) = *rest {
                    out.push(Value::pair(Value::pair(*first, *second), *tail));
                }
            }
        }
        out
    })
}
