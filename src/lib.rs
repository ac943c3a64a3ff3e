//! # gramarye
//!
//! A derivative-based grammar engine.
//!
//! Languages are built as graphs of combinator nodes — union, sequence,
//! semantic transform, rule reference, terminal, continuation, failure —
//! and matched by repeatedly taking the *derivative* of the graph with
//! respect to one input symbol at a time. After the input is exhausted,
//! nullability of the residual graph answers whether the match completed,
//! and evaluation extracts the parse forest with semantic actions applied.
//!
//! The engine is deliberately small: it does not tokenize, schedule I/O,
//! or read grammar files. Callers build a graph through a [`Language`]
//! (and a [`Scope`] for named, possibly recursive rules), then feed it
//! symbols.
//!
//! ```
//! use gramarye::{Language, Scope};
//!
//! let mut lang = Language::new();
//! let mut rules = Scope::new();
//!
//! // xs = 'x' xs | 'x'
//! let xs = rules.lookup(&mut lang, "xs");
//! let x = lang.symbol('x');
//! let rep = lang.sequence(x, xs);
//! let body = lang.union(rep, x);
//! rules.define(&mut lang, "xs", body);
//!
//! assert!(lang.matches(xs, "xxx".chars()));
//! assert!(!lang.matches(xs, "xy".chars()));
//! ```
//!
//! Graphs are cyclic whenever a grammar is recursive, so every traversal
//! is memoized under a generation token and seeds its cache before
//! recursing (the traversal module documents the discipline). All of it
//! is single-threaded by design: nodes carry `Rc` payloads and the arena
//! mutates caches through `&mut self`.

pub mod kind;
pub mod language;
pub mod matching;
pub mod scope;
pub mod value;

mod render;
mod traversal;

pub use kind::Kind;
pub use language::{Expr, Language};
pub use matching::ParseError;
pub use scope::Scope;
pub use value::{Action, Predicate, Value};
