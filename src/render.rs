//! Graphviz rendering of expression graphs.
//!
//! Cycle-aware: every reachable node is emitted once under its handle id
//! and reference bindings become edges, so a recursive grammar renders as
//! a cyclic digraph instead of hanging the renderer.

use crate::language::{Expr, Language, Node};
use std::collections::HashSet;

impl<S> Language<S> {
    /// Renders the graph reachable from `expr` in the
    /// [graphviz](https://graphviz.org/docs/layouts/dot/) dot format.
    pub fn to_dot(&self, expr: Expr) -> String {
        let mut reachable = vec![expr];
        let mut seen: HashSet<usize> = HashSet::from([expr.index()]);
        let mut cursor = 0;
        while cursor < reachable.len() {
            let current = reachable[cursor];
            cursor += 1;
            for (child, _) in self.edges(current) {
                if seen.insert(child.index()) {
                    reachable.push(child);
                }
            }
        }
        reachable.sort_by_key(|node| node.index());

        let mut out = String::from("digraph expression {\n  rankdir = LR;\n");
        for &node in &reachable {
            out.push_str(&format!(
                "  {} [label = \"{}\"];\n",
                node.index(),
                self.dot_label(node)
            ));
        }
        for &node in &reachable {
            for (child, edge) in self.edges(node) {
                out.push_str(&format!(
                    "  {} -> {} [label = \"{}\"];\n",
                    node.index(),
                    child.index(),
                    edge
                ));
            }
        }
        out.push('}');
        out
    }

    fn dot_label(&self, expr: Expr) -> &'static str {
        match self.node(expr) {
            Node::Union { .. } => "union",
            Node::Sequence { .. } => "sequence",
            Node::Transform { .. } => "transform",
            Node::Reference { binding: Some(_) } => "reference",
            Node::Reference { binding: None } => "reference (unbound)",
            Node::Terminal { .. } => "terminal",
            Node::Continuation { .. } => "continuation",
            Node::Failure { .. } => "failure",
        }
    }

    fn edges(&self, expr: Expr) -> Vec<(Expr, &'static str)> {
        match self.node(expr) {
            Node::Union { left, right } | Node::Sequence { left, right } => {
                vec![(*left, "l"), (*right, "r")]
            }
            Node::Transform { source, .. } => vec![(*source, "src")],
            Node::Reference {
                binding: Some(binding),
            } => vec![(*binding, "bind")],
            _ => Vec::new(),
        }
    }
}
