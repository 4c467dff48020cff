//! Human readable renderings of layout trees

use std::fmt::Write;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use super::{LayoutTree, NodeId, ROOT};

/// Indented outline of widget kinds, one node per line
pub fn render_text(tree: &LayoutTree) -> String {
    fn recurse(tree: &LayoutTree, node: NodeId, prefix: &str, last: bool, out: &mut String) {
        let branch = if last { "└── " } else { "├── " };
        let _ = writeln!(out, "{}{}{}", prefix, branch, tree.kind(node));
        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        let children = tree.children(node);
        for (i, &child) in children.iter().enumerate() {
            recurse(tree, child, &child_prefix, i + 1 == children.len(), out);
        }
    }

    let mut out = String::new();
    let top = tree.top_level();
    for (i, &node) in top.iter().enumerate() {
        recurse(tree, node, "", i + 1 == top.len(), &mut out);
    }
    out
}

/// Convert the live tree into a petgraph graph labelled `Kind #id`
pub fn to_graph(tree: &LayoutTree) -> DiGraph<String, &'static str> {
    let mut graph = DiGraph::new();
    let mut index: Vec<Option<NodeIndex>> = vec![None; tree.arena_len()];

    for node in tree.pre_order() {
        let label = if node == ROOT {
            "root".to_string()
        } else {
            format!("{} #{}", tree.kind(node), node)
        };
        let idx = graph.add_node(label);
        index[node] = Some(idx);
        if let Some(parent_idx) = tree.parent(node).and_then(|p| index[p]) {
            graph.add_edge(parent_idx, idx, "");
        }
    }

    graph
}

/// Graphviz DOT export of the live tree
pub fn to_dot(tree: &LayoutTree) -> String {
    let graph = to_graph(tree);
    format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
}
