//! Tree normalization: wrapper compression, dead-leaf pruning and list splitting

use log::trace;

use super::{parse_sequence, to_sequence, LayoutTree, NodeId, WidgetKind, ROOT};
use crate::Result;

/// Collapse chains of single-child layout nodes
///
/// A `Layout` with exactly one child is replaced, in its parent's child slot,
/// by the deepest node of its single-child layout chain. `List` nodes are
/// never collapsed: their rows are split off as item templates instead.
/// Returns whether anything changed.
pub fn compress(tree: &mut LayoutTree) -> bool {
    compress_children(tree, ROOT)
}

fn compress_children(tree: &mut LayoutTree, parent: NodeId) -> bool {
    let mut changed = false;
    for slot in 0..tree.children(parent).len() {
        let child = tree.children(parent)[slot];
        let next = if is_single_child_layout(tree, child) {
            let mut alt = tree.children(child)[0];
            while is_single_child_layout(tree, alt) {
                alt = tree.children(alt)[0];
            }
            trace!("compress: #{} ({}) -> #{} ({})", child, tree.kind(child), alt, tree.kind(alt));
            tree.splice(parent, slot, alt);
            changed = true;
            alt
        } else {
            child
        };
        changed |= compress_children(tree, next);
    }
    changed
}

fn is_single_child_layout(tree: &LayoutTree, node: NodeId) -> bool {
    tree.kind(node) == WidgetKind::Layout && tree.children(node).len() == 1
}

/// Detach empty wrappers and unclassified nodes
///
/// Runs top-down in one sweep; a wrapper that only becomes empty because its
/// children were pruned in this sweep is caught by the next one.
pub fn prune(tree: &mut LayoutTree) -> bool {
    prune_children(tree, ROOT)
}

fn prune_children(tree: &mut LayoutTree, parent: NodeId) -> bool {
    let mut changed = false;
    let children = tree.children(parent).to_vec();
    for child in children {
        let kind = tree.kind(child);
        let dead = kind == WidgetKind::Unclassified
            || (kind.is_wrapper() && tree.children(child).is_empty());
        if dead {
            trace!("prune: #{} ({})", child, kind);
            tree.detach(child);
            changed = true;
        } else {
            changed |= prune_children(tree, child);
        }
    }
    changed
}

/// Alternate compress and prune until a round changes nothing
///
/// Returns the number of rounds that changed the tree.
pub fn optimize(tree: &mut LayoutTree) -> usize {
    let mut rounds = 0;
    loop {
        let compressed = compress(tree);
        let pruned = prune(tree);
        if !(compressed || pruned) {
            return rounds;
        }
        rounds += 1;
    }
}

/// Run exactly `rounds` compress/prune rounds (legacy fixed-round policy)
pub fn optimize_rounds(tree: &mut LayoutTree, rounds: usize) {
    for _ in 0..rounds {
        compress(tree);
        prune(tree);
    }
}

/// Apply the configured policy: `None` iterates to a fixpoint
pub fn optimize_with(tree: &mut LayoutTree, rounds: Option<usize>) {
    match rounds {
        Some(n) => optimize_rounds(tree, n),
        None => {
            optimize(tree);
        }
    }
}

/// Parse, optimize and re-serialize a sequence
pub fn optimize_sequence(sequence: &str) -> Result<String> {
    let mut tree = parse_sequence(sequence)?;
    optimize(&mut tree);
    Ok(to_sequence(&tree))
}

/// Detach the children of every `List` node and extract item templates
///
/// Only the first child of each list is kept, as a standalone tree, since the
/// remaining children repeat the same structure. Lists nested inside items are
/// split as well. Templates are returned in pre-order of their lists; the list
/// nodes themselves stay in `tree` as leaves.
pub fn split_list_items(tree: &mut LayoutTree) -> Vec<LayoutTree> {
    let mut item_roots = Vec::new();
    let mut stack: Vec<NodeId> = tree.top_level().iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        let children = if tree.kind(node) == WidgetKind::List {
            let detached = tree.take_children(node);
            if let Some(&first) = detached.first() {
                item_roots.push(first);
            }
            detached
        } else {
            tree.children(node).to_vec()
        };
        stack.extend(children.into_iter().rev());
    }
    item_roots
        .into_iter()
        .map(|root| tree.extract_subtree(root))
        .collect()
}
