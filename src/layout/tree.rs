//! Arena-backed ordered layout trees

use std::collections::VecDeque;
use std::fmt;
use serde::{Serialize, Deserialize};

use super::WidgetKind;

/// Node identity inside one [`LayoutTree`]
pub type NodeId = usize;

/// Id of the synthetic dummy root
pub const ROOT: NodeId = 0;

/// A single widget node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Widget kind of this node
    pub kind: WidgetKind,
    /// Children in on-screen order
    children: Vec<NodeId>,
    /// Back-reference used for restructuring only
    parent: Option<NodeId>,
}

impl LayoutNode {
    fn new(kind: WidgetKind, parent: Option<NodeId>) -> Self {
        LayoutNode {
            kind,
            children: Vec::new(),
            parent,
        }
    }
}

/// A rooted ordered tree of widgets
///
/// - Node 0 is a dummy root of kind `Unclassified`
/// - Real nodes get ids in order of creation, ids are never reused
/// - The `children` lists are the only ownership relation; a node that was
///   detached keeps its arena slot but is no longer reachable from the root
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    /// Create a tree holding only the dummy root
    pub fn new() -> Self {
        LayoutTree {
            nodes: vec![LayoutNode::new(WidgetKind::Unclassified, None)],
        }
    }

    /// Append a new node as the last child of `parent`
    pub fn push_node(&mut self, parent: NodeId, kind: WidgetKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(LayoutNode::new(kind, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    /// Number of arena slots, detached nodes included
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Get a node
    pub fn node(&self, id: NodeId) -> &LayoutNode {
        &self.nodes[id]
    }

    /// Widget kind of a node
    pub fn kind(&self, id: NodeId) -> WidgetKind {
        self.nodes[id].kind
    }

    /// Children of a node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Parent of a node (None for the root and for detached nodes)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Real top-level nodes (children of the dummy root)
    pub fn top_level(&self) -> &[NodeId] {
        self.children(ROOT)
    }

    /// True when no real node is reachable
    pub fn is_empty(&self) -> bool {
        self.top_level().is_empty()
    }

    /// Number of real nodes reachable from the root
    pub fn node_count(&self) -> usize {
        self.pre_order().len() - 1
    }

    /// Remove `id` from its parent's children; its subtree goes with it
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    /// Replace the child at `slot` of `parent` with `replacement`, a
    /// descendant of the current occupant. The nodes on the path between
    /// them are dropped from the tree.
    pub(crate) fn splice(&mut self, parent: NodeId, slot: usize, replacement: NodeId) {
        let old = self.nodes[parent].children[slot];
        let mut node = replacement;
        while node != old {
            let Some(up) = self.nodes[node].parent else { break };
            self.nodes[up].children.retain(|&c| c != node);
            node = up;
        }
        self.nodes[old].parent = None;
        self.nodes[parent].children[slot] = replacement;
        self.nodes[replacement].parent = Some(parent);
    }

    /// Drop every child of `id` and return them in order
    pub(crate) fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id].children);
        for &child in &children {
            self.nodes[child].parent = None;
        }
        children
    }

    /// Live nodes in pre-order, dummy root first
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        order
    }

    /// Live nodes in post-order, dummy root last
    ///
    /// Every node appears after all of its descendants.
    pub fn post_order(&self) -> Vec<NodeId> {
        self.post_order_from(ROOT)
    }

    /// Post-order of the subtree rooted at `start`
    pub fn post_order_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![(start, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
            } else {
                stack.push((node, true));
                for &child in self.children(node).iter().rev() {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    /// Copy the subtree rooted at `id` into a fresh tree, renumbering in pre-order
    pub fn extract_subtree(&self, id: NodeId) -> LayoutTree {
        let mut out = LayoutTree::new();
        let mut stack = vec![(id, ROOT)];
        while let Some((node, new_parent)) = stack.pop() {
            let copied = out.push_node(new_parent, self.kind(node));
            for &child in self.children(node).iter().rev() {
                stack.push((child, copied));
            }
        }
        out
    }

    /// Depth of the deepest real node (0 for an empty tree)
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut queue = VecDeque::new();
        queue.push_back((ROOT, 0));
        while let Some((node, depth)) = queue.pop_front() {
            deepest = deepest.max(depth);
            for &child in self.children(node) {
                queue.push_back((child, depth + 1));
            }
        }
        deepest
    }

    /// Depth, size and per-kind histogram of the live tree
    pub fn stats(&self) -> TreeStats {
        let mut kind_counts = [0; WidgetKind::COUNT];
        for &id in self.pre_order().iter().skip(1) {
            kind_counts[self.kind(id).index()] += 1;
        }
        TreeStats {
            depth: self.max_depth(),
            node_count: kind_counts.iter().sum(),
            kind_counts,
        }
    }
}

/// Summary figures for a layout tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Number of levels of real nodes
    pub depth: usize,
    /// Number of real nodes
    pub node_count: usize,
    /// Nodes per kind, indexed by [`WidgetKind::index`]
    pub kind_counts: [usize; WidgetKind::COUNT],
}

impl TreeStats {
    /// Count of a given kind
    pub fn count(&self, kind: WidgetKind) -> usize {
        self.kind_counts[kind.index()]
    }
}

impl LayoutTree {
    fn fmt_recursive(&self, f: &mut fmt::Formatter<'_>, node: NodeId, indent: usize) -> fmt::Result {
        for _ in 0..indent {
            write!(f, "  ")?;
        }
        writeln!(f, "{} #{}", self.kind(node), node)?;

        for &child in self.children(node) {
            self.fmt_recursive(f, child, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LayoutTree(nodes={})", self.node_count())?;
        for &top in self.top_level() {
            self.fmt_recursive(f, top, 1)?;
        }
        Ok(())
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}
