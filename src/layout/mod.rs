//! Layout trees: widget kinds, token grammar, normalization and rendering

mod widget;
mod tree;
mod sequence;
mod optimize;
pub mod render;

pub use widget::WidgetKind;
pub use tree::{LayoutNode, LayoutTree, NodeId, TreeStats, ROOT};
pub use sequence::{build_tree, parse_sequence, to_sequence, to_tokens, tokenize, Token};
pub use optimize::{
    compress, optimize, optimize_rounds, optimize_sequence, optimize_with, prune, split_list_items,
};
