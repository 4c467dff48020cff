//! Bracketed token sequences: `Layout { Button TextView }`
//!
//! A sequence is a whitespace separated stream of widget names, `{` (enter the
//! child scope of the widget just emitted) and `}` (leave the current scope).

use std::fmt;
use std::str::FromStr;

use super::{LayoutTree, NodeId, WidgetKind, ROOT};
use crate::{LayoutMatchError, Result};

/// A single grammar token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// Emits a node
    Widget(WidgetKind),
    /// `{`
    Open,
    /// `}`
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Widget(kind) => write!(f, "{}", kind),
            Token::Open => f.write_str("{"),
            Token::Close => f.write_str("}"),
        }
    }
}

/// Split a sequence into tokens
pub fn tokenize(sequence: &str) -> Result<Vec<Token>> {
    sequence
        .split_whitespace()
        .enumerate()
        .map(|(position, word)| match word {
            "{" => Ok(Token::Open),
            "}" => Ok(Token::Close),
            name => WidgetKind::from_name(name)
                .map(Token::Widget)
                .ok_or_else(|| LayoutMatchError::UnknownWidgetKind {
                    token: name.to_string(),
                    position,
                }),
        })
        .collect()
}

/// Build a layout tree from a token sequence
///
/// Node ids are assigned from 1 in token order; id 0 is the dummy root.
pub fn parse_sequence(sequence: &str) -> Result<LayoutTree> {
    let tokens = tokenize(sequence)?;
    build_tree(&tokens)
}

/// Build a layout tree from already tokenized input
pub fn build_tree(tokens: &[Token]) -> Result<LayoutTree> {
    let mut tree = LayoutTree::new();
    // Open scopes, innermost last. The root scope is never closed.
    let mut scopes: Vec<NodeId> = vec![ROOT];
    let mut last_emitted: Option<NodeId> = None;

    for (position, token) in tokens.iter().enumerate() {
        match *token {
            Token::Widget(kind) => {
                let parent = *scopes.last().unwrap_or(&ROOT);
                last_emitted = Some(tree.push_node(parent, kind));
            }
            Token::Open => {
                let owner = last_emitted.take().ok_or_else(|| LayoutMatchError::MalformedSequence {
                    position,
                    reason: "'{' must follow a widget".to_string(),
                })?;
                scopes.push(owner);
            }
            Token::Close => {
                if scopes.len() == 1 {
                    return Err(LayoutMatchError::MalformedSequence {
                        position,
                        reason: "'}' without matching '{'".to_string(),
                    });
                }
                scopes.pop();
                last_emitted = None;
            }
        }
    }

    if scopes.len() > 1 {
        return Err(LayoutMatchError::MalformedSequence {
            position: tokens.len(),
            reason: format!("{} unclosed scope(s) at end of sequence", scopes.len() - 1),
        });
    }

    Ok(tree)
}

/// Serialize the live tree back to tokens (pre-order, braces around children)
pub fn to_tokens(tree: &LayoutTree) -> Vec<Token> {
    fn emit(tree: &LayoutTree, node: NodeId, out: &mut Vec<Token>) {
        out.push(Token::Widget(tree.kind(node)));
        let children = tree.children(node);
        if !children.is_empty() {
            out.push(Token::Open);
            for &child in children {
                emit(tree, child, out);
            }
            out.push(Token::Close);
        }
    }

    let mut tokens = Vec::new();
    for &top in tree.top_level() {
        emit(tree, top, &mut tokens);
    }
    tokens
}

/// Serialize the live tree to a space separated sequence
pub fn to_sequence(tree: &LayoutTree) -> String {
    to_tokens(tree)
        .iter()
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for LayoutTree {
    type Err = LayoutMatchError;

    fn from_str(s: &str) -> Result<Self> {
        parse_sequence(s)
    }
}

impl fmt::Display for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_sequence(self))
    }
}
