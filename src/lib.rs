//! # Layout-Match: widget-tree similarity for GUI layout sketches
//!
//! This library parses bracketed widget token sequences such as
//! `Layout { Button TextView }` into ordered layout trees, normalizes them,
//! and scores pairs of trees with a bottom-up dynamic program that solves a
//! maximum-weight bipartite matching between the children of every node pair.
//!
//! ## Features
//!
//! - **Layout trees**: token grammar, arena-backed trees, compression and pruning
//! - **Similarity**: affinity-weighted tree matching with skip and arity penalties
//! - **Ranking**: parallel, cancellable ranking of a candidate corpus against a query
//! - **Configuration**: penalties, affinity matrix and normalization loaded from JSON

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Widget kinds, layout trees and the token sequence grammar
pub mod layout;

/// Tree similarity scoring
pub mod similarity;

/// Scoring configuration
pub mod config;

/// Corpus loading and ranking
pub mod ranking;

/// Utility functions and helpers
pub mod utils;

// Re-export commonly used types
pub use layout::{LayoutTree, NodeId, WidgetKind};
pub use similarity::{AffinityMatrix, LayoutScorer, Normalization, PreparedLayout, TreeScorer};
pub use config::ScoringConfig;
pub use ranking::{Corpus, Ranker, Ranking};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum LayoutMatchError {
    /// Unbalanced braces or a scope opened without a preceding widget
    #[error("Malformed sequence at token {position}: {reason}")]
    MalformedSequence {
        /// Zero-based index of the offending token
        position: usize,
        /// What went wrong
        reason: String,
    },

    /// Token does not name any widget kind
    #[error("Unknown widget kind '{token}' at token {position}")]
    UnknownWidgetKind {
        /// The unrecognized token
        token: String,
        /// Zero-based index of the token
        position: usize,
    },

    /// Scoring configuration rejected by validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Corpus line that cannot be split into header fields
    #[error("Malformed corpus line {line}: {reason}")]
    MalformedCorpusLine {
        /// One-based line number
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, LayoutMatchError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        config::ScoringConfig,
        layout::{optimize, parse_sequence, to_sequence, LayoutTree, NodeId, WidgetKind},
        ranking::{CancellationToken, Corpus, Ranker, Ranking},
        similarity::{AffinityMatrix, LayoutScorer, Normalization, PreparedLayout, TreeScorer},
        LayoutMatchError, Result,
    };
}
