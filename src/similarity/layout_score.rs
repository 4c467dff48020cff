//! Layout-level similarity: main tree plus list-item template, normalized

use serde::{Serialize, Deserialize};

use super::TreeScorer;
use crate::config::ScoringConfig;
use crate::layout::{optimize_with, parse_sequence, split_list_items, LayoutTree};
use crate::Result;

/// Conversion of a raw score into a size-independent similarity
///
/// `s` is the raw query/candidate score, `q` and `c` the self-scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// `s`
    Raw,
    /// `2s / (q + c)`
    SelfRatio,
    /// `s² / (q · c)`
    #[default]
    SquaredRatio,
    /// `2s² / (q + c)`
    SquaredOverMean,
}

impl Normalization {
    /// Normalize `raw` against the two self-scores; a zero denominator gives 0
    pub fn apply(self, raw: f64, query_self: f64, candidate_self: f64) -> f64 {
        let (numerator, denominator) = match self {
            Normalization::Raw => return raw,
            Normalization::SelfRatio => (2.0 * raw, query_self + candidate_self),
            Normalization::SquaredRatio => (raw * raw, query_self * candidate_self),
            Normalization::SquaredOverMean => (2.0 * raw * raw, query_self + candidate_self),
        };
        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }
}

/// A parsed and optimized layout, not scored yet
#[derive(Clone, Debug)]
pub struct LayoutParts {
    /// Main tree with list rows split off
    pub main: LayoutTree,
    /// List-item template, if any
    pub item: Option<LayoutTree>,
}

impl LayoutParts {
    /// Live nodes across main tree and item template
    pub fn node_count(&self) -> usize {
        self.main.node_count() + self.item.as_ref().map_or(0, LayoutTree::node_count)
    }
}

/// A layout ready for comparison
///
/// The main tree is optimized with its list children split off; `item` is the
/// first list-item template, if the layout has one.
#[derive(Clone, Debug)]
pub struct PreparedLayout {
    main: LayoutTree,
    item: Option<LayoutTree>,
    self_score: f64,
}

impl PreparedLayout {
    /// Main tree
    pub fn main(&self) -> &LayoutTree {
        &self.main
    }

    /// List-item template
    pub fn item(&self) -> Option<&LayoutTree> {
        self.item.as_ref()
    }

    /// Weighted self-score used as normalization reference
    pub fn self_score(&self) -> f64 {
        self.self_score
    }

    /// Live nodes across main tree and item template
    pub fn node_count(&self) -> usize {
        self.main.node_count() + self.item.as_ref().map_or(0, LayoutTree::node_count)
    }

    /// True when neither part has real nodes
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

/// Scores and normalizes whole layouts under one configuration
#[derive(Clone, Debug, Default)]
pub struct LayoutScorer {
    config: ScoringConfig,
}

impl LayoutScorer {
    /// Create a scorer for a validated configuration
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(LayoutScorer { config })
    }

    /// The configuration in use
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Tree-level scorer sharing this configuration
    pub fn tree_scorer(&self) -> TreeScorer<'_> {
        TreeScorer::new(&self.config)
    }

    /// Parse and normalize a full layout sequence
    pub fn prepare(&self, sequence: &str) -> Result<PreparedLayout> {
        self.prepare_parts(sequence, None)
    }

    /// Prepare a layout whose item template may be given separately
    ///
    /// An explicit `item_sequence` takes precedence over items split off the
    /// main tree's lists.
    pub fn prepare_parts(&self, sequence: &str, item_sequence: Option<&str>) -> Result<PreparedLayout> {
        let parts = self.parse_parts(sequence, item_sequence)?;
        Ok(self.assemble(parts.main, parts.item))
    }

    /// Parse, optimize and split a layout without scoring it
    pub fn parse_parts(&self, sequence: &str, item_sequence: Option<&str>) -> Result<LayoutParts> {
        let mut main = parse_sequence(sequence)?;
        optimize_with(&mut main, self.config.optimize_rounds);
        let split = split_list_items(&mut main).into_iter().next();

        let item = match item_sequence {
            Some(text) => Some(parse_sequence(text)?),
            None => split,
        };
        let item = item
            .map(|mut tree| {
                optimize_with(&mut tree, self.config.optimize_rounds);
                tree
            })
            .filter(|tree| !tree.is_empty());

        Ok(LayoutParts { main, item })
    }

    /// Wrap already built trees, computing the self-score
    pub fn assemble(&self, main: LayoutTree, item: Option<LayoutTree>) -> PreparedLayout {
        let scorer = self.tree_scorer();
        let item_self = item.as_ref().map_or(0.0, |tree| scorer.self_score(tree));
        let self_score = scorer.self_score(&main) + self.config.item_weight * item_self;
        PreparedLayout { main, item, self_score }
    }

    /// Weighted raw score: main trees plus `item_weight` times item templates
    pub fn raw_score(&self, query: &PreparedLayout, candidate: &PreparedLayout) -> f64 {
        let scorer = self.tree_scorer();
        let main = scorer.score(&query.main, &candidate.main);
        let item = match (&query.item, &candidate.item) {
            (Some(q), Some(c)) => scorer.score(q, c),
            _ => 0.0,
        };
        main + self.config.item_weight * item
    }

    /// Normalized similarity of `candidate` to `query`
    pub fn similarity(&self, query: &PreparedLayout, candidate: &PreparedLayout) -> f64 {
        let raw = self.raw_score(query, candidate);
        self.config
            .normalization
            .apply(raw, query.self_score, candidate.self_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::to_sequence;

    fn scorer() -> LayoutScorer {
        LayoutScorer::default()
    }

    #[test]
    fn test_normalization_formulas() {
        assert_eq!(Normalization::Raw.apply(6.0, 10.0, 20.0), 6.0);
        assert_eq!(Normalization::SelfRatio.apply(6.0, 10.0, 20.0), 0.4);
        assert_eq!(Normalization::SquaredRatio.apply(6.0, 10.0, 20.0), 0.18);
        assert_eq!(Normalization::SquaredOverMean.apply(6.0, 10.0, 20.0), 2.4);
    }

    #[test]
    fn test_normalization_zero_denominator() {
        for norm in [
            Normalization::SelfRatio,
            Normalization::SquaredRatio,
            Normalization::SquaredOverMean,
        ] {
            let value = norm.apply(0.0, 0.0, 0.0);
            assert_eq!(value, 0.0);
            assert!(!value.is_nan());
        }
    }

    #[test]
    fn test_identical_layouts_normalize_to_one() {
        let s = scorer();
        let a = s.prepare("Layout { Toolbar Layout { Button TextView } }").unwrap();
        let b = s.prepare("Layout { Toolbar Layout { TextView Button } }").unwrap();
        assert_eq!(s.similarity(&a, &a), 1.0);
        assert_eq!(s.similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_prepare_splits_list_items() {
        let s = scorer();
        let layout = s
            .prepare("Layout { Toolbar List { Layout { ImageView TextView } Layout { ImageView TextView } } }")
            .unwrap();
        assert_eq!(to_sequence(layout.main()), "Layout { Toolbar List }");
        assert_eq!(to_sequence(layout.item().unwrap()), "Layout { ImageView TextView }");
        // main: 1 + 10 + 1, item: 21 weighted by 1.5
        assert_eq!(layout.self_score(), 12.0 + 1.5 * 21.0);
        assert_eq!(layout.node_count(), 6);
    }

    #[test]
    fn test_single_row_list_matches_multi_row_list() {
        let s = scorer();
        let one = s.prepare("Layout { Toolbar List { Layout { ImageView TextView } } }").unwrap();
        let two = s
            .prepare("Layout { Toolbar List { Layout { ImageView TextView } Layout { ImageView TextView } } }")
            .unwrap();
        assert_eq!(to_sequence(one.main()), "Layout { Toolbar List }");
        assert_eq!(to_sequence(one.item().unwrap()), "Layout { ImageView TextView }");
        assert_eq!(one.self_score(), two.self_score());
        assert_eq!(s.similarity(&one, &two), 1.0);
    }

    #[test]
    fn test_parse_parts_counts_nodes_without_scoring() {
        let s = scorer();
        let parts = s
            .parse_parts("Layout { Toolbar List { Layout { ImageView TextView } } }", None)
            .unwrap();
        assert_eq!(parts.node_count(), 6);
        let prepared = s.assemble(parts.main, parts.item);
        assert_eq!(prepared.node_count(), 6);
    }

    #[test]
    fn test_explicit_item_sequence() {
        let s = scorer();
        let layout = s.prepare_parts("Layout { Toolbar List }", Some("Layout { Layout { Button } }")).unwrap();
        assert_eq!(to_sequence(layout.item().unwrap()), "Button");
    }

    #[test]
    fn test_item_mismatch_lowers_similarity() {
        let s = scorer();
        let query = s.prepare("Layout { Toolbar List { Layout { ImageView TextView } Layout { ImageView TextView } } }").unwrap();
        let same_items = s.prepare("Layout { Toolbar List { Layout { ImageView TextView } Layout { ImageView TextView } Layout { ImageView TextView } } }").unwrap();
        let other_items = s.prepare("Layout { Toolbar List { Layout { EditText Switch } Layout { EditText Switch } } }").unwrap();
        let no_list = s.prepare("Layout { Toolbar Button }").unwrap();

        let same = s.similarity(&query, &same_items);
        let other = s.similarity(&query, &other_items);
        let none = s.similarity(&query, &no_list);
        assert_eq!(same, 1.0);
        assert!(other < same);
        assert!(none < same);
    }

    #[test]
    fn test_empty_layout() {
        let s = scorer();
        let empty = s.prepare("Layout { Unclassified }").unwrap();
        let other = s.prepare("Layout { Button Switch }").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.self_score(), 0.0);
        assert_eq!(s.raw_score(&empty, &other), 0.0);
        assert_eq!(s.similarity(&empty, &other), 0.0);
        assert_eq!(s.similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScoringConfig {
            dist_penalty: -3.0,
            ..ScoringConfig::default()
        };
        assert!(LayoutScorer::new(config).is_err());
    }
}
