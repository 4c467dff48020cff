//! Bottom-up tree similarity: dynamic programming over node pairs with a
//! maximum-weight bipartite matching of children at every pair

use log::{debug, trace};
use ndarray::Array2;

use super::affinity::AffinityMatrix;
use super::matching::max_weight_matching;
use crate::config::ScoringConfig;
use crate::layout::{LayoutTree, NodeId};

/// Best scores for one `(u, v)` node pair
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreCell {
    /// `u` and `v` paired: affinity plus matched children minus arity penalty
    pub matched: f64,
    /// One side skipped one level down, minus the skip penalty
    pub unmatched: f64,
}

impl ScoreCell {
    /// Better of the two alternatives
    pub fn best(&self) -> f64 {
        self.matched.max(self.unmatched)
    }
}

/// Working table of one comparison, indexed by `(id in tree 1, id in tree 2)`
#[derive(Clone, Debug)]
pub struct ScoreMatrix {
    cells: Array2<ScoreCell>,
    best: Option<(NodeId, NodeId, f64)>,
}

impl ScoreMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        ScoreMatrix {
            cells: Array2::from_elem((rows, cols), ScoreCell::default()),
            best: None,
        }
    }

    /// Cell for a node pair
    pub fn cell(&self, u: NodeId, v: NodeId) -> ScoreCell {
        self.cells[[u, v]]
    }

    /// Highest `matched` value and the pair that reached it
    pub fn best_pair(&self) -> Option<(NodeId, NodeId, f64)> {
        self.best
    }

    /// Similarity score: highest `matched` value, 0 when nothing was compared
    pub fn score(&self) -> f64 {
        self.best.map_or(0.0, |(_, _, score)| score)
    }

    /// Table dimensions
    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    fn record(&mut self, u: NodeId, v: NodeId, cell: ScoreCell) {
        self.cells[[u, v]] = cell;
        if self.best.map_or(true, |(_, _, best)| cell.matched > best) {
            self.best = Some((u, v, cell.matched));
        }
    }
}

/// Scores pairs of layout trees
#[derive(Clone, Debug)]
pub struct TreeScorer<'a> {
    affinity: &'a AffinityMatrix,
    dist_penalty: f64,
    child_mismatch_penalty: f64,
}

impl<'a> TreeScorer<'a> {
    /// Create a scorer using the affinity table and penalties of `config`
    pub fn new(config: &'a ScoringConfig) -> Self {
        TreeScorer {
            affinity: &config.affinity,
            dist_penalty: config.dist_penalty,
            child_mismatch_penalty: config.child_mismatch_penalty,
        }
    }

    /// Best correspondence score between two trees
    ///
    /// Returns 0 when either tree has no real nodes.
    pub fn score(&self, t1: &LayoutTree, t2: &LayoutTree) -> f64 {
        self.score_matrix(t1, t2).score()
    }

    /// Score of a tree against itself, the normalization reference
    pub fn self_score(&self, tree: &LayoutTree) -> f64 {
        self.score(tree, tree)
    }

    /// Run the dynamic program and return the full table
    pub fn score_matrix(&self, t1: &LayoutTree, t2: &LayoutTree) -> ScoreMatrix {
        let mut matrix = ScoreMatrix::new(t1.arena_len(), t2.arena_len());
        if t1.is_empty() || t2.is_empty() {
            debug!("empty tree in comparison, score is 0");
            return matrix;
        }

        // Post-order on both sides: every child pair is final before its parents.
        let post1 = t1.post_order();
        let post2 = t2.post_order();

        for &u in &post1 {
            let u_children = t1.children(u);
            for &v in &post2 {
                let v_children = t2.children(v);
                let cell = ScoreCell {
                    matched: self.matched(&matrix, t1, u, u_children, t2, v, v_children),
                    unmatched: self.unmatched(&matrix, u, u_children, v, v_children),
                };
                matrix.record(u, v, cell);
            }
        }

        if let Some((u, v, score)) = matrix.best_pair() {
            trace!("best pair: #{} ({}) ~ #{} ({}) = {}", u, t1.kind(u), v, t2.kind(v), score);
        }
        matrix
    }

    fn unmatched(
        &self,
        matrix: &ScoreMatrix,
        u: NodeId,
        u_children: &[NodeId],
        v: NodeId,
        v_children: &[NodeId],
    ) -> f64 {
        let skip_u = max_or_zero(u_children.iter().map(|&c| matrix.cell(c, v).best()));
        let skip_v = max_or_zero(v_children.iter().map(|&d| matrix.cell(u, d).best()));
        skip_u.max(skip_v) - self.dist_penalty
    }

    #[allow(clippy::too_many_arguments)]
    fn matched(
        &self,
        matrix: &ScoreMatrix,
        t1: &LayoutTree,
        u: NodeId,
        u_children: &[NodeId],
        t2: &LayoutTree,
        v: NodeId,
        v_children: &[NodeId],
    ) -> f64 {
        let reward = self.affinity.reward(t1.kind(u), t2.kind(v));
        if u_children.is_empty() || v_children.is_empty() {
            return reward;
        }

        let weights = Array2::from_shape_fn((u_children.len(), v_children.len()), |(i, j)| {
            matrix.cell(u_children[i], v_children[j]).best()
        });
        let child_match = max_weight_matching(weights.view()).total;
        let arity_gap = u_children.len().abs_diff(v_children.len()) as f64;

        reward + child_match - arity_gap * self.child_mismatch_penalty
    }
}

/// Maximum of the values, 0 for none: a leaf side still takes part in the max
fn max_or_zero(values: impl Iterator<Item = f64>) -> f64 {
    values.reduce(f64::max).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{optimize, parse_sequence, ROOT};
    use crate::layout::WidgetKind;
    use crate::utils::random_sequence;
    use proptest::prelude::*;

    fn tree(sequence: &str) -> LayoutTree {
        parse_sequence(sequence).unwrap()
    }

    fn score_with(config: &ScoringConfig, a: &str, b: &str) -> f64 {
        TreeScorer::new(config).score(&tree(a), &tree(b))
    }

    fn score(a: &str, b: &str) -> f64 {
        score_with(&ScoringConfig::default(), a, b)
    }

    #[test]
    fn test_single_leaf() {
        assert_eq!(score("Button", "Button"), 10.0);
        assert_eq!(score("Button", "TextView"), 0.0);
        assert_eq!(score("TextView", "TextLink"), 5.0);
    }

    #[test]
    fn test_self_score_of_flat_layout() {
        // Layout (1) + Button (10) + TextView (10)
        assert_eq!(score("Layout { Button TextView }", "Layout { Button TextView }"), 21.0);
    }

    #[test]
    fn test_children_order_does_not_matter() {
        let own = score("Layout { Button TextView }", "Layout { Button TextView }");
        let swapped = score("Layout { Button TextView }", "Layout { TextView Button }");
        assert_eq!(own, swapped);
    }

    #[test]
    fn test_arity_mismatch_lowers_score() {
        let own = score("Layout { Button }", "Layout { Button }");
        let other = score("Layout { Button }", "Layout { Button Button }");
        assert_eq!(own, 11.0);
        assert!(other < own, "{} should be below {}", other, own);
    }

    #[test]
    fn test_skip_penalty_reaches_deeper_match() {
        // Pairing the outer layouts costs one skip on the right-hand side.
        let a = "Layout { Button Switch }";
        let b = "Layout { Layout { Button Switch } ImageView }";
        let matrix = TreeScorer::new(&ScoringConfig::default()).score_matrix(&tree(a), &tree(b));
        assert_eq!(matrix.cell(1, 2).matched, 21.0);
        assert_eq!(matrix.cell(1, 1).unmatched, 16.0);
        assert_eq!(matrix.score(), 21.0);
    }

    #[test]
    fn test_empty_trees_score_zero() {
        assert_eq!(score("", "Layout { Button }"), 0.0);
        assert_eq!(score("Layout { Button }", ""), 0.0);
        assert_eq!(score("", ""), 0.0);

        let mut pruned = tree("Layout { Unclassified }");
        optimize(&mut pruned);
        let config = ScoringConfig::default();
        assert_eq!(TreeScorer::new(&config).score(&pruned, &tree("Button")), 0.0);
    }

    #[test]
    fn test_best_pair_reported() {
        let config = ScoringConfig::default();
        let matrix = TreeScorer::new(&config).score_matrix(&tree("Button"), &tree("Layout { Button Button }"));
        let (u, v, best) = matrix.best_pair().unwrap();
        assert_eq!(best, 10.0);
        assert_eq!(u, 1);
        assert!(v == 2 || v == 3 || v == ROOT);
        assert_eq!(matrix.dim(), (2, 4));
    }

    #[test]
    fn test_perturbations_score_below_self() {
        let base = "Layout { Toolbar Layout { ImageView TextView } Layout { EditText Button } }";
        let own = score(base, base);
        for perturbed in [
            "Layout { Toolbar Layout { ImageView TextView } Layout { EditText } }",
            "Layout { Toolbar Layout { ImageView TextLink } Layout { EditText Button } }",
            "Layout { Layout { ImageView TextView } Layout { EditText Button } }",
            "Layout { Toolbar Layout { ImageView TextView } Layout { EditText Button CheckBox } }",
        ] {
            assert!(score(base, perturbed) < own, "{}", perturbed);
        }
    }

    #[test]
    fn test_larger_penalties_never_raise_score() {
        let a = "Layout { Layout { Button Button } TextView Layout { ImageView } }";
        let b = "Layout { Button Layout { TextView ImageView EditText } }";
        let base = ScoringConfig::default();
        let harsh = ScoringConfig {
            dist_penalty: 20.0,
            child_mismatch_penalty: 20.0,
            ..ScoringConfig::default()
        };
        assert!(score_with(&harsh, a, b) <= score_with(&base, a, b));
    }

    #[test]
    fn test_layout_kind_reward_used() {
        let config = ScoringConfig::default();
        let scorer = TreeScorer::new(&config);
        let t = tree("List { Button Button }");
        assert_eq!(t.kind(1), WidgetKind::List);
        assert_eq!(scorer.self_score(&t), 21.0);
    }

    proptest! {
        #[test]
        fn prop_symmetric(seed_a in any::<u64>(), seed_b in any::<u64>(), size in 0usize..25) {
            let a = random_sequence(size, seed_a);
            let b = random_sequence(size + 3, seed_b);
            let ab = score(&a, &b);
            let ba = score(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
        }

        #[test]
        fn prop_non_negative(seed_a in any::<u64>(), seed_b in any::<u64>(), size in 0usize..25) {
            prop_assert!(score(&random_sequence(size, seed_a), &random_sequence(size, seed_b)) >= 0.0);
        }

        #[test]
        fn prop_penalties_monotone(
            seed_a in any::<u64>(),
            seed_b in any::<u64>(),
            dist in 0.0f64..10.0,
            child in 0.0f64..10.0,
            extra in 0.0f64..10.0,
        ) {
            let a = random_sequence(15, seed_a);
            let b = random_sequence(15, seed_b);
            let low = ScoringConfig { dist_penalty: dist, child_mismatch_penalty: child, ..ScoringConfig::default() };
            let high_dist = ScoringConfig { dist_penalty: dist + extra, ..low.clone() };
            let high_child = ScoringConfig { child_mismatch_penalty: child + extra, ..low.clone() };
            let base = score_with(&low, &a, &b);
            prop_assert!(score_with(&high_dist, &a, &b) <= base + 1e-9);
            prop_assert!(score_with(&high_child, &a, &b) <= base + 1e-9);
        }
    }
}
