//! Tree similarity: affinity rewards, child matching and the scoring dynamic program

mod affinity;
mod matching;
mod scorer;
mod layout_score;

pub use affinity::AffinityMatrix;
pub use matching::{max_weight_matching, Matching};
pub use scorer::{ScoreCell, ScoreMatrix, TreeScorer};
pub use layout_score::{LayoutParts, LayoutScorer, Normalization, PreparedLayout};
