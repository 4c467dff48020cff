//! Ranks a corpus of candidate layouts against a query layout

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use super::corpus::{Candidate, CandidateId, Corpus};
use crate::similarity::{LayoutScorer, PreparedLayout};
use crate::LayoutMatchError;

/// Shared flag a caller can set to stop a ranking between candidates
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A scored candidate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Candidate identity
    pub id: CandidateId,
    /// Normalized similarity
    pub score: f64,
    /// Weighted raw score before normalization
    pub raw: f64,
}

/// Why a candidate produced no score
#[derive(Debug)]
pub enum SkipReason {
    /// More live nodes than the configured ceiling
    Oversized {
        /// Live nodes after optimization
        nodes: usize,
        /// Configured ceiling
        limit: usize,
    },
    /// Parsing the candidate failed
    Failed(LayoutMatchError),
}

/// Outcome of ranking one corpus
#[derive(Debug, Default)]
pub struct Ranking {
    /// Scored candidates, best first; ties keep corpus order
    pub ranked: Vec<RankedCandidate>,
    /// Candidates filtered out or failed
    pub skipped: Vec<(CandidateId, SkipReason)>,
    /// Set when the run stopped early on cancellation
    pub cancelled: bool,
}

impl Ranking {
    /// The `n` best candidates
    pub fn top(&self, n: usize) -> &[RankedCandidate] {
        &self.ranked[..n.min(self.ranked.len())]
    }
}

enum Outcome {
    Scored(RankedCandidate),
    Skipped(CandidateId, SkipReason),
    Cancelled,
}

/// Called once per evaluated candidate, from the worker that evaluated it
pub type ProgressFn<'a> = &'a (dyn Fn(&CandidateId) + Sync);

/// Scores every candidate of a corpus against one query
pub struct Ranker<'a> {
    scorer: &'a LayoutScorer,
    parallel: bool,
    cancellation: Option<CancellationToken>,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Ranker<'a> {
    /// Create a ranker; parallel by default
    pub fn new(scorer: &'a LayoutScorer) -> Self {
        Ranker {
            scorer,
            parallel: true,
            cancellation: None,
            progress: None,
        }
    }

    /// Toggle rayon parallelism
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Stop early once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Report each evaluated candidate to `progress`
    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Rank all corpus candidates against `query`
    pub fn rank(&self, query: &PreparedLayout, corpus: &Corpus) -> Ranking {
        let start = Instant::now();
        let candidates = corpus.candidates();

        let outcomes: Vec<Outcome> = if self.parallel {
            candidates
                .par_iter()
                .map(|candidate| self.evaluate(query, candidate))
                .collect()
        } else {
            candidates
                .iter()
                .map(|candidate| self.evaluate(query, candidate))
                .collect()
        };

        let mut ranking = Ranking::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Scored(ranked) => ranking.ranked.push(ranked),
                Outcome::Skipped(id, reason) => ranking.skipped.push((id, reason)),
                Outcome::Cancelled => ranking.cancelled = true,
            }
        }
        // Stable: equal scores keep corpus order.
        ranking.ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        info!(
            "ranked {} candidates, skipped {}{} in {:.3}s",
            ranking.ranked.len(),
            ranking.skipped.len(),
            if ranking.cancelled { " (cancelled)" } else { "" },
            start.elapsed().as_secs_f32()
        );
        ranking
    }

    /// Rank in-memory `(id, sequence)` pairs
    pub fn rank_sequences(&self, query: &PreparedLayout, candidates: &[(CandidateId, String)]) -> Ranking {
        let mut corpus = Corpus::new();
        for (id, sequence) in candidates {
            corpus.push_layout(id.clone(), sequence);
        }
        self.rank(query, &corpus)
    }

    fn evaluate(&self, query: &PreparedLayout, candidate: &Candidate) -> Outcome {
        if self.cancellation.as_ref().map_or(false, CancellationToken::is_cancelled) {
            return Outcome::Cancelled;
        }
        let outcome = self.score_candidate(query, candidate);
        if let Some(progress) = self.progress {
            progress(&candidate.id);
        }
        outcome
    }

    fn score_candidate(&self, query: &PreparedLayout, candidate: &Candidate) -> Outcome {
        let layout = candidate.layout.as_deref().unwrap_or("");
        let parts = match self.scorer.parse_parts(layout, candidate.item.as_deref()) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("candidate {} failed: {}", candidate.id, e);
                return Outcome::Skipped(candidate.id.clone(), SkipReason::Failed(e));
            }
        };

        // Checked before the self-score, which is as costly as a comparison.
        let limit = self.scorer.config().max_candidate_nodes;
        let nodes = parts.node_count();
        if nodes > limit {
            debug!("candidate {} skipped: {} nodes > {}", candidate.id, nodes, limit);
            return Outcome::Skipped(candidate.id.clone(), SkipReason::Oversized { nodes, limit });
        }

        let prepared = self.scorer.assemble(parts.main, parts.item);
        let raw = self.scorer.raw_score(query, &prepared);
        let score = self
            .scorer
            .config()
            .normalization
            .apply(raw, query.self_score(), prepared.self_score());
        Outcome::Scored(RankedCandidate {
            id: candidate.id.clone(),
            score,
            raw,
        })
    }
}
