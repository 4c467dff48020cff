//! Corpus loading and ranking of candidate layouts against a query

mod corpus;
mod ranker;

pub use corpus::{Candidate, CandidateId, Corpus, CorpusEntry, EntryKind};
pub use ranker::{CancellationToken, ProgressFn, RankedCandidate, Ranker, Ranking, SkipReason};
