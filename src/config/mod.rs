//! Configuration of the scoring pipeline

mod scoring_config;

pub use scoring_config::ScoringConfig;
