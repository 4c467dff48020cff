//! Scoring configuration: penalties, affinity table and normalization

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::layout::WidgetKind;
use crate::similarity::{AffinityMatrix, Normalization};
use crate::utils::{load_json, save_json};
use crate::{LayoutMatchError, Result};

/// Tunable parameters of the similarity pipeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Pairing rewards between widget kinds
    pub affinity: AffinityMatrix,
    /// Cost of skipping one level down on either side
    pub dist_penalty: f64,
    /// Cost per child of difference in arity between paired nodes
    pub child_mismatch_penalty: f64,
    /// Raw score to similarity conversion
    pub normalization: Normalization,
    /// Weight of the list-item template score relative to the main layout
    pub item_weight: f64,
    /// Candidates with more live nodes are skipped
    pub max_candidate_nodes: usize,
    /// Compress/prune rounds; `None` iterates to a fixpoint
    pub optimize_rounds: Option<usize>,
}

impl ScoringConfig {
    /// Uniform rewards (10 on every visible diagonal), skip penalty 1, no arity penalty
    pub fn legacy_uniform() -> Self {
        let mut affinity = AffinityMatrix::diagonal(10.0);
        affinity.set(WidgetKind::Unclassified, WidgetKind::Unclassified, 0.0);
        ScoringConfig {
            affinity,
            dist_penalty: 1.0,
            child_mismatch_penalty: 0.0,
            normalization: Normalization::SelfRatio,
            item_weight: 0.0,
            max_candidate_nodes: 200,
            optimize_rounds: Some(3),
        }
    }

    /// Load and validate a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: ScoringConfig = load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config as pretty JSON
    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.affinity.validate()?;

        for (name, value) in [
            ("dist_penalty", self.dist_penalty),
            ("child_mismatch_penalty", self.child_mismatch_penalty),
            ("item_weight", self.item_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutMatchError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        if self.max_candidate_nodes == 0 {
            return Err(LayoutMatchError::InvalidConfig(
                "max_candidate_nodes must be positive".to_string(),
            ));
        }

        if self.optimize_rounds == Some(0) {
            return Err(LayoutMatchError::InvalidConfig(
                "optimize_rounds must be positive or null".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            affinity: AffinityMatrix::default(),
            dist_penalty: 5.0,
            child_mismatch_penalty: 5.0,
            normalization: Normalization::default(),
            item_weight: 1.5,
            max_candidate_nodes: 200,
            optimize_rounds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = ScoringConfig::default();
        assert!(config.validate().is_ok());

        config.dist_penalty = -1.0;
        assert!(config.validate().is_err());

        config.dist_penalty = 5.0;
        config.child_mismatch_penalty = f64::NAN;
        assert!(config.validate().is_err());

        config.child_mismatch_penalty = 5.0;
        config.max_candidate_nodes = 0;
        assert!(config.validate().is_err());

        config.max_candidate_nodes = 10;
        config.optimize_rounds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_predefined_configs() {
        assert!(ScoringConfig::default().validate().is_ok());
        let legacy = ScoringConfig::legacy_uniform();
        assert!(legacy.validate().is_ok());
        assert_eq!(legacy.affinity.reward(WidgetKind::Layout, WidgetKind::Layout), 10.0);
        assert_eq!(legacy.optimize_rounds, Some(3));
    }

    #[test]
    fn test_json_round_trip() {
        let path = std::env::temp_dir().join("layout_match_config_test.json");
        let mut config = ScoringConfig::default();
        config.dist_penalty = 2.5;
        config.normalization = Normalization::SquaredOverMean;

        config.save_json_file(&path).unwrap();
        let loaded = ScoringConfig::from_json_file(&path).unwrap();
        assert_eq!(config, loaded);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScoringConfig = serde_json::from_str(r#"{ "dist_penalty": 1.0 }"#).unwrap();
        assert_eq!(config.dist_penalty, 1.0);
        assert_eq!(config.child_mismatch_penalty, 5.0);
        assert_eq!(config.affinity, AffinityMatrix::default());
    }
}
