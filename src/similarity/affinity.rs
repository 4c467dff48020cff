//! Match rewards between widget kinds

use ndarray::Array2;
use once_cell::sync::Lazy;
use serde::{Serialize, Deserialize};

use crate::layout::WidgetKind;
use crate::{LayoutMatchError, Result};

/// Default reward table shared by every `AffinityMatrix::default()`
static DEFAULT_AFFINITY: Lazy<AffinityMatrix> = Lazy::new(|| {
    use WidgetKind::*;

    let mut matrix = AffinityMatrix::diagonal(10.0);
    matrix.set(Layout, Layout, 1.0);
    matrix.set(List, List, 1.0);
    matrix.set(Unclassified, Unclassified, 0.0);

    matrix.set(TextView, TextLink, 5.0);
    matrix.set(ImageView, ImageLink, 5.0);
    matrix.set(Button, ImageLink, 5.0);
    matrix.set(CheckBox, Switch, 5.0);
    matrix.set(CheckBox, RadioButton, 5.0);
    matrix
});

/// Square `WidgetKind x WidgetKind` table of pairing rewards
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffinityMatrix {
    rewards: Array2<f64>,
}

impl AffinityMatrix {
    /// All-zero table
    pub fn zeros() -> Self {
        AffinityMatrix {
            rewards: Array2::zeros((WidgetKind::COUNT, WidgetKind::COUNT)),
        }
    }

    /// Same reward on the diagonal, zero elsewhere
    pub fn diagonal(reward: f64) -> Self {
        let mut matrix = Self::zeros();
        for kind in WidgetKind::ALL {
            matrix.rewards[[kind.index(), kind.index()]] = reward;
        }
        matrix
    }

    /// Build from a full table given in `WidgetKind::ALL` order
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = WidgetKind::COUNT;
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            return Err(LayoutMatchError::InvalidConfig(format!(
                "affinity matrix must be {}x{}",
                n, n
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let rewards = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| LayoutMatchError::InvalidConfig(e.to_string()))?;
        let matrix = AffinityMatrix { rewards };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Reward for pairing `a` with `b`
    pub fn reward(&self, a: WidgetKind, b: WidgetKind) -> f64 {
        self.rewards[[a.index(), b.index()]]
    }

    /// Set a reward on both `(a, b)` and `(b, a)`
    pub fn set(&mut self, a: WidgetKind, b: WidgetKind, reward: f64) -> &mut Self {
        self.rewards[[a.index(), b.index()]] = reward;
        self.rewards[[b.index(), a.index()]] = reward;
        self
    }

    /// Check shape, symmetry and sign
    pub fn validate(&self) -> Result<()> {
        let n = WidgetKind::COUNT;
        if self.rewards.dim() != (n, n) {
            return Err(LayoutMatchError::InvalidConfig(format!(
                "affinity matrix must be {}x{}, got {:?}",
                n,
                n,
                self.rewards.dim()
            )));
        }
        for a in WidgetKind::ALL {
            for b in WidgetKind::ALL {
                let reward = self.reward(a, b);
                if !reward.is_finite() || reward < 0.0 {
                    return Err(LayoutMatchError::InvalidConfig(format!(
                        "affinity {}/{} must be finite and non-negative, got {}",
                        a, b, reward
                    )));
                }
                if reward != self.reward(b, a) {
                    return Err(LayoutMatchError::InvalidConfig(format!(
                        "affinity matrix is not symmetric at {}/{}",
                        a, b
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for AffinityMatrix {
    fn default() -> Self {
        DEFAULT_AFFINITY.clone()
    }
}
