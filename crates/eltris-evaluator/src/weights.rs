use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;

/// Linear weights applied to the six features. Negative weights penalize,
/// positive weights reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub landing_height: f64,
    pub eliminated_rows: f64,
    pub row_transitions: f64,
    pub column_transitions: f64,
    pub holes: f64,
    pub well_sums: f64,
}

impl Weights {
    /// The published El Tetris weight vector, obtained by particle swarm
    /// optimization over two-piece lookahead play.
    pub const EL_TETRIS: Self = Self {
        landing_height: -4.500_158_825_082_766,
        eliminated_rows: 3.418_126_810_139_269_4,
        row_transitions: -3.217_888_286_848_775_3,
        column_transitions: -9.348_695_305_445_199,
        holes: -7.899_265_427_351_652,
        well_sums: -3.385_597_224_726_362_6,
    };

    /// Weight values in feature order, for dot products.
    #[must_use]
    pub const fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.landing_height,
            self.eliminated_rows,
            self.row_transitions,
            self.column_transitions,
            self.holes,
            self.well_sums,
        ]
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::EL_TETRIS
    }
}
