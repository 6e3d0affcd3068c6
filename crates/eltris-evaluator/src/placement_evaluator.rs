use std::iter;

use eltris_engine::Board;

use crate::{FeatureSet, Weights};

/// Scores a previewed resting placement as the dot product of its feature
/// values and a weight vector. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementEvaluator {
    weights: Weights,
}

impl PlacementEvaluator {
    #[must_use]
    pub const fn new(weights: Weights) -> Self {
        Self { weights }
    }

    /// Evaluator with the published El Tetris weights.
    #[must_use]
    pub const fn el_tetris() -> Self {
        Self::new(Weights::EL_TETRIS)
    }

    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Measures the board and applies the weights.
    ///
    /// # Panics
    ///
    /// Panics if the board has no falling piece.
    #[must_use]
    pub fn score(&self, board: &Board) -> f64 {
        let features = FeatureSet::measure(board);
        iter::zip(features.to_array(), self.weights.to_array())
            .map(|(f, w)| f * w)
            .sum()
    }
}
