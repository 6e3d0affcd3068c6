use arrayvec::ArrayVec;
use eltris_engine::{Board, PIECE_SIDE, Piece, SPAWN_TOP};
use eltris_evaluator::PlacementEvaluator;

/// One scored candidate: a rotation of the falling piece dropped from a
/// bounding-box column. `column` may be negative when the piece's occupied
/// cells sit to the right of its box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementDecision {
    pub rotation: usize,
    pub column: i32,
    pub score: f64,
}

/// Exhaustive one-piece placement search.
///
/// Every rotation variant of the current falling piece is tried at every
/// horizontal origin. Each legal candidate is respawned above the grid,
/// hard-dropped, previewed and scored, then undone; the caller's piece is
/// reinstated afterwards, so the search leaves the board exactly as it
/// found it.
#[derive(Debug, Clone, Copy)]
pub struct PlacementSearch {
    evaluator: PlacementEvaluator,
}

impl PlacementSearch {
    #[must_use]
    pub const fn new(evaluator: PlacementEvaluator) -> Self {
        Self { evaluator }
    }

    /// Search driven by the published El Tetris weights.
    #[must_use]
    pub const fn el_tetris() -> Self {
        Self::new(PlacementEvaluator::el_tetris())
    }

    /// Scores every legal placement of the falling piece, in rotation-major,
    /// left-to-right order.
    ///
    /// # Panics
    ///
    /// Panics if the board has no falling piece.
    #[expect(clippy::cast_possible_truncation)]
    pub fn evaluate_all(&self, board: &mut Board) -> Vec<PlacementDecision> {
        let (saved_left, saved_top, piece) = board
            .dangling_piece()
            .expect("placement search requires a falling piece");

        let variants: ArrayVec<Piece, PIECE_SIDE> = (0..piece.rotation_count())
            .map(|rotation| piece.with_rotation(rotation))
            .collect();

        let leftmost = -(PIECE_SIDE as i32 - 1);
        let rightmost = board.columns() as i32 - 1;

        let mut decisions = Vec::new();
        for variant in variants {
            for column in leftmost..=rightmost {
                if board.place_dangling(column, SPAWN_TOP, variant).is_err() {
                    continue;
                }
                while board.move_down() {}
                board.preview_merge();
                let score = self.evaluator.score(board);
                board.clear_preview();
                decisions.push(PlacementDecision {
                    rotation: variant.rotation(),
                    column,
                    score,
                });
            }
        }

        // The falling piece was consumed by the exploration; put it back.
        board
            .place_dangling(saved_left, saved_top, piece)
            .expect("saved placement must still be legal");
        decisions
    }

    /// Picks the highest-scoring placement and commits it: the falling piece
    /// takes the winning rotation and column at the spawn row, ready to be
    /// hard-dropped by the caller.
    ///
    /// Ties keep the first candidate found. Returns `None`, leaving the
    /// board untouched, when no placement is legal.
    ///
    /// # Panics
    ///
    /// Panics if the board has no falling piece.
    pub fn choose(&self, board: &mut Board) -> Option<PlacementDecision> {
        let piece = board
            .dangling_piece()
            .expect("placement search requires a falling piece")
            .2;

        let mut best: Option<PlacementDecision> = None;
        for decision in self.evaluate_all(board) {
            if best.is_none_or(|b| decision.score > b.score) {
                best = Some(decision);
            }
        }

        let decision = best?;
        board
            .place_dangling(
                decision.column,
                SPAWN_TOP,
                piece.with_rotation(decision.rotation),
            )
            .expect("winning placement must be legal");
        Some(decision)
    }
}
