/// Score awarded per number of rows cleared by a single piece.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Cumulative per-game statistics, updated once per locked piece.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStats {
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    score: usize,
}

impl GameStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one locked piece that cleared `cleared_lines` rows.
    ///
    /// # Panics
    ///
    /// Panics if `cleared_lines` exceeds 4, the most a single piece can clear.
    pub fn record_lock(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        self.line_cleared_counter[cleared_lines] += 1;
        self.score += SCORE_TABLE[cleared_lines];
    }

    #[must_use]
    pub fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// How many locks cleared 0, 1, 2, 3 and 4 rows, respectively.
    #[must_use]
    pub fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }
}
