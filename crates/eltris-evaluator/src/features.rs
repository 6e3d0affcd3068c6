use eltris_engine::Board;

pub const FEATURE_COUNT: usize = 6;

/// The six raw board features, measured on a hypothetical resting placement.
///
/// The board must carry a resting piece whose footprint has been marked with
/// [`Board::preview_merge`]; preview and solid cells both count as filled, the
/// piece tag is ignored. Scoring happens before rows are cleared, so a
/// completed row still contributes to transitions and heights while also
/// raising `eliminated_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    /// Height of the piece's vertical midpoint above the bottom of the grid.
    /// High placements are risky; the reference weighting penalizes them.
    pub landing_height: i32,
    /// Number of completed rows in the previewed grid.
    pub eliminated_rows: u32,
    /// Horizontal occupancy changes summed over all rows, with both side
    /// walls treated as filled. Fragmented rows are hard to clear.
    pub row_transitions: u32,
    /// Vertical occupancy changes summed over all columns, with the cells
    /// just above and below the grid treated as filled.
    pub column_transitions: u32,
    /// Empty cells strictly below the topmost filled cell of their column.
    pub holes: u32,
    /// Per column, each maximal empty run whose top cell is walled in on both
    /// sides contributes `n * (n + 1) / 2` for run length `n`. Deep narrow
    /// wells can only be filled by a vertical I.
    pub well_sums: u32,
}

impl FeatureSet {
    /// Measures all six features.
    ///
    /// # Panics
    ///
    /// Panics if the board has no falling piece; the landing height is
    /// derived from its position.
    #[must_use]
    #[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn measure(board: &Board) -> Self {
        let (_, top, piece) = board
            .dangling_piece()
            .expect("feature measurement requires a resting piece");

        let filled: Vec<Vec<bool>> = board
            .grid()
            .map(|row| row.iter().map(|cell| cell.is_occupied()).collect())
            .collect();

        Self {
            landing_height: board.rows() as i32 - top + (piece.height() / 2) as i32,
            eliminated_rows: eliminated_rows(&filled),
            row_transitions: row_transitions(&filled),
            column_transitions: column_transitions(&filled),
            holes: holes(&filled),
            well_sums: well_sums(&filled),
        }
    }

    /// Feature values in weight order, for dot products.
    #[must_use]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.landing_height),
            f64::from(self.eliminated_rows),
            f64::from(self.row_transitions),
            f64::from(self.column_transitions),
            f64::from(self.holes),
            f64::from(self.well_sums),
        ]
    }
}

#[expect(clippy::cast_possible_truncation)]
fn eliminated_rows(filled: &[Vec<bool>]) -> u32 {
    filled.iter().filter(|row| row.iter().all(|&c| c)).count() as u32
}

fn row_transitions(filled: &[Vec<bool>]) -> u32 {
    let mut transitions = 0;
    for row in filled {
        let mut prev = true; // left wall
        for &occupied in row {
            if occupied != prev {
                transitions += 1;
            }
            prev = occupied;
        }
        if !prev {
            transitions += 1; // right wall
        }
    }
    transitions
}

fn column_transitions(filled: &[Vec<bool>]) -> u32 {
    let columns = filled[0].len();
    let mut transitions = 0;
    for x in 0..columns {
        let mut prev = true; // above the grid
        for row in filled {
            if row[x] != prev {
                transitions += 1;
            }
            prev = row[x];
        }
        if !prev {
            transitions += 1; // floor
        }
    }
    transitions
}

fn holes(filled: &[Vec<bool>]) -> u32 {
    let columns = filled[0].len();
    let mut holes = 0;
    for x in 0..columns {
        let mut covered = false;
        for row in filled {
            if row[x] {
                covered = true;
            } else if covered {
                holes += 1;
            }
        }
    }
    holes
}

#[expect(clippy::cast_possible_truncation)]
fn well_sums(filled: &[Vec<bool>]) -> u32 {
    let columns = filled[0].len();
    let rows = filled.len();
    let mut sum = 0;
    for x in 0..columns {
        let mut y = 0;
        while y < rows {
            if filled[y][x] {
                y += 1;
                continue;
            }
            let start = y;
            while y < rows && !filled[y][x] {
                y += 1;
            }
            let walled = (x == 0 || filled[start][x - 1])
                && (x + 1 == columns || filled[start][x + 1]);
            if walled {
                let n = (y - start) as u32;
                sum += n * (n + 1) / 2;
            }
        }
    }
    sum
}
