use super::piece::{PIECE_SIDE, Piece, PieceKind};

/// One grid position.
///
/// The identity tag of the occupying piece is folded into the variant, so a
/// `Solid` cell always remembers which piece kind landed there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// No piece.
    #[default]
    Empty,
    /// Falling piece's footprint, marked transiently for scoring or display.
    Preview(PieceKind),
    /// Permanently landed cell.
    Solid(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Preview(kind) | Cell::Solid(kind) => Some(kind),
        }
    }
}

/// Why a placement was rejected.
///
/// These are ordinary game outcomes, not failures: per-cell checks run in mask
/// scan order (x outer, y inner) and the first violation found is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum Conflict {
    #[display("target cell already occupied")]
    Occupied,
    #[display("piece crosses the left bound")]
    OutOfLeftBound,
    #[display("piece crosses the right bound")]
    OutOfRightBound,
    #[display("piece crosses the bottom bound")]
    OutOfBottomBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dangling {
    piece: Piece,
    left: i32,
    top: i32,
}

/// The grid state machine: occupancy grid, collision testing, falling-piece
/// tracking, merge and row clearing.
///
/// Coordinates have their origin at the top-left with y increasing downward.
/// The falling ("dangling") piece is addressed by the `(left, top)` corner of
/// its bounding box; `top` may be negative while the piece is still entering
/// the grid from above. Dimensions are fixed at construction.
///
/// Operations that require a falling piece (`move_*`, `rotate`, `merge`,
/// `preview_merge`) panic when none is present — that is a controller bug, not
/// a game condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
    dangling: Option<Dangling>,
    full: bool,
}

impl Board {
    /// Creates an empty `columns × rows` board.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(columns: usize, rows: usize) -> Self {
        assert!(columns > 0 && rows > 0);
        Self {
            columns,
            rows,
            cells: vec![Cell::Empty; columns * rows],
            dangling: None,
            full: false,
        }
    }

    /// Builds a board from ASCII rows: `#` is a solid cell, `.` is empty.
    ///
    /// Leading/trailing blank lines and indentation are ignored. Solid cells
    /// are tagged as I-pieces; fixtures do not track real piece identities.
    #[must_use]
    pub fn from_ascii(text: &str) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(!lines.is_empty());
        let columns = lines[0].len();
        let mut board = Self::new(columns, lines.len());
        for (y, line) in lines.iter().enumerate() {
            assert_eq!(line.len(), columns, "ragged row {y}");
            for (x, c) in line.chars().enumerate() {
                board.cells[y * columns + x] = match c {
                    '#' => Cell::Solid(PieceKind::I),
                    '.' => Cell::Empty,
                    _ => panic!("unexpected cell character {c:?}"),
                };
            }
        }
        board
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        assert!(x < self.columns && y < self.rows);
        self.cells[y * self.columns + x]
    }

    /// Read-only snapshot of the grid, row by row from the top.
    pub fn grid(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.columns)
    }

    /// Set when a merge left filled cells above row 0 (the piece could not
    /// fully enter the grid). Terminal for the simulation; only reset by
    /// reconstruction or by a clear that lets the piece slide fully in.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Current falling piece and its bounding-box origin, if any.
    #[must_use]
    pub fn dangling_piece(&self) -> Option<(i32, i32, Piece)> {
        self.dangling.map(|d| (d.left, d.top, d.piece))
    }

    /// Pure bounds/collision check for `piece` with its bounding box at
    /// `(left, top)`. Never mutates state.
    ///
    /// Rows above the grid (`top + y < 0`) are legal — a spawning piece may be
    /// partially off-screen — so only in-grid cells are tested for occupancy.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn test_placement(&self, left: i32, top: i32, piece: &Piece) -> Option<Conflict> {
        let mask = piece.mask();
        for x in 0..PIECE_SIDE {
            for y in 0..PIECE_SIDE {
                if !mask[y][x] {
                    continue;
                }
                let gx = left + x as i32;
                let gy = top + y as i32;
                if gx < 0 {
                    return Some(Conflict::OutOfLeftBound);
                }
                if gx >= self.columns as i32 {
                    return Some(Conflict::OutOfRightBound);
                }
                if gy >= self.rows as i32 {
                    return Some(Conflict::OutOfBottomBound);
                }
                if gy >= 0 && self.cells[gy as usize * self.columns + gx as usize].is_occupied() {
                    return Some(Conflict::Occupied);
                }
            }
        }
        None
    }

    /// Registers `piece` as the falling piece at `(left, top)`.
    ///
    /// On any conflict the board is left unchanged; an already-present falling
    /// piece is replaced on success (spawn-time replacement by the caller).
    pub fn place_dangling(&mut self, left: i32, top: i32, piece: Piece) -> Result<(), Conflict> {
        if let Some(conflict) = self.test_placement(left, top, &piece) {
            return Err(conflict);
        }
        self.dangling = Some(Dangling { piece, left, top });
        Ok(())
    }

    fn shift_dangling(&mut self, dx: i32, dy: i32) -> bool {
        let d = self.dangling.expect("no falling piece on the board");
        if self
            .test_placement(d.left + dx, d.top + dy, &d.piece)
            .is_some()
        {
            return false;
        }
        self.dangling = Some(Dangling {
            left: d.left + dx,
            top: d.top + dy,
            ..d
        });
        true
    }

    /// Attempts to shift the falling piece one column left.
    pub fn move_left(&mut self) -> bool {
        self.shift_dangling(-1, 0)
    }

    /// Attempts to shift the falling piece one column right.
    pub fn move_right(&mut self) -> bool {
        self.shift_dangling(1, 0)
    }

    /// Attempts to shift the falling piece one row down.
    ///
    /// Also the hard-drop primitive: callers loop on it until it fails.
    pub fn move_down(&mut self) -> bool {
        self.shift_dangling(0, 1)
    }

    /// Advances the falling piece's rotation if the rotated mask is legal at
    /// the unchanged origin; otherwise leaves the piece as it was.
    pub fn rotate(&mut self) -> bool {
        let d = self.dangling.expect("no falling piece on the board");
        let rotated = d.piece.rotated_next();
        if self.test_placement(d.left, d.top, &rotated).is_some() {
            return false;
        }
        self.dangling = Some(Dangling {
            piece: rotated,
            ..d
        });
        true
    }

    /// Solidifies the falling piece into the grid and clears full rows.
    ///
    /// Cells still above row 0 are not merged; they set the board-full flag
    /// instead. If the clear shifted the piece's remaining above-grid rows to
    /// a strictly positive top, those rows are merged after the fact and the
    /// flag is reset. The falling piece is always consumed.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Panics
    ///
    /// Panics if there is no falling piece or its placement is not legal.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn merge(&mut self) -> usize {
        let d = self.dangling.take().expect("no falling piece on the board");
        assert!(
            self.test_placement(d.left, d.top, &d.piece).is_none(),
            "merge with an illegal placement"
        );

        let solid = Cell::Solid(d.piece.kind());
        for (x, y) in d.piece.occupied_cells() {
            let gy = d.top + y as i32;
            if gy < 0 {
                self.full = true;
            } else {
                let gx = (d.left + x as i32) as usize;
                self.cells[gy as usize * self.columns + gx] = solid;
            }
        }

        let cleared = self.clear_full_rows();
        if cleared > 0 && d.top < 0 {
            let top = d.top + cleared as i32;
            if top > 0 {
                self.full = false;
                let mask = d.piece.mask();
                for y in 0..cleared.min(PIECE_SIDE) {
                    for x in 0..PIECE_SIDE {
                        let gy = top as usize + y;
                        if mask[y][x] && gy < self.rows {
                            let gx = (d.left + x as i32) as usize;
                            self.cells[gy * self.columns + gx] = solid;
                        }
                    }
                }
            }
        }

        cleared
    }

    /// Marks the falling piece's in-grid footprint as `Preview` cells, so the
    /// hypothetical post-merge grid can be inspected without committing it.
    /// Must be paired with [`clear_preview`](Self::clear_preview).
    ///
    /// # Panics
    ///
    /// Panics if there is no falling piece.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn preview_merge(&mut self) {
        let d = self.dangling.expect("no falling piece on the board");
        for (x, y) in d.piece.occupied_cells() {
            let gy = d.top + y as i32;
            if gy >= 0 {
                let gx = (d.left + x as i32) as usize;
                self.cells[gy as usize * self.columns + gx] = Cell::Preview(d.piece.kind());
            }
        }
    }

    /// Reverts every `Preview` cell back to `Empty`.
    pub fn clear_preview(&mut self) {
        for cell in &mut self.cells {
            if matches!(cell, Cell::Preview(_)) {
                *cell = Cell::Empty;
            }
        }
    }

    /// Compacts the grid: scanning bottom-up, full rows are dropped and the
    /// remaining rows gravitate to the bottom in their original order; freed
    /// rows reappear empty at the top. Returns the number of full rows.
    fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        for y in (0..self.rows).rev() {
            let start = y * self.columns;
            let is_full = self.cells[start..start + self.columns]
                .iter()
                .all(|cell| cell.is_occupied());
            if is_full {
                cleared += 1;
                continue;
            }
            if cleared > 0 {
                self.cells
                    .copy_within(start..start + self.columns, (y + cleared) * self.columns);
            }
        }
        self.cells[..cleared * self.columns].fill(Cell::Empty);
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[expect(clippy::cast_possible_truncation)]
    const SPAWN_TOP: i32 = -(PIECE_SIDE as i32);

    fn occupancy(board: &Board) -> Vec<Vec<bool>> {
        board
            .grid()
            .map(|row| row.iter().map(|cell| cell.is_occupied()).collect())
            .collect()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 20);
        assert_eq!(board.columns(), 10);
        assert_eq!(board.rows(), 20);
        assert!(!board.is_full());
        assert!(board.dangling_piece().is_none());
        assert!(board.grid().flatten().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_from_ascii_round_trip() {
        let board = Board::from_ascii(
            "
            ....
            #..#
            ####
            ",
        );
        assert_eq!(board.columns(), 4);
        assert_eq!(board.rows(), 3);
        assert!(board.cell(0, 1).is_occupied());
        assert!(board.cell(1, 1).is_empty());
        assert!(board.cell(3, 2).is_occupied());
    }

    #[test]
    fn test_placement_bounds() {
        let board = Board::new(10, 20);
        // O-piece mask occupies columns 1-2, rows 2-3 of its box.
        let piece = Piece::new(PieceKind::O);
        assert_eq!(board.test_placement(0, 0, &piece), None);
        assert_eq!(
            board.test_placement(-2, 0, &piece),
            Some(Conflict::OutOfLeftBound)
        );
        assert_eq!(
            board.test_placement(8, 0, &piece),
            Some(Conflict::OutOfRightBound)
        );
        assert_eq!(
            board.test_placement(0, 17, &piece),
            Some(Conflict::OutOfBottomBound)
        );
        // Above-grid rows are legal as long as the in-grid cells are.
        assert_eq!(board.test_placement(0, SPAWN_TOP, &piece), None);
    }

    #[test]
    fn test_placement_conflict_with_solid_cells() {
        let board = Board::from_ascii(
            "
            ..........
            ..........
            ..........
            ....##....
            ",
        );
        let piece = Piece::new(PieceKind::O);
        assert_eq!(
            board.test_placement(3, 0, &piece),
            Some(Conflict::Occupied)
        );
        assert_eq!(board.test_placement(5, 0, &piece), None);
    }

    #[test]
    fn test_placement_is_pure() {
        let board = Board::from_ascii(
            "
            ..........
            ....##....
            ",
        );
        let copy = board.clone();
        let piece = Piece::new(PieceKind::I);
        for left in -4..12 {
            let first = board.test_placement(left, -2, &piece);
            let second = board.test_placement(left, -2, &piece);
            assert_eq!(first, second);
        }
        assert_eq!(board, copy);
    }

    #[test]
    fn test_moves_commit_or_leave_unchanged() {
        let mut board = Board::new(10, 20);
        let piece = Piece::new(PieceKind::O);
        board.place_dangling(0, 0, piece).unwrap();

        // O-mask columns are 1-2; left = -1 keeps column 0 in range.
        assert!(board.move_left());
        assert_eq!(board.dangling_piece().unwrap().0, -1);
        assert!(!board.move_left());
        assert_eq!(board.dangling_piece().unwrap().0, -1);

        assert!(board.move_down());
        assert_eq!(board.dangling_piece().unwrap().1, 1);
        while board.move_down() {}
        assert_eq!(board.dangling_piece().unwrap().1, 16);
    }

    #[test]
    fn test_rotate_reverts_on_conflict() {
        // Vertical I against the right wall cannot go horizontal.
        let mut board = Board::new(10, 20);
        let piece = Piece::new(PieceKind::I).with_rotation(1);
        board.place_dangling(8, 0, piece).unwrap();
        assert!(!board.rotate());
        assert_eq!(board.dangling_piece().unwrap().2.rotation(), 1);

        // With room to the left the same rotation succeeds.
        let mut board = Board::new(10, 20);
        board.place_dangling(3, 0, piece).unwrap();
        assert!(board.rotate());
        assert_eq!(board.dangling_piece().unwrap().2.rotation(), 0);
    }

    #[test]
    fn test_merge_solidifies_with_piece_tag() {
        let mut board = Board::new(10, 20);
        let piece = Piece::new(PieceKind::T);
        board.place_dangling(0, 0, piece).unwrap();
        while board.move_down() {}
        let cleared = board.merge();
        assert_eq!(cleared, 0);
        assert!(board.dangling_piece().is_none());
        assert_eq!(board.cell(1, 18), Cell::Solid(PieceKind::T));
        assert_eq!(board.cell(0, 19), Cell::Solid(PieceKind::T));
        assert_eq!(board.cell(1, 19), Cell::Solid(PieceKind::T));
        assert_eq!(board.cell(2, 19), Cell::Solid(PieceKind::T));
    }

    #[test]
    fn test_merge_clears_completed_row() {
        // Bottom row is full except column 5; a vertical I fills the gap.
        let mut board = Board::from_ascii(
            "
            ..........
            ..........
            ..........
            ..........
            #####.####
            ",
        );
        let piece = Piece::new(PieceKind::I).with_rotation(1);
        board.place_dangling(4, SPAWN_TOP, piece).unwrap();
        while board.move_down() {}
        assert_eq!(board.dangling_piece().unwrap().1, 1);
        assert_eq!(board.merge(), 1);
        assert!(!board.is_full());
        // The I's three remaining cells stay stacked in column 5.
        let expected = Board::from_ascii(
            "
            ..........
            ..........
            .....#....
            .....#....
            .....#....
            ",
        );
        assert_eq!(occupancy(&board), occupancy(&expected));
    }

    #[test]
    fn test_row_clearing_preserves_row_order() {
        let mut board = Board::from_ascii(
            "
            ..........
            #.........
            ##########
            .#........
            ##########
            ..#.......
            ",
        );
        assert_eq!(board.clear_full_rows(), 2);
        let expected = Board::from_ascii(
            "
            ..........
            ..........
            ..........
            #.........
            .#........
            ..#.......
            ",
        );
        assert_eq!(occupancy(&board), occupancy(&expected));
    }

    #[test]
    fn test_clearing_all_rows() {
        let mut board = Board::from_ascii(
            "
            ####
            ####
            ####
            ",
        );
        assert_eq!(board.clear_full_rows(), 3);
        assert!(board.grid().flatten().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_preview_then_clear_restores_grid() {
        let mut board = Board::from_ascii(
            "
            ..........
            ..........
            ..........
             #####.####
            ",
        );
        let piece = Piece::new(PieceKind::O);
        board.place_dangling(0, SPAWN_TOP, piece).unwrap();
        while board.move_down() {}

        let before = board.clone();
        board.preview_merge();
        assert!(
            board
                .grid()
                .flatten()
                .any(|cell| matches!(cell, Cell::Preview(_)))
        );
        board.clear_preview();
        assert_eq!(board, before);
    }

    #[test]
    fn test_preview_skips_above_grid_cells() {
        // Stack in columns 1-2 reaching the top; the O rests spanning row -1.
        let mut board = Board::from_ascii(
            "
            .##.
            .##.
            .##.
            .##.
            ",
        );
        let piece = Piece::new(PieceKind::O);
        board.place_dangling(0, SPAWN_TOP, piece).unwrap();
        assert!(!board.move_down());

        let before = board.clone();
        board.preview_merge();
        assert_eq!(
            board
                .grid()
                .flatten()
                .filter(|cell| matches!(cell, Cell::Preview(_)))
                .count(),
            0
        );
        board.clear_preview();
        assert_eq!(board, before);
    }

    #[test]
    fn test_merge_above_grid_sets_full_flag() {
        // Column 1 is filled to the top; a vertical I rests entirely above it.
        let mut board = Board::from_ascii(
            "
            .#..
            .#..
            .#..
            .#..
            .#..
            ",
        );
        let piece = Piece::new(PieceKind::I).with_rotation(1);
        board.place_dangling(0, SPAWN_TOP, piece).unwrap();
        assert!(!board.move_down());
        assert_eq!(board.merge(), 0);
        assert!(board.is_full());
    }

    #[test]
    fn test_merge_partial_clear_remerges_above_grid_rows() {
        // Columns: 0 filled in rows 0-2, 1 empty above its support in rows
        // 3-5, 2 and 3 filled everywhere. A vertical I dropped into column 1
        // rests at top = -1 (one cell above the grid), completes rows 0-2,
        // and after the clear its remaining rows slide in at top = 2.
        let mut board = Board::from_ascii(
            "
            #.##
            #.##
            #.##
            .###
            .###
            .###
            ",
        );
        let piece = Piece::new(PieceKind::I).with_rotation(1);
        board.place_dangling(0, SPAWN_TOP, piece).unwrap();
        while board.move_down() {}
        assert_eq!(board.dangling_piece().unwrap().1, -1);

        assert_eq!(board.merge(), 3);
        assert!(!board.is_full());
        // Rows 0-2 cleared; the surviving stack settled at the bottom with
        // the shifted piece rows re-merged into column 1.
        let expected = Board::from_ascii(
            "
            ....
            ....
            .#..
            .###
            .###
            .###
            ",
        );
        assert_eq!(occupancy(&board), occupancy(&expected));
    }

    #[test]
    fn test_merge_partial_clear_not_enough_rows_stays_full() {
        // Same shape but only one clearable row: the shifted top remains
        // non-positive, so the board stays flagged full.
        let mut board = Board::from_ascii(
            "
            #.##
            .###
            .###
            .###
            ",
        );
        let piece = Piece::new(PieceKind::I).with_rotation(1);
        board.place_dangling(0, SPAWN_TOP, piece).unwrap();
        while board.move_down() {}
        assert_eq!(board.dangling_piece().unwrap().1, -3);

        assert_eq!(board.merge(), 1);
        assert!(board.is_full());
    }

    #[test]
    fn test_merge_shift_to_top_zero_stays_full() {
        // Two clearable rows shift the piece top from -2 to exactly 0, which
        // is not strictly positive: no re-merge, flag stays set.
        let mut board = Board::from_ascii(
            "
            #.##
            #.##
            .###
            .###
            .###
            .###
            ",
        );
        let piece = Piece::new(PieceKind::I).with_rotation(1);
        board.place_dangling(0, SPAWN_TOP, piece).unwrap();
        while board.move_down() {}
        assert_eq!(board.dangling_piece().unwrap().1, -2);

        assert_eq!(board.merge(), 2);
        assert!(board.is_full());
    }

    #[test]
    #[should_panic(expected = "no falling piece on the board")]
    fn test_move_without_dangling_piece_panics() {
        let mut board = Board::new(10, 20);
        let _ = board.move_down();
    }
}
