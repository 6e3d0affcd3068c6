use std::fmt;

use crate::{
    core::{Board, PIECE_SIDE, Piece, PieceKind},
    engine::{GameStats, PieceBag},
};

/// Vertical spawn position: a fresh piece starts with its bounding box
/// entirely above the grid and descends into view.
#[expect(clippy::cast_possible_truncation)]
pub const SPAWN_TOP: i32 = -(PIECE_SIDE as i32);

/// Horizontal spawn position for a board `columns` wide: the piece's bounding
/// box is centered.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub const fn spawn_left(columns: usize) -> i32 {
    columns as i32 / 2 - 2
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

/// Called after every committed board mutation; read-only observers such as
/// renderers or loggers hang off this.
pub type ChangeHook = Box<dyn FnMut(&Board)>;

/// One game: a board, a piece supply and running statistics, driven by a
/// controller (human input or a search policy).
///
/// The session enforces the turn protocol: [`spawn_next`](Self::spawn_next)
/// introduces a piece, movement methods steer it, and
/// [`lock_piece`](Self::lock_piece) solidifies it and updates the statistics.
/// Once the board overflows the session transitions to
/// [`SessionState::GameOver`] and stays there.
pub struct GameSession {
    board: Board,
    piece_bag: PieceBag,
    stats: GameStats,
    session_state: SessionState,
    change_hook: Option<ChangeHook>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("board", &self.board)
            .field("piece_bag", &self.piece_bag)
            .field("stats", &self.stats)
            .field("session_state", &self.session_state)
            .field("change_hook", &self.change_hook.as_ref().map(|_| "FnMut"))
            .finish()
    }
}

impl GameSession {
    /// Creates a session on an empty `columns × rows` board with an OS-seeded
    /// piece supply.
    #[must_use]
    pub fn new(columns: usize, rows: usize) -> Self {
        Self::with_bag(columns, rows, PieceBag::new())
    }

    /// Creates a session with a fixed piece-supply seed, for reproducible
    /// runs.
    #[must_use]
    pub fn with_seed(columns: usize, rows: usize, seed: u64) -> Self {
        Self::with_bag(columns, rows, PieceBag::with_seed(seed))
    }

    fn with_bag(columns: usize, rows: usize, piece_bag: PieceBag) -> Self {
        Self {
            board: Board::new(columns, rows),
            piece_bag,
            stats: GameStats::new(),
            session_state: SessionState::Playing,
            change_hook: None,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for search policies that explore placements
    /// in-place. Callers must leave the board as they found it.
    #[must_use]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_bag.next_pieces()
    }

    /// Installs the observer called after each committed mutation.
    pub fn set_change_hook(&mut self, hook: impl FnMut(&Board) + 'static) {
        self.change_hook = Some(Box::new(hook));
    }

    fn notify(&mut self) {
        if let Some(hook) = &mut self.change_hook {
            hook(&self.board);
        }
    }

    /// Draws the next piece from the bag and spawns it above the board.
    ///
    /// Returns `false` and transitions to game over if the spawn position is
    /// already blocked, or if the session has ended.
    pub fn spawn_next(&mut self) -> bool {
        if self.session_state.is_game_over() {
            return false;
        }
        let piece = Piece::new(self.piece_bag.pop_next());
        let left = spawn_left(self.board.columns());
        if self.board.place_dangling(left, SPAWN_TOP, piece).is_err() {
            self.session_state = SessionState::GameOver;
            return false;
        }
        self.notify();
        true
    }

    /// Attempts to shift the falling piece one column left.
    pub fn move_left(&mut self) -> bool {
        let moved = self.board.move_left();
        if moved {
            self.notify();
        }
        moved
    }

    /// Attempts to shift the falling piece one column right.
    pub fn move_right(&mut self) -> bool {
        let moved = self.board.move_right();
        if moved {
            self.notify();
        }
        moved
    }

    /// Attempts to drop the falling piece one row.
    pub fn soft_drop(&mut self) -> bool {
        let moved = self.board.move_down();
        if moved {
            self.notify();
        }
        moved
    }

    /// Attempts to rotate the falling piece in place.
    pub fn rotate(&mut self) -> bool {
        let rotated = self.board.rotate();
        if rotated {
            self.notify();
        }
        rotated
    }

    /// Solidifies the falling piece where it is and records the result.
    ///
    /// Transitions to game over when the merge leaves the board overflowed.
    /// Returns the number of rows cleared.
    ///
    /// # Panics
    ///
    /// Panics if no piece has been spawned.
    pub fn lock_piece(&mut self) -> usize {
        let cleared = self.board.merge();
        self.stats.record_lock(cleared);
        if self.board.is_full() {
            self.session_state = SessionState::GameOver;
        }
        self.notify();
        cleared
    }

    /// Drops the falling piece to rest and locks it. Returns the number of
    /// rows cleared.
    pub fn hard_drop(&mut self) -> usize {
        while self.board.move_down() {}
        self.lock_piece()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell as StdCell, rc::Rc};

    use super::*;

    #[test]
    fn test_spawn_centers_piece_above_grid() {
        let mut session = GameSession::with_seed(10, 20, 1);
        assert!(session.spawn_next());
        let (left, top, _) = session.board().dangling_piece().unwrap();
        assert_eq!(left, 3);
        assert_eq!(top, SPAWN_TOP);
        assert!(session.session_state().is_playing());
    }

    #[test]
    fn test_spawn_consumes_bag_in_preview_order() {
        let mut session = GameSession::with_seed(10, 20, 9);
        let expected: Vec<_> = session.next_pieces().take(3).collect();
        for kind in expected {
            assert!(session.spawn_next());
            let (_, _, piece) = session.board().dangling_piece().unwrap();
            assert_eq!(piece.kind(), kind);
            session.hard_drop();
        }
        assert_eq!(session.stats().completed_pieces(), 3);
    }

    #[test]
    fn test_hard_drop_updates_stats() {
        let mut session = GameSession::with_seed(10, 20, 3);
        assert!(session.spawn_next());
        let cleared = session.hard_drop();
        assert_eq!(cleared, 0);
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.stats().score(), 0);
        assert!(session.board().dangling_piece().is_none());
    }

    #[test]
    fn test_blind_drops_eventually_end_the_game() {
        let mut session = GameSession::with_seed(4, 6, 5);
        let mut pieces = 0;
        while session.spawn_next() {
            session.hard_drop();
            pieces += 1;
            assert!(pieces < 100, "game should have overflowed by now");
        }
        assert!(session.session_state().is_game_over());
        assert!(!session.spawn_next());
        assert_eq!(session.stats().completed_pieces(), pieces);
    }

    #[test]
    fn test_change_hook_fires_only_on_committed_mutations() {
        let calls = Rc::new(StdCell::new(0usize));
        let counter = Rc::clone(&calls);

        let mut session = GameSession::with_seed(10, 20, 2);
        session.set_change_hook(move |board| {
            assert_eq!(board.columns(), 10);
            counter.set(counter.get() + 1);
        });

        assert!(session.spawn_next());
        assert_eq!(calls.get(), 1);

        // Walk into the left wall; failed shifts must not notify.
        while session.move_left() {}
        let after_walk = calls.get();
        assert!(!session.move_left());
        assert_eq!(calls.get(), after_walk);

        session.hard_drop();
        assert!(calls.get() > after_walk);
    }
}
