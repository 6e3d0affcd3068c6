use std::collections::VecDeque;

use rand::{SeedableRng as _, seq::SliceRandom};
use rand_pcg::Pcg64Mcg;

use crate::core::PieceKind;

/// Manages the order and random generation of pieces.
///
/// Supplies pieces using the 7-bag system: each batch of seven contains every
/// piece kind exactly once, in shuffled order.
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg64Mcg,
    bag: VecDeque<PieceKind>,
}

impl PieceBag {
    /// Creates a new [`PieceBag`].
    ///
    /// The random seed is initialized from the OS's random data source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(Pcg64Mcg::from_os_rng())
    }

    /// Creates a new [`PieceBag`] with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Pcg64Mcg::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg64Mcg) -> Self {
        let mut this = Self {
            rng,
            bag: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_bag();
        this
    }

    /// Fills the bag with shuffled sets of 7 pieces when needed.
    ///
    /// After filling, the bag always contains at least 8 elements (so that
    /// even after one `pop_next`, there are still 7 left to preview).
    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Pops the next piece from the bag.
    ///
    /// # Panics
    ///
    /// Panics if the bag is empty (should never happen).
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_bag();
        self.bag
            .pop_front()
            .expect("piece bag should never be empty")
    }

    /// Returns an iterator of upcoming pieces in the bag.
    ///
    /// The iterator always contains at least 8 elements.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}
