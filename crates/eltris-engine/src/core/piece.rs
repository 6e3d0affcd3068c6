use serde::{Deserialize, Serialize};

/// Side length of the square bounding box every rotation mask lives in.
pub const PIECE_SIDE: usize = 4;

/// Occupancy mask of one rotation variant within the bounding box.
///
/// Indexed `[y][x]`, origin at the top-left of the box.
pub type PieceMask = [[bool; PIECE_SIDE]; PIECE_SIDE];

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece (4×1 bar).
    I = 0,
    /// O-piece (2×2 square).
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds, in spawn-bag order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns the ordered rotation variant masks for this kind.
    ///
    /// Shapes with rotational symmetry expose fewer than four variants
    /// (I and S and Z have two, O has one).
    #[must_use]
    pub fn masks(self) -> &'static [PieceMask] {
        match self {
            PieceKind::I => &I_MASKS,
            PieceKind::O => &O_MASKS,
            PieceKind::S => &S_MASKS,
            PieceKind::Z => &Z_MASKS,
            PieceKind::J => &J_MASKS,
            PieceKind::L => &L_MASKS,
            PieceKind::T => &T_MASKS,
        }
    }

    fn heights(self) -> &'static [u32] {
        match self {
            PieceKind::I => &I_HEIGHTS,
            PieceKind::O => &O_HEIGHTS,
            PieceKind::S => &S_HEIGHTS,
            PieceKind::Z => &Z_HEIGHTS,
            PieceKind::J => &J_HEIGHTS,
            PieceKind::L => &L_HEIGHTS,
            PieceKind::T => &T_HEIGHTS,
        }
    }

    /// Number of distinct rotation variants for this kind.
    #[must_use]
    pub fn rotation_count(self) -> usize {
        self.masks().len()
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// A falling-block piece: a shape kind plus its current rotation index.
///
/// The shape data itself is immutable constant tables; a `Piece` value only
/// selects one variant. Rotation operations return new `Piece` instances and
/// always succeed — legality against the grid is the board's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: u8,
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self { kind, rotation: 0 }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Current rotation index, always `< rotation_count()`.
    #[must_use]
    pub fn rotation(&self) -> usize {
        usize::from(self.rotation)
    }

    #[must_use]
    pub fn rotation_count(&self) -> usize {
        self.kind.rotation_count()
    }

    /// Occupancy footprint of the current rotation.
    #[must_use]
    pub fn mask(&self) -> &'static PieceMask {
        &self.kind.masks()[self.rotation()]
    }

    /// Tight bounding height of the current rotation's filled cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.kind.heights()[self.rotation()]
    }

    /// Advances the rotation index, wrapping modulo the variant count.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn rotated_next(self) -> Self {
        Self {
            kind: self.kind,
            rotation: (self.rotation + 1) % self.rotation_count() as u8,
        }
    }

    /// Retreats the rotation index, wrapping modulo the variant count.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn rotated_prev(self) -> Self {
        let count = self.rotation_count() as u8;
        Self {
            kind: self.kind,
            rotation: (self.rotation + count - 1) % count,
        }
    }

    /// Forces a specific rotation variant.
    ///
    /// # Panics
    ///
    /// Panics if `rotation >= rotation_count()`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn with_rotation(self, rotation: usize) -> Self {
        assert!(rotation < self.rotation_count());
        Self {
            kind: self.kind,
            rotation: rotation as u8,
        }
    }

    /// Returns an iterator of the filled `(x, y)` cells of the current mask,
    /// relative to the bounding box origin.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + 'static {
        self.mask().iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, &filled)| filled.then_some((x, y)))
        })
    }
}

/// Builds one rotation mask from four ASCII rows (`#` filled, anything else empty).
const fn m(rows: [&str; PIECE_SIDE]) -> PieceMask {
    let mut mask = [[false; PIECE_SIDE]; PIECE_SIDE];
    let mut y = 0;
    while y < PIECE_SIDE {
        let row = rows[y].as_bytes();
        assert!(row.len() == PIECE_SIDE);
        let mut x = 0;
        while x < PIECE_SIDE {
            mask[y][x] = row[x] == b'#';
            x += 1;
        }
        y += 1;
    }
    mask
}

#[expect(clippy::cast_possible_truncation)]
const fn tight_height(mask: &PieceMask) -> u32 {
    let mut min_y = PIECE_SIDE;
    let mut max_y = 0;
    let mut y = 0;
    while y < PIECE_SIDE {
        let mut x = 0;
        while x < PIECE_SIDE {
            if mask[y][x] {
                if y < min_y {
                    min_y = y;
                }
                if y > max_y {
                    max_y = y;
                }
            }
            x += 1;
        }
        y += 1;
    }
    if min_y > max_y {
        0
    } else {
        (max_y - min_y + 1) as u32
    }
}

const fn tight_heights<const N: usize>(masks: &[PieceMask; N]) -> [u32; N] {
    let mut heights = [0; N];
    let mut i = 0;
    while i < N {
        heights[i] = tight_height(&masks[i]);
        i += 1;
    }
    heights
}

// Rotation variants occupy the lower rows of the bounding box so that a piece
// spawned at top = -PIECE_SIDE enters the grid as late as possible.

const I_MASKS: [PieceMask; 2] = [
    m(["....", "....", "....", "####"]),
    m([".#..", ".#..", ".#..", ".#.."]),
];

const O_MASKS: [PieceMask; 1] = [m(["....", "....", ".##.", ".##."])];

const S_MASKS: [PieceMask; 2] = [
    m(["....", "....", ".##.", "##.."]),
    m(["....", "#...", "##..", ".#.."]),
];

const Z_MASKS: [PieceMask; 2] = [
    m(["....", "....", "##..", ".##."]),
    m(["....", ".#..", "##..", "#..."]),
];

const J_MASKS: [PieceMask; 4] = [
    m(["....", ".#..", ".#..", "##.."]),
    m(["....", "....", "#...", "###."]),
    m(["....", ".##.", ".#..", ".#.."]),
    m(["....", "....", "###.", "..#."]),
];

const L_MASKS: [PieceMask; 4] = [
    m(["....", ".#..", ".#..", ".##."]),
    m(["....", "....", "###.", "#..."]),
    m(["....", ".##.", "..#.", "..#."]),
    m(["....", "....", "..#.", "###."]),
];

const T_MASKS: [PieceMask; 4] = [
    m(["....", "....", ".#..", "###."]),
    m(["....", ".#..", ".##.", ".#.."]),
    m(["....", "....", "###.", ".#.."]),
    m(["....", "..#.", ".##.", "..#."]),
];

const I_HEIGHTS: [u32; 2] = tight_heights(&I_MASKS);
const O_HEIGHTS: [u32; 1] = tight_heights(&O_MASKS);
const S_HEIGHTS: [u32; 2] = tight_heights(&S_MASKS);
const Z_HEIGHTS: [u32; 2] = tight_heights(&Z_MASKS);
const J_HEIGHTS: [u32; 4] = tight_heights(&J_MASKS);
const L_HEIGHTS: [u32; 4] = tight_heights(&L_MASKS);
const T_HEIGHTS: [u32; 4] = tight_heights(&T_MASKS);
