use std::{fmt, str::FromStr};

use crate::ParsePieceKindError;

use super::board::BOARD_WIDTH;

/// Enum representing the type of piece.
///
/// Discriminants follow the piece ids of the geometry tables (`O` is 0, `Z` is 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum PieceKind {
    /// O-piece.
    O = 0,
    /// I-piece.
    I = 1,
    /// L-piece.
    L = 2,
    /// J-piece.
    J = 3,
    /// T-piece.
    T = 4,
    /// S-piece.
    S = 5,
    /// Z-piece.
    Z = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in id order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::O,
        PieceKind::I,
        PieceKind::L,
        PieceKind::J,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Returns the numeric id of this piece kind.
    #[must_use]
    pub const fn id(self) -> usize {
        self as usize
    }

    /// Looks up a piece kind by its numeric id.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocktune_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_id(1), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_id(7), None);
    /// ```
    #[must_use]
    pub const fn from_id(id: usize) -> Option<Self> {
        if id < Self::LEN {
            Some(Self::ALL[id])
        } else {
            None
        }
    }

    /// Returns the letter naming this piece.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::O => 'O',
            PieceKind::I => 'I',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
        }
    }

    /// Looks up a piece kind by its letter, ignoring case.
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'O' => Some(PieceKind::O),
            'I' => Some(PieceKind::I),
            'L' => Some(PieceKind::L),
            'J' => Some(PieceKind::J),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Number of distinct orientations of this piece.
    #[must_use]
    pub fn orientation_count(self) -> usize {
        self.shapes().len()
    }

    /// Returns the geometry of every orientation of this piece.
    #[must_use]
    pub fn shapes(self) -> &'static [PieceShape] {
        PIECE_SHAPES[self.id()]
    }

    /// Returns the geometry of this piece in the given orientation.
    ///
    /// # Panics
    ///
    /// Panics if the orientation does not exist for this piece.
    #[must_use]
    pub fn shape(self, orientation: Orientation) -> &'static PieceShape {
        &PIECE_SHAPES[self.id()][orientation.index()]
    }

    /// Returns every legal move for this piece, ordered by orientation and then slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocktune_engine::PieceKind;
    ///
    /// // the O-piece is two columns wide and has a single orientation
    /// assert_eq!(PieceKind::O.legal_moves().len(), 9);
    /// ```
    #[must_use]
    pub fn legal_moves(self) -> &'static [Move] {
        &LEGAL_MOVES.moves[self.id()][..LEGAL_MOVES.counts[self.id()]]
    }
}

impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::from_char(ch),
            _ => None,
        }
        .ok_or_else(|| ParsePieceKindError {
            input: s.to_owned(),
        })
    }
}

/// Orientation index of a piece.
///
/// Valid indices range from `0` to [`PieceKind::orientation_count`] (exclusive).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation(u8);

impl Orientation {
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A placement of the next piece: orientation plus leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    orientation: Orientation,
    slot: u8,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "#orientation@slot" (e.g., "#1@4")
        write!(f, "#{}@{}", self.orientation.0, self.slot)
    }
}

impl Move {
    #[must_use]
    pub const fn new(orientation: Orientation, slot: u8) -> Self {
        Self { orientation, slot }
    }

    #[must_use]
    pub const fn orientation(self) -> Orientation {
        self.orientation
    }

    /// Leftmost board column covered by the piece.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }
}

/// Column profile of one piece orientation.
///
/// For each column `i` the piece spans, cells `bottom[i]..top[i]` (relative to the landing
/// height) are occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    width: u8,
    height: u8,
    bottom: [u8; 4],
    top: [u8; 4],
}

impl PieceShape {
    #[expect(clippy::cast_possible_truncation)]
    const fn new<const W: usize>(bottom: [u8; W], top: [u8; W]) -> Self {
        let mut b = [0; 4];
        let mut t = [0; 4];
        let mut height = 0;
        let mut i = 0;
        while i < W {
            b[i] = bottom[i];
            t[i] = top[i];
            if top[i] > height {
                height = top[i];
            }
            i += 1;
        }
        Self {
            width: W as u8,
            height,
            bottom: b,
            top: t,
        }
    }

    /// Number of columns the piece spans.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Number of rows the piece spans.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Lowest occupied offset in each spanned column.
    #[must_use]
    pub fn bottom(&self) -> &[u8] {
        &self.bottom[..self.width()]
    }

    /// One past the highest occupied offset in each spanned column.
    #[must_use]
    pub fn top(&self) -> &[u8] {
        &self.top[..self.width()]
    }
}

const O_SHAPES: [PieceShape; 1] = [PieceShape::new([0, 0], [2, 2])];
const I_SHAPES: [PieceShape; 2] = [
    PieceShape::new([0], [4]),
    PieceShape::new([0, 0, 0, 0], [1, 1, 1, 1]),
];
const L_SHAPES: [PieceShape; 4] = [
    PieceShape::new([0, 0], [3, 1]),
    PieceShape::new([0, 1, 1], [2, 2, 2]),
    PieceShape::new([2, 0], [3, 3]),
    PieceShape::new([0, 0, 0], [1, 1, 2]),
];
const J_SHAPES: [PieceShape; 4] = [
    PieceShape::new([0, 0], [1, 3]),
    PieceShape::new([0, 0, 0], [2, 1, 1]),
    PieceShape::new([0, 2], [3, 3]),
    PieceShape::new([1, 1, 0], [2, 2, 2]),
];
const T_SHAPES: [PieceShape; 4] = [
    PieceShape::new([0, 1], [3, 2]),
    PieceShape::new([1, 0, 1], [2, 2, 2]),
    PieceShape::new([1, 0], [2, 3]),
    PieceShape::new([0, 0, 0], [1, 2, 1]),
];
const S_SHAPES: [PieceShape; 2] = [
    PieceShape::new([0, 0, 1], [1, 2, 2]),
    PieceShape::new([1, 0], [3, 2]),
];
const Z_SHAPES: [PieceShape; 2] = [
    PieceShape::new([1, 0, 0], [2, 2, 1]),
    PieceShape::new([0, 1], [2, 3]),
];

static PIECE_SHAPES: [&[PieceShape]; PieceKind::LEN] = [
    &O_SHAPES, &I_SHAPES, &L_SHAPES, &J_SHAPES, &T_SHAPES, &S_SHAPES, &Z_SHAPES,
];

/// Upper bound of legal moves for any piece (L, J and T have 34).
pub const MAX_LEGAL_MOVES: usize = 34;

struct LegalMoveTable {
    moves: [[Move; MAX_LEGAL_MOVES]; PieceKind::LEN],
    counts: [usize; PieceKind::LEN],
}

#[expect(clippy::cast_possible_truncation)]
static LEGAL_MOVES: LegalMoveTable = {
    let mut moves = [[Move::new(Orientation(0), 0); MAX_LEGAL_MOVES]; PieceKind::LEN];
    let mut counts = [0; PieceKind::LEN];
    let mut kind = 0;
    while kind < PieceKind::LEN {
        let shapes = PIECE_SHAPES[kind];
        let mut orientation = 0;
        while orientation < shapes.len() {
            let width = shapes[orientation].width();
            let mut slot = 0;
            while slot + width <= BOARD_WIDTH {
                moves[kind][counts[kind]] = Move::new(Orientation(orientation as u8), slot as u8);
                counts[kind] += 1;
                slot += 1;
            }
            orientation += 1;
        }
        kind += 1;
    }
    LegalMoveTable { moves, counts }
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_counts() {
        let counts = PieceKind::ALL.map(PieceKind::orientation_count);
        assert_eq!(counts, [1, 2, 4, 4, 4, 2, 2]);
    }

    #[test]
    fn test_shape_height_matches_profiles() {
        for kind in PieceKind::ALL {
            for shape in kind.shapes() {
                let max_top = shape.top().iter().copied().max().unwrap();
                let min_bottom = shape.bottom().iter().copied().min().unwrap();
                assert_eq!(usize::from(max_top), shape.height(), "{kind}: {shape:?}");
                // every orientation rests on its lowest row somewhere
                assert_eq!(min_bottom, 0, "{kind}: {shape:?}");
                for (b, t) in shape.bottom().iter().zip(shape.top()) {
                    assert!(b < t, "{kind}: {shape:?}");
                }
            }
        }
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceKind::ALL {
            for shape in kind.shapes() {
                let cells: u8 = shape
                    .bottom()
                    .iter()
                    .zip(shape.top())
                    .map(|(b, t)| t - b)
                    .sum();
                assert_eq!(cells, 4, "{kind}: {shape:?}");
            }
        }
    }

    #[test]
    fn test_legal_moves_cover_every_slot() {
        for kind in PieceKind::ALL {
            let moves = kind.legal_moves();
            let mut expected = vec![];
            for (o, shape) in kind.shapes().iter().enumerate() {
                for slot in 0..=(BOARD_WIDTH - shape.width()) {
                    expected.push(Move::new(
                        Orientation::new(u8::try_from(o).unwrap()),
                        u8::try_from(slot).unwrap(),
                    ));
                }
            }
            assert_eq!(moves, expected.as_slice(), "{kind}");
            for mv in moves {
                assert!(mv.slot() + kind.shape(mv.orientation()).width() <= BOARD_WIDTH);
            }
        }
    }

    #[test]
    fn test_legal_move_counts() {
        let counts = PieceKind::ALL.map(|k| k.legal_moves().len());
        assert_eq!(counts, [9, 17, 34, 34, 34, 17, 17]);
        assert_eq!(counts.into_iter().max(), Some(MAX_LEGAL_MOVES));
    }

    #[test]
    fn test_piece_kind_id_roundtrip() {
        for (id, kind) in PieceKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.id(), id);
            assert_eq!(PieceKind::from_id(id), Some(kind));
        }
        assert_eq!(PieceKind::from_id(PieceKind::LEN), None);
    }

    #[test]
    fn test_piece_kind_parse() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.to_string(), kind.as_char().to_string());
            assert_eq!(kind.to_string().parse::<PieceKind>().unwrap(), kind);
        }
        assert_eq!("t".parse::<PieceKind>().unwrap(), PieceKind::T);
        assert!("X".parse::<PieceKind>().is_err());
        assert!("TT".parse::<PieceKind>().is_err());
        assert!("".parse::<PieceKind>().is_err());
    }

    #[test]
    fn test_move_display() {
        let mv = Move::new(Orientation::new(1), 4);
        assert_eq!(mv.to_string(), "#1@4");
    }
}
