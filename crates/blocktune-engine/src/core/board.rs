use std::fmt;

use crate::BoardOverflowError;

use super::piece::{Move, PieceKind};

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board, including the row that only exists to detect overflow.
pub const BOARD_HEIGHT: usize = 21;

const FULL_ROW_MASK: u16 = (1 << BOARD_WIDTH) - 1;

/// Single row of the board.
///
/// Bit `x` (LSB first) is set when column `x` is occupied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitRow {
    bits: u16,
}

impl BitRow {
    pub const EMPTY: Self = Self { bits: 0 };
    pub const FULL: Self = Self {
        bits: FULL_ROW_MASK,
    };

    /// Creates a row from a column bitmask; bits beyond the board width are dropped.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bits: bits & FULL_ROW_MASK,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    #[inline]
    #[must_use]
    pub const fn is_filled(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_cell_occupied(self, x: usize) -> bool {
        (self.bits & (1 << x)) != 0
    }

    #[inline]
    fn occupy_cell(&mut self, x: usize) {
        self.bits |= 1 << x;
    }

    #[must_use]
    pub const fn count_occupied(self) -> u32 {
        self.bits.count_ones()
    }

    /// Iterates over the cells of the row from left to right, returning their occupied status.
    pub fn iter_cells(self) -> impl Iterator<Item = bool> {
        (0..BOARD_WIDTH).map(move |x| self.is_cell_occupied(x))
    }
}

/// The 10×21 playing field.
///
/// Row 0 is the floor. Column heights are kept in sync with the cells: each height is one past
/// the highest occupied cell of its column, or zero for an empty column.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [BitRow; BOARD_HEIGHT],
    column_heights: [u8; BOARD_WIDTH],
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows.iter().rev() {
            for occupied in row.iter_cells() {
                f.write_str(if occupied { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [BitRow::EMPTY; BOARD_HEIGHT],
        column_heights: [0; BOARD_WIDTH],
    };

    #[must_use]
    pub fn row(&self, y: usize) -> BitRow {
        self.rows[y]
    }

    /// Rows from the floor upwards.
    #[must_use]
    pub fn rows(&self) -> &[BitRow; BOARD_HEIGHT] {
        &self.rows
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.rows[y].is_cell_occupied(x)
    }

    #[must_use]
    pub fn column_heights(&self) -> &[u8; BOARD_WIDTH] {
        &self.column_heights
    }

    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        usize::from(self.column_heights[x])
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        usize::from(self.column_heights.iter().copied().max().unwrap_or(0))
    }

    /// Row at which the lowest cell of the piece rests when dropped with the given move.
    #[must_use]
    pub fn landing_height(&self, kind: PieceKind, mv: Move) -> usize {
        let shape = kind.shape(mv.orientation());
        let heights = &self.column_heights[mv.slot()..][..shape.width()];
        heights
            .iter()
            .zip(shape.bottom())
            .map(|(&h, &b)| usize::from(h).saturating_sub(usize::from(b)))
            .max()
            .unwrap_or(0)
    }

    /// Drops a piece, locks it and removes the rows it completes.
    ///
    /// Returns the number of cleared rows. When the piece would reach the top row the board is
    /// left untouched and an error is returned.
    pub fn place(&mut self, kind: PieceKind, mv: Move) -> Result<usize, BoardOverflowError> {
        let shape = kind.shape(mv.orientation());
        assert!(
            mv.slot() + shape.width() <= BOARD_WIDTH,
            "illegal move {mv} for piece {kind}"
        );

        let landing = self.landing_height(kind, mv);
        if landing + shape.height() >= BOARD_HEIGHT {
            return Err(BoardOverflowError);
        }

        let Self {
            rows,
            column_heights,
        } = self;

        for (i, (&bottom, &top)) in shape.bottom().iter().zip(shape.top()).enumerate() {
            let x = mv.slot() + i;
            for row in &mut rows[landing + usize::from(bottom)..landing + usize::from(top)] {
                row.occupy_cell(x);
            }
            #[expect(clippy::cast_possible_truncation)]
            let height = (landing + usize::from(top)) as u8;
            column_heights[x] = height;
        }

        let mut cleared = 0;
        for y in (landing..landing + shape.height()).rev() {
            if !rows[y].is_filled() {
                continue;
            }
            cleared += 1;
            rows.copy_within(y + 1.., y);
            rows[BOARD_HEIGHT - 1] = BitRow::EMPTY;
            for (x, height) in column_heights.iter_mut().enumerate() {
                *height -= 1;
                while *height > 0 && !rows[usize::from(*height) - 1].is_cell_occupied(x) {
                    *height -= 1;
                }
            }
        }

        Ok(cleared)
    }

    /// Returns the board after placing the piece, leaving `self` untouched.
    pub fn simulate_move(
        &self,
        kind: PieceKind,
        mv: Move,
    ) -> Result<(Self, usize), BoardOverflowError> {
        let mut board = self.clone();
        let cleared = board.place(kind, mv)?;
        Ok((board, cleared))
    }

    /// Creates a board from rows listed floor first; missing rows are empty.
    #[must_use]
    pub fn from_rows(rows: &[BitRow]) -> Self {
        assert!(
            rows.len() <= BOARD_HEIGHT,
            "At most {BOARD_HEIGHT} rows are allowed, got {}",
            rows.len()
        );
        let mut board = Self::EMPTY;
        board.rows[..rows.len()].copy_from_slice(rows);
        for (x, height) in board.column_heights.iter_mut().enumerate() {
            let top = rows.iter().rposition(|row| row.is_cell_occupied(x));
            #[expect(clippy::cast_possible_truncation)]
            let value = top.map_or(0, |y| y + 1) as u8;
            *height = value;
        }
        board
    }

    /// Creates a board from ASCII art.
    ///
    /// '#' represents an occupied cell, '.' represents an empty cell. Each line must contain
    /// exactly 10 cells; the last line is the floor row.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "At most {BOARD_HEIGHT} rows are allowed, got {}",
            lines.len()
        );

        let rows: Vec<BitRow> = lines
            .iter()
            .rev()
            .enumerate()
            .map(|(y, line)| {
                let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
                assert_eq!(
                    cells.len(),
                    BOARD_WIDTH,
                    "Each row must have exactly {BOARD_WIDTH} cells, got {} at row {y}",
                    cells.len(),
                );
                let mut row = BitRow::EMPTY;
                for (x, &ch) in cells.iter().enumerate() {
                    if ch == '#' {
                        row.occupy_cell(x);
                    }
                }
                row
            })
            .collect();
        Self::from_rows(&rows)
    }
}
