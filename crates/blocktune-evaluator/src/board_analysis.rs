//! Lazily computed structural metrics of a board.
//!
//! [`BoardAnalysis`] owns a board snapshot and derives every metric the board features read.
//! Related metrics are computed together in a single pass and cached, so a palette that only
//! uses a few features pays only for the passes it needs.
//!
//! # Definitions
//!
//! - **Hole**: an empty cell below its column's height. Holes are counted per cell
//!   ([`BoardAnalysis::num_holes`]) and per maximal vertical run
//!   ([`BoardAnalysis::connected_holes`]).
//! - **Well cell**: an empty cell whose left and right neighbours are both occupied, where a
//!   board edge counts as occupied.
//! - **Row transitions**: occupied/empty flips scanning each row left to right, treating the
//!   wall right of the last column as occupied. Every row is scanned, so each empty row adds
//!   one flip against the wall.
//! - **Column transitions**: occupied/empty flips scanning each column top to bottom, treating
//!   the floor as occupied.

use std::cell::OnceCell;

use blocktune_engine::{BOARD_WIDTH, BitRow, Board};

/// Relative-height patterns that leave a good spot for the next piece.
///
/// Each template lists the expected height differences `height[c + 1 + i] - height[c]` from a
/// base column `c`. Templates are tried in order and only the first match per base column
/// scores.
pub const IDEAL_POSITION_TEMPLATES: [IdealPositionTemplate; 5] = [
    IdealPositionTemplate::new(4, &[0, 0, 0]),
    IdealPositionTemplate::new(3, &[0, 1]),
    IdealPositionTemplate::new(3, &[-1, -1]),
    IdealPositionTemplate::new(2, &[0, 0]),
    IdealPositionTemplate::new(1, &[0]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdealPositionTemplate {
    weight: u32,
    deltas: &'static [i8],
}

impl IdealPositionTemplate {
    #[must_use]
    pub const fn new(weight: u32, deltas: &'static [i8]) -> Self {
        Self { weight, deltas }
    }

    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }

    #[must_use]
    pub const fn deltas(&self) -> &'static [i8] {
        self.deltas
    }

    /// Checks the template against the columns starting at `base`.
    ///
    /// Templates that would extend past the right edge never match.
    #[must_use]
    pub fn matches(&self, heights: &[u8; BOARD_WIDTH], base: usize) -> bool {
        if base + self.deltas.len() >= BOARD_WIDTH {
            return false;
        }
        let base_height = i16::from(heights[base]);
        self.deltas
            .iter()
            .zip(&heights[base + 1..])
            .all(|(&delta, &h)| i16::from(h) - base_height == i16::from(delta))
    }
}

#[derive(Debug, Clone, Copy)]
struct HoleStats {
    num_holes: u32,
    connected_holes: u32,
}

#[derive(Debug, Clone, Copy)]
struct OccupancyStats {
    blocks: u32,
    weighted_blocks: u32,
    imbalance: u32,
}

#[derive(Debug, Clone, Copy)]
struct WellStats {
    sum_of_wells: u32,
    max_well_depth: u32,
}

#[derive(Debug, Clone, Copy)]
struct TransitionStats {
    row_transitions: u32,
    column_transitions: u32,
}

#[derive(Debug, Clone)]
pub struct BoardAnalysis {
    board: Board,
    holes: OnceCell<HoleStats>,
    occupancy: OnceCell<OccupancyStats>,
    wells: OnceCell<WellStats>,
    transitions: OnceCell<TransitionStats>,
    ideal_position_bonus: OnceCell<u32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self::new(board.clone())
    }

    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            holes: OnceCell::new(),
            occupancy: OnceCell::new(),
            wells: OnceCell::new(),
            transitions: OnceCell::new(),
            ideal_position_bonus: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn column_heights(&self) -> &[u8; BOARD_WIDTH] {
        self.board.column_heights()
    }

    /// Sum of all column heights.
    #[must_use]
    pub fn aggregate_height(&self) -> u32 {
        self.column_heights().iter().map(|&h| u32::from(h)).sum()
    }

    #[must_use]
    pub fn max_height(&self) -> u8 {
        self.column_heights().iter().copied().max().unwrap_or(0)
    }

    /// Sum of squared height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> u32 {
        self.column_heights()
            .windows(2)
            .map(|w| {
                let diff = u32::from(w[0].abs_diff(w[1]));
                diff * diff
            })
            .sum()
    }

    #[must_use]
    pub fn num_holes(&self) -> u32 {
        self.hole_stats().num_holes
    }

    #[must_use]
    pub fn connected_holes(&self) -> u32 {
        self.hole_stats().connected_holes
    }

    #[must_use]
    pub fn blocks(&self) -> u32 {
        self.occupancy_stats().blocks
    }

    /// Occupied cells weighted by their row number, counting the floor row as 1.
    #[must_use]
    pub fn weighted_blocks(&self) -> u32 {
        self.occupancy_stats().weighted_blocks
    }

    /// Sum of occupied-cell count differences between adjacent columns.
    #[must_use]
    pub fn imbalance(&self) -> u32 {
        self.occupancy_stats().imbalance
    }

    #[must_use]
    pub fn sum_of_wells(&self) -> u32 {
        self.well_stats().sum_of_wells
    }

    #[must_use]
    pub fn max_well_depth(&self) -> u32 {
        self.well_stats().max_well_depth
    }

    #[must_use]
    pub fn row_transitions(&self) -> u32 {
        self.transition_stats().row_transitions
    }

    #[must_use]
    pub fn column_transitions(&self) -> u32 {
        self.transition_stats().column_transitions
    }

    /// Sum over base columns of the first matching [`IDEAL_POSITION_TEMPLATES`] weight.
    #[must_use]
    pub fn ideal_position_bonus(&self) -> u32 {
        *self.ideal_position_bonus.get_or_init(|| {
            let heights = self.column_heights();
            (0..BOARD_WIDTH)
                .filter_map(|base| {
                    IDEAL_POSITION_TEMPLATES
                        .iter()
                        .find(|t| t.matches(heights, base))
                        .map(IdealPositionTemplate::weight)
                })
                .sum()
        })
    }

    fn hole_stats(&self) -> HoleStats {
        *self.holes.get_or_init(|| {
            let mut num_holes = 0;
            let mut connected_holes = 0;
            for x in 0..BOARD_WIDTH {
                let mut in_run = false;
                for y in 0..self.board.column_height(x) {
                    if self.board.is_occupied(x, y) {
                        in_run = false;
                        continue;
                    }
                    num_holes += 1;
                    if !in_run {
                        connected_holes += 1;
                        in_run = true;
                    }
                }
            }
            HoleStats {
                num_holes,
                connected_holes,
            }
        })
    }

    fn occupancy_stats(&self) -> OccupancyStats {
        *self.occupancy.get_or_init(|| {
            let mut blocks = 0;
            let mut weighted_blocks = 0;
            let mut column_blocks = [0_u32; BOARD_WIDTH];
            for (row_number, row) in (1..).zip(self.board.rows()) {
                let count = row.count_occupied();
                blocks += count;
                weighted_blocks += count * row_number;
                for (x, occupied) in row.iter_cells().enumerate() {
                    column_blocks[x] += u32::from(occupied);
                }
            }
            let imbalance = column_blocks
                .windows(2)
                .map(|w| w[0].abs_diff(w[1]))
                .sum();
            OccupancyStats {
                blocks,
                weighted_blocks,
                imbalance,
            }
        })
    }

    fn well_stats(&self) -> WellStats {
        *self.wells.get_or_init(|| {
            const LEFT_WALL: u16 = 1;
            const RIGHT_WALL: u16 = 1 << (BOARD_WIDTH - 1);
            let full = BitRow::FULL.bits();

            let mut sum_of_wells = 0;
            let mut max_well_depth = 0;
            let mut depth = [0_u32; BOARD_WIDTH];
            for row in self.board.rows() {
                let bits = row.bits();
                // bit x set when column x-1 (or the left wall) is occupied, likewise for x+1
                let left_occupied = (bits << 1) | LEFT_WALL;
                let right_occupied = (bits >> 1) | RIGHT_WALL;
                let wells = BitRow::from_bits(!bits & left_occupied & right_occupied & full);
                sum_of_wells += wells.count_occupied();
                for (x, is_well) in wells.iter_cells().enumerate() {
                    if is_well {
                        depth[x] += 1;
                        max_well_depth = max_well_depth.max(depth[x]);
                    } else {
                        depth[x] = 0;
                    }
                }
            }
            WellStats {
                sum_of_wells,
                max_well_depth,
            }
        })
    }

    fn transition_stats(&self) -> TransitionStats {
        *self.transitions.get_or_init(|| {
            const RIGHT_WALL: u16 = 1 << BOARD_WIDTH;
            let full = BitRow::FULL.bits();
            let rows = self.board.rows();

            let row_transitions = rows
                .iter()
                .map(|row| {
                    let bits = row.bits() | RIGHT_WALL;
                    ((bits ^ (bits >> 1)) & full).count_ones()
                })
                .sum();

            let floor_transitions = (!rows[0].bits() & full).count_ones();
            let column_transitions = floor_transitions
                + rows
                    .windows(2)
                    .map(|w| (w[0].bits() ^ w[1].bits()).count_ones())
                    .sum::<u32>();
            TransitionStats {
                row_transitions,
                column_transitions,
            }
        })
    }
}
