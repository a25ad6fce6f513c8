use serde::Serialize;

/// Statistics of a single game.
///
/// Tracks:
///
/// - **Turns**: pieces placed so far
/// - **Cleared rows**: total, plus a histogram by rows cleared per move
/// - **Stack height**: peak and running sum of the board's max height after each move
///
/// # Example
///
/// ```
/// use blocktune_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_move(4, 3);
/// stats.complete_move(0, 5);
///
/// assert_eq!(stats.turns(), 2);
/// assert_eq!(stats.total_cleared_rows(), 4);
/// assert_eq!(stats.cleared_row_counter()[4], 1);
/// assert_eq!(stats.peak_height(), 5);
/// assert!((stats.average_max_height() - 4.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameStats {
    turns: usize,
    total_cleared_rows: usize,
    cleared_row_counter: [usize; 5],
    peak_height: usize,
    max_height_sum: usize,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            turns: 0,
            total_cleared_rows: 0,
            cleared_row_counter: [0; 5],
            peak_height: 0,
            max_height_sum: 0,
        }
    }

    /// Returns the number of pieces placed.
    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }

    #[must_use]
    pub const fn total_cleared_rows(&self) -> usize {
        self.total_cleared_rows
    }

    /// Returns a histogram of moves by cleared row count.
    ///
    /// Index `n` counts the moves that cleared exactly `n` rows.
    #[must_use]
    pub const fn cleared_row_counter(&self) -> &[usize; 5] {
        &self.cleared_row_counter
    }

    /// Highest stack the board reached after any move.
    #[must_use]
    pub const fn peak_height(&self) -> usize {
        self.peak_height
    }

    /// Mean of the board's max height after each move, or zero before the first move.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average_max_height(&self) -> f64 {
        if self.turns == 0 {
            return 0.0;
        }
        self.max_height_sum as f64 / self.turns as f64
    }

    /// Updates statistics after a piece is placed.
    ///
    /// # Arguments
    ///
    /// * `cleared_rows` - Number of rows the move cleared (0-4)
    /// * `max_height` - Board max height after the move
    pub const fn complete_move(&mut self, cleared_rows: usize, max_height: usize) {
        self.turns += 1;
        self.total_cleared_rows += cleared_rows;
        if cleared_rows < self.cleared_row_counter.len() {
            self.cleared_row_counter[cleared_rows] += 1;
        }
        if max_height > self.peak_height {
            self.peak_height = max_height;
        }
        self.max_height_sum += max_height;
    }
}
