use serde::Serialize;

/// Counters of a single game: score, cleared rows and locked pieces.
///
/// The score only grows during a game: the engine adds the line-clear bonus
/// on every lock and the configured per-step gain each time the falling piece
/// moves down without locking.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(2, 25.0);
///
/// assert_eq!(stats.score(), 25.0);
/// assert_eq!(stats.total_cleared_lines(), 2);
/// assert_eq!(stats.line_cleared_counter()[2], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameStats {
    score: f64,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0.0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Pieces locked so far.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Rows cleared so far.
    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Number of locks by rows cleared at once, `[0]` through `[4]`.
    ///
    /// Locks clearing more than four rows (only possible with custom shapes)
    /// are counted in the totals but not in the histogram.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records a lock that cleared `cleared_lines` rows and earned `bonus`.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize, bonus: f64) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.score += bonus;
    }

    /// Adds the per-row score gain of a piece that moved down.
    pub fn add_step_gain(&mut self, gain: f64) {
        self.score += gain;
    }
}
