//! Heuristic board scoring.
//!
//! A board is scored as a weighted sum of four terms, computed after the
//! complete rows it contains have been cleared:
//!
//! ```text
//! fitness = W_lines·lines_cleared + W_height·Σheights + W_holes·holes + W_bump·bumpiness
//! ```
//!
//! - **lines cleared** - complete rows removed by the simulated clear
//! - **aggregate height** - sum of the column heights
//! - **holes** - empty cells with an occupied cell above them in the same column
//! - **bumpiness** - sum of absolute height differences between neighboring columns
//!
//! [`BoardAnalysis`] computes the terms lazily; [`FitnessEvaluator`] combines
//! them with [`FitnessWeights`]. The planner depends only on the
//! [`BoardEvaluator`] trait.

use std::{cell::OnceCell, fmt, iter};

use serde::{Deserialize, Serialize};

use crate::core::{Board, Cell};

/// Weights of the fitness terms.
///
/// Missing fields deserialize to their default values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub lines_cleared: f64,
    pub aggregate_height: f64,
    pub holes: f64,
    pub bumpiness: f64,
}

impl FitnessWeights {
    pub const DEFAULT: Self = Self {
        lines_cleared: 8.0,
        aggregate_height: -0.03,
        holes: -7.5,
        bumpiness: -0.1845,
    };

    /// Whether every weight is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.lines_cleared,
            self.aggregate_height,
            self.holes,
            self.bumpiness,
        ]
        .iter()
        .all(|w| w.is_finite())
    }
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Lazily computed metrics of a board after its complete rows are cleared.
#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    cleared_lines: usize,
    column_heights: OnceCell<Vec<usize>>,
    aggregate_height: OnceCell<usize>,
    max_height: OnceCell<usize>,
    num_holes: OnceCell<usize>,
    bumpiness: OnceCell<usize>,
}

impl BoardAnalysis {
    /// Clones `board`, clears its complete rows and prepares the metrics.
    ///
    /// The input board is left untouched.
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        let mut board = board.clone();
        let cleared_lines = board.clear_lines();
        Self {
            board,
            cleared_lines,
            column_heights: OnceCell::new(),
            aggregate_height: OnceCell::new(),
            max_height: OnceCell::new(),
            num_holes: OnceCell::new(),
            bumpiness: OnceCell::new(),
        }
    }

    /// The board after clearing.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of complete rows removed from the input board.
    #[must_use]
    pub fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    /// Height of each column after the clear, from left to right.
    #[must_use]
    pub fn column_heights(&self) -> &[usize] {
        self.column_heights
            .get_or_init(|| self.board.column_heights())
    }

    /// Sum of the column heights.
    #[must_use]
    pub fn aggregate_height(&self) -> usize {
        *self
            .aggregate_height
            .get_or_init(|| self.column_heights().iter().sum())
    }

    /// Height of the tallest column.
    #[must_use]
    pub fn max_height(&self) -> usize {
        *self
            .max_height
            .get_or_init(|| self.column_heights().iter().copied().max().unwrap_or(0))
    }

    /// Empty cells below the top of their column.
    #[must_use]
    pub fn num_holes(&self) -> usize {
        *self.num_holes.get_or_init(|| {
            let rows = self.board.rows();
            self.column_heights()
                .iter()
                .enumerate()
                .map(|(x, &h)| {
                    (rows - h..rows)
                        .filter(|&y| self.board.get(x, y).is_some_and(Cell::is_empty))
                        .count()
                })
                .sum()
        })
    }

    /// Sum of height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> usize {
        *self.bumpiness.get_or_init(|| {
            let h = self.column_heights();
            iter::zip(h, h.iter().skip(1))
                .map(|(a, b)| a.abs_diff(*b))
                .sum()
        })
    }
}

/// Scores a board; higher is better.
///
/// This is the seam the placement search is parameterized over.
pub trait BoardEvaluator: fmt::Debug + Send + Sync {
    fn evaluate(&self, board: &Board) -> f64;
}

/// The weighted four-term heuristic.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, BoardEvaluator as _, FitnessEvaluator};
///
/// let evaluator = FitnessEvaluator::default();
/// let flat = Board::from_ascii("....\n##..\n");
/// let holed = Board::from_ascii("##..\n.#..\n");
///
/// assert!(evaluator.evaluate(&flat) > evaluator.evaluate(&holed));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessEvaluator {
    weights: FitnessWeights,
}

impl FitnessEvaluator {
    #[must_use]
    pub const fn new(weights: FitnessWeights) -> Self {
        Self { weights }
    }

    /// The weights this evaluator applies.
    #[must_use]
    pub const fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Weighted sum of an already computed analysis.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn evaluate_analysis(&self, analysis: &BoardAnalysis) -> f64 {
        let w = &self.weights;
        w.lines_cleared * analysis.cleared_lines() as f64
            + w.aggregate_height * analysis.aggregate_height() as f64
            + w.holes * analysis.num_holes() as f64
            + w.bumpiness * analysis.bumpiness() as f64
    }
}

impl BoardEvaluator for FitnessEvaluator {
    fn evaluate(&self, board: &Board) -> f64 {
        self.evaluate_analysis(&BoardAnalysis::from_board(board))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_board_scores_zero() {
        let evaluator = FitnessEvaluator::default();
        assert_close(evaluator.evaluate(&Board::new(20, 10)), 0.0);
    }

    #[test]
    fn test_analysis_terms() {
        let board = Board::from_ascii(
            "
            .....
            .#...
            .#.#.
            #..##
            ",
        );
        let analysis = BoardAnalysis::from_board(&board);
        assert_eq!(analysis.cleared_lines(), 0);
        assert_eq!(analysis.column_heights(), &[1, 3, 0, 2, 1]);
        assert_eq!(analysis.aggregate_height(), 7);
        assert_eq!(analysis.max_height(), 3);
        assert_eq!(analysis.num_holes(), 1);
        assert_eq!(analysis.bumpiness(), 2 + 3 + 2 + 1);
    }

    #[test]
    fn test_analysis_clears_before_measuring() {
        let board = Board::from_ascii(
            "
            ....
            #...
            ####
            ",
        );
        let analysis = BoardAnalysis::from_board(&board);
        assert_eq!(analysis.cleared_lines(), 1);
        assert_eq!(analysis.column_heights(), &[1, 0, 0, 0]);
        // the input board is not modified
        assert_eq!(board.column_heights(), vec![2, 1, 1, 1]);

        let evaluator = FitnessEvaluator::default();
        assert_close(evaluator.evaluate(&board), 8.0 - 0.03 - 0.1845);
    }

    #[test]
    fn test_weighted_sum_uses_all_terms() {
        let weights = FitnessWeights {
            lines_cleared: 1.0,
            aggregate_height: 10.0,
            holes: 100.0,
            bumpiness: 1000.0,
        };
        let evaluator = FitnessEvaluator::new(weights);
        let board = Board::from_ascii(
            "
            #..
            ...
            ###
            ",
        );
        // one line cleared, then heights [2, 0, 0] with one hole
        assert_close(evaluator.evaluate(&board), 1.0 + 20.0 + 100.0 + 2000.0);
    }

    #[test]
    fn test_fitness_decreases_with_holes() {
        let evaluator = FitnessEvaluator::default();
        let mut board = Board::from_ascii(
            "
            ....
            ....
            ###.
            ###.
            ###.
            ###.
            ",
        );
        let heights = board.column_heights();
        let mut previous = evaluator.evaluate(&board);
        // Dig out cells under the roof: heights stay, holes grow by one each time
        for (holes, (x, y)) in [(0, 5), (1, 4), (2, 3), (0, 3)].into_iter().enumerate() {
            board.set(x, y, Cell::Empty);
            let analysis = BoardAnalysis::from_board(&board);
            assert_eq!(analysis.num_holes(), holes + 1);
            assert_eq!(analysis.column_heights(), heights.as_slice());

            let fitness = evaluator.evaluate(&board);
            assert_close(fitness, previous - 7.5);
            previous = fitness;
        }
    }

    #[test]
    fn test_weights_serde_defaults() {
        let weights: FitnessWeights = serde_json::from_str(r#"{"holes": -1.0}"#).unwrap();
        assert_close(weights.holes, -1.0);
        assert_close(weights.lines_cleared, 8.0);
        assert_close(weights.aggregate_height, -0.03);
        assert_close(weights.bumpiness, -0.1845);
        assert!(weights.is_finite());

        let weights = FitnessWeights {
            holes: f64::NAN,
            ..FitnessWeights::default()
        };
        assert!(!weights.is_finite());
    }
}
