use serde::Serialize;

use crate::core::{Board, PieceKind};

use super::{action::Action, game_engine::GameEngine};

/// What an agent observes after one [`GameEngine::step`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// The locked cells with the active piece drawn on a copy.
    pub board: Board,
    /// Change of the configured reward quantity since the previous step.
    pub reward: f64,
    /// The game is over.
    pub done: bool,
    pub next_piece: PieceKind,
    /// Whether the action itself was accepted. Gravity applies either way.
    pub action_applied: bool,
}

impl StepOutcome {
    /// The board as rows of `0`/`1` occupancy flags.
    #[must_use]
    pub fn occupancy(&self) -> Vec<Vec<u8>> {
        self.board.to_occupancy()
    }
}

/// The game as an agent sees it, taken without advancing the engine.
///
/// Returned by [`GameEngine::observe`] and [`GameEngine::reset`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// The locked cells with the active piece drawn on a copy.
    pub board: Board,
    pub next_piece: PieceKind,
    pub done: bool,
}

impl Observation {
    /// The board as rows of `0`/`1` occupancy flags.
    #[must_use]
    pub fn occupancy(&self) -> Vec<Vec<u8>> {
        self.board.to_occupancy()
    }
}

impl GameEngine {
    /// The current board, next piece and game-over flag. Nothing moves.
    #[must_use]
    pub fn observe(&self) -> Observation {
        Observation {
            board: self.board_with_piece(),
            next_piece: self.next_piece(),
            done: self.state().is_game_over(),
        }
    }

    /// Number of cells in an observed board, `rows * cols`.
    #[must_use]
    pub fn observation_size(&self) -> usize {
        self.board().rows() * self.board().cols()
    }

    /// Applies `action` without advancing gravity.
    ///
    /// [`Action::Nothing`] is always accepted.
    pub fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Nothing => self.state().is_active(),
            Action::Left => self.move_piece(-1),
            Action::Right => self.move_piece(1),
            Action::Left2 => self.move_piece(-2),
            Action::Right2 => self.move_piece(2),
            Action::Rotate => self.rotate(),
            Action::Swap => self.swap(),
            Action::SoftDrop => self.drop_piece(false),
            Action::HardDrop => self.drop_piece(true),
        }
    }

    /// Advances the game by one tick: applies `action`, then moves the piece
    /// down one row (locking it if it cannot fall).
    ///
    /// When the game is paused or over nothing happens and the reward is 0.
    ///
    /// # Example
    ///
    /// ```
    /// use blockfall_engine::{Action, GameEngine, PieceSeed};
    ///
    /// let mut engine = GameEngine::with_seed(PieceSeed::default());
    /// let x = engine.piece().position().x;
    ///
    /// let outcome = engine.step(Action::Left);
    /// assert!(outcome.action_applied);
    /// assert_eq!(engine.piece().position().x, x - 1);
    /// assert_eq!(engine.piece().position().y, 1);
    /// ```
    pub fn step(&mut self, action: Action) -> StepOutcome {
        let action_applied = if self.state().is_active() {
            let applied = self.apply_action(action);
            self.drop_piece(false);
            applied
        } else {
            false
        };
        StepOutcome {
            board: self.board_with_piece(),
            reward: self.take_reward(),
            done: self.state().is_game_over(),
            next_piece: self.next_piece(),
            action_applied,
        }
    }
}
