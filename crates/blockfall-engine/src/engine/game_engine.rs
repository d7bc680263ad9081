use rand::Rng as _;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::{ConfigError, EngineConfig},
    core::{Board, Piece, PieceKind, PieceRotation, PieceShape, Position, to_coord},
    fitness::{BoardEvaluator as _, FitnessEvaluator},
};

use super::{
    game_stats::GameStats,
    piece_bank::{PieceBank, PieceSeed},
    score_listeners::{ListenerId, ScoreChange, ScoreListeners},
    step::Observation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
pub enum GameState {
    Active,
    Paused,
    GameOver,
}

/// Best score and best line count over the games played by one engine.
///
/// The two records are tracked independently and never decrease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BestRecord {
    pub score: f64,
    pub lines: usize,
}

impl BestRecord {
    #[must_use]
    fn merged(self, stats: &GameStats) -> Self {
        Self {
            score: self.score.max(stats.score()),
            lines: self.lines.max(stats.total_cleared_lines()),
        }
    }
}

/// The rules of the game applied to a board, an active piece and a bank of
/// upcoming pieces.
///
/// Every mutating operation returns whether it was applied. A rejected move
/// leaves the engine unchanged; nothing inside the simulation is an error.
/// Operations are ignored unless the engine is [`GameState::Active`].
///
/// Cloning an engine gives a detached snapshot sharing no state with the
/// original (score listeners are not cloned).
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: EngineConfig,
    evaluator: FitnessEvaluator,
    board: Board,
    piece: Piece,
    bank: PieceBank,
    state: GameState,
    stats: GameStats,
    best: BestRecord,
    fitness: f64,
    reward_baseline: f64,
    listeners: ScoreListeners,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine {
    /// Creates an engine with the default configuration and a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let config = EngineConfig::default();
        let board = Board::new(config.rows, config.cols);
        Self::build(config, PieceBank::with_seed(seed), board)
    }

    /// Creates an engine after validating `config`.
    pub fn with_config(config: EngineConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.rows, config.cols);
        Ok(Self::build(config, PieceBank::with_seed(seed), board))
    }

    /// Starts a game on a prefilled board.
    ///
    /// The board's dimensions replace the configured ones. If the first piece
    /// cannot spawn, the engine starts in [`GameState::GameOver`].
    pub fn with_board(
        mut config: EngineConfig,
        seed: PieceSeed,
        board: Board,
    ) -> Result<Self, ConfigError> {
        config.rows = board.rows();
        config.cols = board.cols();
        config.validate()?;
        Ok(Self::build(config, PieceBank::with_seed(seed), board))
    }

    fn build(config: EngineConfig, mut bank: PieceBank, board: Board) -> Self {
        let evaluator = FitnessEvaluator::new(config.weights);
        let fitness = if config.fitness_enabled() {
            evaluator.evaluate(&board)
        } else {
            0.0
        };
        let piece = Piece::spawn(bank.pop(), board.cols());
        let state = if board.collides_piece(&piece) {
            GameState::GameOver
        } else {
            GameState::Active
        };
        let mut this = Self {
            config,
            evaluator,
            board,
            piece,
            bank,
            state,
            stats: GameStats::new(),
            best: BestRecord::default(),
            fitness,
            reward_baseline: 0.0,
            listeners: ScoreListeners::new(),
        };
        this.reward_baseline = this.reward_source();
        this
    }

    /// The validated configuration this engine runs with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The board evaluator built from the configured weights.
    #[must_use]
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    /// The locked cells, without the active piece.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The piece under control.
    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    /// Kind of the piece that spawns after the current one locks.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.bank.peek()
    }

    /// The upcoming pieces.
    #[must_use]
    pub fn bank(&self) -> &PieceBank {
        &self.bank
    }

    /// Whether the game is running, paused or over.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Counters of the game in progress.
    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Shorthand for `stats().score()`.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.stats.score()
    }

    /// Fitness of the board as of the most recent lock.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Best records including the game in progress.
    #[must_use]
    pub fn best_record(&self) -> BestRecord {
        self.best.merged(&self.stats)
    }

    /// Gravity interval in milliseconds for the current score.
    ///
    /// See [`EngineConfig::drop_interval_ms`].
    #[must_use]
    pub fn drop_interval_ms(&self) -> u32 {
        self.config.drop_interval_ms(self.stats.score())
    }

    /// A copy of the board with the active piece drawn on it.
    #[must_use]
    pub fn board_with_piece(&self) -> Board {
        self.board.with_piece(&self.piece)
    }

    /// Where the active piece would land if hard-dropped now.
    #[must_use]
    pub fn ghost_position(&self) -> Position {
        let position = self.piece.position();
        Position::new(
            position.x,
            self.board.landing_row(&self.piece.shape(), position),
        )
    }

    /// Whether the active piece can move one row down without locking.
    #[must_use]
    pub fn can_fall(&self) -> bool {
        let position = self.piece.position();
        !self
            .board
            .collides(&self.piece.shape(), Position::new(position.x, position.y + 1))
    }

    /// Registers `listener` to be called after every lock that clears rows.
    pub fn subscribe_score_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(ScoreChange) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn max_x(&self, shape: &PieceShape) -> i32 {
        to_coord(self.board.cols().saturating_sub(shape.width()))
    }

    fn try_set_piece(&mut self, piece: Piece) -> bool {
        if self.board.collides_piece(&piece) {
            return false;
        }
        self.piece = piece;
        true
    }

    /// Replaces the active piece, e.g. to set up a position in tests.
    ///
    /// Rejected if the piece collides or the engine is not active.
    pub fn set_piece(&mut self, piece: Piece) -> bool {
        self.state.is_active() && self.try_set_piece(piece)
    }

    /// Moves the active piece `delta` columns, clamped to the board.
    ///
    /// Rejected if the clamped position collides.
    pub fn move_piece(&mut self, delta: i32) -> bool {
        if !self.state.is_active() {
            return false;
        }
        let max_x = self.max_x(&self.piece.shape());
        let x = (self.piece.position().x + delta).clamp(0, max_x);
        self.try_set_piece(self.piece.with_x(x))
    }

    /// Turns the active piece clockwise.
    ///
    /// A piece that would stick out past the right wall is pushed left first.
    pub fn rotate(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        let rotated = self.piece.rotated();
        let x = self.piece.position().x.min(self.max_x(&rotated.shape()));
        self.try_set_piece(rotated.with_x(x))
    }

    /// Exchanges the active piece with the next one in the bank.
    ///
    /// The incoming piece takes its canonical orientation at the current row,
    /// with the column clamped to the board. The outgoing kind goes back to
    /// the front of the bank.
    pub fn swap(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        let kind = self.bank.peek();
        let position = self.piece.position();
        let x = position.x.clamp(0, self.max_x(&kind.canonical_shape()));
        let incoming = Piece::new(kind, PieceRotation::default(), Position::new(x, position.y));
        if self.board.collides_piece(&incoming) {
            return false;
        }
        let outgoing = self.piece.kind();
        self.bank.pop();
        self.bank.push_front(outgoing);
        self.piece = incoming;
        debug!(%outgoing, incoming = %kind, "swapped piece");
        true
    }

    /// Moves the active piece down one row, or to its landing row if
    /// `instant`.
    ///
    /// When the piece cannot move down it locks in place: its cells are
    /// written to the board, complete rows are cleared and scored, and the
    /// next piece spawns. A hard drop therefore only moves the piece; the
    /// following drop locks it.
    pub fn drop_piece(&mut self, instant: bool) -> bool {
        if !self.state.is_active() {
            return false;
        }
        let shape = self.piece.shape();
        let position = self.piece.position();
        let target_y = if instant {
            self.board.landing_row(&shape, position)
        } else {
            position.y + 1
        };
        if self.board.collides(&shape, Position::new(position.x, target_y)) {
            self.lock_piece();
        } else if target_y > position.y {
            self.piece = self.piece.with_y(target_y);
            self.stats.add_step_gain(self.config.step_score_gain);
        }
        true
    }

    fn lock_piece(&mut self) {
        self.board.fill_piece(&self.piece);
        if self.config.fitness_enabled() {
            self.fitness = self.evaluator.evaluate(&self.board);
        }
        let cleared = self.board.clear_lines();
        let old_score = self.stats.score();
        let bonus = self.config.line_clear_bonus(cleared);
        self.stats.complete_piece_drop(cleared, bonus);
        if cleared > 0 {
            let new_score = self.stats.score();
            info!(rows = cleared, bonus, score = new_score, "cleared rows");
            self.listeners.notify(ScoreChange {
                old_score,
                new_score,
            });
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let kind = self.bank.pop();
        self.piece = Piece::spawn(kind, self.board.cols());
        if self.board.collides_piece(&self.piece) {
            self.state = GameState::GameOver;
            info!(
                score = self.stats.score(),
                lines = self.stats.total_cleared_lines(),
                pieces = self.stats.completed_pieces(),
                "game over"
            );
        } else {
            debug!(%kind, "spawned piece");
        }
    }

    /// Switches between active and paused. A finished game stays over.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Active => GameState::Paused,
            GameState::Paused => GameState::Active,
            GameState::GameOver => GameState::GameOver,
        };
    }

    /// Starts a new game on an empty board.
    ///
    /// The finished game's score and lines are folded into the best records
    /// first. The bank starts a fresh bag but its random generator continues.
    /// Returns the new game's first [`Observation`].
    pub fn reset(&mut self) -> Observation {
        self.best = self.best_record();
        debug!(
            best_score = self.best.score,
            best_lines = self.best.lines,
            "reset game"
        );
        self.board = Board::new(self.config.rows, self.config.cols);
        self.stats = GameStats::new();
        self.fitness = 0.0;
        self.bank.reset();
        self.state = GameState::Active;
        self.spawn_next();
        self.reward_baseline = self.reward_source();
        self.observe()
    }

    /// Current value of the quantity rewards are measured in.
    fn reward_source(&self) -> f64 {
        if self.config.reward_mode.is_fitness() {
            self.fitness
        } else {
            self.stats.score()
        }
    }

    /// Returns the change of the reward quantity since the previous call.
    pub(super) fn take_reward(&mut self) -> f64 {
        let current = self.reward_source();
        let reward = current - self.reward_baseline;
        self.reward_baseline = current;
        reward
    }
}
