use serde::{Deserialize, Serialize};

use crate::{core::MAX_SHAPE_SIZE, fitness::FitnessWeights};

/// Which quantity the step interface reports as reward.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum RewardMode {
    /// Score gained since the previous step.
    #[default]
    #[display("score")]
    Score,
    /// Fitness change since the previous step.
    #[display("fitness")]
    Fitness,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least {min}x{min}, got {rows}x{cols}")]
    BoardTooSmall { rows: usize, cols: usize, min: usize },
    #[display("score_base must be at least 1")]
    ZeroScoreBase,
    #[display("fitness weights must be finite")]
    NonFiniteWeight,
    #[display("step_score_gain must be finite and non-negative, got {_0}")]
    InvalidStepGain(#[error(not(source))] f64),
    #[display("speed_scale must be finite and non-negative, got {_0}")]
    InvalidSpeedScale(#[error(not(source))] f64),
}

/// Every tunable of the engine.
///
/// Missing fields deserialize to their default values, so a config file only
/// needs to name what it changes:
///
/// ```
/// use blockfall_engine::{EngineConfig, RewardMode};
///
/// let config: EngineConfig = serde_json::from_str(r#"{"cols": 8, "reward_mode": "fitness"}"#).unwrap();
/// assert_eq!((config.rows, config.cols), (20, 8));
/// assert_eq!(config.reward_mode, RewardMode::Fitness);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rows: usize,
    pub cols: usize,
    /// Base of the line-clear bonus: clearing `n > 0` rows at once adds
    /// `score_base ^ n`.
    pub score_base: u32,
    /// Score added whenever the piece moves down a row without locking.
    pub step_score_gain: f64,
    pub weights: FitnessWeights,
    pub reward_mode: RewardMode,
    /// Recompute fitness on every lock. Forced on by [`RewardMode::Fitness`].
    pub track_fitness: bool,
    /// Gravity interval in milliseconds at score 0.
    pub speed_default_ms: u32,
    /// Shorten the gravity interval as the score grows.
    pub speed_scale_enabled: bool,
    /// Milliseconds taken off the interval per point of score.
    pub speed_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 10,
            score_base: 5,
            step_score_gain: 0.0,
            weights: FitnessWeights::default(),
            reward_mode: RewardMode::default(),
            track_fitness: true,
            speed_default_ms: 750,
            speed_scale_enabled: true,
            speed_scale: 0.05,
        }
    }
}

impl EngineConfig {
    /// Smallest board side every piece fits on in every rotation.
    pub const MIN_BOARD_SIZE: usize = MAX_SHAPE_SIZE;

    /// Floor of the scaled gravity interval.
    pub const MIN_DROP_INTERVAL_MS: u32 = 50;

    /// Checks that the board is large enough and every number is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = Self::MIN_BOARD_SIZE;
        if self.rows < min || self.cols < min {
            return Err(ConfigError::BoardTooSmall {
                rows: self.rows,
                cols: self.cols,
                min,
            });
        }
        if self.score_base == 0 {
            return Err(ConfigError::ZeroScoreBase);
        }
        if !self.weights.is_finite() {
            return Err(ConfigError::NonFiniteWeight);
        }
        if !self.step_score_gain.is_finite() || self.step_score_gain < 0.0 {
            return Err(ConfigError::InvalidStepGain(self.step_score_gain));
        }
        if !self.speed_scale.is_finite() || self.speed_scale < 0.0 {
            return Err(ConfigError::InvalidSpeedScale(self.speed_scale));
        }
        Ok(())
    }

    /// Whether fitness is recomputed when a piece locks.
    #[must_use]
    pub fn fitness_enabled(&self) -> bool {
        self.track_fitness || self.reward_mode.is_fitness()
    }

    /// Score bonus for clearing `rows` rows with one lock.
    #[must_use]
    pub fn line_clear_bonus(&self, rows: usize) -> f64 {
        if rows == 0 {
            return 0.0;
        }
        let exp = i32::try_from(rows).unwrap_or(i32::MAX);
        f64::from(self.score_base).powi(exp)
    }

    /// Milliseconds between gravity ticks at `score`.
    ///
    /// The engine itself is tick-driven; a real-time driver uses this to pace
    /// its calls to [`GameEngine::step`](crate::GameEngine::step). With
    /// scaling enabled the interval is `speed_default_ms - score *
    /// speed_scale`, truncated and never below
    /// [`MIN_DROP_INTERVAL_MS`](Self::MIN_DROP_INTERVAL_MS).
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn drop_interval_ms(&self, score: f64) -> u32 {
        if !self.speed_scale_enabled {
            return self.speed_default_ms;
        }
        let scaled = f64::from(self.speed_default_ms) - score * self.speed_scale;
        // saturating cast; the floor keeps it positive
        scaled.max(f64::from(Self::MIN_DROP_INTERVAL_MS)) as u32
    }
}
