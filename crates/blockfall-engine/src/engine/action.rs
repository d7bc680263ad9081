use serde::{Deserialize, Serialize};

/// One input to the step interface.
///
/// The integer codes are stable and are what agents exchange:
///
/// | code | action |
/// |---|---|
/// | 0 | `NOTHING` |
/// | 1 | `LEFT` |
/// | 2 | `RIGHT` |
/// | 3 | `LEFT_2` |
/// | 4 | `RIGHT_2` |
/// | 5 | `ROTATE` |
/// | 6 | `SWAP` |
/// | 7 | `SOFT_DROP` |
/// | 8 | `HARD_DROP` |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Action {
    #[display("NOTHING")]
    Nothing = 0,
    #[display("LEFT")]
    Left = 1,
    #[display("RIGHT")]
    Right = 2,
    #[display("LEFT_2")]
    #[serde(rename = "LEFT_2")]
    Left2 = 3,
    #[display("RIGHT_2")]
    #[serde(rename = "RIGHT_2")]
    Right2 = 4,
    #[display("ROTATE")]
    Rotate = 5,
    #[display("SWAP")]
    Swap = 6,
    #[display("SOFT_DROP")]
    SoftDrop = 7,
    #[display("HARD_DROP")]
    HardDrop = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown action code: {code}")]
pub struct UnknownActionError {
    #[error(not(source))]
    code: u8,
}

impl Action {
    pub const LEN: usize = 9;

    pub const ALL: [Action; Self::LEN] = [
        Action::Nothing,
        Action::Left,
        Action::Right,
        Action::Left2,
        Action::Right2,
        Action::Rotate,
        Action::Swap,
        Action::SoftDrop,
        Action::HardDrop,
    ];

    /// Numeric action code, `0..=8`.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Action {
    type Error = UnknownActionError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(UnknownActionError { code })
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> Self {
        action.code()
    }
}
