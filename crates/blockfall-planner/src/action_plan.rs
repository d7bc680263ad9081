//! Turning a scored candidate into actions the engine will accept.
//!
//! The sequence is `SWAP` (when the next piece was chosen), `ROTATE` once per
//! turn, horizontal moves (`LEFT_2`/`RIGHT_2` while at least two columns
//! away, then `LEFT`/`RIGHT`) and a final `HARD_DROP`.
//!
//! Every action is executed through [`GameEngine::step`], which lets the
//! piece fall a row after each one. A sequence is only returned after it has
//! been replayed on a copy of the engine with exactly that timing and
//! brought the piece to the candidate's landing position.

use blockfall_engine::{Action, GameEngine, Position};

use crate::placement_search::Candidate;

/// Why a candidate's action sequence cannot be executed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InfeasibleError {
    #[display("{action} was rejected")]
    Rejected {
        #[error(not(source))]
        action: Action,
    },
    #[display("piece locked before the sequence finished (after {action})")]
    LockedEarly {
        #[error(not(source))]
        action: Action,
    },
    #[display("piece landed at {actual:?} instead of {expected:?}")]
    WrongLanding { expected: Position, actual: Position },
}

/// Builds and verifies the action sequence for `candidate`.
///
/// `engine` is cloned; the live game is not touched.
pub fn realize(
    engine: &GameEngine,
    candidate: &Candidate,
) -> Result<Vec<Action>, InfeasibleError> {
    let mut sim = engine.clone();
    let mut actions = Vec::new();

    if candidate.choice().is_next() {
        step(&mut sim, &mut actions, Action::Swap)?;
    }
    for _ in 0..candidate.rotation_count() {
        step(&mut sim, &mut actions, Action::Rotate)?;
    }

    // Swaps and rotations may have shifted the piece, so distances are
    // measured from where it actually is now
    loop {
        let distance = candidate.column() - sim.piece().position().x;
        let action = match distance {
            0 => break,
            d if d <= -2 => Action::Left2,
            -1 => Action::Left,
            1 => Action::Right,
            _ => Action::Right2,
        };
        let before = sim.piece().position().x;
        step(&mut sim, &mut actions, action)?;
        if sim.piece().position().x == before {
            return Err(InfeasibleError::Rejected { action });
        }
    }

    if !sim.apply_action(Action::HardDrop) {
        return Err(InfeasibleError::Rejected {
            action: Action::HardDrop,
        });
    }
    let placed = sim.piece();
    let expected = candidate.placement();
    if placed.kind() != expected.kind()
        || placed.rotation() != expected.rotation()
        || placed.position() != expected.position()
    {
        return Err(InfeasibleError::WrongLanding {
            expected: expected.position(),
            actual: placed.position(),
        });
    }
    actions.push(Action::HardDrop);
    Ok(actions)
}

/// Applies `action` followed by one row of gravity, requiring that the piece
/// is still falling afterwards.
fn step(
    sim: &mut GameEngine,
    actions: &mut Vec<Action>,
    action: Action,
) -> Result<(), InfeasibleError> {
    if !sim.apply_action(action) {
        return Err(InfeasibleError::Rejected { action });
    }
    if !sim.can_fall() {
        return Err(InfeasibleError::LockedEarly { action });
    }
    sim.drop_piece(false);
    actions.push(action);
    Ok(())
}
