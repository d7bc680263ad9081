//! Exhaustive search over the final positions of the active and next piece.
//!
//! # Enumeration
//!
//! For each piece choice (the active piece, then the next piece reached by a
//! swap), each of the four rotations and each column where the rotated shape
//! fits inside the board, the shape is tested at the active piece's current
//! row. If it does not collide there, it is hard-dropped from that row and
//! the resulting board is scored.
//!
//! Rotations are counted from the active piece's current orientation, and
//! from the canonical orientation for the next piece, which is how the piece
//! enters play after a swap.
//!
//! # Selection
//!
//! The highest score wins; on ties the candidate enumerated first is kept.
//! Whether the chosen position is actually reachable is checked afterwards
//! by [`action_plan::realize`](crate::action_plan::realize).

use arrayvec::ArrayVec;
use blockfall_engine::{
    Action, Board, BoardEvaluator, FitnessEvaluator, GameEngine, Piece, PieceKind,
    PieceRotation, Position,
};
use tracing::{debug, trace};

use crate::action_plan;

/// Which piece a candidate places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum PieceChoice {
    /// The piece under control.
    #[display("current")]
    Current,
    /// The next piece from the bank, brought in with a swap.
    #[display("next")]
    Next,
}

/// A scored final position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    choice: PieceChoice,
    rotation_count: u8,
    placement: Piece,
    fitness: f64,
}

impl Candidate {
    /// Whether the candidate plays the current piece or swaps first.
    #[must_use]
    pub fn choice(&self) -> PieceChoice {
        self.choice
    }

    /// Clockwise turns to apply after the optional swap (0-3).
    #[must_use]
    pub fn rotation_count(&self) -> u8 {
        self.rotation_count
    }

    /// The piece at its landing position.
    #[must_use]
    pub fn placement(&self) -> Piece {
        self.placement
    }

    /// Target column of the bounding box's left edge.
    #[must_use]
    pub fn column(&self) -> i32 {
        self.placement.position().x
    }

    /// Where the piece comes to rest when dropped at [`Candidate::column`].
    #[must_use]
    pub fn landing(&self) -> Position {
        self.placement.position()
    }

    /// Fitness of the board after the piece locks there.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
}

/// A candidate together with the actions that realize it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPlan {
    candidate: Candidate,
    actions: Vec<Action>,
}

impl PlacementPlan {
    /// The placement this plan reaches.
    #[must_use]
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// Actions to feed to [`GameEngine::step`], one per step, ending with
    /// [`Action::HardDrop`].
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

/// Scores every reachable-looking final position of the active and next
/// piece and turns the best one into actions.
#[derive(Debug)]
pub struct PlacementSearch<'a> {
    evaluator: Box<dyn BoardEvaluator + 'a>,
}

impl Default for PlacementSearch<'_> {
    fn default() -> Self {
        Self::new(Box::new(FitnessEvaluator::default()))
    }
}

impl<'a> PlacementSearch<'a> {
    #[must_use]
    pub fn new(evaluator: Box<dyn BoardEvaluator + 'a>) -> Self {
        Self { evaluator }
    }

    /// Lists the legal candidates in enumeration order: choice, then
    /// rotation count, then column.
    #[must_use]
    pub fn candidates(&self, board: &Board, piece: &Piece, next: PieceKind) -> Vec<Candidate> {
        let row = piece.position().y;
        let mut candidates = Vec::new();
        for (choice, start) in choices(piece, next) {
            let mut oriented = start;
            for rotation_count in 0..4 {
                let shape = oriented.shape();
                if let Some(max_x) = board.cols().checked_sub(shape.width()) {
                    for x in 0..=i32::try_from(max_x).unwrap_or(i32::MAX) {
                        let position = Position::new(x, row);
                        if board.collides(&shape, position) {
                            continue;
                        }
                        let landing = Position::new(x, board.landing_row(&shape, position));
                        let placement = oriented.with_position(landing);
                        let fitness = self.evaluator.evaluate(&board.with_piece(&placement));
                        candidates.push(Candidate {
                            choice,
                            rotation_count,
                            placement,
                            fitness,
                        });
                    }
                }
                oriented = oriented.rotated();
            }
        }
        candidates
    }

    /// Returns the highest-scoring candidate, keeping the first on ties.
    #[must_use]
    pub fn best_candidate(&self, board: &Board, piece: &Piece, next: PieceKind) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for candidate in self.candidates(board, piece, next) {
            if best.is_none_or(|b| candidate.fitness > b.fitness) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Picks the best candidate whose action sequence replays cleanly on a
    /// copy of `engine`.
    ///
    /// Returns `None` when the engine is not active or no candidate can be
    /// realized.
    #[must_use]
    pub fn plan(&self, engine: &GameEngine) -> Option<PlacementPlan> {
        if !engine.state().is_active() {
            return None;
        }
        let mut candidates = self.candidates(engine.board(), engine.piece(), engine.next_piece());
        // stable: equal scores keep enumeration order
        candidates.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        for candidate in candidates {
            match action_plan::realize(engine, &candidate) {
                Ok(actions) => {
                    debug!(
                        choice = %candidate.choice,
                        rotations = candidate.rotation_count,
                        column = candidate.column(),
                        fitness = candidate.fitness,
                        actions = actions.len(),
                        "planned placement"
                    );
                    return Some(PlacementPlan { candidate, actions });
                }
                Err(err) => {
                    trace!(
                        choice = %candidate.choice,
                        rotations = candidate.rotation_count,
                        column = candidate.column(),
                        %err,
                        "discarded candidate"
                    );
                }
            }
        }
        debug!("no realizable placement");
        None
    }

    /// Actions for the next placement; empty means there is nothing to do.
    #[must_use]
    pub fn next_actions(&self, engine: &GameEngine) -> Vec<Action> {
        self.plan(engine)
            .map(PlacementPlan::into_actions)
            .unwrap_or_default()
    }
}

fn choices(piece: &Piece, next: PieceKind) -> ArrayVec<(PieceChoice, Piece), 2> {
    let incoming = Piece::new(next, PieceRotation::default(), piece.position());
    [(PieceChoice::Current, *piece), (PieceChoice::Next, incoming)].into()
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{EngineConfig, PieceSeed};

    use super::*;

    /// Independent scan over every kind, rotation and column.
    ///
    /// Returns the first best `(swapped, turns, column)` in scan order and its
    /// fitness.
    fn brute_force_best(
        board: &Board,
        piece: &Piece,
        next: PieceKind,
    ) -> ((bool, u8, i32), f64) {
        let evaluator = FitnessEvaluator::default();
        let mut best = ((false, 0, 0), f64::NEG_INFINITY);
        let starts = [
            *piece,
            Piece::new(next, PieceRotation::default(), piece.position()),
        ];
        for (swapped, start) in [false, true].into_iter().zip(starts) {
            for turns in 0..4 {
                let rotation = PieceRotation::new(start.rotation().quarter_turns() + turns);
                let shape = start.kind().shape(rotation);
                for x in -2..12 {
                    let position = Position::new(x, piece.position().y);
                    if board.collides(&shape, position) {
                        continue;
                    }
                    let y = board.landing_row(&shape, position);
                    let placed = Piece::new(start.kind(), rotation, Position::new(x, y));
                    let fitness = evaluator.evaluate(&board.with_piece(&placed));
                    if fitness > best.1 {
                        best = ((swapped, turns, x), fitness);
                    }
                }
            }
        }
        best
    }

    fn sample_board() -> Board {
        Board::from_ascii(
            "
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ..........
            ....#.....
            ##..##..#.
            ###.###.##
            ",
        )
    }

    #[test]
    fn test_best_candidate_matches_brute_force() {
        let board = sample_board();
        let search = PlacementSearch::default();
        for current in PieceKind::ALL {
            for next in PieceKind::ALL {
                let piece = Piece::spawn(current, board.cols());
                let best = search.best_candidate(&board, &piece, next).unwrap();
                let (key, expected) = brute_force_best(&board, &piece, next);
                assert!(
                    (best.fitness() - expected).abs() < 1e-9,
                    "{current} / {next}: {} != {expected}",
                    best.fitness()
                );
                assert_eq!(
                    (best.choice().is_next(), best.rotation_count(), best.column()),
                    key,
                    "{current} / {next}"
                );
            }
        }
    }

    #[test]
    fn test_candidates_in_enumeration_order() {
        let board = Board::new(20, 10);
        let search = PlacementSearch::default();
        let piece = Piece::spawn(PieceKind::T, 10);
        let candidates = search.candidates(&board, &piece, PieceKind::Cube);

        // T: widths 3, 2, 3, 2 -> 8 + 9 + 8 + 9 columns; cube: 9 columns x 4
        assert_eq!(candidates.len(), 34 + 36);
        let keys: Vec<_> = candidates
            .iter()
            .map(|c| (c.choice().is_next(), c.rotation_count(), c.column()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert!(candidates.iter().all(|c| c.landing().y > 0));
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let board = Board::new(20, 10);
        let search = PlacementSearch::default();
        let piece = Piece::spawn(PieceKind::Cube, 10);
        let candidates = search.candidates(&board, &piece, PieceKind::Cube);
        let best = search.best_candidate(&board, &piece, PieceKind::Cube).unwrap();
        let first_max = candidates
            .iter()
            .find(|c| c.fitness() >= best.fitness())
            .unwrap();
        assert_eq!(*first_max, best);
        assert!(best.choice().is_current());
        assert_eq!(best.rotation_count(), 0);
    }

    #[test]
    fn test_colliding_positions_are_skipped() {
        let board = Board::from_ascii(
            "
            ......
            ###...
            ###...
            ###...
            ",
        );
        let search = PlacementSearch::default();
        let piece = Piece::new(PieceKind::Cube, PieceRotation::default(), Position::new(3, 1));
        let candidates = search.candidates(&board, &piece, PieceKind::Cube);
        assert!(candidates.iter().all(|c| c.column() >= 3));
        assert!(!candidates.is_empty());
    }

    fn well_board() -> Board {
        Board::from_ascii(
            "
            ......
            ......
            ......
            ......
            ......
            ......
            ......
            ......
            #####.
            #####.
            #####.
            #####.
            ",
        )
    }

    #[test]
    fn test_swaps_in_line_for_well() {
        let board = well_board();
        let config = EngineConfig::default();
        let mut engine = (0..=u8::MAX)
            .map(|b| {
                GameEngine::with_board(config.clone(), PieceSeed::from_bytes([b; 16]), board.clone())
                    .unwrap()
            })
            .find(|engine| engine.next_piece() == PieceKind::Line)
            .unwrap();
        assert!(engine.set_piece(Piece::spawn(PieceKind::Cube, board.cols())));

        let search = PlacementSearch::default();
        let plan = search.plan(&engine).unwrap();
        let candidate = plan.candidate();
        assert!(candidate.choice().is_next());
        assert_eq!(candidate.rotation_count(), 1);
        assert_eq!(candidate.landing(), Position::new(5, 8));
        assert!((candidate.fitness() - 32.0).abs() < 1e-9);
        assert_eq!(
            plan.actions(),
            [
                Action::Swap,
                Action::Rotate,
                Action::Right2,
                Action::Right,
                Action::HardDrop
            ]
        );

        for &action in plan.actions() {
            assert!(engine.step(action).action_applied);
        }
        assert_eq!(engine.stats().total_cleared_lines(), 4);
        assert!(engine.board().is_empty());
    }

    #[test]
    fn test_no_plan_when_game_over() {
        let mut engine = GameEngine::with_seed(PieceSeed::default());
        while !engine.state().is_game_over() {
            engine.step(Action::HardDrop);
        }
        let search = PlacementSearch::default();
        assert!(search.plan(&engine).is_none());
        assert!(search.next_actions(&engine).is_empty());
    }
}
