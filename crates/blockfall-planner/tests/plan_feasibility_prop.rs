//! Executing a plan through the step interface places exactly the piece the
//! search scored, where it scored it.

use blockfall_engine::{GameEngine, PieceSeed};
use blockfall_planner::PlacementSearch;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn plans_land_where_predicted(bytes in any::<[u8; 16]>(), placements in 1..60_usize) {
        let mut engine = GameEngine::with_seed(PieceSeed::from_bytes(bytes));
        let search = PlacementSearch::default();

        for _ in 0..placements {
            let Some(plan) = search.plan(&engine) else {
                break;
            };
            let mut expected = engine.board().with_piece(&plan.candidate().placement());
            let cleared = expected.clear_lines();
            let pieces = engine.stats().completed_pieces();
            let lines = engine.stats().total_cleared_lines();

            let (last, init) = plan.actions().split_last().unwrap();
            for &action in init {
                let outcome = engine.step(action);
                prop_assert!(outcome.action_applied, "{action} rejected");
                prop_assert_eq!(engine.stats().completed_pieces(), pieces);
            }
            prop_assert!(engine.step(*last).action_applied);

            prop_assert_eq!(engine.stats().completed_pieces(), pieces + 1);
            prop_assert_eq!(engine.stats().total_cleared_lines(), lines + cleared);
            prop_assert_eq!(engine.board(), &expected);
            if engine.state().is_game_over() {
                break;
            }
        }
    }

    #[test]
    fn planning_is_deterministic(bytes in any::<[u8; 16]>()) {
        let engine = GameEngine::with_seed(PieceSeed::from_bytes(bytes));
        let search = PlacementSearch::default();
        prop_assert_eq!(search.plan(&engine), search.plan(&engine));
    }
}
