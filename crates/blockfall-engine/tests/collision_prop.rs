//! Property tests for the grid model against brute-force checks.

use blockfall_engine::{Board, PieceKind, PieceRotation, Position};
use proptest::prelude::*;

/// Boards of 4..12 rows and columns with cells biased towards empty.
fn arb_board() -> impl Strategy<Value = Board> {
    (4usize..12, 4usize..12).prop_flat_map(|(rows, cols)| {
        let cell = prop_oneof![3 => Just(0u8), 2 => 1u8..=7];
        proptest::collection::vec(cell, rows * cols).prop_map(move |codes| {
            let rows: Vec<&[u8]> = codes.chunks(cols).collect();
            Board::from_codes(&rows).unwrap()
        })
    })
}

fn arb_kind() -> impl Strategy<Value = PieceKind> {
    proptest::sample::select(PieceKind::ALL.to_vec())
}

fn brute_force_collides(board: &Board, codes: &[Vec<u8>], position: Position) -> bool {
    let rows = board.to_codes();
    for (dy, row) in codes.iter().enumerate() {
        for (dx, &code) in row.iter().enumerate() {
            if code == 0 {
                continue;
            }
            let x = i64::from(position.x) + i64::try_from(dx).unwrap();
            let y = i64::from(position.y) + i64::try_from(dy).unwrap();
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                return true;
            };
            match rows.get(y).and_then(|row| row.get(x)) {
                Some(&cell) if cell == 0 => {}
                _ => return true,
            }
        }
    }
    false
}

proptest! {
    #[test]
    fn collides_matches_brute_force(
        board in arb_board(),
        kind in arb_kind(),
        turns in 0u8..4,
        dx in -4i32..16,
        dy in -4i32..16,
    ) {
        let shape = kind.shape(PieceRotation::new(turns));
        let position = Position::new(dx, dy);
        prop_assert_eq!(
            board.collides(&shape, position),
            brute_force_collides(&board, &shape.to_codes(), position)
        );
    }

    #[test]
    fn rotation_keeps_cell_count_and_swaps_dimensions(kind in arb_kind(), turns in 0u8..4) {
        let shape = kind.shape(PieceRotation::new(turns));
        let rotated = shape.rotated();
        prop_assert_eq!(rotated.width(), shape.height());
        prop_assert_eq!(rotated.height(), shape.width());
        prop_assert_eq!(rotated.occupied_cells().count(), 4);
        prop_assert_eq!(rotated, kind.shape(PieceRotation::new(turns + 1)));
    }

    #[test]
    fn clear_lines_removes_exactly_the_full_rows(board in arb_board()) {
        let before = board.to_codes();
        let full = before.iter().filter(|row| row.iter().all(|&c| c != 0)).count();
        let kept: Vec<_> = before.iter().filter(|row| row.iter().any(|&c| c == 0)).cloned().collect();

        let mut cleared = board.clone();
        prop_assert_eq!(cleared.clear_lines(), full);

        let after = cleared.to_codes();
        prop_assert_eq!(after.len(), before.len());
        prop_assert!(after[..full].iter().flatten().all(|&c| c == 0));
        prop_assert_eq!(&after[full..], kept.as_slice());
    }

    #[test]
    fn landing_row_is_deepest_free_row(
        board in arb_board(),
        kind in arb_kind(),
        turns in 0u8..4,
        x in 0i32..12,
    ) {
        let shape = kind.shape(PieceRotation::new(turns));
        let start = Position::new(x, 0);
        prop_assume!(!board.collides(&shape, start));

        let landing = board.landing_row(&shape, start);
        prop_assert!(landing >= 0);
        prop_assert!(!board.collides(&shape, Position::new(x, landing)));
        prop_assert!(board.collides(&shape, Position::new(x, landing + 1)));
    }
}
