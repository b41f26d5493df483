//! Property tests for board, movement and match invariants
//!
//! Boards are generated with random dimensions (1..=6 per side) and random
//! occupancy drawn from the four lowest tile values, so equal neighbours and
//! overlapping runs show up often.

use proptest::prelude::*;
use rustc_hash::FxHashMap;

use trimerge_core::{
    apply_moves, compute_matches, directional_matches, resolve_moves, resolve_special_matches,
    Board, Direction, DirectionalMatch, GameConfig, GameSession, Tile, TraversalOrder,
    DEFAULT_MATCH_THRESHOLD,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_board() -> impl Strategy<Value = Board> {
    (1usize..=6, 1usize..=6)
        .prop_flat_map(|(rows, cols)| {
            (
                Just(rows),
                Just(cols),
                prop::collection::vec(prop::option::of(1u32..=4), rows * cols),
            )
        })
        .prop_map(|(rows, cols, cells)| {
            let mut board = Board::new(rows, cols).unwrap();
            for (index, rank) in cells.into_iter().enumerate() {
                if let Some(rank) = rank {
                    board.set(index, Tile::new(1 << rank).unwrap()).unwrap();
                }
            }
            board
        })
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

/// Position of `index` along the axis `direction` moves on, plus the line it sits in
fn axis_position(board: &Board, index: usize, direction: Direction) -> (usize, usize) {
    let (row, col) = board.coords(index);
    if direction.is_vertical() {
        (col, row)
    } else {
        (row, col)
    }
}

fn assert_occupancy(board: &Board) {
    let occupied = board.traverse(TraversalOrder::RowMajor);
    let mut sorted = occupied.clone();
    sorted.dedup();
    assert_eq!(sorted.len(), occupied.len(), "duplicate index in traversal");
    assert_eq!(occupied.len(), board.len());
    for i in 0..board.capacity() {
        assert_eq!(board.has(i), occupied.contains(&i));
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn traversal_orders_visit_every_tile_once(board in arb_board()) {
        let mut row_major = board.traverse(TraversalOrder::RowMajor);
        for order in [
            TraversalOrder::RowMajorReverse,
            TraversalOrder::ColumnMajor,
            TraversalOrder::ColumnMajorReverse,
        ] {
            let mut other = board.traverse(order);
            other.sort_unstable();
            row_major.sort_unstable();
            prop_assert_eq!(&other, &row_major);
        }
    }

    #[test]
    fn moves_are_idempotent(board in arb_board(), direction in arb_direction()) {
        let mut board = board;
        let moves = resolve_moves(&board, direction).unwrap();
        apply_moves(&mut board, &moves).unwrap();
        assert_occupancy(&board);
        prop_assert!(resolve_moves(&board, direction).unwrap().is_empty());
    }

    #[test]
    fn moves_preserve_count_and_values(board in arb_board(), direction in arb_direction()) {
        let mut moved = board.clone();
        let moves = resolve_moves(&board, direction).unwrap();
        apply_moves(&mut moved, &moves).unwrap();

        prop_assert_eq!(moved.len(), board.len());
        for mv in &moves {
            prop_assert_eq!(moved.get(mv.to), board.get(mv.from));
        }
    }

    #[test]
    fn moves_never_overtake(board in arb_board(), direction in arb_direction()) {
        let moves = resolve_moves(&board, direction).unwrap();
        let destination: FxHashMap<usize, usize> = moves.iter().map(|mv| (mv.from, mv.to)).collect();
        let final_index = |i: usize| destination.get(&i).copied().unwrap_or(i);

        let occupied = board.traverse(TraversalOrder::RowMajor);
        for &a in &occupied {
            for &b in &occupied {
                let (line_a, pos_a) = axis_position(&board, a, direction);
                let (line_b, pos_b) = axis_position(&board, b, direction);
                if line_a != line_b || pos_a >= pos_b {
                    continue;
                }
                let (final_line_a, final_a) = axis_position(&board, final_index(a), direction);
                let (final_line_b, final_b) = axis_position(&board, final_index(b), direction);
                prop_assert_eq!(final_line_a, line_a);
                prop_assert_eq!(final_line_b, line_b);
                prop_assert!(final_a < final_b);
            }
        }
    }

    #[test]
    fn runs_never_wrap(board in arb_board(), direction in arb_direction()) {
        let runs = directional_matches(&board, direction, |a, b| a == b);
        let total: usize = runs.iter().map(|r| r.len()).sum();
        prop_assert_eq!(total, board.len());

        for run in &runs {
            let value = run.root().and_then(|root| board.get(root));
            for pair in run.indices.windows(2) {
                let (row_a, col_a) = board.coords(pair[0]);
                let (row_b, col_b) = board.coords(pair[1]);
                if direction.is_vertical() {
                    prop_assert_eq!(col_a, col_b);
                    prop_assert_eq!(row_a.abs_diff(row_b), 1);
                } else {
                    prop_assert_eq!(row_a, row_b);
                    prop_assert_eq!(col_a.abs_diff(col_b), 1);
                }
                prop_assert_eq!(board.get(pair[1]), value);
            }
        }
    }

    #[test]
    fn clusters_partition_qualifying_runs(board in arb_board(), direction in arb_direction()) {
        let report = compute_matches(&board, direction, DEFAULT_MATCH_THRESHOLD);

        let mut seen: Vec<&DirectionalMatch> = report.simple.iter().collect();
        for cluster in &report.clusters {
            let classified = cluster.branches.len() + cluster.collapsible.len() + cluster.blocked.len();
            prop_assert!(classified >= 2);
            prop_assert_eq!(cluster.runs().count(), classified);
            seen.extend(cluster.runs());
        }

        // Every run appears once and keeps the threshold
        for (i, a) in seen.iter().enumerate() {
            prop_assert!(a.len() >= DEFAULT_MATCH_THRESHOLD);
            for b in &seen[i + 1..] {
                prop_assert!(a != b);
            }
        }

        // Re-resolving the same runs gives the same grouping
        let again = resolve_special_matches(seen.into_iter().cloned().collect());
        prop_assert_eq!(again.simple.len() + again.clusters.len(), report.simple.len() + report.clusters.len());
    }

    #[test]
    fn simple_runs_share_no_tiles(board in arb_board(), direction in arb_direction()) {
        let report = compute_matches(&board, direction, DEFAULT_MATCH_THRESHOLD);
        let mut owners: FxHashMap<usize, usize> = FxHashMap::default();
        for run in report.simple.iter().chain(report.clusters.iter().flat_map(|c| c.runs())) {
            for &index in &run.indices {
                *owners.entry(index).or_insert(0) += 1;
            }
        }
        for run in &report.simple {
            for index in &run.indices {
                prop_assert_eq!(owners[index], 1);
            }
        }
    }

    #[test]
    fn threshold_decides_merging(len in 1usize..=8) {
        let mut board = Board::new(1, 8).unwrap();
        for i in 0..len {
            board.set(i, Tile::TWO).unwrap();
        }
        let mut game = GameSession::with_board(GameConfig::default().with_seed(1), board).unwrap();
        let outcome = game.play_turn(Direction::Left).unwrap();
        prop_assert_eq!(outcome.merges, usize::from(len >= DEFAULT_MATCH_THRESHOLD));
    }

    #[test]
    fn turns_keep_occupancy(
        board in arb_board(),
        swipes in prop::collection::vec(arb_direction(), 1..12),
    ) {
        let mut game = GameSession::with_board(GameConfig::default().with_seed(5), board).unwrap();
        for direction in swipes {
            let before_score = game.total_score();
            let outcome = game.play_turn(direction).unwrap();
            assert_occupancy(game.board());
            prop_assert_eq!(game.total_score(), before_score + outcome.score_gained);
        }
    }
}
