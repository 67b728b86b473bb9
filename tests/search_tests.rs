//! Minimal search wiring tests: depth-0 behavior, stalemate/checkmate
//! handling, and a simple "free capture at depth=1" sanity check.
use chess_engine_core::board::Board;
use chess_engine_core::moves::magic::loader::load_magic_tables;
use chess_engine_core::search::context::SearchContext;
use chess_engine_core::search::eval::evaluate;
use chess_engine_core::search::pv::PrincipalVariation;
use chess_engine_core::search::search::{INF, TimeManager, negamax};
use chess_engine_core::search::tt::TranspositionTable;
use std::str::FromStr;

fn search_fixed_depth(board: &mut Board, depth: i32) -> i32 {
    let tables = load_magic_tables();
    let mut ctx = SearchContext::new();
    let mut tt = TranspositionTable::new(1);
    let mut pv = PrincipalVariation::new();
    let mut time = TimeManager::new(None);
    let mut follow_pv = false;
    let mut nodes = 0u64;

    negamax(
        board, &tables, &mut ctx, &mut tt, &mut pv, depth, 0, -INF, INF, &mut follow_pv,
        &mut nodes, &mut time,
    )
}

#[test]
fn depth_zero_matches_static_eval() {
    let mut board = Board::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let score = search_fixed_depth(&mut board, 0);
    assert_eq!(score, evaluate(&board));
}

#[test]
fn stalemate_is_scored_as_a_draw() {
    let mut board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let score = search_fixed_depth(&mut board, 2);
    assert_eq!(score, 0);
}

#[test]
fn checkmate_is_scored_as_mate() {
    let mut board = Board::from_str("6k1/6Qp/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let score = search_fixed_depth(&mut board, 2);
    assert!(score <= -INF / 2 + 300, "expected a mate score, got {score}");
}

#[test]
fn a_hanging_queen_is_found_at_depth_one() {
    // White pawn can capture a hanging black queen.
    let mut board = Board::from_str("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
    let score = search_fixed_depth(&mut board, 1);
    assert!(score > 500, "expected the free queen to dominate eval, got {score}");
}
