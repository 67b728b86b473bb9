use chess_engine_core::board::Board;
use chess_engine_core::moves::magic::loader::load_magic_tables;
use chess_engine_core::search::iterative_deepening;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

fn no_stop() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[test]
fn returns_a_move_from_the_opening_position() {
    let mut board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    let tables = load_magic_tables();

    let result = iterative_deepening(&mut board, &tables, 3, None, no_stop(), |_| {});

    assert!(result.best_move.is_some());
    assert!(result.score.abs() < 500, "got {}", result.score);
    assert!(!result.pv_line.is_empty());
    assert_eq!(result.pv_line[0], result.best_move.unwrap());
}

#[test]
fn deepens_one_ply_per_callback_invocation() {
    let mut board = Board::new();
    let tables = load_magic_tables();
    let mut depths_seen = Vec::new();

    iterative_deepening(&mut board, &tables, 4, None, no_stop(), |r| {
        depths_seen.push(r.depth);
    });

    assert_eq!(depths_seen, vec![1, 2, 3, 4]);
}

#[test]
fn stops_immediately_once_mate_is_found() {
    let mut board = Board::from_str("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
    let tables = load_magic_tables();

    let result = iterative_deepening(&mut board, &tables, 10, None, no_stop(), |_| {});

    assert!(result.score.abs() >= chess_engine_core::search::search::INF / 2 - 10);
    assert!(result.depth < 10, "should stop deepening after finding mate");
}

#[test]
fn an_external_stop_flag_is_observed_without_panicking() {
    // The stop flag is polled every 2048 nodes, so a flag raised before the
    // call starts does not guarantee a depth-1-only search, but the search
    // must still terminate cleanly and hand back a usable result.
    let mut board = Board::new();
    let tables = load_magic_tables();
    let stop = Arc::new(AtomicBool::new(true));

    let result = iterative_deepening(
        &mut board,
        &tables,
        3,
        Some(Duration::from_secs(5)),
        stop,
        |_| {},
    );

    assert!(result.best_move.is_some());
}
