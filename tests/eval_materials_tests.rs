use chess_engine_core::search::eval::evaluate;
use std::str::FromStr;

fn fen(f: &str) -> chess_engine_core::board::Board {
    chess_engine_core::board::Board::from_str(f).expect("valid FEN")
}

#[test]
fn startpos_is_balanced() {
    let b = chess_engine_core::board::Board::new();
    assert_eq!(evaluate(&b), 0);
}

#[test]
fn white_up_a_pawn_scores_near_plus_100() {
    let b = fen("7k/8/8/8/8/8/P7/7K w - - 0 1");
    let score = evaluate(&b);
    assert!(
        (90..=140).contains(&score),
        "expected roughly one pawn's worth, got {score}"
    );
}

#[test]
fn black_up_a_rook_scores_strongly_negative_from_white_to_move() {
    let b = fen("k7/8/8/8/8/8/8/K6r w - - 0 1");
    let score = evaluate(&b);
    assert!(score < -400, "expected a large deficit for White, got {score}");
}

#[test]
fn mirroring_the_position_negates_the_score_exactly() {
    let white_up = fen("rnbqkbnr/1ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    let black_up = fen("rnbqkbnr/pppppppp/8/8/8/8/1PPPPPPP/RNBQKBNR b KQkq - 0 1");

    assert_eq!(evaluate(&white_up), -evaluate(&black_up));
}

#[test]
fn promotion_swings_the_score_by_roughly_a_queen_minus_a_pawn() {
    let pawn = fen("7k/P7/8/8/8/8/8/7K w - - 0 1");
    let queen = fen("7k/Q7/8/8/8/8/8/7K w - - 0 1");

    let delta = evaluate(&queen) - evaluate(&pawn);
    assert!((800..=1000).contains(&delta), "got delta {delta}");
}

#[test]
fn side_to_move_perspective_flips_sign() {
    let white_to_move = fen("rnbqkbnr/1ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    let black_to_move = fen("rnbqkbnr/1ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1");

    assert_eq!(evaluate(&white_to_move), -evaluate(&black_to_move));
}
