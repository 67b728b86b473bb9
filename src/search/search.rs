use crate::board::Board;
use crate::moves::execute::{MakeMode, make_move, make_null_move, undo_move_basic, undo_null_move};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use crate::search::context::SearchContext;
use crate::search::eval::evaluate;
use crate::search::ordering::order_moves;
use crate::search::pv::PrincipalVariation;
use crate::search::tt::{Bound, NO_ENTRY, TranspositionTable};
use arrayvec::ArrayVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub const INF: i32 = i32::MAX / 2;
pub const MATE_SCORE: i32 = -INF + 1;
const MAX_PLY: usize = 256;

const NULL_MOVE_MIN_DEPTH: i32 = 3;
const NULL_MOVE_REDUCTION: i32 = 2;
const END_GAME_PIECE_THRESHOLD: u32 = 6;

const LMR_MIN_MOVES_SEARCHED: usize = 3;
const LMR_MIN_DEPTH: i32 = 2;

pub struct TimeManager {
    pub start_time: Instant,
    pub allotted: Option<Duration>,
    pub stop_signal: bool,
    external_stop: Arc<AtomicBool>,
}

impl TimeManager {
    pub fn new(limit: Option<Duration>) -> Self {
        Self::with_stop_flag(limit, Arc::new(AtomicBool::new(false)))
    }

    /// `flag` is polled on every `check_time` call alongside the deadline, so
    /// a `stop` command delivered from another thread unwinds the search at
    /// the next node check rather than waiting for the clock.
    pub fn with_stop_flag(limit: Option<Duration>, flag: Arc<AtomicBool>) -> Self {
        Self {
            start_time: Instant::now(),
            allotted: limit,
            stop_signal: false,
            external_stop: flag,
        }
    }

    #[inline(always)]
    pub fn check_time(&mut self) {
        if self.stop_signal {
            return;
        }
        if self.external_stop.load(Ordering::Relaxed) {
            self.stop_signal = true;
            return;
        }
        if let Some(limit) = self.allotted
            && self.start_time.elapsed() >= limit
        {
            self.stop_signal = true;
        }
    }
}

fn is_end_game(board: &Board) -> bool {
    board
        .occupancy(crate::board::Color::White)
        .count_ones()
        <= END_GAME_PIECE_THRESHOLD
        || board
            .occupancy(crate::board::Color::Black)
            .count_ones()
            <= END_GAME_PIECE_THRESHOLD
}

#[allow(clippy::too_many_arguments)]
pub fn quiescence(
    board: &mut Board,
    tables: &MagicTables,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
    time: &mut TimeManager,
) -> i32 {
    *nodes += 1;
    if *nodes & 2047 == 0 {
        time.check_time();
    }

    let stand_pat = evaluate(board);
    if stand_pat >= beta {
        return beta;
    }
    if ply >= MAX_PLY {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut pseudo: ArrayVec<Move, 256> = ArrayVec::new();
    generate_pseudo_legal(board, tables, &mut pseudo);
    let empty_killers = [None, None];
    let empty_history = [[0i32; 64]; 6];
    order_moves(&mut pseudo, board, None, false, &empty_killers, &empty_history);

    for mv in pseudo {
        let mover = board.side_to_move;
        let Some(undo) = make_move(board, mv, MakeMode::CapturesOnly) else {
            continue;
        };
        if in_check(board, mover, tables) {
            undo_move_basic(board, undo);
            continue;
        }

        let score = -quiescence(board, tables, ply + 1, -beta, -alpha, nodes, time);
        undo_move_basic(board, undo);

        if time.stop_signal {
            return alpha;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

#[allow(clippy::too_many_arguments)]
pub fn negamax(
    board: &mut Board,
    tables: &MagicTables,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    pv: &mut PrincipalVariation,
    depth: i32,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    follow_pv: &mut bool,
    nodes: &mut u64,
    time: &mut TimeManager,
) -> i32 {
    pv.clear_length(ply);

    if ply > 0 {
        let probed = tt.probe(board.zobrist, alpha, beta, depth.max(0) as u32);
        if probed != NO_ENTRY {
            return probed;
        }
    }

    let in_check_now = in_check(board, board.side_to_move, tables);
    let depth = if in_check_now { depth + 1 } else { depth };

    if depth <= 0 {
        return quiescence(board, tables, ply, alpha, beta, nodes, time);
    }
    if ply >= MAX_PLY {
        return evaluate(board);
    }

    *nodes += 1;
    if *nodes & 2047 == 0 {
        time.check_time();
    }

    let mut bound = Bound::Alpha;

    if !in_check_now && depth >= NULL_MOVE_MIN_DEPTH && ply > 0 && !is_end_game(board) {
        let undo = make_null_move(board);
        let mut dummy_follow = false;
        let score = -negamax(
            board,
            tables,
            ctx,
            tt,
            pv,
            depth - 1 - NULL_MOVE_REDUCTION,
            ply + 1,
            -beta,
            -beta + 1,
            &mut dummy_follow,
            nodes,
            time,
        );
        undo_null_move(board, undo);

        if score >= beta {
            tt.add_entry(board.zobrist, Bound::Beta, beta, depth as u32);
            return beta;
        }
    }

    let mut pseudo: ArrayVec<Move, 256> = ArrayVec::new();
    generate_pseudo_legal(board, tables, &mut pseudo);

    let pv_move = pv.move_at(0, ply);
    let mut score_pv = false;
    if *follow_pv {
        score_pv = pseudo.iter().any(|&m| Some(m) == pv_move);
        *follow_pv = score_pv;
    }

    order_moves(
        &mut pseudo,
        board,
        pv_move,
        score_pv,
        &ctx.killer_moves[ply],
        &ctx.history,
    );

    let mut legal_moves = 0usize;
    let mut moves_searched = 0usize;

    for mv in pseudo {
        let mover = board.side_to_move;
        let undo = make_move(board, mv, MakeMode::AllMoves).expect("AllMoves never rejects");
        if in_check(board, mover, tables) {
            undo_move_basic(board, undo);
            continue;
        }
        legal_moves += 1;

        let gives_check = in_check(board, board.side_to_move, tables);

        let mut score;
        if moves_searched == 0 {
            score = -negamax(
                board, tables, ctx, tt, pv, depth - 1, ply + 1, -beta, -alpha, follow_pv, nodes,
                time,
            );
        } else {
            let use_lmr = moves_searched > LMR_MIN_MOVES_SEARCHED
                && depth > LMR_MIN_DEPTH
                && !in_check_now
                && !mv.is_capture()
                && mv.promotion.is_none()
                && !gives_check;

            if use_lmr {
                score = -negamax(
                    board,
                    tables,
                    ctx,
                    tt,
                    pv,
                    depth - 2,
                    ply + 1,
                    -(alpha + 1),
                    -alpha,
                    follow_pv,
                    nodes,
                    time,
                );
            } else {
                score = alpha + 1;
            }

            if score > alpha {
                score = -negamax(
                    board,
                    tables,
                    ctx,
                    tt,
                    pv,
                    depth - 1,
                    ply + 1,
                    -(alpha + 1),
                    -alpha,
                    follow_pv,
                    nodes,
                    time,
                );
                if score > alpha && score < beta {
                    score = -negamax(
                        board, tables, ctx, tt, pv, depth - 1, ply + 1, -beta, -alpha, follow_pv,
                        nodes, time,
                    );
                }
            }
        }

        undo_move_basic(board, undo);
        moves_searched += 1;

        if time.stop_signal {
            return alpha;
        }

        if score >= beta {
            if !mv.is_capture() {
                ctx.update_killer(ply, mv);
            }
            tt.add_entry(board.zobrist, Bound::Beta, beta, depth as u32);
            return beta;
        }

        if score > alpha {
            if !mv.is_capture() {
                ctx.update_history(mv.piece, mv, depth);
            }
            alpha = score;
            bound = Bound::Exact;
            pv.update(ply, mv);
        }
    }

    if legal_moves == 0 {
        return if in_check_now {
            MATE_SCORE + ply as i32
        } else {
            0
        };
    }

    tt.add_entry(board.zobrist, bound, alpha, depth as u32);
    alpha
}

pub struct SearchResult {
    pub score: i32,
    pub best_move: Option<Move>,
    pub depth: i32,
    pub nodes: u64,
    pub pv_line: Vec<Move>,
}

/// Runs a single root negamax at `depth` with an open window.
pub fn root_search(
    board: &mut Board,
    tables: &MagicTables,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    pv: &mut PrincipalVariation,
    depth: i32,
    time: &mut TimeManager,
) -> SearchResult {
    let mut nodes = 0u64;
    let mut follow_pv = pv.best_move().is_some();

    let score = negamax(
        board,
        tables,
        ctx,
        tt,
        pv,
        depth,
        0,
        -INF,
        INF,
        &mut follow_pv,
        &mut nodes,
        time,
    );

    SearchResult {
        score,
        best_move: pv.best_move(),
        depth,
        nodes,
        pv_line: pv.line(0),
    }
}

/// Iterative deepening driver: searches depth 1 through `max_depth`, keeping
/// the last fully completed iteration's result.
pub fn iterative_deepening(
    board: &mut Board,
    tables: &MagicTables,
    max_depth: i32,
    time_limit: Option<Duration>,
    stop_flag: Arc<AtomicBool>,
    mut on_iteration: impl FnMut(&SearchResult),
) -> SearchResult {
    let mut tt = TranspositionTable::new(64);
    let mut ctx = SearchContext::new();
    let mut pv = PrincipalVariation::new();
    let mut time = TimeManager::with_stop_flag(time_limit, stop_flag);

    let mut last = SearchResult {
        score: 0,
        best_move: None,
        depth: 0,
        nodes: 0,
        pv_line: Vec::new(),
    };

    for depth in 1..=max_depth {
        let result = root_search(board, tables, &mut ctx, &mut tt, &mut pv, depth, &mut time);

        if time.stop_signal && depth > 1 {
            break;
        }

        on_iteration(&result);
        last = result;

        if last.score.abs() >= INF / 2 {
            break;
        }
        if time.stop_signal {
            break;
        }
    }

    last
}
