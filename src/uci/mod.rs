//! UCI protocol driver.
//!
//! Two long-lived tasks share one mutex-guarded state struct: the IO task
//! (this thread) reads stdin and owns protocol parsing, and a search worker
//! waits on a condition variable for a request, runs iterative deepening,
//! and writes `info`/`bestmove` lines. Equivalent to the original engine's
//! `WaitCondition`-guarded worker, expressed with `std::sync::Condvar`.

use crate::board::{Board, Color};
use crate::moves::execute::generate_legal;
use crate::moves::magic::MagicTables;
use crate::moves::magic::loader::load_magic_tables;
use crate::moves::perft::{perft, perft_divide};
use crate::moves::types::Move;
use crate::output::engine_println;
use crate::search::{SearchResult, iterative_deepening};
use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const ENGINE_NAME: &str = "chess-engine-core 1.0";
const ENGINE_AUTHOR: &str = "the chess-engine-core contributors";
const INFINITE_CAP: Duration = Duration::from_secs(100 * 60 * 60);
const SAFETY_MARGIN_MS: u64 = 50;

struct SearchRequest {
    board: Board,
    depth: i32,
    time_limit: Option<Duration>,
}

struct Shared {
    request: Option<SearchRequest>,
    quit: bool,
}

struct Engine {
    shared: Mutex<Shared>,
    condvar: Condvar,
    stop_flag: Arc<AtomicBool>,
}

/// Runs the UCI driver to completion, returning the process exit code.
pub fn run() -> i32 {
    let tables = Arc::new(load_magic_tables());
    let engine = Arc::new(Engine {
        shared: Mutex::new(Shared {
            request: None,
            quit: false,
        }),
        condvar: Condvar::new(),
        stop_flag: Arc::new(AtomicBool::new(false)),
    });

    let worker = {
        let engine = Arc::clone(&engine);
        let tables = Arc::clone(&tables);
        thread::spawn(move || search_worker(engine, tables))
    };

    let mut board = Board::new();
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "uci" => {
                engine_println!("id name {}", ENGINE_NAME);
                engine_println!("id author {}", ENGINE_AUTHOR);
                engine_println!("uciok");
            }
            "isready" => engine_println!("readyok"),
            "ucinewgame" => {
                board = Board::new();
            }
            "position" => handle_position(&parts, &mut board, &tables),
            "go" => handle_go(&parts, &board, &engine),
            "stop" => {
                engine.stop_flag.store(true, Ordering::Relaxed);
            }
            "d" | "display" => engine_println!("{}", board),
            "perft" => handle_perft(&parts, &mut board, &tables),
            "quit" => {
                let mut shared = engine.shared.lock().unwrap();
                shared.quit = true;
                engine.stop_flag.store(true, Ordering::Relaxed);
                engine.condvar.notify_all();
                break;
            }
            other => {
                eprintln!("unknown command: {other}");
            }
        }
    }

    let _ = worker.join();
    0
}

fn handle_position(parts: &[&str], board: &mut Board, tables: &MagicTables) {
    if parts.len() < 2 {
        return;
    }

    let mut moves_start = None;
    let mut parsed = if parts[1] == "startpos" {
        moves_start = parts.iter().position(|&p| p == "moves");
        Some(Board::new())
    } else if parts[1] == "fen" {
        let end = parts
            .iter()
            .position(|&p| p == "moves")
            .unwrap_or(parts.len());
        moves_start = parts.iter().position(|&p| p == "moves");
        let fen = parts[2..end].join(" ");
        Board::from_str(&fen).ok()
    } else {
        None
    };

    let Some(ref mut new_board) = parsed else {
        eprintln!("invalid position command");
        return;
    };

    if let Some(idx) = moves_start {
        for token in &parts[idx + 1..] {
            match parse_uci_move(new_board, token, tables) {
                Some(mv) => {
                    crate::moves::execute::make_move_basic(new_board, mv);
                }
                None => {
                    eprintln!("illegal move in position command: {token}");
                    break;
                }
            }
        }
    }

    *board = parsed.unwrap();
}

fn parse_uci_move(board: &mut Board, token: &str, tables: &MagicTables) -> Option<Move> {
    if token == "0000" || token.len() < 4 {
        return None;
    }
    let from = crate::square::Square::from_str(&token[0..2]).ok()?;
    let to = crate::square::Square::from_str(&token[2..4]).ok()?;
    let promo_char = token.chars().nth(4);

    let mut moves: Vec<Move> = Vec::with_capacity(64);
    let mut scratch: Vec<Move> = Vec::with_capacity(256);
    generate_legal(board, tables, &mut moves, &mut scratch);

    moves.into_iter().find(|mv| {
        mv.from == from
            && mv.to == to
            && match promo_char {
                Some(c) => {
                    mv.promotion.map(|p| promotion_char(p)) == Some(c)
                }
                None => mv.promotion.is_none(),
            }
    })
}

fn promotion_char(piece: crate::board::Piece) -> char {
    use crate::board::Piece;
    match piece {
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        _ => '?',
    }
}

struct GoOptions {
    depth: i32,
    time_limit: Option<Duration>,
}

fn parse_go(parts: &[&str], side_to_move: Color) -> GoOptions {
    let mut depth = 64;
    let mut movetime = None;
    let mut wtime = None;
    let mut btime = None;
    let mut winc = 0u64;
    let mut binc = 0u64;
    let mut movestogo = None;
    let mut infinite = false;

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" if i + 1 < parts.len() => {
                depth = parts[i + 1].parse().unwrap_or(64);
                i += 2;
            }
            "movetime" if i + 1 < parts.len() => {
                movetime = parts[i + 1].parse().ok();
                i += 2;
            }
            "wtime" if i + 1 < parts.len() => {
                wtime = parts[i + 1].parse().ok();
                i += 2;
            }
            "btime" if i + 1 < parts.len() => {
                btime = parts[i + 1].parse().ok();
                i += 2;
            }
            "winc" if i + 1 < parts.len() => {
                winc = parts[i + 1].parse().unwrap_or(0);
                i += 2;
            }
            "binc" if i + 1 < parts.len() => {
                binc = parts[i + 1].parse().unwrap_or(0);
                i += 2;
            }
            "movestogo" if i + 1 < parts.len() => {
                movestogo = parts[i + 1].parse().ok();
                i += 2;
            }
            "infinite" => {
                infinite = true;
                i += 1;
            }
            _ => i += 1,
        }
    }

    if infinite {
        return GoOptions {
            depth,
            time_limit: Some(INFINITE_CAP),
        };
    }

    if let Some(ms) = movetime {
        return GoOptions {
            depth,
            time_limit: Some(Duration::from_millis(ms)),
        };
    }

    let (side_time, side_inc) = match side_to_move {
        Color::White => (wtime, winc),
        Color::Black => (btime, binc),
    };

    let time_limit = side_time.map(|t: u64| {
        let moves_to_go = movestogo.unwrap_or(30).max(1);
        let per_move = t / moves_to_go + side_inc;
        let per_move = per_move.saturating_sub(SAFETY_MARGIN_MS);
        Duration::from_millis(per_move.max(1))
    });

    GoOptions { depth, time_limit }
}

fn handle_go(parts: &[&str], board: &Board, engine: &Arc<Engine>) {
    let options = parse_go(parts, board.side_to_move);
    engine.stop_flag.store(false, Ordering::Relaxed);

    let mut shared = engine.shared.lock().unwrap();
    shared.request = Some(SearchRequest {
        board: board.clone(),
        depth: options.depth,
        time_limit: options.time_limit,
    });
    engine.condvar.notify_all();
}

fn search_worker(engine: Arc<Engine>, tables: Arc<MagicTables>) {
    loop {
        let request = {
            let mut shared = engine.shared.lock().unwrap();
            shared = engine
                .condvar
                .wait_while(shared, |s| s.request.is_none() && !s.quit)
                .unwrap();

            if shared.quit && shared.request.is_none() {
                return;
            }
            shared.request.take().unwrap()
        };

        let mut board = request.board;
        let start = Instant::now();
        let result = iterative_deepening(
            &mut board,
            &tables,
            request.depth,
            request.time_limit,
            Arc::clone(&engine.stop_flag),
            |iteration: &SearchResult| {
                emit_info(iteration, start.elapsed());
            },
        );

        match result.best_move {
            Some(mv) => engine_println!("bestmove {}", mv.to_uci()),
            None => engine_println!("bestmove 0000"),
        }
    }
}

fn emit_info(result: &SearchResult, elapsed: Duration) {
    let pv = if result.pv_line.is_empty() {
        "0000".to_string()
    } else {
        result
            .pv_line
            .iter()
            .map(|m| m.to_uci())
            .collect::<Vec<_>>()
            .join(" ")
    };
    engine_println!(
        "info score cp {} depth {} nodes {} time {} pv {}",
        result.score,
        result.depth,
        result.nodes,
        elapsed.as_millis(),
        pv
    );
}

fn handle_perft(parts: &[&str], board: &mut Board, tables: &MagicTables) {
    let Some(depth) = parts.get(1).and_then(|d| d.parse::<u32>().ok()) else {
        eprintln!("usage: perft <depth>");
        return;
    };
    if parts.get(2) == Some(&"divide") {
        perft_divide(board, tables, depth);
    } else {
        let nodes = perft(board, tables, depth);
        engine_println!("{}", nodes);
    }
}
