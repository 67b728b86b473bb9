//! Forsyth-Edwards Notation parsing and serialization.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::error::EngineError;
use crate::square::Square;

fn pc_index(piece: Piece, color: Color) -> usize {
    (color as usize) * 6 + (piece as usize)
}

impl Board {
    /// Resets `self` to the position described by `fen`, a standard six-field
    /// FEN record. Leaves `self` untouched on error.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(EngineError::parse(
                format!("expected at least 4 fields, found {}", fields.len()),
                0,
            ));
        }

        let mut board = Board::new_empty();

        parse_placement(&mut board, fields[0])?;

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(EngineError::parse(format!("bad side to move '{other}'"), 1)),
        };

        board.castling_rights = parse_castling(fields[2])?;

        board.en_passant = match fields[3] {
            "-" => None,
            sq => Some(sq.parse::<Square>()?),
        };

        board.halfmove_clock = fields
            .get(4)
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|_| EngineError::parse("bad halfmove clock", 4))?
            .unwrap_or(0);

        board.fullmove_number = fields
            .get(5)
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|_| EngineError::parse("bad fullmove number", 5))?
            .unwrap_or(1);

        board.refresh_zobrist();
        *self = board;
        Ok(())
    }

    /// Serializes `self` into a standard six-field FEN record.
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(64);

        for fen_rank in 0..8 {
            let rank = 7 - fen_rank;
            let mut empty_run = 0u8;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            out.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        out.push(PC_TO_CHAR[pc_index(piece, color)]);
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                out.push((b'0' + empty_run) as char);
            }
            if fen_rank != 7 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        let rights = castling_to_string(self.castling_rights);
        out.push_str(&rights);

        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));

        out
    }
}

fn parse_placement(board: &mut Board, placement: &str) -> Result<(), EngineError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(EngineError::parse(
            format!("expected 8 ranks, found {}", ranks.len()),
            0,
        ));
    }

    for (fen_rank, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - fen_rank as u8;
        let mut file = 0u8;
        for ch in rank_str.chars() {
            if let Some(digit) = ch.to_digit(10) {
                file += digit as u8;
                continue;
            }
            if file >= 8 {
                return Err(EngineError::parse("rank overflows 8 files", 0));
            }
            let (piece, color) = CHAR_TO_PC[ch as usize]
                .ok_or_else(|| EngineError::parse(format!("unknown piece glyph '{ch}'"), 0))?;
            let sq = Square::from_file_rank(file, rank);
            let bb = board.bb(color, piece) | (1u64 << sq.index());
            board.set_bb(color, piece, bb);
            file += 1;
        }
        if file != 8 {
            return Err(EngineError::parse(
                format!("rank {rank_str} does not sum to 8 files"),
                0,
            ));
        }
    }

    Ok(())
}

fn parse_castling(field: &str) -> Result<u8, EngineError> {
    if field == "-" {
        return Ok(0);
    }
    let mut rights = 0u8;
    for ch in field.chars() {
        rights |= match ch {
            'K' => CASTLE_WK,
            'Q' => CASTLE_WQ,
            'k' => CASTLE_BK,
            'q' => CASTLE_BQ,
            other => return Err(EngineError::parse(format!("bad castling glyph '{other}'"), 2)),
        };
    }
    Ok(rights)
}

fn castling_to_string(rights: u8) -> String {
    let mut s = String::new();
    if rights & CASTLE_WK != 0 {
        s.push('K');
    }
    if rights & CASTLE_WQ != 0 {
        s.push('Q');
    }
    if rights & CASTLE_BK != 0 {
        s.push('k');
    }
    if rights & CASTLE_BQ != 0 {
        s.push('q');
    }
    if s.is_empty() {
        s.push('-');
    }
    s
}
