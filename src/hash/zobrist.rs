// src/hash/zobrist.rs

use crate::board::castle_bits::*;
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Deterministic, dependency-free PRNG used to seed Zobrist keys when
/// `deterministic_zobrist` is enabled, so perft/repeatability tests see the
/// same hash on every run regardless of platform `rand` internals.
struct Xorshift32(u32);

impl Xorshift32 {
    fn new(seed: u32) -> Self {
        Xorshift32(if seed == 0 { 1 } else { seed })
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }
}

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u32 = 1_804_289_383;

enum ZobristRng {
    Deterministic(Xorshift32),
    OsRandom(StdRng),
}

impl ZobristRng {
    fn next_u64(&mut self) -> u64 {
        match self {
            ZobristRng::Deterministic(r) => r.next_u64(),
            ZobristRng::OsRandom(r) => r.next_u64(),
        }
    }
}

fn make_zobrist_rng() -> ZobristRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        ZobristRng::Deterministic(Xorshift32::new(ZOBRIST_SEED))
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        ZobristRng::OsRandom(StdRng::from_seed(seed))
    }
}

pub struct ZobristKeys {
    /// `[color][piece][square]`, color = {White=0, Black=1}, piece = {P,N,B,R,Q,K}={0..5}.
    pub piece: [[[u64; 64]; 6]; 2],
    pub side_to_move: u64,
    /// `[0]=K, [1]=Q, [2]=k, [3]=q` (bit order K,Q,k,q).
    pub castling: [u64; 4],
    /// One key per en-passant target square, XORed in whenever `Board::en_passant`
    /// is `Some`, unconditionally. The hash does not ask whether a pawn could
    /// actually capture onto that square.
    pub ep: [u64; 64],
}

#[inline]
pub fn xor_castling_rights_delta(hash: &mut u64, keys: &ZobristKeys, old: u8, new_: u8) {
    let d = old ^ new_;
    if d & CASTLE_WK != 0 {
        *hash ^= keys.castling[0];
    }
    if d & CASTLE_WQ != 0 {
        *hash ^= keys.castling[1];
    }
    if d & CASTLE_BK != 0 {
        *hash ^= keys.castling[2];
    }
    if d & CASTLE_BQ != 0 {
        *hash ^= keys.castling[3];
    }
}

/// Global keys, initialized on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys_with_rng(make_zobrist_rng()))
}

fn generate_zobrist_keys_with_rng(mut rng: ZobristRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut ZobristRng) -> u64 {
        // avoid zero keys to reduce degenerate collisions
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 4],
        ep: [0u64; 64],
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }

    for i in 0..4 {
        keys.castling[i] = non_zero(&mut rng);
    }

    for sq in 0..64 {
        keys.ep[sq] = non_zero(&mut rng);
    }

    keys.side_to_move = non_zero(&mut rng);

    keys
}
