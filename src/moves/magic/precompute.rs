//! Assembles magic bitboard tables: per-square relevant-occupancy masks,
//! blocker-subset enumeration, and magic-number search via `search.rs`.

use super::attacks::{bishop_attacks_per_square, rook_attacks_per_square};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// How to seed the magic-number search.
pub enum MagicTableSeed {
    /// Exact seed, for reproducible tests and the `deterministic_magic` build.
    Fixed(u64),
    /// OS randomness unless `deterministic_magic` is enabled, in which case a
    /// fixed crate-wide default is used instead.
    Random,
}

#[cfg(feature = "deterministic_magic")]
const DEFAULT_MAGIC_SEED: u64 = 0x1BAD_CAFE_DEAD_BEEF;

fn make_rng(seed: MagicTableSeed) -> StdRng {
    match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::Random => {
            #[cfg(feature = "deterministic_magic")]
            {
                StdRng::seed_from_u64(DEFAULT_MAGIC_SEED)
            }
            #[cfg(not(feature = "deterministic_magic"))]
            {
                let mut seed = [0u8; 32];
                rand::rng().fill_bytes(&mut seed);
                StdRng::from_seed(seed)
            }
        }
    }
}

fn rook_relevant_mask(square: usize) -> u64 {
    let rank = square / 8;
    let file = square % 8;
    let mut mask = 0u64;
    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }
    mask
}

fn bishop_relevant_mask(square: usize) -> u64 {
    let rank = square as isize / 8;
    let file = square as isize % 8;
    let mut mask = 0u64;

    let mut r = rank + 1;
    let mut f = file + 1;
    while r < 7 && f < 7 {
        mask |= 1u64 << (r * 8 + f);
        r += 1;
        f += 1;
    }
    let mut r = rank + 1;
    let mut f = file - 1;
    while r < 7 && f > 0 {
        mask |= 1u64 << (r * 8 + f);
        r += 1;
        f -= 1;
    }
    let mut r = rank - 1;
    let mut f = file + 1;
    while r > 0 && f < 7 {
        mask |= 1u64 << (r * 8 + f);
        r -= 1;
        f += 1;
    }
    let mut r = rank - 1;
    let mut f = file - 1;
    while r > 0 && f > 0 {
        mask |= 1u64 << (r * 8 + f);
        r -= 1;
        f -= 1;
    }
    mask
}

/// Enumerates every subset of `mask` via the carry-rippler trick.
fn enumerate_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1usize << mask.count_ones());
    let mut subset: u64 = 0;
    loop {
        subsets.push(subset);
        if subset == mask {
            break;
        }
        subset = subset.wrapping_sub(mask) & mask;
    }
    subsets
}

fn build_entry(
    square: usize,
    mask: u64,
    attacks_fn: fn(usize, u64) -> u64,
    rng: &mut StdRng,
) -> Result<MagicEntry, String> {
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let blockers = enumerate_subsets(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| attacks_fn(square, b)).collect();

    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let mut table = vec![0u64; 1usize << bits];
    for (&blocker, &attack) in blockers.iter().zip(attacks.iter()) {
        let index = ((blocker.wrapping_mul(magic)) >> shift) as usize;
        table[index] = attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = make_rng(seed);

    let mut rook_entries = Vec::with_capacity(64);
    let mut bishop_entries = Vec::with_capacity(64);

    for square in 0..64 {
        let rook_mask = rook_relevant_mask(square);
        rook_entries.push(build_entry(square, rook_mask, rook_attacks_per_square, &mut rng)?);

        let bishop_mask = bishop_relevant_mask(square);
        bishop_entries.push(build_entry(square, bishop_mask, bishop_attacks_per_square, &mut rng)?);
    }

    Ok(MagicTables {
        rook: RookMagicTables { entries: rook_entries },
        bishop: BishopMagicTables { entries: bishop_entries },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_mask_excludes_board_edges() {
        let mask = rook_relevant_mask(0); // a1
        assert_eq!(mask & (1u64 << 7), 0); // h1 edge excluded
        assert_eq!(mask & (1u64 << 56), 0); // a8 edge excluded
    }

    #[test]
    fn bishop_mask_excludes_board_edges() {
        let mask = bishop_relevant_mask(27); // d4
        assert_eq!(mask & (1u64 << 63), 0); // h8 edge excluded
    }

    #[test]
    fn enumerate_subsets_covers_power_of_two() {
        let mask = 0b1011u64;
        let subsets = enumerate_subsets(mask);
        assert_eq!(subsets.len(), 1 << mask.count_ones());
    }
}
