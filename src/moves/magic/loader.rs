//! Process-wide singleton access to the magic bitboard tables.

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;
use once_cell::sync::OnceCell;

#[cfg(feature = "load_magic")]
const MAGIC_BIN: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/magic.bin"));

fn build_tables() -> MagicTables {
    #[cfg(feature = "load_magic")]
    {
        bincode::deserialize(MAGIC_BIN).expect("bundled magic.bin is corrupt or stale")
    }
    #[cfg(not(feature = "load_magic"))]
    {
        generate_magic_tables(MagicTableSeed::Random).expect("magic number search failed")
    }
}

/// Returns the shared, lazily-initialized magic bitboard tables.
///
/// The expensive magic-number search runs once per process; subsequent calls
/// clone the cached result.
pub fn load_magic_tables() -> MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(build_tables).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_is_idempotent() {
        let a = load_magic_tables();
        let b = load_magic_tables();
        assert_eq!(a.rook.entries[0].magic, b.rook.entries[0].magic);
    }
}
