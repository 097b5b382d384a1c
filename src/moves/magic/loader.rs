//! Table construction entry points. Tables are built once at startup and
//! shared by reference; the optional bincode cache skips the magic search
//! for tools that start often.

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;
use std::fs;
use std::io;
use std::path::Path;

/// Fixed search seed: identical tables on every run.
const MAGIC_SEED: u64 = 0x5EED_CAFE_F00D_0001;

/// Default cache location used by the `load_magic` feature.
pub const MAGIC_CACHE_PATH: &str = "magics.bin";

/// Build (or, with the `load_magic` feature, load) the sliding attack
/// tables. Call once at startup; generation failure is unrecoverable.
pub fn load_magic_tables() -> MagicTables {
    #[cfg(feature = "load_magic")]
    if let Ok(tables) = load_magic_tables_from(MAGIC_CACHE_PATH) {
        return tables;
    }

    generate_magic_tables(MagicTableSeed::Fixed(MAGIC_SEED))
        .expect("magic table generation failed")
}

/// Serialize tables to a bincode cache file.
pub fn save_magic_tables<P: AsRef<Path>>(path: P, tables: &MagicTables) -> io::Result<()> {
    let bytes = bincode::serialize(tables)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    fs::write(path, bytes)
}

/// Deserialize tables from a bincode cache file.
pub fn load_magic_tables_from<P: AsRef<Path>>(path: P) -> io::Result<MagicTables> {
    let bytes = fs::read(path)?;
    bincode::deserialize(&bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}
