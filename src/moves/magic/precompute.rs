//! Builds the magic lookup tables: relevant-occupancy masks, blocker subset
//! enumeration, magic-number search, and table fill.

use super::attacks::{get_bishop_attack_bitboards, get_rook_attack_bitboards};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::{SeedableRng, rngs::StdRng};

/// Seeding strategy for the magic search RNG.
#[derive(Debug, Clone, Copy)]
pub enum MagicTableSeed {
    /// Repeatable tables; the only mode the engine uses.
    Fixed(u64),
}

/// Rook relevant-occupancy mask: the ray squares a blocker can occupy.
/// Edge squares are excluded; a piece on the edge never shortens the ray
/// beyond itself, so it carries no indexing information.
pub fn rook_relevant_mask(square: usize) -> u64 {
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

/// Bishop relevant-occupancy mask, edges excluded on every diagonal.
pub fn bishop_relevant_mask(square: usize) -> u64 {
    let rank = (square / 8) as isize;
    let file = (square % 8) as isize;
    let mut mask = 0u64;

    for (dr, df) in [(1isize, 1isize), (1, -1), (-1, 1), (-1, -1)] {
        let mut r = rank + dr;
        let mut f = file + df;
        while (1..=6).contains(&r) && (1..=6).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }

    mask
}

/// All 2^popcount(mask) blocker subsets of `mask`, via the carry-rippler:
/// `next = (next - mask) & mask` walks every subset and ends back at 0.
pub fn enumerate_blocker_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1usize << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

fn build_entry(
    square: usize,
    mask: u64,
    blockers: &[u64],
    attacks: &[u64],
    rng: &mut StdRng,
) -> Result<MagicEntry, String> {
    let bits = mask.count_ones();
    let shift = 64 - bits;

    let magic = find_magic_number_for_square(blockers, attacks, shift, rng)
        .map_err(|e| format!("square {}: {}", square, e))?;

    let mut table = vec![0u64; 1usize << bits].into_boxed_slice();
    for (blocker, attack) in blockers.iter().zip(attacks.iter()) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        table[index] = *attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table,
    })
}

/// Generate rook and bishop tables for all 64 squares.
/// Roughly 100k rook + 32k bishop entries of 8 bytes: about 1 MiB total.
pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let MagicTableSeed::Fixed(seed) = seed;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut rook_entries = Vec::with_capacity(64);
    let mut bishop_entries = Vec::with_capacity(64);

    for square in 0..64 {
        let mask = rook_relevant_mask(square);
        let blockers = enumerate_blocker_subsets(mask);
        let attacks = get_rook_attack_bitboards(square, &blockers);
        rook_entries.push(build_entry(square, mask, &blockers, &attacks, &mut rng)?);
    }

    for square in 0..64 {
        let mask = bishop_relevant_mask(square);
        let blockers = enumerate_blocker_subsets(mask);
        let attacks = get_bishop_attack_bitboards(square, &blockers);
        bishop_entries.push(build_entry(square, mask, &blockers, &attacks, &mut rng)?);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}
