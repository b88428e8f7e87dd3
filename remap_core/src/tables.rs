//! Old-slot to new-slot remap tables and the index and mask transforms.
//!
//! Two tables are built once per run from the frozen layer map: the plain
//! table places every old slot at its new position, and the redirected table
//! additionally resolves deleted slots onto their redirect targets. They are
//! the sole translation authority for the rest of the run.

use crate::layer_map::{LayerMapModel, FIXED_LAYER_COUNT, LAYER_COUNT};

/// One old-slot to new-slot lookup covering all 32 slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapTable {
    slots: [usize; LAYER_COUNT],
}

impl RemapTable {
    /// Table mapping every slot to itself.
    pub fn identity() -> Self {
        Self {
            slots: std::array::from_fn(|slot| slot),
        }
    }

    /// Wrap a finished lookup. Every target must be a valid slot.
    pub fn from_slots(slots: [usize; LAYER_COUNT]) -> Self {
        debug_assert!(
            slots.iter().all(|&target| target < LAYER_COUNT),
            "remap targets must stay within the 32-slot space"
        );
        Self { slots }
    }

    pub fn slots(&self) -> &[usize; LAYER_COUNT] {
        &self.slots
    }

    /// Transform a single layer index.
    ///
    /// Out-of-range input (negative or >= 32) falls back to slot 0 before the
    /// lookup, keeping the function total. Legacy data relies on this.
    pub fn transform_index(&self, old: i32) -> i32 {
        let slot = if (0..LAYER_COUNT as i32).contains(&old) {
            old as usize
        } else {
            0
        };
        self.slots[slot] as i32
    }

    /// Transform a 32-bit layer mask as a bit permutation.
    ///
    /// Each set source bit sets the destination bit the table names. Several
    /// source bits may land on one destination; they OR-combine, so collapsing
    /// layers under a redirect loses membership distinctions by design of the
    /// redirect itself.
    pub fn transform_mask(&self, old: u32) -> u32 {
        let mut result = 0u32;
        for bit in 0..LAYER_COUNT {
            if old >> bit & 1 == 1 {
                result |= 1 << self.slots[bit];
            }
        }
        result
    }
}

/// The two tables a processing run derives from the finalized map.
#[derive(Debug, Clone, Copy)]
pub struct RemapTables {
    pub plain: RemapTable,
    pub redirected: RemapTable,
}

/// Derive both tables from a frozen, valid layer map.
///
/// Pure and deterministic. Build exactly once per run; rebuilding mid-run
/// against a mutated map is unsupported.
pub fn build_tables(map: &LayerMapModel) -> RemapTables {
    debug_assert!(map.is_valid(), "remap tables built from an invalid map");

    let mut plain = [0usize; LAYER_COUNT];
    let mut redirected = [0usize; LAYER_COUNT];
    for slot in 0..FIXED_LAYER_COUNT {
        plain[slot] = slot;
        redirected[slot] = slot;
    }
    for (position, entry) in map.entries().iter().enumerate() {
        plain[entry.old_index()] = FIXED_LAYER_COUNT + position;
    }
    // Redirect targets are one hop at most: a fixed slot or another entry's
    // old index, both resolved through the plain table.
    for (position, entry) in map.entries().iter().enumerate() {
        redirected[entry.old_index()] = match entry.redirect() {
            None => FIXED_LAYER_COUNT + position,
            Some(target) => plain[target],
        };
    }

    RemapTables {
        plain: RemapTable::from_slots(plain),
        redirected: RemapTable::from_slots(redirected),
    }
}
