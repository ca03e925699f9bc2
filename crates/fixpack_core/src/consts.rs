// crates/fixpack_core/src/consts.rs

/// String table header: `[count u16]` then one `u16` offset per entry.
pub const STR_COUNT_BYTES: usize = 2;
pub const STR_OFFSET_BYTES: usize = 2;

/// Index entry: `key u16` + `record offset u32`.
pub const IDX_ENTRY_SIZE: usize = 6;

/// Sprite file header: `[count u16]` then one `u32` offset per entry.
pub const SPRITE_OFFSET_BYTES: usize = 4;
pub const BLOB_LEN_BYTES: usize = 2;

pub const ELEMENT_RECORD_SIZE: usize = 33;
pub const CREATURE_RECORD_SIZE: usize = 32;
pub const CREATURE_RESERVED_BYTES: usize = 10;

/// Largest capacity per domain, bounded by the width of the key field.
pub const ELEMENT_KEY_LIMIT: usize = 1 << 8;
/// Creature names and sprites are slot-aligned tables, so capacity is also
/// bounded by their `u16` entry count.
pub const CREATURE_KEY_LIMIT: usize = u16::MAX as usize;

pub const DEFAULT_ELEMENT_CAPACITY: usize = 119;
pub const DEFAULT_CREATURE_CAPACITY: usize = 1026;

pub const DEFAULT_SPRITE_WIDTH: u32 = 64;
pub const DEFAULT_SPRITE_HEIGHT: u32 = 64;

/// kJ/mol per eV.
pub const KJ_PER_MOL_PER_EV: f64 = 96.485;

pub const OXIDATION_BIAS: i64 = 64;
pub const OXIDATION_UNKNOWN: u8 = 127;

pub const MISSING_TEMPERATURE: i16 = -1;

const _: () = {
    assert!(IDX_ENTRY_SIZE == 2 + 4);
    assert!(ELEMENT_RECORD_SIZE == 1 + 4 + 2 * 5 + 8 + 2 * 3 + 4);
    assert!(CREATURE_RECORD_SIZE == 2 * 3 + 6 + 2 + 2 * 2 + 4 + CREATURE_RESERVED_BYTES);
};
