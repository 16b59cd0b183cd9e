// crates/bloomdex_core/src/consts.rs

use core::mem::size_of;

/// Document slots per block; also the number of blocks grouped under one meta-block.
pub const IDS_PER_BLOCK: usize = 512;

/// 64-bit words in one bit row (`IDS_PER_BLOCK / 64`).
pub const WORDS_PER_ROW: usize = IDS_PER_BLOCK / 64;

/// Default meta width multiplier for a flat index (meta_bits = block_bits * META_SCALE).
pub const META_SCALE: usize = 64;

/// Fixed number of shard slots in a sharded index.
pub const SHARD_COUNT: usize = 32;

/// Smallest block width a shard is ever created with.
pub const MIN_SHARD_BITS: usize = 128;

/// Shard meta width multiplier (meta_bits = block_bits * SHARD_META_SCALE).
pub const SHARD_META_SCALE: usize = 512;

/// Narrowest accepted bloom width.
pub const MIN_BITS: usize = 64;

/// Widest accepted bloom width; positions are derived in 32-bit arithmetic.
pub const MAX_BITS: u64 = 1 << 32;

pub const MAX_HASHES: u32 = 64;

pub const DEFAULT_BLOCK_BITS: usize = 256;
pub const DEFAULT_HASHES: u32 = 4;
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

const _: () = { assert!(WORDS_PER_ROW * 64 == IDS_PER_BLOCK); };
const _: () = { assert!(size_of::<[u64; WORDS_PER_ROW]>() == 64); };
