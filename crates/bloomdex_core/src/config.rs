//! Index configuration and bloom sizing.
//!
//! Both configs are plain serde structs so they can be kept next to the data
//! they describe (JSON on disk, CLI flags, ...). Nothing is corrected
//! silently: `validate` rejects what the index cannot honour.

use crate::consts::{
    DEFAULT_BLOCK_BITS, DEFAULT_FALSE_POSITIVE_RATE, DEFAULT_HASHES, MAX_BITS, MAX_HASHES,
    META_SCALE, MIN_BITS, MIN_SHARD_BITS, SHARD_META_SCALE,
};
use crate::errors::{BloomError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Flat index configuration: `{block_bits, meta_bits, hashes}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Bloom width of one document signature (rows per block).
    pub block_bits: usize,
    /// Bloom width of one block-group signature (rows per meta-block).
    pub meta_bits: usize,
    /// Bit positions derived per term.
    pub hashes: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_BITS, DEFAULT_HASHES)
    }
}

impl IndexConfig {
    /// Block width and hash count; meta width defaults to `block_bits * META_SCALE`.
    pub fn new(block_bits: usize, hashes: u32) -> Self {
        Self { block_bits, meta_bits: block_bits.saturating_mul(META_SCALE), hashes }
    }

    pub fn with_meta_bits(mut self, meta_bits: usize) -> Self {
        self.meta_bits = meta_bits;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_width("block_bits", self.block_bits)?;
        check_width("meta_bits", self.meta_bits)?;
        if self.meta_bits < self.block_bits {
            return Err(BloomError::InvalidConfig(format!(
                "meta_bits ({}) must not be smaller than block_bits ({})",
                self.meta_bits, self.block_bits
            )));
        }
        check_hashes(self.hashes)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: IndexConfig = serde_json::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Sharded index configuration: `{false_positive_rate, hashes}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShardedConfig {
    /// Target per-document false-positive rate, strictly inside (0, 1).
    pub false_positive_rate: f64,
    pub hashes: u32,
}

impl Default for ShardedConfig {
    fn default() -> Self {
        Self { false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE, hashes: DEFAULT_HASHES }
    }
}

impl ShardedConfig {
    pub fn new(false_positive_rate: f64, hashes: u32) -> Self {
        Self { false_positive_rate, hashes }
    }

    pub fn validate(&self) -> Result<()> {
        let p = self.false_positive_rate;
        if !(p > 0.0 && p < 1.0) {
            return Err(BloomError::InvalidConfig(format!(
                "false_positive_rate must be in (0, 1), got {p}"
            )));
        }
        check_hashes(self.hashes)
    }

    /// Configuration of the shard that holds documents with `term_count` terms.
    ///
    /// Block width is sized for `next_power_of_two(term_count)` terms at the
    /// target rate and floored at `MIN_SHARD_BITS`; meta width is
    /// `block_bits * SHARD_META_SCALE`.
    pub fn index_config_for(&self, term_count: usize) -> Result<IndexConfig> {
        let capacity = (term_count.max(1) as u64).next_power_of_two();
        let block = bits_needed(capacity, self.false_positive_rate).max(MIN_SHARD_BITS as u64);
        let meta = block.saturating_mul(SHARD_META_SCALE as u64);
        let (block_bits, meta_bits) = match (usize::try_from(block), usize::try_from(meta)) {
            (Ok(b), Ok(m)) => (b, m),
            _ => {
                return Err(BloomError::InvalidConfig(format!(
                    "shard for {term_count} terms needs {block} bits, too wide for this platform"
                )))
            }
        };
        let cfg = IndexConfig { block_bits, meta_bits, hashes: self.hashes };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: ShardedConfig = serde_json::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Bloom width for `capacity` elements at `false_positive_rate`:
/// `next_power_of_two(ceil(capacity * -ln(p) / ln(2)^2))`.
pub fn bits_needed(capacity: u64, false_positive_rate: f64) -> u64 {
    let ln2 = std::f64::consts::LN_2;
    let raw = (capacity as f64 * -false_positive_rate.ln() / (ln2 * ln2)).ceil();
    // clamp keeps next_power_of_two from overflowing
    let raw = raw.clamp(1.0, (1u64 << 63) as f64) as u64;
    raw.next_power_of_two()
}

fn check_width(name: &str, bits: usize) -> Result<()> {
    if !bits.is_power_of_two() || bits < MIN_BITS || bits as u64 > MAX_BITS {
        return Err(BloomError::InvalidConfig(format!(
            "{name} must be a power of two in [{MIN_BITS}, {MAX_BITS}], got {bits}"
        )));
    }
    Ok(())
}

fn check_hashes(hashes: u32) -> Result<()> {
    if hashes == 0 || hashes > MAX_HASHES {
        return Err(BloomError::InvalidConfig(format!(
            "hashes must be in [1, {MAX_HASHES}], got {hashes}"
        )));
    }
    Ok(())
}
