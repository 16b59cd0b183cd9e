//! A block: `IDS_PER_BLOCK` document slots sharing one bloom row table.
//!
//! Row `p` holds the slots whose signature has bloom bit `p` set, so a query
//! is an AND across the rows of its bit positions.

use crate::bitrow::{popset, BitRow};
use crate::consts::IDS_PER_BLOCK;
use crate::errors::{BloomError, Result};
use crate::kernel::Kernel;

#[derive(Clone)]
pub struct Block {
    bits: Vec<BitRow>,
    // slots [0, valid) are occupied
    valid: usize,
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block").field("width", &self.bits.len()).field("valid", &self.valid).finish()
    }
}

impl Block {
    /// Empty block with `width` rows. `width` must be a power of two.
    pub fn new(width: usize) -> Self {
        assert!(width.is_power_of_two(), "block width {width} is not a power of two");
        Self { bits: vec![BitRow::ZERO; width], valid: 0 }
    }

    pub fn width(&self) -> usize { self.bits.len() }

    pub fn num_documents(&self) -> usize { self.valid }

    pub fn is_full(&self) -> bool { self.valid == IDS_PER_BLOCK }

    /// Reserve the next free slot.
    pub fn add_document(&mut self) -> Result<usize> {
        if self.is_full() {
            return Err(BloomError::BlockFull);
        }
        let slot = self.valid;
        self.valid += 1;
        Ok(slot)
    }

    /// Mark `slot` in row `bit`. Out-of-range arguments panic.
    #[inline]
    pub fn set_bit(&mut self, slot: usize, bit: u32) {
        assert!(slot < IDS_PER_BLOCK, "slot {slot} out of range");
        self.bits[bit as usize].set(slot);
    }

    #[inline]
    pub fn get_bit(&self, slot: usize, bit: u32) -> bool {
        assert!(slot < IDS_PER_BLOCK, "slot {slot} out of range");
        self.bits[bit as usize].get(slot)
    }

    pub fn rows(&self) -> &[BitRow] { &self.bits }

    /// Occupied slots that have every bit in `positions` set, ascending.
    /// No positions means no signal: the result is empty.
    pub fn query(&self, positions: &[u32]) -> Vec<usize> {
        self.query_with(Kernel::detect(), positions)
    }

    pub fn query_with(&self, kernel: Kernel, positions: &[u32]) -> Vec<usize> {
        if positions.is_empty() || self.valid == 0 {
            return Vec::new();
        }
        let mut acc = BitRow::prefix(self.valid);
        kernel.intersect(&mut acc, &self.bits, positions);
        popset(&acc)
    }

    pub fn memory_bytes(&self) -> usize {
        self.bits.len() * std::mem::size_of::<BitRow>()
    }
}
