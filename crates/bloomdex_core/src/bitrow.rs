//! Fixed-width bit rows and set-bit extraction.

use crate::consts::{IDS_PER_BLOCK, WORDS_PER_ROW};
use std::fmt;

/// One `IDS_PER_BLOCK`-bit row: bit `i` of word `w` stands for slot `w * 64 + i`.
///
/// Cache-line aligned so a row is a single 64-byte load for the vector kernel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C, align(64))]
pub struct BitRow(pub [u64; WORDS_PER_ROW]);

impl BitRow {
    pub const ZERO: Self = Self([0; WORDS_PER_ROW]);
    pub const ONES: Self = Self([u64::MAX; WORDS_PER_ROW]);

    /// Row with exactly the slots `[0, valid)` set.
    pub fn prefix(valid: usize) -> Self {
        debug_assert!(valid <= IDS_PER_BLOCK);
        let mut r = Self::ZERO;
        for (w, word) in r.0.iter_mut().enumerate() {
            let n = valid.saturating_sub(w * 64);
            *word = match n {
                0 => 0,
                1..=63 => (1u64 << n) - 1,
                _ => u64::MAX,
            };
        }
        r
    }

    #[inline]
    pub fn set(&mut self, slot: usize) {
        self.0[slot >> 6] |= 1u64 << (slot & 63);
    }

    #[inline]
    pub fn get(&self, slot: usize) -> bool {
        self.0[slot >> 6] & (1u64 << (slot & 63)) != 0
    }

    #[inline]
    pub fn and_assign(&mut self, other: &BitRow) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a &= *b;
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().fold(0, |acc, w| acc | w) == 0
    }

    pub fn count_ones(&self) -> u32 {
        self.0.iter().map(|w| w.count_ones()).sum()
    }
}

impl fmt::Debug for BitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitRow[")?;
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{w:016x}")?;
        }
        write!(f, "]")
    }
}

/// Ascending indices of the set bits in `row`.
///
/// Walks one word at a time and steps by trailing-zero count, so the cost is
/// proportional to the number of set bits, not the row width.
pub fn popset(row: &BitRow) -> Vec<usize> {
    let mut out = Vec::with_capacity(row.count_ones() as usize);
    for (w, &word) in row.0.iter().enumerate() {
        let base = w * 64;
        let mut u = word;
        while u != 0 {
            out.push(base + u.trailing_zeros() as usize);
            u &= u - 1;
        }
    }
    out
}
