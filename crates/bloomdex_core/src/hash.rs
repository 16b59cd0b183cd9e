//! Bloom bit derivation: two 32-bit integer mixers combined by double hashing.
//!
//! Position `i` for a power-of-two width `W` is `(h1 + i * h2) mod W`, with
//! `h1 = xorshift32(t)` and `h2 = jenkins32(t)`. All arithmetic wraps at 32
//! bits, which is exact for every `W <= 2^32`.

/// Marsaglia's xorshift (13, 17, 5) step.
#[inline]
pub fn xorshift32(mut y: u32) -> u32 {
    y ^= y << 13;
    y ^= y >> 17;
    y ^= y << 5;
    y
}

/// Bob Jenkins' six-shift 32-bit integer hash.
#[inline]
pub fn jenkins32(mut a: u32) -> u32 {
    a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    a = (a ^ 0xc761_c23c) ^ (a >> 19);
    a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    a = (a ^ 0xb55a_4f09) ^ (a >> 16);
    a
}

/// Mask selecting `[0, width)` for a power-of-two `width <= 2^32`.
#[inline]
pub fn mask_for(width: usize) -> u32 {
    debug_assert!(width.is_power_of_two());
    (width as u64 - 1) as u32
}

/// The two base hashes of one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleHash {
    h1: u32,
    h2: u32,
}

impl DoubleHash {
    #[inline]
    pub fn new(term: u32) -> Self {
        Self { h1: xorshift32(term), h2: jenkins32(term) }
    }

    #[inline]
    pub fn nth(&self, i: u32, mask: u32) -> u32 {
        self.h1.wrapping_add(i.wrapping_mul(self.h2)) & mask
    }

    /// The first `hashes` positions under `mask`; empty when `hashes == 0`.
    #[inline]
    pub fn positions(self, hashes: u32, mask: u32) -> impl Iterator<Item = u32> {
        (0..hashes).map(move |i| self.nth(i, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixers_match_reference_values() {
        assert_eq!(xorshift32(0), 0);
        assert_eq!(xorshift32(1), 270369);
        assert_eq!(xorshift32(0xdead_beef), 1199382711);
        assert_eq!(jenkins32(0), 1800329511);
        assert_eq!(jenkins32(1), 3028713910);
    }

    #[test]
    fn positions_follow_double_hashing() {
        let t = 0x1234_5678;
        let (h1, h2) = (xorshift32(t), jenkins32(t));
        let got: Vec<u32> = DoubleHash::new(t).positions(5, 255).collect();
        let want: Vec<u32> = (0..5u32)
            .map(|i| ((h1 as u64 + i as u64 * h2 as u64) % 256) as u32)
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn widths_are_independent_but_consistent() {
        let dh = DoubleHash::new(42);
        let narrow = mask_for(256);
        let wide = mask_for(256 * 64);
        for i in 0..8 {
            assert_eq!(dh.nth(i, wide) & narrow, dh.nth(i, narrow));
        }
        assert_eq!(mask_for(1 << 32), u32::MAX);
    }

    #[test]
    fn zero_hashes_yield_nothing() {
        assert_eq!(DoubleHash::new(7).positions(0, 1023).count(), 0);
    }
}
