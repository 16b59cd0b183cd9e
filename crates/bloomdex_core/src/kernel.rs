//! AND-until-empty intersection over bit rows.
//!
//! `acc &= rows[p]` for each position `p` in order, stopping as soon as `acc`
//! is all zero. Every kernel computes the same value as the scalar loop; the
//! vector one only does it with wider loads.
//!
//! Uses AVX2 on x86_64 when the `simd` feature is on and the CPU supports it,
//! scalar everywhere else.

use crate::bitrow::BitRow;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Impl {
    Scalar,
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    Avx2,
}

/// A selected intersection implementation.
///
/// Only constructible through `scalar`, `detect` or `all_available`, so a
/// vector variant never exists on a CPU that cannot run it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel(Impl);

impl Default for Kernel {
    fn default() -> Self {
        Self::detect()
    }
}

impl Kernel {
    pub const fn scalar() -> Self {
        Kernel(Impl::Scalar)
    }

    /// Best kernel for this CPU; probed once per process.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Kernel> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let k = Self::all_available().pop().unwrap_or(Self::scalar());
            tracing::debug!(kernel = k.name(), "intersection kernel selected");
            k
        })
    }

    /// Every kernel runnable here, scalar first.
    pub fn all_available() -> Vec<Kernel> {
        #[allow(unused_mut)]
        let mut out = vec![Self::scalar()];
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("avx2") {
                out.push(Kernel(Impl::Avx2));
            }
        }
        out
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            Impl::Scalar => "scalar",
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Impl::Avx2 => "avx2",
        }
    }

    /// AND `acc` with `rows[p]` for each `p` in `positions`, stopping once `acc` is zero.
    ///
    /// Panics if a visited position is not a valid row index.
    #[inline]
    pub fn intersect(self, acc: &mut BitRow, rows: &[BitRow], positions: &[u32]) {
        match self.0 {
            Impl::Scalar => intersect_scalar(acc, rows, positions),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            // SAFETY: Impl::Avx2 is only built after is_x86_feature_detected!("avx2")
            Impl::Avx2 => unsafe { intersect_avx2(acc, rows, positions) },
        }
    }
}

/// Portable reference kernel.
#[inline]
pub fn intersect_scalar(acc: &mut BitRow, rows: &[BitRow], positions: &[u32]) {
    for &p in positions {
        let row = &rows[p as usize];
        let mut any = 0u64;
        for (a, b) in acc.0.iter_mut().zip(row.0.iter()) {
            *a &= *b;
            any |= *a;
        }
        if any == 0 {
            return;
        }
    }
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn intersect_avx2(acc: &mut BitRow, rows: &[BitRow], positions: &[u32]) {
    use std::arch::x86_64::*;

    // BitRow is 64-byte aligned: two aligned 256-bit halves.
    let a = acc.0.as_mut_ptr() as *mut __m256i;
    let mut lo = _mm256_load_si256(a);
    let mut hi = _mm256_load_si256(a.add(1));

    for &p in positions {
        let row = rows[p as usize].0.as_ptr() as *const __m256i;
        lo = _mm256_and_si256(lo, _mm256_load_si256(row));
        hi = _mm256_and_si256(hi, _mm256_load_si256(row.add(1)));
        let any = _mm256_or_si256(lo, hi);
        if _mm256_testz_si256(any, any) == 1 {
            break;
        }
    }

    _mm256_store_si256(a, lo);
    _mm256_store_si256(a.add(1), hi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrow::popset;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_rows(rng: &mut StdRng, n: usize, density: u32) -> Vec<BitRow> {
        (0..n)
            .map(|_| {
                let mut r = BitRow::ZERO;
                for w in r.0.iter_mut() {
                    // OR of `density` random words: higher density, fewer zeroes
                    *w = (0..density).fold(0, |acc, _| acc | rng.random::<u64>());
                }
                r
            })
            .collect()
    }

    fn full_and(rows: &[BitRow], positions: &[u32]) -> BitRow {
        let mut acc = BitRow::ONES;
        for &p in positions {
            acc.and_assign(&rows[p as usize]);
        }
        acc
    }

    #[test]
    fn all_kernels_agree_with_plain_and() {
        let mut rng = StdRng::seed_from_u64(11);
        let rows = random_rows(&mut rng, 64, 3);
        for _ in 0..500 {
            let len = rng.random_range(0..12);
            let positions: Vec<u32> = (0..len).map(|_| rng.random_range(0..64)).collect();
            let want = full_and(&rows, &positions);
            for k in Kernel::all_available() {
                let mut acc = BitRow::ONES;
                k.intersect(&mut acc, &rows, &positions);
                assert_eq!(acc, want, "kernel {}", k.name());
            }
        }
    }

    #[test]
    fn stops_once_accumulator_is_empty() {
        let mut rows = vec![BitRow::ONES; 4];
        rows[2] = BitRow::ZERO;
        for k in Kernel::all_available() {
            let mut acc = BitRow::ONES;
            // 99 is never visited
            k.intersect(&mut acc, &rows, &[1, 2, 99]);
            assert!(acc.is_zero(), "kernel {}", k.name());
        }
    }

    #[test]
    fn empty_positions_leave_accumulator_untouched() {
        let rows = vec![BitRow::ZERO; 2];
        for k in Kernel::all_available() {
            let mut acc = BitRow::ONES;
            k.intersect(&mut acc, &rows, &[]);
            assert_eq!(acc, BitRow::ONES);
        }
    }

    #[test]
    fn order_does_not_change_result() {
        let mut rng = StdRng::seed_from_u64(3);
        let rows = random_rows(&mut rng, 16, 2);
        let mut positions: Vec<u32> = (0..16).collect();
        let want = full_and(&rows, &positions);
        positions.reverse();
        let mut acc = BitRow::ONES;
        Kernel::detect().intersect(&mut acc, &rows, &positions);
        assert_eq!(popset(&acc), popset(&want));
    }

    #[test]
    fn detect_is_available() {
        assert!(Kernel::all_available().contains(&Kernel::detect()));
        assert_eq!(Kernel::scalar().name(), "scalar");
    }
}
