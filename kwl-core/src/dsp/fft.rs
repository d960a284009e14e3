// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A radix-2, decimation-in-time, in-place complex FFT.
//!
//! Sized for use as the kernel underneath the MDCT: `Fft::new(n)` requires `n` to be a power of
//! two and precomputes both the per-stage twiddle factors and the bit-reversal permutation once,
//! so repeated transforms of the same size (one per audio frame) pay no setup cost.

use super::complex::Complex;

/// An in-place radix-2 FFT of a fixed size.
pub struct Fft {
    n: usize,
    stages: u32,
    /// `twiddle[p]` is the base rotation for stage `p`; `e^(-i * pi / 2^p)`.
    twiddle: Vec<Complex>,
    /// Index pairs to swap for the bit-reversal permutation, precomputed so each pair is only
    /// swapped once.
    swaps: Vec<(u32, u32)>,
}

impl Fft {
    /// Builds an FFT plan for transforms of size `n`, which must be a power of two.
    pub fn new(n: usize) -> Self {
        assert!(n > 0 && n.is_power_of_two(), "fft size must be a power of two");
        let stages = n.trailing_zeros();

        let twiddle = (0..stages)
            .map(|p| Complex::expi(-std::f32::consts::PI / (1u32 << p) as f32))
            .collect();

        let mut swaps = Vec::new();
        for i in 0..n as u32 {
            let ri = reverse_bits(i, stages);
            if i < ri {
                swaps.push((i, ri));
            }
        }

        Fft { n, stages, twiddle, swaps }
    }

    /// Size of transform this plan computes.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Computes the forward DFT of `data` in place.
    pub fn forward(&self, data: &mut [Complex]) {
        assert_eq!(data.len(), self.n, "data length must match fft size");

        for &(i0, i1) in &self.swaps {
            data.swap(i0 as usize, i1 as usize);
        }

        for p in 0..self.stages {
            let step = 1usize << p;
            let step2 = step * 2;
            let w = self.twiddle[p as usize];
            let mut s = Complex::new(1.0, 0.0);

            for i in 0..step {
                let mut j = i;
                while j < self.n {
                    let j2 = j + step;
                    let tmp = data[j2] * s;
                    data[j2] = data[j] - tmp;
                    data[j] += tmp;
                    j += step2;
                }
                s *= w;
            }
        }
    }

    /// Computes the inverse DFT of `data` in place: conjugate, forward transform, conjugate and
    /// scale by `1/n`.
    pub fn inverse(&self, data: &mut [Complex]) {
        for c in data.iter_mut() {
            c.conjugate();
        }
        self.forward(data);
        let scale = 1.0 / self.n as f32;
        for c in data.iter_mut() {
            c.conjugate();
            *c *= scale;
        }
    }
}

/// Reverses the lowest `bits` bits of `value`.
fn reverse_bits(value: u32, bits: u32) -> u32 {
    let mut v = value;
    let mut r = 0u32;
    for _ in 0..bits {
        r = (r << 1) | (v & 1);
        v >>= 1;
    }
    r
}
