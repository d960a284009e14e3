// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Modified Discrete Cosine Transform (forward and inverse), built on top of an N/4-point complex
//! FFT via the standard fold/twiddle/FFT/twiddle decomposition.
//!
//! Reference: Zhang, "Fast MDCT algorithm based on FFT", musicdsp.org #270.

use super::complex::Complex;
use super::fft::Fft;

/// A fixed-size MDCT/IMDCT transform pair operating on `n` time-domain samples and `n/2`
/// frequency-domain coefficients.
pub struct Mdct {
    n: usize,
    fft: Fft,
    /// `twiddle[k]`, for `k` in `0..n/4`.
    twiddle: Vec<Complex>,
    /// Analysis/synthesis window applied over the full `n`-sample span.
    window: Vec<f32>,
    /// Scale applied to the forward transform's output.
    prescale: f32,
    /// Scale applied to the inverse transform's output.
    postscale: f32,
    /// Reused FFT scratch buffer, `n/4` complex samples.
    scratch: Vec<Complex>,
}

impl Mdct {
    /// Builds an `n`-point MDCT/IMDCT pair. `n` must be a power of two and a multiple of four.
    /// `prescale` and `postscale` default to `1.0` and `2.0 / n` respectively when `None`, which
    /// are the correct values for an un-windowed IMDCT; windowed use (the common case) should
    /// supply both explicitly. `window` defaults to all-ones (no windowing) when `None`.
    pub fn new(n: usize, prescale: Option<f32>, postscale: Option<f32>, window: Option<&[f32]>) -> Self {
        assert!(n > 0 && n % 4 == 0 && n.is_power_of_two(), "mdct size must be a power of two multiple of 4");

        let n4 = n / 4;
        let a = std::f32::consts::PI * 2.0 / (8 * n) as f32;
        let o = std::f32::consts::PI * 2.0 / n as f32;
        let twiddle = (0..n4).map(|i| Complex::expi(-(a + o * i as f32))).collect();

        let window = match window {
            Some(w) => {
                assert_eq!(w.len(), n);
                w.to_vec()
            }
            None => vec![1.0; n],
        };

        Mdct {
            n,
            fft: Fft::new(n4),
            twiddle,
            window,
            prescale: prescale.unwrap_or(1.0),
            postscale: postscale.unwrap_or(2.0 / n as f32),
            scratch: vec![Complex::default(); n4],
        }
    }

    /// Size of the time-domain block this transform operates on.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    fn get(&self, data: &[f32], index: usize) -> f32 {
        data[index] * self.window[index]
    }

    #[inline]
    fn set(&self, data: &mut [f32], index: usize, value: f32) {
        data[index] = value * self.window[index];
    }

    /// Forward MDCT: `data` holds `n` windowed time-domain samples, `mdct_data` receives `n/2`
    /// frequency-domain coefficients.
    ///
    /// Not used on the decode path; kept so the transform pair can be exercised symmetrically in
    /// tests and by tools that need to re-encode a block (e.g. for round-trip verification).
    pub fn forward(&mut self, data: &[f32], mdct_data: &mut [f32]) {
        assert_eq!(data.len(), self.n);
        assert_eq!(mdct_data.len(), self.n / 2);

        let n4 = self.n / 4;
        let n2 = 2 * n4;
        let n34 = 3 * n4;
        let n54 = 5 * n4;

        let mut i = 0;
        while i < n4 {
            let c = Complex::new(
                self.get(data, n34 - 1 - i) + self.get(data, n34 + i),
                self.get(data, n4 + i) - self.get(data, n4 - 1 - i),
            );
            self.scratch[i >> 1] = c * self.twiddle[i >> 1];
            i += 2;
        }
        while i < n2 {
            let c = Complex::new(
                self.get(data, n34 - 1 - i) - self.get(data, i - n4),
                self.get(data, n4 + i) + self.get(data, n54 - 1 - i),
            );
            self.scratch[i >> 1] = c * self.twiddle[i >> 1];
            i += 2;
        }

        self.fft.forward(&mut self.scratch);

        let mut i = 0;
        while i < n2 {
            let mut c = self.scratch[i >> 1];
            c *= self.twiddle[i >> 1];
            c *= self.prescale;
            mdct_data[i] = -c.re;
            mdct_data[n2 - 1 - i] = c.im;
            i += 2;
        }
    }

    /// Inverse MDCT: `mdct_data` holds `n/2` frequency-domain coefficients, `data` receives `n`
    /// windowed time-domain samples.
    pub fn inverse(&mut self, mdct_data: &[f32], data: &mut [f32]) {
        assert_eq!(mdct_data.len(), self.n / 2);
        assert_eq!(data.len(), self.n);

        let n4 = self.n / 4;
        let n2 = 2 * n4;
        let n34 = 3 * n4;
        let n54 = 5 * n4;

        let mut i = 0;
        while i < n2 {
            let mut c = Complex::new(mdct_data[i], mdct_data[n2 - 1 - i]);
            c *= self.twiddle[i >> 1];
            c *= -2.0;
            self.scratch[i >> 1] = c;
            i += 2;
        }

        self.fft.forward(&mut self.scratch);

        let mut i = 0;
        while i < n4 {
            let mut c = self.scratch[i >> 1];
            c *= self.twiddle[i >> 1];
            c *= self.postscale;
            self.set(data, n34 - 1 - i, c.re);
            self.set(data, n34 + i, c.re);
            self.set(data, n4 + i, -c.im);
            self.set(data, n4 - 1 - i, c.im);
            i += 2;
        }
        while i < n2 {
            let mut c = self.scratch[i >> 1];
            c *= self.twiddle[i >> 1];
            c *= self.postscale;
            self.set(data, n34 - 1 - i, c.re);
            self.set(data, i - n4, -c.re);
            self.set(data, n4 + i, -c.im);
            self.set(data, n54 - 1 - i, -c.im);
            i += 2;
        }
    }

    /// Overlap-adds two adjacent `n`-sample windowed blocks into `n/2` reconstructed samples:
    /// `out[i] = data0[i + n/2] + data1[i]`.
    pub fn overlap_add(data0: &[f32], data1: &[f32], out: &mut [f32]) {
        let n2 = data0.len() / 2;
        assert_eq!(data1.len(), data0.len());
        assert_eq!(out.len(), n2);
        for i in 0..n2 {
            out[i] = data0[i + n2] + data1[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_then_forward_recovers_original_shape() {
        let n = 32;
        let n2 = n / 2;
        let coeffs: Vec<f32> = (0..n2).map(|i| (i as f32 - n2 as f32 / 2.0) * 0.1).collect();

        let mut mdct = Mdct::new(n, None, None, None);
        let mut time = vec![0.0f32; n];
        mdct.inverse(&coeffs, &mut time);

        let mut back = vec![0.0f32; n2];
        mdct.forward(&time, &mut back);

        // An un-windowed forward transform of an un-windowed inverse transform's output recovers
        // the original coefficients up to the pre/postscale round trip (2/n * 1 here).
        for (a, b) in back.iter().zip(coeffs.iter()) {
            assert!((a - b).abs() < 0.05, "{} != {}", a, b);
        }
    }

    #[test]
    fn overlap_add_matches_definition() {
        let data0 = vec![1.0, 2.0, 3.0, 4.0];
        let data1 = vec![5.0, 6.0, 7.0, 8.0];
        let mut out = vec![0.0; 2];
        Mdct::overlap_add(&data0, &data1, &mut out);
        assert_eq!(out, vec![3.0 + 5.0, 4.0 + 6.0]);
    }
}
