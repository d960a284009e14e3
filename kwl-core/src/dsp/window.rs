// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Vorbis analysis/synthesis window, used to taper MDCT blocks before overlap-add.

/// Evaluates the Vorbis window function at sample `x` of an `n`-sample window:
/// `sin(pi/2 * sin^2((x + 0.5) * pi / n))`.
#[inline]
pub fn vorbis_window(x: usize, n: usize) -> f32 {
    let frac = (x as f64 + 0.5) * std::f64::consts::PI / n as f64;
    let s = frac.sin();
    ((std::f64::consts::FRAC_PI_2) * s * s).sin() as f32
}

/// Builds a full `n`-sample Vorbis window curve.
pub fn vorbis_window_curve(n: usize) -> Vec<f32> {
    (0..n).map(|x| vorbis_window(x, n)).collect()
}
