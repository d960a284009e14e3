// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frequency-to-time synthesis primitives: a radix-2 complex FFT and the MDCT/IMDCT built on it.

mod complex;
mod fft;
mod mdct;
mod window;

pub use complex::Complex;
pub use fft::Fft;
pub use mdct::Mdct;
pub use window::{vorbis_window, vorbis_window_curve};
