// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A minimal linear resampler, supplemental to the core decode path.
//!
//! This is not the polyphase resampler a full playback engine would want; it exists so callers
//! with a fixed downstream sample rate (e.g. the `kwl-to-wav` demo) have something simple to
//! reach for without pulling in a dedicated DSP crate for a single conversion.

/// Resamples `input`, sampled at `src_rate` Hz, to `dst_rate` Hz using linear interpolation.
/// Returns `ceil(input.len() * dst_rate / src_rate)` samples.
pub fn linear_resample(input: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if input.is_empty() || src_rate == dst_rate {
        return input.to_vec();
    }

    let ratio = src_rate as f64 / dst_rate as f64;
    let out_len = ((input.len() as f64) * dst_rate as f64 / src_rate as f64).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos.floor() as usize;
        let frac = (pos - idx as f64) as f32;

        let a = input[idx.min(input.len() - 1)];
        let b = input[(idx + 1).min(input.len() - 1)];
        out.push(a + (b - a) * frac);
    }

    out
}

/// Downsamples `input` by averaging non-overlapping windows of `factor` samples. Unlike
/// [`linear_resample`], this is only valid for integer decimation and is cheaper when that is all
/// that's needed.
pub fn decimate_by_averaging(input: &[f32], factor: usize) -> Vec<f32> {
    assert!(factor > 0);
    if factor == 1 {
        return input.to_vec();
    }
    input
        .chunks(factor)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}
