// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample format conversion between the decoder's internal `f32` domain and the caller-facing
//! output formats.

/// Output sample format requested by a caller of the container decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Signed 16-bit interleaved PCM.
    S16,
    /// 32-bit interleaved float PCM, already the decoder's native domain.
    F32,
}

/// Clamps a `f32` sample to the canonical `[-1.0, 1.0]` range.
#[inline]
pub fn clamp_f32(val: f32) -> f32 {
    val.clamp(-1.0, 1.0)
}

/// Converts a `[-1.0, 1.0]` float sample to signed 16-bit PCM, clamping out-of-range input rather
/// than wrapping it.
#[inline]
pub fn f32_to_i16(val: f32) -> i16 {
    let clamped = clamp_f32(val);
    // 32767.0 rather than 32768.0: keeps +1.0 and -1.0 symmetric around zero instead of letting
    // -1.0 map to a value one magnitude larger than +1.0's.
    (clamped * 32767.0).round() as i16
}

/// A caller-supplied output buffer, tagged by the format samples should be converted to on the
/// way out. Carrying the format alongside the buffer (rather than as a separate enum argument)
/// makes it impossible to pass an `i16` buffer together with a mismatched `F32` format tag.
pub enum SampleBuf<'a> {
    /// Signed 16-bit interleaved PCM.
    I16(&'a mut [i16]),
    /// 32-bit interleaved float PCM, already the decoder's native domain.
    F32(&'a mut [f32]),
}

impl SampleBuf<'_> {
    pub fn format(&self) -> SampleFormat {
        match self {
            SampleBuf::I16(_) => SampleFormat::S16,
            SampleBuf::F32(_) => SampleFormat::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleBuf::I16(buf) => buf.len(),
            SampleBuf::F32(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_floats() {
        assert_eq!(clamp_f32(1.5), 1.0);
        assert_eq!(clamp_f32(-1.5), -1.0);
        assert_eq!(clamp_f32(0.25), 0.25);
    }

    #[test]
    fn converts_full_scale_without_overflow() {
        assert_eq!(f32_to_i16(1.0), 32767);
        assert_eq!(f32_to_i16(-1.0), -32767);
        assert_eq!(f32_to_i16(0.0), 0);
    }

    #[test]
    fn sample_buf_reports_its_own_format() {
        let mut i16_data = [0i16; 4];
        assert_eq!(SampleBuf::I16(&mut i16_data).format(), SampleFormat::S16);

        let mut f32_data = [0.0f32; 4];
        assert_eq!(SampleBuf::F32(&mut f32_data).format(), SampleFormat::F32);
    }
}
