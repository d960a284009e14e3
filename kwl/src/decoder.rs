// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame-by-frame decoding: dequantization, inverse MDCT synthesis, and the overlap-add that
//! turns consecutive blocks into continuous PCM, wrapped in a pull-style sample reader.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, warn};

use kwl_core::dsp::{vorbis_window_curve, Mdct};
use kwl_core::errors::Result;
use kwl_core::half_float::half_to_f32;
use kwl_core::io::BitReader;
use kwl_core::sample::{f32_to_i16, SampleBuf};
use kwl_inflate::{InflateFormat, Inflater};

use crate::header::{Header, KwlFlags};

/// Builds the dequantization table: `dequant[code]` maps a `quant_bits`-wide quantizer code to
/// the `f32` sample value it represents.
fn build_dequant_table(quant_bits: u8, pow_scl: f32, no_qbias: bool) -> Vec<f32> {
    let qsize = 1usize << quant_bits;
    let qbase = qsize >> 1;
    let qmax = qbase as i32 - 1;
    let bias = if no_qbias { 0.0 } else { 0.5 };
    let inv_qofs = 1.0 / (qmax as f32 + bias);

    (0..qsize)
        .map(|i| {
            let sb = i as i32 - qbase as i32;
            let sam = sb as f32 * inv_qofs;
            if sam == 0.0 { 0.0 } else { sam.abs().powf(1.0 / pow_scl) * sam.signum() }
        })
        .collect()
}

/// Reads a scale factor or DC-offset sample, honoring [`KwlFlags::HALF_FLOAT`].
fn read_scale<R: Read>(bits: &mut BitReader<R>, half_float: bool) -> Result<f32> {
    if half_float {
        let raw = bits.read_bits(16)?;
        Ok(half_to_f32(raw as u16))
    }
    else {
        let raw = bits.read_bits(32)?;
        Ok(f32::from_bits(raw))
    }
}

/// Dequantizes a single block, scaling each decoded code by `scale`.
fn dequantize(qbuf: &[u8], out: &mut [f32], dequant: &[f32], quant_bits: u8, scale: f32) {
    let mask = (1u32 << quant_bits) - 1;
    for (dst, &code) in out.iter_mut().zip(qbuf.iter()) {
        *dst = dequant[(code as u32 & mask) as usize] * scale;
    }
}

/// Decodes a kwl stream into PCM.
///
/// The decoder keeps two full-length IMDCT outputs per channel, alternating which one is
/// "current" each frame (`base`/`base ^ xor`); overlap-adding the previous frame's second half
/// against the current frame's first half reconstructs `block_size` final samples per channel.
/// The first frame is decoded eagerly when opening, priming the overlap history the same way the
/// reference decoder primes its iMDCT before the first sample read.
pub struct KwlDecoder<R: Read> {
    header: Header,
    bits: BitReader<Inflater<R>>,
    dequant: Vec<f32>,
    mdct: Mdct,
    /// Per-channel history, each `2 * n` samples (`n = 2 * block_size`): two back-to-back
    /// windowed IMDCT outputs, selected by `base` / `base ^ xor`.
    history: Vec<Vec<f32>>,
    mdct_scratch: Vec<f32>,
    qbuf: Vec<u8>,
    base: usize,
    xor: usize,
    /// This frame's reconstructed samples, one row per channel, `block_size` long.
    channel_samples: Vec<Vec<f32>>,
    /// Position within `channel_samples` the next `read_samples` call should resume from.
    cursor: usize,
    frames_remaining: u32,
    /// Remaining samples the caller is entitled to, when [`KwlFlags::NUM_SAMPLES`] is set.
    samples_remaining: Option<u64>,
    failed: bool,
}

impl<R: Read> KwlDecoder<R> {
    /// Opens a decoder over `reader`, positioned at the start of a kwl stream.
    pub fn open(mut reader: R) -> Result<Self> {
        let header = Header::read(&mut reader)?;
        Self::from_header(header, reader)
    }

    fn from_header(header: Header, reader: R) -> Result<Self> {
        let channels = header.num_channels as usize;
        let block_size = header.block_size as usize;
        let n = block_size * 2;

        let old = !header.flags.contains(KwlFlags::NORMALIZED);
        let two_n = 2.0 / n as f32;
        let (prescale, postscale) = if old { (1.0, two_n) } else { (2.0 * two_n, 0.5) };

        let window = vorbis_window_curve(n);
        let mdct = Mdct::new(n, Some(prescale), Some(postscale), Some(&window));

        let dequant = build_dequant_table(
            header.quant_bits,
            header.power_scale(),
            header.flags.contains(KwlFlags::NO_QBIAS),
        );

        let samples_remaining =
            header.flags.contains(KwlFlags::NUM_SAMPLES).then_some(header.num_samples);

        debug!(
            "kwl: {} ch, {} Hz, block_size {}, {} frames, {} quant bits",
            channels, header.sample_rate, block_size, header.num_frames, header.quant_bits
        );

        let inflater = Inflater::new(reader, InflateFormat::Zlib);
        let bits = BitReader::new(inflater);
        let frames_remaining = header.num_frames;

        let mut decoder = KwlDecoder {
            dequant,
            mdct,
            history: vec![vec![0.0f32; 2 * n]; channels],
            mdct_scratch: vec![0.0f32; block_size],
            qbuf: vec![0u8; block_size],
            base: n,
            xor: n,
            channel_samples: vec![vec![0.0f32; block_size]; channels],
            cursor: block_size,
            frames_remaining,
            samples_remaining,
            failed: false,
            header,
            bits,
        };

        if decoder.frames_remaining > 0 {
            // Priming decode: its overlap-add output is incomplete (there is no real previous
            // block yet) and must never reach the caller. Leaving `cursor` at `block_size` forces
            // the next `read_samples` call to decode the first real frame before returning
            // anything.
            decoder.decode_frame()?;
        }

        Ok(decoder)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn num_channels(&self) -> usize {
        self.header.num_channels as usize
    }

    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    /// Stream length in seconds, from `numSamples` when authoritative, else `blockSize *
    /// numFrames / sampleRate`.
    pub fn length_seconds(&self) -> f64 {
        if self.header.flags.contains(KwlFlags::NUM_SAMPLES) {
            self.header.num_samples as f64 / self.header.sample_rate as f64
        }
        else {
            (self.header.block_size as f64 * self.header.num_frames as f64) / self.header.sample_rate as f64
        }
    }

    /// Decodes the next frame into `channel_samples`, resetting the read cursor to its start.
    fn decode_frame(&mut self) -> Result<()> {
        let half_float = self.header.flags.contains(KwlFlags::HALF_FLOAT);
        let dc_offset = self.header.flags.contains(KwlFlags::DC_OFFSET);
        let n = self.mdct.n();

        for ch in 0..self.header.num_channels as usize {
            let scale = read_scale(&mut self.bits, half_float)?;

            self.qbuf[0] = 0;
            let start = if dc_offset { 1 } else { 0 };
            for slot in &mut self.qbuf[start..] {
                *slot = self.bits.read_byte()?;
            }

            dequantize(&self.qbuf, &mut self.mdct_scratch, &self.dequant, self.header.quant_bits, scale);

            if dc_offset {
                self.mdct_scratch[0] = read_scale(&mut self.bits, half_float)?;
            }

            let history = &mut self.history[ch];
            self.mdct.inverse(&self.mdct_scratch, &mut history[self.base..self.base + n]);

            // `base` and `base ^ xor` are always the buffer's two disjoint n-sample halves.
            let (first_half, second_half) = history.split_at(n);
            let (current, previous) =
                if self.base == 0 { (first_half, second_half) } else { (second_half, first_half) };
            Mdct::overlap_add(previous, current, &mut self.channel_samples[ch]);
        }

        self.base ^= self.xor;
        self.frames_remaining = self.frames_remaining.saturating_sub(1);
        Ok(())
    }

    /// Reads up to `num_samples` interleaved samples across `out_channels` channels into `out`,
    /// converting to whichever format `out` is tagged with and expanding a mono source into
    /// channel 1 (leaving any channel beyond that zero-filled) to fill extra requested channels.
    /// Returns the number of samples (not individual buffer elements) actually written.
    ///
    /// Once a decode error occurs, every subsequent call returns that same error without
    /// advancing the stream; call [`KwlDecoder::rewind`] to recover.
    pub fn read_samples(&mut self, out: SampleBuf<'_>, num_samples: usize, out_channels: usize) -> Result<usize> {
        match out {
            SampleBuf::I16(out) => self.read_samples_as(out, num_samples, out_channels, f32_to_i16),
            SampleBuf::F32(out) => self.read_samples_as(out, num_samples, out_channels, |sample| sample),
        }
    }

    /// Shared sample-emission loop behind [`KwlDecoder::read_samples`]; `convert` is the fast-path
    /// float-to-target conversion for whichever format the caller asked for, monomorphized and
    /// inlined per call site rather than dispatched at runtime.
    fn read_samples_as<T: Copy>(
        &mut self,
        out: &mut [T],
        num_samples: usize,
        out_channels: usize,
        convert: impl Fn(f32) -> T,
    ) -> Result<usize> {
        if self.failed {
            return kwl_core::errors::corrupt_bitstream("decoder is in a failed state; call rewind()");
        }
        debug_assert!(out.len() >= num_samples * out_channels);

        let block_size = self.header.block_size as usize;
        let channels_in_file = self.channel_samples.len();
        let mono = channels_in_file == 1;
        let mut produced = 0;
        let mut remaining = num_samples;

        while remaining > 0 {
            if self.cursor >= block_size {
                if self.frames_remaining == 0 {
                    break;
                }
                if let Err(err) = self.decode_frame() {
                    self.failed = true;
                    return Err(err);
                }
                self.cursor = 0;
            }

            let available = block_size - self.cursor;
            let take = available.min(remaining);
            for i in 0..take {
                for ch in 0..out_channels {
                    let src = if mono {
                        // The file has one channel: replicate it into channel 1 (mono-to-stereo
                        // expansion) but leave anything beyond that silent.
                        if ch <= 1 { self.channel_samples[0][self.cursor + i] } else { 0.0 }
                    }
                    else if ch < channels_in_file {
                        self.channel_samples[ch][self.cursor + i]
                    }
                    else {
                        0.0
                    };
                    out[(produced + i) * out_channels + ch] = convert(src);
                }
            }

            self.cursor += take;
            produced += take;
            remaining -= take;
        }

        if let Some(budget) = self.samples_remaining {
            let capped = (produced as u64).min(budget);
            if capped < produced as u64 {
                warn!("kwl: clipping {} decoded samples to the declared sample count", produced as u64 - capped);
            }
            self.samples_remaining = Some(budget - capped);
            produced = capped as usize;
        }

        Ok(produced)
    }
}

impl<R: Read + Seek> KwlDecoder<R> {
    /// Rewinds the underlying stream and re-parses the header, for loop-streaming. Consumes and
    /// replaces `self` since every piece of decode state (Inflater, BitReader, overlap history)
    /// is rebuilt from scratch, exactly as the reference decoder's `Rewind` re-runs `ParseHeader`.
    pub fn rewind(self) -> Result<Self> {
        let mut reader = self.bits.into_inner().into_inner();
        reader.seek(SeekFrom::Start(0)).map_err(kwl_core::KwlError::from)?;
        Self::open(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequant_table_is_antisymmetric_around_zero() {
        let table = build_dequant_table(6, 0.2, false);
        let qbase = table.len() / 2;
        for i in 1..qbase {
            assert!((table[qbase + i] + table[qbase - i]).abs() < 1e-6);
        }
    }
}
