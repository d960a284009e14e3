// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed 32-byte header at the start of every kwl stream.

use std::io::Read;

use kwl_core::errors::{malformed_header, Result};

/// Magic bytes every kwl stream starts with.
const MAGIC: [u8; 4] = *b"kwl\x1a";

/// The only format version this decoder understands.
const SUPPORTED_VERSION: u16 = 0x100;

bitflags::bitflags! {
    /// Flags stored in [`Header::flags`], controlling how the rest of the stream is interpreted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KwlFlags: u16 {
        /// The encoder used the normalized MDCT scaling (the only mode modern encoders produce).
        const NORMALIZED = 1 << 0;
        /// `Header::num_samples` holds the exact sample count of the original signal, letting
        /// playback trim the last frame's padding instead of reporting it as audio.
        const NUM_SAMPLES = 1 << 1;
        /// The very first sample of each channel is stored at full precision (as a float,
        /// alongside the quantized block) to avoid an audible DC step at the start of playback.
        const DC_OFFSET = 1 << 2;
        /// Disables the quantizer's half-step rounding bias.
        const NO_QBIAS = 1 << 3;
        /// Block scale factors and (when `DC_OFFSET` is set) the leading sample are stored as
        /// half-precision floats rather than full `f32`s.
        const HALF_FLOAT = 1 << 4;
    }
}

/// The decoded, endian-corrected kwl stream header.
#[derive(Debug, Clone)]
pub struct Header {
    pub version: u16,
    pub flags: KwlFlags,
    pub sample_rate: u32,
    pub num_channels: u8,
    pub quant_bits: u8,
    pub block_size: u16,
    pub num_frames: u32,
    pub last_frame_samples: u16,
    pub pow_scl: u16,
    pub num_samples: u64,
}

impl Header {
    /// Size of the on-disk header, in bytes.
    pub const SIZE: usize = 32;

    /// Reads and validates a header from `reader`, which must be positioned at the very start of
    /// the stream.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; Self::SIZE];
        reader.read_exact(&mut raw).map_err(kwl_core::KwlError::from)?;

        if raw[0..4] != MAGIC {
            return malformed_header("bad magic");
        }

        let version = u16::from_le_bytes([raw[4], raw[5]]);
        let flags = KwlFlags::from_bits_truncate(u16::from_le_bytes([raw[6], raw[7]]));
        let sample_rate = u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]);
        let num_channels = raw[12];
        let quant_bits = raw[13];
        let block_size = u16::from_le_bytes([raw[14], raw[15]]);
        let num_frames = u32::from_le_bytes([raw[16], raw[17], raw[18], raw[19]]);
        let last_frame_samples = u16::from_le_bytes([raw[20], raw[21]]);
        let pow_scl = u16::from_le_bytes([raw[22], raw[23]]);
        let num_samples = u64::from_le_bytes([
            raw[24], raw[25], raw[26], raw[27], raw[28], raw[29], raw[30], raw[31],
        ]);

        if version != SUPPORTED_VERSION {
            return malformed_header("unsupported version");
        }
        if block_size == 0 || !block_size.is_power_of_two() {
            return malformed_header("block size is not a nonzero power of two");
        }
        if num_channels == 0 {
            return malformed_header("zero channels");
        }
        if sample_rate == 0 {
            return malformed_header("zero sample rate");
        }
        if quant_bits == 0 || quant_bits > 15 {
            return malformed_header("quantizer bit depth out of range");
        }

        Ok(Header {
            version,
            flags,
            sample_rate,
            num_channels,
            quant_bits,
            block_size,
            num_frames,
            last_frame_samples,
            pow_scl,
            num_samples,
        })
    }

    /// The power scale exponent used by the dequantizer; `0.2` unless the header overrides it.
    pub fn power_scale(&self) -> f32 {
        const DEFAULT_POW_SCL: f32 = 0.2;
        if self.pow_scl != 0 {
            self.pow_scl as f32 / 65536.0
        }
        else {
            DEFAULT_POW_SCL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header_bytes() -> Vec<u8> {
        let mut raw = vec![0u8; Header::SIZE];
        raw[0..4].copy_from_slice(&MAGIC);
        raw[4..6].copy_from_slice(&SUPPORTED_VERSION.to_le_bytes());
        raw[6..8].copy_from_slice(&(KwlFlags::NORMALIZED.bits() | KwlFlags::NUM_SAMPLES.bits()).to_le_bytes());
        raw[8..12].copy_from_slice(&44_100u32.to_le_bytes());
        raw[12] = 2;
        raw[13] = 6;
        raw[14..16].copy_from_slice(&512u16.to_le_bytes());
        raw[16..20].copy_from_slice(&100u32.to_le_bytes());
        raw[20..22].copy_from_slice(&256u16.to_le_bytes());
        raw[22..24].copy_from_slice(&0u16.to_le_bytes());
        raw[24..32].copy_from_slice(&51_000u64.to_le_bytes());
        raw
    }

    #[test]
    fn parses_a_well_formed_header() {
        let raw = sample_header_bytes();
        let hdr = Header::read(&mut &raw[..]).unwrap();
        assert_eq!(hdr.sample_rate, 44_100);
        assert_eq!(hdr.num_channels, 2);
        assert_eq!(hdr.block_size, 512);
        assert_eq!(hdr.num_samples, 51_000);
        assert!(hdr.flags.contains(KwlFlags::NORMALIZED));
        assert!(hdr.flags.contains(KwlFlags::NUM_SAMPLES));
        assert_eq!(hdr.power_scale(), 0.2);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut raw = sample_header_bytes();
        raw[0] = b'x';
        assert!(Header::read(&mut &raw[..]).is_err());
    }

    #[test]
    fn rejects_non_power_of_two_block_size() {
        let mut raw = sample_header_bytes();
        raw[14..16].copy_from_slice(&500u16.to_le_bytes());
        assert!(Header::read(&mut &raw[..]).is_err());
    }

    #[test]
    fn overridden_power_scale_divides_by_65536() {
        let mut raw = sample_header_bytes();
        raw[22..24].copy_from_slice(&27_852u16.to_le_bytes());
        let hdr = Header::read(&mut &raw[..]).unwrap();
        assert!((hdr.power_scale() - 27_852.0 / 65_536.0).abs() < 1e-6);
    }
}
