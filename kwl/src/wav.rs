// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A minimal canonical-form RIFF/WAVE writer for interleaved 16-bit PCM.
//!
//! This is not a general-purpose RIFF encoder: it writes exactly the three chunks (`fmt `,
//! `data`, wrapped in a `RIFF`/`WAVE` header) a PCM file needs, with no extension chunks or
//! metadata. It exists for the `kwl-to-wav` demo and for tests that want a playable artifact.

use std::io::Write;

use kwl_core::errors::Result;

const FMT_CHUNK_SIZE: u32 = 16;
const BITS_PER_SAMPLE: u16 = 16;

/// Writes a complete WAV file header plus the interleaved `i16` sample payload.
pub fn write_wav<W: Write>(writer: &mut W, sample_rate: u32, num_channels: u16, samples: &[i16]) -> Result<()> {
    let data_size = (samples.len() * 2) as u32;
    let block_align = num_channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * block_align as u32;
    let riff_size = 4 + (8 + FMT_CHUNK_SIZE) + (8 + data_size);

    writer.write_all(b"RIFF")?;
    writer.write_all(&riff_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    writer.write_all(b"fmt ")?;
    writer.write_all(&FMT_CHUNK_SIZE.to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // PCM
    writer.write_all(&num_channels.to_le_bytes())?;
    writer.write_all(&sample_rate.to_le_bytes())?;
    writer.write_all(&byte_rate.to_le_bytes())?;
    writer.write_all(&block_align.to_le_bytes())?;
    writer.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    for &sample in samples {
        writer.write_all(&sample.to_le_bytes())?;
    }

    Ok(())
}
