// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoder for the kwl lossy audio container.
//!
//! A kwl stream is a 32-byte header followed by a zlib-framed deflate stream of frequency-domain
//! blocks; [`KwlDecoder`] parses the header, pulls blocks through [`kwl_inflate::Inflater`],
//! dequantizes them, and runs them through an inverse MDCT with ping-pong overlap-add to produce
//! continuous PCM.

mod decoder;
mod header;
pub mod wav;

pub use decoder::KwlDecoder;
pub use header::{Header, KwlFlags};
pub use kwl_core::errors::{KwlError, Result};
pub use kwl_core::resample::linear_resample;
pub use kwl_core::sample::{SampleBuf, SampleFormat};
