// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the error taxonomy shared by every crate in the decoder stack.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// `KwlError` enumerates every way a decode operation can fail.
///
/// Once a decoder (bit reader, inflater, or container decoder) returns one of these variants it
/// is expected to stay in that failed state; callers should not attempt to keep pulling samples
/// or bytes out of it afterwards.
#[derive(Debug)]
pub enum KwlError {
    /// A fixed-size header, or a field within it, did not match the values a well-formed stream
    /// is required to have (bad magic, unsupported version, a size field that is zero or not a
    /// power of two, and so on).
    MalformedHeader(&'static str),
    /// The bitstream violated a structural invariant of its own encoding: an over-subscribed
    /// Huffman tree, a back-reference distance larger than the dictionary, a reserved block type.
    CorruptBitstream(&'static str),
    /// The underlying byte source ran out of data before a complete unit (header, block, frame)
    /// could be read.
    TruncatedInput,
    /// A checksum recorded in the stream did not match the checksum computed while decoding.
    ChecksumMismatch { expected: u32, computed: u32 },
    /// A caller-supplied argument was invalid for the operation (wrong slice length, zero-sized
    /// buffer, index out of range, and similar misuse).
    InvalidArgument(&'static str),
    /// An I/O error occurred while reading from the underlying byte source.
    Io(io::Error),
}

impl fmt::Display for KwlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KwlError::MalformedHeader(msg) => write!(f, "malformed header: {}", msg),
            KwlError::CorruptBitstream(msg) => write!(f, "corrupt bitstream: {}", msg),
            KwlError::TruncatedInput => write!(f, "truncated input"),
            KwlError::ChecksumMismatch { expected, computed } => {
                write!(f, "checksum mismatch: expected {:#010x}, computed {:#010x}", expected, computed)
            }
            KwlError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            KwlError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl StdError for KwlError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            KwlError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for KwlError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => KwlError::TruncatedInput,
            _ => KwlError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, KwlError>;

/// Convenience constructor for [`KwlError::MalformedHeader`].
pub fn malformed_header<T>(msg: &'static str) -> Result<T> {
    Err(KwlError::MalformedHeader(msg))
}

/// Convenience constructor for [`KwlError::CorruptBitstream`].
pub fn corrupt_bitstream<T>(msg: &'static str) -> Result<T> {
    Err(KwlError::CorruptBitstream(msg))
}

/// Convenience constructor for [`KwlError::TruncatedInput`].
pub fn truncated_input<T>() -> Result<T> {
    Err(KwlError::TruncatedInput)
}

/// Convenience constructor for [`KwlError::ChecksumMismatch`].
pub fn checksum_mismatch<T>(expected: u32, computed: u32) -> Result<T> {
    Err(KwlError::ChecksumMismatch { expected, computed })
}

/// Convenience constructor for [`KwlError::InvalidArgument`].
pub fn invalid_argument<T>(msg: &'static str) -> Result<T> {
    Err(KwlError::InvalidArgument(msg))
}
