// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A pull-style DEFLATE (RFC 1951) decompressor with raw, zlib (RFC 1950), and gzip (RFC 1952)
//! framing support.

use std::io::Read;

use log::{debug, warn};

use kwl_core::errors::{checksum_mismatch, corrupt_bitstream, invalid_argument, malformed_header, Result};
use kwl_core::io::{BitReader, CanonicalHuffman};

use crate::tables::{
    fixed_dist_lengths, fixed_litlen_lengths, CODE_LENGTH_ORDER, DICTIONARY_SIZE, DIST_BASE,
    DIST_EXTRA_BITS, LENGTH_BASE, LENGTH_EXTRA_BITS,
};

/// The framing an [`Inflater`] should expect around the raw DEFLATE bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateFormat {
    /// No framing; the input is a bare DEFLATE stream (used, e.g., inside a zip entry whose CRC
    /// is validated externally).
    Raw,
    /// RFC 1950 zlib framing: a 2-byte header followed by DEFLATE data and a big-endian Adler-32
    /// trailer.
    Zlib,
    /// RFC 1952 gzip framing: a variable-length header, DEFLATE data, and a little-endian
    /// CRC-32 + ISIZE trailer.
    Gzip,
}

enum Stage {
    Header,
    BlockHeader,
    StoredBlock { remaining: usize },
    CompressedBlock { lit: CanonicalHuffman, dist: CanonicalHuffman },
    Trailer,
    Done,
}

/// A sliding 32 KiB dictionary window used to resolve back-references.
struct Window {
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl Window {
    fn new() -> Self {
        Window { buf: vec![0u8; DICTIONARY_SIZE].into_boxed_slice(), pos: 0, filled: 0 }
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos = (self.pos + 1) % DICTIONARY_SIZE;
        self.filled = (self.filled + 1).min(DICTIONARY_SIZE);
    }

    #[inline]
    fn look_back(&self, distance: usize) -> u8 {
        let idx = (self.pos + DICTIONARY_SIZE - distance) % DICTIONARY_SIZE;
        self.buf[idx]
    }
}

/// A DEFLATE decompressor. Bytes are produced on demand via [`Inflater::read`]; the dictionary
/// window, Huffman tables, and checksum state persist across calls.
pub struct Inflater<R: Read> {
    bits: BitReader<R>,
    format: InflateFormat,
    window: Window,
    pending: std::collections::VecDeque<u8>,
    stage: Stage,
    final_block: bool,
    crc: crc32fast::Hasher,
    adler: adler32::RollingAdler32,
    total_out: u64,
    out_limit: Option<u64>,
}

impl<R: Read> Inflater<R> {
    /// Creates an inflater over `reader`, expecting `format` framing.
    pub fn new(reader: R, format: InflateFormat) -> Self {
        Inflater {
            bits: BitReader::new(reader),
            format,
            window: Window::new(),
            pending: std::collections::VecDeque::with_capacity(4096),
            stage: Stage::Header,
            final_block: false,
            crc: crc32fast::Hasher::new(),
            adler: adler32::RollingAdler32::new(),
            total_out: 0,
            out_limit: None,
        }
    }

    /// Drops the inflater, returning the wrapped byte source. Any buffered-but-unread decoded
    /// bytes are discarded.
    pub fn into_inner(self) -> R {
        self.bits.into_inner()
    }

    /// Caps the total number of decompressed bytes this inflater will ever produce, returning a
    /// [`KwlError::InvalidArgument`] decode error once exceeded. Defends against zip-bomb style
    /// inputs when decoding untrusted data.
    pub fn with_output_limit(mut self, limit: u64) -> Self {
        self.out_limit = Some(limit);
        self
    }

    /// Reads up to `out.len()` decompressed bytes, returning the number actually written. A
    /// return value less than `out.len()` that isn't `0` simply means more bytes will be
    /// available on a subsequent call; `0` means the stream (and, for zlib/gzip, its checksum
    /// trailer) has been fully consumed and validated.
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut written = 0;
        while written < out.len() {
            if let Some(byte) = self.pending.pop_front() {
                out[written] = byte;
                written += 1;
                continue;
            }
            if matches!(self.stage, Stage::Done) {
                break;
            }
            self.advance()?;
        }
        Ok(written)
    }

    /// Drives the state machine forward by one step, producing zero or more bytes into `pending`.
    fn advance(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::Header => {
                self.read_framing_header()?;
                self.stage = Stage::BlockHeader;
            }
            Stage::BlockHeader => {
                if self.final_block {
                    self.stage = Stage::Trailer;
                    return Ok(());
                }
                self.final_block = self.bits.read_bit()?;
                let btype = self.bits.read_bits(2)?;
                self.stage = match btype {
                    0 => {
                        self.bits.align_to_byte();
                        let len_lo = self.bits.read_byte()? as u16;
                        let len_hi = self.bits.read_byte()? as u16;
                        let len = len_lo | (len_hi << 8);
                        let nlen_lo = self.bits.read_byte()? as u16;
                        let nlen_hi = self.bits.read_byte()? as u16;
                        let nlen = nlen_lo | (nlen_hi << 8);
                        if len != !nlen {
                            return corrupt_bitstream("stored block length check failed");
                        }
                        Stage::StoredBlock { remaining: len as usize }
                    }
                    1 => {
                        let lit = CanonicalHuffman::build(&fixed_litlen_lengths())?;
                        let dist = CanonicalHuffman::build(&fixed_dist_lengths())?;
                        Stage::CompressedBlock { lit, dist }
                    }
                    2 => {
                        let (lit, dist) = self.read_dynamic_tables()?;
                        Stage::CompressedBlock { lit, dist }
                    }
                    _ => return corrupt_bitstream("reserved block type"),
                };
            }
            Stage::StoredBlock { remaining } => {
                if remaining == 0 {
                    self.stage = Stage::BlockHeader;
                }
                else {
                    let byte = self.bits.read_byte()?;
                    self.emit(byte)?;
                    self.stage = Stage::StoredBlock { remaining: remaining - 1 };
                }
            }
            Stage::CompressedBlock { lit, dist } => {
                let symbol = lit.decode(&mut self.bits)?;
                if symbol < 256 {
                    self.emit(symbol as u8)?;
                    self.stage = Stage::CompressedBlock { lit, dist };
                }
                else if symbol == 256 {
                    self.stage = Stage::BlockHeader;
                }
                else {
                    let idx = (symbol - 257) as usize;
                    if idx >= LENGTH_BASE.len() {
                        return corrupt_bitstream("invalid length code");
                    }
                    let extra = self.bits.read_bits(LENGTH_EXTRA_BITS[idx] as u32)?;
                    let length = LENGTH_BASE[idx] as usize + extra as usize;

                    let dist_sym = dist.decode(&mut self.bits)? as usize;
                    if dist_sym >= DIST_BASE.len() {
                        return corrupt_bitstream("invalid distance code");
                    }
                    let dist_extra = self.bits.read_bits(DIST_EXTRA_BITS[dist_sym] as u32)?;
                    let distance = DIST_BASE[dist_sym] as usize + dist_extra as usize;

                    if distance == 0 || distance as u64 > self.total_out {
                        return corrupt_bitstream("back-reference distance out of range");
                    }
                    if distance > DICTIONARY_SIZE {
                        return corrupt_bitstream("back-reference distance exceeds window");
                    }

                    for _ in 0..length {
                        let byte = self.window.look_back(distance);
                        self.emit(byte)?;
                    }
                    self.stage = Stage::CompressedBlock { lit, dist };
                }
            }
            Stage::Trailer => {
                self.verify_trailer()?;
                self.stage = Stage::Done;
            }
            Stage::Done => {}
        }
        Ok(())
    }

    fn emit(&mut self, byte: u8) -> Result<()> {
        if let Some(limit) = self.out_limit {
            if self.total_out >= limit {
                return invalid_argument("inflate output limit exceeded");
            }
        }
        self.window.push(byte);
        self.pending.push_back(byte);
        self.total_out += 1;

        match self.format {
            InflateFormat::Gzip => self.crc.update(&[byte]),
            InflateFormat::Zlib => self.adler.update_buffer(&[byte]),
            InflateFormat::Raw => {}
        }
        Ok(())
    }

    fn read_framing_header(&mut self) -> Result<()> {
        debug!("inflate: expecting {:?} framing", self.format);
        match self.format {
            InflateFormat::Raw => Ok(()),
            InflateFormat::Zlib => self.read_zlib_header(),
            InflateFormat::Gzip => self.read_gzip_header(),
        }
    }

    fn read_zlib_header(&mut self) -> Result<()> {
        let cmf = self.bits.read_byte()?;
        let flg = self.bits.read_byte()?;
        if cmf & 0x0f != 8 {
            return malformed_header("zlib header: unsupported compression method");
        }
        if (cmf as u16 * 256 + flg as u16) % 31 != 0 {
            return malformed_header("zlib header: check bits invalid");
        }
        if flg & 0x20 != 0 {
            return malformed_header("zlib header: preset dictionary not supported");
        }
        Ok(())
    }

    fn read_gzip_header(&mut self) -> Result<()> {
        let magic0 = self.bits.read_byte()?;
        let magic1 = self.bits.read_byte()?;
        if magic0 != 0x1f || magic1 != 0x8b {
            return malformed_header("gzip header: bad magic");
        }
        let cm = self.bits.read_byte()?;
        if cm != 8 {
            return malformed_header("gzip header: unsupported compression method");
        }
        let flg = self.bits.read_byte()?;
        for _ in 0..6 {
            // MTIME (4), XFL (1), OS (1).
            self.bits.read_byte()?;
        }

        const FEXTRA: u8 = 1 << 2;
        const FNAME: u8 = 1 << 3;
        const FCOMMENT: u8 = 1 << 4;
        const FHCRC: u8 = 1 << 1;

        if flg & FEXTRA != 0 {
            let lo = self.bits.read_byte()? as u16;
            let hi = self.bits.read_byte()? as u16;
            let xlen = lo | (hi << 8);
            for _ in 0..xlen {
                self.bits.read_byte()?;
            }
        }
        if flg & FNAME != 0 {
            self.read_cstring()?;
        }
        if flg & FCOMMENT != 0 {
            self.read_cstring()?;
        }
        if flg & FHCRC != 0 {
            self.bits.read_byte()?;
            self.bits.read_byte()?;
        }
        Ok(())
    }

    fn read_cstring(&mut self) -> Result<()> {
        loop {
            let b = self.bits.read_byte()?;
            if b == 0 {
                return Ok(());
            }
        }
    }

    fn verify_trailer(&mut self) -> Result<()> {
        self.bits.align_to_byte();
        match self.format {
            InflateFormat::Raw => Ok(()),
            InflateFormat::Zlib => {
                let b0 = self.bits.read_byte()? as u32;
                let b1 = self.bits.read_byte()? as u32;
                let b2 = self.bits.read_byte()? as u32;
                let b3 = self.bits.read_byte()? as u32;
                let expected = (b0 << 24) | (b1 << 16) | (b2 << 8) | b3;
                let computed = self.adler.hash();
                if expected != computed {
                    warn!("zlib adler-32 mismatch: expected {:#010x}, computed {:#010x}", expected, computed);
                    return checksum_mismatch(expected, computed);
                }
                Ok(())
            }
            InflateFormat::Gzip => {
                let b0 = self.bits.read_byte()? as u32;
                let b1 = self.bits.read_byte()? as u32;
                let b2 = self.bits.read_byte()? as u32;
                let b3 = self.bits.read_byte()? as u32;
                let expected_crc = b0 | (b1 << 8) | (b2 << 16) | (b3 << 24);
                let computed_crc = self.crc.clone().finalize();
                if expected_crc != computed_crc {
                    warn!("gzip crc-32 mismatch: expected {:#010x}, computed {:#010x}", expected_crc, computed_crc);
                    return checksum_mismatch(expected_crc, computed_crc);
                }

                let s0 = self.bits.read_byte()? as u32;
                let s1 = self.bits.read_byte()? as u32;
                let s2 = self.bits.read_byte()? as u32;
                let s3 = self.bits.read_byte()? as u32;
                let expected_size = s0 | (s1 << 8) | (s2 << 16) | (s3 << 24);
                let computed_size = (self.total_out % (1u64 << 32)) as u32;
                if expected_size != computed_size {
                    return corrupt_bitstream("gzip trailer: ISIZE mismatch");
                }
                Ok(())
            }
        }
    }

    fn read_dynamic_tables(&mut self) -> Result<(CanonicalHuffman, CanonicalHuffman)> {
        let hlit = self.bits.read_bits(5)? as usize + 257;
        let hdist = self.bits.read_bits(5)? as usize + 1;
        let hclen = self.bits.read_bits(4)? as usize + 4;

        let mut cl_lengths = [0u8; 19];
        for i in 0..hclen {
            cl_lengths[CODE_LENGTH_ORDER[i]] = self.bits.read_bits(3)? as u8;
        }
        let cl_huff = CanonicalHuffman::build(&cl_lengths)?;

        let total = hlit + hdist;
        let mut lengths = vec![0u8; total];
        let mut i = 0;
        while i < total {
            let symbol = cl_huff.decode(&mut self.bits)?;
            match symbol {
                0..=15 => {
                    lengths[i] = symbol as u8;
                    i += 1;
                }
                16 => {
                    if i == 0 {
                        return corrupt_bitstream("repeat code with no previous length");
                    }
                    let prev = lengths[i - 1];
                    let repeat = self.bits.read_bits(2)? as usize + 3;
                    if i + repeat > total {
                        return corrupt_bitstream("code length repeat overruns table");
                    }
                    for slot in &mut lengths[i..i + repeat] {
                        *slot = prev;
                    }
                    i += repeat;
                }
                17 => {
                    let repeat = self.bits.read_bits(3)? as usize + 3;
                    if i + repeat > total {
                        return corrupt_bitstream("code length repeat overruns table");
                    }
                    i += repeat;
                }
                18 => {
                    let repeat = self.bits.read_bits(7)? as usize + 11;
                    if i + repeat > total {
                        return corrupt_bitstream("code length repeat overruns table");
                    }
                    i += repeat;
                }
                _ => return corrupt_bitstream("invalid code length symbol"),
            }
        }

        let lit = CanonicalHuffman::build(&lengths[..hlit])?;
        let dist = CanonicalHuffman::build(&lengths[hlit..])?;
        Ok((lit, dist))
    }
}

impl<R: Read> std::io::Read for Inflater<R> {
    /// Lets an [`Inflater`] sit underneath a [`BitReader`](kwl_core::io::BitReader), the same way
    /// any other byte source does. A [`KwlError`](kwl_core::KwlError) surfaces as
    /// [`std::io::ErrorKind::InvalidData`], except [`KwlError::TruncatedInput`]
    /// (kwl_core::KwlError::TruncatedInput), which maps back to `UnexpectedEof` so a wrapping
    /// `BitReader` recognizes end-of-stream the same way it would for any other reader.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Inflater::read(self, buf).map_err(|err| match err {
            kwl_core::KwlError::TruncatedInput => {
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err)
            }
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn deflate_zlib(data: &[u8]) -> Vec<u8> {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn deflate_raw(data: &[u8]) -> Vec<u8> {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn deflate_gzip(data: &[u8]) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn inflate_all<R: Read>(mut inflater: Inflater<R>) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 37];
        loop {
            let n = inflater.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn round_trips_zlib_text() {
        let text = b"the quick brown fox jumps over the lazy dog, over and over and over again";
        let compressed = deflate_zlib(text);
        let inflater = Inflater::new(&compressed[..], InflateFormat::Zlib);
        assert_eq!(inflate_all(inflater), text);
    }

    #[test]
    fn round_trips_raw_repetitive_data() {
        // Highly repetitive input forces long back-references, exercising self-overlap.
        let text = vec![b'a'; 5000];
        let compressed = deflate_raw(&text);
        let inflater = Inflater::new(&compressed[..], InflateFormat::Raw);
        assert_eq!(inflate_all(inflater), text);
    }

    #[test]
    fn round_trips_gzip_text() {
        let text = b"gzip framing carries its own crc32 and isize trailer fields";
        let compressed = deflate_gzip(text);
        let inflater = Inflater::new(&compressed[..], InflateFormat::Gzip);
        assert_eq!(inflate_all(inflater), text);
    }

    #[test]
    fn rejects_corrupted_zlib_checksum() {
        let text = b"checksum mismatches must be detected";
        let mut compressed = deflate_zlib(text);
        let last = compressed.len() - 1;
        compressed[last] ^= 0xff;
        let inflater = Inflater::new(&compressed[..], InflateFormat::Zlib);
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        let mut result = Ok(0);
        let mut it = inflater;
        loop {
            result = it.read(&mut buf);
            match result {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(_) => break,
            }
        }
        assert!(result.is_err());
    }

    #[test]
    fn enforces_output_limit() {
        let text = vec![b'x'; 10_000];
        let compressed = deflate_raw(&text);
        let inflater = Inflater::new(&compressed[..], InflateFormat::Raw).with_output_limit(100);
        let mut buf = [0u8; 4096];
        let mut it = inflater;
        let mut total = 0usize;
        let mut saw_error = false;
        loop {
            match it.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(_) => {
                    saw_error = true;
                    break;
                }
            }
        }
        assert!(saw_error);
        assert!(total <= 100);
    }
}
