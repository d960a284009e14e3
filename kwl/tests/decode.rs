//! End-to-end decode tests against hand-built synthetic kwl streams: real header bytes in front
//! of a real zlib stream (compressed with `flate2`, exercising the inflater against genuine
//! deflate output rather than only the inflater's own test vectors).

use std::io::Write;

use kwl::{KwlDecoder, SampleBuf};

const BLOCK_SIZE: u16 = 64;
const QUANT_BITS: u8 = 6;

fn build_header(flags: u16, num_channels: u8, num_frames: u32, num_samples: u64) -> Vec<u8> {
    let mut h = Vec::with_capacity(32);
    h.extend_from_slice(b"kwl\x1a");
    h.extend_from_slice(&0x0100u16.to_le_bytes());
    h.extend_from_slice(&flags.to_le_bytes());
    h.extend_from_slice(&44_100u32.to_le_bytes());
    h.push(num_channels);
    h.push(QUANT_BITS);
    h.extend_from_slice(&BLOCK_SIZE.to_le_bytes());
    h.extend_from_slice(&num_frames.to_le_bytes());
    h.extend_from_slice(&0u16.to_le_bytes());
    h.extend_from_slice(&0u16.to_le_bytes());
    h.extend_from_slice(&num_samples.to_le_bytes());
    assert_eq!(h.len(), 32);
    h
}

/// Builds `num_frames` frames of silence: a zero scale and an all-"midpoint-code" quantized
/// block per channel (the dequantizer maps the exact midpoint code to 0.0).
fn build_silent_body(num_channels: u8, num_frames: u32) -> Vec<u8> {
    let silent_code = 1u8 << (QUANT_BITS - 1); // qbase: dequant[qbase] == 0.0
    let mut raw = Vec::new();
    for _ in 0..num_frames {
        for _ in 0..num_channels {
            raw.extend_from_slice(&0.0f32.to_le_bytes());
            raw.extend(std::iter::repeat(silent_code).take(BLOCK_SIZE as usize));
        }
    }

    let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(&raw).unwrap();
    enc.finish().unwrap()
}

fn build_stream(flags: u16, num_channels: u8, num_frames: u32, num_samples: u64) -> Vec<u8> {
    let mut stream = build_header(flags, num_channels, num_frames, num_samples);
    stream.extend(build_silent_body(num_channels, num_frames));
    stream
}

#[test]
fn decodes_silence_without_error() {
    const NORMALIZED: u16 = 1 << 0;
    let stream = build_stream(NORMALIZED, 1, 4, 0);

    let mut decoder = KwlDecoder::open(&stream[..]).unwrap();
    assert_eq!(decoder.num_channels(), 1);
    assert_eq!(decoder.sample_rate(), 44_100);

    let mut out = vec![0i16; BLOCK_SIZE as usize];
    let mut total = 0usize;
    loop {
        let n = decoder.read_samples(SampleBuf::I16(&mut out), BLOCK_SIZE as usize, 1).unwrap();
        if n == 0 {
            break;
        }
        total += n;
        for &s in &out[..n] {
            assert_eq!(s, 0, "silent input must decode to digital silence");
        }
    }
    // One frame is consumed priming the overlap history and never emitted.
    assert_eq!(total, BLOCK_SIZE as usize * 3);
}

#[test]
fn num_samples_flag_caps_output() {
    const NORMALIZED: u16 = 1 << 0;
    const NUM_SAMPLES: u16 = 1 << 1;
    let cap = (BLOCK_SIZE as u64) + 5;
    let stream = build_stream(NORMALIZED | NUM_SAMPLES, 1, 4, cap);

    let mut decoder = KwlDecoder::open(&stream[..]).unwrap();
    let mut out = vec![0i16; 4096];
    let mut total = 0u64;
    loop {
        let n = decoder.read_samples(SampleBuf::I16(&mut out), 4096, 1).unwrap();
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    assert_eq!(total, cap);
}

#[test]
fn mono_source_expands_to_stereo_output() {
    const NORMALIZED: u16 = 1 << 0;
    let stream = build_stream(NORMALIZED, 1, 3, 0);

    let mut decoder = KwlDecoder::open(&stream[..]).unwrap();
    let mut out = vec![0i16; BLOCK_SIZE as usize * 2];
    let n = decoder.read_samples(SampleBuf::I16(&mut out), BLOCK_SIZE as usize, 2).unwrap();
    assert_eq!(n, BLOCK_SIZE as usize);
    for i in 0..n {
        assert_eq!(out[i * 2], out[i * 2 + 1]);
    }
}

#[test]
fn mono_source_only_fills_first_two_of_more_output_channels() {
    const NORMALIZED: u16 = 1 << 0;
    let stream = build_stream(NORMALIZED, 1, 3, 0);

    let mut decoder = KwlDecoder::open(&stream[..]).unwrap();
    let mut out = vec![0i16; BLOCK_SIZE as usize * 4];
    let n = decoder.read_samples(SampleBuf::I16(&mut out), BLOCK_SIZE as usize, 4).unwrap();
    assert_eq!(n, BLOCK_SIZE as usize);
    for i in 0..n {
        assert_eq!(out[i * 4], out[i * 4 + 1], "channel 1 must replicate the mono source");
        assert_eq!(out[i * 4 + 2], 0, "channels beyond 1 must be left silent, not replicated");
        assert_eq!(out[i * 4 + 3], 0, "channels beyond 1 must be left silent, not replicated");
    }
}

#[test]
fn reads_samples_as_native_f32() {
    const NORMALIZED: u16 = 1 << 0;
    let stream = build_stream(NORMALIZED, 1, 4, 0);

    let mut decoder = KwlDecoder::open(&stream[..]).unwrap();
    let mut out = vec![0.0f32; BLOCK_SIZE as usize];
    let n = decoder.read_samples(SampleBuf::F32(&mut out), BLOCK_SIZE as usize, 1).unwrap();
    assert_eq!(n, BLOCK_SIZE as usize);
    for &s in &out[..n] {
        assert_eq!(s, 0.0, "silent input must decode to digital silence");
    }
}

#[test]
fn rejects_truncated_stream() {
    const NORMALIZED: u16 = 1 << 0;
    let mut stream = build_stream(NORMALIZED, 1, 4, 0);
    stream.truncate(stream.len() - 10);
    assert!(KwlDecoder::open(&stream[..]).is_err());
}
