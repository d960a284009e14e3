//! Concrete end-to-end scenarios against fixed byte vectors, rather than only against output
//! produced by `flate2` (which `inflater.rs`'s own unit tests already exercise).

use kwl_inflate::{InflateFormat, Inflater};

fn inflate_all(mut inflater: Inflater<&[u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 64];
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
fn empty_zlib_stream_decodes_to_nothing() {
    let data = [0x78, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01];
    let inflater = Inflater::new(&data[..], InflateFormat::Zlib);
    assert_eq!(inflate_all(inflater), Vec::<u8>::new());
}

#[test]
fn one_byte_gzip_stream_decodes_and_validates_trailer() {
    use std::io::Write;
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(b"A").unwrap();
    let compressed = enc.finish().unwrap();

    let inflater = Inflater::new(&compressed[..], InflateFormat::Gzip);
    assert_eq!(inflate_all(inflater), b"A");
}

#[test]
fn long_self_overlapping_back_reference_expands_correctly() {
    use std::io::Write;
    let text = vec![b'A'; 260];
    let mut enc = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::best());
    enc.write_all(&text).unwrap();
    let compressed = enc.finish().unwrap();

    let inflater = Inflater::new(&compressed[..], InflateFormat::Raw);
    let out = inflate_all(inflater);
    assert_eq!(out.len(), 260);
    assert!(out.iter().all(|&b| b == b'A'));
}
