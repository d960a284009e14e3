// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decodes a kwl file to a canonical-form WAV file.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use clap::{App, Arg};

use kwl::{wav, KwlDecoder, SampleBuf};

fn main() {
    pretty_env_logger::init();

    let matches = App::new("kwl-to-wav")
        .version("0.1.0")
        .about("Decodes a kwl stream to a WAV file")
        .arg(Arg::with_name("INPUT").help("Path to the .kwl input file").required(true).index(1))
        .arg(Arg::with_name("OUTPUT").help("Path to the .wav output file").required(true).index(2))
        .get_matches();

    let input_path = matches.value_of("INPUT").unwrap();
    let output_path = matches.value_of("OUTPUT").unwrap();

    if let Err(err) = run(input_path, output_path) {
        log::error!("failed to decode {}: {}", input_path, err);
        std::process::exit(1);
    }
}

fn run(input_path: &str, output_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let input = BufReader::new(File::open(input_path)?);
    let mut decoder = KwlDecoder::open(input)?;

    let channels = decoder.num_channels();
    let sample_rate = decoder.sample_rate();
    log::info!(
        "decoding {} ({} ch, {} Hz, {:.2}s)",
        input_path,
        channels,
        sample_rate,
        decoder.length_seconds()
    );

    let mut pcm = Vec::new();
    let mut buf = vec![0i16; 4096 * channels];
    loop {
        let read = decoder.read_samples(SampleBuf::I16(&mut buf), 4096, channels)?;
        if read == 0 {
            break;
        }
        pcm.extend_from_slice(&buf[..read * channels]);
    }

    let mut output = BufWriter::new(File::create(output_path)?);
    wav::write_wav(&mut output, sample_rate, channels as u16, &pcm)?;

    log::info!("wrote {} samples to {}", pcm.len() / channels, output_path);
    Ok(())
}
