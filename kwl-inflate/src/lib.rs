// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A standalone DEFLATE inflater.
//!
//! This crate implements RFC 1951 inflate plus the two framings layered on top of it in
//! practice: RFC 1950 zlib and RFC 1952 gzip. It exists because the container this workspace
//! decodes stores per-frame payloads DEFLATE-compressed, and pulling in a full general-purpose
//! compression crate for that one operation would mean carrying code paths (compression,
//! multi-member gzip streams, BGZF) this decoder never exercises.

mod inflater;
mod tables;

pub use inflater::{InflateFormat, Inflater};
