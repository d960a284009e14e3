// kwl
// Copyright (c) 2026 The kwl Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IEEE-754 binary16 ("half float") to binary32 conversion.
//!
//! Values are decoded field-by-field (sign, 5-bit exponent, 10-bit mantissa) rather than through
//! a lookup table, since the decoder only ever needs to widen one DC-offset or overall-scale
//! sample per frame, not a dense stream of them.

const MANTISSA_SCALE: f32 = 1.0 / 1024.0;

/// Converts an IEEE-754 binary16 value, stored as its raw bit pattern, to `f32`.
pub fn half_to_f32(bits: u16) -> f32 {
    let sign = if (bits >> 15) & 1 != 0 { -1.0f32 } else { 1.0f32 };
    let exp = ((bits >> 10) & 0x1f) as i32;
    let mant = (bits & 0x3ff) as f32;

    if exp == 31 {
        return if mant == 0.0 { sign * f32::INFINITY } else { f32::NAN };
    }

    if exp == 0 {
        // Subnormal (or zero): no implicit leading 1, biased by 2^-14.
        return sign * (mant * MANTISSA_SCALE) / (1u32 << 14) as f32;
    }

    if exp >= 15 {
        return sign * (1u32 << (exp - 15)) as f32 * (1.0 + mant * MANTISSA_SCALE);
    }

    sign * (1.0 + mant * MANTISSA_SCALE) / (1u32 << (15 - exp)) as f32
}
