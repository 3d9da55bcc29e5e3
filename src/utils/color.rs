//! Trail colors
//!
//! Particles take their color from a fixed 13-entry qualitative palette by index, wrapping
//! around once every entry is used. Colors are stable for the lifetime of a particle since
//! indices never change.

use bevy::prelude::*;

/// Qualitative palette, light enough to read against a dark background
pub const PALETTE: [[u8; 3]; 13] = [
    [0x8d, 0xd3, 0xc7],
    [0xff, 0xff, 0xb3],
    [0xbe, 0xba, 0xda],
    [0xfb, 0x80, 0x72],
    [0x80, 0xb1, 0xd3],
    [0xfd, 0xb4, 0x62],
    [0xb3, 0xde, 0x69],
    [0xfc, 0xcd, 0xe5],
    [0xd9, 0xd9, 0xd9],
    [0xbc, 0x80, 0xbd],
    [0xcc, 0xeb, 0xc5],
    [0xff, 0xed, 0x6f],
    [0xff, 0xff, 0xff],
];

pub fn trail_color(index: usize) -> Color {
    let [r, g, b] = PALETTE[index % PALETTE.len()];
    Color::srgb_u8(r, g, b)
}

/// Color of the sample `age` steps behind the head of a trail `length` samples long.
///
/// Opacity falls linearly from `alpha` at the head to zero past the oldest sample.
pub fn faded(color: Color, age: usize, length: usize, alpha: f32) -> Color {
    let remaining = if length == 0 {
        0.0
    } else {
        1.0 - age as f32 / length as f32
    };
    color.with_alpha(alpha * remaining.clamp(0.0, 1.0))
}
