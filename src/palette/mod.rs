//! Color palettes.
//!
//! Every mood owns four hand-tuned five-color variants. A board gets one of
//! them picked uniformly at random, so two boards for the same mood can look
//! different.

mod color_names;

pub use color_names::{name_color, ColorName, COLOR_NAME_THRESHOLD, REFERENCE_COLORS};

use crate::mood::MoodLabel;
use crate::random::RandomSource;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// An RGB triple, written as `#RRGGBB` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid hex color: {0:?}")]
pub struct ColorParseError(String);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB` to color.
    pub const fn from_u24(value: u32) -> Self {
        Self::rgb(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    /// Parses `RRGGBB`, with or without a leading `#`, in any letter case.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(hex.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_u24)
            .map_err(|_| ColorParseError(hex.to_string()))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Color) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

pub const PALETTE_SIZE: usize = 5;

/// Five colors, serialized as an array of hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(pub [Color; PALETTE_SIZE]);

impl Palette {
    const fn from_u24s(values: [u32; PALETTE_SIZE]) -> Self {
        Palette([
            Color::from_u24(values[0]),
            Color::from_u24(values[1]),
            Color::from_u24(values[2]),
            Color::from_u24(values[3]),
            Color::from_u24(values[4]),
        ])
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    pub fn to_hex_strings(&self) -> Vec<String> {
        self.0.iter().map(Color::to_hex).collect()
    }
}

pub const VARIANTS_PER_MOOD: usize = 4;

const ROMANTIC: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0xFF6B9D, 0xFFB3D1, 0xFFE5F1, 0x8B5A96, 0x4A4A4A]),
    Palette::from_u24s([0xFF1493, 0xFF69B4, 0xFFB6C1, 0xC71585, 0xDB7093]),
    Palette::from_u24s([0xFF007F, 0xFF69B4, 0xFFC0CB, 0xDC143C, 0xFF1493]),
    Palette::from_u24s([0xFF69B4, 0xFFB6C1, 0xFFC0CB, 0xFF1493, 0xC71585]),
];

const PEACEFUL: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0x87CEEB, 0x98FB98, 0xF0E68C, 0xDDA0DD, 0xF5F5DC]),
    Palette::from_u24s([0xB0E0E6, 0x98FB98, 0xF0E68C, 0xDDA0DD, 0xF0F8FF]),
    Palette::from_u24s([0xADD8E6, 0x90EE90, 0xF0E68C, 0xDDA0DD, 0xF5F5DC]),
    Palette::from_u24s([0x87CEEB, 0x98FB98, 0xF0E68C, 0xE6E6FA, 0xF0F8FF]),
];

const ENERGETIC: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0xFF4500, 0xFFD700, 0x32CD32, 0x4169E1, 0xFF1493]),
    Palette::from_u24s([0xFF6347, 0xFFD700, 0x00FF00, 0x1E90FF, 0xFF1493]),
    Palette::from_u24s([0xFF4500, 0xFFFF00, 0x00FF7F, 0x4169E1, 0xFF1493]),
    Palette::from_u24s([0xFF6347, 0xFFD700, 0x32CD32, 0x1E90FF, 0xFF1493]),
];

const MELANCHOLIC: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0x2F4F4F, 0x696969, 0x708090, 0xB0C4DE, 0xE6E6FA]),
    Palette::from_u24s([0x4A4A4A, 0x696969, 0x708090, 0xB0C4DE, 0xF0F8FF]),
    Palette::from_u24s([0x2F4F4F, 0x696969, 0x778899, 0xB0C4DE, 0xE6E6FA]),
    Palette::from_u24s([0x4A4A4A, 0x696969, 0x708090, 0xC0C0C0, 0xF0F8FF]),
];

const NATURE: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0x228B22, 0x8FBC8F, 0xF4A460, 0xDEB887, 0xCD853F]),
    Palette::from_u24s([0x32CD32, 0x90EE90, 0xF4A460, 0xDEB887, 0xD2691E]),
    Palette::from_u24s([0x228B22, 0x98FB98, 0xF4A460, 0xDEB887, 0xCD853F]),
    Palette::from_u24s([0x32CD32, 0x8FBC8F, 0xF4A460, 0xD2B48C, 0xCD853F]),
];

const URBAN: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0x708090, 0x2F4F4F, 0xFF6347, 0xFFD700, 0x4169E1]),
    Palette::from_u24s([0x696969, 0x2F4F4F, 0xFF6347, 0xFFD700, 0x1E90FF]),
    Palette::from_u24s([0x708090, 0x4A4A4A, 0xFF6347, 0xFFFF00, 0x4169E1]),
    Palette::from_u24s([0x696969, 0x2F4F4F, 0xFF4500, 0xFFD700, 0x1E90FF]),
];

const VINTAGE: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0x8B4513, 0xDEB887, 0xF4A460, 0xD2B48C, 0xCD853F]),
    Palette::from_u24s([0xA0522D, 0xDEB887, 0xF4A460, 0xD2B48C, 0xD2691E]),
    Palette::from_u24s([0x8B4513, 0xF5DEB3, 0xF4A460, 0xD2B48C, 0xCD853F]),
    Palette::from_u24s([0xA0522D, 0xDEB887, 0xF4A460, 0xF5DEB3, 0xCD853F]),
];

const MODERN: [Palette; VARIANTS_PER_MOOD] = [
    Palette::from_u24s([0x000000, 0xFFFFFF, 0x808080, 0xC0C0C0, 0xFF6B35]),
    Palette::from_u24s([0x2F2F2F, 0xFFFFFF, 0x808080, 0xC0C0C0, 0xFF6347]),
    Palette::from_u24s([0x000000, 0xF5F5F5, 0x808080, 0xC0C0C0, 0xFF6B35]),
    Palette::from_u24s([0x2F2F2F, 0xFFFFFF, 0x696969, 0xC0C0C0, 0xFF6347]),
];

/// The predefined variants of a mood.
pub fn palette_variants(mood: MoodLabel) -> &'static [Palette; VARIANTS_PER_MOOD] {
    match mood {
        MoodLabel::Romantic => &ROMANTIC,
        MoodLabel::Peaceful => &PEACEFUL,
        MoodLabel::Energetic => &ENERGETIC,
        MoodLabel::Melancholic => &MELANCHOLIC,
        MoodLabel::Nature => &NATURE,
        MoodLabel::Urban => &URBAN,
        MoodLabel::Vintage => &VINTAGE,
        MoodLabel::Modern => &MODERN,
    }
}

/// Uniformly random variant of the mood's palettes.
pub fn select_palette(mood: MoodLabel, random: &RandomSource) -> Palette {
    let variants = palette_variants(mood);
    // The variant table is never empty.
    *random.choose(variants).unwrap_or(&variants[0])
}
