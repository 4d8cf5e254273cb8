// Palette module - colors and the deterministic augmentation rules
//
// Colors serialize as `#RRGGBB` strings so persisted models and emitted
// states stay readable. Augmentation never draws random colors: the same
// category and dimensions always yield the same palette.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::dimensions::EmotionDimensions;
use crate::config::PaletteConfig;

/// Arousal above which the category palette is intensified
pub const INTENSIFY_AROUSAL: f32 = 0.7;
/// Valence above which warm colors are appended
pub const WARM_VALENCE: f32 = 0.7;
/// Valence below which cool colors are appended
pub const COOL_VALENCE: f32 = 0.3;
/// Complexity above which blend colors are appended
pub const BLEND_COMPLEXITY: f32 = 0.6;
/// Maximum colors appended per rule
const COLORS_PER_RULE: usize = 2;

pub const WARM_PALETTE: [Color; 3] = [
    Color::rgb(0xFF, 0x8C, 0x42),
    Color::rgb(0xFF, 0xD1, 0x66),
    Color::rgb(0xF2, 0x5F, 0x5C),
];

pub const COOL_PALETTE: [Color; 3] = [
    Color::rgb(0x3A, 0x86, 0xFF),
    Color::rgb(0x4C, 0xC9, 0xF0),
    Color::rgb(0x5E, 0x60, 0xCE),
];

pub const BLEND_PALETTE: [Color; 3] = [
    Color::rgb(0x9B, 0x5D, 0xE5),
    Color::rgb(0x00, 0xBB, 0xF9),
    Color::rgb(0xF1, 0x5B, 0xB5),
];

/// Used whenever a state would otherwise carry no colors
pub const FALLBACK_PALETTE: [Color; 3] = [
    Color::rgb(0x9E, 0x9E, 0x9E),
    Color::rgb(0xBD, 0xBD, 0xBD),
    Color::rgb(0xE0, 0xE0, 0xE0),
];

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Lift saturation and brightness by `factor` without shifting hue
    pub fn intensified(&self, factor: f32) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv(h, (s * factor).clamp(0.0, 1.0), (v * factor).clamp(0.0, 1.0))
    }

    /// Hue in degrees [0, 360), saturation and value in [0, 1]
    pub fn to_hsv(&self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta <= f32::EPSILON {
            0.0
        } else if max == r {
            60.0 * (((g - b) / delta).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let saturation = if max <= f32::EPSILON { 0.0 } else { delta / max };

        (hue, saturation, max)
    }

    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let c = value * saturation;
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = value - c;
        let to_byte = |channel: f32| ((channel + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_byte(r), to_byte(g), to_byte(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color '{}', expected #RRGGBB", value))
    }
}

/// Builds the bounded color list for an emotional state
pub struct PaletteBuilder {
    intensify_factor: f32,
    max_colors: usize,
}

impl PaletteBuilder {
    pub fn new(config: &PaletteConfig) -> Self {
        Self {
            intensify_factor: config.intensify_factor,
            max_colors: config.max_colors.max(1),
        }
    }

    /// Apply the augmentation rules in order:
    /// 1. Start from the category palette, intensified if arousal is high
    /// 2. Append up to 2 warm colors (high valence) or cool colors (low valence)
    /// 3. Append up to 2 blend colors when complexity is high
    /// 4. Prepend personal overrides, drop duplicates, truncate
    /// 5. Substitute the fallback palette if nothing is left
    pub fn build(
        &self,
        category_palette: &[Color],
        dims: &EmotionDimensions,
        personal_overrides: &[Color],
    ) -> Vec<Color> {
        let mut colors: Vec<Color> = if dims.arousal > INTENSIFY_AROUSAL {
            category_palette
                .iter()
                .map(|c| c.intensified(self.intensify_factor))
                .collect()
        } else {
            category_palette.to_vec()
        };

        if dims.valence > WARM_VALENCE {
            append_unique(&mut colors, &WARM_PALETTE, COLORS_PER_RULE);
        } else if dims.valence < COOL_VALENCE {
            append_unique(&mut colors, &COOL_PALETTE, COLORS_PER_RULE);
        }
        if dims.complexity > BLEND_COMPLEXITY {
            append_unique(&mut colors, &BLEND_PALETTE, COLORS_PER_RULE);
        }

        let mut palette: Vec<Color> = Vec::with_capacity(self.max_colors);
        for color in personal_overrides.iter().chain(colors.iter()) {
            if palette.len() == self.max_colors {
                break;
            }
            if !palette.contains(color) {
                palette.push(*color);
            }
        }

        if palette.is_empty() {
            palette.extend(FALLBACK_PALETTE.iter().take(self.max_colors));
        }
        palette
    }
}

impl Default for PaletteBuilder {
    fn default() -> Self {
        Self::new(&PaletteConfig::default())
    }
}

fn append_unique(colors: &mut Vec<Color>, source: &[Color], limit: usize) {
    let additions: Vec<Color> = source
        .iter()
        .filter(|c| !colors.contains(c))
        .take(limit)
        .copied()
        .collect();
    colors.extend(additions);
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOY: [Color; 3] = [
        Color::rgb(0xFF, 0xD7, 0x00),
        Color::rgb(0xFF, 0xA5, 0x00),
        Color::rgb(0xFF, 0xEB, 0x3B),
    ];

    #[test]
    fn test_hex_roundtrip() {
        let color = Color::from_hex("#1a2B3c").unwrap();
        assert_eq!(color, Color::rgb(0x1A, 0x2B, 0x3C));
        assert_eq!(color.to_hex(), "#1A2B3C");
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 16)).unwrap();
        assert_eq!(json, "\"#FF0010\"");
        let parsed: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(parsed, Color::rgb(0, 255, 0));
        assert!(serde_json::from_str::<Color>("\"green\"").is_err());
    }

    #[test]
    fn test_intensify_keeps_hue() {
        let color = Color::rgb(0x80, 0x40, 0x40);
        let (h, s, v) = color.to_hsv();
        let (h2, s2, v2) = color.intensified(1.2).to_hsv();
        assert!((h - h2).abs() < 1.5, "hue drifted {} -> {}", h, h2);
        assert!(s2 >= s);
        assert!(v2 > v);
    }

    #[test]
    fn test_hsv_roundtrip() {
        for color in JOY.iter().chain(COOL_PALETTE.iter()) {
            let (h, s, v) = color.to_hsv();
            assert_eq!(Color::from_hsv(h, s, v), *color);
        }
    }

    #[test]
    fn test_warm_colors_for_high_valence() {
        let builder = PaletteBuilder::default();
        let dims = EmotionDimensions::new(0.9, 0.5, 0.5, 0.1);
        let palette = builder.build(&JOY, &dims, &[]);
        assert_eq!(palette.len(), 5);
        assert_eq!(&palette[..3], &JOY);
        assert_eq!(&palette[3..], &WARM_PALETTE[..2]);
    }

    #[test]
    fn test_cool_and_blend_truncate_to_five() {
        let builder = PaletteBuilder::default();
        let dims = EmotionDimensions::new(0.1, 0.5, 0.5, 0.9);
        let palette = builder.build(&JOY, &dims, &[]);
        assert_eq!(palette.len(), 5);
        assert_eq!(&palette[3..], &COOL_PALETTE[..2]);
    }

    #[test]
    fn test_high_arousal_intensifies() {
        let builder = PaletteBuilder::default();
        let dims = EmotionDimensions::new(0.5, 0.9, 0.5, 0.1);
        let palette = builder.build(&COOL_PALETTE, &dims, &[]);
        assert_eq!(palette.len(), 3);
        assert_ne!(palette[0], COOL_PALETTE[0]);
    }

    #[test]
    fn test_personal_overrides_prepended() {
        let builder = PaletteBuilder::default();
        let favourite = Color::rgb(1, 2, 3);
        let dims = EmotionDimensions::new(0.9, 0.5, 0.5, 0.9);
        let palette = builder.build(&JOY, &dims, &[favourite]);
        assert_eq!(palette[0], favourite);
        assert_eq!(palette.len(), 5);
    }

    #[test]
    fn test_fallback_palette() {
        let builder = PaletteBuilder::default();
        let palette = builder.build(&[], &EmotionDimensions::neutral(), &[]);
        assert_eq!(palette, FALLBACK_PALETTE.to_vec());
    }

    #[test]
    fn test_deterministic() {
        let builder = PaletteBuilder::default();
        let dims = EmotionDimensions::new(0.95, 0.95, 0.2, 0.8);
        assert_eq!(builder.build(&JOY, &dims, &[]), builder.build(&JOY, &dims, &[]));
    }
}
