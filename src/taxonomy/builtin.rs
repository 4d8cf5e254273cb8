// Builtin Plutchik wheel: eight primaries plus the eight primary dyads
//
// Dyad prototypes are the component average with raised complexity, and
// dyad palettes are the two component lead colors around their midpoint.

use once_cell::sync::Lazy;

use super::{EmotionCategoryPrototype, EmotionTaxonomy};
use crate::analysis::dimensions::EmotionDimensions;
use crate::analysis::palette::Color;

const PRIMARY_COMPLEXITY: f32 = 0.3;
const COMPOSITE_COMPLEXITY: f32 = 0.8;

/// (name, valence, arousal, dominance, palette)
const PRIMARIES: [(&str, f32, f32, f32, [u32; 3]); 8] = [
    ("Joy", 0.9, 0.6, 0.7, [0xFFD700, 0xFFA500, 0xFFEB3B]),
    ("Trust", 0.8, 0.3, 0.4, [0x7CB342, 0xAED581, 0x558B2F]),
    ("Fear", 0.2, 0.8, 0.2, [0x2E7D32, 0x1B5E20, 0x66BB6A]),
    ("Surprise", 0.6, 0.8, 0.4, [0x29B6F6, 0x4FC3F7, 0x0288D1]),
    ("Sadness", 0.15, 0.2, 0.3, [0x1E88E5, 0x3949AB, 0x90CAF9]),
    ("Disgust", 0.2, 0.5, 0.6, [0x8E24AA, 0xAB47BC, 0x6A1B9A]),
    ("Anger", 0.15, 0.8, 0.7, [0xE53935, 0xB71C1C, 0xEF5350]),
    ("Anticipation", 0.7, 0.6, 0.5, [0xFB8C00, 0xFFB74D, 0xEF6C00]),
];

/// (name, first component, second component)
const DYADS: [(&str, &str, &str); 8] = [
    ("Love", "Joy", "Trust"),
    ("Submission", "Trust", "Fear"),
    ("Awe", "Fear", "Surprise"),
    ("Disapproval", "Surprise", "Sadness"),
    ("Remorse", "Sadness", "Disgust"),
    ("Contempt", "Disgust", "Anger"),
    ("Aggressiveness", "Anger", "Anticipation"),
    ("Optimism", "Anticipation", "Joy"),
];

pub(super) static BUILTIN_TAXONOMY: Lazy<EmotionTaxonomy> = Lazy::new(build);

fn build() -> EmotionTaxonomy {
    let primaries: Vec<EmotionCategoryPrototype> = PRIMARIES
        .iter()
        .map(|&(name, valence, arousal, dominance, palette)| {
            EmotionCategoryPrototype::primary(
                name,
                EmotionDimensions::new(valence, arousal, dominance, PRIMARY_COMPLEXITY),
                palette.iter().map(|&hex| packed(hex)).collect(),
            )
        })
        .collect();

    let mut categories = primaries.clone();
    for &(name, first, second) in DYADS.iter() {
        let a = find(&primaries, first);
        let b = find(&primaries, second);
        let prototype = EmotionDimensions::new(
            (a.prototype.valence + b.prototype.valence) / 2.0,
            (a.prototype.arousal + b.prototype.arousal) / 2.0,
            (a.prototype.dominance + b.prototype.dominance) / 2.0,
            COMPOSITE_COMPLEXITY,
        );
        let lead_a = a.color_palette[0];
        let lead_b = b.color_palette[0];
        categories.push(EmotionCategoryPrototype::composite(
            name,
            prototype,
            vec![lead_a, midpoint(lead_a, lead_b), lead_b],
            &[first, second],
        ));
    }

    // Constructed directly: the tables above are fixed and covered by tests
    EmotionTaxonomy { categories }
}

fn find<'a>(primaries: &'a [EmotionCategoryPrototype], name: &str) -> &'a EmotionCategoryPrototype {
    primaries
        .iter()
        .find(|p| p.name == name)
        .unwrap_or(&primaries[0])
}

const fn packed(hex: u32) -> Color {
    Color::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

fn midpoint(a: Color, b: Color) -> Color {
    let mid = |x: u8, y: u8| ((x as u16 + y as u16) / 2) as u8;
    Color::rgb(mid(a.r, b.r), mid(a.g, b.g), mid(a.b, b.b))
}
