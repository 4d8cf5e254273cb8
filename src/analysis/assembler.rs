// Assembler - composes the externally visible EmotionalState record
//
// Pure composition: every input is already computed by the upstream stages.
// Percent-scale fields are rounded and clamped here, nowhere else.

use serde::{Deserialize, Serialize};

use crate::analysis::classifier::Alternative;
use crate::analysis::dimensions::EmotionDimensions;
use crate::analysis::palette::{Color, PaletteBuilder, FALLBACK_PALETTE};
use crate::config::PaletteConfig;
use crate::taxonomy::EmotionTaxonomy;

/// Category reported for degenerate frames
pub const NEUTRAL_CATEGORY: &str = "Neutral";

/// Result of analyzing one frame
///
/// Immutable once produced. Serializes with camelCase keys, the shape
/// stored inside the persisted personal model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalState {
    pub primary_category: String,
    /// 0-100
    pub confidence: u8,
    /// 0-100, derived from complexity
    pub depth: u8,
    /// 0-100
    pub memory_resonance: u8,
    /// At most `max_colors` entries, never empty
    pub colors: Vec<Color>,
    pub dimensions: EmotionDimensions,
    pub alternatives: Vec<Alternative>,
    /// Milliseconds since the UNIX epoch
    pub timestamp_ms: u64,
}

impl EmotionalState {
    /// Well-defined result for frames that carry no usable signal
    pub fn neutral(timestamp_ms: u64) -> Self {
        Self {
            primary_category: NEUTRAL_CATEGORY.to_string(),
            confidence: 0,
            depth: 0,
            memory_resonance: 0,
            colors: FALLBACK_PALETTE.to_vec(),
            dimensions: EmotionDimensions::neutral(),
            alternatives: Vec::new(),
            timestamp_ms,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.primary_category == NEUTRAL_CATEGORY && self.confidence == 0
    }
}

/// Everything the assembler needs besides the taxonomy
#[derive(Debug, Clone)]
pub struct StateInputs<'a> {
    pub category: &'a str,
    /// Adjusted confidence, 0.0-1.0
    pub confidence: f32,
    pub dimensions: EmotionDimensions,
    pub memory_resonance: u8,
    pub alternatives: Vec<Alternative>,
    /// Personal color overrides for `category`
    pub personal_colors: &'a [Color],
    pub timestamp_ms: u64,
}

pub struct EmotionStateAssembler {
    palette: PaletteBuilder,
}

impl EmotionStateAssembler {
    pub fn new(config: &PaletteConfig) -> Self {
        Self {
            palette: PaletteBuilder::new(config),
        }
    }

    /// Compose the final record
    ///
    /// # Arguments
    /// * `inputs` - Classified category, adjusted confidence, dimensions,
    ///   resonance, alternatives, personal colors, and timestamp
    /// * `taxonomy` - Source of the category's base palette
    pub fn assemble(&self, inputs: StateInputs<'_>, taxonomy: &EmotionTaxonomy) -> EmotionalState {
        let colors = self.palette.build(
            taxonomy.palette_for(inputs.category),
            &inputs.dimensions,
            inputs.personal_colors,
        );

        EmotionalState {
            primary_category: inputs.category.to_string(),
            confidence: percent(inputs.confidence),
            depth: percent(inputs.dimensions.complexity),
            memory_resonance: inputs.memory_resonance.min(100),
            colors,
            dimensions: inputs.dimensions,
            alternatives: inputs.alternatives,
            timestamp_ms: inputs.timestamp_ms,
        }
    }
}

impl Default for EmotionStateAssembler {
    fn default() -> Self {
        Self::new(&PaletteConfig::default())
    }
}

/// Map a 0.0-1.0 ratio onto 0-100
pub fn percent(ratio: f32) -> u8 {
    if ratio.is_nan() {
        return 0;
    }
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u8
}
