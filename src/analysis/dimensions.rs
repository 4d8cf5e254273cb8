// DimensionalMapper - FeatureVector → valence/arousal/dominance/complexity
//
// Each dimension is a weighted sum of independently bounded signal
// statistics, clamped to [0, 1] at the end. Energy, bass and treble are
// byte-scale (0-255) band means; centroid is the normalized spectral
// centroid.

use serde::{Deserialize, Serialize};

use crate::analysis::features::FeatureVector;

/// Tempo at which the arousal tempo term saturates
const TEMPO_SATURATION_BPM: f32 = 160.0;

/// Four bounded emotion dimensions, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionDimensions {
    /// Negative (0) to positive (1)
    pub valence: f32,
    /// Calm (0) to energetic (1)
    pub arousal: f32,
    /// Controlled (0) to controlling (1)
    pub dominance: f32,
    /// Spectral/rhythmic sophistication; gates composite categories
    pub complexity: f32,
}

impl EmotionDimensions {
    /// Create dimensions, clamping every field into [0, 1]
    pub fn new(valence: f32, arousal: f32, dominance: f32, complexity: f32) -> Self {
        Self {
            valence: clamp_unit(valence),
            arousal: clamp_unit(arousal),
            dominance: clamp_unit(dominance),
            complexity: clamp_unit(complexity),
        }
    }

    /// Midpoint affect with no complexity, used for degenerate frames
    pub fn neutral() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.0)
    }

    /// `1 - mean(|Δvalence|, |Δarousal|, |Δdominance|)`
    ///
    /// Complexity is deliberately left out; it only gates which
    /// categories are eligible.
    pub fn affect_similarity(&self, other: &EmotionDimensions) -> f32 {
        let diff = (self.valence - other.valence).abs()
            + (self.arousal - other.arousal).abs()
            + (self.dominance - other.dominance).abs();
        1.0 - diff / 3.0
    }

    /// `1 - mean |Δ|` over all four dimensions
    pub fn full_similarity(&self, other: &EmotionDimensions) -> f32 {
        let diff = (self.valence - other.valence).abs()
            + (self.arousal - other.arousal).abs()
            + (self.dominance - other.dominance).abs()
            + (self.complexity - other.complexity).abs();
        1.0 - diff / 4.0
    }

    pub fn is_within_bounds(&self) -> bool {
        [self.valence, self.arousal, self.dominance, self.complexity]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

/// Maps feature vectors onto emotion dimensions
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionalMapper;

impl DimensionalMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map features to dimensions (pure, deterministic, clamped)
    pub fn map_to_dimensions(&self, features: &FeatureVector) -> EmotionDimensions {
        EmotionDimensions::new(
            self.valence(features),
            self.arousal(features),
            self.dominance(features),
            self.complexity(features),
        )
    }

    fn valence(&self, f: &FeatureVector) -> f32 {
        let energy = byte_ratio(f.bands.overall);
        let rhythm = f.rhythm.complexity;

        let mut valence = 0.5;
        valence += 0.3 * f.harmonic.harmonicity;
        valence += 0.2 * (1.0 - (energy - 0.5).abs() * 2.0);
        if open_range(brightness_ratio(f), 0.3, 0.8) {
            valence += 0.2;
        }
        if open_range(rhythm, 0.3, 0.7) {
            valence += 0.1;
        }
        valence
    }

    fn arousal(&self, f: &FeatureVector) -> f32 {
        0.4 * byte_ratio(f.bands.overall)
            + 0.3 * (f.rhythm.tempo / TEMPO_SATURATION_BPM).min(1.0)
            + 0.2 * byte_ratio(f.bands.treble)
            + 0.1 * f.rhythm.complexity
    }

    fn dominance(&self, f: &FeatureVector) -> f32 {
        let mut dominance = 0.5;
        dominance += 0.3 * byte_ratio(f.bands.bass);
        dominance += 0.2 * (1.0 - f.harmonic.inharmonicity);
        if open_range(f.spectral.centroid, 0.3, 0.7) {
            dominance += 0.2;
        }
        if f.rhythm.complexity < 0.5 {
            dominance += 0.1;
        }
        dominance
    }

    fn complexity(&self, f: &FeatureVector) -> f32 {
        let mut complexity = 0.3 * f.spectral.flatness + 0.3 * f.rhythm.complexity;
        if open_range(f.harmonic.harmonicity, 0.3, 0.8) {
            complexity += 0.2;
        }
        complexity + 0.2 * spread_evenness(f)
    }
}

/// How evenly energy is shared between bass, mid and treble
///
/// 1 when each band holds a third, 0 when one band holds everything or
/// there is no band energy at all.
pub fn spread_evenness(features: &FeatureVector) -> f32 {
    let Some(shares) = features.bands.shares() else {
        return 0.0;
    };
    let deviation: f32 = shares.iter().map(|s| (s - 1.0 / 3.0).powi(2)).sum();
    clamp_unit(1.0 - deviation / (2.0 / 3.0))
}

/// Normalized centroid relative to normalized overall energy
fn brightness_ratio(features: &FeatureVector) -> f32 {
    let energy = byte_ratio(features.bands.overall);
    if energy <= 0.0 {
        0.0
    } else {
        features.spectral.centroid / energy
    }
}

fn byte_ratio(value: f32) -> f32 {
    clamp_unit(value / 255.0)
}

fn open_range(value: f32, lo: f32, hi: f32) -> bool {
    value > lo && value < hi
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::{BandEnergies, HarmonicFeatures, RhythmFeatures};

    fn features_with(bands: BandEnergies, harmonicity: f32, tempo: f32) -> FeatureVector {
        FeatureVector {
            bands,
            harmonic: HarmonicFeatures {
                f0: 220.0,
                harmonicity,
                inharmonicity: 1.0 - harmonicity,
                harmonics: Vec::new(),
            },
            rhythm: RhythmFeatures {
                tempo,
                complexity: 0.0,
            },
            ..FeatureVector::default()
        }
    }

    #[test]
    fn test_zero_features_map_inside_bounds() {
        let dims = DimensionalMapper::new().map_to_dimensions(&FeatureVector::default());
        assert!(dims.is_within_bounds());
        // baseline + energy term at energy 0 contributes nothing
        assert!((dims.valence - 0.5).abs() < 1e-6);
        assert_eq!(dims.arousal, 0.0);
        assert_eq!(dims.complexity, 0.0);
    }

    #[test]
    fn test_loud_fast_treble_is_aroused() {
        let mapper = DimensionalMapper::new();
        let loud = features_with(
            BandEnergies {
                overall: 240.0,
                bass: 200.0,
                mid: 220.0,
                treble: 250.0,
            },
            0.5,
            180.0,
        );
        let quiet = features_with(
            BandEnergies {
                overall: 20.0,
                bass: 30.0,
                mid: 10.0,
                treble: 5.0,
            },
            0.5,
            0.0,
        );
        let loud_dims = mapper.map_to_dimensions(&loud);
        let quiet_dims = mapper.map_to_dimensions(&quiet);
        assert!(loud_dims.arousal > 0.8, "arousal {}", loud_dims.arousal);
        assert!(quiet_dims.arousal < 0.2, "arousal {}", quiet_dims.arousal);
    }

    #[test]
    fn test_extreme_features_stay_clamped() {
        let mut features = features_with(
            BandEnergies {
                overall: 10_000.0,
                bass: 10_000.0,
                mid: 10_000.0,
                treble: 10_000.0,
            },
            1.0,
            10_000.0,
        );
        features.spectral.flatness = 5.0;
        features.rhythm.complexity = 0.5;
        let dims = DimensionalMapper::new().map_to_dimensions(&features);
        assert!(dims.is_within_bounds(), "{:?}", dims);
    }

    #[test]
    fn test_spread_evenness() {
        let even = features_with(
            BandEnergies {
                overall: 50.0,
                bass: 50.0,
                mid: 50.0,
                treble: 50.0,
            },
            0.0,
            0.0,
        );
        assert!((spread_evenness(&even) - 1.0).abs() < 1e-6);

        let lopsided = features_with(
            BandEnergies {
                overall: 50.0,
                bass: 150.0,
                mid: 0.0,
                treble: 0.0,
            },
            0.0,
            0.0,
        );
        assert!(spread_evenness(&lopsided).abs() < 1e-6);
        assert_eq!(spread_evenness(&FeatureVector::default()), 0.0);
    }

    #[test]
    fn test_similarity() {
        let a = EmotionDimensions::new(0.8, 0.6, 0.7, 0.2);
        assert!((a.affect_similarity(&a) - 1.0).abs() < 1e-6);
        let b = EmotionDimensions::new(0.5, 0.3, 0.4, 0.9);
        assert!((a.affect_similarity(&b) - 0.7).abs() < 1e-6);
        assert!((a.full_similarity(&b) - (1.0 - 1.6 / 4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_new_clamps() {
        let dims = EmotionDimensions::new(-1.0, 2.0, f32::NAN, 0.5);
        assert_eq!(dims.valence, 0.0);
        assert_eq!(dims.arousal, 1.0);
        assert_eq!(dims.dominance, 0.0);
        assert_eq!(dims.complexity, 0.5);
    }
}
