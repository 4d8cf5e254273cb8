// Types module - Data structures for extracted audio features
//
// A FeatureVector is derived from exactly one AudioFrame and carries no
// identity of its own. Degenerate input produces zero-valued fields, which
// is why everything here derives Default.

use serde::{Deserialize, Serialize};

/// Frequency-domain distribution statistics
///
/// Bin-index statistics (centroid, spread) are normalized by the bin count,
/// so they share rolloff's 0.0-1.0 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralFeatures {
    /// Intensity-weighted mean bin index / N
    pub centroid: f32,
    /// Smallest bin index reaching 85% of total intensity, / N
    pub rolloff: f32,
    /// Geometric mean / arithmetic mean of intensities (0 = tonal, 1 = flat)
    pub flatness: f32,
    /// Intensity-weighted standard deviation of bin index / N
    pub spread: f32,
    /// Least-squares slope of intensity against bin index
    pub slope: f32,
    /// Excess kurtosis of the bin distribution
    pub kurtosis: f32,
    /// Skewness of the bin distribution
    pub skewness: f32,
}

/// Time-domain statistics of the byte samples normalized to [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    /// Root mean square amplitude
    pub rms: f32,
    /// Fraction of adjacent samples crossing the midline
    pub zcr: f32,
    /// Mean square amplitude
    pub energy: f32,
    /// Shannon entropy (bits) of the normalized intensity distribution
    pub entropy: f32,
}

/// One detected harmonic partial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// 1 for the fundamental, 2 for the first overtone, ...
    pub harmonic_number: u32,
    /// Frequency of the strongest bin in the search window (Hz)
    pub frequency: f32,
    /// Linear intensity of that bin
    pub magnitude: f32,
}

/// Pitch and harmonic structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarmonicFeatures {
    /// Estimated fundamental frequency in Hz (0 when no peaks)
    pub f0: f32,
    /// Energy fraction of peaks aligned with multiples of f0 (0.0-1.0)
    pub harmonicity: f32,
    /// 1 - harmonicity
    pub inharmonicity: f32,
    /// Up to 10 partials in harmonic order
    pub harmonics: Vec<Harmonic>,
}

impl HarmonicFeatures {
    /// Energy present but no harmonic structure to anchor an f0
    pub fn unstructured() -> Self {
        Self {
            f0: 0.0,
            harmonicity: 0.0,
            inharmonicity: 1.0,
            harmonics: Vec::new(),
        }
    }
}

/// Byte-scale (0-255) mean intensity per frequency region
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandEnergies {
    pub overall: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl BandEnergies {
    /// Bass/mid/treble shares of the summed band energy
    ///
    /// Returns `None` when no band carries energy.
    pub fn shares(&self) -> Option<[f32; 3]> {
        let total = self.bass + self.mid + self.treble;
        if total <= 0.0 {
            return None;
        }
        Some([self.bass / total, self.mid / total, self.treble / total])
    }
}

/// Cross-frame rhythm estimate filled in by the TempoTracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RhythmFeatures {
    /// Beats per minute (0 when unknown)
    pub tempo: f32,
    /// Irregularity of inter-onset intervals (0.0-1.0)
    pub complexity: f32,
}

/// Flat feature vector for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub spectral: SpectralFeatures,
    pub temporal: TemporalFeatures,
    pub harmonic: HarmonicFeatures,
    pub bands: BandEnergies,
    #[serde(default)]
    pub rhythm: RhythmFeatures,
}

impl FeatureVector {
    /// True when every numeric field is zero and no harmonics were found
    pub fn is_zero(&self) -> bool {
        *self == FeatureVector::default()
    }
}
