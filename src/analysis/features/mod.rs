// FeatureExtractor - turns one AudioFrame into a flat FeatureVector
//
// Module organization:
// - types: Data structures (FeatureVector and its sections)
// - spectral: Distribution statistics over the intensity spectrum + entropy
// - temporal: RMS, energy, zero-crossing rate
// - harmonic: Peak picking, fundamental estimate, harmonicity, partials
// - bands: Byte-scale bass/mid/treble energies
// - mod.rs: Coordinator (FeatureExtractor)
//
// Extraction is a pure function of one frame: no state is carried between
// calls and no input can make it fail. Degenerate input (empty or all-zero
// buffers, zero sample rate) degrades to zero-valued fields. Rhythm fields
// stay zero here; the analyzer's TempoTracker fills them across frames.

mod bands;
mod harmonic;
mod spectral;
mod temporal;
mod types;

pub use types::{
    BandEnergies, FeatureVector, Harmonic, HarmonicFeatures, RhythmFeatures, SpectralFeatures,
    TemporalFeatures,
};

pub use spectral::compute_entropy;

use crate::analysis::frame::AudioFrame;
use crate::config::ExtractionConfig;
use bands::BandAnalyzer;
use harmonic::HarmonicAnalyzer;
use spectral::SpectralAnalyzer;

/// FeatureExtractor coordinates the spectral, temporal, harmonic and band
/// analyzers into a single unified interface.
pub struct FeatureExtractor {
    spectral: SpectralAnalyzer,
    harmonic: HarmonicAnalyzer,
    bands: BandAnalyzer,
    min_db: f32,
    max_db: f32,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor from extraction parameters
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            spectral: SpectralAnalyzer::new(config.rolloff_threshold),
            harmonic: HarmonicAnalyzer::new(
                config.peak_threshold,
                config.harmonic_tolerance,
                config.max_harmonics,
            ),
            bands: BandAnalyzer::new(config.bass_cutoff_hz, config.treble_cutoff_hz),
            min_db: config.min_db,
            max_db: config.max_db,
        }
    }

    /// Extract all features from an audio frame
    ///
    /// 1. Convert magnitudes to linear intensities
    /// 2. Spectral distribution statistics and entropy
    /// 3. Time-domain statistics from the byte samples
    /// 4. Harmonic structure
    /// 5. Byte-scale band energies
    pub fn extract(&self, frame: &AudioFrame) -> FeatureVector {
        let intensities = frame.intensities();
        let samples = frame.normalized_samples();

        let temporal = TemporalFeatures {
            rms: temporal::compute_rms(&samples),
            zcr: temporal::compute_zcr(&samples),
            energy: temporal::compute_energy(&samples),
            entropy: spectral::compute_entropy(&intensities),
        };

        FeatureVector {
            spectral: self.spectral.analyze(&intensities),
            temporal,
            harmonic: self.harmonic.analyze(&intensities, frame.sample_rate),
            bands: self.bands.analyze(
                &frame.byte_intensities(self.min_db, self.max_db),
                frame.sample_rate,
            ),
            rhythm: RhythmFeatures::default(),
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}
