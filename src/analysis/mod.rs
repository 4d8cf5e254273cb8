// Analysis module - per-frame emotion pipeline
//
// This module turns one AudioFrame into one EmotionalState. Every stage but
// the adaptation store is a pure function of its inputs.
//
// Architecture:
// - EmotionAnalyzer: owns the stages and drives them once per frame
// - Pipeline: FeatureExtractor (+ TempoTracker) → DimensionalMapper →
//   EmotionClassifier → PersonalAdaptationStore → EmotionStateAssembler
// - Output: EmotionalState returned to the caller (see `crate::engine` for
//   the broadcast host)

use std::sync::Arc;

use crate::adaptation::PersonalAdaptationStore;
use crate::config::AppConfig;
use crate::engine::clock::{SystemTimeSource, TimeSource};
use crate::error::TaxonomyError;
use crate::taxonomy::EmotionTaxonomy;

pub mod assembler;
pub mod classifier;
pub mod dimensions;
pub mod features;
pub mod frame;
pub mod palette;
pub mod rhythm;

pub use assembler::{EmotionStateAssembler, EmotionalState, StateInputs, NEUTRAL_CATEGORY};
pub use classifier::{Alternative, Classification, EmotionClassifier};
pub use dimensions::{DimensionalMapper, EmotionDimensions};
pub use features::{FeatureExtractor, FeatureVector};
pub use frame::{AudioFrame, MagnitudeScale};
pub use palette::{Color, PaletteBuilder};
pub use rhythm::TempoTracker;

/// Runs the full pipeline for one user
///
/// Constructed once and driven by whoever owns the frame loop. Not shared
/// between threads; wrap it in `crate::engine::AnalyzerHandle` for that.
pub struct EmotionAnalyzer {
    taxonomy: EmotionTaxonomy,
    extractor: FeatureExtractor,
    tempo: TempoTracker,
    mapper: DimensionalMapper,
    classifier: EmotionClassifier,
    assembler: EmotionStateAssembler,
    store: PersonalAdaptationStore,
    time_source: Arc<dyn TimeSource>,
}

impl EmotionAnalyzer {
    /// Build the pipeline
    ///
    /// # Arguments
    /// * `taxonomy` - Category table to classify against
    /// * `config` - Tuning for every stage
    /// * `store` - This user's adaptation store
    ///
    /// # Errors
    /// `TaxonomyError::Empty` when the taxonomy has no primary category, so
    /// nothing could ever be classified
    pub fn new(
        taxonomy: EmotionTaxonomy,
        config: &AppConfig,
        store: PersonalAdaptationStore,
    ) -> Result<Self, TaxonomyError> {
        if taxonomy.primaries().next().is_none() {
            return Err(TaxonomyError::Empty);
        }

        log::info!(
            "[Analyzer] Pipeline ready: {} categories, user '{}', {} stored observations",
            taxonomy.len(),
            store.user(),
            store.history_len()
        );

        Ok(Self {
            taxonomy,
            extractor: FeatureExtractor::new(&config.extraction),
            tempo: TempoTracker::new(config.rhythm.clone()),
            mapper: DimensionalMapper::new(),
            classifier: EmotionClassifier::new(&config.classification),
            assembler: EmotionStateAssembler::new(&config.palette),
            store,
            time_source: Arc::new(SystemTimeSource::default()),
        })
    }

    /// Replace the clock used for timestamps and the recency window
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Analyze one frame stamped with the analyzer's clock
    pub fn analyze(&mut self, frame: &AudioFrame) -> EmotionalState {
        let now_ms = self.time_source.now_ms();
        self.analyze_at(frame, now_ms)
    }

    /// Analyze one frame stamped with `now_ms`
    ///
    /// 1. Extract features and fold in the cross-frame rhythm estimate
    /// 2. Degenerate frames short-circuit to the neutral state
    /// 3. Map to dimensions and classify
    /// 4. Resonance and confidence adjustment from the personal model
    /// 5. Assemble, then record the observation
    pub fn analyze_at(&mut self, frame: &AudioFrame, now_ms: u64) -> EmotionalState {
        let mut features = self.extractor.extract(frame);
        features.rhythm = self.tempo.observe(frame);

        if is_degenerate(frame, &features) {
            tracing::trace!("[Analyzer] Degenerate frame, emitting neutral state");
            return EmotionalState::neutral(now_ms);
        }

        let dims = self.mapper.map_to_dimensions(&features);
        let Some(classification) = self.classifier.classify(&dims, &self.taxonomy) else {
            return EmotionalState::neutral(now_ms);
        };

        let resonance = self
            .store
            .compute_resonance(&classification.primary, now_ms);
        let confidence = self.store.adjust_confidence(classification.score, &dims);

        let state = self.assembler.assemble(
            StateInputs {
                category: &classification.primary,
                confidence,
                dimensions: dims,
                memory_resonance: resonance,
                alternatives: classification.alternatives,
                personal_colors: self.store.color_preference(&classification.primary),
                timestamp_ms: now_ms,
            },
            &self.taxonomy,
        );

        self.store.record_observation(&state, &features);

        tracing::debug!(
            category = %state.primary_category,
            confidence = state.confidence,
            resonance = state.memory_resonance,
            depth = state.depth,
            "[Analyzer] Frame classified"
        );
        state
    }

    /// Record that `original` should have been `corrected`
    pub fn record_correction(&mut self, original: &EmotionalState, corrected: &str, context: &str) {
        let now_ms = self.time_source.now_ms();
        self.store
            .record_correction(original, corrected, context, now_ms);
    }

    /// Forget accumulated tempo history (e.g. when the source changes)
    pub fn reset_rhythm(&mut self) {
        self.tempo.reset();
    }

    pub fn taxonomy(&self) -> &EmotionTaxonomy {
        &self.taxonomy
    }

    pub fn store(&self) -> &PersonalAdaptationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersonalAdaptationStore {
        &mut self.store
    }
}

/// A frame with nothing to analyze: no bins, no sample rate, or neither
/// spectral intensity nor time-domain energy
fn is_degenerate(frame: &AudioFrame, features: &FeatureVector) -> bool {
    if frame.frequency_magnitudes.is_empty() || frame.sample_rate == 0 {
        return true;
    }
    let total_intensity: f32 = frame.intensities().iter().sum();
    total_intensity <= 0.0 && features.temporal.rms <= 0.0
}
