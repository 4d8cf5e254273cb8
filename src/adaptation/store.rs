// PersonalAdaptationStore - the only cross-call mutable state in the pipeline
//
// Owns one user's PersonalModel: bounded observation history, bounded
// corrections log, and color preferences. Writes through to an optional
// ModelStore on a throttled cadence; write failures are logged and the
// in-memory model keeps working unpersisted.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::adaptation::model::{Correction, HistoryEntry, PersonalModel};
use crate::adaptation::persistence::ModelStore;
use crate::analysis::assembler::EmotionalState;
use crate::analysis::dimensions::EmotionDimensions;
use crate::analysis::features::FeatureVector;
use crate::analysis::palette::Color;
use crate::config::AdaptationConfig;
use crate::error::{log_persistence_error, PersistenceError};

pub struct PersonalAdaptationStore {
    config: AdaptationConfig,
    model: PersonalModel,
    rng: StdRng,
    backend: Option<Box<dyn ModelStore>>,
    user: String,
    observations_since_save: u64,
}

impl PersonalAdaptationStore {
    /// In-memory store with an empty model and no backing store
    pub fn new(config: AdaptationConfig) -> Self {
        let model = PersonalModel::new(config.adaptation_rate);
        Self::from_parts(config, model, None, String::new())
    }

    /// Load `user`'s model from `backend`, starting empty if there is none
    ///
    /// A failing load is logged and treated like a missing model so the
    /// pipeline can still start.
    pub fn restore(config: AdaptationConfig, backend: Box<dyn ModelStore>, user: &str) -> Self {
        let model = match backend.load(user) {
            Ok(Some(mut model)) => {
                model.enforce_caps(config.history_capacity, config.corrections_capacity);
                log::info!(
                    "[Adaptation] Restored model for '{}' ({} observations, {} corrections)",
                    user,
                    model.emotion_history.len(),
                    model.user_corrections.len()
                );
                model
            }
            Ok(None) => {
                log::info!("[Adaptation] No stored model for '{}', starting fresh", user);
                PersonalModel::new(config.adaptation_rate)
            }
            Err(err) => {
                log_persistence_error(&err, "PersonalAdaptationStore::restore");
                PersonalModel::new(config.adaptation_rate)
            }
        };
        Self::from_parts(config, model, Some(backend), user.to_string())
    }

    /// Wrap an existing model, optionally backed by a store
    pub fn from_parts(
        config: AdaptationConfig,
        model: PersonalModel,
        backend: Option<Box<dyn ModelStore>>,
        user: String,
    ) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            model,
            rng,
            backend,
            user,
            observations_since_save: 0,
        }
    }

    /// Append an observation, evicting the oldest past the history cap
    ///
    /// Every `persist_every`-th observation writes the model through to the
    /// backing store.
    pub fn record_observation(&mut self, state: &EmotionalState, features: &FeatureVector) {
        if self.model.emotion_history.len() >= self.config.history_capacity {
            self.model.emotion_history.pop_front();
        }
        if self.config.history_capacity > 0 {
            self.model.emotion_history.push_back(HistoryEntry {
                state: state.clone(),
                features: features.clone(),
            });
        }

        self.observations_since_save += 1;
        if self.config.persist_every > 0 && self.observations_since_save >= self.config.persist_every
        {
            self.persist("record_observation");
        }
    }

    /// Memory resonance for `category` at time `now_ms`, 0-100
    ///
    /// Unseen categories get a pseudo-random novelty value in
    /// `[0, novelty_max]`. Seen categories get the average resonance of
    /// their past entries plus `recency_bonus` for every entry within the
    /// recency window, capped at 100.
    pub fn compute_resonance(&mut self, category: &str, now_ms: u64) -> u8 {
        let mut count = 0u32;
        let mut recent = 0u32;
        let mut total = 0.0f32;
        for entry in self.model.entries_for(category) {
            count += 1;
            total += entry.state.memory_resonance as f32;
            if now_ms.saturating_sub(entry.state.timestamp_ms) <= self.config.recency_window_ms {
                recent += 1;
            }
        }

        if count == 0 {
            return self.rng.gen_range(0..=self.config.novelty_max.min(100));
        }

        let average = total / count as f32;
        let bonus = (self.config.recency_bonus as f32) * recent as f32;
        (average + bonus).round().min(100.0) as u8
    }

    /// Log that `original` should have been classified as `corrected`
    pub fn record_correction(
        &mut self,
        original: &EmotionalState,
        corrected: &str,
        context: &str,
        now_ms: u64,
    ) {
        if self.model.user_corrections.len() >= self.config.corrections_capacity {
            self.model.user_corrections.pop_front();
        }
        if self.config.corrections_capacity > 0 {
            self.model.user_corrections.push_back(Correction {
                original: original.clone(),
                corrected: corrected.to_string(),
                context: context.to_string(),
                timestamp_ms: now_ms,
            });
        }
        log::info!(
            "[Adaptation] Correction recorded: {} -> {}",
            original.primary_category,
            corrected
        );
    }

    /// Boost `raw` by `(1 + adaptationRate)` when a past correction is close
    ///
    /// Closeness is four-dimensional similarity above the configured
    /// threshold. The result never exceeds 1.0.
    pub fn adjust_confidence(&self, raw: f32, dims: &EmotionDimensions) -> f32 {
        let corrected_nearby = self.model.user_corrections.iter().any(|c| {
            c.original.dimensions.full_similarity(dims) > self.config.correction_similarity
        });
        if corrected_nearby {
            (raw * (1.0 + self.model.adaptation_rate)).min(1.0)
        } else {
            raw
        }
    }

    /// Replace the personal colors shown first for `category`
    pub fn set_color_preference(&mut self, category: &str, colors: Vec<Color>) {
        if colors.is_empty() {
            self.model.color_preferences.remove(category);
        } else {
            self.model
                .color_preferences
                .insert(category.to_string(), colors);
        }
    }

    pub fn color_preference(&self, category: &str) -> &[Color] {
        self.model
            .color_preferences
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Write the model to the backing store now
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(());
        };
        backend.save(&self.user, &self.model)?;
        self.observations_since_save = 0;
        Ok(())
    }

    /// Observation count per category
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.model.emotion_history {
            *counts
                .entry(entry.state.primary_category.clone())
                .or_insert(0) += 1;
        }
        counts
    }

    /// Copy of the current model for read-only consumers
    pub fn snapshot(&self) -> PersonalModel {
        self.model.clone()
    }

    pub fn model(&self) -> &PersonalModel {
        &self.model
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn history_len(&self) -> usize {
        self.model.emotion_history.len()
    }

    pub fn corrections_len(&self) -> usize {
        self.model.user_corrections.len()
    }

    fn persist(&mut self, context: &str) {
        if let Err(err) = self.flush() {
            log_persistence_error(&err, context);
            // Retry on the next cadence tick rather than every frame
            self.observations_since_save = 0;
        }
    }
}

impl Default for PersonalAdaptationStore {
    fn default() -> Self {
        Self::new(AdaptationConfig::default())
    }
}
