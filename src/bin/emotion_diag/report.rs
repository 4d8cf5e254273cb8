use std::collections::BTreeMap;

use anyhow::{Context, Result};
use emotion_resonance::adaptation::PersonalAdaptationStore;
use emotion_resonance::analysis::EmotionalState;
use serde::Serialize;

/// Folds a stream of states into a session summary
#[derive(Default)]
pub struct SessionAggregator {
    frames: usize,
    neutral_frames: usize,
    categories: BTreeMap<String, usize>,
    confidence_sum: u64,
    peak_resonance: u8,
    last_state: Option<EmotionalState>,
}

impl SessionAggregator {
    pub fn record(&mut self, state: &EmotionalState) {
        self.frames += 1;
        if state.is_neutral() {
            self.neutral_frames += 1;
        } else {
            *self
                .categories
                .entry(state.primary_category.clone())
                .or_insert(0) += 1;
            self.confidence_sum += state.confidence as u64;
        }
        self.peak_resonance = self.peak_resonance.max(state.memory_resonance);
        self.last_state = Some(state.clone());
    }

    pub fn into_report(self, source: String, sample_rate: u32) -> SessionReport {
        let classified = self.frames - self.neutral_frames;
        let dominant_category = self
            .categories
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.clone());
        let mean_confidence = if classified == 0 {
            0.0
        } else {
            self.confidence_sum as f32 / classified as f32
        };

        SessionReport {
            source,
            sample_rate,
            frames: self.frames,
            neutral_frames: self.neutral_frames,
            dominant_category,
            mean_confidence,
            peak_resonance: self.peak_resonance,
            categories: self.categories,
            last_state: self.last_state,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub source: String,
    pub sample_rate: u32,
    pub frames: usize,
    pub neutral_frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_category: Option<String>,
    pub mean_confidence: f32,
    pub peak_resonance: u8,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_state: Option<EmotionalState>,
}

impl SessionReport {
    pub fn print_json(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing session report")?;
        println!("{json}");
        Ok(())
    }

    pub fn print_table(&self) {
        println!("Source                   : {} @ {} Hz", self.source, self.sample_rate);
        println!(
            "Frames analyzed          : {} ({} neutral)",
            self.frames, self.neutral_frames
        );
        match &self.dominant_category {
            Some(category) => println!("Dominant category        : {category}"),
            None => println!("Dominant category        : n/a"),
        }
        println!("Mean confidence          : {:.1}", self.mean_confidence);
        println!("Peak memory resonance    : {}", self.peak_resonance);

        if !self.categories.is_empty() {
            println!("Categories               :");
            for (name, count) in &self.categories {
                println!("  - {name}: {count}");
            }
        }

        if let Some(state) = &self.last_state {
            let colors: Vec<String> = state.colors.iter().map(|c| c.to_hex()).collect();
            println!(
                "Last state               : {} (confidence {}, depth {}, resonance {})",
                state.primary_category, state.confidence, state.depth, state.memory_resonance
            );
            println!(
                "Last dimensions          : v={:.2} a={:.2} d={:.2} c={:.2}",
                state.dimensions.valence,
                state.dimensions.arousal,
                state.dimensions.dominance,
                state.dimensions.complexity
            );
            println!("Last colors              : {}", colors.join(" "));
        }
    }
}

/// Summary of a stored personal model
#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub user: String,
    pub observations: usize,
    pub corrections: usize,
    pub adaptation_rate: f32,
    pub categories: BTreeMap<String, usize>,
    pub color_preferences: BTreeMap<String, Vec<String>>,
}

impl ModelReport {
    pub fn from_store(store: &PersonalAdaptationStore) -> Self {
        let model = store.model();
        Self {
            user: store.user().to_string(),
            observations: store.history_len(),
            corrections: store.corrections_len(),
            adaptation_rate: model.adaptation_rate,
            categories: store.category_counts(),
            color_preferences: model
                .color_preferences
                .iter()
                .map(|(name, colors)| (name.clone(), colors.iter().map(|c| c.to_hex()).collect()))
                .collect(),
        }
    }

    pub fn print_json(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing model report")?;
        println!("{json}");
        Ok(())
    }

    pub fn print_table(&self) {
        println!("User                     : {}", self.user);
        println!("Observations             : {}", self.observations);
        println!("Corrections              : {}", self.corrections);
        println!("Adaptation rate          : {:.2}", self.adaptation_rate);
        if !self.categories.is_empty() {
            println!("Categories               :");
            for (name, count) in &self.categories {
                println!("  - {name}: {count}");
            }
        }
        if !self.color_preferences.is_empty() {
            println!("Color preferences        :");
            for (name, colors) in &self.color_preferences {
                println!("  - {name}: {}", colors.join(" "));
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatesPayload {
    pub source: String,
    pub sample_rate: u32,
    pub state_count: usize,
    pub states: Vec<EmotionalState>,
}
