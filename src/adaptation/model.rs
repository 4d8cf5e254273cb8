// PersonalModel - the persisted per-user adaptation state
//
// Shape on disk (camelCase JSON):
// { emotionHistory: [...], userCorrections: [...], adaptationRate: n,
//   colorPreferences: { category: ["#RRGGBB", ...] } }
//
// colorPreferences is optional when reading so models written before it
// existed still load.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::analysis::assembler::EmotionalState;
use crate::analysis::features::FeatureVector;
use crate::analysis::palette::Color;

/// One observed state with the features it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub state: EmotionalState,
    pub features: FeatureVector,
}

/// A user's statement that a state should have been another category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub original: EmotionalState,
    pub corrected: String,
    #[serde(default)]
    pub context: String,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalModel {
    pub emotion_history: VecDeque<HistoryEntry>,
    pub user_corrections: VecDeque<Correction>,
    pub adaptation_rate: f32,
    #[serde(default)]
    pub color_preferences: BTreeMap<String, Vec<Color>>,
}

impl PersonalModel {
    /// Empty model with the given adaptation rate
    pub fn new(adaptation_rate: f32) -> Self {
        Self {
            emotion_history: VecDeque::new(),
            user_corrections: VecDeque::new(),
            adaptation_rate,
            color_preferences: BTreeMap::new(),
        }
    }

    /// Drop the oldest entries until both logs fit their caps
    pub fn enforce_caps(&mut self, history_capacity: usize, corrections_capacity: usize) {
        while self.emotion_history.len() > history_capacity {
            self.emotion_history.pop_front();
        }
        while self.user_corrections.len() > corrections_capacity {
            self.user_corrections.pop_front();
        }
    }

    /// Entries whose primary category is `category`, oldest first
    pub fn entries_for<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.emotion_history
            .iter()
            .filter(move |e| e.state.primary_category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let mut model = PersonalModel::new(0.1);
        model.emotion_history.push_back(HistoryEntry {
            state: EmotionalState::neutral(5),
            features: FeatureVector::default(),
        });
        model
            .color_preferences
            .insert("Joy".to_string(), vec![Color::rgb(1, 2, 3)]);

        let json = serde_json::to_value(&model).unwrap();
        assert!(json["emotionHistory"].is_array());
        assert!(json["userCorrections"].is_array());
        assert!((json["adaptationRate"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(json["colorPreferences"]["Joy"][0], "#010203");
        assert_eq!(
            json["emotionHistory"][0]["state"]["primaryCategory"],
            "Neutral"
        );
    }

    #[test]
    fn test_missing_color_preferences_defaults() {
        let json = r#"{"emotionHistory": [], "userCorrections": [], "adaptationRate": 0.25}"#;
        let model: PersonalModel = serde_json::from_str(json).unwrap();
        assert!(model.color_preferences.is_empty());
        assert_eq!(model.adaptation_rate, 0.25);
    }

    #[test]
    fn test_enforce_caps_keeps_newest() {
        let mut model = PersonalModel::new(0.1);
        for ts in 0..5 {
            model.emotion_history.push_back(HistoryEntry {
                state: EmotionalState::neutral(ts),
                features: FeatureVector::default(),
            });
        }
        model.enforce_caps(3, 3);
        assert_eq!(model.emotion_history.len(), 3);
        assert_eq!(model.emotion_history[0].state.timestamp_ms, 2);
    }
}
