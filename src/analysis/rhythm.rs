// TempoTracker - cross-frame tempo and rhythm irregularity
//
// A single frame is far too short to carry tempo, so the analyzer keeps one
// of these next to the (stateless) FeatureExtractor.
//
// Algorithm:
// 1. Spectral flux between consecutive frames: flux_t = mean(max(0, I_t[k] - I_(t-1)[k]))
// 2. Adaptive threshold: median(recent flux) + offset
// 3. Onset when flux_t exceeds the threshold and the refractory gap
//    (one beat at max_bpm) has elapsed since the previous onset
// 4. Tempo = 60 / median inter-onset interval, clamped to [min_bpm, max_bpm]
// 5. Complexity = coefficient of variation of the intervals, clamped to [0, 1]

use std::collections::VecDeque;

use crate::analysis::features::RhythmFeatures;
use crate::analysis::frame::AudioFrame;
use crate::config::RhythmConfig;

pub struct TempoTracker {
    config: RhythmConfig,
    prev_spectrum: Vec<f32>,
    flux_signal: VecDeque<f32>,
    intervals: VecDeque<u64>,
    frames_processed: u64,
    last_onset: Option<u64>,
}

impl TempoTracker {
    /// Reversed tempo bounds are swapped so clamping stays well-formed
    pub fn new(mut config: RhythmConfig) -> Self {
        if config.min_bpm > config.max_bpm {
            std::mem::swap(&mut config.min_bpm, &mut config.max_bpm);
        }
        let flux_capacity = config.flux_history.max(1);
        let interval_capacity = config.interval_history.max(1);
        Self {
            config,
            prev_spectrum: Vec::new(),
            flux_signal: VecDeque::with_capacity(flux_capacity),
            intervals: VecDeque::with_capacity(interval_capacity),
            frames_processed: 0,
            last_onset: None,
        }
    }

    /// Feed one frame and return the current rhythm estimate
    pub fn observe(&mut self, frame: &AudioFrame) -> RhythmFeatures {
        let spectrum = frame.intensities();
        let flux = self.spectral_flux(&spectrum);
        let threshold = median(self.flux_signal.iter().copied()) + self.config.threshold_offset;

        if flux > threshold && self.refractory_elapsed() {
            if let Some(last) = self.last_onset {
                if self.intervals.len() == self.config.interval_history.max(1) {
                    self.intervals.pop_front();
                }
                self.intervals.push_back(self.frames_processed - last);
            }
            self.last_onset = Some(self.frames_processed);
            log::trace!(
                "[TempoTracker] onset at frame {} (flux {:.4} > {:.4})",
                self.frames_processed,
                flux,
                threshold
            );
        }

        if self.flux_signal.len() == self.config.flux_history.max(1) {
            self.flux_signal.pop_front();
        }
        self.flux_signal.push_back(flux);
        self.prev_spectrum = spectrum;
        self.frames_processed += 1;

        self.current()
    }

    /// Rhythm estimate from the intervals observed so far
    pub fn current(&self) -> RhythmFeatures {
        if self.intervals.is_empty() || self.config.frame_rate_hz <= 0.0 {
            return RhythmFeatures::default();
        }

        let median_frames = median(self.intervals.iter().map(|&i| i as f32));
        let tempo = if median_frames > 0.0 {
            (60.0 * self.config.frame_rate_hz / median_frames)
                .clamp(self.config.min_bpm, self.config.max_bpm)
        } else {
            0.0
        };

        RhythmFeatures {
            tempo,
            complexity: self.interval_variation(),
        }
    }

    /// Forget all onset history
    pub fn reset(&mut self) {
        self.prev_spectrum.clear();
        self.flux_signal.clear();
        self.intervals.clear();
        self.frames_processed = 0;
        self.last_onset = None;
    }

    fn spectral_flux(&self, spectrum: &[f32]) -> f32 {
        if spectrum.is_empty() || spectrum.len() != self.prev_spectrum.len() {
            return 0.0;
        }
        let rise: f32 = spectrum
            .iter()
            .zip(&self.prev_spectrum)
            .map(|(&now, &before)| (now - before).max(0.0))
            .sum();
        rise / spectrum.len() as f32
    }

    fn refractory_elapsed(&self) -> bool {
        let Some(last) = self.last_onset else {
            return true;
        };
        if self.config.max_bpm <= 0.0 {
            return true;
        }
        let min_gap = (self.config.frame_rate_hz * 60.0 / self.config.max_bpm).floor() as u64;
        self.frames_processed - last >= min_gap.max(1)
    }

    fn interval_variation(&self) -> f32 {
        if self.intervals.len() < 2 {
            return 0.0;
        }
        let n = self.intervals.len() as f32;
        let mean = self.intervals.iter().map(|&i| i as f32).sum::<f32>() / n;
        if mean <= 0.0 {
            return 0.0;
        }
        let variance = self
            .intervals
            .iter()
            .map(|&i| (i as f32 - mean).powi(2))
            .sum::<f32>()
            / n;
        (variance.sqrt() / mean).clamp(0.0, 1.0)
    }
}

impl Default for TempoTracker {
    fn default() -> Self {
        Self::new(RhythmConfig::default())
    }
}

fn median(values: impl Iterator<Item = f32>) -> f32 {
    let mut sorted: Vec<f32> = values.collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
