// FrameBuilder - PCM window → AudioFrame
//
// Mirrors what a browser AnalyserNode hands the pipeline: Hann-windowed FFT
// magnitudes over `fft_size / 2` bins (DC up to just below Nyquist) plus
// byte time-domain samples centred on 128.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::analysis::frame::{AudioFrame, MagnitudeScale, TIME_SAMPLE_MIDLINE};
use crate::config::ExtractionConfig;

/// Default analysis window, matching a 2048-point analyser
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Lowest decibel value emitted for bins with any energy; empty bins are
/// `-inf`, as an analyser node reports them
const DB_FLOOR: f32 = -160.0;

pub struct FrameBuilder {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Hann window (pre-computed)
    window: Vec<f32>,
    scale: MagnitudeScale,
    min_db: f32,
    max_db: f32,
}

impl FrameBuilder {
    /// Create a builder
    ///
    /// # Arguments
    /// * `fft_size` - Window length in samples (at least 2)
    /// * `scale` - Whether frames carry decibels or 0-255 bytes
    /// * `extraction` - Source of the decibel range used for byte mapping
    pub fn new(fft_size: usize, scale: MagnitudeScale, extraction: &ExtractionConfig) -> Self {
        let fft_size = fft_size.max(2);
        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0
                    - ((2.0 * std::f32::consts::PI * i as f32) / (fft_size as f32 - 1.0)).cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            fft_size,
            window,
            scale,
            min_db: extraction.min_db,
            max_db: extraction.max_db,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Build one frame from up to `fft_size` samples (zero-padded if short)
    pub fn build(&self, pcm: &[f32], sample_rate: u32) -> AudioFrame {
        let mut buffer: Vec<Complex<f32>> = (0..self.fft_size)
            .map(|i| {
                let sample = pcm.get(i).copied().unwrap_or(0.0);
                Complex::new(sample * self.window[i], 0.0)
            })
            .collect();
        self.fft.process(&mut buffer);

        // Full-scale sine → magnitude ~1.0 (Hann coherent gain 0.5)
        let norm = self.fft_size as f32 / 4.0;
        let decibels = buffer[..self.fft_size / 2].iter().map(|c| {
            let magnitude = c.norm() / norm;
            if magnitude > 0.0 {
                (20.0 * magnitude.log10()).max(DB_FLOOR)
            } else {
                f32::NEG_INFINITY
            }
        });

        let frequency_magnitudes = match self.scale {
            MagnitudeScale::Decibels => decibels.collect(),
            MagnitudeScale::Linear => decibels.map(|db| self.db_to_byte(db)).collect(),
        };

        let time_samples = (0..self.fft_size)
            .map(|i| {
                let sample = pcm.get(i).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
                (TIME_SAMPLE_MIDLINE + sample * 127.0).round().clamp(0.0, 255.0) as u8
            })
            .collect();

        AudioFrame {
            frequency_magnitudes,
            scale: self.scale,
            time_samples,
            sample_rate,
        }
    }

    /// Slice `pcm` into frames every `hop` samples
    ///
    /// A trailing partial window is dropped unless it is the only one.
    pub fn frames(&self, pcm: &[f32], sample_rate: u32, hop: usize) -> Vec<AudioFrame> {
        let hop = hop.max(1);
        if pcm.len() <= self.fft_size {
            return vec![self.build(pcm, sample_rate)];
        }
        (0..=pcm.len() - self.fft_size)
            .step_by(hop)
            .map(|start| self.build(&pcm[start..start + self.fft_size], sample_rate))
            .collect()
    }

    fn db_to_byte(&self, db: f32) -> f32 {
        let range = self.max_db - self.min_db;
        if range <= 0.0 {
            return 0.0;
        }
        (((db - self.min_db) / range) * 255.0).clamp(0.0, 255.0).floor()
    }
}
