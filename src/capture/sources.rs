//! Deterministic PCM sources for diagnostics and tests.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Length of each tone burst in `Bursts`
const BURST_MS: f32 = 60.0;

/// Supported deterministic waveforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntheticSource {
    Sine { frequency_hz: f32, amplitude: f32 },
    /// `partials` harmonics of `f0_hz` with 1/n amplitudes
    HarmonicStack {
        f0_hz: f32,
        partials: u32,
        amplitude: f32,
    },
    WhiteNoise { amplitude: f32, seed: u64 },
    /// Short sine bursts on every beat at `bpm`
    Bursts {
        frequency_hz: f32,
        bpm: f32,
        amplitude: f32,
    },
    Silence,
}

impl SyntheticSource {
    /// Render `len` samples at `sample_rate`
    pub fn render(&self, sample_rate: u32, len: usize) -> Vec<f32> {
        if sample_rate == 0 {
            return vec![0.0; len];
        }
        let sr = sample_rate as f32;

        match *self {
            SyntheticSource::Sine {
                frequency_hz,
                amplitude,
            } => (0..len)
                .map(|i| (2.0 * PI * frequency_hz * i as f32 / sr).sin() * amplitude)
                .collect(),
            SyntheticSource::HarmonicStack {
                f0_hz,
                partials,
                amplitude,
            } => {
                let partials = partials.max(1);
                let norm: f32 = (1..=partials).map(|n| 1.0 / n as f32).sum();
                (0..len)
                    .map(|i| {
                        let t = i as f32 / sr;
                        let sum: f32 = (1..=partials)
                            .map(|n| (2.0 * PI * f0_hz * n as f32 * t).sin() / n as f32)
                            .sum();
                        sum / norm * amplitude
                    })
                    .collect()
            }
            SyntheticSource::WhiteNoise { amplitude, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let amplitude = amplitude.abs();
                if amplitude == 0.0 {
                    return vec![0.0; len];
                }
                (0..len)
                    .map(|_| rng.gen_range(-amplitude..amplitude))
                    .collect()
            }
            SyntheticSource::Bursts {
                frequency_hz,
                bpm,
                amplitude,
            } => {
                if bpm <= 0.0 {
                    return vec![0.0; len];
                }
                let beat = ((60.0 / bpm) * sr).max(1.0) as usize;
                let burst = ((BURST_MS / 1000.0) * sr) as usize;
                (0..len)
                    .map(|i| {
                        if i % beat < burst {
                            (2.0 * PI * frequency_hz * i as f32 / sr).sin() * amplitude
                        } else {
                            0.0
                        }
                    })
                    .collect()
            }
            SyntheticSource::Silence => vec![0.0; len],
        }
    }
}
