// Frame module - the per-tick audio input handed to the pipeline
//
// An AudioFrame is produced once per analysis tick by a capture collaborator
// (see `crate::capture` for the PCM/WAV adapter). The pipeline never mutates
// it; every stage only borrows it.

use serde::{Deserialize, Serialize};

/// Midline of byte-valued time-domain samples (silence)
pub const TIME_SAMPLE_MIDLINE: f32 = 128.0;

/// Scale of the entries in `AudioFrame::frequency_magnitudes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeScale {
    /// Decibel floats (e.g. -100.0 ..= -30.0 from an analyser node)
    Decibels,
    /// Linear 0-255 byte intensities
    Linear,
}

/// One frame of already-extracted audio data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFrame {
    /// Frequency-domain magnitudes, one per bin from DC up to Nyquist
    pub frequency_magnitudes: Vec<f32>,
    /// How `frequency_magnitudes` should be interpreted
    pub scale: MagnitudeScale,
    /// Time-domain samples, 0-255 with 128 as the midline
    pub time_samples: Vec<u8>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioFrame {
    /// Build a frame from linear 0-255 magnitudes
    pub fn linear(frequency_magnitudes: Vec<f32>, time_samples: Vec<u8>, sample_rate: u32) -> Self {
        Self {
            frequency_magnitudes,
            scale: MagnitudeScale::Linear,
            time_samples,
            sample_rate,
        }
    }

    /// Build a frame from decibel magnitudes
    pub fn decibels(
        frequency_magnitudes: Vec<f32>,
        time_samples: Vec<u8>,
        sample_rate: u32,
    ) -> Self {
        Self {
            frequency_magnitudes,
            scale: MagnitudeScale::Decibels,
            time_samples,
            sample_rate,
        }
    }

    /// Number of frequency bins
    pub fn bin_count(&self) -> usize {
        self.frequency_magnitudes.len()
    }

    /// Centre frequency of `bin` in Hz (`bin / N * sample_rate / 2`)
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        let n = self.bin_count();
        if n == 0 {
            return 0.0;
        }
        bin as f32 / n as f32 * self.sample_rate as f32 / 2.0
    }

    /// Linear intensity of every bin
    ///
    /// Linear bytes map to `v / 255`, decibels to `10^(db/20)`. Negative or
    /// non-finite entries become 0 so downstream ratios stay guarded.
    pub fn intensities(&self) -> Vec<f32> {
        self.frequency_magnitudes
            .iter()
            .map(|&m| match self.scale {
                MagnitudeScale::Linear => {
                    if m.is_finite() && m > 0.0 {
                        m / 255.0
                    } else {
                        0.0
                    }
                }
                MagnitudeScale::Decibels => {
                    // Above ~770 dB the power overflows f32
                    let v = 10f32.powf(m / 20.0);
                    if m.is_finite() && v.is_finite() {
                        v
                    } else {
                        0.0
                    }
                }
            })
            .collect()
    }

    /// Byte-scale (0-255) intensity of every bin
    ///
    /// Decibel entries are mapped linearly from `[min_db, max_db]` onto
    /// `[0, 255]` the way analyser nodes produce byte frequency data.
    pub fn byte_intensities(&self, min_db: f32, max_db: f32) -> Vec<f32> {
        let range = max_db - min_db;
        self.frequency_magnitudes
            .iter()
            .map(|&m| {
                if !m.is_finite() {
                    return 0.0;
                }
                match self.scale {
                    MagnitudeScale::Linear => m.clamp(0.0, 255.0),
                    MagnitudeScale::Decibels => {
                        if range <= 0.0 {
                            0.0
                        } else {
                            ((m - min_db) / range).clamp(0.0, 1.0) * 255.0
                        }
                    }
                }
            })
            .collect()
    }

    /// Time samples normalized to [-1, 1]
    ///
    /// A buffer that is entirely zero bytes has never been filled by the
    /// capture side and yields an empty signal.
    pub fn normalized_samples(&self) -> Vec<f32> {
        if self.time_samples.iter().all(|&s| s == 0) {
            return Vec::new();
        }
        self.time_samples
            .iter()
            .map(|&s| (s as f32 - TIME_SAMPLE_MIDLINE) / TIME_SAMPLE_MIDLINE)
            .collect()
    }
}
