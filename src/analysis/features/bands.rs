// Bands module - byte-scale energy per frequency region
//
// Regions are split by bin centre frequency: bass below `bass_cutoff_hz`,
// treble at or above `treble_cutoff_hz`, mid in between.

use super::types::BandEnergies;

pub struct BandAnalyzer {
    bass_cutoff_hz: f32,
    treble_cutoff_hz: f32,
}

impl BandAnalyzer {
    pub fn new(bass_cutoff_hz: f32, treble_cutoff_hz: f32) -> Self {
        Self {
            bass_cutoff_hz,
            treble_cutoff_hz: treble_cutoff_hz.max(bass_cutoff_hz),
        }
    }

    /// Mean byte intensity of the whole spectrum and of each region
    ///
    /// # Arguments
    /// * `byte_intensities` - 0-255 intensity per bin
    /// * `sample_rate` - Sample rate in Hz (0 puts every bin into bass)
    pub fn analyze(&self, byte_intensities: &[f32], sample_rate: u32) -> BandEnergies {
        if byte_intensities.is_empty() {
            return BandEnergies::default();
        }

        let hz_per_bin = sample_rate as f32 / 2.0 / byte_intensities.len() as f32;
        let mut sums = [0.0f64; 3];
        let mut counts = [0usize; 3];

        for (i, &value) in byte_intensities.iter().enumerate() {
            let freq = i as f32 * hz_per_bin;
            let region = if freq < self.bass_cutoff_hz {
                0
            } else if freq < self.treble_cutoff_hz {
                1
            } else {
                2
            };
            sums[region] += value as f64;
            counts[region] += 1;
        }

        let mean = |region: usize| -> f32 {
            if counts[region] == 0 {
                0.0
            } else {
                (sums[region] / counts[region] as f64) as f32
            }
        };

        BandEnergies {
            overall: (sums.iter().sum::<f64>() / byte_intensities.len() as f64) as f32,
            bass: mean(0),
            mid: mean(1),
            treble: mean(2),
        }
    }
}
