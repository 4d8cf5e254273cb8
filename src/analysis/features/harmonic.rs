// Harmonic module - peak picking, fundamental estimate, harmonicity
//
// Algorithm:
// 1. Peak pick: local maxima above `peak_threshold × global max intensity`
// 2. Fundamental: frequency of the single strongest peak
// 3. Harmonicity: squared-intensity share of peaks lying within
//    `tolerance × f0` of an integer multiple of f0
// 4. Harmonics: for n = 1..=max_harmonics, the strongest bin inside a
//    ±`tolerance × f0` window around n·f0
//
// All searching happens in bin units; only reported frequencies use Hz.

use super::types::{Harmonic, HarmonicFeatures};

/// Harmonic structure analysis over an intensity spectrum
pub struct HarmonicAnalyzer {
    peak_threshold: f32,
    tolerance: f32,
    max_harmonics: usize,
}

impl HarmonicAnalyzer {
    pub fn new(peak_threshold: f32, tolerance: f32, max_harmonics: usize) -> Self {
        Self {
            peak_threshold: peak_threshold.max(0.0),
            tolerance: tolerance.max(0.0),
            max_harmonics,
        }
    }

    /// Analyze harmonic structure
    ///
    /// # Arguments
    /// * `intensities` - Linear intensity spectrum (DC to Nyquist)
    /// * `sample_rate` - Sample rate in Hz, used to convert bins to Hz
    ///
    /// # Returns
    /// `HarmonicFeatures::default()` for a silent spectrum or zero sample
    /// rate. A spectrum with energy but no usable peak (none found, or the
    /// strongest on the DC bin) is fully inharmonic.
    pub fn analyze(&self, intensities: &[f32], sample_rate: u32) -> HarmonicFeatures {
        if sample_rate == 0 || !intensities.iter().any(|&v| v > 0.0) {
            return HarmonicFeatures::default();
        }

        let peaks = self.find_peaks(intensities);
        let strongest = peaks
            .iter()
            .copied()
            .max_by(|&a, &b| {
                intensities[a]
                    .partial_cmp(&intensities[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // Lower bin wins ties so the estimate is stable
                    .then(b.cmp(&a))
            });

        let f0_bin = match strongest {
            Some(bin) if bin > 0 => bin as f32,
            _ => return HarmonicFeatures::unstructured(),
        };

        let hz_per_bin = sample_rate as f32 / 2.0 / intensities.len() as f32;
        let harmonicity = self.compute_harmonicity(intensities, &peaks, f0_bin);

        HarmonicFeatures {
            f0: f0_bin * hz_per_bin,
            harmonicity,
            inharmonicity: 1.0 - harmonicity,
            harmonics: self.collect_harmonics(intensities, f0_bin, hz_per_bin),
        }
    }

    /// Indices of local maxima above the relative threshold
    ///
    /// A bin is a peak when it is strictly greater than its left neighbour
    /// and at least as large as its right neighbour (missing neighbours at
    /// the edges are ignored).
    pub fn find_peaks(&self, intensities: &[f32]) -> Vec<usize> {
        let global_max = intensities.iter().copied().fold(0.0f32, f32::max);
        if global_max <= 0.0 {
            return Vec::new();
        }
        let threshold = self.peak_threshold * global_max;

        (0..intensities.len())
            .filter(|&i| {
                let value = intensities[i];
                if value <= threshold || value <= 0.0 {
                    return false;
                }
                let above_left = i == 0 || value > intensities[i - 1];
                let above_right = i + 1 == intensities.len() || value >= intensities[i + 1];
                above_left && above_right
            })
            .collect()
    }

    fn compute_harmonicity(&self, intensities: &[f32], peaks: &[usize], f0_bin: f32) -> f32 {
        let mut total_energy = 0.0f64;
        let mut aligned_energy = 0.0f64;

        for &bin in peaks {
            let energy = (intensities[bin] as f64).powi(2);
            total_energy += energy;

            let multiple = (bin as f32 / f0_bin).round().max(1.0);
            if (bin as f32 - multiple * f0_bin).abs() <= self.tolerance * f0_bin {
                aligned_energy += energy;
            }
        }

        if total_energy > 0.0 {
            (aligned_energy / total_energy).clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    }

    fn collect_harmonics(&self, intensities: &[f32], f0_bin: f32, hz_per_bin: f32) -> Vec<Harmonic> {
        let last_bin = intensities.len() - 1;
        let half_window = (self.tolerance * f0_bin).max(0.5);
        let mut harmonics = Vec::with_capacity(self.max_harmonics);

        for n in 1..=self.max_harmonics {
            let target = n as f32 * f0_bin;
            if target - half_window > last_bin as f32 {
                break;
            }

            let lo = (target - half_window).ceil().max(0.0) as usize;
            let hi = ((target + half_window).floor() as usize).min(last_bin);
            if lo > hi {
                continue;
            }

            let best = (lo..=hi).max_by(|&a, &b| {
                intensities[a]
                    .partial_cmp(&intensities[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b.cmp(&a))
            });

            if let Some(bin) = best {
                if intensities[bin] > 0.0 {
                    harmonics.push(Harmonic {
                        harmonic_number: n as u32,
                        frequency: bin as f32 * hz_per_bin,
                        magnitude: intensities[bin],
                    });
                }
            }
        }

        harmonics
    }
}
