// Spectral module - Frequency-domain feature extraction
//
// Every statistic here treats the linear intensity spectrum as a distribution
// over bin indices. Bin-index results are divided by the bin count so they
// land on a 0.0-1.0 scale regardless of FFT size.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::types::SpectralFeatures;

/// Intensities at or below this are treated as silence
pub(crate) const SILENCE_EPSILON: f64 = 1e-10;

/// Spectral statistics computed from one intensity spectrum
pub struct SpectralAnalyzer {
    rolloff_threshold: f32,
}

impl SpectralAnalyzer {
    /// Create a new spectral analyzer
    ///
    /// # Arguments
    /// * `rolloff_threshold` - Cumulative intensity fraction for rolloff (0.85 by default)
    pub fn new(rolloff_threshold: f32) -> Self {
        Self {
            rolloff_threshold: rolloff_threshold.clamp(0.0, 1.0),
        }
    }

    /// Compute every spectral statistic at once
    ///
    /// Zero total intensity yields `SpectralFeatures::default()`. Non-finite
    /// bins carry no weight and every statistic is finite.
    pub fn analyze(&self, intensities: &[f32]) -> SpectralFeatures {
        let total = total_intensity(intensities);
        if total <= SILENCE_EPSILON {
            return SpectralFeatures::default();
        }

        let n = intensities.len() as f64;
        let centroid_bins = self.centroid_bins(intensities, total);
        let spread_bins = self.spread_bins(intensities, total, centroid_bins);

        SpectralFeatures {
            centroid: finite_or_zero((centroid_bins / n) as f32),
            rolloff: finite_or_zero(self.compute_rolloff(intensities)),
            flatness: finite_or_zero(self.compute_flatness(intensities)),
            spread: finite_or_zero((spread_bins / n) as f32),
            slope: finite_or_zero(self.compute_slope(intensities)),
            kurtosis: finite_or_zero(
                self.standardized_moment(intensities, total, centroid_bins, spread_bins, 4)
                    .map(|m| m - 3.0)
                    .unwrap_or(0.0) as f32,
            ),
            skewness: finite_or_zero(
                self.standardized_moment(intensities, total, centroid_bins, spread_bins, 3)
                    .unwrap_or(0.0) as f32,
            ),
        }
    }

    /// Compute spectral rolloff
    ///
    /// Smallest bin index `k` whose cumulative intensity reaches the
    /// threshold fraction of the total, reported as `k / N`. Returns 1.0 if
    /// the threshold is never reached and 0.0 for a silent spectrum.
    pub fn compute_rolloff(&self, intensities: &[f32]) -> f32 {
        let total = total_intensity(intensities);
        if total <= SILENCE_EPSILON {
            return 0.0;
        }

        let threshold = self.rolloff_threshold as f64 * total;
        let mut cumulative = 0.0f64;
        for (i, &value) in intensities.iter().enumerate() {
            cumulative += bin_weight(value);
            if cumulative >= threshold {
                return i as f32 / intensities.len() as f32;
            }
        }

        1.0
    }

    /// Compute spectral flatness (Wiener entropy)
    ///
    /// Formula: flatness = geometric_mean(I) / arithmetic_mean(I)
    ///
    /// Empty bins take part in the geometric mean (floored at a tiny epsilon)
    /// so a single spike reads as tonal (~0.0) while a uniform spectrum
    /// reads as 1.0.
    pub fn compute_flatness(&self, intensities: &[f32]) -> f32 {
        if !intensities.iter().any(|&v| bin_weight(v) > 0.0) {
            return 0.0;
        }

        let n = intensities.len() as f64;
        let log_sum: f64 = intensities
            .iter()
            .map(|&v| bin_weight(v).max(SILENCE_EPSILON).ln())
            .sum();
        let geometric_mean = (log_sum / n).exp();
        let arithmetic_mean = total_intensity(intensities) / n;

        if arithmetic_mean > SILENCE_EPSILON {
            (geometric_mean / arithmetic_mean).clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    }

    /// Least-squares slope of intensity against bin index
    pub fn compute_slope(&self, intensities: &[f32]) -> f32 {
        let n = intensities.len() as f64;
        if intensities.len() < 2 {
            return 0.0;
        }

        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for (i, &value) in intensities.iter().enumerate() {
            let x = i as f64;
            let y = bin_weight(value);
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_xx += x * x;
        }

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() <= f64::EPSILON {
            return 0.0;
        }
        ((n * sum_xy - sum_x * sum_y) / denominator) as f32
    }

    fn centroid_bins(&self, intensities: &[f32], total: f64) -> f64 {
        let weighted: f64 = intensities
            .iter()
            .enumerate()
            .map(|(i, &v)| i as f64 * bin_weight(v))
            .sum();
        weighted / total
    }

    fn spread_bins(&self, intensities: &[f32], total: f64, centroid: f64) -> f64 {
        let variance: f64 = intensities
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let d = i as f64 - centroid;
                d * d * bin_weight(v)
            })
            .sum::<f64>()
            / total;
        variance.sqrt()
    }

    /// `order`-th central moment divided by spread^order, None if spread is 0
    fn standardized_moment(
        &self,
        intensities: &[f32],
        total: f64,
        centroid: f64,
        spread: f64,
        order: i32,
    ) -> Option<f64> {
        if spread <= SILENCE_EPSILON {
            return None;
        }
        let moment: f64 = intensities
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64 - centroid).powi(order) * bin_weight(v))
            .sum::<f64>()
            / total;
        Some(moment / spread.powi(order))
    }
}

/// Shannon entropy (base 2) of the intensity distribution
///
/// The spectrum is normalized to sum to 1; empty bins contribute nothing.
pub fn compute_entropy(intensities: &[f32]) -> f32 {
    let total = total_intensity(intensities);
    if total <= SILENCE_EPSILON {
        return 0.0;
    }
    let entropy: f64 = intensities
        .iter()
        .map(|&v| bin_weight(v))
        .filter(|&v| v > 0.0)
        .map(|v| {
            let p = v / total;
            -p * p.log2()
        })
        .sum();
    entropy.max(0.0) as f32
}

pub(crate) fn total_intensity(intensities: &[f32]) -> f64 {
    intensities.iter().map(|&v| bin_weight(v)).sum()
}

/// Weight of one bin: negative and non-finite intensities count as empty
fn bin_weight(v: f32) -> f64 {
    if v.is_finite() && v > 0.0 {
        v as f64
    } else {
        0.0
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(len: usize, k: usize) -> Vec<f32> {
        let mut spectrum = vec![0.0; len];
        spectrum[k] = 1.0;
        spectrum
    }

    #[test]
    fn test_rolloff_of_single_spike() {
        let analyzer = SpectralAnalyzer::new(0.85);
        let rolloff = analyzer.compute_rolloff(&spike(256, 64));
        assert!((rolloff - 64.0 / 256.0).abs() < 1e-6, "got {}", rolloff);
    }

    #[test]
    fn test_flatness_uniform_vs_spike() {
        let analyzer = SpectralAnalyzer::new(0.85);
        let flat = analyzer.compute_flatness(&vec![0.4; 128]);
        assert!((flat - 1.0).abs() < 1e-4, "uniform flatness {}", flat);

        let tonal = analyzer.compute_flatness(&spike(128, 10));
        assert!(tonal < 0.01, "spike flatness {}", tonal);
    }

    #[test]
    fn test_centroid_and_spread_of_spike() {
        let analyzer = SpectralAnalyzer::new(0.85);
        let features = analyzer.analyze(&spike(100, 25));
        assert!((features.centroid - 0.25).abs() < 1e-6);
        assert_eq!(features.spread, 0.0);
        assert_eq!(features.kurtosis, 0.0);
        assert_eq!(features.skewness, 0.0);
    }

    #[test]
    fn test_slope_sign() {
        let analyzer = SpectralAnalyzer::new(0.85);
        let rising: Vec<f32> = (0..32).map(|i| i as f32 / 32.0).collect();
        let falling: Vec<f32> = rising.iter().rev().copied().collect();
        assert!((analyzer.compute_slope(&rising) - 1.0 / 32.0).abs() < 1e-5);
        assert!(analyzer.compute_slope(&falling) < 0.0);
    }

    #[test]
    fn test_symmetric_distribution_has_no_skew() {
        let analyzer = SpectralAnalyzer::new(0.85);
        let mut spectrum = vec![0.0; 64];
        spectrum[30] = 0.5;
        spectrum[32] = 1.0;
        spectrum[34] = 0.5;
        let features = analyzer.analyze(&spectrum);
        assert!(features.skewness.abs() < 1e-5);
        // Two-point-heavy distribution is platykurtic
        assert!(features.kurtosis < 0.0);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(compute_entropy(&spike(16, 3)), 0.0);
        let uniform = compute_entropy(&vec![1.0; 16]);
        assert!((uniform - 4.0).abs() < 1e-5);
        assert_eq!(compute_entropy(&[0.0; 8]), 0.0);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let analyzer = SpectralAnalyzer::new(0.85);
        assert_eq!(analyzer.analyze(&[0.0; 32]), SpectralFeatures::default());
        assert_eq!(analyzer.analyze(&[]), SpectralFeatures::default());
    }

    #[test]
    fn test_non_finite_bins_carry_no_weight() {
        let analyzer = SpectralAnalyzer::new(0.85);
        let mut spectrum = spike(64, 16);
        spectrum[40] = f32::INFINITY;
        spectrum[50] = f32::NAN;
        let features = analyzer.analyze(&spectrum);
        assert_eq!(features, analyzer.analyze(&spike(64, 16)));

        let huge = vec![f32::MAX; 64];
        let features = analyzer.analyze(&huge);
        for value in [
            features.centroid,
            features.rolloff,
            features.flatness,
            features.spread,
            features.slope,
            features.kurtosis,
            features.skewness,
        ] {
            assert!(value.is_finite(), "{:?}", features);
        }
        assert!(compute_entropy(&spectrum).is_finite());
    }
}
