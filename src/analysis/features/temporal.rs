// Temporal module - Time-domain feature extraction
//
// Operates on byte samples already normalized to [-1, 1] around the 128
// midline (see `AudioFrame::normalized_samples`).

/// Root mean square amplitude
pub fn compute_rms(samples: &[f32]) -> f32 {
    compute_energy(samples).sqrt()
}

/// Mean square amplitude
pub fn compute_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64) as f32
}

/// Compute zero-crossing rate (ZCR)
///
/// Fraction of adjacent sample pairs whose sign differs. Samples exactly on
/// the midline count as positive, matching the byte convention where 128 is
/// the first non-negative value.
///
/// # Returns
/// Zero-crossing rate (0.0 to 1.0)
pub fn compute_zcr(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }

    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();

    crossings as f32 / (samples.len() - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_square_wave() {
        let samples: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert!((compute_rms(&samples) - 0.5).abs() < 1e-6);
        assert!((compute_energy(&samples) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_zcr_alternating_and_constant() {
        let alternating: Vec<f32> = (0..11).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!((compute_zcr(&alternating) - 1.0).abs() < 1e-6);

        let constant = vec![0.25; 50];
        assert_eq!(compute_zcr(&constant), 0.0);
    }

    #[test]
    fn test_empty_signal() {
        assert_eq!(compute_rms(&[]), 0.0);
        assert_eq!(compute_energy(&[]), 0.0);
        assert_eq!(compute_zcr(&[0.3]), 0.0);
    }
}
