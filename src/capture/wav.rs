// WAV loading - mono f32 PCM from disk via hound

use std::path::Path;

use crate::error::CaptureError;

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmClip {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Read a WAV file, averaging channels down to mono
///
/// Integer samples are scaled into [-1, 1]; 16, 24 and 32-bit integer and
/// 32-bit float files are supported.
pub fn read_wav(path: &Path) -> Result<PcmClip, CaptureError> {
    let display = path.display().to_string();
    let mut reader = hound::WavReader::open(path).map_err(|err| CaptureError::OpenFailed {
        path: display.clone(),
        reason: err.to_string(),
    })?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(CaptureError::UnsupportedFormat {
            path: display,
            details: "zero channels".to_string(),
        });
    }

    let read_err = |err: hound::Error| CaptureError::ReadFailed {
        path: display.clone(),
        reason: err.to_string(),
    };

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map_err(read_err))
            .collect::<Result<Vec<f32>, _>>()?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32).map_err(read_err))
            .collect::<Result<Vec<f32>, _>>()?,
        (hound::SampleFormat::Int, bits @ (24 | 32)) => {
            let full_scale = ((1i64 << (bits - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale).map_err(read_err))
                .collect::<Result<Vec<f32>, _>>()?
        }
        (hound::SampleFormat::Int, bits) => {
            return Err(CaptureError::UnsupportedFormat {
                path: display,
                details: format!("bits_per_sample={}", bits),
            })
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    log::info!(
        "[Capture] Loaded {} ({} samples @ {} Hz, {} ch)",
        display,
        samples.len(),
        spec.sample_rate,
        spec.channels
    );

    Ok(PcmClip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("emotion_capture_{}_{}.wav", tag, std::process::id()))
    }

    #[test]
    fn test_stereo_16bit_mixdown() {
        let path = temp_wav("stereo");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(i16::MAX).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let clip = read_wav(&path).unwrap();
        assert_eq!(clip.sample_rate, 22_050);
        assert_eq!(clip.samples.len(), 100);
        assert!(clip.samples.iter().all(|&s| (s - 0.5).abs() < 1e-4));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = read_wav(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, CaptureError::OpenFailed { .. }));
    }
}
