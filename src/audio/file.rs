//! WAV file decoding for file-mode transcription.

use crate::config::SessionConfig;
use crate::error::{Result, VoxlistError};
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Decodes a WAV file into a single in-memory PCM buffer matching the
/// session's sample rate and channel layout.
///
/// Float and non-16-bit integer sources are converted to 16-bit signed.
/// Stereo input is downmixed when the session is mono. A sample rate
/// mismatch is logged and resolved by linear-interpolation resampling.
pub fn decode_wav(path: &Path, config: &SessionConfig) -> Result<Vec<i16>> {
    let file = std::fs::File::open(path).map_err(|e| VoxlistError::AudioFile {
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;
    decode_wav_reader(Box::new(file), config)
}

/// Decodes WAV data from any reader (for testing/flexibility).
pub fn decode_wav_reader(reader: Box<dyn Read + Send>, config: &SessionConfig) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| VoxlistError::AudioFile {
        message: format!("Failed to parse WAV data: {}", e),
    })?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels;

    let raw_samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VoxlistError::AudioFile {
                message: format!("Failed to read WAV samples: {}", e),
            })?,
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VoxlistError::AudioFile {
                message: format!("Failed to read WAV samples: {}", e),
            })?,
    };

    // Downmix to the session's channel layout
    let samples = if source_channels == config.channels {
        raw_samples
    } else if config.channels == 1 && source_channels > 1 {
        let n = source_channels as usize;
        raw_samples
            .chunks_exact(n)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / n as i32) as i16
            })
            .collect()
    } else {
        return Err(VoxlistError::AudioFile {
            message: format!(
                "Cannot map {} input channels to {} session channels",
                source_channels, config.channels
            ),
        });
    };

    // Resample on rate mismatch
    if source_rate != config.sample_rate {
        warn!(
            source_rate,
            session_rate = config.sample_rate,
            "WAV sample rate differs from session rate, resampling"
        );
        Ok(resample(&samples, source_rate, config.sample_rate))
    } else {
        Ok(samples)
    }
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn mono_config() -> SessionConfig {
        SessionConfig::default()
    }

    #[test]
    fn decode_16khz_mono_matches_exactly() {
        let input_samples = vec![100i16, 200, 300, 400, 500];
        let wav_data = make_wav_data(16000, 1, &input_samples);

        let samples =
            decode_wav_reader(Box::new(Cursor::new(wav_data)), &mono_config()).unwrap();

        assert_eq!(samples, input_samples);
    }

    #[test]
    fn decode_stereo_downmixes_to_mono() {
        // Stereo pairs: (100, 200), (300, 400), (500, 600)
        let stereo_samples = vec![100i16, 200, 300, 400, 500, 600];
        let wav_data = make_wav_data(16000, 2, &stereo_samples);

        let samples =
            decode_wav_reader(Box::new(Cursor::new(wav_data)), &mono_config()).unwrap();

        assert_eq!(samples, vec![150i16, 350, 550]);
    }

    #[test]
    fn decode_48khz_resamples_to_16khz() {
        let input_samples = vec![1000i16; 48000]; // 1 second at 48kHz
        let wav_data = make_wav_data(48000, 1, &input_samples);

        let samples =
            decode_wav_reader(Box::new(Cursor::new(wav_data)), &mono_config()).unwrap();

        assert!(samples.len() >= 15900 && samples.len() <= 16100);
        // Constant signal survives interpolation
        assert!(samples.iter().all(|&s| (s - 1000).abs() <= 1));
    }

    #[test]
    fn decode_mono_into_stereo_session_is_rejected() {
        let wav_data = make_wav_data(16000, 1, &[1i16, 2, 3]);
        let mut config = mono_config();
        config.channels = 2;

        let result = decode_wav_reader(Box::new(Cursor::new(wav_data)), &config);
        assert!(matches!(result, Err(VoxlistError::AudioFile { .. })));
    }

    #[test]
    fn decode_garbage_is_an_audio_file_error() {
        let result = decode_wav_reader(
            Box::new(Cursor::new(b"not a wav file".to_vec())),
            &mono_config(),
        );
        assert!(matches!(result, Err(VoxlistError::AudioFile { .. })));
    }

    #[test]
    fn decode_missing_file_is_an_audio_file_error() {
        let result = decode_wav(
            Path::new("/tmp/voxlist_missing_98765.wav"),
            &mono_config(),
        );
        assert!(matches!(result, Err(VoxlistError::AudioFile { .. })));
    }

    #[test]
    fn resample_identity_when_rates_match() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn resample_halves_sample_count() {
        let samples: Vec<i16> = (0..1000).collect();
        let out = resample(&samples, 32000, 16000);
        assert_eq!(out.len(), 500);
    }
}
