//! WAV decoding into engine sound assets.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use super::AudioError;

/// Decoded PCM audio: interleaved f32 samples in -1..1.
///
/// Cloning is cheap; the sample data is shared, so the same sound can back
/// any number of simultaneously playing sources.
#[derive(Debug, Clone)]
pub struct Sound {
    pub samples: Arc<[f32]>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl Sound {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            channels,
            sample_rate,
        }
    }

    /// Decode a RIFF/WAVE stream. Integer PCM is normalised to f32; float
    /// PCM is taken as-is. Malformed input is an error, not a panic.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        Self::from_wav_reader(hound::WavReader::new(Cursor::new(bytes))?)
    }

    pub fn from_wav_file(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        Self::from_wav_reader(hound::WavReader::open(path)?)
    }

    fn from_wav_reader<R: std::io::Read>(
        mut reader: hound::WavReader<R>,
    ) -> Result<Self, AudioError> {
        let spec = reader.spec();

        let samples: Result<Vec<f32>, hound::Error> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect(),
            hound::SampleFormat::Int => {
                let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / max_value))
                    .collect()
            }
        };

        Ok(Self::new(samples?, spec.channels, spec.sample_rate))
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A WAV file 16-bit, mono, 44100Hz, containing 4 samples: the i16 values
    // 3277, -3277, 6554, -6554, i.e. roughly 0.1, -0.1, 0.2, -0.2.
    const TEST_WAV_BYTES: &[u8] = &[
        82, 73, 70, 70, 44, 0, 0, 0, 87, 65, 86, 69, 102, 109, 116, 32, 16, 0, 0, 0, 1, 0, 1, 0,
        68, 172, 0, 0, 136, 88, 1, 0, 2, 0, 16, 0, 100, 97, 116, 97, 8, 0, 0, 0, 205, 12, 51, 243,
        154, 25, 102, 230,
    ];

    #[test]
    fn decodes_int_pcm() {
        let sound = Sound::from_wav_bytes(TEST_WAV_BYTES).expect("decode should succeed");
        assert_eq!(sound.sample_rate, 44100);
        assert_eq!(sound.channels, 1);
        assert_eq!(sound.frames(), 4);
        // 16-bit int samples normalised into -1..1 against 2^15.
        let expected = [3277.0 / 32768.0, -3277.0 / 32768.0, 6554.0 / 32768.0, -6554.0 / 32768.0];
        for (got, want) in sound.samples.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
        // Which is the intended 0.1, -0.1, 0.2, -0.2 signal to within
        // 16-bit quantisation.
        let intended = [0.1, -0.1, 0.2, -0.2];
        for (got, want) in sound.samples.iter().zip(intended) {
            assert!((got - want).abs() < 1e-3, "got {got}, want {want}");
        }
    }

    #[test]
    fn rejects_malformed_header() {
        let result = Sound::from_wav_bytes(&[0, 1, 2, 3, 4]);
        assert!(matches!(result, Err(AudioError::Wav(_))));
    }

    #[test]
    fn rejects_truncated_riff() {
        // Valid magic, then nothing.
        let result = Sound::from_wav_bytes(b"RIFF\x04\x00\x00\x00WAVE");
        assert!(result.is_err());
    }

    #[test]
    fn reports_duration() {
        let sound = Sound::new(vec![0.0; 44100 * 2], 2, 44100);
        assert_eq!(sound.frames(), 44100);
        assert!((sound.duration_secs() - 1.0).abs() < 1e-6);
    }
}
