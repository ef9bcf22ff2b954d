//! Raw PCM conversion
//!
//! Converts 16-bit signed little-endian PCM bytes into normalized `f32`
//! samples ready for the playback sink. Division by 32768 puts every value
//! in `[-1.0, 1.0)`.

use std::fmt;
use std::time::Duration;

use crate::config::audio::{NARRATION_CHANNELS, NARRATION_SAMPLE_RATE};

/// Shape of incoming raw PCM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmSpec {
    /// The fixed shape of narration audio from the speech API (24 kHz mono)
    pub fn narration() -> Self {
        Self {
            sample_rate: NARRATION_SAMPLE_RATE,
            channels: NARRATION_CHANNELS,
        }
    }
}

impl Default for PcmSpec {
    fn default() -> Self {
        Self::narration()
    }
}

/// A decoded clip of normalized samples, interleaved when multi-channel
#[derive(Clone)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    /// Number of whole frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Clip length as wall-clock time
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// True when the clip holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Summarize instead of dumping sample data
        f.debug_struct("AudioClip")
            .field("frames", &self.frames())
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .finish()
    }
}

/// Convert s16le bytes into a normalized clip.
///
/// Frame count is `bytes.len() / (2 * channels)`. A trailing partial frame
/// (odd byte, or an incomplete multi-channel frame) is dropped silently,
/// never an error. Empty input yields an empty clip. A channel count of
/// zero is treated as mono.
pub fn convert(bytes: &[u8], spec: PcmSpec) -> AudioClip {
    let channels = spec.channels.max(1);
    let bytes_per_frame = 2 * channels as usize;
    let usable = (bytes.len() / bytes_per_frame) * bytes_per_frame;

    let mut samples = Vec::with_capacity(usable / 2);
    for pair in bytes[..usable].chunks_exact(2) {
        let raw = i16::from_le_bytes([pair[0], pair[1]]);
        samples.push(raw as f32 / 32768.0);
    }

    AudioClip {
        samples,
        sample_rate: spec.sample_rate,
        channels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serialize i16 samples as little-endian bytes
    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn mono(rate: u32) -> PcmSpec {
        PcmSpec {
            sample_rate: rate,
            channels: 1,
        }
    }

    // --- Normalization ---

    #[test]
    fn minimum_sample_maps_to_negative_one() {
        let clip = convert(&[0x00, 0x80], PcmSpec::narration());
        assert_eq!(clip.samples, vec![-1.0]);
    }

    #[test]
    fn maximum_sample_maps_just_below_one() {
        let clip = convert(&[0xFF, 0x7F], PcmSpec::narration());
        assert_eq!(clip.samples, vec![32767.0 / 32768.0]);
        assert!(clip.samples[0] < 1.0);
    }

    #[test]
    fn zero_bytes_map_to_silence() {
        let clip = convert(&[0x00, 0x00, 0x00, 0x00], PcmSpec::narration());
        assert_eq!(clip.samples, vec![0.0, 0.0]);
    }

    #[test]
    fn unit_sample_maps_to_smallest_step() {
        let clip = convert(&[0x01, 0x00], PcmSpec::narration());
        assert_eq!(clip.samples, vec![1.0 / 32768.0]);
    }

    #[test]
    fn all_outputs_stay_in_range() {
        let bytes = pcm_bytes(&[i16::MIN, -12345, -1, 0, 1, 12345, i16::MAX]);
        let clip = convert(&bytes, PcmSpec::narration());
        for &s in &clip.samples {
            assert!((-1.0..1.0).contains(&s), "sample {} out of range", s);
        }
    }

    // --- Frame accounting ---

    #[test]
    fn empty_input_yields_empty_clip() {
        let clip = convert(&[], PcmSpec::narration());
        assert_eq!(clip.frames(), 0);
        assert!(clip.is_empty());
    }

    #[test]
    fn odd_byte_count_drops_trailing_byte() {
        // 2n + 1 bytes of mono PCM must yield exactly n frames
        for n in [0usize, 1, 3, 100] {
            let bytes = vec![0u8; 2 * n + 1];
            let clip = convert(&bytes, PcmSpec::narration());
            assert_eq!(clip.frames(), n, "2*{}+1 bytes", n);
        }
    }

    #[test]
    fn stereo_partial_frame_is_dropped() {
        // 6 bytes at 2 channels: one whole frame (4 bytes), 2 bytes left over
        let spec = PcmSpec {
            sample_rate: 48_000,
            channels: 2,
        };
        let clip = convert(&[1, 0, 2, 0, 3, 0], spec);
        assert_eq!(clip.frames(), 1);
        assert_eq!(clip.samples.len(), 2);
    }

    #[test]
    fn stereo_keeps_interleaved_order() {
        let spec = PcmSpec {
            sample_rate: 48_000,
            channels: 2,
        };
        let bytes = pcm_bytes(&[100, -100, 200, -200]);
        let clip = convert(&bytes, spec);
        assert_eq!(
            clip.samples,
            vec![
                100.0 / 32768.0,
                -100.0 / 32768.0,
                200.0 / 32768.0,
                -200.0 / 32768.0
            ]
        );
        assert_eq!(clip.frames(), 2);
    }

    #[test]
    fn zero_channels_treated_as_mono() {
        let spec = PcmSpec {
            sample_rate: 24_000,
            channels: 0,
        };
        let clip = convert(&[0x01, 0x00, 0x02, 0x00], spec);
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.frames(), 2);
    }

    // --- Duration ---

    #[test]
    fn one_second_of_narration() {
        let bytes = vec![0u8; 24_000 * 2];
        let clip = convert(&bytes, PcmSpec::narration());
        assert_eq!(clip.frames(), 24_000);
        assert_eq!(clip.duration(), Duration::from_secs(1));
    }

    #[test]
    fn duration_accounts_for_channels() {
        let spec = PcmSpec {
            sample_rate: 1000,
            channels: 2,
        };
        // 4000 bytes = 1000 stereo frames = 1 second
        let clip = convert(&vec![0u8; 4000], spec);
        assert_eq!(clip.duration(), Duration::from_secs(1));
    }

    #[test]
    fn zero_sample_rate_has_zero_duration() {
        let clip = convert(&[0x01, 0x00], mono(0));
        assert_eq!(clip.duration(), Duration::ZERO);
    }

    // --- PcmSpec ---

    #[test]
    fn narration_spec_is_24khz_mono() {
        let spec = PcmSpec::narration();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(PcmSpec::default(), spec);
    }

    // --- Debug formatting ---

    #[test]
    fn clip_debug_summarizes_instead_of_dumping() {
        let clip = convert(&vec![0u8; 2000], PcmSpec::narration());
        let debug = format!("{:?}", clip);
        assert!(debug.contains("frames: 1000"));
        assert!(debug.contains("24000"));
        assert!(!debug.contains("[0.0, 0.0"));
    }
}
