//! Stillpoint — Narration Audio Engine
//!
//! Base64 decoding, raw PCM conversion, and clip playback.
//!
//! ## Quick start
//!
//! ```no_run
//! use stillpoint::audio::{convert, decode_base64, AudioEngine, PcmSpec};
//!
//! # fn main() -> Result<(), stillpoint::error::AudioError> {
//! let bytes = decode_base64("AAAAAA==")?;
//! let clip = convert(&bytes, PcmSpec::narration());
//! let engine = AudioEngine::new()?;
//! engine.play(clip);
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
