//! Audio subsystem
//!
//! Handles narration decoding, PCM conversion, and playback.
//!

pub mod decode;
pub mod engine;
pub mod pcm;
pub mod types;

pub use decode::decode_base64;
pub use engine::AudioEngine;
pub use pcm::{convert, AudioClip, PcmSpec};
pub use types::{PlaybackState, PlayerCommand, PlayerEvent};
