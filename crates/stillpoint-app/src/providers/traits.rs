//! Meditation model trait
//!
//! Defines the interface that all generative providers must implement.

use crate::error::Result;

use super::types::GeneratedImage;

/// A generative backend for meditation sessions
///
/// Implementations produce the three artifacts of a session reply: the
/// script text, a scene image, and synthesized narration audio. Each call
/// blocks until the provider responds, so callers run them off the UI
/// thread.
pub trait MeditationModel: Send + Sync {
    /// Display name for the provider (e.g., "Gemini")
    fn name(&self) -> &'static str;

    /// Generate a guided meditation script from the user's stated feeling
    fn generate_script(&self, feeling: &str) -> Result<String>;

    /// Generate a serene scene image to accompany a script
    fn generate_image(&self, script: &str) -> Result<GeneratedImage>;

    /// Synthesize narration for a script.
    ///
    /// Returns the provider's base64-encoded PCM payload (s16le, 24 kHz
    /// mono). Decoding happens on the caller's side so a corrupt payload
    /// is reported through the audio error path, not the network one.
    fn generate_speech(&self, script: &str) -> Result<String>;
}
