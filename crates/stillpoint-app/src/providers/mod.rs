//! Generative model providers
//!
//! Backends that produce meditation scripts, scene images, and narration
//! audio. The session controller works against the `MeditationModel` trait,
//! so providers are constructed once at startup and passed in explicitly.

pub mod gemini;
pub mod traits;
pub mod types;

// Re-exports
pub use gemini::GeminiProvider;
pub use traits::MeditationModel;
pub use types::GeneratedImage;
