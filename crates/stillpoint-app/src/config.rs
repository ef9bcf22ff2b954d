//! Configuration constants for stillpoint app services

/// Application metadata
pub mod app {
    /// Application name (used for config directory, etc.)
    pub const NAME: &str = "stillpoint";
}

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Stillpoint/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds. Speech synthesis of a full script can take
    /// well over a minute, so this is generous.
    pub const READ_TIMEOUT_SECS: u64 = 120;
}

/// Gemini provider configuration
pub mod gemini {
    /// Base URL for the Generative Language API
    pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Model used for meditation scripts and image prompts
    pub const TEXT_MODEL: &str = "gemini-2.5-flash";

    /// Model used for scene image generation
    pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

    /// Model used for speech synthesis
    pub const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

    /// Default prebuilt narration voice
    pub const DEFAULT_VOICE: &str = "Kore";

    /// Environment variable consulted when no API key flag is given
    pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
}

/// Prompt text sent alongside user input
pub mod prompts {
    /// System instruction for the meditation script call
    pub const SCRIPT_SYSTEM: &str = "You are a gentle meditation guide. The user will tell you \
how they are feeling. Respond with a short guided meditation script of 120 to 180 words, \
written in the second person, that acknowledges their feeling and leads them toward calm. \
Use plain flowing prose with no headings, lists, or stage directions.";

    /// System instruction for the image prompt call
    pub const IMAGE_PROMPT_SYSTEM: &str = "Summarize the mood of the following meditation \
script as a single-sentence description of a serene natural scene, suitable as an image \
generation prompt. Respond with only that sentence.";

    /// Style prefix prepended to the script for speech synthesis
    pub const SPEECH_STYLE: &str = "Read the following meditation script slowly and softly, \
with long pauses between sentences: ";
}

/// Chat transcript text
pub mod chat {
    /// First model message shown before any user input
    pub const WELCOME_LINE: &str =
        "Welcome. Tell me how you are feeling, and we will take a moment together.";

    /// Model message shown when a reply could not be generated
    pub const GENERIC_ERROR_LINE: &str = "Sorry, I encountered an error. Please try again.";
}
