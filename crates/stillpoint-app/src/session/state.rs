//! Shared session state and commands
//!
//! `SessionCommand` is the command type sent by the frontend.
//! `SessionSnapshot` is the shared state the UI reads each frame.

use std::borrow::Cow;
use std::time::Duration;

use stillpoint::audio::{AudioClip, PlaybackState};

use crate::config::chat::WELCOME_LINE;
use crate::providers::GeneratedImage;

/// Who authored a chat message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// One entry of the chat transcript
#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    /// Short description of the attached scene image, if one was generated
    pub image_note: Option<String>,
    /// Length of the attached narration clip, if one was generated
    pub narration: Option<Duration>,
}

impl ChatMessage {
    /// Create a plain user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            image_note: None,
            narration: None,
        }
    }

    /// Create a plain model message
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            image_note: None,
            narration: None,
        }
    }
}

/// A fully generated meditation reply
///
/// The script is always present; the image and narration clip are dropped
/// individually when their generation calls fail or come back empty.
#[derive(Clone, Debug)]
pub struct Meditation {
    pub script: String,
    pub image: Option<GeneratedImage>,
    pub clip: Option<AudioClip>,
}

/// Commands sent by the frontend
pub enum SessionCommand {
    /// Submit the user's feeling and start generating a reply
    Submit(String),
    /// Toggle narration playback of the latest meditation
    TogglePlayback,
    /// Stop narration playback
    StopPlayback,
    /// Shut down the session loop
    Shutdown,

    // Internal: worker thread results (not sent by frontends)
    InternalScriptDone {
        generation: u64,
        result: Result<String, String>,
    },
    InternalImageDone {
        generation: u64,
        result: Result<GeneratedImage, String>,
    },
    InternalSpeechDone {
        generation: u64,
        result: Result<AudioClip, String>,
    },
}

/// Snapshot of session state — shared between controller and UI
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub messages: Vec<ChatMessage>,
    pub playback: PlaybackState,
    /// True while a reply is being generated (chat input is disabled)
    pub is_generating: bool,
    /// True once a narration clip is available for toggle playback
    pub can_play: bool,
    pub status_text: Cow<'static, str>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::model(WELCOME_LINE)],
            playback: PlaybackState::default(),
            is_generating: false,
            can_play: false,
            status_text: Cow::Borrowed("Ready"),
        }
    }
}
