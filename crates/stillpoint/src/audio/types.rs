//! Shared audio types
//!
//! Pure data types used across the audio subsystem.

use std::fmt;

use super::pcm::AudioClip;

/// Current playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::Playing => write!(f, "Playing"),
        }
    }
}

/// Commands sent to the audio engine
pub enum PlayerCommand {
    /// Start playing the given clip, replacing any current playback
    Play(AudioClip),
    /// Stop playback (no-op when already idle)
    Stop,
    /// Set volume (0.0..=2.0)
    SetVolume(f32),
    /// Shut down the engine thread
    Shutdown,
}

impl fmt::Debug for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerCommand::Play(clip) => f.debug_tuple("Play").field(clip).finish(),
            PlayerCommand::Stop => write!(f, "Stop"),
            PlayerCommand::SetVolume(v) => write!(f, "SetVolume({})", v),
            PlayerCommand::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// State-change events emitted by the audio engine.
///
/// Every transition emits exactly one event; observers track playback by
/// folding these rather than polling the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A clip started playing
    Playing,
    /// Playback ended, by request or because the clip drained
    Idle,
}

impl PlayerEvent {
    /// The state an observer should record after this event
    pub fn state(&self) -> PlaybackState {
        match self {
            PlayerEvent::Playing => PlaybackState::Playing,
            PlayerEvent::Idle => PlaybackState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pcm::{convert, PcmSpec};

    // --- PlaybackState ---

    #[test]
    fn playback_state_default_is_idle() {
        assert_eq!(PlaybackState::default(), PlaybackState::Idle);
    }

    #[test]
    fn playback_state_display() {
        assert_eq!(PlaybackState::Idle.to_string(), "Idle");
        assert_eq!(PlaybackState::Playing.to_string(), "Playing");
    }

    #[test]
    fn playback_state_equality() {
        assert_eq!(PlaybackState::Playing, PlaybackState::Playing);
        assert_ne!(PlaybackState::Playing, PlaybackState::Idle);
    }

    #[test]
    fn playback_state_debug() {
        assert_eq!(format!("{:?}", PlaybackState::Idle), "Idle");
        assert_eq!(format!("{:?}", PlaybackState::Playing), "Playing");
    }

    // --- PlayerCommand ---

    #[test]
    fn command_debug() {
        assert_eq!(format!("{:?}", PlayerCommand::Stop), "Stop");
        assert_eq!(format!("{:?}", PlayerCommand::Shutdown), "Shutdown");
        assert_eq!(
            format!("{:?}", PlayerCommand::SetVolume(0.5)),
            "SetVolume(0.5)"
        );
    }

    #[test]
    fn play_command_debug_summarizes_clip() {
        let clip = convert(&[0u8; 100], PcmSpec::narration());
        let debug = format!("{:?}", PlayerCommand::Play(clip));
        assert!(debug.contains("Play"));
        assert!(debug.contains("frames: 50"));
    }

    // --- PlayerEvent ---

    #[test]
    fn event_maps_to_state() {
        assert_eq!(PlayerEvent::Playing.state(), PlaybackState::Playing);
        assert_eq!(PlayerEvent::Idle.state(), PlaybackState::Idle);
    }

    #[test]
    fn event_equality() {
        assert_eq!(PlayerEvent::Playing, PlayerEvent::Playing);
        assert_ne!(PlayerEvent::Playing, PlayerEvent::Idle);
    }
}
