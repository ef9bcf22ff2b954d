//! Configuration constants for the stillpoint engine

/// Audio-related configuration
pub mod audio {
    /// Sample rate of narration PCM delivered by the speech API (Hz)
    pub const NARRATION_SAMPLE_RATE: u32 = 24_000;

    /// Channel count of narration PCM (mono)
    pub const NARRATION_CHANNELS: u16 = 1;

    /// Engine loop tick while waiting for commands (milliseconds).
    /// Also bounds how quickly natural clip completion is noticed.
    pub const ENGINE_TICK_MS: u64 = 250;

    /// Command channel capacity
    pub const COMMAND_QUEUE_SIZE: usize = 16;

    /// Event channel capacity
    pub const EVENT_QUEUE_SIZE: usize = 64;

    /// Volume range accepted by the engine
    pub const MAX_VOLUME: f32 = 2.0;
}
