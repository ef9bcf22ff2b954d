//! Playback engine
//!
//! Runs narration playback on a dedicated thread, accepting commands via
//! crossbeam channels and emitting state-change events back. The output
//! device is opened once when the engine starts and reused for every clip.

use std::num::NonZero;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rodio::buffer::SamplesBuffer;
use rodio::{DeviceSinkBuilder, Player};

use crate::config::audio::{COMMAND_QUEUE_SIZE, ENGINE_TICK_MS, EVENT_QUEUE_SIZE, MAX_VOLUME};
use crate::error::AudioError;

use super::pcm::AudioClip;
use super::types::{PlaybackState, PlayerCommand, PlayerEvent};

/// Audio engine that manages narration playback on a dedicated thread.
///
/// Construct one per process and pass it (or its commands) by reference;
/// the engine owns the only output stream.
pub struct AudioEngine {
    cmd_tx: Sender<PlayerCommand>,
    event_rx: Receiver<PlayerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl AudioEngine {
    /// Create a new audio engine, spawning the engine thread.
    ///
    /// Blocks until the audio output stream is initialized (or fails).
    pub fn new() -> Result<Self, AudioError> {
        let (cmd_tx, cmd_rx) = bounded::<PlayerCommand>(COMMAND_QUEUE_SIZE);
        let (event_tx, event_rx) = bounded::<PlayerEvent>(EVENT_QUEUE_SIZE);
        let (init_tx, init_rx) = bounded::<Result<(), String>>(1);

        let thread = thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                Self::run(cmd_rx, event_tx, init_tx);
            })
            .map_err(|e| AudioError::Output(format!("Failed to spawn audio thread: {}", e)))?;

        // Wait for initialization
        let init_result = init_rx
            .recv()
            .map_err(|_| AudioError::Output("Audio thread terminated during init".to_string()))?;

        init_result.map_err(AudioError::Output)?;

        Ok(Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    /// Send a command to the engine
    pub fn send(&self, cmd: PlayerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    /// Start playing the given clip, replacing any current playback.
    ///
    /// An empty clip stops whatever is playing and leaves the engine idle.
    pub fn play(&self, clip: AudioClip) {
        self.send(PlayerCommand::Play(clip));
    }

    /// Stop playback. Idempotent: stopping an idle engine does nothing and
    /// emits no event.
    pub fn stop(&self) {
        self.send(PlayerCommand::Stop);
    }

    /// Set volume (clamped to 0.0..=2.0)
    pub fn set_volume(&self, volume: f32) {
        self.send(PlayerCommand::SetVolume(volume));
    }

    /// Non-blocking poll for the next event
    pub fn try_recv_event(&self) -> Option<PlayerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Get a reference to the event receiver for use with `select!`
    pub fn event_receiver(&self) -> &Receiver<PlayerEvent> {
        &self.event_rx
    }

    /// Graceful shutdown (consumes self)
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// The engine's main loop, running on the dedicated thread
    fn run(
        cmd_rx: Receiver<PlayerCommand>,
        event_tx: Sender<PlayerEvent>,
        init_tx: Sender<Result<(), String>>,
    ) {
        // Create audio output on this thread (cpal streams may be !Send)
        let mut stream = match DeviceSinkBuilder::open_default_sink() {
            Ok(s) => s,
            Err(e) => {
                let _ = init_tx.send(Err(format!("Failed to open audio output: {}", e)));
                return;
            }
        };
        stream.log_on_drop(false);

        // `stream` must be declared before `sink` so Rust drops sink first
        let sink = Player::connect_new(stream.mixer());

        let _ = init_tx.send(Ok(()));

        let mut state = PlaybackState::Idle;
        let mut current_volume: f32 = 1.0;

        loop {
            match cmd_rx.recv_timeout(Duration::from_millis(ENGINE_TICK_MS)) {
                Ok(cmd) => match cmd {
                    PlayerCommand::Play(clip) => {
                        sink.stop();
                        match clip_source(&clip) {
                            Some(source) => {
                                sink.append(source);
                                sink.set_volume(current_volume);
                                sink.play();
                                state = PlaybackState::Playing;
                                let _ = event_tx.send(PlayerEvent::Playing);
                            }
                            None => {
                                // Nothing to play; fall back to idle
                                if state != PlaybackState::Idle {
                                    state = PlaybackState::Idle;
                                    let _ = event_tx.send(PlayerEvent::Idle);
                                }
                            }
                        }
                    }
                    PlayerCommand::Stop => {
                        sink.stop();
                        if state != PlaybackState::Idle {
                            state = PlaybackState::Idle;
                            let _ = event_tx.send(PlayerEvent::Idle);
                        }
                    }
                    PlayerCommand::SetVolume(vol) => {
                        current_volume = vol.clamp(0.0, MAX_VOLUME);
                        sink.set_volume(current_volume);
                    }
                    PlayerCommand::Shutdown => {
                        sink.stop();
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Natural completion: the sink drained the clip
                    if state == PlaybackState::Playing && sink.empty() {
                        state = PlaybackState::Idle;
                        let _ = event_tx.send(PlayerEvent::Idle);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

/// Build a rodio source from a clip, or `None` when there is nothing to play
fn clip_source(clip: &AudioClip) -> Option<SamplesBuffer> {
    if clip.is_empty() {
        return None;
    }
    let channels = NonZero::new(clip.channels)?;
    let sample_rate = NonZero::new(clip.sample_rate)?;
    Some(SamplesBuffer::new(
        channels,
        sample_rate,
        clip.samples.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pcm::{convert, PcmSpec};

    /// Build a clip of `frames` sine samples at the narration rate
    fn make_clip(frames: usize) -> AudioClip {
        let samples: Vec<i16> = (0..frames)
            .map(|i| ((i as f32 * 0.1).sin() * 10000.0) as i16)
            .collect();
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        convert(&bytes, PcmSpec::narration())
    }

    /// Roughly two seconds of audio, long enough to still be playing
    /// whenever a test gets around to stopping it
    fn make_long_clip() -> AudioClip {
        make_clip(48_000)
    }

    /// A few milliseconds of audio, drains almost immediately
    fn make_short_clip() -> AudioClip {
        make_clip(100)
    }

    /// Helper: wait for the next event within a timeout
    fn wait_for_event(engine: &AudioEngine, timeout_ms: u64) -> Option<PlayerEvent> {
        let deadline = std::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Some(evt) = engine.try_recv_event() {
                return Some(evt);
            }
            if std::time::Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(25));
        }
    }

    /// Helper: try to create an engine; return None if audio hardware is unavailable
    fn try_engine() -> Option<AudioEngine> {
        AudioEngine::new().ok()
    }

    // --- Lifecycle ---

    #[test]
    fn create_and_shutdown() {
        let Some(engine) = try_engine() else { return };
        engine.shutdown();
    }

    #[test]
    fn drop_triggers_shutdown() {
        let Some(engine) = try_engine() else { return };
        drop(engine);
        // If we get here without hanging, shutdown worked
    }

    #[test]
    fn create_multiple_engines_sequentially() {
        for _ in 0..3 {
            let Some(engine) = try_engine() else { return };
            engine.shutdown();
        }
    }

    // --- Play / Stop ---

    #[test]
    fn play_emits_playing_event() {
        let Some(engine) = try_engine() else { return };

        engine.play(make_long_clip());

        match wait_for_event(&engine, 2000) {
            Some(PlayerEvent::Playing) => {}
            other => panic!("Expected Playing event, got {:?}", other),
        }

        engine.shutdown();
    }

    #[test]
    fn stop_during_playback_emits_idle() {
        let Some(engine) = try_engine() else { return };

        engine.play(make_long_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));

        engine.stop();

        match wait_for_event(&engine, 2000) {
            Some(PlayerEvent::Idle) => {}
            other => panic!("Expected Idle event, got {:?}", other),
        }

        engine.shutdown();
    }

    #[test]
    fn stop_when_idle_emits_nothing() {
        let Some(engine) = try_engine() else { return };

        engine.stop();
        assert_eq!(wait_for_event(&engine, 600), None);

        engine.shutdown();
    }

    #[test]
    fn repeated_stop_emits_idle_once() {
        let Some(engine) = try_engine() else { return };

        engine.play(make_long_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));

        engine.stop();
        engine.stop();
        engine.stop();

        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Idle)
        ));
        // The extra stops were no-ops
        assert_eq!(wait_for_event(&engine, 600), None);

        engine.shutdown();
    }

    #[test]
    fn play_replaces_current_clip() {
        let Some(engine) = try_engine() else { return };

        engine.play(make_long_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));

        // Replacement emits Playing again without an intermediate Idle
        engine.play(make_long_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));

        engine.stop();
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Idle)
        ));

        engine.shutdown();
    }

    #[test]
    fn empty_clip_is_a_noop_when_idle() {
        let Some(engine) = try_engine() else { return };

        engine.play(convert(&[], PcmSpec::narration()));
        assert_eq!(wait_for_event(&engine, 600), None);

        engine.shutdown();
    }

    #[test]
    fn empty_clip_stops_current_playback() {
        let Some(engine) = try_engine() else { return };

        engine.play(make_long_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));

        engine.play(convert(&[], PcmSpec::narration()));
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Idle)
        ));

        engine.shutdown();
    }

    // --- Natural completion ---

    #[test]
    fn short_clip_completes_to_idle() {
        let Some(engine) = try_engine() else { return };

        engine.play(make_short_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));

        // The clip is a few ms long; the next tick should notice the drain
        match wait_for_event(&engine, 3000) {
            Some(PlayerEvent::Idle) => {}
            other => panic!("Expected natural-completion Idle, got {:?}", other),
        }

        engine.shutdown();
    }

    #[test]
    fn completion_then_stop_emits_nothing_more() {
        let Some(engine) = try_engine() else { return };

        engine.play(make_short_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));
        assert!(matches!(
            wait_for_event(&engine, 3000),
            Some(PlayerEvent::Idle)
        ));

        engine.stop();
        assert_eq!(wait_for_event(&engine, 600), None);

        engine.shutdown();
    }

    // --- Volume ---

    #[test]
    fn set_volume_does_not_disturb_state() {
        let Some(engine) = try_engine() else { return };

        engine.set_volume(0.4);
        engine.set_volume(-1.0);
        engine.set_volume(99.0);
        assert_eq!(wait_for_event(&engine, 600), None);

        engine.play(make_long_clip());
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Playing)
        ));
        engine.set_volume(1.0);
        engine.stop();
        assert!(matches!(
            wait_for_event(&engine, 2000),
            Some(PlayerEvent::Idle)
        ));

        engine.shutdown();
    }

    // --- clip_source ---

    #[test]
    fn clip_source_rejects_empty_clip() {
        let clip = convert(&[], PcmSpec::narration());
        assert!(clip_source(&clip).is_none());
    }

    #[test]
    fn clip_source_rejects_zero_sample_rate() {
        let clip = AudioClip {
            samples: vec![0.0; 10],
            sample_rate: 0,
            channels: 1,
        };
        assert!(clip_source(&clip).is_none());
    }

    #[test]
    fn clip_source_accepts_narration_clip() {
        let clip = make_short_clip();
        assert!(clip_source(&clip).is_some());
    }
}
