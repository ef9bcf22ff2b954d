//! Session controller
//!
//! Owns the provider, the audio engine, and the shared state, and processes
//! commands from the frontend through a single crossbeam channel.
//!
//! A reply is generated in two stages: the script call runs first, and once
//! it succeeds the image and speech calls run in parallel, both derived from
//! the script text. The reply is posted to the transcript only after both
//! attachments settle, so a failed speech call can still replace the whole
//! reply with the generic failure line.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use stillpoint::audio::{
    convert, decode_base64, AudioClip, AudioEngine, PcmSpec, PlaybackState, PlayerEvent,
};

use crate::config::chat::GENERIC_ERROR_LINE;
use crate::providers::{GeneratedImage, MeditationModel};

use super::state::{ChatMessage, Meditation, SessionCommand, SessionSnapshot};

/// Accumulates worker results for the reply currently being generated
struct PendingReply {
    script: String,
    image: Option<GeneratedImage>,
    image_done: bool,
    clip: Option<AudioClip>,
    speech_done: bool,
    speech_failed: bool,
}

impl PendingReply {
    fn new(script: String) -> Self {
        Self {
            script,
            image: None,
            image_done: false,
            clip: None,
            speech_done: false,
            speech_failed: false,
        }
    }

    fn is_settled(&self) -> bool {
        self.image_done && self.speech_done
    }
}

/// Decode a provider speech payload into a playable narration clip
fn decode_narration(payload: &str) -> Result<AudioClip, String> {
    let bytes = decode_base64(payload).map_err(|e| e.to_string())?;
    Ok(convert(&bytes, PcmSpec::narration()))
}

pub struct SessionController {
    cmd_rx: Receiver<SessionCommand>,
    cmd_tx: Sender<SessionCommand>,
    shared_state: Arc<Mutex<SessionSnapshot>>,
    provider: Arc<dyn MeditationModel>,
    /// Audio output, or None when running without a sound device
    engine: Option<AudioEngine>,
    /// Monotonically increasing counter to discard stale worker results
    request_generation: u64,
    /// Partial results for the reply currently being generated
    pending: Option<PendingReply>,
    /// Most recent fully generated meditation (backs toggle playback)
    latest: Option<Meditation>,
    /// Reusable buffer for collecting engine events (avoids allocation per poll)
    event_buf: Vec<PlayerEvent>,
}

impl SessionController {
    pub fn new(
        cmd_rx: Receiver<SessionCommand>,
        cmd_tx: Sender<SessionCommand>,
        shared_state: Arc<Mutex<SessionSnapshot>>,
        provider: Arc<dyn MeditationModel>,
        engine: Option<AudioEngine>,
    ) -> Self {
        Self {
            cmd_rx,
            cmd_tx,
            shared_state,
            provider,
            engine,
            request_generation: 0,
            pending: None,
            latest: None,
            event_buf: Vec::new(),
        }
    }

    /// Run the controller event loop (blocking, call from a dedicated thread)
    pub fn run(&mut self) {
        loop {
            // Process commands (blocking with timeout so we can poll engine events)
            match self.cmd_rx.recv_timeout(Duration::from_millis(50)) {
                Ok(cmd) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }

            // Poll engine events
            self.poll_engine_events();
        }

        // Shutdown engine
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
    }

    /// Handle a single command. Returns true if the loop should exit.
    fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Shutdown => return true,

            SessionCommand::Submit(feeling) => {
                self.start_generation(feeling);
            }
            SessionCommand::TogglePlayback => {
                self.toggle_playback();
            }
            SessionCommand::StopPlayback => {
                self.stop_playback();
            }
            SessionCommand::InternalScriptDone { generation, result } => {
                self.handle_script_done(generation, result);
            }
            SessionCommand::InternalImageDone { generation, result } => {
                self.handle_image_done(generation, result);
            }
            SessionCommand::InternalSpeechDone { generation, result } => {
                self.handle_speech_done(generation, result);
            }
        }
        false
    }

    /// Push the user's message and generate a reply on worker threads.
    ///
    /// Each submit increments `request_generation`; stale results from
    /// earlier submits are discarded in the `handle_*_done` methods.
    fn start_generation(&mut self, feeling: String) {
        let feeling = feeling.trim().to_string();
        if feeling.is_empty() {
            return;
        }

        {
            let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
            if state.is_generating {
                // Input is disabled while generating; drop anything that
                // slips through anyway.
                return;
            }
            state.messages.push(ChatMessage::user(feeling.clone()));
            state.is_generating = true;
            state.status_text = "Generating...".into();
        }

        self.request_generation += 1;
        let generation = self.request_generation;
        self.pending = None;

        let provider = Arc::clone(&self.provider);
        let cmd_tx = self.cmd_tx.clone();

        std::thread::Builder::new()
            .name("session-generate".into())
            .spawn(move || {
                // Stage one: the script. Image and speech both derive from it,
                // so nothing else starts until this call finishes.
                let script = match provider.generate_script(&feeling) {
                    Ok(s) => s,
                    Err(e) => {
                        let _ = cmd_tx.send(SessionCommand::InternalScriptDone {
                            generation,
                            result: Err(e.to_string()),
                        });
                        return;
                    }
                };
                let _ = cmd_tx.send(SessionCommand::InternalScriptDone {
                    generation,
                    result: Ok(script.clone()),
                });

                // Stage two: image on its own thread, speech on this one,
                // running in parallel.
                let image_provider = Arc::clone(&provider);
                let image_tx = cmd_tx.clone();
                let image_script = script.clone();
                std::thread::Builder::new()
                    .name("session-image".into())
                    .spawn(move || {
                        let result = image_provider
                            .generate_image(&image_script)
                            .map_err(|e| e.to_string());
                        let _ =
                            image_tx.send(SessionCommand::InternalImageDone { generation, result });
                    })
                    .expect("Failed to spawn session-image thread");

                let result = provider
                    .generate_speech(&script)
                    .map_err(|e| e.to_string())
                    .and_then(|payload| decode_narration(&payload));
                let _ = cmd_tx.send(SessionCommand::InternalSpeechDone { generation, result });
            })
            .expect("Failed to spawn session-generate thread");
    }

    /// Handle the script result — hold it for settling, or fail the reply.
    ///
    /// Results with a stale `generation` are silently discarded.
    fn handle_script_done(&mut self, generation: u64, result: Result<String, String>) {
        if generation != self.request_generation {
            // A newer submit was issued while this call was in flight — discard.
            return;
        }

        match result {
            Ok(script) => {
                self.pending = Some(PendingReply::new(script));
                let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
                state.status_text = "Generating image and audio...".into();
            }
            Err(e) => {
                eprintln!("Script generation failed: {e}");
                self.finish_with_failure();
            }
        }
    }

    /// Handle the image result. A failed or empty image only drops the
    /// scene attachment; the reply itself still goes out.
    fn handle_image_done(&mut self, generation: u64, result: Result<GeneratedImage, String>) {
        if generation != self.request_generation {
            return;
        }
        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        match result {
            Ok(image) if !image.is_empty() => pending.image = Some(image),
            Ok(_) => {}
            Err(e) => {
                eprintln!("Image generation failed: {e}");
            }
        }
        pending.image_done = true;
        self.try_settle();
    }

    /// Handle the speech result. A failed call fails the whole reply; an
    /// empty clip only drops the narration attachment.
    fn handle_speech_done(&mut self, generation: u64, result: Result<AudioClip, String>) {
        if generation != self.request_generation {
            return;
        }
        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        match result {
            Ok(clip) if !clip.is_empty() => pending.clip = Some(clip),
            Ok(_) => {}
            Err(e) => {
                eprintln!("Speech generation failed: {e}");
                pending.speech_failed = true;
            }
        }
        pending.speech_done = true;
        self.try_settle();
    }

    /// Post the reply once both attachments have settled
    fn try_settle(&mut self) {
        if !self.pending.as_ref().is_some_and(PendingReply::is_settled) {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        if pending.speech_failed {
            self.finish_with_failure();
            return;
        }

        let meditation = Meditation {
            script: pending.script,
            image: pending.image,
            clip: pending.clip,
        };

        let mut message = ChatMessage::model(meditation.script.clone());
        message.image_note = meditation.image.as_ref().map(GeneratedImage::summary);
        message.narration = meditation.clip.as_ref().map(AudioClip::duration);

        let has_clip = meditation.clip.is_some();
        self.latest = Some(meditation);

        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        state.messages.push(message);
        state.is_generating = false;
        if has_clip {
            state.can_play = true;
        }
        state.status_text = "Ready".into();
    }

    /// Replace the in-flight reply with the generic failure line
    fn finish_with_failure(&mut self) {
        self.pending = None;
        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        state.messages.push(ChatMessage::model(GENERIC_ERROR_LINE));
        state.is_generating = false;
        state.status_text = "Ready".into();
    }

    /// Toggle narration playback of the latest meditation.
    ///
    /// Playback always restarts the clip from the beginning. A toggle with
    /// no clip available is a no-op.
    fn toggle_playback(&mut self) {
        let playing = {
            let state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
            state.playback == PlaybackState::Playing
        };
        if playing {
            self.stop_playback();
            return;
        }

        let Some(clip) = self.latest.as_ref().and_then(|m| m.clip.clone()) else {
            return;
        };

        if let Some(engine) = &self.engine {
            engine.play(clip);
        }
        // Optimistic update; the engine event confirms it
        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        state.playback = PlaybackState::Playing;
        if !state.is_generating {
            state.status_text = "Playing".into();
        }
    }

    /// Stop narration playback. Safe to call when nothing is playing.
    fn stop_playback(&mut self) {
        if let Some(engine) = &self.engine {
            engine.stop();
        }
        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        state.playback = PlaybackState::Idle;
        if !state.is_generating {
            state.status_text = "Ready".into();
        }
    }

    /// Poll audio engine events
    fn poll_engine_events(&mut self) {
        // Collect events into reusable buffer to avoid borrow conflict with self
        self.event_buf.clear();
        if let Some(engine) = &self.engine {
            while let Some(event) = engine.try_recv_event() {
                self.event_buf.push(event);
            }
        } else {
            return;
        }

        // Temporarily take ownership of the buffer so we can iterate + call &mut self
        let mut buf = std::mem::take(&mut self.event_buf);
        for event in buf.drain(..) {
            self.handle_engine_event(event);
        }
        self.event_buf = buf; // put back (empty but retains capacity)
    }

    fn handle_engine_event(&mut self, event: PlayerEvent) {
        let mut state = self.shared_state.lock().unwrap_or_else(|e| e.into_inner());
        state.playback = event.state();
        // Playback status never overwrites the generation progress line
        if !state.is_generating {
            state.status_text = match event {
                PlayerEvent::Playing => "Playing".into(),
                PlayerEvent::Idle => "Ready".into(),
            };
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
