//! Stillpoint CLI — terminal meditation companion

use std::io;
use std::os::unix::io::AsRawFd;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::bounded;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::*;

use stillpoint::audio::{AudioEngine, PlaybackState};
use stillpoint_app::config::gemini::API_KEY_ENV;
use stillpoint_app::data::Settings;
use stillpoint_app::providers::GeminiProvider;
use stillpoint_app::session::{Role, SessionCommand, SessionController, SessionSnapshot};

#[derive(Parser)]
#[command(name = "stillpoint", about = "Terminal meditation companion", version)]
struct Cli {
    /// Gemini API key (falls back to the GEMINI_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Narration voice name (overrides the saved setting)
    #[arg(long)]
    voice: Option<String>,

    /// Narration volume, 0.0 to 2.0 (overrides the saved setting)
    #[arg(long)]
    volume: Option<f32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let api_key = match cli.api_key.or_else(|| std::env::var(API_KEY_ENV).ok()) {
        Some(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("Error: no API key. Pass --api-key or set {API_KEY_ENV}.");
            std::process::exit(1);
        }
    };

    let mut settings = Settings::load().unwrap_or_default();
    if let Some(voice) = cli.voice {
        settings.voice = voice;
    }
    if let Some(volume) = cli.volume {
        settings.set_volume(volume);
    }
    if let Err(e) = settings.save() {
        eprintln!("Warning: could not save settings: {e}");
    }

    let provider = match GeminiProvider::new(api_key) {
        Ok(p) => p.with_voice(settings.voice.clone()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let engine = match AudioEngine::new() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Audio error: {}", e);
            std::process::exit(1);
        }
    };
    engine.set_volume(settings.volume);

    // Shared command channel + state
    let (cmd_tx, cmd_rx) = bounded(64);
    let shared_state = Arc::new(Mutex::new(SessionSnapshot::default()));

    let controller_tx = cmd_tx.clone();
    let controller_state = Arc::clone(&shared_state);
    let controller_handle = std::thread::Builder::new()
        .name("session-controller".into())
        .spawn(move || {
            let mut controller = SessionController::new(
                cmd_rx,
                controller_tx,
                controller_state,
                Arc::new(provider),
                Some(engine),
            );
            controller.run();
        })
        .expect("Failed to spawn session-controller thread");

    // Suppress stderr during TUI — ALSA/PulseAudio and other libs write
    // diagnostic messages to stderr which corrupt the ratatui display.
    let saved_stderr = unsafe { libc::dup(2) };
    {
        let devnull = std::fs::File::open("/dev/null")?;
        unsafe { libc::dup2(devnull.as_raw_fd(), 2) };
    }

    // Enter TUI
    terminal::enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(33); // ~30fps
    let mut last_tick = Instant::now();
    let mut input = String::new();
    let mut running = true;
    let mut snapshot = shared_state
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();

    while running {
        // Draw
        terminal.draw(|f| draw_ui(f, &snapshot, &input))?;

        // Poll input
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            running = false;
                        }
                        KeyCode::Esc => {
                            let _ = cmd_tx.send(SessionCommand::StopPlayback);
                        }
                        KeyCode::Enter => {
                            if !snapshot.is_generating && !input.trim().is_empty() {
                                let _ =
                                    cmd_tx.send(SessionCommand::Submit(input.trim().to_string()));
                                input.clear();
                            }
                        }
                        KeyCode::Backspace => {
                            input.pop();
                        }
                        // Space with an empty input line toggles narration;
                        // mid-sentence it is just a character.
                        KeyCode::Char(' ') if input.is_empty() => {
                            let _ = cmd_tx.send(SessionCommand::TogglePlayback);
                        }
                        KeyCode::Char(c) => {
                            if !key.modifiers.contains(KeyModifiers::CONTROL)
                                && !snapshot.is_generating
                            {
                                input.push(c);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();

            // Refresh the controller's snapshot
            snapshot = shared_state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
        }
    }

    // Shut down the controller (and with it the audio engine) while still
    // in the alternate screen (rodio prints to stderr on drop)
    let _ = cmd_tx.send(SessionCommand::Shutdown);
    let _ = controller_handle.join();

    // Restore terminal
    terminal::disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    // Restore stderr
    if saved_stderr >= 0 {
        unsafe {
            libc::dup2(saved_stderr, 2);
            libc::close(saved_stderr);
        }
    }

    Ok(())
}

fn draw_ui(f: &mut Frame, snapshot: &SessionSnapshot, input: &str) {
    let area = f.area();

    let outer = Block::default()
        .title(format!(" Stillpoint v{} ", env!("CARGO_PKG_VERSION")))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::vertical([
        Constraint::Min(5),    // transcript
        Constraint::Length(3), // input line
        Constraint::Length(1), // help bar
    ])
    .split(inner);

    draw_transcript(f, snapshot, chunks[0]);
    draw_input(f, snapshot, input, chunks[1]);
    draw_help(f, snapshot, chunks[2]);
}

fn draw_transcript(f: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for message in &snapshot.messages {
        match message.role {
            Role::User => {
                lines.push(Line::from(vec![
                    Span::styled("You: ", Style::default().fg(Color::Cyan).bold()),
                    Span::styled(message.text.as_str(), Style::default().fg(Color::White)),
                ]));
            }
            Role::Model => {
                lines.push(Line::from(vec![
                    Span::styled("Guide: ", Style::default().fg(Color::Green).bold()),
                    Span::styled(message.text.as_str(), Style::default().fg(Color::White)),
                ]));
                if let Some(ref note) = message.image_note {
                    lines.push(Line::from(Span::styled(
                        format!("  [scene: {}]", note),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                if let Some(duration) = message.narration {
                    lines.push(Line::from(Span::styled(
                        format!("  [narration: {}]", format_duration(duration)),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }
        lines.push(Line::default());
    }

    // Keep the newest messages visible: estimate wrapped rows and scroll
    // past everything that doesn't fit.
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let text_width = area.width.saturating_sub(2).max(1) as usize;
    let text_height = area.height.saturating_sub(2);
    let mut rows: u16 = 0;
    for line in &lines {
        rows = rows.saturating_add((line.width() / text_width) as u16 + 1);
    }
    let scroll = rows.saturating_sub(text_height);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

fn draw_input(f: &mut Frame, snapshot: &SessionSnapshot, input: &str, area: Rect) {
    let block = Block::default()
        .title(" How are you feeling? ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    let line = if snapshot.is_generating {
        Line::from(Span::styled(
            "Preparing your meditation...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled(input, Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ])
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_help(f: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
    let playback = match snapshot.playback {
        PlaybackState::Playing => "Playing",
        PlaybackState::Idle if snapshot.can_play => "Stopped",
        PlaybackState::Idle => "No narration yet",
    };

    let help = Line::from(vec![
        Span::styled("  'Enter' ", Style::default().fg(Color::Yellow)),
        Span::raw("send  |  "),
        Span::styled("'Space' ", Style::default().fg(Color::Yellow)),
        Span::raw("play/stop  |  "),
        Span::styled("'Esc' ", Style::default().fg(Color::Yellow)),
        Span::raw("stop  |  "),
        Span::styled("'Ctrl+C' ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  |  "),
        Span::styled(
            format!("{} - {}", snapshot.status_text, playback),
            Style::default().fg(Color::Cyan).bold(),
        ),
    ]);

    f.render_widget(Paragraph::new(help).alignment(Alignment::Left), area);
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let m = secs / 60;
    let s = secs % 60;
    format!("{}:{:02}", m, s)
}
