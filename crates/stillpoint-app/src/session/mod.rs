//! Meditation session orchestration
//!
//! The controller runs on its own thread and drives the script, image,
//! and speech calls; the frontend talks to it through `SessionCommand`
//! and reads `SessionSnapshot`.

pub mod controller;
pub mod state;

// Re-exports
pub use controller::SessionController;
pub use state::{ChatMessage, Meditation, Role, SessionCommand, SessionSnapshot};
