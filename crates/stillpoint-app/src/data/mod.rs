//! Data persistence
//!
//! Handles settings storage in the user config directory.

pub mod settings;
pub mod storage;

// Re-export common types
pub use settings::Settings;
pub use storage::{config_dir, data_path, load, save};
