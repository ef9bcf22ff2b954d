//! Stillpoint App Services
//!
//! Generative providers, session orchestration, data persistence, and
//! networking utilities. Depends on the `stillpoint` engine crate.

pub mod config;
pub mod data;
pub mod error;
pub mod network;
pub mod providers;
pub mod session;
