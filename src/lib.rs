//! PhotoVerse - turns a photo or a text idea into an AI-generated poem
//!
//! Drives a four-step wizard session (upload, describe, customize, display)
//! over hosted generation capabilities: image description, poem composition,
//! artwork synthesis, and narration speech, then renders the results for
//! saving and sharing.

pub mod ai;
pub mod app;
pub mod audio;
pub mod error;
pub mod media;
pub mod models;
pub mod prompts;
pub mod wizard;

pub use error::{Error, Result};
