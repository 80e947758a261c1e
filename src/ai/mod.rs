//! AI generation gateway
//!
//! Capability traits and Gemini-backed clients for image description, poem
//! composition, artwork synthesis, and speech narration. Every call is an
//! independent request/response exchange; the gateway holds no state and
//! never retries.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiArtworkClient, GeminiPoemClient, GeminiSpeechClient, GeminiVisionClient};
pub use mock::{MockArtworkClient, MockPoemClient, MockSpeechClient, MockVisionClient};

use crate::media::DataUri;
use crate::models::PoemSettings;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Produce a poem-ready textual description of a photo.
    async fn describe_image(&self, photo: &DataUri) -> Result<String>;
}

#[async_trait]
pub trait PoemService: Send + Sync {
    /// Compose a poem from a description and the chosen settings.
    async fn compose_poem(&self, description: &str, settings: &PoemSettings) -> Result<String>;
}

#[async_trait]
pub trait ArtworkService: Send + Sync {
    /// Render artwork for a description, returned as an image data URI.
    async fn synthesize_image(&self, description: &str) -> Result<DataUri>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Narrate text, returned as a playable `audio/wav` data URI.
    async fn synthesize_speech(&self, text: &str) -> Result<DataUri>;
}
