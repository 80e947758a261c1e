//! In-memory mock implementations of the gateway traits.
//!
//! Each mock cycles through scripted outcomes (successes or failures) and
//! counts calls, so wizard and integration tests can drive every branch
//! without touching the network.

use super::{ArtworkService, PoemService, SpeechService, VisionService};
use crate::media::DataUri;
use crate::models::PoemSettings;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome queue shared by the mock clients.
///
/// Outcomes are cycled by call count; an empty queue means "always return
/// the default". `Err` entries become [`Error::AiProvider`] failures.
#[derive(Clone)]
struct Script<T: Clone> {
    outcomes: Arc<Mutex<Vec<std::result::Result<T, String>>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    fn push_ok(&self, value: T) {
        self.outcomes.lock().unwrap().push(Ok(value));
    }

    fn push_err(&self, message: String) {
        self.outcomes.lock().unwrap().push(Err(message));
    }

    fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Record a call and return the next scripted outcome, or the default
    /// when nothing was scripted.
    async fn next(&self, default: T) -> Result<T> {
        let outcome = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;

            let outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                Ok(default)
            } else {
                outcomes[(*count - 1) % outcomes.len()].clone()
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        outcome.map_err(Error::AiProvider)
    }
}

#[derive(Clone)]
pub struct MockVisionClient {
    script: Script<String>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    pub fn with_description(self, description: String) -> Self {
        self.script.push_ok(description);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        self.script.push_err(message);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn describe_image(&self, photo: &DataUri) -> Result<String> {
        self.script
            .next(format!("A quiet scene captured as {}", photo.mime()))
            .await
    }
}

#[derive(Clone)]
pub struct MockPoemClient {
    script: Script<String>,
}

impl MockPoemClient {
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    pub fn with_poem(self, poem: String) -> Self {
        self.script.push_ok(poem);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        self.script.push_err(message);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }
}

impl Default for MockPoemClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoemService for MockPoemClient {
    async fn compose_poem(&self, description: &str, settings: &PoemSettings) -> Result<String> {
        self.script
            .next(format!(
                "A {} {} verse:\n{}",
                settings.tone, settings.style, description
            ))
            .await
    }
}

#[derive(Clone)]
pub struct MockArtworkClient {
    script: Script<DataUri>,
}

impl MockArtworkClient {
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    pub fn with_artwork(self, artwork: DataUri) -> Self {
        self.script.push_ok(artwork);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        self.script.push_err(message);
        self
    }

    /// Delay every response; lets tests race enhancements deterministically.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }

    /// A tiny valid PNG, used as the default artwork payload.
    pub fn placeholder_png() -> Vec<u8> {
        vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
            0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
            0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
            0x44, 0x41, // IDAT chunk
            0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2,
            0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
            0x44, 0xAE, 0x42, 0x60, 0x82,
        ]
    }
}

impl Default for MockArtworkClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtworkService for MockArtworkClient {
    async fn synthesize_image(&self, _description: &str) -> Result<DataUri> {
        self.script
            .next(DataUri::encode("image/png", &Self::placeholder_png()))
            .await
    }
}

#[derive(Clone)]
pub struct MockSpeechClient {
    script: Script<DataUri>,
}

impl MockSpeechClient {
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    pub fn with_narration(self, narration: DataUri) -> Self {
        self.script.push_ok(narration);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        self.script.push_err(message);
        self
    }

    /// Delay every response; lets tests race enhancements deterministically.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script.call_count()
    }
}

impl Default for MockSpeechClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechService for MockSpeechClient {
    async fn synthesize_speech(&self, text: &str) -> Result<DataUri> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput(
                "text-to-speech input cannot be empty".to_string(),
            ));
        }

        let default = {
            // Eight zero samples of silence, wrapped like the real client.
            let wav = crate::audio::pcm_to_wav(&[0u8; 16], 1, crate::audio::DEFAULT_SAMPLE_RATE)
                .expect("static PCM buffer is valid");
            DataUri::encode("audio/wav", &wav)
        };

        self.script.next(default).await
    }
}
