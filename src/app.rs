//! Application orchestration for running one wizard session end to end.

use crate::ai::{
    GeminiArtworkClient, GeminiPoemClient, GeminiSpeechClient, GeminiVisionClient,
};
use crate::media;
use crate::models::{Config, PoemSettings, Session};
use crate::wizard::{DescribeOutcome, Wizard, WizardServices};
use crate::{Error, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Inputs for one CLI-driven session.
pub struct RunRequest {
    pub photo: Option<PathBuf>,
    pub prompt: Option<String>,
    pub settings: PoemSettings,
    pub randomize: bool,
}

/// Drives a [`Wizard`] through a full session and saves the results.
pub struct App {
    wizard: Wizard,
    output_dir: PathBuf,
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "bin",
    }
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(services: WizardServices, output_dir: PathBuf) -> Self {
        Self {
            wizard: Wizard::new(services),
            output_dir,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;

        let api_key = config.google_api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            warn!("GOOGLE_API_KEY is not configured; generation calls will fail fast");
        }

        let date = Local::now().format("%Y-%m-%d").to_string();
        let session_id = Uuid::new_v4();
        let output_dir = config.output_root.join(format!("{}_{}", date, session_id));

        fs::create_dir_all(&output_dir)?;
        info!("Created output directory: {}", output_dir.display());

        // Reuse one HTTP connection pool across the capability clients.
        let http_client = reqwest::Client::new();

        let services = WizardServices {
            vision: Arc::new(GeminiVisionClient::new_with_client(
                api_key.clone(),
                config.describe_model.clone(),
                http_client.clone(),
            )),
            poem: Arc::new(GeminiPoemClient::new_with_client(
                api_key.clone(),
                config.poem_model.clone(),
                http_client.clone(),
            )),
            artwork: Arc::new(GeminiArtworkClient::new_with_client(
                api_key.clone(),
                config.artwork_model.clone(),
                http_client.clone(),
            )),
            speech: Arc::new(GeminiSpeechClient::new_with_client(
                api_key,
                config.speech_model.clone(),
                http_client,
            )),
        };

        Ok(Self::with_services(services, output_dir))
    }

    /// Run one session: acquire the photo or prompt, confirm the
    /// description, generate the poem, wait for the enhancements, and save
    /// everything under the output directory.
    pub async fn run(&self, request: RunRequest) -> Result<()> {
        self.wizard.set_settings(request.settings);

        if let Some(path) = &request.photo {
            info!("Preparing photo: {}", path.display());
            let bytes = fs::read(path)?;
            let photo = media::prepare_photo(bytes).await?;

            match self.wizard.provide_photo(photo).await? {
                DescribeOutcome::Described => {
                    let description = self.wizard.session().description;
                    info!("AI description: {}", description);
                    self.wizard.confirm_description(&description)?;
                }
                DescribeOutcome::Fallback(e) => match &request.prompt {
                    Some(prompt) => {
                        warn!("Using the provided prompt as the description instead");
                        self.wizard.confirm_description(prompt)?;
                    }
                    None => return Err(e),
                },
            }
        } else {
            let prompt = request.prompt.as_deref().ok_or_else(|| {
                Error::EmptyInput("provide a photo path or a --prompt to start from".to_string())
            })?;
            self.wizard.skip_photo()?;
            self.wizard.set_description(prompt)?;
        }

        if request.randomize {
            let settings = self.wizard.randomize_settings();
            info!(
                "Randomized settings: {} / {} / {} / {}",
                settings.language, settings.style, settings.tone, settings.length
            );
        }

        let poem = self.wizard.generate_poem().await?;
        info!("Poem generated:\n{}", poem);

        self.wizard.await_enhancements().await;

        let session = self.wizard.session();
        self.save_outputs(&session)
    }

    fn save_outputs(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;

        fs::write(
            self.output_dir.join("description.txt"),
            &session.description,
        )?;

        let poem = session
            .poem
            .as_deref()
            .ok_or_else(|| Error::Invariant("no poem to save".to_string()))?;
        fs::write(self.output_dir.join("poem.txt"), poem)?;

        if let Some(photo) = &session.source_image {
            let path = self
                .output_dir
                .join(format!("photo.{}", extension_for_mime(photo.mime())));
            fs::write(&path, photo.decode()?)?;
        }

        match &session.artwork {
            Some(artwork) => {
                let path = self
                    .output_dir
                    .join(format!("artwork.{}", extension_for_mime(artwork.mime())));
                fs::write(&path, artwork.decode()?)?;
                info!("Saved artwork at: {}", path.display());
            }
            None if session.source_image.is_none() => info!("No artwork was generated"),
            None => {}
        }

        match &session.narration {
            Some(narration) => {
                let path = self.output_dir.join("narration.wav");
                fs::write(&path, narration.decode()?)?;
                info!("Saved narration at: {}", path.display());
            }
            None => info!("No narration was generated"),
        }

        info!("Session saved under {}", self.output_dir.display());
        Ok(())
    }
}
