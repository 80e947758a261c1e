use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::ArtworkService;
use crate::media::DataUri;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ArtworkRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ArtworkGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtworkGenerationConfig {
    response_modalities: Vec<String>,
}

pub struct GeminiArtworkClient {
    http: GeminiHttpClient,
}

impl GeminiArtworkClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiArtworkClient);

#[async_trait]
impl ArtworkService for GeminiArtworkClient {
    async fn synthesize_image(&self, description: &str) -> Result<DataUri> {
        let prompt = prompts::render(prompts::ARTWORK, &[("description", description)]);

        let request = ArtworkRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::Text { text: prompt }],
            }],
            // The image model only answers when both modalities are requested.
            generation_config: ArtworkGenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let inline = response
            .first_inline_data()
            .ok_or_else(|| Error::AiProvider("No image data in Gemini response".to_string()))?;

        tracing::debug!("Gemini returned artwork with mime_type: {}", inline.mime_type);

        DataUri::from_base64(&inline.mime_type, &inline.data)
    }
}
