use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::PoemService;
use crate::models::PoemSettings;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PoemRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: Option<PoemGenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PoemGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

pub struct GeminiPoemClient {
    http: GeminiHttpClient,
}

impl GeminiPoemClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiPoemClient);

#[async_trait]
impl PoemService for GeminiPoemClient {
    async fn compose_poem(&self, description: &str, settings: &PoemSettings) -> Result<String> {
        if description.trim().is_empty() {
            return Err(Error::EmptyInput(
                "a description or subject is required to compose a poem".to_string(),
            ));
        }

        let instruction = prompts::poem_instruction(description, settings);

        let request = PoemRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text { text: instruction }],
            }],
            generation_config: Some(PoemGenerationConfig {
                max_output_tokens: Some(3000),
            }),
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        // An empty poem must never surface as a success.
        response
            .first_text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::AiProvider("Gemini returned an empty poem".to_string()))
    }
}
