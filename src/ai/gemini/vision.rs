use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::VisionService;
use crate::media::DataUri;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct DescribeRequest {
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

pub struct GeminiVisionClient {
    http: GeminiHttpClient,
}

impl GeminiVisionClient {
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
super::impl_with_gemini_base_url!(GeminiVisionClient);

#[async_trait]
impl VisionService for GeminiVisionClient {
    async fn describe_image(&self, photo: &DataUri) -> Result<String> {
        tracing::debug!("Describing {} photo via Gemini", photo.mime());

        let request = DescribeRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text {
                    text: prompts::DESCRIBE_SYSTEM.to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: photo.mime().to_string(),
                            data: photo.base64_data().to_string(),
                        },
                    },
                    Part::Text {
                        text: prompts::DESCRIBE_USER.to_string(),
                    },
                ],
            }],
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response
            .first_text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::AiProvider("No description in Gemini response".to_string()))
    }
}
