use crate::models::PLACEHOLDER_API_KEY;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Lightweight Gemini REST client shared by the capability modules.
///
/// Holds the credential, model ID, and timeout for one capability; the
/// missing-key precondition lives here so every capability inherits it.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client. `model` is the bare model ID (for example
    /// `gemini-2.0-flash`), not a `models/...`-prefixed path segment.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Calls Gemini's `generateContent` endpoint for the capability clients.
    ///
    /// An empty or placeholder credential fails fast with a configuration
    /// error, so a missing key never turns into a network call.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        if self.api_key.is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(Error::Config(
                "Google AI API key is not configured. Add GOOGLE_API_KEY to your environment or .env file.".to_string(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request could not be sent: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Gemini rejected the request (status {}): {}", status, body);
            return Err(Error::AiProvider(format!(
                "Gemini rejected the request (status {}): {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unparseable Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Unparseable Gemini response: {}", e))
        })
    }
}
