use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::{mime, SpeechService};
use crate::media::DataUri;
use crate::{audio, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Fixed prebuilt voice used for all narration.
const VOICE_NAME: &str = "Algenib";

#[derive(Debug, Serialize)]
struct SpeechRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: SpeechGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechGenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

pub struct GeminiSpeechClient {
    http: GeminiHttpClient,
}

impl GeminiSpeechClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(60),
                client,
            ),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiSpeechClient);

#[async_trait]
impl SpeechService for GeminiSpeechClient {
    async fn synthesize_speech(&self, text: &str) -> Result<DataUri> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput(
                "text-to-speech input cannot be empty".to_string(),
            ));
        }

        let request = SpeechRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text {
                    text: text.to_string(),
                }],
            }],
            generation_config: SpeechGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: VOICE_NAME.to_string(),
                        },
                    },
                },
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let inline = response
            .first_inline_data()
            .ok_or_else(|| Error::AiProvider("No audio data in Gemini response".to_string()))?;

        tracing::debug!("Gemini returned audio with mime_type: {}", inline.mime_type);

        // The provider hands back raw PCM in a base64 envelope; repackage it
        // as WAV so the result plays everywhere.
        use base64::Engine as _;
        let pcm = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| Error::AiProvider(format!("Failed to decode Gemini audio: {}", e)))?;

        let sample_rate = mime::pcm_sample_rate(&inline.mime_type);
        let wav = audio::pcm_to_wav(&pcm, 1, sample_rate)?;

        Ok(DataUri::encode("audio/wav", &wav))
    }
}
