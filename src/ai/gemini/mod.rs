pub mod artwork;
pub mod client;
pub mod poem;
pub mod speech;
pub mod types;
pub mod vision;

pub use artwork::GeminiArtworkClient;
pub use poem::GeminiPoemClient;
pub use speech::GeminiSpeechClient;
pub use vision::GeminiVisionClient;

/// Adds a test-only builder that points a capability client at a mock server.
#[cfg(test)]
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            pub(crate) fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}

#[cfg(test)]
pub(crate) use impl_with_gemini_base_url;
