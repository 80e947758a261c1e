//! Data models and structures
//!
//! Defines the wizard session record, poem settings and their enumerated
//! domains, and the environment-backed configuration.

use crate::media::DataUri;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Known placeholder value shipped in .env templates; treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_GOOGLE_AI_API_KEY";

/// Defines an enumerated poem option with its display labels, the full
/// variant domain (`ALL`) for randomization, and label-based parsing.
macro_rules! poem_option {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self { $($name::$variant => $label,)+ })
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
                let needle = input.trim().to_ascii_lowercase().replace(['-', '_'], " ");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.to_string().to_ascii_lowercase() == needle)
                    .ok_or_else(|| {
                        let labels: Vec<&str> = vec![$($label),+];
                        format!(
                            "unknown value '{}', expected one of: {}",
                            input,
                            labels.join(", ")
                        )
                    })
            }
        }
    };
}

poem_option! {
    /// Language the poem is written in.
    PoemLanguage {
        English => "English",
        Hindi => "Hindi",
        Hinglish => "Hinglish",
    }
}

poem_option! {
    /// Poetic form the model is asked to follow.
    PoemStyle {
        Haiku => "Haiku",
        FreeVerse => "Free Verse",
        Romantic => "Romantic",
        Motivational => "Motivational",
        Sonnet => "Sonnet",
        Limerick => "Limerick",
        Ode => "Ode",
        Ballad => "Ballad",
        Elegy => "Elegy",
        Narrative => "Narrative",
    }
}

poem_option! {
    /// Emotional register of the poem.
    PoemTone {
        Joyful => "Joyful",
        Calm => "Calm",
        Melancholic => "Melancholic",
        Nostalgic => "Nostalgic",
        Reflective => "Reflective",
        Humorous => "Humorous",
        Inspired => "Inspired",
        Mysterious => "Mysterious",
        Hopeful => "Hopeful",
        Wistful => "Wistful",
        Playful => "Playful",
        Dramatic => "Dramatic",
    }
}

poem_option! {
    /// Coarse length tier, mapped to stanza/line guidance in the prompt.
    PoemLength {
        Short => "Short",
        Medium => "Medium",
        Long => "Long",
    }
}

/// User-selected poem generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemSettings {
    pub language: PoemLanguage,
    pub style: PoemStyle,
    pub tone: PoemTone,
    pub length: PoemLength,
    /// Optional free-text instruction, e.g. "focus on the monsoon rain".
    pub custom_instruction: Option<String>,
    /// Optional poetic-device hint, e.g. "alliteration".
    pub poetic_device: Option<String>,
}

impl Default for PoemSettings {
    fn default() -> Self {
        Self {
            language: PoemLanguage::English,
            style: PoemStyle::FreeVerse,
            tone: PoemTone::Reflective,
            length: PoemLength::Medium,
            custom_instruction: None,
            poetic_device: None,
        }
    }
}

/// Wizard step the session is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Upload,
    Describe,
    Customize,
    Display,
}

/// The single mutable working record of one user visit.
///
/// Nothing here persists anywhere; a session lives in memory for exactly as
/// long as the wizard that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub step: WizardStep,
    pub source_image: Option<DataUri>,
    pub description: String,
    pub settings: PoemSettings,
    pub poem: Option<String>,
    /// Generated artwork; only populated for sessions that started from text.
    pub artwork: Option<DataUri>,
    pub narration: Option<DataUri>,
    /// Monotonic token; enhancement results carrying a stale token are dropped.
    pub generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            step: WizardStep::Upload,
            source_image: None,
            description: String::new(),
            settings: PoemSettings::default(),
            poem: None,
            artwork: None,
            narration: None,
            generation: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores every field to its initial default. The generation token only
    /// ever increases, so in-flight calls from before the reset are discarded.
    pub fn reset(&mut self) {
        *self = Session {
            generation: self.generation + 1,
            ..Session::default()
        };
    }

    pub fn has_photo(&self) -> bool {
        self.source_image.is_some()
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub describe_model: String,
    pub poem_model: String,
    pub artwork_model: String,
    pub speech_model: String,
    pub output_root: PathBuf,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let google_api_key = std::env::var("GOOGLE_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY);

        Ok(Self {
            google_api_key,
            describe_model: env_or("PHOTOVERSE_DESCRIBE_MODEL", "gemini-2.0-flash"),
            poem_model: env_or("PHOTOVERSE_POEM_MODEL", "gemini-2.0-flash"),
            artwork_model: env_or(
                "PHOTOVERSE_ARTWORK_MODEL",
                "gemini-2.0-flash-preview-image-generation",
            ),
            speech_model: env_or("PHOTOVERSE_SPEECH_MODEL", "gemini-2.5-flash-preview-tts"),
            output_root: PathBuf::from(env_or("PHOTOVERSE_OUTPUT_DIR", "output")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_serialization_uses_display_labels() {
        let settings = PoemSettings {
            style: PoemStyle::FreeVerse,
            ..PoemSettings::default()
        };

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"style\":\"Free Verse\""));

        let deserialized: PoemSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.style, PoemStyle::FreeVerse);
    }

    #[test]
    fn test_poem_option_parsing_is_forgiving() {
        assert_eq!("haiku".parse::<PoemStyle>().unwrap(), PoemStyle::Haiku);
        assert_eq!(
            "free-verse".parse::<PoemStyle>().unwrap(),
            PoemStyle::FreeVerse
        );
        assert_eq!("  Calm ".parse::<PoemTone>().unwrap(), PoemTone::Calm);
        assert_eq!("hinglish".parse::<PoemLanguage>().unwrap(), PoemLanguage::Hinglish);

        let err = "villanelle".parse::<PoemStyle>().unwrap_err();
        assert!(err.contains("Haiku"));
    }

    #[test]
    fn test_poem_option_domains_are_complete() {
        assert_eq!(PoemLanguage::ALL.len(), 3);
        assert_eq!(PoemStyle::ALL.len(), 10);
        assert_eq!(PoemTone::ALL.len(), 12);
        assert_eq!(PoemLength::ALL.len(), 3);
    }

    #[test]
    fn test_session_reset_restores_defaults_and_bumps_generation() {
        let mut session = Session::new();
        session.step = WizardStep::Display;
        session.description = "a red bicycle".to_string();
        session.poem = Some("verse".to_string());
        session.generation = 4;

        session.reset();

        assert_eq!(session.step, WizardStep::Upload);
        assert!(session.description.is_empty());
        assert!(session.poem.is_none());
        assert!(session.source_image.is_none());
        assert!(session.artwork.is_none());
        assert!(session.narration.is_none());
        assert_eq!(session.settings, PoemSettings::default());
        assert_eq!(session.generation, 5);
    }
}
