//! Wizard session state machine
//!
//! Sequences one visit through upload → describe → customize → display,
//! coordinating the gateway capabilities and tolerating partial failure
//! without losing user progress. The poem call blocks its transition; the
//! narration and artwork enhancements are fire-and-forget tasks that race
//! each other and write their own session fields when they resolve.

use crate::ai::{ArtworkService, PoemService, SpeechService, VisionService};
use crate::media::DataUri;
use crate::models::{
    PoemLanguage, PoemLength, PoemSettings, PoemStyle, PoemTone, Session, WizardStep,
};
use crate::{Error, Result};
use rand::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Stored in place of the description when AI description fails, so the user
/// can correct it manually instead of losing the step.
pub const DESCRIPTION_FALLBACK: &str =
    "Could not generate AI description. Please write one manually or try again.";

/// Substituted when a blank description would otherwise be confirmed.
pub const DEFAULT_DESCRIPTION: &str = "A beautiful scene";

/// Outcome of the upload → describe transition. Description failure is
/// non-fatal; the wizard keeps the photo and falls back to manual editing.
#[derive(Debug)]
pub enum DescribeOutcome {
    Described,
    Fallback(Error),
}

/// Gateway service bundle used to construct a [`Wizard`].
pub struct WizardServices {
    pub vision: Arc<dyn VisionService>,
    pub poem: Arc<dyn PoemService>,
    pub artwork: Arc<dyn ArtworkService>,
    pub speech: Arc<dyn SpeechService>,
}

pub struct Wizard {
    session: Arc<Mutex<Session>>,
    services: WizardServices,
    enhancements: Mutex<Vec<JoinHandle<()>>>,
}

/// Apply an enhancement result unless the session has moved on since the
/// task was spawned (reset, back, regenerate all bump the generation).
fn apply_enhancement(
    session: &Arc<Mutex<Session>>,
    generation: u64,
    apply: impl FnOnce(&mut Session),
) {
    let mut session = session.lock().expect("session mutex poisoned");
    if session.generation == generation && session.step == WizardStep::Display {
        apply(&mut session);
    } else {
        debug!("Discarding stale enhancement result");
    }
}

impl Wizard {
    pub fn new(services: WizardServices) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            services,
            enhancements: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("session mutex poisoned")
    }

    /// Snapshot of the current session for rendering and assertions.
    pub fn session(&self) -> Session {
        self.lock().clone()
    }

    pub fn step(&self) -> WizardStep {
        self.lock().step
    }

    /// Upload → describe. Accepts the acquired photo and immediately asks
    /// for an AI description; on failure the fallback text is stored and the
    /// failure is reported as a non-fatal outcome.
    pub async fn provide_photo(&self, photo: DataUri) -> Result<DescribeOutcome> {
        let generation = {
            let mut session = self.lock();
            if session.step != WizardStep::Upload {
                return Err(Error::Invariant(format!(
                    "cannot accept a photo on the {:?} step",
                    session.step
                )));
            }
            session.source_image = Some(photo.clone());
            session.artwork = None;
            session.step = WizardStep::Describe;
            session.generation
        };

        match self.services.vision.describe_image(&photo).await {
            Ok(description) => {
                info!("AI description generated ({} chars)", description.len());
                let mut session = self.lock();
                if session.generation == generation {
                    session.description = description;
                }
                Ok(DescribeOutcome::Described)
            }
            Err(e) => {
                warn!("AI description failed: {}", e);
                let mut session = self.lock();
                if session.generation == generation {
                    session.description = DESCRIPTION_FALLBACK.to_string();
                }
                Ok(DescribeOutcome::Fallback(e))
            }
        }
    }

    /// Re-run AI description for the current photo. Unlike the upload
    /// transition this propagates failure and leaves the description alone.
    pub async fn refresh_description(&self) -> Result<()> {
        let (photo, generation) = {
            let session = self.lock();
            if session.step != WizardStep::Describe {
                return Err(Error::Invariant(format!(
                    "cannot refresh the description on the {:?} step",
                    session.step
                )));
            }
            let photo = session
                .source_image
                .clone()
                .ok_or_else(|| Error::Invariant("no photo available to describe".to_string()))?;
            (photo, session.generation)
        };

        let description = self.services.vision.describe_image(&photo).await?;

        let mut session = self.lock();
        if session.generation == generation {
            session.description = description;
        }
        Ok(())
    }

    /// Upload → customize without a photo. The description starts empty and
    /// no image-bound capability is invoked.
    pub fn skip_photo(&self) -> Result<()> {
        let mut session = self.lock();
        if session.step != WizardStep::Upload {
            return Err(Error::Invariant(format!(
                "cannot skip the photo on the {:?} step",
                session.step
            )));
        }
        session.step = WizardStep::Customize;
        Ok(())
    }

    /// Describe → customize with the (possibly edited) description. A blank
    /// confirmation is replaced with a neutral default rather than accepted.
    pub fn confirm_description(&self, text: &str) -> Result<()> {
        let mut session = self.lock();
        if session.step != WizardStep::Describe {
            return Err(Error::Invariant(format!(
                "cannot confirm a description on the {:?} step",
                session.step
            )));
        }
        session.description = if text.trim().is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            text.to_string()
        };
        session.step = WizardStep::Customize;
        Ok(())
    }

    /// Describe → customize, discarding the AI text so the user writes their
    /// own description from scratch.
    pub fn write_own_description(&self) -> Result<()> {
        let mut session = self.lock();
        if session.step != WizardStep::Describe {
            return Err(Error::Invariant(format!(
                "cannot discard the description on the {:?} step",
                session.step
            )));
        }
        session.description.clear();
        session.step = WizardStep::Customize;
        Ok(())
    }

    /// Replace the working description while it is editable.
    pub fn set_description(&self, text: &str) -> Result<()> {
        let mut session = self.lock();
        match session.step {
            WizardStep::Describe | WizardStep::Customize => {
                session.description = text.to_string();
                Ok(())
            }
            step => Err(Error::Invariant(format!(
                "description is not editable on the {:?} step",
                step
            ))),
        }
    }

    pub fn set_settings(&self, settings: PoemSettings) {
        self.lock().settings = settings;
    }

    pub fn reset_settings(&self) {
        self.lock().settings = PoemSettings::default();
    }

    /// Replace language/style/tone/length with uniform random picks from
    /// their domains. Custom instruction and poetic-device text are kept
    /// byte-for-byte.
    pub fn randomize_settings(&self) -> PoemSettings {
        let mut rng = rand::thread_rng();
        let mut session = self.lock();

        let settings = &mut session.settings;
        settings.language = *PoemLanguage::ALL.choose(&mut rng).expect("non-empty domain");
        settings.style = *PoemStyle::ALL.choose(&mut rng).expect("non-empty domain");
        settings.tone = *PoemTone::ALL.choose(&mut rng).expect("non-empty domain");
        settings.length = *PoemLength::ALL.choose(&mut rng).expect("non-empty domain");

        settings.clone()
    }

    /// Customize → display. The poem call blocks the transition; on failure
    /// the session is left exactly where it was. On success the narration
    /// enhancement always fires, and the artwork enhancement fires only when
    /// the session never had a source photo.
    pub async fn generate_poem(&self) -> Result<String> {
        let (description, settings, had_photo, generation) = {
            let session = self.lock();
            if session.step != WizardStep::Customize {
                return Err(Error::Invariant(format!(
                    "poem generation is only available on the customize step (currently {:?})",
                    session.step
                )));
            }
            if session.description.trim().is_empty() {
                return Err(Error::EmptyInput(
                    "provide a description or subject for the poem before generating".to_string(),
                ));
            }
            (
                session.description.clone(),
                session.settings.clone(),
                session.has_photo(),
                session.generation,
            )
        };

        let poem = self
            .services
            .poem
            .compose_poem(&description, &settings)
            .await?;

        let new_generation = {
            let mut session = self.lock();
            if session.generation != generation || session.step != WizardStep::Customize {
                warn!("Discarding poem composed for a superseded session");
                return Ok(poem);
            }
            session.poem = Some(poem.clone());
            session.step = WizardStep::Display;
            session.generation += 1;
            session.generation
        };

        info!("Poem generated ({} chars)", poem.len());
        self.spawn_enhancements(new_generation, poem.clone(), (!had_photo).then_some(description));

        Ok(poem)
    }

    /// Launch the fire-and-forget enhancement tasks. They race each other
    /// and each posts its own result when ready; failure of either is
    /// non-fatal and only leaves its field unset.
    fn spawn_enhancements(
        &self,
        generation: u64,
        poem: String,
        artwork_description: Option<String>,
    ) {
        let mut handles = self.enhancements.lock().expect("enhancement mutex poisoned");

        let speech = Arc::clone(&self.services.speech);
        let session = Arc::clone(&self.session);
        handles.push(tokio::spawn(async move {
            match speech.synthesize_speech(&poem).await {
                Ok(narration) => apply_enhancement(&session, generation, |session| {
                    session.narration = Some(narration);
                }),
                Err(e) => warn!("Narration synthesis failed: {}", e),
            }
        }));

        if let Some(description) = artwork_description {
            let artwork = Arc::clone(&self.services.artwork);
            let session = Arc::clone(&self.session);
            handles.push(tokio::spawn(async move {
                match artwork.synthesize_image(&description).await {
                    Ok(image) => apply_enhancement(&session, generation, |session| {
                        session.artwork = Some(image);
                    }),
                    Err(e) => warn!("Artwork synthesis failed: {}", e),
                }
            }));
        }
    }

    /// Display → customize → display again with the current description and
    /// settings. The previous poem, artwork, and narration are discarded
    /// first so a fresh poem is never mixed with stale enhancements.
    pub async fn regenerate(&self) -> Result<String> {
        {
            let mut session = self.lock();
            if session.step != WizardStep::Display {
                return Err(Error::Invariant(format!(
                    "cannot regenerate on the {:?} step",
                    session.step
                )));
            }
            session.poem = None;
            session.artwork = None;
            session.narration = None;
            session.step = WizardStep::Customize;
            session.generation += 1;
        }

        self.generate_poem().await
    }

    /// Step backwards: display → customize (dropping results), customize →
    /// describe when a photo exists (full reset otherwise), describe →
    /// upload (dropping the photo). A no-op on the upload step.
    pub fn back(&self) {
        let mut session = self.lock();
        match session.step {
            WizardStep::Display => {
                session.poem = None;
                session.artwork = None;
                session.narration = None;
                session.step = WizardStep::Customize;
                session.generation += 1;
            }
            WizardStep::Customize => {
                if session.has_photo() {
                    session.step = WizardStep::Describe;
                } else {
                    session.reset();
                }
            }
            WizardStep::Describe => {
                session.source_image = None;
                session.description.clear();
                session.step = WizardStep::Upload;
                session.generation += 1;
            }
            WizardStep::Upload => {}
        }
    }

    /// Reset every session field to its initial default.
    pub fn start_over(&self) {
        self.lock().reset();
    }

    /// Wait for any outstanding enhancement tasks. The UI tolerates either
    /// enhancement finishing first, last, or never; tests and the CLI use
    /// this to observe a settled session.
    pub async fn await_enhancements(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.enhancements.lock().expect("enhancement mutex poisoned");
            pending.drain(..).collect()
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Enhancement task failed to join: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockArtworkClient, MockPoemClient, MockSpeechClient, MockVisionClient};
    use std::time::Duration;

    fn wizard_with(
        vision: MockVisionClient,
        poem: MockPoemClient,
        artwork: MockArtworkClient,
        speech: MockSpeechClient,
    ) -> Wizard {
        Wizard::new(WizardServices {
            vision: Arc::new(vision),
            poem: Arc::new(poem),
            artwork: Arc::new(artwork),
            speech: Arc::new(speech),
        })
    }

    fn default_wizard() -> Wizard {
        wizard_with(
            MockVisionClient::new(),
            MockPoemClient::new(),
            MockArtworkClient::new(),
            MockSpeechClient::new(),
        )
    }

    fn test_photo() -> DataUri {
        DataUri::encode("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0])
    }

    #[tokio::test]
    async fn test_photo_is_rejected_outside_the_upload_step() {
        let wizard = default_wizard();
        wizard.skip_photo().unwrap();

        let err = wizard.provide_photo(test_photo()).await.unwrap_err();
        assert!(matches!(err, Error::Invariant(_)));
    }

    #[tokio::test]
    async fn test_describe_failure_stores_fallback_and_keeps_progress() {
        let wizard = wizard_with(
            MockVisionClient::new().with_failure("vision model offline".to_string()),
            MockPoemClient::new(),
            MockArtworkClient::new(),
            MockSpeechClient::new(),
        );

        let outcome = wizard.provide_photo(test_photo()).await.unwrap();
        assert!(matches!(outcome, DescribeOutcome::Fallback(_)));

        let session = wizard.session();
        assert_eq!(session.step, WizardStep::Describe);
        assert!(session.has_photo());
        assert_eq!(session.description, DESCRIPTION_FALLBACK);
    }

    #[tokio::test]
    async fn test_blank_confirmation_substitutes_neutral_default() {
        let wizard = default_wizard();
        wizard.provide_photo(test_photo()).await.unwrap();

        wizard.confirm_description("   \n ").unwrap();

        let session = wizard.session();
        assert_eq!(session.step, WizardStep::Customize);
        assert_eq!(session.description, DEFAULT_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_write_own_description_clears_ai_text() {
        let wizard = default_wizard();
        wizard.provide_photo(test_photo()).await.unwrap();
        assert!(!wizard.session().description.is_empty());

        wizard.write_own_description().unwrap();

        let session = wizard.session();
        assert_eq!(session.step, WizardStep::Customize);
        assert!(session.description.is_empty());
        assert!(session.has_photo());
    }

    #[tokio::test]
    async fn test_refresh_description_propagates_failure_untouched() {
        let wizard = wizard_with(
            MockVisionClient::new()
                .with_description("first pass".to_string())
                .with_failure("flaky".to_string()),
            MockPoemClient::new(),
            MockArtworkClient::new(),
            MockSpeechClient::new(),
        );

        wizard.provide_photo(test_photo()).await.unwrap();
        assert_eq!(wizard.session().description, "first pass");

        let err = wizard.refresh_description().await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
        assert_eq!(wizard.session().description, "first pass");
    }

    #[tokio::test]
    async fn test_generate_blocks_on_blank_description() {
        let wizard = default_wizard();
        wizard.skip_photo().unwrap();

        let err = wizard.generate_poem().await.unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
        assert_eq!(wizard.step(), WizardStep::Customize);
    }

    #[tokio::test]
    async fn test_poem_failure_leaves_session_on_customize() {
        let wizard = wizard_with(
            MockVisionClient::new(),
            MockPoemClient::new().with_failure("quota exceeded".to_string()),
            MockArtworkClient::new(),
            MockSpeechClient::new(),
        );
        wizard.skip_photo().unwrap();
        wizard.set_description("dawn over the harbor").unwrap();

        let err = wizard.generate_poem().await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));

        let session = wizard.session();
        assert_eq!(session.step, WizardStep::Customize);
        assert!(session.poem.is_none());
        assert!(session.narration.is_none());
    }

    #[tokio::test]
    async fn test_randomize_preserves_custom_fields_byte_for_byte() {
        let wizard = default_wizard();
        wizard.set_settings(PoemSettings {
            custom_instruction: Some("mention the  sea \u{00A0}exactly".to_string()),
            poetic_device: Some("assonance".to_string()),
            ..PoemSettings::default()
        });

        for _ in 0..16 {
            let settings = wizard.randomize_settings();
            assert_eq!(
                settings.custom_instruction.as_deref(),
                Some("mention the  sea \u{00A0}exactly")
            );
            assert_eq!(settings.poetic_device.as_deref(), Some("assonance"));
            assert!(PoemLanguage::ALL.contains(&settings.language));
            assert!(PoemStyle::ALL.contains(&settings.style));
            assert!(PoemTone::ALL.contains(&settings.tone));
            assert!(PoemLength::ALL.contains(&settings.length));
        }
    }

    #[tokio::test]
    async fn test_reset_settings_restores_defaults() {
        let wizard = default_wizard();
        wizard.set_settings(PoemSettings {
            language: PoemLanguage::Hindi,
            custom_instruction: Some("mention the sea".to_string()),
            ..PoemSettings::default()
        });

        wizard.reset_settings();
        assert_eq!(wizard.session().settings, PoemSettings::default());
    }

    #[tokio::test]
    async fn test_back_from_customize_returns_to_describe_with_photo() {
        let wizard = default_wizard();
        wizard.provide_photo(test_photo()).await.unwrap();
        wizard.confirm_description("a scene").unwrap();

        wizard.back();
        let session = wizard.session();
        assert_eq!(session.step, WizardStep::Describe);
        assert!(session.has_photo());
        assert_eq!(session.description, "a scene");
    }

    #[tokio::test]
    async fn test_back_from_customize_without_photo_resets() {
        let wizard = default_wizard();
        wizard.skip_photo().unwrap();
        wizard.set_description("dawn over the harbor").unwrap();

        wizard.back();
        let session = wizard.session();
        assert_eq!(session.step, WizardStep::Upload);
        assert!(session.description.is_empty());
    }

    #[tokio::test]
    async fn test_stale_enhancement_does_not_revive_reset_session() {
        let wizard = wizard_with(
            MockVisionClient::new(),
            MockPoemClient::new(),
            MockArtworkClient::new().with_delay(Duration::from_millis(50)),
            MockSpeechClient::new().with_delay(Duration::from_millis(50)),
        );
        wizard.skip_photo().unwrap();
        wizard.set_description("dawn over the harbor").unwrap();

        wizard.generate_poem().await.unwrap();
        // Reset while both enhancements are still in flight.
        wizard.start_over();
        wizard.await_enhancements().await;

        let session = wizard.session();
        assert_eq!(session.step, WizardStep::Upload);
        assert!(session.narration.is_none());
        assert!(session.artwork.is_none());
        assert!(session.poem.is_none());
    }
}
