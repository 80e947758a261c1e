use photoverse::{
    ai::{MockArtworkClient, MockPoemClient, MockSpeechClient, MockVisionClient},
    media::DataUri,
    models::{PoemLanguage, PoemLength, PoemSettings, PoemStyle, PoemTone, Session, WizardStep},
    wizard::{DescribeOutcome, Wizard, WizardServices},
    Error,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const BICYCLE_DESCRIPTION: &str = "A red bicycle leaning against a brick wall";

fn build_wizard(
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

fn test_photo() -> DataUri {
    DataUri::encode("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02])
}

fn haiku_settings() -> PoemSettings {
    PoemSettings {
        language: PoemLanguage::English,
        style: PoemStyle::Haiku,
        tone: PoemTone::Calm,
        length: PoemLength::Short,
        custom_instruction: None,
        poetic_device: None,
    }
}

#[tokio::test]
async fn test_photo_flow_reaches_display_with_narration_but_no_artwork() {
    let artwork = MockArtworkClient::new();
    let artwork_probe = artwork.clone();

    let wizard = build_wizard(
        MockVisionClient::new().with_description(BICYCLE_DESCRIPTION.to_string()),
        MockPoemClient::new().with_poem("Red frame on warm brick".to_string()),
        artwork,
        MockSpeechClient::new(),
    );

    let outcome = wizard.provide_photo(test_photo()).await.unwrap();
    assert!(matches!(outcome, DescribeOutcome::Described));
    assert_eq!(wizard.session().description, BICYCLE_DESCRIPTION);

    // Confirm the AI description unmodified.
    wizard.confirm_description(BICYCLE_DESCRIPTION).unwrap();
    wizard.set_settings(haiku_settings());

    let poem = wizard.generate_poem().await.unwrap();
    assert!(!poem.trim().is_empty());

    wizard.await_enhancements().await;

    let session = wizard.session();
    assert_eq!(session.step, WizardStep::Display);
    assert_eq!(session.poem.as_deref(), Some("Red frame on warm brick"));
    assert!(session.narration.is_some());

    // The artwork enhancement only exists to stand in for a missing photo.
    assert!(session.artwork.is_none());
    assert_eq!(artwork_probe.call_count(), 0);
    assert!(session.source_image.is_some() != session.artwork.is_some());
}

#[tokio::test]
async fn test_text_first_flow_generates_artwork_and_narration() {
    let wizard = build_wizard(
        MockVisionClient::new(),
        MockPoemClient::new(),
        MockArtworkClient::new(),
        MockSpeechClient::new(),
    );

    wizard.skip_photo().unwrap();
    assert_eq!(wizard.session().step, WizardStep::Customize);
    assert!(wizard.session().description.is_empty());

    wizard.set_description("dawn over the harbor").unwrap();
    wizard.generate_poem().await.unwrap();
    wizard.await_enhancements().await;

    let session = wizard.session();
    assert_eq!(session.step, WizardStep::Display);
    assert!(session.poem.is_some());
    assert!(session.narration.is_some());
    assert!(session.artwork.is_some());
    assert!(session.source_image.is_none());
}

#[tokio::test]
async fn test_empty_description_blocks_generation_without_network() {
    let poem = MockPoemClient::new();
    let poem_probe = poem.clone();
    let speech = MockSpeechClient::new();
    let speech_probe = speech.clone();

    let wizard = build_wizard(
        MockVisionClient::new(),
        poem,
        MockArtworkClient::new(),
        speech,
    );

    wizard.skip_photo().unwrap();
    wizard.set_description("   ").unwrap();

    let err = wizard.generate_poem().await.unwrap_err();
    assert!(matches!(err, Error::EmptyInput(_)));

    let session = wizard.session();
    assert_eq!(session.step, WizardStep::Customize);
    assert!(session.poem.is_none());
    assert_eq!(poem_probe.call_count(), 0);
    assert_eq!(speech_probe.call_count(), 0);
}

#[tokio::test]
async fn test_start_over_restores_every_field() {
    let wizard = build_wizard(
        MockVisionClient::new().with_description(BICYCLE_DESCRIPTION.to_string()),
        MockPoemClient::new(),
        MockArtworkClient::new(),
        MockSpeechClient::new(),
    );

    wizard.provide_photo(test_photo()).await.unwrap();
    wizard.confirm_description(BICYCLE_DESCRIPTION).unwrap();
    wizard.set_settings(PoemSettings {
        custom_instruction: Some("mention rust on the chain".to_string()),
        ..haiku_settings()
    });
    wizard.generate_poem().await.unwrap();
    wizard.await_enhancements().await;

    wizard.start_over();

    let session = wizard.session();
    let defaults = Session::default();
    assert_eq!(session.step, defaults.step);
    assert_eq!(session.source_image, defaults.source_image);
    assert_eq!(session.description, defaults.description);
    assert_eq!(session.settings, defaults.settings);
    assert_eq!(session.poem, defaults.poem);
    assert_eq!(session.artwork, defaults.artwork);
    assert_eq!(session.narration, defaults.narration);
    // Only the generation token survives, and it only ever grows.
    assert!(session.generation > defaults.generation);
}

#[tokio::test]
async fn test_regenerate_never_mixes_new_poem_with_stale_enhancements() {
    let first_artwork = DataUri::encode("image/png", &[0x89, 0x50, 0x4E, 0x47, 0x01]);
    let second_artwork = DataUri::encode("image/png", &[0x89, 0x50, 0x4E, 0x47, 0x02]);

    let wizard = build_wizard(
        MockVisionClient::new(),
        MockPoemClient::new()
            .with_poem("first verse".to_string())
            .with_poem("second verse".to_string()),
        MockArtworkClient::new()
            .with_artwork(first_artwork.clone())
            .with_artwork(second_artwork.clone()),
        // Narration succeeds the first time and fails on the regenerate.
        MockSpeechClient::new()
            .with_narration(DataUri::encode("audio/wav", &[1, 2, 3, 4]))
            .with_failure("speech model offline".to_string()),
    );

    wizard.skip_photo().unwrap();
    wizard.set_description("dawn over the harbor").unwrap();
    wizard.generate_poem().await.unwrap();
    wizard.await_enhancements().await;

    let session = wizard.session();
    assert_eq!(session.poem.as_deref(), Some("first verse"));
    assert_eq!(session.artwork.as_ref(), Some(&first_artwork));
    assert!(session.narration.is_some());

    let poem = wizard.regenerate().await.unwrap();
    assert_eq!(poem, "second verse");

    // Before the new enhancements land, the old ones must already be gone.
    wizard.await_enhancements().await;
    let session = wizard.session();
    assert_eq!(session.poem.as_deref(), Some("second verse"));
    assert_eq!(session.artwork.as_ref(), Some(&second_artwork));
    // The failed narration leaves its field unset rather than stale.
    assert!(session.narration.is_none());
    assert_eq!(session.step, WizardStep::Display);
}

#[tokio::test]
async fn test_enhancement_failures_do_not_affect_the_poem() {
    let wizard = build_wizard(
        MockVisionClient::new(),
        MockPoemClient::new().with_poem("a verse".to_string()),
        MockArtworkClient::new().with_failure("image model offline".to_string()),
        MockSpeechClient::new().with_failure("speech model offline".to_string()),
    );

    wizard.skip_photo().unwrap();
    wizard.set_description("dawn over the harbor").unwrap();
    wizard.generate_poem().await.unwrap();
    wizard.await_enhancements().await;

    let session = wizard.session();
    assert_eq!(session.step, WizardStep::Display);
    assert_eq!(session.poem.as_deref(), Some("a verse"));
    assert!(session.artwork.is_none());
    assert!(session.narration.is_none());
}

#[tokio::test]
async fn test_back_from_display_keeps_description_and_settings() {
    let settings = PoemSettings {
        custom_instruction: Some("keep it short".to_string()),
        ..haiku_settings()
    };

    let wizard = build_wizard(
        MockVisionClient::new(),
        MockPoemClient::new(),
        MockArtworkClient::new(),
        MockSpeechClient::new(),
    );

    wizard.skip_photo().unwrap();
    wizard.set_description("dawn over the harbor").unwrap();
    wizard.set_settings(settings.clone());
    wizard.generate_poem().await.unwrap();
    wizard.await_enhancements().await;

    wizard.back();

    let session = wizard.session();
    assert_eq!(session.step, WizardStep::Customize);
    assert_eq!(session.description, "dawn over the harbor");
    assert_eq!(session.settings, settings);
    assert!(session.poem.is_none());
    assert!(session.artwork.is_none());
    assert!(session.narration.is_none());
}

#[tokio::test]
async fn test_randomize_only_touches_the_enumerated_fields() {
    let wizard = build_wizard(
        MockVisionClient::new(),
        MockPoemClient::new(),
        MockArtworkClient::new(),
        MockSpeechClient::new(),
    );

    let instruction = "weave in the word \"lighthouse\"".to_string();
    wizard.set_settings(PoemSettings {
        custom_instruction: Some(instruction.clone()),
        poetic_device: Some("enjambment".to_string()),
        ..PoemSettings::default()
    });

    for _ in 0..8 {
        let settings = wizard.randomize_settings();
        assert!(PoemLanguage::ALL.contains(&settings.language));
        assert!(PoemStyle::ALL.contains(&settings.style));
        assert!(PoemTone::ALL.contains(&settings.tone));
        assert!(PoemLength::ALL.contains(&settings.length));
        assert_eq!(settings.custom_instruction.as_deref(), Some(instruction.as_str()));
        assert_eq!(settings.poetic_device.as_deref(), Some("enjambment"));
    }
}

#[tokio::test]
async fn test_audio_rejects_whitespace_before_calling_the_provider() {
    let speech = MockSpeechClient::new();
    let speech_probe = speech.clone();

    let err = photoverse::ai::SpeechService::synthesize_speech(&speech, "  \n ")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyInput(_)));
    assert_eq!(speech_probe.call_count(), 0);
}
