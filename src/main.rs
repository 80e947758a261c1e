use anyhow::Result;
use clap::Parser;
use photoverse::app::{App, RunRequest};
use photoverse::models::{PoemLanguage, PoemLength, PoemSettings, PoemStyle, PoemTone};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "photoverse")]
#[command(about = "Turn a photo or a text idea into an AI-generated poem")]
struct CliArgs {
    /// Photo to start from; omit to start from --prompt text instead.
    #[arg(value_name = "PHOTO")]
    photo: Option<PathBuf>,

    /// Description or subject for the poem. With a photo, this is the manual
    /// fallback used when AI description fails.
    #[arg(short, long)]
    prompt: Option<String>,

    /// Poem language (English, Hindi, Hinglish).
    #[arg(long, value_parser = parse_language)]
    language: Option<PoemLanguage>,

    /// Poetic style (e.g. Haiku, Free Verse, Sonnet).
    #[arg(long, value_parser = parse_style)]
    style: Option<PoemStyle>,

    /// Tone/mood (e.g. Joyful, Calm, Melancholic).
    #[arg(long, value_parser = parse_tone)]
    tone: Option<PoemTone>,

    /// Length tier (Short, Medium, Long).
    #[arg(long, value_parser = parse_length)]
    length: Option<PoemLength>,

    /// Custom instruction, e.g. "focus on the monsoon rain".
    #[arg(long)]
    instruction: Option<String>,

    /// Poetic-device hint, e.g. "alliteration".
    #[arg(long)]
    device: Option<String>,

    /// Randomize language/style/tone/length before generating.
    #[arg(long)]
    randomize: bool,
}

fn parse_language(input: &str) -> std::result::Result<PoemLanguage, String> {
    PoemLanguage::from_str(input)
}

fn parse_style(input: &str) -> std::result::Result<PoemStyle, String> {
    PoemStyle::from_str(input)
}

fn parse_tone(input: &str) -> std::result::Result<PoemTone, String> {
    PoemTone::from_str(input)
}

fn parse_length(input: &str) -> std::result::Result<PoemLength, String> {
    PoemLength::from_str(input)
}

impl CliArgs {
    fn settings(&self) -> PoemSettings {
        let mut settings = PoemSettings::default();
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(style) = self.style {
            settings.style = style;
        }
        if let Some(tone) = self.tone {
            settings.tone = tone;
        }
        if let Some(length) = self.length {
            settings.length = length;
        }
        settings.custom_instruction = self.instruction.clone();
        settings.poetic_device = self.device.clone();
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoverse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting photoverse");

    let args = CliArgs::parse();
    let request = RunRequest {
        photo: args.photo.clone(),
        prompt: args.prompt.clone(),
        settings: args.settings(),
        randomize: args.randomize,
    };

    match App::new() {
        Ok(app) => match app.run(request).await {
            Ok(_) => {
                info!("Session completed successfully");
                Ok(())
            }
            Err(e) => {
                error!("Session failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
