pub const DESCRIBE_SYSTEM: &str = include_str!("../data/prompts/describe_system.txt");
pub const DESCRIBE_USER: &str = include_str!("../data/prompts/describe_user.txt");
pub const POEM: &str = include_str!("../data/prompts/poem.txt");
pub const POEM_CUSTOM_INSTRUCTION: &str = include_str!("../data/prompts/poem_custom_instruction.txt");
pub const POEM_POETIC_DEVICE: &str = include_str!("../data/prompts/poem_poetic_device.txt");
pub const ARTWORK: &str = include_str!("../data/prompts/artwork.txt");

use crate::models::PoemSettings;

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Render the full poem instruction from a description and settings.
///
/// The optional custom instruction and poetic-device hint become extra
/// paragraphs ahead of the description; blank values are skipped entirely.
pub fn poem_instruction(description: &str, settings: &PoemSettings) -> String {
    let mut extras = String::new();

    if let Some(instruction) = settings
        .custom_instruction
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        extras.push_str(&render(
            POEM_CUSTOM_INSTRUCTION,
            &[("instruction", instruction)],
        ));
        extras.push('\n');
    }

    if let Some(device) = settings
        .poetic_device
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        extras.push_str(&render(POEM_POETIC_DEVICE, &[("device", device)]));
        extras.push('\n');
    }

    let language = settings.language.to_string();
    let style = settings.style.to_string();
    let tone = settings.tone.to_string();
    let length = settings.length.to_string();

    render(
        POEM,
        &[
            ("language", language.as_str()),
            ("style", style.as_str()),
            ("tone", tone.as_str()),
            ("length", length.as_str()),
            ("extras", extras.as_str()),
            ("description", description),
        ],
    )
}
