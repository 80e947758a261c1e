/// Extract the sample rate from a PCM response mime such as
/// `audio/L16;codec=pcm;rate=24000`. Falls back to the speech model's
/// default rate when the parameter is absent or unparsable.
pub fn pcm_sample_rate(mime: &str) -> u32 {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
        .unwrap_or(crate::audio::DEFAULT_SAMPLE_RATE)
}
