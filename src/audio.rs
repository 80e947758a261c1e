//! PCM-to-WAV repackaging for narration audio
//!
//! The speech provider returns raw 16-bit little-endian PCM samples; browsers
//! and media players want a WAV container, so the samples are re-wrapped
//! in memory before being exposed as a playable data URI.

use crate::{Error, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Sample rate the speech model emits when the response mime omits one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Wrap raw little-endian 16-bit PCM samples in a WAV container.
pub fn pcm_to_wav(pcm: &[u8], channels: u16, sample_rate: u32) -> Result<Vec<u8>> {
    if pcm.is_empty() {
        return Err(Error::EmptyInput("no PCM samples to encode".to_string()));
    }
    if pcm.len() % 2 != 0 {
        return Err(Error::Media(format!(
            "PCM buffer length {} is not a whole number of 16-bit samples",
            pcm.len()
        )));
    }

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for sample in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
