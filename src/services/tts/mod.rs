pub mod gemini;

use crate::error::GeminiApiError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Rate assumed when the service does not state one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

static RATE_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"rate=(\d+)").unwrap());

/// Extracts the `rate=` parameter of an audio MIME type such as
/// `audio/L16;codec=pcm;rate=24000`.
pub fn parse_sample_rate(mime_type: &str) -> Option<u32> {
    RATE_PARAM
        .captures(mime_type)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|rate| *rate > 0)
}

pub fn sample_rate_or_default(mime_type: &str) -> u32 {
    parse_sample_rate(mime_type).unwrap_or_else(|| {
        warn!(
            "No usable sample rate in MIME type '{}', assuming {} Hz",
            mime_type, DEFAULT_SAMPLE_RATE
        );
        DEFAULT_SAMPLE_RATE
    })
}

/// User-facing text for a failed synthesis call.
pub fn describe_tts_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<GeminiApiError>() {
        Some(api) => format!("TTS API Error: {}", api),
        None => format!("An unexpected error occurred during TTS call: {:#}", err),
    }
}
