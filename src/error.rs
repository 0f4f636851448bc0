//! Error types shared across the pipeline stages.

use thiserror::Error;

/// Precondition failures of the WAV container encoder and header parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WavError {
    #[error("Sample rate must be a positive integer")]
    ZeroSampleRate,

    #[error("Channel count must be a positive integer")]
    ZeroChannels,

    #[error("Unsupported bit depth: {0} (must be a positive multiple of 8)")]
    UnsupportedBitDepth(u16),

    #[error("PCM buffer of {len} bytes is not a whole number of {block_align}-byte frames")]
    PartialFrame { len: usize, block_align: u16 },

    #[error("Audio too large for a WAV container: {0}")]
    TooLarge(String),

    #[cfg(test)]
    #[error("Malformed WAV header: {0}")]
    MalformedHeader(&'static str),
}

/// A non-success answer from the Gemini REST API.
///
/// Services return this inside `anyhow::Error` so callers can tell a
/// service-side rejection apart from transport or parsing trouble.
#[derive(Error, Debug, Clone)]
#[error("{status} {body}")]
pub struct GeminiApiError {
    pub status: u16,
    pub body: String,
}

/// Outcome of a failed pipeline run. The `Display` text is what the user sees.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("దయచేసి మీ ప్రశ్నను తెలుగులో టైప్ చేయండి.")]
    EmptyUtterance,

    #[error("{message}")]
    Reply { message: String },

    #[error("{message}")]
    Speech { message: String, reply: String },

    #[error("Audio encoding error: {source}")]
    Encode { source: WavError, reply: String },
}

impl PipelineError {
    /// The generated reply, when the run got far enough to produce one.
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::Speech { reply, .. } | Self::Encode { reply, .. } => Some(reply.as_str()),
            _ => None,
        }
    }
}
