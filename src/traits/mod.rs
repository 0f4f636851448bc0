use async_trait::async_trait;

/// Raw speech returned by a synthesis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    /// Mono 16-bit signed little-endian PCM.
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
    pub mime_type: String,
}

#[async_trait]
pub trait LlmTrait: Send + Sync {
    async fn chat(&self, text: &str) -> anyhow::Result<String>;
}

#[async_trait]
pub trait TtsTrait: Send + Sync {
    async fn speak(&self, text: &str) -> anyhow::Result<SpeechAudio>;
}

/// Reply cache keyed by the exact utterance text.
pub trait CacheTrait: Send + Sync {
    fn get(&self, utterance: &str) -> Option<String>;
    fn insert(&self, utterance: &str, reply: String);
}
