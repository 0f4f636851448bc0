use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub gemini: GeminiSettings,
    pub cache: CacheSettings,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub llm_model: String,
    pub tts_model: String,
    pub voice_name: String,
    /// Replaces the built-in Telugu directive when set.
    pub system_instruction: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct CacheSettings {
    pub enable: bool,
    /// 0 keeps every reply.
    pub max_entries: usize,
}

#[derive(Debug, Deserialize)]
pub struct PipelineSettings {
    /// Refuse to speak replies containing "Error" or "లోపం".
    pub strict_error_markers: bool,
}

impl ServerConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_source(config::File::with_name("Settings.toml").required(false))
    }

    /// Defaults, then `source`, then `TELUGU_VOICE__*` environment variables.
    pub fn with_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = Self::defaults()?
            .add_source(source)
            .add_source(config::Environment::with_prefix("TELUGU_VOICE").separator("__"));

        builder.build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("gemini.base_url", "https://generativelanguage.googleapis.com/v1beta")?
            .set_default("gemini.llm_model", "gemini-2.5-flash-preview-05-20")?
            .set_default("gemini.tts_model", "gemini-2.5-flash-preview-tts")?
            .set_default("gemini.voice_name", "Kore")?
            .set_default("gemini.timeout_secs", 30)?
            .set_default("cache.enable", true)?
            .set_default("cache.max_entries", 256)?
            .set_default("pipeline.strict_error_markers", true)
    }
}
