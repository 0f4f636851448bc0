use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::pipeline::Pipeline;
use crate::services::{
    cache::memory::InMemoryCache,
    llm::{gemini::GeminiLlm, reply::ReplyGenerator, TELUGU_INSTRUCTION},
    tts::gemini::GeminiTts,
};
use crate::traits::{CacheTrait, LlmTrait, TtsTrait};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let gemini = &config.gemini;
        let timeout = Duration::from_secs(gemini.timeout_secs);
        let instruction = gemini
            .system_instruction
            .clone()
            .unwrap_or_else(|| TELUGU_INSTRUCTION.to_string());

        let llm = Arc::new(GeminiLlm::new(
            gemini.api_key.clone(),
            gemini.base_url.clone(),
            gemini.llm_model.clone(),
            instruction,
            timeout,
        ));
        let tts = Arc::new(GeminiTts::new(
            gemini.api_key.clone(),
            gemini.base_url.clone(),
            gemini.tts_model.clone(),
            gemini.voice_name.clone(),
            timeout,
        ));

        Self::with_services(config, llm, tts)
    }

    /// Wires the pipeline around the given backends.
    pub fn with_services(
        config: ServerConfig,
        llm: Arc<dyn LlmTrait + Send + Sync>,
        tts: Arc<dyn TtsTrait + Send + Sync>,
    ) -> Self {
        let cache: Option<Arc<dyn CacheTrait + Send + Sync>> = if config.cache.enable {
            Some(Arc::new(InMemoryCache::new(config.cache.max_entries)))
        } else {
            None
        };

        let pipeline = Pipeline::new(
            ReplyGenerator::new(llm, cache),
            tts,
            config.pipeline.strict_error_markers,
        );

        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }
}
