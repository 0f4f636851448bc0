use crate::error::{GeminiApiError, PipelineError};
use crate::traits::{CacheTrait, LlmTrait};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Substrings that mark a reply as an error message.
pub const ERROR_MARKERS: [&str; 2] = ["Error", "లోపం"];

pub fn contains_error_marker(text: &str) -> bool {
    ERROR_MARKERS.iter().any(|marker| text.contains(marker))
}

/// User-facing text for a failed generation call.
pub fn describe_llm_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<GeminiApiError>() {
        Some(api) => format!("LLM API Error: {}", api),
        None => format!("An unexpected error occurred during LLM call: {:#}", err),
    }
}

/// Turns an utterance into a Telugu reply, consulting the cache first.
pub struct ReplyGenerator {
    llm: Arc<dyn LlmTrait + Send + Sync>,
    cache: Option<Arc<dyn CacheTrait + Send + Sync>>,
}

impl ReplyGenerator {
    pub fn new(
        llm: Arc<dyn LlmTrait + Send + Sync>,
        cache: Option<Arc<dyn CacheTrait + Send + Sync>>,
    ) -> Self {
        Self { llm, cache }
    }

    pub async fn generate_reply(&self, utterance: &str) -> Result<String, PipelineError> {
        if let Some(reply) = self.cache.as_ref().and_then(|c| c.get(utterance)) {
            debug!("Reply cache hit for '{}'", utterance);
            return Ok(reply);
        }

        match self.llm.chat(utterance).await {
            Ok(reply) => {
                info!("LLM Response: {}", reply);
                if let Some(cache) = &self.cache {
                    cache.insert(utterance, reply.clone());
                }
                Ok(reply)
            }
            Err(e) => {
                error!("LLM Error: {:#}", e);
                Err(PipelineError::Reply {
                    message: describe_llm_error(&e),
                })
            }
        }
    }
}
