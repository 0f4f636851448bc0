use crate::error::GeminiApiError;
use crate::traits::LlmTrait;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

pub struct GeminiLlm {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
    system_instruction: String,
    timeout: Duration,
}

impl GeminiLlm {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        system_instruction: String,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key,
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            system_instruction,
            timeout,
        }
    }
}

#[async_trait]
impl LlmTrait for GeminiLlm {
    async fn chat(&self, text: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": text }]
            }],
            "system_instruction": {
                "parts": [{ "text": self.system_instruction }]
            }
        });

        info!("Sending request to Gemini model: {}", self.model);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to send request to Gemini")?;
        info!("Gemini response status: {}", resp.status());

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Gemini API error: {}", error_text);
            return Err(GeminiApiError {
                status: status.as_u16(),
                body: error_text,
            }
            .into());
        }

        let json: Value = resp.json().await.context("Failed to parse Gemini response")?;

        // candidates[0].content.parts[*].text, concatenated
        let parts = json["candidates"][0]["content"]["parts"]
            .as_array()
            .context("Invalid response format from Gemini")?;
        let content: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if content.is_empty() {
            anyhow::bail!("Gemini returned no text parts");
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn llm(server: &MockServer) -> GeminiLlm {
        GeminiLlm::new(
            "test-key".to_string(),
            server.uri(),
            "gemini-test".to_string(),
            "Reply in Telugu.".to_string(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_request_carries_instruction_and_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "హలో"}]}],
                "system_instruction": {"parts": [{"text": "Reply in Telugu."}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "నమస్కారం! "}, {"text": "ఎలా ఉన్నారు?"}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = llm(&server).chat("హలో").await.unwrap();
        assert_eq!(reply, "నమస్కారం! ఎలా ఉన్నారు?");
    }

    #[tokio::test]
    async fn test_api_error_is_typed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
            .mount(&server)
            .await;

        let err = llm(&server).chat("హలో").await.unwrap_err();
        let api = err.downcast_ref::<GeminiApiError>().unwrap();
        assert_eq!(api.status, 429);
        assert_eq!(api.body, "RESOURCE_EXHAUSTED");
    }

    #[tokio::test]
    async fn test_missing_candidates_is_untyped_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = llm(&server).chat("హలో").await.unwrap_err();
        assert!(err.downcast_ref::<GeminiApiError>().is_none());
        assert!(err.to_string().contains("Invalid response format"));
    }
}
