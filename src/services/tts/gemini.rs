use crate::error::GeminiApiError;
use crate::services::tts::sample_rate_or_default;
use crate::traits::{SpeechAudio, TtsTrait};
use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

pub struct GeminiTts {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,      // e.g. "gemini-2.5-flash-preview-tts"
    voice_name: String, // e.g. "Kore"
    timeout: Duration,
}

impl GeminiTts {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        voice_name: String,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key,
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            voice_name,
            timeout,
        }
    }
}

#[async_trait]
impl TtsTrait for GeminiTts {
    async fn speak(&self, text: &str) -> anyhow::Result<SpeechAudio> {
        info!("Generating Gemini TTS for: '{}' using voice '{}'", text, self.voice_name);

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = json!({
            "contents": [{
                "parts": [{
                    "text": text
                }]
            }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": {
                            "voiceName": self.voice_name
                        }
                    }
                }
            }
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to send request to Gemini TTS")?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            error!("Gemini TTS API error: {}", error_text);
            return Err(GeminiApiError {
                status: status.as_u16(),
                body: error_text,
            }
            .into());
        }

        let json_resp: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse Gemini TTS response")?;

        let inline = &json_resp["candidates"][0]["content"]["parts"][0]["inlineData"];
        let encoded_audio = inline["data"]
            .as_str()
            .context("Invalid response format from Gemini TTS (missing inlineData.data)")?;
        let mime_type = inline["mimeType"].as_str().unwrap_or_default().to_string();

        let pcm = general_purpose::STANDARD
            .decode(encoded_audio)
            .context("Failed to decode base64 audio data")?;

        let sample_rate = sample_rate_or_default(&mime_type);
        info!(
            "Received {} bytes of raw audio from Gemini TTS ({}, {} Hz)",
            pcm.len(),
            mime_type,
            sample_rate
        );

        Ok(SpeechAudio {
            pcm,
            sample_rate,
            mime_type,
        })
    }
}
