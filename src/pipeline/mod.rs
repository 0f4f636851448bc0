//! Utterance -> reply -> speech -> WAV.
//!
//! Each stage short-circuits the run on failure and nothing downstream of it
//! executes. Runs share no state apart from the reply cache held by the
//! [`ReplyGenerator`].

use crate::error::PipelineError;
use crate::services::audio::wav::{encode_wav, WavFormat};
use crate::services::llm::reply::{contains_error_marker, ReplyGenerator};
use crate::services::tts::describe_tts_error;
use crate::traits::TtsTrait;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const REPLY_READY: &str = "✅ LLM ప్రతిస్పందన సిద్ధంగా ఉంది:";
pub const AUDIO_READY: &str = "🔊 ఆడియో ప్లేబ్యాక్:";
pub const LLM_FAILED_NOTICE: &str = "LLM ప్రాసెసింగ్‌లో లోపం జరిగింది.";
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// A successful run: the reply text and its spoken form as a WAV file.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub reply: String,
    pub wav: Vec<u8>,
    pub sample_rate: u32,
}

pub struct Pipeline {
    replies: ReplyGenerator,
    tts: Arc<dyn TtsTrait + Send + Sync>,
    strict_error_markers: bool,
}

impl Pipeline {
    pub fn new(
        replies: ReplyGenerator,
        tts: Arc<dyn TtsTrait + Send + Sync>,
        strict_error_markers: bool,
    ) -> Self {
        Self {
            replies,
            tts,
            strict_error_markers,
        }
    }

    pub async fn run(&self, utterance: &str) -> Result<PipelineOutput, PipelineError> {
        let run_id = Uuid::new_v4();

        if utterance.trim().is_empty() {
            warn!("[{}] Empty utterance, nothing sent to the LLM", run_id);
            return Err(PipelineError::EmptyUtterance);
        }

        info!("[{}] Generating reply for: {}", run_id, utterance);
        let reply = self.replies.generate_reply(utterance).await?;

        if self.strict_error_markers && contains_error_marker(&reply) {
            warn!("[{}] Reply carries an error marker, stopping before TTS", run_id);
            return Err(PipelineError::Reply { message: reply });
        }

        info!("[{}] Synthesizing {} chars of reply", run_id, reply.chars().count());
        let audio = match self.tts.speak(&reply).await {
            Ok(audio) if audio.pcm.is_empty() => {
                error!("[{}] TTS returned an empty audio payload", run_id);
                return Err(PipelineError::Speech {
                    message: describe_tts_error(&anyhow::anyhow!("empty audio payload")),
                    reply,
                });
            }
            Ok(audio) => {
                info!("[{}] Received {} bytes of {}", run_id, audio.pcm.len(), audio.mime_type);
                audio
            }
            Err(e) => {
                error!("[{}] TTS Error: {:#}", run_id, e);
                return Err(PipelineError::Speech {
                    message: describe_tts_error(&e),
                    reply,
                });
            }
        };

        let wav = match encode_wav(&audio.pcm, WavFormat::mono16(audio.sample_rate)) {
            Ok(wav) => wav,
            Err(source) => {
                error!("[{}] WAV encoding failed: {}", run_id, source);
                return Err(PipelineError::Encode { source, reply });
            }
        };

        info!(
            "[{}] Produced {} bytes of WAV at {} Hz",
            run_id,
            wav.len(),
            audio.sample_rate
        );
        Ok(PipelineOutput {
            reply,
            wav,
            sample_rate: audio.sample_rate,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{GeminiApiError, WavError};
    use crate::services::audio::wav::{WavHeader, WAV_HEADER_LEN};
    use crate::traits::{LlmTrait, SpeechAudio};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct FakeLlm {
        pub reply: Result<String, u16>,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmTrait for FakeLlm {
        async fn chat(&self, _text: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(status) => Err(GeminiApiError {
                    status: *status,
                    body: "boom".to_string(),
                }
                .into()),
            }
        }
    }

    pub(crate) struct FakeTts {
        pub audio: Option<SpeechAudio>,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl TtsTrait for FakeTts {
        async fn speak(&self, _text: &str) -> anyhow::Result<SpeechAudio> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.audio
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Invalid response format from Gemini TTS"))
        }
    }

    pub(crate) fn fakes(
        reply: Result<&str, u16>,
        audio: Option<SpeechAudio>,
    ) -> (Arc<FakeLlm>, Arc<FakeTts>) {
        (
            Arc::new(FakeLlm {
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
            }),
            Arc::new(FakeTts {
                audio,
                calls: AtomicUsize::new(0),
            }),
        )
    }

    pub(crate) fn speech(frames: usize, sample_rate: u32) -> SpeechAudio {
        SpeechAudio {
            pcm: vec![0x10; frames * 2],
            sample_rate,
            mime_type: format!("audio/L16;codec=pcm;rate={}", sample_rate),
        }
    }

    fn pipeline(llm: Arc<FakeLlm>, tts: Arc<FakeTts>, strict: bool) -> Pipeline {
        Pipeline::new(ReplyGenerator::new(llm, None), tts, strict)
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let (llm, tts) = fakes(Ok("నమస్కారం! మీకు ఎలా సహాయం చేయగలను?"), Some(speech(1200, 24000)));
        let output = pipeline(llm, tts, true).run("హలో").await.unwrap();

        assert_eq!(output.reply, "నమస్కారం! మీకు ఎలా సహాయం చేయగలను?");
        assert_eq!(output.sample_rate, 24000);
        assert_eq!(&output.wav[0..4], b"RIFF");
        assert_eq!(output.wav.len(), WAV_HEADER_LEN + 2400);

        let header = WavHeader::parse(&output.wav).unwrap();
        assert_eq!(header.format, WavFormat::mono16(24000));
        assert_eq!(header.data_len, 2400);
    }

    #[tokio::test]
    async fn test_blank_utterance_makes_no_remote_call() {
        for utterance in ["", "   ", "\n\t "] {
            let (llm, tts) = fakes(Ok("unused"), Some(speech(10, 24000)));
            let err = pipeline(llm.clone(), tts.clone(), true)
                .run(utterance)
                .await
                .unwrap_err();

            assert!(matches!(err, PipelineError::EmptyUtterance));
            assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
            assert_eq!(tts.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_reply_failure_skips_tts() {
        let (llm, tts) = fakes(Err(503), Some(speech(10, 24000)));
        let err = pipeline(llm, tts.clone(), true).run("హలో").await.unwrap_err();

        assert!(matches!(err, PipelineError::Reply { .. }));
        assert!(contains_error_marker(&err.to_string()));
        assert_eq!(tts.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_marker_in_reply_stops_when_strict() {
        let (llm, tts) = fakes(Ok("సర్వర్‌లో లోపం ఉంది"), Some(speech(10, 24000)));
        let err = pipeline(llm, tts.clone(), true).run("హలో").await.unwrap_err();
        assert!(matches!(err, PipelineError::Reply { .. }));
        assert_eq!(tts.calls.load(Ordering::SeqCst), 0);

        let (llm, tts) = fakes(Ok("సర్వర్‌లో లోపం ఉంది"), Some(speech(10, 24000)));
        let output = pipeline(llm, tts.clone(), false).run("హలో").await.unwrap();
        assert_eq!(output.reply, "సర్వర్‌లో లోపం ఉంది");
        assert_eq!(tts.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_speech_failure_keeps_reply() {
        let (llm, tts) = fakes(Ok("నమస్కారం"), None);
        let err = pipeline(llm, tts, true).run("హలో").await.unwrap_err();

        assert_eq!(err.reply(), Some("నమస్కారం"));
        assert!(err
            .to_string()
            .starts_with("An unexpected error occurred during TTS call:"));
    }

    #[tokio::test]
    async fn test_empty_audio_is_speech_failure() {
        let (llm, tts) = fakes(Ok("నమస్కారం"), Some(speech(0, 24000)));
        let err = pipeline(llm, tts, true).run("హలో").await.unwrap_err();
        assert!(matches!(err, PipelineError::Speech { .. }));
    }

    #[tokio::test]
    async fn test_partial_frame_is_encode_failure() {
        let mut audio = speech(4, 24000);
        audio.pcm.push(0);
        let (llm, tts) = fakes(Ok("నమస్కారం"), Some(audio));
        let err = pipeline(llm, tts, true).run("హలో").await.unwrap_err();

        match err {
            PipelineError::Encode { source, reply } => {
                assert_eq!(source, WavError::PartialFrame { len: 9, block_align: 2 });
                assert_eq!(reply, "నమస్కారం");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
