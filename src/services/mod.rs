pub mod audio;
pub mod cache;
pub mod llm;
pub mod tts;
