use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct ConverseRequest {
    pub text: String,
}

#[derive(Serialize, Debug)]
pub struct ConverseResponse {
    pub status: String,
    pub reply: String,
    pub audio: AudioInfo,
}

#[derive(Serialize, Debug)]
pub struct AudioInfo {
    pub status: String,
    pub mime_type: String,
    pub sample_rate: u32,
    /// Base64 of the complete WAV file.
    pub data: String,
}

#[derive(Serialize, Debug, Default)]
pub struct ConverseFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
