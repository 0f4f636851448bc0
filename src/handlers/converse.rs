use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use base64::{engine::general_purpose, Engine as _};
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::handlers::converse_types::*;
use crate::pipeline::{AUDIO_READY, LLM_FAILED_NOTICE, REPLY_READY, WAV_MIME_TYPE};
use crate::state::AppState;

pub async fn handle_converse(
    State(state): State<AppState>,
    Json(req): Json<ConverseRequest>,
) -> impl IntoResponse {
    match state.pipeline.run(&req.text).await {
        Ok(output) => {
            info!("Returning {} bytes of WAV", output.wav.len());
            let response = ConverseResponse {
                status: REPLY_READY.to_string(),
                reply: output.reply,
                audio: AudioInfo {
                    status: AUDIO_READY.to_string(),
                    mime_type: WAV_MIME_TYPE.to_string(),
                    sample_rate: output.sample_rate,
                    data: general_purpose::STANDARD.encode(&output.wav),
                },
            };
            Json(response).into_response()
        }
        Err(e @ PipelineError::EmptyUtterance) => {
            let failure = ConverseFailure {
                warning: Some(e.to_string()),
                ..Default::default()
            };
            (StatusCode::BAD_REQUEST, Json(failure)).into_response()
        }
        Err(PipelineError::Reply { message }) => {
            // The error text takes the reply's place, followed by the notice.
            let failure = ConverseFailure {
                reply: Some(message),
                error: Some(LLM_FAILED_NOTICE.to_string()),
                ..Default::default()
            };
            (StatusCode::BAD_GATEWAY, Json(failure)).into_response()
        }
        Err(e @ PipelineError::Speech { .. }) => {
            let failure = ConverseFailure {
                reply: e.reply().map(str::to_string),
                error: Some(e.to_string()),
                ..Default::default()
            };
            (StatusCode::BAD_GATEWAY, Json(failure)).into_response()
        }
        Err(e @ PipelineError::Encode { .. }) => {
            warn!("Refusing to return malformed audio: {}", e);
            let failure = ConverseFailure {
                reply: e.reply().map(str::to_string),
                error: Some(e.to_string()),
                ..Default::default()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response()
        }
    }
}
