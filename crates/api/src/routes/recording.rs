use axum::{Json, extract::State};
use bson::oid::ObjectId;
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};
use medimeet_services::recording::{CompletionNotice, ReportedOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JibriEventRequest {
    pub recording_id: String,
    pub meeting_id: Option<String>,
    pub status: String,
    pub file_path: Option<String>,
    pub error: Option<String>,
}

/// Completion webhook from the recording agent. Always answers 200 once the
/// notice references a known recording, even when the artifact turns out to
/// be bad; see `WebhookReconciler::handle_completion`.
pub async fn jibri_events(
    State(state): State<AppState>,
    Json(body): Json<JibriEventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let recording_id = ObjectId::parse_str(&body.recording_id)
        .map_err(|_| ApiError::BadRequest("Unknown recording".to_string()))?;

    let outcome = match body.status.as_str() {
        "FINISHED" => ReportedOutcome::Finished,
        "FAILED" => ReportedOutcome::Failed,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unsupported recording status: {other}"
            )));
        }
    };

    state
        .reconciler
        .handle_completion(CompletionNotice {
            recording_id,
            outcome,
            file_path: body.file_path,
            error: body.error,
        })
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
