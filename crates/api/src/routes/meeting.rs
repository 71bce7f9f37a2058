use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};
use medimeet_db::models::{Meeting, MeetingEvent, Participant, Recording};

/// Number of log entries returned with a meeting read.
const RECENT_EVENTS: i64 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub id: String,
    pub room_name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub id: String,
    pub meeting_id: String,
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingResponse {
    pub id: String,
    pub meeting_id: String,
    pub status: String,
    pub file_path: Option<String>,
    pub size: Option<u64>,
    pub duration: Option<u32>,
    pub hash: Option<String>,
    pub error_message: Option<String>,
    pub started_at: String,
    pub ended_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub meeting_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub medic_id: Option<String>,
    pub patient_id: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (medic_id, patient_id) = match (body.medic_id.as_deref(), body.patient_id.as_deref()) {
        (Some(m), Some(p)) if !m.is_empty() && !p.is_empty() => (m, p),
        _ => {
            return Err(ApiError::BadRequest(
                "medicId and patientId are required".to_string(),
            ));
        }
    };

    let created = state.store.create_meeting(medic_id, patient_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "meeting": meeting_response(&created.meeting),
            "participants": created
                .participants
                .iter()
                .map(participant_response)
                .collect::<Vec<_>>(),
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub meeting_id: Option<String>,
    pub user_id: Option<String>,
}

pub async fn token(
    State(state): State<AppState>,
    Json(body): Json<TokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = body
        .user_id
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;
    let meeting_id = body
        .meeting_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("meetingId is required".to_string()))?;
    let meeting_id = parse_meeting_id(meeting_id)?;

    let issued = state.tokens.issue(meeting_id, user_id).await?;

    Ok(Json(serde_json::json!({
        "token": issued.token,
        "meetingUrl": issued.meeting_url,
        "isModerator": issued.is_moderator,
        "expiresIn": issued.expires_in,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMeetingQuery {
    pub user_id: Option<String>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Query(query): Query<GetMeetingQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = query
        .user_id
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;
    let meeting_id = parse_meeting_id(&meeting_id)?;

    // Access-scoped lookup: an outsider gets the same 404 as a missing
    // meeting.
    let (meeting, _) = state
        .store
        .find_meeting_for_participant(meeting_id, user_id)
        .await?;

    let participants = state.store.list_participants(meeting_id).await?;
    let recordings = state.store.list_recordings(meeting_id).await?;
    let events = state.store.recent_events(meeting_id, RECENT_EVENTS).await?;

    Ok(Json(serde_json::json!({
        "meeting": meeting_response(&meeting),
        "participants": participants.iter().map(participant_response).collect::<Vec<_>>(),
        "recordings": recordings.iter().map(recording_response).collect::<Vec<_>>(),
        "events": events.iter().map(event_response).collect::<Vec<_>>(),
    })))
}

pub async fn start_recording(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let meeting_id = parse_meeting_id(&meeting_id)?;
    let recording = state.controller.start_recording(meeting_id).await?;
    Ok(Json(
        serde_json::json!({ "recording": recording_response(&recording) }),
    ))
}

pub async fn stop_recording(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let meeting_id = parse_meeting_id(&meeting_id)?;
    let recording = state.controller.stop_recording(meeting_id).await?;
    Ok(Json(
        serde_json::json!({ "recording": recording_response(&recording) }),
    ))
}

fn parse_meeting_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid meeting id".to_string()))
}

fn meeting_response(meeting: &Meeting) -> MeetingResponse {
    MeetingResponse {
        id: meeting.id.map(|id| id.to_hex()).unwrap_or_default(),
        room_name: meeting.room_name.clone(),
        created_at: meeting
            .created_at
            .try_to_rfc3339_string()
            .unwrap_or_default(),
    }
}

fn participant_response(participant: &Participant) -> ParticipantResponse {
    ParticipantResponse {
        id: participant.id.map(|id| id.to_hex()).unwrap_or_default(),
        meeting_id: participant.meeting_id.to_hex(),
        user_id: participant.user_id.clone(),
        role: participant.role.as_str().to_string(),
    }
}

fn recording_response(recording: &Recording) -> RecordingResponse {
    RecordingResponse {
        id: recording.id.map(|id| id.to_hex()).unwrap_or_default(),
        meeting_id: recording.meeting_id.to_hex(),
        status: recording.status.as_str().to_ascii_uppercase(),
        file_path: recording.file_path.clone(),
        size: recording.size,
        duration: recording.duration,
        hash: recording.hash.clone(),
        error_message: recording.error_message.clone(),
        started_at: recording
            .started_at
            .try_to_rfc3339_string()
            .unwrap_or_default(),
        ended_at: recording
            .ended_at
            .and_then(|t| t.try_to_rfc3339_string().ok()),
    }
}

fn event_response(event: &MeetingEvent) -> EventResponse {
    EventResponse {
        id: event.id.map(|id| id.to_hex()).unwrap_or_default(),
        meeting_id: event.meeting_id.to_hex(),
        event_type: event.event_type.clone(),
        payload: serde_json::to_value(&event.payload).unwrap_or(serde_json::Value::Null),
        created_at: event
            .created_at
            .try_to_rfc3339_string()
            .unwrap_or_default(),
    }
}
