use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

/// Append-only audit record. Never mutated or deleted; written on meeting
/// creation and participant join, consumed only by readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingEvent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub meeting_id: ObjectId,
    pub event_type: String,
    #[serde(default)]
    pub payload: Document,
    pub created_at: DateTime,
}

impl MeetingEvent {
    pub const COLLECTION: &'static str = "meeting_events";

    pub const MEETING_CREATED: &'static str = "MEETING_CREATED";
    pub const USER_JOINED: &'static str = "USER_JOINED";
}
