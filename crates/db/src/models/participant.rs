use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub meeting_id: ObjectId,
    /// External user identity; uniqueness of (meeting_id, user_id) is
    /// index-enforced.
    pub user_id: String,
    pub role: ParticipantRole,
    pub created_at: DateTime,
}

/// Role is fixed at creation and determines moderator privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Medic,
    Patient,
}

impl ParticipantRole {
    pub fn is_moderator(self) -> bool {
        matches!(self, ParticipantRole::Medic)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantRole::Medic => "MEDIC",
            ParticipantRole::Patient => "PATIENT",
        }
    }
}

impl Participant {
    pub const COLLECTION: &'static str = "participants";
}
