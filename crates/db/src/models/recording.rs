use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub meeting_id: ObjectId,
    pub status: RecordingStatus,
    pub file_path: Option<String>,
    pub size: Option<u64>,
    /// Seconds, as reported by the duration probe.
    pub duration: Option<u32>,
    /// SHA-256 of the artifact, hex encoded.
    pub hash: Option<String>,
    pub error_message: Option<String>,
    pub started_at: DateTime,
    pub ended_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
    Starting,
    Recording,
    Stopping,
    Finished,
    Failed,
}

impl RecordingStatus {
    /// Statuses counted against the one-active-recording-per-meeting limit.
    pub const ACTIVE: [RecordingStatus; 3] = [
        RecordingStatus::Starting,
        RecordingStatus::Recording,
        RecordingStatus::Stopping,
    ];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    /// Terminal recordings never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, RecordingStatus::Finished | RecordingStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordingStatus::Starting => "starting",
            RecordingStatus::Recording => "recording",
            RecordingStatus::Stopping => "stopping",
            RecordingStatus::Finished => "finished",
            RecordingStatus::Failed => "failed",
        }
    }
}

impl Recording {
    pub const COLLECTION: &'static str = "recordings";
}
