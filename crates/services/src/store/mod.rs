pub mod base;
pub mod mongo;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime, Document};
use medimeet_db::models::{Meeting, MeetingEvent, Participant, Recording, RecordingStatus};

pub use base::{StoreError, StoreResult};
pub use mongo::MongoMeetingStore;

/// A meeting together with the two participants created alongside it.
#[derive(Debug, Clone)]
pub struct CreatedMeeting {
    pub meeting: Meeting,
    pub participants: Vec<Participant>,
}

/// Optional fields applied together with a status transition.
#[derive(Debug, Clone, Default)]
pub struct RecordingUpdate {
    pub file_path: Option<String>,
    pub size: Option<u64>,
    pub duration: Option<u32>,
    pub hash: Option<String>,
    pub error_message: Option<String>,
    pub ended_at: Option<DateTime>,
}

/// Durable state for meetings, participants, recordings and the append-only
/// event log. The implementation, not its callers, is responsible for the
/// at-most-one-active-recording invariant and for conditional status
/// transitions, so that multiple service instances stay correct.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Creates a meeting with a fresh `<prefix>-<uuid>` room name plus its
    /// medic and patient participants. A room-name collision is retried with
    /// a new uuid internally, never surfaced.
    async fn create_meeting(
        &self,
        medic_id: &str,
        patient_id: &str,
    ) -> StoreResult<CreatedMeeting>;

    async fn get_meeting(&self, meeting_id: ObjectId) -> StoreResult<Meeting>;

    /// Access-scoped lookup: succeeds only when `user_id` is a participant of
    /// the meeting. Used for token issuance and the read API so access
    /// control lives at the data layer.
    async fn find_meeting_for_participant(
        &self,
        meeting_id: ObjectId,
        user_id: &str,
    ) -> StoreResult<(Meeting, Participant)>;

    async fn list_participants(&self, meeting_id: ObjectId) -> StoreResult<Vec<Participant>>;

    async fn list_recordings(&self, meeting_id: ObjectId) -> StoreResult<Vec<Recording>>;

    async fn find_recording(&self, recording_id: ObjectId) -> StoreResult<Recording>;

    async fn find_active_recording(&self, meeting_id: ObjectId)
        -> StoreResult<Option<Recording>>;

    /// Creates a recording in `Starting`. Fails with `Conflict` when an
    /// active recording already exists; the existence check and the insert
    /// are atomic.
    async fn create_recording(&self, meeting_id: ObjectId) -> StoreResult<Recording>;

    /// Conditional transition keyed on the current status. `Conflict` when
    /// the persisted status no longer matches `expected` (lost race),
    /// `NotFound` when the recording does not exist.
    async fn update_recording_status(
        &self,
        recording_id: ObjectId,
        expected: RecordingStatus,
        new_status: RecordingStatus,
        fields: RecordingUpdate,
    ) -> StoreResult<Recording>;

    /// Newest-first slice of the meeting's event log.
    async fn recent_events(
        &self,
        meeting_id: ObjectId,
        limit: i64,
    ) -> StoreResult<Vec<MeetingEvent>>;

    async fn append_event(
        &self,
        meeting_id: ObjectId,
        event_type: &str,
        payload: Document,
    ) -> StoreResult<()>;
}
