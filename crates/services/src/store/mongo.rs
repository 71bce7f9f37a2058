use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use medimeet_db::models::{
    Meeting, MeetingEvent, Participant, ParticipantRole, Recording, RecordingStatus,
};
use mongodb::Database;
use tracing::{debug, warn};

use super::base::{BaseDao, StoreError, StoreResult};
use super::{CreatedMeeting, MeetingStore, RecordingUpdate};

/// Room-name collisions are uuid collisions, so one retry is already
/// paranoid; a handful guards against a misbehaving prefix.
const ROOM_NAME_ATTEMPTS: usize = 5;

pub struct MongoMeetingStore {
    meetings: BaseDao<Meeting>,
    participants: BaseDao<Participant>,
    recordings: BaseDao<Recording>,
    events: BaseDao<MeetingEvent>,
    room_prefix: String,
}

impl MongoMeetingStore {
    pub fn new(db: &Database, room_prefix: impl Into<String>) -> Self {
        Self {
            meetings: BaseDao::new(db, Meeting::COLLECTION),
            participants: BaseDao::new(db, Participant::COLLECTION),
            recordings: BaseDao::new(db, Recording::COLLECTION),
            events: BaseDao::new(db, MeetingEvent::COLLECTION),
            room_prefix: room_prefix.into(),
        }
    }

    fn active_filter(meeting_id: ObjectId) -> Document {
        let active: Vec<&str> = RecordingStatus::ACTIVE.iter().map(|s| s.as_str()).collect();
        doc! { "meeting_id": meeting_id, "status": { "$in": active } }
    }
}

#[async_trait]
impl MeetingStore for MongoMeetingStore {
    async fn create_meeting(
        &self,
        medic_id: &str,
        patient_id: &str,
    ) -> StoreResult<CreatedMeeting> {
        let now = DateTime::now();

        let mut meeting_id = None;
        let mut room_name = String::new();
        for attempt in 1..=ROOM_NAME_ATTEMPTS {
            room_name = format!("{}-{}", self.room_prefix, uuid::Uuid::new_v4());
            let meeting = Meeting {
                id: None,
                room_name: room_name.clone(),
                created_at: now,
            };
            match self.meetings.insert_one(&meeting).await {
                Ok(id) => {
                    meeting_id = Some(id);
                    break;
                }
                Err(StoreError::Conflict(_)) => {
                    warn!(attempt, %room_name, "Room name collision, regenerating");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        let meeting_id = meeting_id.ok_or_else(|| {
            StoreError::Conflict("Could not allocate a unique room name".to_string())
        })?;

        for (user_id, role) in [
            (medic_id, ParticipantRole::Medic),
            (patient_id, ParticipantRole::Patient),
        ] {
            let participant = Participant {
                id: None,
                meeting_id,
                user_id: user_id.to_string(),
                role,
                created_at: now,
            };
            self.participants.insert_one(&participant).await?;
        }

        self.append_event(
            meeting_id,
            MeetingEvent::MEETING_CREATED,
            doc! { "medicId": medic_id, "patientId": patient_id },
        )
        .await?;

        debug!(%room_name, "Meeting created");

        Ok(CreatedMeeting {
            meeting: self.meetings.find_by_id(meeting_id).await?,
            participants: self.list_participants(meeting_id).await?,
        })
    }

    async fn get_meeting(&self, meeting_id: ObjectId) -> StoreResult<Meeting> {
        self.meetings.find_by_id(meeting_id).await
    }

    async fn find_meeting_for_participant(
        &self,
        meeting_id: ObjectId,
        user_id: &str,
    ) -> StoreResult<(Meeting, Participant)> {
        let participant = self
            .participants
            .find_one(doc! { "meeting_id": meeting_id, "user_id": user_id })
            .await?
            .ok_or(StoreError::NotFound)?;
        let meeting = self.meetings.find_by_id(meeting_id).await?;
        Ok((meeting, participant))
    }

    async fn list_participants(&self, meeting_id: ObjectId) -> StoreResult<Vec<Participant>> {
        self.participants
            .find_many(
                doc! { "meeting_id": meeting_id },
                Some(doc! { "created_at": 1 }),
                None,
            )
            .await
    }

    async fn list_recordings(&self, meeting_id: ObjectId) -> StoreResult<Vec<Recording>> {
        self.recordings
            .find_many(
                doc! { "meeting_id": meeting_id },
                Some(doc! { "started_at": -1 }),
                None,
            )
            .await
    }

    async fn find_recording(&self, recording_id: ObjectId) -> StoreResult<Recording> {
        self.recordings.find_by_id(recording_id).await
    }

    async fn find_active_recording(
        &self,
        meeting_id: ObjectId,
    ) -> StoreResult<Option<Recording>> {
        self.recordings
            .find_one(Self::active_filter(meeting_id))
            .await
    }

    async fn create_recording(&self, meeting_id: ObjectId) -> StoreResult<Recording> {
        // Friendly pre-check; the partial unique index on active recordings
        // is what actually makes check-and-insert atomic across instances.
        if self.find_active_recording(meeting_id).await?.is_some() {
            return Err(StoreError::Conflict(
                "A recording is already active for this meeting".to_string(),
            ));
        }

        let recording = Recording {
            id: None,
            meeting_id,
            status: RecordingStatus::Starting,
            file_path: None,
            size: None,
            duration: None,
            hash: None,
            error_message: None,
            started_at: DateTime::now(),
            ended_at: None,
        };

        let id = self.recordings.insert_one(&recording).await.map_err(|e| {
            match e {
                StoreError::Conflict(_) => StoreError::Conflict(
                    "A recording is already active for this meeting".to_string(),
                ),
                other => other,
            }
        })?;
        self.recordings.find_by_id(id).await
    }

    async fn update_recording_status(
        &self,
        recording_id: ObjectId,
        expected: RecordingStatus,
        new_status: RecordingStatus,
        fields: RecordingUpdate,
    ) -> StoreResult<Recording> {
        let mut set = doc! { "status": new_status.as_str() };
        if let Some(file_path) = fields.file_path {
            set.insert("file_path", file_path);
        }
        if let Some(size) = fields.size {
            set.insert("size", size as i64);
        }
        if let Some(duration) = fields.duration {
            set.insert("duration", duration as i32);
        }
        if let Some(hash) = fields.hash {
            set.insert("hash", hash);
        }
        if let Some(error_message) = fields.error_message {
            set.insert("error_message", error_message);
        }
        if let Some(ended_at) = fields.ended_at {
            set.insert("ended_at", ended_at);
        }

        let updated = self
            .recordings
            .find_one_and_update(
                doc! { "_id": recording_id, "status": expected.as_str() },
                doc! { "$set": set },
            )
            .await?;

        match updated {
            Some(recording) => Ok(recording),
            // Distinguish a vanished row from a lost race on status.
            None => match self.recordings.find_by_id(recording_id).await {
                Ok(current) => Err(StoreError::Conflict(format!(
                    "Recording status is {}, expected {}",
                    current.status.as_str(),
                    expected.as_str()
                ))),
                Err(StoreError::NotFound) => Err(StoreError::NotFound),
                Err(e) => Err(e),
            },
        }
    }

    async fn recent_events(
        &self,
        meeting_id: ObjectId,
        limit: i64,
    ) -> StoreResult<Vec<MeetingEvent>> {
        self.events
            .find_many(
                doc! { "meeting_id": meeting_id },
                Some(doc! { "created_at": -1 }),
                Some(limit),
            )
            .await
    }

    async fn append_event(
        &self,
        meeting_id: ObjectId,
        event_type: &str,
        payload: Document,
    ) -> StoreResult<()> {
        let event = MeetingEvent {
            id: None,
            meeting_id,
            event_type: event_type.to_string(),
            payload,
            created_at: DateTime::now(),
        };
        self.events.insert_one(&event).await?;
        Ok(())
    }
}
