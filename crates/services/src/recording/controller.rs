use bson::{oid::ObjectId, DateTime};
use medimeet_db::models::{Recording, RecordingStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::transport::{RecordingTransport, TransportError};
use crate::store::{MeetingStore, RecordingUpdate, StoreError};

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("A recording is already active for this meeting")]
    AlreadyActive,
    #[error("There is no active recording to stop")]
    NoActiveRecording,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives a recording through Starting → Recording → Stopping → Finished,
/// with Failed absorbing any transport error along the way. State lives in
/// the store; every transition is a conditional write so concurrent calls
/// and webhook deliveries cannot corrupt the lifecycle.
pub struct RecordingController {
    store: Arc<dyn MeetingStore>,
    transport: Arc<dyn RecordingTransport>,
}

impl RecordingController {
    pub fn new(store: Arc<dyn MeetingStore>, transport: Arc<dyn RecordingTransport>) -> Self {
        Self { store, transport }
    }

    /// Starts a recording for the meeting. The recording row is created in
    /// Starting before the agent is contacted; it only becomes Recording
    /// once the transport reported success, so no reader ever sees Recording
    /// ahead of the agent.
    pub async fn start_recording(
        &self,
        meeting_id: ObjectId,
    ) -> Result<Recording, RecordingError> {
        let meeting = self.store.get_meeting(meeting_id).await?;

        if self
            .store
            .find_active_recording(meeting_id)
            .await?
            .is_some()
        {
            return Err(RecordingError::AlreadyActive);
        }

        let recording = match self.store.create_recording(meeting_id).await {
            Ok(recording) => recording,
            // Lost the creation race to a concurrent start.
            Err(StoreError::Conflict(_)) => return Err(RecordingError::AlreadyActive),
            Err(e) => return Err(e.into()),
        };
        let recording_id = persisted_id(&recording)?;

        match self
            .transport
            .start(&meeting.room_name, &recording_id.to_hex())
            .await
        {
            Ok(()) => {
                info!(
                    %meeting_id,
                    %recording_id,
                    transport = self.transport.name(),
                    "Recording start accepted"
                );
                Ok(self
                    .store
                    .update_recording_status(
                        recording_id,
                        RecordingStatus::Starting,
                        RecordingStatus::Recording,
                        RecordingUpdate::default(),
                    )
                    .await?)
            }
            Err(transport_err) => {
                // The Starting row stays behind as Failed: visible history,
                // and the caller still sees the transport error.
                self.mark_failed(recording_id, RecordingStatus::Starting, &transport_err)
                    .await;
                Err(transport_err.into())
            }
        }
    }

    /// Stops the meeting's active recording. The transition to Stopping
    /// happens before the agent is contacted, so a concurrent start (or a
    /// second stop) loses the race at the store instead of reaching the
    /// transport twice.
    pub async fn stop_recording(&self, meeting_id: ObjectId) -> Result<Recording, RecordingError> {
        self.store.get_meeting(meeting_id).await?;

        let active = self
            .store
            .find_active_recording(meeting_id)
            .await?
            .ok_or(RecordingError::NoActiveRecording)?;
        let recording_id = persisted_id(&active)?;

        // A recording already in Stopping belongs to a stop in flight.
        if active.status == RecordingStatus::Stopping {
            return Err(RecordingError::Store(StoreError::Conflict(
                "Recording is already stopping".to_string(),
            )));
        }

        self.store
            .update_recording_status(
                recording_id,
                active.status,
                RecordingStatus::Stopping,
                RecordingUpdate::default(),
            )
            .await?;

        match self.transport.stop(&recording_id.to_hex()).await {
            Ok(()) => {
                info!(
                    %meeting_id,
                    %recording_id,
                    transport = self.transport.name(),
                    "Recording stop accepted"
                );
                match self
                    .store
                    .update_recording_status(
                        recording_id,
                        RecordingStatus::Stopping,
                        RecordingStatus::Finished,
                        RecordingUpdate {
                            ended_at: Some(DateTime::now()),
                            ..Default::default()
                        },
                    )
                    .await
                {
                    Ok(recording) => Ok(recording),
                    Err(StoreError::Conflict(msg)) => {
                        // The completion webhook may have finalized the row
                        // between our transport call and this write.
                        let current = self.store.find_recording(recording_id).await?;
                        if current.status.is_terminal() {
                            Ok(current)
                        } else {
                            Err(StoreError::Conflict(msg).into())
                        }
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(transport_err) => {
                self.mark_failed(recording_id, RecordingStatus::Stopping, &transport_err)
                    .await;
                Err(transport_err.into())
            }
        }
    }

    /// Best-effort Failed transition after a transport error. The transport
    /// error is what the caller must see; a lost status race here means the
    /// webhook settled the row first.
    async fn mark_failed(
        &self,
        recording_id: ObjectId,
        expected: RecordingStatus,
        transport_err: &TransportError,
    ) {
        let result = self
            .store
            .update_recording_status(
                recording_id,
                expected,
                RecordingStatus::Failed,
                RecordingUpdate {
                    error_message: Some(transport_err.to_string()),
                    ended_at: Some(DateTime::now()),
                    ..Default::default()
                },
            )
            .await;
        if let Err(e) = result {
            warn!(
                %recording_id,
                error = %e,
                "Could not persist Failed status after transport error"
            );
        }
    }
}

fn persisted_id(recording: &Recording) -> Result<ObjectId, RecordingError> {
    recording
        .id
        .ok_or(RecordingError::Store(StoreError::NotFound))
}
