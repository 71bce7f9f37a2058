use bson::{oid::ObjectId, DateTime};
use medimeet_db::models::{Recording, RecordingStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::inspect::{ArtifactError, ArtifactInspector};
use crate::store::{MeetingStore, RecordingUpdate, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The notice does not reference a known recording; the only outcome the
    /// webhook caller is told about.
    #[error("Recording not found")]
    UnknownRecording,
    #[error(transparent)]
    Store(StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedOutcome {
    Finished,
    Failed,
}

/// Completion notice as delivered by the recording agent, already parsed.
#[derive(Debug, Clone)]
pub struct CompletionNotice {
    pub recording_id: ObjectId,
    pub outcome: ReportedOutcome,
    pub file_path: Option<String>,
    pub error: Option<String>,
}

/// Turns asynchronous agent completion notices into validated, hashed,
/// durable recording state.
pub struct WebhookReconciler {
    store: Arc<dyn MeetingStore>,
    inspector: Arc<dyn ArtifactInspector>,
}

impl WebhookReconciler {
    pub fn new(store: Arc<dyn MeetingStore>, inspector: Arc<dyn ArtifactInspector>) -> Self {
        Self { store, inspector }
    }

    /// Processes a completion notice. Artifact problems on a reported-FINISHED
    /// recording become a `Failed` row, not an error: the webhook fails open
    /// by policy so the agent never loops redelivering a notice we cannot
    /// make good on.
    pub async fn handle_completion(
        &self,
        notice: CompletionNotice,
    ) -> Result<Recording, ReconcileError> {
        let recording = match self.store.find_recording(notice.recording_id).await {
            Ok(recording) => recording,
            Err(StoreError::NotFound) => return Err(ReconcileError::UnknownRecording),
            Err(e) => return Err(ReconcileError::Store(e)),
        };

        // Terminal recordings are immutable; redelivery is a successful no-op.
        if recording.status.is_terminal() {
            debug!(
                recording_id = %notice.recording_id,
                status = recording.status.as_str(),
                "Completion notice for terminal recording, ignoring"
            );
            return Ok(recording);
        }

        let ended_at = Some(DateTime::now());
        match notice.outcome {
            ReportedOutcome::Finished => {
                match self.inspect(notice.file_path.as_deref()).await {
                    Ok((size, hash, duration)) => {
                        self.finalize(
                            recording,
                            RecordingStatus::Finished,
                            RecordingUpdate {
                                file_path: notice.file_path,
                                size: Some(size),
                                duration: Some(duration),
                                hash: Some(hash),
                                error_message: None,
                                ended_at,
                            },
                        )
                        .await
                    }
                    Err(err) => {
                        warn!(
                            recording_id = %notice.recording_id,
                            error = %err,
                            "Reported artifact failed inspection, failing recording"
                        );
                        self.finalize(
                            recording,
                            RecordingStatus::Failed,
                            RecordingUpdate {
                                error_message: Some(err.to_string()),
                                ended_at,
                                ..Default::default()
                            },
                        )
                        .await
                    }
                }
            }
            ReportedOutcome::Failed => {
                let message = notice
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string());
                self.finalize(
                    recording,
                    RecordingStatus::Failed,
                    RecordingUpdate {
                        error_message: Some(message),
                        ended_at,
                        ..Default::default()
                    },
                )
                .await
            }
        }
    }

    /// Validates the reported file and fingerprints it: (size, hash, duration).
    async fn inspect(&self, file_path: Option<&str>) -> Result<(u64, String, u32), ArtifactError> {
        let path = file_path.ok_or(ArtifactError::MissingPath)?;

        let stat = self.inspector.stat(path).await?;
        if !stat.is_file {
            return Err(ArtifactError::NotAFile);
        }
        if stat.size == 0 {
            return Err(ArtifactError::Empty);
        }

        let hash = self.inspector.hash(path).await?;
        let duration = self.inspector.probe_duration(path).await?;
        Ok((stat.size, hash, duration))
    }

    /// Conditional transition that tolerates losing the race against a
    /// concurrent stop: whoever finalizes first wins, the loser observes the
    /// terminal row and treats it as done.
    async fn finalize(
        &self,
        recording: Recording,
        new_status: RecordingStatus,
        fields: RecordingUpdate,
    ) -> Result<Recording, ReconcileError> {
        let Some(recording_id) = recording.id else {
            return Err(ReconcileError::UnknownRecording);
        };

        let mut expected = recording.status;
        for _ in 0..2 {
            match self
                .store
                .update_recording_status(recording_id, expected, new_status, fields.clone())
                .await
            {
                Ok(updated) => return Ok(updated),
                Err(StoreError::Conflict(_)) => {
                    let current = self
                        .store
                        .find_recording(recording_id)
                        .await
                        .map_err(|e| match e {
                            StoreError::NotFound => ReconcileError::UnknownRecording,
                            other => ReconcileError::Store(other),
                        })?;
                    if current.status.is_terminal() {
                        return Ok(current);
                    }
                    expected = current.status;
                }
                Err(e) => return Err(ReconcileError::Store(e)),
            }
        }

        warn!(
            recording_id = %recording_id,
            "Could not finalize recording after repeated status races"
        );
        self.store
            .find_recording(recording_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ReconcileError::UnknownRecording,
                other => ReconcileError::Store(other),
            })
    }
}
