use bson::{doc, oid::ObjectId};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use medimeet_config::{FeatureSettings, JwtSettings, MeetSettings};
use medimeet_db::models::{MeetingEvent, ParticipantRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::store::{MeetingStore, StoreError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Meeting not found")]
    NotFound,
    #[error("User is not a participant of this meeting")]
    NotAuthorized,
    #[error("Token signing error: {0}")]
    Signing(String),
    #[error(transparent)]
    Store(StoreError),
}

/// Claims embedded in a per-participant meeting token. Shape follows the
/// conferencing frontend's JWT contract: room binding plus a user/features
/// context block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingClaims {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub room: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub context: ClaimsContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsContext {
    pub user: UserContext,
    pub features: FeatureContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub id: String,
    pub name: String,
    pub moderator: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureContext {
    pub recording: bool,
    pub livestreaming: bool,
    pub transcription: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub meeting_url: String,
    pub is_moderator: bool,
    pub expires_in: u64,
}

/// Opaque signing collaborator; claim construction never touches key
/// material directly.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &MeetingClaims) -> Result<String, TokenError>;
}

pub struct JwtTokenSigner {
    encoding_key: EncodingKey,
}

impl JwtTokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, claims: &MeetingClaims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

/// Builds per-participant access claims for a meeting. Authorization and
/// claim construction only; cryptography is the signer's job.
pub struct TokenIssuer {
    store: Arc<dyn MeetingStore>,
    signer: Arc<dyn TokenSigner>,
    jwt: JwtSettings,
    meet: MeetSettings,
    features: FeatureSettings,
}

impl TokenIssuer {
    pub fn new(
        store: Arc<dyn MeetingStore>,
        signer: Arc<dyn TokenSigner>,
        jwt: JwtSettings,
        meet: MeetSettings,
        features: FeatureSettings,
    ) -> Self {
        Self {
            store,
            signer,
            jwt,
            meet,
            features,
        }
    }

    pub async fn issue(
        &self,
        meeting_id: ObjectId,
        user_id: &str,
    ) -> Result<IssuedToken, TokenError> {
        // Meeting existence and participant membership produce distinct
        // failures: unknown meeting vs. known meeting, foreign user.
        match self.store.get_meeting(meeting_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound) => return Err(TokenError::NotFound),
            Err(e) => return Err(TokenError::Store(e)),
        }

        let (meeting, participant) = match self
            .store
            .find_meeting_for_participant(meeting_id, user_id)
            .await
        {
            Ok(found) => found,
            Err(StoreError::NotFound) => return Err(TokenError::NotAuthorized),
            Err(e) => return Err(TokenError::Store(e)),
        };

        let is_moderator = participant.role.is_moderator();
        let now = Utc::now().timestamp();
        let claims = MeetingClaims {
            aud: self.jwt.audience.clone(),
            iss: self.jwt.app_id.clone(),
            sub: self.meet.domain.clone(),
            room: meeting.room_name.clone(),
            iat: now,
            nbf: now,
            exp: now + self.jwt.token_ttl_secs as i64,
            context: ClaimsContext {
                user: UserContext {
                    id: user_id.to_string(),
                    name: role_display_name(participant.role).to_string(),
                    moderator: is_moderator,
                },
                // Meeting-level configuration; callers cannot escalate their
                // own flags. Recording capability is moderator-only.
                features: FeatureContext {
                    recording: is_moderator && self.features.recording,
                    livestreaming: self.features.livestreaming,
                    transcription: self.features.transcription,
                },
            },
        };

        let token = self.signer.sign(&claims)?;

        self.store
            .append_event(
                meeting_id,
                MeetingEvent::USER_JOINED,
                doc! { "userId": user_id, "role": participant.role.as_str() },
            )
            .await
            .map_err(TokenError::Store)?;

        Ok(IssuedToken {
            token,
            meeting_url: format!("https://{}/{}", self.meet.domain, meeting.room_name),
            is_moderator,
            expires_in: self.jwt.token_ttl_secs,
        })
    }
}

fn role_display_name(role: ParticipantRole) -> &'static str {
    match role {
        ParticipantRole::Medic => "Medic",
        ParticipantRole::Patient => "Patient",
    }
}
