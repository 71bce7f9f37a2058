use async_trait::async_trait;
use futures::SinkExt;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{info, warn};

use super::{RecordingTransport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A lazily-established WebSocket session to the command broker, owned by the
/// composition root and shared by reference.
///
/// The mutex serializes everything: the first caller establishes the
/// connection while concurrent callers wait on the lock and then reuse it.
/// Any connect or send error clears the slot so the next command
/// re-establishes instead of failing forever on a dead session.
pub struct BrokerSession {
    url: String,
    conn: Mutex<Option<WsStream>>,
}

impl BrokerSession {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conn: Mutex::new(None),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    async fn publish(&self, frame: String) -> Result<(), TransportError> {
        let mut guard = self.conn.lock().await;

        if guard.is_none() {
            let (stream, _) = connect_async(self.url.as_str()).await.map_err(|e| {
                TransportError::Channel(format!("Connect to {} failed: {e}", self.url))
            })?;
            info!(url = %self.url, "Command channel connected");
            *guard = Some(stream);
        }

        let Some(stream) = guard.as_mut() else {
            return Err(TransportError::Channel("Session unavailable".to_string()));
        };

        if let Err(e) = stream.send(Message::text(frame)).await {
            warn!(error = %e, "Command channel send failed, marking offline");
            *guard = None;
            return Err(TransportError::Channel(e.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum BreweryCommand<'a> {
    Start {
        room: String,
        session_id: &'a str,
        recording_mode: &'static str,
    },
    Stop {
        session_id: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct CommandEnvelope<'a> {
    id: String,
    to: &'a str,
    #[serde(flatten)]
    command: BreweryCommand<'a>,
}

/// Message-based variant: publishes structured commands to the recording
/// agents' brewery channel. "Ok" means accepted for delivery, not that a
/// recording started; confirmation arrives out of band via the completion
/// webhook.
pub struct BrokerCommandTransport {
    session: Arc<BrokerSession>,
    brewery: String,
    domain: String,
}

impl BrokerCommandTransport {
    pub fn new(session: Arc<BrokerSession>, brewery: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            session,
            brewery: brewery.into(),
            domain: domain.into(),
        }
    }

    /// Room-scoped address the agent joins to capture the meeting.
    fn room_address(&self, room_name: &str) -> String {
        format!("{}@conference.{}", room_name, self.domain)
    }

    async fn send(&self, envelope: CommandEnvelope<'_>) -> Result<(), TransportError> {
        let frame = serde_json::to_string(&envelope)
            .map_err(|e| TransportError::Channel(e.to_string()))?;
        self.session.publish(frame).await
    }
}

#[async_trait]
impl RecordingTransport for BrokerCommandTransport {
    async fn start(&self, room_name: &str, recording_id: &str) -> Result<(), TransportError> {
        self.send(CommandEnvelope {
            id: format!("recorder-start-{recording_id}"),
            to: &self.brewery,
            command: BreweryCommand::Start {
                room: self.room_address(room_name),
                session_id: recording_id,
                recording_mode: "file",
            },
        })
        .await
    }

    async fn stop(&self, recording_id: &str) -> Result<(), TransportError> {
        self.send(CommandEnvelope {
            id: format!("recorder-stop-{recording_id}"),
            to: &self.brewery,
            command: BreweryCommand::Stop {
                session_id: recording_id,
            },
        })
        .await
    }

    fn name(&self) -> &str {
        "broker"
    }
}
