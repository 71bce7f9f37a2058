use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{RecordingTransport, TransportError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartCommand<'a> {
    room_name: &'a str,
    session_id: &'a str,
    recording_mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StopCommand<'a> {
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AgentErrorBody {
    message: Option<String>,
}

/// Direct-command variant: synchronous calls against the recording agent's
/// control endpoint with a hard per-request timeout. No retries.
pub struct HttpCommandTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpCommandTransport {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), TransportError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            debug!(%path, "Agent accepted command");
            return Ok(());
        }

        // Pass the agent's own message through when it supplied one.
        let message = resp
            .json::<AgentErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        Err(TransportError::Agent(message.unwrap_or_else(|| {
            format!("Agent returned status {}", status.as_u16())
        })))
    }
}

#[async_trait]
impl RecordingTransport for HttpCommandTransport {
    async fn start(&self, room_name: &str, recording_id: &str) -> Result<(), TransportError> {
        self.post(
            "/api/agent/start",
            &StartCommand {
                room_name,
                session_id: recording_id,
                recording_mode: "file",
            },
        )
        .await
    }

    async fn stop(&self, recording_id: &str) -> Result<(), TransportError> {
        self.post(
            "/api/agent/stop",
            &StopCommand {
                session_id: recording_id,
            },
        )
        .await
    }

    fn name(&self) -> &str {
        "direct"
    }
}
