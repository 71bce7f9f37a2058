pub mod broker;
pub mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use broker::{BrokerCommandTransport, BrokerSession};
pub use http::HttpCommandTransport;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The agent answered and rejected the command.
    #[error("Recording agent rejected the command: {0}")]
    Agent(String),
    /// The agent could not be reached at all (connect failure, timeout).
    #[error("Recording agent unreachable: {0}")]
    Unreachable(String),
    /// The command channel to the broker failed before or during publish.
    #[error("Command channel error: {0}")]
    Channel(String),
}

/// Commands a remote recording agent through its control surface. A single
/// attempt per invocation; callers treat any error as final for that
/// start/stop. Implementations differ in what success means: the direct
/// variant has a synchronous acknowledgment, the broker variant only
/// guarantees the command was accepted for delivery.
#[async_trait]
pub trait RecordingTransport: Send + Sync {
    async fn start(&self, room_name: &str, recording_id: &str) -> Result<(), TransportError>;

    async fn stop(&self, recording_id: &str) -> Result<(), TransportError>;

    /// Human-readable transport name.
    fn name(&self) -> &str;
}
