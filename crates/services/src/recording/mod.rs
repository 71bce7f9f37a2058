pub mod controller;
pub mod inspect;
pub mod reconciler;
pub mod transport;

pub use controller::{RecordingController, RecordingError};
pub use inspect::{ArtifactError, ArtifactInspector, ArtifactStat, FsArtifactInspector};
pub use reconciler::{CompletionNotice, ReconcileError, ReportedOutcome, WebhookReconciler};
pub use transport::{
    BrokerCommandTransport, BrokerSession, HttpCommandTransport, RecordingTransport,
    TransportError,
};
