pub mod recording;
pub mod store;
pub mod token;

pub use recording::controller::RecordingController;
pub use recording::inspect::{ArtifactInspector, FsArtifactInspector};
pub use recording::reconciler::WebhookReconciler;
pub use recording::transport::RecordingTransport;
pub use store::MeetingStore;
pub use token::TokenIssuer;
