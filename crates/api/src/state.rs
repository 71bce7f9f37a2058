use medimeet_config::Settings;
use medimeet_services::{
    recording::{ArtifactInspector, RecordingController, RecordingTransport, WebhookReconciler},
    store::MeetingStore,
    token::{JwtTokenSigner, TokenIssuer},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn MeetingStore>,
    pub controller: Arc<RecordingController>,
    pub reconciler: Arc<WebhookReconciler>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    /// Wires the core collaborators. Store, transport and inspector come in
    /// as trait objects so the composition root (or a test harness) decides
    /// the implementations.
    pub fn new(
        settings: Settings,
        store: Arc<dyn MeetingStore>,
        transport: Arc<dyn RecordingTransport>,
        inspector: Arc<dyn ArtifactInspector>,
    ) -> Self {
        let controller = Arc::new(RecordingController::new(store.clone(), transport));
        let reconciler = Arc::new(WebhookReconciler::new(store.clone(), inspector));
        let signer = Arc::new(JwtTokenSigner::new(&settings.jwt.secret));
        let tokens = Arc::new(TokenIssuer::new(
            store.clone(),
            signer,
            settings.jwt.clone(),
            settings.meet.clone(),
            settings.features.clone(),
        ));

        Self {
            settings,
            store,
            controller,
            reconciler,
            tokens,
        }
    }
}
