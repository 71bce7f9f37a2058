use medimeet_api::{build_router, state::AppState};
use medimeet_config::{AgentTransportKind, Settings};
use medimeet_db::{connect, indexes::ensure_indexes};
use medimeet_services::recording::{
    ArtifactInspector, BrokerCommandTransport, BrokerSession, FsArtifactInspector,
    HttpCommandTransport, RecordingTransport,
};
use medimeet_services::store::{MeetingStore, MongoMeetingStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "medimeet_api=debug,medimeet_services=debug,medimeet_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!(
        "Starting Medimeet API on {}:{}",
        settings.app.host, settings.app.port
    );

    // Connect to MongoDB
    let db = connect(&settings).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    let store: Arc<dyn MeetingStore> =
        Arc::new(MongoMeetingStore::new(&db, settings.meet.room_prefix.clone()));

    // Transport selection is configuration, not logic. The broker session is
    // created here and handed to the transport by reference.
    let transport: Arc<dyn RecordingTransport> = match settings.agent.transport {
        AgentTransportKind::Direct => Arc::new(HttpCommandTransport::new(
            settings.agent.base_url.clone(),
            settings.agent.api_key.clone(),
            Duration::from_secs(settings.agent.timeout_secs),
        )),
        AgentTransportKind::Broker => {
            let session = Arc::new(BrokerSession::new(settings.agent.broker_url.clone()));
            Arc::new(BrokerCommandTransport::new(
                session,
                settings.agent.brewery.clone(),
                settings.meet.domain.clone(),
            ))
        }
    };
    info!(transport = transport.name(), "Recording transport configured");

    let inspector: Arc<dyn ArtifactInspector> =
        Arc::new(FsArtifactInspector::new(settings.agent.ffprobe_bin.clone()));

    // Build app state
    let app_state = AppState::new(settings.clone(), store, transport, inspector);

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
