use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub meet: MeetSettings,
    pub jwt: JwtSettings,
    pub agent: AgentSettings,
    pub features: FeatureSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MeetSettings {
    /// Public domain the conferencing frontend is served from.
    pub domain: String,
    /// Prefix for generated room names (`<prefix>-<uuid>`).
    pub room_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub app_id: String,
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentTransportKind {
    /// Synchronous control endpoint on the recording agent.
    Direct,
    /// Publish commands to the agent's brewery channel over the broker.
    Broker,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentSettings {
    pub transport: AgentTransportKind,
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub broker_url: String,
    /// Well-known recipient for recording commands, e.g.
    /// `recorderbrewery@internal.<domain>`.
    pub brewery: String,
    pub ffprobe_bin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeatureSettings {
    pub recording: bool,
    pub livestreaming: bool,
    pub transcription: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("MEDIMEET"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "medimeet")?
            .set_default("meet.domain", "meet.medimeet.dev")?
            .set_default("meet.room_prefix", "medical")?
            .set_default("jwt.app_id", "medimeet")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.issuer", "medimeet")?
            .set_default("jwt.audience", "jitsi")?
            .set_default("jwt.token_ttl_secs", 7200)?
            .set_default("agent.transport", "direct")?
            .set_default("agent.base_url", "http://localhost:3001")?
            .set_default("agent.api_key", "")?
            .set_default("agent.timeout_secs", 10)?
            .set_default("agent.broker_url", "ws://localhost:5280/ws")?
            .set_default("agent.brewery", "recorderbrewery@internal.meet.medimeet.dev")?
            .set_default("agent.ffprobe_bin", "ffprobe")?
            .set_default("features.recording", true)?
            .set_default("features.livestreaming", false)?
            .set_default("features.transcription", false)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
