pub mod settings;

pub use settings::{
    AgentSettings, AgentTransportKind, AppSettings, DatabaseSettings, FeatureSettings,
    JwtSettings, MeetSettings, Settings,
};
