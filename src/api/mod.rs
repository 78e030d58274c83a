pub mod client;
pub mod config;
pub mod events;
pub mod logs;
pub mod models;
pub mod status;

pub use client::{ApiClient, ApiError};
pub use models::{
    ActionReply, AdminConfig, BatchDelete, ConnectionTest, Connections, Event, Integration,
    LogEntry, LogLevel, MongoDbConfig, MqttConfig, Page, PollingConfig, SqlServerConfig, Status,
};

/// Default user agent - automatically uses the package version
///
/// Can be overridden with `--user-agent` / `OMNIPOLL_USER_AGENT`.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
