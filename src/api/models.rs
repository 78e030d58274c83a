use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Worker status as reported by `GET /status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub worker_running: bool,
    #[serde(default)]
    pub last_fecha_hora: String,
    #[serde(default)]
    pub events_today: i64,
    #[serde(default)]
    pub ingestion_rate: f64,
    #[serde(default)]
    pub total_events: i64,
    #[serde(default)]
    pub connections: Connections,
    #[serde(default)]
    pub uptime_seconds: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
    #[serde(rename = "sqlServer")]
    pub sql_server: bool,
    pub mqtt: bool,
    pub mongodb: bool,
}

impl Connections {
    #[must_use]
    pub const fn is_connected(&self, integration: Integration) -> bool {
        match integration {
            Integration::SqlServer => self.sql_server,
            Integration::Mqtt => self.mqtt,
            Integration::MongoDb => self.mongodb,
        }
    }
}

/// One of the three backend integrations the worker talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Integration {
    SqlServer,
    Mqtt,
    MongoDb,
}

impl Integration {
    pub const ALL: [Self; 3] = [Self::SqlServer, Self::Mqtt, Self::MongoDb];

    /// Path segment used by `POST /test/{integration}`
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::SqlServer => "sqlserver",
            Self::Mqtt => "mqtt",
            Self::MongoDb => "mongodb",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SqlServer => "SQL Server (Akva)",
            Self::Mqtt => "MQTT Broker",
            Self::MongoDb => "MongoDB",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Full backend configuration as exchanged by `GET /config` and `PUT /config`.
///
/// Passwords come back masked as `********`; sending the mask back tells the
/// server to keep the stored secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(rename = "sqlServer")]
    pub sql_server: SqlServerConfig,
    pub mqtt: MqttConfig,
    pub mongodb: MongoDbConfig,
    pub polling: PollingConfig,
    #[serde(default)]
    pub admin: AdminSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlServerConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub topic: String,
    #[serde(default)]
    pub topic_prefix: String,
    pub client_id: String,
    pub user: String,
    pub password: String,
    pub qos: u8,
    #[serde(rename = "useTLS", default)]
    pub use_tls: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoDbConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub batch_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSection {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Flattened ingestion event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub source: String,
    pub name: String,
    pub unit_name: String,
    pub fecha_hora: String,
    pub dia: String,
    pub inicio: String,
    pub fin: String,
    pub dif: i64,
    pub amount_grams: f64,
    pub pellet_fish_min: f64,
    pub fish_count: f64,
    pub peso_prom: f64,
    pub biomasa: f64,
    #[serde(rename = "pelletPK")]
    pub pellet_pk: f64,
    pub feed_name: String,
    pub silo_name: String,
    pub doser_name: String,
    pub grams_per_sec: f64,
    pub kg_ton_min: f64,
    pub marca: i64,
    pub ingested_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "INFO")]
    Info,
    #[serde(alias = "WARN", alias = "warning", alias = "WARNING")]
    Warn,
    #[serde(alias = "ERROR")]
    Error,
    #[serde(alias = "DEBUG")]
    Debug,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Envelope of every list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub total: u64,
}

// the server encodes an empty result set as `"data": null`
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> Page<T> {
    #[must_use]
    pub const fn empty(page: u32) -> Self {
        Self {
            data: Vec::new(),
            page,
            pages: 0,
            total: 0,
        }
    }
}

/// `{success, data}` wrapper used by the single-event endpoints
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `{status: "..."}` answer of the worker, watermark and config writes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub status: String,
}

/// Result of a connection probe; HTTP 200 even when the probe failed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionTest {
    pub connected: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchDeleteReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub deleted: u64,
}

/// Body of `DELETE /events/batch`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDelete {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_date: Option<String>,
}
