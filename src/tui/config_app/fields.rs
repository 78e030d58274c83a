use crate::api::{AdminConfig, Integration};
use crate::error::{Error, Result};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    SqlServer,
    Mqtt,
    MongoDb,
    Polling,
}

impl Section {
    pub const ALL: [Self; 4] = [Self::SqlServer, Self::Mqtt, Self::MongoDb, Self::Polling];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::SqlServer => "SQL Server",
            Self::Mqtt => "MQTT",
            Self::MongoDb => "MongoDB",
            Self::Polling => "Polling",
        }
    }

    /// The integration a connection test of this section probes
    #[must_use]
    pub const fn integration(self) -> Option<Integration> {
        match self {
            Self::SqlServer => Some(Integration::SqlServer),
            Self::Mqtt => Some(Integration::Mqtt),
            Self::MongoDb => Some(Integration::MongoDb),
            Self::Polling => None,
        }
    }

    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::SqlServer => &[
                Field::SqlHost,
                Field::SqlPort,
                Field::SqlDatabase,
                Field::SqlUser,
                Field::SqlPassword,
            ],
            Self::Mqtt => &[
                Field::MqttBroker,
                Field::MqttPort,
                Field::MqttTopic,
                Field::MqttTopicPrefix,
                Field::MqttClientId,
                Field::MqttUser,
                Field::MqttPassword,
                Field::MqttQos,
                Field::MqttUseTls,
            ],
            Self::MongoDb => &[
                Field::MongoUri,
                Field::MongoDatabase,
                Field::MongoCollection,
            ],
            Self::Polling => &[Field::PollingIntervalMs, Field::PollingBatchSize],
        }
    }
}

/// One editable value of the backend configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    SqlHost,
    SqlPort,
    SqlDatabase,
    SqlUser,
    SqlPassword,
    MqttBroker,
    MqttPort,
    MqttTopic,
    MqttTopicPrefix,
    MqttClientId,
    MqttUser,
    MqttPassword,
    MqttQos,
    MqttUseTls,
    MongoUri,
    MongoDatabase,
    MongoCollection,
    PollingIntervalMs,
    PollingBatchSize,
}

fn parse<T: FromStr>(label: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Custom(format!("{label}: '{value}' is not a valid value")))
}

fn parse_bool(label: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::Custom(format!("{label}: expected true or false"))),
    }
}

impl Field {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SqlHost => "Host",
            Self::SqlPort | Self::MqttPort => "Port",
            Self::SqlDatabase | Self::MongoDatabase => "Database",
            Self::SqlUser | Self::MqttUser => "User",
            Self::SqlPassword | Self::MqttPassword => "Password",
            Self::MqttBroker => "Broker",
            Self::MqttTopic => "Topic",
            Self::MqttTopicPrefix => "Topic prefix",
            Self::MqttClientId => "Client id",
            Self::MqttQos => "QoS",
            Self::MqttUseTls => "Use TLS",
            Self::MongoUri => "URI",
            Self::MongoCollection => "Collection",
            Self::PollingIntervalMs => "Interval (ms)",
            Self::PollingBatchSize => "Batch size",
        }
    }

    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::SqlPassword | Self::MqttPassword)
    }

    #[must_use]
    pub fn get(self, config: &AdminConfig) -> String {
        match self {
            Self::SqlHost => config.sql_server.host.clone(),
            Self::SqlPort => config.sql_server.port.to_string(),
            Self::SqlDatabase => config.sql_server.database.clone(),
            Self::SqlUser => config.sql_server.user.clone(),
            Self::SqlPassword => config.sql_server.password.clone(),
            Self::MqttBroker => config.mqtt.broker.clone(),
            Self::MqttPort => config.mqtt.port.to_string(),
            Self::MqttTopic => config.mqtt.topic.clone(),
            Self::MqttTopicPrefix => config.mqtt.topic_prefix.clone(),
            Self::MqttClientId => config.mqtt.client_id.clone(),
            Self::MqttUser => config.mqtt.user.clone(),
            Self::MqttPassword => config.mqtt.password.clone(),
            Self::MqttQos => config.mqtt.qos.to_string(),
            Self::MqttUseTls => config.mqtt.use_tls.to_string(),
            Self::MongoUri => config.mongodb.uri.clone(),
            Self::MongoDatabase => config.mongodb.database.clone(),
            Self::MongoCollection => config.mongodb.collection.clone(),
            Self::PollingIntervalMs => config.polling.interval_ms.to_string(),
            Self::PollingBatchSize => config.polling.batch_size.to_string(),
        }
    }

    /// # Errors
    ///
    /// Will return `Err` if a numeric or boolean field does not parse; `config` is left unchanged
    pub fn set(self, config: &mut AdminConfig, value: &str) -> Result<()> {
        let label = self.label();
        let text = value.to_string();
        match self {
            Self::SqlHost => config.sql_server.host = text,
            Self::SqlPort => config.sql_server.port = parse(label, value)?,
            Self::SqlDatabase => config.sql_server.database = text,
            Self::SqlUser => config.sql_server.user = text,
            Self::SqlPassword => config.sql_server.password = text,
            Self::MqttBroker => config.mqtt.broker = text,
            Self::MqttPort => config.mqtt.port = parse(label, value)?,
            Self::MqttTopic => config.mqtt.topic = text,
            Self::MqttTopicPrefix => config.mqtt.topic_prefix = text,
            Self::MqttClientId => config.mqtt.client_id = text,
            Self::MqttUser => config.mqtt.user = text,
            Self::MqttPassword => config.mqtt.password = text,
            Self::MqttQos => {
                let qos: u8 = parse(label, value)?;
                if qos > 2 {
                    return Err(Error::Custom(format!("{label}: must be 0, 1 or 2")));
                }
                config.mqtt.qos = qos;
            }
            Self::MqttUseTls => config.mqtt.use_tls = parse_bool(label, value)?,
            Self::MongoUri => config.mongodb.uri = text,
            Self::MongoDatabase => config.mongodb.database = text,
            Self::MongoCollection => config.mongodb.collection = text,
            Self::PollingIntervalMs => config.polling.interval_ms = parse(label, value)?,
            Self::PollingBatchSize => config.polling.batch_size = parse(label, value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_round_trips_through_text() {
        let mut config = AdminConfig::default();
        for section in Section::ALL {
            for field in section.fields() {
                let value = match field {
                    Field::MqttUseTls => "true",
                    Field::MqttQos => "1",
                    Field::SqlPort | Field::MqttPort => "1883",
                    Field::PollingIntervalMs | Field::PollingBatchSize => "500",
                    _ => "value",
                };
                field.set(&mut config, value).unwrap();
                assert_eq!(field.get(&config), value, "{field:?}");
            }
        }
    }

    #[test]
    fn test_bad_numbers_leave_config_untouched() {
        let mut config = AdminConfig::default();
        config.sql_server.port = 1433;
        assert!(Field::SqlPort.set(&mut config, "70000").is_err());
        assert!(Field::MqttQos.set(&mut config, "3").is_err());
        assert!(Field::MqttUseTls.set(&mut config, "maybe").is_err());
        assert_eq!(config.sql_server.port, 1433);
        assert_eq!(config.mqtt.qos, 0);
    }

    #[test]
    fn test_only_integration_sections_probe() {
        assert_eq!(Section::Mqtt.integration(), Some(Integration::Mqtt));
        assert_eq!(Section::Polling.integration(), None);
    }
}
