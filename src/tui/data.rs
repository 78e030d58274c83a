use crate::api::{Event, LogEntry, LogLevel};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRow {
    pub id: String,
    pub unit: String,
    pub source: String,
    pub name: String,
    pub fecha: String,
    pub feed: String,
    pub amount: String,
    pub fish: String,
}

impl EventRow {
    pub(crate) const fn ref_array(&self) -> [&String; 7] {
        [
            &self.unit,
            &self.source,
            &self.name,
            &self.fecha,
            &self.feed,
            &self.amount,
            &self.fish,
        ]
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fecha(&self) -> &str {
        &self.fecha
    }

    fn feed(&self) -> &str {
        &self.feed
    }
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            unit: event.unit_name.clone(),
            source: event.source.clone(),
            name: event.name.clone(),
            fecha: event.fecha_hora.clone(),
            feed: event.feed_name.clone(),
            amount: format!("{:.1} g", event.amount_grams),
            fish: format!("{:.0}", event.fish_count),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRow {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogRow {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

impl From<&LogEntry> for LogRow {
    fn from(entry: &LogEntry) -> Self {
        let timestamp = DateTime::parse_from_rfc3339(&entry.timestamp).map_or_else(
            |_| entry.timestamp.clone(),
            |t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        Self {
            timestamp,
            level: entry.level,
            message: entry.message.clone(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
pub fn event_constraint_len_calculator(items: &[EventRow]) -> (u16, u16, u16, u16, u16) {
    let unit_len = items
        .iter()
        .map(EventRow::unit)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let source_len = items
        .iter()
        .map(EventRow::source)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let name_len = items
        .iter()
        .map(EventRow::name)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let fecha_len = items
        .iter()
        .map(EventRow::fecha)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let feed_len = items
        .iter()
        .map(EventRow::feed)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);

    (
        unit_len.max(4) as u16,
        source_len.max(6) as u16,
        name_len.max(4) as u16,
        fecha_len.max(5) as u16,
        feed_len.max(4) as u16,
    )
}

#[allow(clippy::cast_possible_truncation)]
pub fn log_constraint_len_calculator(items: &[LogRow]) -> u16 {
    items
        .iter()
        .map(LogRow::timestamp)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
        .max(9) as u16
}

/// `3d 4h 12m`, dropping leading zero units
#[must_use]
pub fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    match (days, hours) {
        (0, 0) => format!("{minutes}m {}s", seconds % 60),
        (0, _) => format!("{hours}h {minutes}m"),
        _ => format!("{days}d {hours}h {minutes}m"),
    }
}

/// `source=akva, unitName=101`, or `none`
#[must_use]
pub fn describe_filters(filters: &BTreeMap<String, String>) -> String {
    if filters.is_empty() {
        return "none".to_string();
    }
    filters.iter().map(|(k, v)| format!("{k}={v}")).join(", ")
}
