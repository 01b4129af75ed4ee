//! Event normalization
//!
//! Resolves raw CEIDs and alarm ids to display names through the code tables,
//! turning decoded records into the event table the KPI engine reads.

use crate::codes::CodeTables;
use crate::types::{Event, EventTable, LogRecord};

/// Event name used when neither the CEID nor a command name resolves
pub const UNKNOWN_EVENT: &str = "Unknown";

/// Display name of a record: CEID name, else remote command, else `Unknown`
pub fn event_name(record: &LogRecord, tables: &CodeTables) -> String {
    record
        .details
        .ceid()
        .and_then(|ceid| tables.event_name(ceid))
        .map(str::to_string)
        .or_else(|| record.details.rcmd())
        .unwrap_or_else(|| UNKNOWN_EVENT.to_string())
}

/// Normalize one record at log position `index`
pub fn normalize_record(index: usize, record: &LogRecord, tables: &CodeTables) -> Event {
    let alarm_description = record
        .details
        .alarm_id()
        .and_then(|id| tables.alarm(id))
        .map(|alarm| alarm.description.clone());

    Event {
        index,
        timestamp: record.timestamp.clone(),
        event_name: event_name(record, tables),
        message_name: record.message_name.clone(),
        fields: record.details.clone(),
        alarm_description,
    }
}

/// Normalize decoded records into an event table, preserving log order
pub fn normalize(records: &[LogRecord], tables: &CodeTables) -> EventTable {
    let events: Vec<Event> = records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record, tables))
        .collect();

    log::debug!("Normalized {} events", events.len());
    EventTable::new(events)
}
