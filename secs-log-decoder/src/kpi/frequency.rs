//! Frequency tables over the whole log

use crate::codes::CodeTables;
use crate::kpi::summary::{AlarmEvent, AlarmFrequency, EventFrequency};
use crate::types::{EventTable, Field};
use std::collections::HashMap;

/// Event-name frequency, most frequent first
pub fn event_counts(table: &EventTable) -> Vec<EventFrequency> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in table {
        *counts.entry(event.event_name.as_str()).or_default() += 1;
    }

    let mut rows: Vec<EventFrequency> = counts
        .into_iter()
        .map(|(name, count)| EventFrequency {
            event_name: name.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.event_name.cmp(&b.event_name)));
    rows
}

/// Alarm-id frequency over every event carrying a numeric alarm id
pub fn alarm_counts(table: &EventTable, tables: &CodeTables) -> Vec<AlarmFrequency> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for alarm_id in table.iter().filter_map(|e| e.fields.alarm_id()) {
        *counts.entry(alarm_id).or_default() += 1;
    }

    let mut rows: Vec<AlarmFrequency> = counts
        .into_iter()
        .map(|(alarm_id, count)| AlarmFrequency {
            alarm_id,
            description: tables.alarm(alarm_id).map(|a| a.description.clone()),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.alarm_id.cmp(&b.alarm_id)));
    rows
}

/// Every event that carries an alarm id, in log order
pub fn alarm_events(table: &EventTable) -> Vec<AlarmEvent> {
    table
        .iter()
        .filter_map(|event| {
            let alarm_id = event.fields.text(&Field::AlarmId)?;
            Some(AlarmEvent {
                timestamp: event.timestamp.clone(),
                event_name: event.event_name.clone(),
                alarm_id,
                description: event.alarm_description.clone(),
            })
        })
        .collect()
}
