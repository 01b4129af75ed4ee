//! Whole-log context: who ran the machine, with which magazines and lots,
//! and in which control mode.

use crate::config::AnalyzerConfig;
use crate::kpi::summary::TimedEvent;
use crate::types::{Event, EventTable, Field};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextInfo {
    pub operator_ids: Vec<String>,
    pub magazine_ids: Vec<String>,
    pub lot_ids: Vec<String>,
    pub machine_statuses: Vec<String>,
    pub operator_logins: Vec<TimedEvent>,
    pub dock_events: Vec<TimedEvent>,
    pub status_changes: Vec<TimedEvent>,
}

/// Distinct values in order of first appearance
fn unique_values<'a, I, F>(events: I, value: F) -> Vec<String>
where
    I: IntoIterator<Item = &'a Event>,
    F: Fn(&Event) -> Option<String>,
{
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter_map(value)
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn timed_events<'a, F>(events: impl Iterator<Item = &'a Event>, value: F) -> Vec<TimedEvent>
where
    F: Fn(&Event) -> Option<String>,
{
    events
        .map(|event| TimedEvent {
            timestamp: event.timestamp.clone(),
            event_name: event.event_name.clone(),
            value: value(event),
        })
        .collect()
}

pub fn extract_context(table: &EventTable, config: &AnalyzerConfig) -> ContextInfo {
    ContextInfo {
        operator_ids: unique_values(table, |e| e.fields.operator_id()),
        magazine_ids: unique_values(table, |e| e.fields.magazine_id()),
        lot_ids: unique_values(table, |e| e.fields.lot_id()),
        machine_statuses: unique_values(table.named(&config.machine_status_events), |e| {
            Some(e.event_name.clone())
        }),
        operator_logins: timed_events(table.named(&config.login_events), |e| {
            e.fields.operator_id()
        }),
        dock_events: timed_events(table.named(&config.dock_events), |e| e.fields.magazine_id()),
        status_changes: timed_events(table.named(&config.machine_status_events), |e| {
            e.fields.text(&Field::ControlState)
        }),
    }
}
