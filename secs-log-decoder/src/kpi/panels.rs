//! Panel, slot and lot correlation
//!
//! Identification reads tie a panel to a slot and, through the most recent
//! load start before them, to a lot. Pairing each read with the next free
//! load completion gives the window in which the panel was being handled.

use crate::config::AnalyzerConfig;
use crate::kpi::summary::{PanelInfo, PanelSlot, PanelWindow};
use crate::types::{Event, EventTable, Timestamp};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

fn panel_reads<'a>(
    table: &'a EventTable,
    config: &'a AnalyzerConfig,
) -> impl Iterator<Item = &'a Event> + 'a {
    table
        .named(&config.panel_read_events)
        .filter(|e| e.fields.panel_id().is_some())
}

/// Numeric slots first in ascending order, then non-numeric slots in read order
fn compare_slots(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

/// Deduplicated panel → slot pairs, sorted by slot
pub fn panel_slot_map(table: &EventTable, config: &AnalyzerConfig) -> Vec<PanelSlot> {
    let mut seen = HashSet::new();
    let mut pairs: Vec<PanelSlot> = panel_reads(table, config)
        .filter_map(|e| {
            Some(PanelSlot {
                panel_id: e.fields.panel_id()?,
                slot_id: e.fields.slot_id()?,
            })
        })
        .filter(|pair| seen.insert(pair.clone()))
        .collect();

    pairs.sort_by(|a, b| compare_slots(&a.slot_id, &b.slot_id));
    pairs
}

/// Distinct panel ids in read order
pub fn unique_panel_ids(table: &EventTable, config: &AnalyzerConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    panel_reads(table, config)
        .filter_map(|e| e.fields.panel_id())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Pair each identification read with the next unused load completion
///
/// Both sequences are already in log order, so a single forward sweep pairs
/// them. A read with no completion left stays open to the end of the log.
pub fn panel_windows(table: &EventTable, config: &AnalyzerConfig) -> Vec<PanelWindow> {
    let loads: Vec<usize> = table
        .named(&config.panel_loaded_events)
        .map(|e| e.index)
        .collect();

    let mut next_load = 0;
    let mut windows = Vec::new();
    for read in panel_reads(table, config) {
        while next_load < loads.len() && loads[next_load] <= read.index {
            next_load += 1;
        }
        let end_index = loads.get(next_load).copied();
        if end_index.is_some() {
            next_load += 1;
        }

        windows.push(PanelWindow {
            panel_id: read.fields.panel_id().unwrap_or_default(),
            start_time: read.timestamp.clone(),
            end_time: end_index
                .and_then(|i| table.events().get(i))
                .map(|e| e.timestamp.clone()),
            start_index: read.index,
            end_index,
        });
    }
    windows
}

/// Group panel ids by the lot of the nearest preceding load start
///
/// The join is by timestamp: a read belongs to the latest load start at or
/// before it, whether or not that job has since completed.
pub fn lot_to_panel_map(
    table: &EventTable,
    config: &AnalyzerConfig,
) -> BTreeMap<String, Vec<String>> {
    let mut starts: Vec<(Timestamp, Option<String>)> = table
        .named(&config.job_start_events)
        .filter_map(|e| Some((e.parsed_timestamp()?, e.fields.lot_id())))
        .collect();
    starts.sort_by_key(|(ts, _)| *ts);

    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if starts.is_empty() {
        return map;
    }

    for read in panel_reads(table, config) {
        let (Some(read_ts), Some(panel_id)) = (read.parsed_timestamp(), read.fields.panel_id())
        else {
            continue;
        };
        let position = starts.partition_point(|(ts, _)| *ts <= read_ts);
        let Some((_, Some(lot_id))) = position.checked_sub(1).and_then(|i| starts.get(i)) else {
            continue;
        };

        let panels = map.entry(lot_id.clone()).or_default();
        if !panels.contains(&panel_id) {
            panels.push(panel_id);
        }
    }
    map
}

pub fn panel_info(table: &EventTable, config: &AnalyzerConfig) -> PanelInfo {
    PanelInfo {
        panel_slot_map: panel_slot_map(table, config),
        unique_panel_ids: unique_panel_ids(table, config),
        panel_windows: panel_windows(table, config),
    }
}
