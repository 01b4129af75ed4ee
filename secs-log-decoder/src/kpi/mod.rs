//! KPI correlation engine
//!
//! Every sub-analysis is a pure function of the event table. A sub-analysis
//! that finds none of the events it keys on falls back to its own default and
//! leaves the others untouched.

pub mod context;
pub mod cycle;
pub mod downtime;
pub mod frequency;
pub mod job;
pub mod mapping;
pub mod panels;
pub mod summary;

pub use context::{extract_context, ContextInfo};
pub use cycle::cycle_times;
pub use downtime::{compute_downtime, panel_context, DowntimeReport};
pub use frequency::{alarm_counts, alarm_events, event_counts};
pub use job::{detect_job, job_alarms, JobWindow};
pub use mapping::mapping_phase;
pub use panels::{lot_to_panel_map, panel_info, panel_slot_map, panel_windows, unique_panel_ids};
pub use summary::*;

use crate::codes::CodeTables;
use crate::config::AnalyzerConfig;
use crate::types::EventTable;

/// Run every sub-analysis over `table` and assemble the KPI summary
pub fn analyze(table: &EventTable, tables: &CodeTables, config: &AnalyzerConfig) -> KpiSummary {
    if table.is_empty() {
        log::info!("Empty event table, nothing to analyze");
        return KpiSummary::default();
    }

    let job = detect_job(table, config);
    let job_alarms = job_alarms(table, &job);
    let context = extract_context(table, config);
    let panel_info = panel_info(table, config);
    let downtime = compute_downtime(table, tables, config, &panel_info.panel_windows);

    log::info!(
        "Analyzed {} events: job {}, {} downtime incidents ({:.2}s)",
        table.len(),
        job.status,
        downtime.incidents.len(),
        downtime.total_downtime_sec
    );

    KpiSummary {
        job_status: job.status,
        lot_id: job.lot_id,
        panel_count: job.panel_count,
        job_start_time: job.start_time,
        job_end_time: job.end_time,
        total_duration_sec: job.total_duration_sec,
        avg_cycle_time_sec: job.avg_cycle_time_sec,
        unique_alarms_count: job_alarms.len(),
        job_alarms,

        total_downtime_sec: downtime.total_downtime_sec,
        downtime_status: downtime.status,
        alarms_with_context: downtime.incidents,

        magazine_ids: context.magazine_ids,
        operator_ids: context.operator_ids,
        machine_statuses: context.machine_statuses,
        lot_ids: context.lot_ids,
        operator_logins: context.operator_logins,
        dock_events: context.dock_events,
        status_changes: context.status_changes,

        mapping_details: mapping_phase(table, config),
        cycle_time_details: cycle_times(table, config),
        lot_to_panel_map: lot_to_panel_map(table, config),
        panel_info,

        event_counts: event_counts(table),
        alarm_counts: alarm_counts(table, tables),
        alarm_events: alarm_events(table),
    }
}
