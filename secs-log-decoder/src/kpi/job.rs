//! Job window detection
//!
//! A job runs from the first load-start command to the first completion event
//! at or after it in log order. At most one job is recognized per log.

use crate::codes::is_alarm_set_name;
use crate::config::AnalyzerConfig;
use crate::kpi::summary::{JobStatus, NOT_AVAILABLE, NO_JOB_LOT};
use crate::types::{round2, seconds_between, EventTable};

/// Job boundaries and the KPIs derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct JobWindow {
    pub status: JobStatus,
    pub lot_id: String,
    pub panel_count: u32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    pub total_duration_sec: f64,
    pub avg_cycle_time_sec: f64,
}

impl JobWindow {
    fn no_job(lot_id: &str) -> Self {
        Self {
            status: JobStatus::NoJobFound,
            lot_id: lot_id.to_string(),
            panel_count: 0,
            start_time: None,
            end_time: None,
            start_index: None,
            end_index: None,
            total_duration_sec: 0.0,
            avg_cycle_time_sec: 0.0,
        }
    }
}

/// Locate the job window of a log
pub fn detect_job(table: &EventTable, config: &AnalyzerConfig) -> JobWindow {
    if table.is_empty() {
        return JobWindow::no_job(NOT_AVAILABLE);
    }
    let Some(start) = table.first_named_from(&config.job_start_events, 0) else {
        log::debug!("No job start event in {} events", table.len());
        return JobWindow::no_job(NO_JOB_LOT);
    };

    let lot_id = start
        .fields
        .lot_id()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let panel_count = start
        .fields
        .panel_count()
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(0);

    let (end, mut status) = match table.first_named_from(&config.job_end_events, start.index) {
        Some(end) => (end, JobStatus::Completed),
        None => (table.last().unwrap_or(start), JobStatus::DidNotComplete),
    };

    let mut total_duration_sec = 0.0;
    let mut avg_cycle_time_sec = 0.0;
    match seconds_between(&start.timestamp, &end.timestamp) {
        Some(duration) if duration >= 0.0 => {
            total_duration_sec = round2(duration);
            if panel_count > 0 {
                avg_cycle_time_sec = round2(duration / f64::from(panel_count));
            }
        }
        Some(duration) => {
            log::debug!("Job end precedes job start by {:.3}s", -duration);
        }
        None => {
            log::warn!(
                "Cannot compute job duration between '{}' and '{}'",
                start.timestamp,
                end.timestamp
            );
            status = JobStatus::TimeCalculationError;
        }
    }

    JobWindow {
        status,
        lot_id,
        panel_count,
        start_time: Some(start.timestamp.clone()),
        end_time: Some(end.timestamp.clone()),
        start_index: Some(start.index),
        end_index: Some(end.index),
        total_duration_sec,
        avg_cycle_time_sec,
    }
}

/// Distinct alarm ids raised inside the job window, in order of first raise
///
/// Without a job window the whole log is scanned.
pub fn job_alarms(table: &EventTable, job: &JobWindow) -> Vec<i64> {
    let events = table.events();
    let window = match (job.start_index, job.end_index) {
        (Some(start), Some(end)) => events.get(start..=end).unwrap_or_default(),
        _ => events,
    };

    let mut alarms = Vec::new();
    for alarm_id in window
        .iter()
        .filter(|e| is_alarm_set_name(&e.event_name))
        .filter_map(|e| e.fields.alarm_id())
    {
        if !alarms.contains(&alarm_id) {
            alarms.push(alarm_id);
        }
    }
    alarms
}
