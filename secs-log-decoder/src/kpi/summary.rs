//! KPI summary structure handed to the presentation layer
//!
//! Field names and sentinel strings are part of the output contract: the
//! dashboard renders these values as-is.

use crate::codes::Severity;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel for values that could not be determined
pub const NOT_AVAILABLE: &str = "N/A";

/// Lot id reported when the log contains events but no job start
pub const NO_JOB_LOT: &str = "Test Lot / No Job";

/// Context of an alarm raised outside any panel window
pub const IDLE_CONTEXT: &str = "Idle";

/// Terminal status of the job window analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "No Job Found")]
    NoJobFound,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Did not complete")]
    DidNotComplete,
    #[serde(rename = "Time Calculation Error")]
    TimeCalculationError,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::NoJobFound => write!(f, "No Job Found"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::DidNotComplete => write!(f, "Did not complete"),
            JobStatus::TimeCalculationError => write!(f, "Time Calculation Error"),
        }
    }
}

/// Outcome of a timed sub-analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AnalysisStatus {
    #[default]
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Time Calculation Error")]
    TimeCalculationError,
}

/// One fault and the time until the machine resumed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DowntimeIncident {
    #[serde(rename = "Alarm Time")]
    pub alarm_time: String,
    #[serde(rename = "Alarm ID")]
    pub alarm_id: i64,
    #[serde(rename = "Alarm Description")]
    pub alarm_description: String,
    #[serde(rename = "Severity")]
    pub severity: Severity,
    #[serde(rename = "Recovery Time")]
    pub recovery_time: String,
    #[serde(rename = "Downtime (sec)")]
    pub duration_sec: f64,
    /// `During panel <id>` or `Idle`
    #[serde(rename = "Context")]
    pub context: String,
}

/// A time-stamped context event (login, dock, status change)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedEvent {
    pub timestamp: String,
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingDetails {
    pub start_time: String,
    pub end_time: String,
    pub duration_sec: f64,
    pub status: AnalysisStatus,
}

impl Default for MappingDetails {
    fn default() -> Self {
        Self {
            start_time: NOT_AVAILABLE.to_string(),
            end_time: NOT_AVAILABLE.to_string(),
            duration_sec: 0.0,
            status: AnalysisStatus::Ok,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PanelSlot {
    pub panel_id: String,
    pub slot_id: String,
}

/// Span from a panel's identification read to its load completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelWindow {
    pub panel_id: String,
    pub start_time: String,
    /// `None` if no load completion followed the read
    pub end_time: Option<String>,
    pub start_index: usize,
    pub end_index: Option<usize>,
}

impl PanelWindow {
    /// True if the event at log position `index` falls inside this window
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && self.end_index.map_or(true, |end| index <= end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelInfo {
    /// Panel → slot, sorted numerically by slot
    pub panel_slot_map: Vec<PanelSlot>,
    pub unique_panel_ids: Vec<String>,
    pub panel_windows: Vec<PanelWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelCycleTime {
    /// 1-based panel position in the series
    pub panel_index: usize,
    pub cycle_time_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleTimeDetails {
    pub start_time: String,
    pub end_time: String,
    pub total_duration_sec: f64,
    pub average_cycle_time_sec: f64,
    pub panel_cycle_times: Vec<PanelCycleTime>,
    pub status: AnalysisStatus,
}

impl Default for CycleTimeDetails {
    fn default() -> Self {
        Self {
            start_time: NOT_AVAILABLE.to_string(),
            end_time: NOT_AVAILABLE.to_string(),
            total_duration_sec: 0.0,
            average_cycle_time_sec: 0.0,
            panel_cycle_times: Vec::new(),
            status: AnalysisStatus::Ok,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventFrequency {
    pub event_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmFrequency {
    pub alarm_id: i64,
    pub description: Option<String>,
    pub count: usize,
}

/// An event carrying an alarm id, for the alarm log table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmEvent {
    pub timestamp: String,
    pub event_name: String,
    pub alarm_id: String,
    pub description: Option<String>,
}

/// Complete KPI output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub job_status: JobStatus,
    pub lot_id: String,
    pub panel_count: u32,
    pub job_start_time: Option<String>,
    pub job_end_time: Option<String>,
    pub total_duration_sec: f64,
    pub avg_cycle_time_sec: f64,
    /// Distinct alarm ids raised inside the job window (whole log if no job)
    pub job_alarms: Vec<i64>,
    pub unique_alarms_count: usize,

    pub total_downtime_sec: f64,
    pub downtime_status: AnalysisStatus,
    pub alarms_with_context: Vec<DowntimeIncident>,

    pub magazine_ids: Vec<String>,
    pub operator_ids: Vec<String>,
    pub machine_statuses: Vec<String>,
    pub lot_ids: Vec<String>,
    pub operator_logins: Vec<TimedEvent>,
    pub dock_events: Vec<TimedEvent>,
    pub status_changes: Vec<TimedEvent>,

    pub mapping_details: MappingDetails,
    pub panel_info: PanelInfo,
    pub cycle_time_details: CycleTimeDetails,
    pub lot_to_panel_map: BTreeMap<String, Vec<String>>,

    pub event_counts: Vec<EventFrequency>,
    pub alarm_counts: Vec<AlarmFrequency>,
    pub alarm_events: Vec<AlarmEvent>,
}

impl Default for KpiSummary {
    fn default() -> Self {
        Self {
            job_status: JobStatus::NoJobFound,
            lot_id: NOT_AVAILABLE.to_string(),
            panel_count: 0,
            job_start_time: None,
            job_end_time: None,
            total_duration_sec: 0.0,
            avg_cycle_time_sec: 0.0,
            job_alarms: Vec::new(),
            unique_alarms_count: 0,
            total_downtime_sec: 0.0,
            downtime_status: AnalysisStatus::Ok,
            alarms_with_context: Vec::new(),
            magazine_ids: Vec::new(),
            operator_ids: Vec::new(),
            machine_statuses: Vec::new(),
            lot_ids: Vec::new(),
            operator_logins: Vec::new(),
            dock_events: Vec::new(),
            status_changes: Vec::new(),
            mapping_details: MappingDetails::default(),
            panel_info: PanelInfo::default(),
            cycle_time_details: CycleTimeDetails::default(),
            lot_to_panel_map: BTreeMap::new(),
            event_counts: Vec::new(),
            alarm_counts: Vec::new(),
            alarm_events: Vec::new(),
        }
    }
}
