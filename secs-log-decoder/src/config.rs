//! Analyzer configuration types
//!
//! The KPI engine keys every sub-analysis on event names. The equipment
//! firmware has not been consistent about which events bound a job, so all of
//! those name sets are configuration rather than constants.

use crate::codes::Severity;
use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};

/// Which cycle-end event closes the cycle-time series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleEndPolicy {
    /// First cycle-end event after the cycle start
    #[default]
    First,
    /// Last cycle-end event in the log
    Last,
}

/// Configuration for the KPI engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Events that start a job (the lot id and panel count are read from it)
    pub job_start_events: Vec<String>,

    /// Events that complete a job
    pub job_end_events: Vec<String>,

    /// Alarm severities that count as downtime
    pub fault_severities: Vec<Severity>,

    /// Panel identification reads (carry PanelID/SlotID/LotID)
    pub panel_read_events: Vec<String>,

    /// Per-panel load completions (panel window ends, cycle ticks)
    pub panel_loaded_events: Vec<String>,

    /// Events that start the cycle-time series
    pub cycle_start_events: Vec<String>,

    /// Events that end the cycle-time series
    pub cycle_end_events: Vec<String>,

    pub cycle_end_policy: CycleEndPolicy,

    /// Events that start the magazine mapping phase
    pub mapping_start_events: Vec<String>,

    /// Events that end the magazine mapping phase
    pub mapping_end_events: Vec<String>,

    /// Machine control-mode events (local/remote/offline)
    pub machine_status_events: Vec<String>,

    /// Operator login and id-check events
    pub login_events: Vec<String>,

    /// Magazine dock/undock events
    pub dock_events: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            job_start_events: names(&["LOADSTART"]),
            job_end_events: names(&["MagToMagCompleted", "LoadToToolCompleted"]),
            fault_severities: vec![Severity::Error, Severity::Alarm],
            panel_read_events: names(&["IDRead"]),
            panel_loaded_events: names(&["LoadedToTool"]),
            cycle_start_events: names(&["LOADSTART"]),
            cycle_end_events: names(&["LoadToToolCompleted"]),
            cycle_end_policy: CycleEndPolicy::First,
            mapping_start_events: names(&["MagazineDocked"]),
            mapping_end_events: names(&["MappingCompleted"]),
            machine_status_events: names(&[
                "Control State Local",
                "Control State Remote",
                "Equipment Offline",
            ]),
            login_events: names(&["RequestOperatorLogin", "RequestOperatorIdCheck"]),
            dock_events: names(&["RequestMagazineDock", "MagazineDocked", "MagazineUndocked"]),
        }
    }
}

impl AnalyzerConfig {
    /// Create a new analyzer configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: replace the job end event set
    pub fn with_job_end_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job_end_events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: replace the job start event set
    pub fn with_job_start_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job_start_events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: replace the fault severity set
    pub fn with_fault_severities(mut self, severities: Vec<Severity>) -> Self {
        self.fault_severities = severities;
        self
    }

    /// Builder method: set which cycle-end event closes the series
    pub fn with_cycle_end_policy(mut self, policy: CycleEndPolicy) -> Self {
        self.cycle_end_policy = policy;
        self
    }

    /// Check if an alarm severity counts as downtime
    pub fn is_fault(&self, severity: Severity) -> bool {
        self.fault_severities.contains(&severity)
    }

    /// Reject configurations that make an analysis impossible to run
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("job_start_events", &self.job_start_events),
            ("job_end_events", &self.job_end_events),
            ("panel_read_events", &self.panel_read_events),
        ];
        for (name, list) in required {
            if list.iter().all(|s| s.trim().is_empty()) {
                return Err(DecoderError::ConfigError(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}
