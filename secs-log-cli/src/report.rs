//! Output rendering: JSON document and a short console overview

use anyhow::Result;
use secs_log_decoder::{Analysis, EventTable, KpiSummary};
use serde::Serialize;

/// JSON document written by the CLI
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub summary: &'a KpiSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<&'a EventTable>,
}

impl<'a> Report<'a> {
    pub fn new(analysis: &'a Analysis, include_events: bool) -> Self {
        Self {
            summary: &analysis.summary,
            events: include_events.then_some(&analysis.events),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Human-readable overview of the headline KPIs
pub fn overview(summary: &KpiSummary) -> String {
    let mut lines = vec![
        format!("Job status:     {}", summary.job_status),
        format!("Lot:            {}", summary.lot_id),
        format!("Panels:         {}", summary.panel_count),
        format!("Duration:       {:.2} s", summary.total_duration_sec),
        format!("Avg cycle time: {:.2} s", summary.avg_cycle_time_sec),
        format!("Job alarms:     {}", summary.unique_alarms_count),
        format!(
            "Downtime:       {:.2} s ({} incidents)",
            summary.total_downtime_sec,
            summary.alarms_with_context.len()
        ),
    ];
    for incident in &summary.alarms_with_context {
        lines.push(format!(
            "  {} {} {:.2} s [{}]",
            incident.alarm_time, incident.alarm_description, incident.duration_sec, incident.context
        ));
    }
    lines.join("\n")
}
