//! Downtime computation
//!
//! Every fault (an alarm-set event whose alarm maps to a stopping severity)
//! is charged the time until the next event that is not itself an alarm-set,
//! in log order. Downtime is a machine-level figure and spans the whole log,
//! not only the job window.

use crate::codes::{is_alarm_set_name, CodeTables};
use crate::config::AnalyzerConfig;
use crate::kpi::summary::{AnalysisStatus, DowntimeIncident, PanelWindow, IDLE_CONTEXT};
use crate::types::{round2, seconds_between, EventTable};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DowntimeReport {
    pub incidents: Vec<DowntimeIncident>,
    pub total_downtime_sec: f64,
    pub status: AnalysisStatus,
}

/// Describe where the machine was when the event at `index` happened
pub fn panel_context(windows: &[PanelWindow], index: usize) -> String {
    windows
        .iter()
        .rev()
        .find(|w| w.contains(index))
        .map(|w| format!("During panel {}", w.panel_id))
        .unwrap_or_else(|| IDLE_CONTEXT.to_string())
}

pub fn compute_downtime(
    table: &EventTable,
    tables: &CodeTables,
    config: &AnalyzerConfig,
    windows: &[PanelWindow],
) -> DowntimeReport {
    let events = table.events();
    let Some(last) = events.last() else {
        return DowntimeReport::default();
    };

    // next_clear[i]: first event after i that is not an alarm-set
    let mut next_clear = vec![None; events.len()];
    let mut following = None;
    for (i, event) in events.iter().enumerate().rev() {
        next_clear[i] = following;
        if !is_alarm_set_name(&event.event_name) {
            following = Some(i);
        }
    }

    let mut report = DowntimeReport::default();
    for (i, event) in events.iter().enumerate() {
        if !is_alarm_set_name(&event.event_name) {
            continue;
        }
        let Some(alarm_id) = event.fields.alarm_id() else {
            continue;
        };
        let Some(alarm) = tables.alarm(alarm_id) else {
            log::debug!("Alarm {} at {} is not in the alarm table", alarm_id, event.timestamp);
            continue;
        };
        if !config.is_fault(alarm.severity) {
            continue;
        }

        let recovery = next_clear[i].and_then(|j| events.get(j)).unwrap_or(last);
        let Some(duration) = seconds_between(&event.timestamp, &recovery.timestamp) else {
            log::warn!(
                "Cannot compute downtime between '{}' and '{}'",
                event.timestamp,
                recovery.timestamp
            );
            report.status = AnalysisStatus::TimeCalculationError;
            continue;
        };

        let duration = round2(duration);
        if duration <= 0.0 {
            log::debug!("Skipping non-positive downtime at {}", event.timestamp);
            continue;
        }

        report.incidents.push(DowntimeIncident {
            alarm_time: event.timestamp.clone(),
            alarm_id,
            alarm_description: alarm.description.clone(),
            severity: alarm.severity,
            recovery_time: recovery.timestamp.clone(),
            duration_sec: duration,
            context: panel_context(windows, i),
        });
    }

    report.total_downtime_sec = round2(report.incidents.iter().map(|i| i.duration_sec).sum());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::test_support::{event, table};
    use crate::types::{Event, Field};

    fn alarm(ts: &str, alarm_id: &str) -> Event {
        event(ts, "Alarm Set", &[(Field::AlarmId, alarm_id)])
    }

    fn run(events: Vec<Event>) -> DowntimeReport {
        compute_downtime(
            &table(events),
            &CodeTables::builtin(),
            &AnalyzerConfig::default(),
            &[],
        )
    }

    #[test]
    fn test_error_alarm_until_next_event() {
        let report = run(vec![
            alarm("2024/05/01 10:00:00.000000", "17"),
            event("2024/05/01 10:00:12.300000", "LoadedToTool", &[]),
        ]);

        assert_eq!(report.incidents.len(), 1);
        let incident = &report.incidents[0];
        assert_eq!(incident.duration_sec, 12.3);
        assert_eq!(incident.alarm_description, "<0190>Emergency stop");
        assert_eq!(incident.recovery_time, "2024/05/01 10:00:12.300000");
        assert_eq!(incident.context, IDLE_CONTEXT);
        assert_eq!(report.total_downtime_sec, 12.3);
    }

    #[test]
    fn test_warning_alarm_is_not_downtime() {
        let report = run(vec![
            alarm("2024/05/01 10:00:00.000000", "65"),
            event("2024/05/01 10:00:30.000000", "LoadedToTool", &[]),
        ]);
        assert!(report.incidents.is_empty());
        assert_eq!(report.total_downtime_sec, 0.0);
    }

    #[test]
    fn test_consecutive_alarms_share_recovery() {
        let report = run(vec![
            alarm("2024/05/01 10:00:00.000000", "17"),
            alarm("2024/05/01 10:00:02.000000", "18"),
            event("2024/05/01 10:00:10.000000", "Alarm Cleared", &[]),
        ]);
        let durations: Vec<f64> = report.incidents.iter().map(|i| i.duration_sec).collect();
        assert_eq!(durations, vec![10.0, 8.0]);
        assert_eq!(report.total_downtime_sec, 18.0);
    }

    #[test]
    fn test_trailing_alarm_recovers_at_last_event() {
        let report = run(vec![
            event("2024/05/01 10:00:00.000000", "IDRead", &[]),
            alarm("2024/05/01 10:00:05.000000", "17"),
            alarm("2024/05/01 10:00:09.000000", "113"),
        ]);
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.incidents[0].duration_sec, 4.0);
    }

    #[test]
    fn test_non_positive_durations_excluded() {
        let report = run(vec![
            alarm("2024/05/01 10:00:05.000000", "17"),
            event("2024/05/01 10:00:05.000000", "IDRead", &[]),
            alarm("2024/05/01 10:00:09.000000", "18"),
            event("2024/05/01 10:00:01.000000", "IDRead", &[]),
        ]);
        assert!(report.incidents.is_empty());
        assert_eq!(report.total_downtime_sec, 0.0);
    }

    #[test]
    fn test_unparseable_timestamp_flags_status() {
        let report = run(vec![
            alarm("2024/05/01 25:00:00.000000", "17"),
            event("2024/05/01 10:00:05.000000", "IDRead", &[]),
            alarm("2024/05/01 10:00:10.000000", "18"),
            event("2024/05/01 10:00:15.000000", "IDRead", &[]),
        ]);
        assert_eq!(report.status, AnalysisStatus::TimeCalculationError);
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.total_downtime_sec, 5.0);
    }

    #[test]
    fn test_alarm_during_panel_window() {
        let windows = vec![PanelWindow {
            panel_id: "P7".to_string(),
            start_time: "2024/05/01 10:00:00.000000".to_string(),
            end_time: Some("2024/05/01 10:00:20.000000".to_string()),
            start_index: 0,
            end_index: Some(2),
        }];
        assert_eq!(panel_context(&windows, 1), "During panel P7");
        assert_eq!(panel_context(&windows, 3), IDLE_CONTEXT);
    }

    #[test]
    fn test_total_matches_sum_of_entries() {
        let report = run(vec![
            alarm("2024/05/01 10:00:00.000000", "17"),
            event("2024/05/01 10:00:01.333333", "IDRead", &[]),
            alarm("2024/05/01 10:00:02.000000", "129"),
            event("2024/05/01 10:00:03.666666", "IDRead", &[]),
        ]);
        let sum: f64 = report.incidents.iter().map(|i| i.duration_sec).sum();
        assert_eq!(report.incidents.len(), 2);
        assert_eq!(report.total_downtime_sec, round2(sum));
    }
}
