//! Per-panel cycle-time series
//!
//! The series runs from the first cycle start to the configured cycle end. Each
//! load completion inside it closes one panel cycle; the first cycle is
//! measured from the cycle start itself.

use crate::config::{AnalyzerConfig, CycleEndPolicy};
use crate::kpi::summary::{AnalysisStatus, CycleTimeDetails, PanelCycleTime, NOT_AVAILABLE};
use crate::types::{round2, seconds_between, Event, EventTable};

fn cycle_end<'a>(
    table: &'a EventTable,
    config: &'a AnalyzerConfig,
    start: &Event,
) -> Option<&'a Event> {
    match config.cycle_end_policy {
        CycleEndPolicy::First => table.first_named_from(&config.cycle_end_events, start.index),
        CycleEndPolicy::Last => table
            .named(&config.cycle_end_events)
            .filter(|e| e.index >= start.index)
            .last(),
    }
}

pub fn cycle_times(table: &EventTable, config: &AnalyzerConfig) -> CycleTimeDetails {
    let Some(start) = table.first_named_from(&config.cycle_start_events, 0) else {
        return CycleTimeDetails::default();
    };
    let end = cycle_end(table, config, start);
    let end_index = end.map_or(usize::MAX, |e| e.index);

    let loads: Vec<&Event> = table
        .named(&config.panel_loaded_events)
        .filter(|e| e.index > start.index && e.index <= end_index)
        .collect();

    let mut details = CycleTimeDetails {
        start_time: start.timestamp.clone(),
        end_time: end.map_or_else(|| NOT_AVAILABLE.to_string(), |e| e.timestamp.clone()),
        ..CycleTimeDetails::default()
    };

    if let Some(end) = end {
        match seconds_between(&start.timestamp, &end.timestamp) {
            Some(duration) => details.total_duration_sec = round2(duration),
            None => {
                details.status = AnalysisStatus::TimeCalculationError;
                return details;
            }
        }
    }

    let mut previous = start;
    let mut series = Vec::with_capacity(loads.len());
    for (i, load) in loads.into_iter().enumerate() {
        let Some(interval) = seconds_between(&previous.timestamp, &load.timestamp) else {
            log::warn!(
                "Cannot compute cycle time between '{}' and '{}'",
                previous.timestamp,
                load.timestamp
            );
            details.status = AnalysisStatus::TimeCalculationError;
            return details;
        };
        series.push(PanelCycleTime {
            panel_index: i + 1,
            cycle_time_sec: round2(interval),
        });
        previous = load;
    }

    if !series.is_empty() {
        let sum: f64 = series.iter().map(|c| c.cycle_time_sec).sum();
        details.average_cycle_time_sec = round2(sum / series.len() as f64);
    }
    details.panel_cycle_times = series;
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::test_support::{event, table};

    fn sample() -> EventTable {
        table(vec![
            event("2024/05/01 10:00:00.000000", "LoadedToTool", &[]),
            event("2024/05/01 10:01:00.000000", "LOADSTART", &[]),
            event("2024/05/01 10:01:20.000000", "LoadedToTool", &[]),
            event("2024/05/01 10:01:50.000000", "LoadedToTool", &[]),
            event("2024/05/01 10:02:00.000000", "LoadToToolCompleted", &[]),
            event("2024/05/01 10:02:30.000000", "LoadedToTool", &[]),
            event("2024/05/01 10:03:00.000000", "LoadToToolCompleted", &[]),
        ])
    }

    #[test]
    fn test_series_until_first_completion() {
        let details = cycle_times(&sample(), &AnalyzerConfig::default());

        assert_eq!(details.start_time, "2024/05/01 10:01:00.000000");
        assert_eq!(details.end_time, "2024/05/01 10:02:00.000000");
        assert_eq!(details.total_duration_sec, 60.0);
        let series: Vec<(usize, f64)> = details
            .panel_cycle_times
            .iter()
            .map(|c| (c.panel_index, c.cycle_time_sec))
            .collect();
        assert_eq!(series, vec![(1, 20.0), (2, 30.0)]);
        assert_eq!(details.average_cycle_time_sec, 25.0);
        assert_eq!(details.status, AnalysisStatus::Ok);
    }

    #[test]
    fn test_series_until_last_completion() {
        let config = AnalyzerConfig::default().with_cycle_end_policy(CycleEndPolicy::Last);
        let details = cycle_times(&sample(), &config);

        assert_eq!(details.end_time, "2024/05/01 10:03:00.000000");
        assert_eq!(details.total_duration_sec, 120.0);
        assert_eq!(details.panel_cycle_times.len(), 3);
        assert_eq!(details.panel_cycle_times[2].cycle_time_sec, 40.0);
    }

    #[test]
    fn test_no_start_gives_default() {
        let events = table(vec![event("2024/05/01 10:00:00.000000", "LoadedToTool", &[])]);
        assert_eq!(
            cycle_times(&events, &AnalyzerConfig::default()),
            CycleTimeDetails::default()
        );
    }

    #[test]
    fn test_open_series_without_completion() {
        let events = table(vec![
            event("2024/05/01 10:00:00.000000", "LOADSTART", &[]),
            event("2024/05/01 10:00:15.000000", "LoadedToTool", &[]),
        ]);
        let details = cycle_times(&events, &AnalyzerConfig::default());
        assert_eq!(details.end_time, NOT_AVAILABLE);
        assert_eq!(details.total_duration_sec, 0.0);
        assert_eq!(details.panel_cycle_times.len(), 1);
        assert_eq!(details.average_cycle_time_sec, 15.0);
    }

    #[test]
    fn test_bad_timestamp_flags_status() {
        let events = table(vec![
            event("2024/05/01 10:00:00.000000", "LOADSTART", &[]),
            event("garbage", "LoadedToTool", &[]),
        ]);
        let details = cycle_times(&events, &AnalyzerConfig::default());
        assert_eq!(details.status, AnalysisStatus::TimeCalculationError);
        assert!(details.panel_cycle_times.is_empty());
    }
}
