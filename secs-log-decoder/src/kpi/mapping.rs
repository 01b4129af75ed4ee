//! Magazine mapping phase timing

use crate::config::AnalyzerConfig;
use crate::kpi::summary::{AnalysisStatus, MappingDetails};
use crate::types::{parse_timestamp, round2, seconds_between, EventTable};

/// True if timestamp `a` is strictly later than `b`
///
/// Falls back to comparing the raw strings, which sort chronologically in the
/// log's fixed-width format, when either side does not parse.
fn is_later(a: &str, b: &str) -> bool {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a > b,
        _ => a > b,
    }
}

/// Time from the first magazine dock to the first mapping completion after it
pub fn mapping_phase(table: &EventTable, config: &AnalyzerConfig) -> MappingDetails {
    let Some(start) = table.first_named_from(&config.mapping_start_events, 0) else {
        return MappingDetails::default();
    };
    let Some(end) = table
        .named(&config.mapping_end_events)
        .find(|e| is_later(&e.timestamp, &start.timestamp))
    else {
        return MappingDetails::default();
    };

    let (duration_sec, status) = match seconds_between(&start.timestamp, &end.timestamp) {
        Some(duration) => (round2(duration), AnalysisStatus::Ok),
        None => (0.0, AnalysisStatus::TimeCalculationError),
    };

    MappingDetails {
        start_time: start.timestamp.clone(),
        end_time: end.timestamp.clone(),
        duration_sec,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::summary::NOT_AVAILABLE;
    use crate::kpi::test_support::{event, table};

    #[test]
    fn test_mapping_duration() {
        let events = table(vec![
            event("2024/05/01 10:00:00.000000", "MappingCompleted", &[]),
            event("2024/05/01 10:01:00.000000", "MagazineDocked", &[]),
            event("2024/05/01 10:01:45.250000", "MappingCompleted", &[]),
            event("2024/05/01 10:03:00.000000", "MappingCompleted", &[]),
        ]);
        let details = mapping_phase(&events, &AnalyzerConfig::default());
        assert_eq!(details.start_time, "2024/05/01 10:01:00.000000");
        assert_eq!(details.end_time, "2024/05/01 10:01:45.250000");
        assert_eq!(details.duration_sec, 45.25);
        assert_eq!(details.status, AnalysisStatus::Ok);
    }

    #[test]
    fn test_no_dock_event() {
        let events = table(vec![event("2024/05/01 10:00:00.000000", "MappingCompleted", &[])]);
        let details = mapping_phase(&events, &AnalyzerConfig::default());
        assert_eq!(details.start_time, NOT_AVAILABLE);
        assert_eq!(details.end_time, NOT_AVAILABLE);
        assert_eq!(details.duration_sec, 0.0);
    }

    #[test]
    fn test_completion_must_be_strictly_later() {
        let events = table(vec![
            event("2024/05/01 10:00:00.000000", "MagazineDocked", &[]),
            event("2024/05/01 10:00:00.000000", "MappingCompleted", &[]),
        ]);
        let details = mapping_phase(&events, &AnalyzerConfig::default());
        assert_eq!(details, MappingDetails::default());
    }

    #[test]
    fn test_unparseable_times_compare_as_text() {
        let events = table(vec![
            event("2024/05/01 25:00:00.000000", "MagazineDocked", &[]),
            event("2024/05/01 24:59:00.000000", "MappingCompleted", &[]),
            event("2024/05/01 26:00:00.000000", "MappingCompleted", &[]),
        ]);
        let details = mapping_phase(&events, &AnalyzerConfig::default());
        assert_eq!(details.end_time, "2024/05/01 26:00:00.000000");
        assert_eq!(details.duration_sec, 0.0);
        assert_eq!(details.status, AnalysisStatus::TimeCalculationError);
    }
}
