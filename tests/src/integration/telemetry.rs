//! # Metrics Export
//!
//! Dispatch counters from `veto-bus` surfacing in the Prometheus text that
//! `veto-telemetry` exposes.

#[cfg(test)]
mod tests {
    use crate::fixtures::{CallLog, Recorder};
    use veto_bus::{ListenerRegistry, Subject};
    use veto_telemetry::gather_metrics;

    fn sample(text: &str, name: &str) -> Option<u64> {
        text.lines()
            .filter(|line| !line.starts_with('#'))
            .find_map(|line| {
                let (metric, value) = line.split_once(' ')?;
                (metric == name).then(|| value.trim().parse::<f64>().ok())?
            })
            .map(|value| value as u64)
    }

    #[test]
    fn test_veto_shows_up_in_exported_metrics() {
        let log = CallLog::new();
        let registry = ListenerRegistry::new(Subject::new("valve").labeled("valve"));
        registry.add_listener(Recorder::accepting("audit", &log));
        registry.add_listener(Recorder::vetoing("guard", &log, "opening"));

        let before = gather_metrics()
            .ok()
            .and_then(|text| sample(&text, "vetobus_changes_vetoed_total"))
            .unwrap_or(0);

        assert!(registry.fire_vetoable_change("opening", 10, 90).is_err());

        let text = gather_metrics().unwrap();
        assert!(text.contains("vetobus_changes_vetoed_total"));
        assert!(text.contains("vetobus_compensations_total"));
        let after = sample(&text, "vetobus_changes_vetoed_total").unwrap();
        assert!(after > before, "vetoed counter went from {before} to {after}");
    }

    #[test]
    fn test_registrations_tracked_by_gauge() {
        let registry = ListenerRegistry::new(Subject::new("valve").labeled("valve"));
        registry.add_listener(Recorder::accepting("audit", &CallLog::new()));

        let text = gather_metrics().unwrap();
        assert!(text.contains("vetobus_listeners_registered"));
    }
}
