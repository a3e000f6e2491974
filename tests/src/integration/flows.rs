//! # End-to-End Fire Flows
//!
//! A subject, its registry tree and a handful of recording listeners, driven
//! through the full fire protocol:
//!
//! 1. **Global veto**: the accepted prefix is compensated, the child skipped
//! 2. **Named routing**: globals first, then the property's own listeners
//! 3. **Child veto**: propagates through the parent without a second unwind

#[cfg(test)]
mod tests {
    use crate::fixtures::{Call, CallLog, Recorder};
    use rand::seq::SliceRandom;
    use rand::Rng;
    use serde_json::json;
    use std::sync::Arc;
    use veto_bus::{listener_fn, ChangeEvent, Listener, ListenerRegistry, Subject};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// The bean whose properties change.
    struct Panel;

    fn panel_registry() -> ListenerRegistry {
        ListenerRegistry::new(Subject::new(Panel).labeled("panel"))
    }

    /// R(S) with L1 (accepts), L2 (vetoes "x"), L3 (accepts), all global.
    fn scenario_registry(log: &CallLog) -> ListenerRegistry {
        let registry = panel_registry();
        registry.add_listener(Recorder::accepting("L1", log));
        registry.add_listener(Recorder::vetoing("L2", log, "x"));
        registry.add_listener(Recorder::accepting("L3", log));
        registry
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[test]
    fn test_global_veto_unwinds_accepted_prefix() {
        let log = CallLog::new();
        let registry = scenario_registry(&log);
        registry.add_named("x", Recorder::accepting("X", &log));

        let event = ChangeEvent::for_property(registry.source().clone(), "x", 1, 2);
        let veto = registry.fire_event(&event).unwrap_err();

        assert_eq!(veto.event(), &event);
        assert_eq!(veto.message(), "L2 vetoes x");
        assert_eq!(
            log.calls(),
            vec![
                Call::new("L1", "x", 1, 2),
                Call::new("L2", "x", 1, 2),
                Call::new("L1", "x", 2, 1),
            ]
        );
    }

    #[test]
    fn test_named_listener_follows_globals() {
        let log = CallLog::new();
        let registry = scenario_registry(&log);
        registry.add_named("y", Recorder::accepting("L4", &log));

        registry.fire_vetoable_change("y", 5, 6).unwrap();

        assert_eq!(
            log.calls(),
            vec![
                Call::new("L1", "y", 5, 6),
                Call::new("L2", "y", 5, 6),
                Call::new("L3", "y", 5, 6),
                Call::new("L4", "y", 5, 6),
            ]
        );
    }

    #[test]
    fn test_child_veto_propagates_without_parent_unwind() {
        let log = CallLog::new();
        let registry = panel_registry();
        registry.add_listener(Recorder::accepting("G", &log));
        registry.add_named("z", Recorder::accepting("Z1", &log));
        registry.add_named("z", Recorder::vetoing("Z2", &log, "z"));

        let veto = registry.fire_vetoable_change("z", "a", "b").unwrap_err();

        assert_eq!(veto.message(), "Z2 vetoes z");
        assert_eq!(log.names(), vec!["G", "Z1", "Z2", "Z1"]);
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    #[test]
    fn test_equal_values_reach_nobody() {
        let log = CallLog::new();
        let registry = scenario_registry(&log);
        registry.add_named("x", Recorder::accepting("X", &log));

        registry.fire_vetoable_change("x", json!({"w": 3}), json!({"w": 3})).unwrap();
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_unnamed_change_reaches_globals_only() {
        let log = CallLog::new();
        let registry = panel_registry();
        registry.add_listener(Recorder::accepting("G", &log));
        registry.add_named("x", Recorder::accepting("X", &log));

        registry.fire_optional_change(None, Some(json!(1)), None).unwrap();
        assert_eq!(log.names(), vec!["G"]);
        assert_eq!(log.calls()[0].property, None);
    }

    #[test]
    fn test_shuffled_registration_order_is_delivery_order() {
        let mut names: Vec<String> = (0..16).map(|i| format!("L{i}")).collect();
        names.shuffle(&mut rand::thread_rng());

        let log = CallLog::new();
        let registry = panel_registry();
        for name in &names {
            registry.add_listener(Recorder::accepting(name, &log));
        }

        registry.fire_vetoable_change("x", 0, 1).unwrap();
        assert_eq!(log.names(), names);
    }

    #[test]
    fn test_veto_position_sets_compensation_prefix() {
        let mut rng = rand::thread_rng();
        for _ in 0..8 {
            let total = 6;
            let vetoer = rng.gen_range(0..total);

            let log = CallLog::new();
            let registry = panel_registry();
            for i in 0..total {
                let name = format!("L{i}");
                if i == vetoer {
                    registry.add_listener(Recorder::vetoing(&name, &log, "x"));
                } else {
                    registry.add_listener(Recorder::accepting(&name, &log));
                }
            }

            assert!(registry.fire_vetoable_change("x", 1, 2).is_err());

            let calls = log.calls();
            assert_eq!(calls.len(), 2 * vetoer + 1, "vetoer at {vetoer}");
            let compensated: Vec<_> = calls[vetoer + 1..].iter().map(|c| c.listener.clone()).collect();
            let expected: Vec<_> = (0..vetoer).map(|i| format!("L{i}")).collect();
            assert_eq!(compensated, expected);
            assert!(calls[vetoer + 1..].iter().all(|c| c.new == Some(json!(1))));
        }
    }

    #[test]
    fn test_duplicate_registration_notified_twice_and_removed_once() {
        let log = CallLog::new();
        let registry = panel_registry();
        let listener = Recorder::accepting("dup", &log);
        registry.add_listener(listener.clone());
        registry.add_listener(listener.clone());

        registry.fire_vetoable_change("x", 1, 2).unwrap();
        assert_eq!(log.names(), vec!["dup", "dup"]);

        log.clear();
        registry.remove_listener(listener);
        registry.fire_vetoable_change("x", 2, 3).unwrap();
        assert_eq!(log.names(), vec!["dup"]);
    }

    #[test]
    fn test_proxy_registration_round_trips_through_listing() {
        let log = CallLog::new();
        let registry = panel_registry();
        let inner = Recorder::accepting("P", &log);
        registry.add_listener(Listener::named("P", inner.clone()));

        let listed = registry.list_listeners();
        assert_eq!(listed, vec![Listener::named("P", inner.clone())]);

        registry.remove_listener(listed[0].clone());
        assert!(registry.list_listeners().is_empty());
        assert!(registry.has_child("P"));
    }

    #[test]
    fn test_removal_of_unknown_listener_changes_nothing() {
        let log = CallLog::new();
        let registry = scenario_registry(&log);
        let before = registry.list_listeners();

        registry.remove_listener(listener_fn(|_| Ok(())));
        registry.remove_listener(Listener::named("never", Recorder::accepting("N", &log)));

        assert_eq!(registry.list_listeners(), before);
    }

    #[test]
    fn test_listener_can_read_subject() {
        let registry = panel_registry();
        let saw_panel = Arc::new(parking_lot::Mutex::new(false));
        let flag = saw_panel.clone();
        registry.add_listener(listener_fn(move |event| {
            *flag.lock() = event.subject().downcast_ref::<Panel>().is_some();
            Ok(())
        }));

        registry.fire_vetoable_change("x", 1, 2).unwrap();
        assert!(*saw_panel.lock());
    }
}
