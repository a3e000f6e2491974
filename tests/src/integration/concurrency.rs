//! # Concurrent Registration and Fire
//!
//! Many tasks registering, removing and firing against one registry tree.
//! Every fire sees a consistent snapshot and no call deadlocks, including
//! calls made from inside a listener.

#[cfg(test)]
mod tests {
    use crate::fixtures::{CallLog, Recorder, Threshold};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use veto_bus::{listener_fn, Listener, ListenerRegistry, SharedListener, Subject};

    fn shared_registry() -> Arc<ListenerRegistry> {
        Arc::new(ListenerRegistry::new(Subject::new("counter").labeled("counter")))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_is_not_lost() {
        let registry = shared_registry();
        let mut handles = Vec::new();

        for task in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                for i in 0..50 {
                    let listener = listener_fn(|_| Ok(()));
                    if i % 2 == 0 {
                        registry.add_listener(listener);
                    } else {
                        registry.add_named(&format!("p{task}"), listener);
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.list_listeners().len(), 400);
        assert_eq!(registry.child_count(), 8);
        assert_eq!(registry.listeners_for("p3").len(), 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fires_race_with_registration() {
        let registry = shared_registry();
        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = delivered.clone();
        registry.add_listener(listener_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        let churn = {
            let registry = registry.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..200 {
                    let transient: SharedListener = Arc::new(Threshold { max: i64::MAX });
                    registry.add_named("value", transient.clone());
                    registry.remove_named("value", &transient);
                }
            })
        };
        let fires = {
            let registry = registry.clone();
            tokio::task::spawn_blocking(move || {
                for i in 0..200_i64 {
                    registry.fire_vetoable_change("value", i, i + 1).unwrap();
                }
            })
        };

        timeout(Duration::from_secs(10), async {
            churn.await.unwrap();
            fires.await.unwrap();
        })
        .await
        .expect("registry calls should not deadlock");

        assert_eq!(delivered.load(Ordering::SeqCst), 200);
        assert!(registry.listeners_for("value").is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_vetoed_fires_on_many_threads_compensate_independently() {
        let registry = shared_registry();
        let log = CallLog::new();
        registry.add_listener(Recorder::accepting("A", &log));
        registry.add_listener(Arc::new(Threshold { max: 100 }) as SharedListener);

        let mut handles = Vec::new();
        for task in 0..4_i64 {
            let registry = registry.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                // Odd tasks exceed the threshold.
                let new_value = if task % 2 == 1 { 1_000 } else { 50 };
                registry.fire_vetoable_change("level", task, new_value).is_err()
            }));
        }

        let mut vetoed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                vetoed += 1;
            }
        }

        assert_eq!(vetoed, 2);
        // Each fire reaches A once; each veto adds one compensation to A.
        assert_eq!(log.names().len(), 4 + 2);
    }

    #[test]
    fn test_listener_registering_from_inside_fire_does_not_deadlock() {
        let registry = shared_registry();
        let log = CallLog::new();
        let late = Recorder::accepting("late", &log);

        let weak = Arc::downgrade(&registry);
        registry.add_listener(listener_fn(move |event| {
            let Some(registry) = weak.upgrade() else {
                return Ok(());
            };
            if registry.listeners_for(event.property_label()).is_empty() {
                registry.add_named(event.property_label(), late.clone());
                registry.remove_listener(Listener::named("absent", late.clone()));
            }
            Ok(())
        }));

        registry.fire_vetoable_change("x", 1, 2).unwrap();
        // Registered during the fire; the in-flight event had already
        // captured its snapshot.
        assert!(log.calls().is_empty());
        assert_eq!(registry.listeners_for("x").len(), 1);

        registry.fire_vetoable_change("x", 2, 3).unwrap();
        assert_eq!(log.names(), vec!["late"]);
    }
}
