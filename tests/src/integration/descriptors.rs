//! # Descriptor Bindings
//!
//! Event-set descriptors driving live registries, and bean-context
//! propagation alongside ordinary fires.

#[cfg(test)]
mod tests {
    use crate::fixtures::{CallLog, Recorder};
    use veto_bus::{Listener, ListenerRegistry, Subject, VetoableChangeListener};
    use veto_descriptors::{
        AddAccessor, BeanContext, BeanContextEvent, BeanDescriptor, DescriptorError,
        EventSetDescriptor, GetAccessor, ListenerMethod, RemoveAccessor, TypeIdentity,
    };

    struct Thermostat;

    fn thermostat_registry() -> ListenerRegistry {
        ListenerRegistry::new(Subject::new(Thermostat).labeled("thermostat"))
    }

    #[test]
    fn test_canonical_descriptor_registers_for_fires() {
        let log = CallLog::new();
        let registry = thermostat_registry();
        let descriptor = EventSetDescriptor::vetoable_change();

        descriptor.add_listener(&registry, Recorder::accepting("any", &log)).unwrap();
        descriptor
            .add_listener(&registry, Listener::named("setpoint", Recorder::vetoing("guard", &log, "setpoint")))
            .unwrap();

        assert!(registry.fire_vetoable_change("setpoint", 20, 30).is_err());
        assert_eq!(log.names(), vec!["any", "guard"]);
        assert_eq!(descriptor.get_listeners(&registry).unwrap().len(), 2);
    }

    #[test]
    fn test_unicast_source_holds_one_listener() {
        let log = CallLog::new();
        let registry = thermostat_registry();
        let descriptor = EventSetDescriptor::builder("setpoint_change", TypeIdentity::of::<dyn VetoableChangeListener>())
            .listener_method(ListenerMethod::new("vetoable_change", "ChangeEvent"))
            .add_accessor(AddAccessor::unicast())
            .remove_accessor(RemoveAccessor::registry())
            .get_accessor(GetAccessor::registry())
            .require_accessors()
            .build()
            .unwrap();

        let first = Recorder::accepting("first", &log);
        descriptor.add_listener(&registry, first.clone()).unwrap();
        assert!(matches!(
            descriptor.add_listener(&registry, Recorder::accepting("second", &log)),
            Err(DescriptorError::TooManyListeners(name)) if name == "setpoint_change"
        ));

        descriptor.remove_listener(&registry, first).unwrap();
        descriptor.add_listener(&registry, Recorder::accepting("second", &log)).unwrap();

        registry.fire_vetoable_change("setpoint", 1, 2).unwrap();
        assert_eq!(log.names(), vec!["second"]);
    }

    #[test]
    fn test_merged_descriptor_gains_bindings() {
        let registry = thermostat_registry();
        let declared = EventSetDescriptor::builder("vetoable_change", TypeIdentity::of::<dyn VetoableChangeListener>())
            .listener_method(ListenerMethod::new("vetoable_change", "ChangeEvent"))
            .build()
            .unwrap();
        assert!(declared.add_listener(&registry, Recorder::accepting("x", &CallLog::new())).is_err());

        let merged = declared.merge(&EventSetDescriptor::vetoable_change());
        merged
            .add_listener(&registry, Recorder::accepting("x", &CallLog::new()))
            .unwrap();
        assert_eq!(registry.list_listeners().len(), 1);
    }

    #[test]
    fn test_bean_descriptor_names_the_subject_type() {
        let bean = BeanDescriptor::new(TypeIdentity::of::<Thermostat>());
        assert_eq!(bean.name(), "Thermostat");
        assert_eq!(bean.display_name(), "Thermostat");
    }

    #[test]
    fn test_context_annotation_is_independent_of_dispatch() {
        let building = BeanContext::new("building");
        let floor = BeanContext::new("floor");
        let event = BeanContextEvent::new(floor.clone());

        let log = CallLog::new();
        let registry = thermostat_registry();
        registry.add_listener(Recorder::accepting("L", &log));

        event.set_propagated_from(&building).unwrap();
        registry.fire_vetoable_change("setpoint", 1, 2).unwrap();

        assert_eq!(event.propagated_from().map(|c| c.name().to_string()), Some("building".into()));
        assert!(event.set_propagated_from(&floor).is_err());
        assert_eq!(log.names(), vec!["L"]);
    }
}
