//! End-to-end tests for registration, scopes, laziness and lifecycle
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use cradle_di::{BeanDefinition, ContainerBuilder, DiError, Lazy};

struct Counter {
    value: usize,
}

#[test]
fn singleton_resolves_to_the_same_instance() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("counter", |_| Ok(Counter { value: 7 })))
        .unwrap();
    let container = builder.build().unwrap();

    let first = container.resolve_typed::<Counter>("counter").unwrap();
    let second = container.resolve_typed::<Counter>("counter").unwrap();

    assert_eq!(first.value, 7);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn prototype_resolves_to_a_fresh_instance_every_time() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("counter", |_| Ok(Counter { value: 7 })).prototype())
        .unwrap();
    let container = builder.build().unwrap();

    let first = container.resolve_typed::<Counter>("counter").unwrap();
    let second = container.resolve_typed::<Counter>("counter").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn eager_singletons_are_constructed_at_build() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let seen = constructions.clone();

    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("counter", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Counter { value: 0 })
        }))
        .unwrap();
    let container = builder.build().unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    container.resolve("counter").unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_singleton_is_constructed_on_first_resolve_only() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let seen = constructions.clone();

    let mut builder = ContainerBuilder::new();
    builder
        .register(
            BeanDefinition::new("counter", move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Counter { value: 0 })
            })
            .lazy(),
        )
        .unwrap();
    let container = builder.build().unwrap();

    // Not constructed at build
    assert_eq!(constructions.load(Ordering::SeqCst), 0);

    container.resolve("counter").unwrap();
    container.resolve("counter").unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_prototype_constructs_once_per_trigger() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let seen = constructions.clone();

    let mut builder = ContainerBuilder::new();
    builder
        .register(
            BeanDefinition::new("counter", move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Counter { value: 0 })
            })
            .lazy()
            .prototype(),
        )
        .unwrap();
    let container = builder.build().unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 0);

    let handle = container.resolve_lazy::<Counter>("counter").unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 0);

    handle.get();
    handle.get();
    assert_eq!(constructions.load(Ordering::SeqCst), 2);
}

#[test]
fn duplicate_names_are_rejected_at_registration() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("counter", |_| Ok(Counter { value: 1 })))
        .unwrap();
    let result = builder.register(BeanDefinition::new("counter", |_| Ok(Counter { value: 2 })));

    assert!(matches!(result, Err(DiError::Duplicate(name)) if name == "counter"));
}

#[test]
fn unknown_names_fail_with_not_found() {
    let container = ContainerBuilder::new().build().unwrap();
    assert!(matches!(
        container.resolve("ghost"),
        Err(DiError::NotFound { .. })
    ));
    assert!(!container.contains("ghost"));
    assert_eq!(container.definition_count(), 0);
}

struct Vehicle {
    name: &'static str,
}

#[test]
fn type_lookup_uses_the_primary_candidate() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(
            BeanDefinition::new("volkswagen", |_| Ok(Vehicle { name: "Volkswagen Golf" }))
                .primary(),
        )
        .unwrap();
    builder
        .register(BeanDefinition::new("audi", |_| Ok(Vehicle { name: "Audi 8" })))
        .unwrap();
    let container = builder.build().unwrap();

    let vehicle = container.resolve_by_type::<Vehicle>().unwrap();
    assert_eq!(vehicle.name, "Volkswagen Golf");

    let all = container.resolve_all_by_type::<Vehicle>().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["audi"].name, "Audi 8");
}

#[test]
fn type_lookup_without_a_primary_is_ambiguous() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("volkswagen", |_| Ok(Vehicle { name: "Volkswagen Golf" })))
        .unwrap();
    builder
        .register(BeanDefinition::new("audi", |_| Ok(Vehicle { name: "Audi 8" })))
        .unwrap();
    let container = builder.build().unwrap();

    assert!(matches!(
        container.resolve_by_type::<Vehicle>(),
        Err(DiError::Ambiguous { .. })
    ));
}

struct Husband {
    wife: Lazy<Wife>,
}
struct Wife {
    husband: Arc<Husband>,
}

#[test]
fn a_cycle_with_a_lazy_edge_resolves() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(
            BeanDefinition::new("husband", |di| {
                Ok(Husband {
                    wife: di.resolve_lazy::<Wife>("wife")?,
                })
            })
            .depends_on_lazy("wife"),
        )
        .unwrap();
    builder
        .register(
            BeanDefinition::new("wife", |di| {
                Ok(Wife {
                    husband: di.resolve_typed::<Husband>("husband")?,
                })
            })
            .depends_on("husband"),
        )
        .unwrap();
    let container = builder.build().unwrap();

    let husband = container.resolve_typed::<Husband>("husband").unwrap();
    let wife = container.resolve_typed::<Wife>("wife").unwrap();

    // Both ends of the cycle hold a usable reference to the other
    assert!(Arc::ptr_eq(&wife.husband, &husband));
    assert!(Arc::ptr_eq(&husband.wife.get(), &wife));
}

#[test]
fn an_all_eager_cycle_fails_at_build() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(
            BeanDefinition::new("husband", |di| {
                Ok(Wife {
                    husband: di.resolve_typed::<Husband>("wife")?,
                })
            })
            .depends_on("wife"),
        )
        .unwrap();
    builder
        .register(
            BeanDefinition::new("wife", |di| {
                Ok(Wife {
                    husband: di.resolve_typed::<Husband>("husband")?,
                })
            })
            .depends_on("husband"),
        )
        .unwrap();

    let error = builder.build().unwrap_err();
    let DiError::Validation(report) = error else {
        panic!("expected a validation report, got {error}");
    };
    assert!(report
        .errors
        .iter()
        .any(|error| matches!(error, DiError::CircularDependency { .. })));
}

#[test]
fn an_undeclared_cycle_is_caught_at_construction() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("narcissist", |di| {
            // Depends on itself without declaring it
            let _ = di.resolve_typed::<Counter>("narcissist")?;
            Ok(Counter { value: 0 })
        }))
        .unwrap();

    let error = builder.build().unwrap_err();
    assert!(matches!(error, DiError::Construction { .. }));
    assert!(error.to_string().contains("circular dependency"));
}

#[test]
fn missing_declared_dependencies_fail_at_build() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("counter", |_| Ok(Counter { value: 0 })).depends_on("ghost"))
        .unwrap();

    let error = builder.build().unwrap_err();
    let DiError::Validation(report) = error else {
        panic!("expected a validation report, got {error}");
    };
    assert!(report
        .errors
        .iter()
        .any(|error| matches!(error, DiError::MissingDependency { .. })));
}

#[test]
fn factory_failures_propagate_unchanged() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(BeanDefinition::new("broken", |_| {
            Err::<Counter, _>("the machine is on fire".into())
        }))
        .unwrap();

    let error = builder.build().unwrap_err();
    assert!(matches!(error, DiError::Construction { .. }));
    assert!(error.to_string().contains("the machine is on fire"));
}

#[test]
fn close_runs_destroy_hooks_once_in_reverse_creation_order() {
    let destroyed: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let mut builder = ContainerBuilder::new();
    for name in ["first", "second", "third"] {
        let log = destroyed.clone();
        builder
            .register(
                BeanDefinition::new(name, |_| Ok(Counter { value: 0 }))
                    .on_destroy(move |_| log.lock().unwrap().push(name)),
            )
            .unwrap();
    }
    let container = builder.build().unwrap();

    container.close();
    container.close();

    assert_eq!(*destroyed.lock().unwrap(), vec!["third", "second", "first"]);
    assert!(matches!(container.resolve("first"), Err(DiError::Closed)));
}

#[test]
fn concurrent_resolves_construct_a_singleton_at_most_once() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let seen = constructions.clone();

    let mut builder = ContainerBuilder::new();
    builder
        .register(
            BeanDefinition::new("counter", move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                // Widen the race window
                std::thread::sleep(std::time::Duration::from_millis(10));
                Ok(Counter { value: 0 })
            })
            .lazy(),
        )
        .unwrap();
    let container = builder.build().unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let container = container.clone();
            scope.spawn(move || container.resolve_typed::<Counter>("counter").unwrap());
        }
    });

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}
