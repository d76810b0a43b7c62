//! Unit tests for the registry

use super::*;
use sprout_core::error::SproutError;
use sprout_core::types::Op;
use std::thread;

fn v(text: &str) -> Version {
    Version::parse(text).unwrap()
}

fn create_test_registry() -> Registry {
    let registry = Registry::new();
    registry
        .register_package("urllib3", &["1.26.0", "1.25.0", "2.0.0"], NO_DEPENDENCIES)
        .unwrap();
    registry
        .register_package(
            "requests",
            &["2.27.0", "2.28.0"],
            [
                ("2.28.0", vec![("urllib3", ">=1.26.0"), ("certifi", "")]),
                ("2.27.0", vec![("urllib3", "<2")]),
            ],
        )
        .unwrap();
    registry
}

#[test]
fn test_versions_of_sorted() {
    let registry = create_test_registry();

    assert_eq!(
        registry.versions_of("urllib3"),
        vec![v("1.25.0"), v("1.26.0"), v("2.0.0")]
    );
    assert!(registry.versions_of("unknown").is_empty());
}

#[test]
fn test_dependencies_of() {
    let registry = create_test_registry();

    let deps = registry.dependencies_of("requests", &v("2.28.0"));
    assert_eq!(deps.len(), 2);
    assert_eq!(deps[0].name, "urllib3");
    assert_eq!(deps[0].constraint.as_ref().map(|c| c.op), Some(Op::GreaterEq));
    assert_eq!(deps[1].name, "certifi");
    assert_eq!(deps[1].constraint, None);

    assert!(registry.dependencies_of("requests", &v("1.0.0")).is_empty());
    assert!(registry.dependencies_of("urllib3", &v("1.26.0")).is_empty());
    assert!(registry.dependencies_of("unknown", &v("1.0.0")).is_empty());
}

#[test]
fn test_register_replaces_entry() {
    let registry = create_test_registry();

    let previous = registry
        .register(PackageSpec::leaf("requests", vec![v("3.0.0")]))
        .unwrap();
    assert!(previous.is_some());

    assert_eq!(registry.versions_of("requests"), vec![v("3.0.0")]);
    assert!(registry.dependencies_of("requests", &v("2.28.0")).is_empty());
}

#[test]
fn test_register_package_rejects_bad_text() {
    let registry = Registry::new();

    let err = registry
        .register_package("bad", &["1.0", "one"], NO_DEPENDENCIES)
        .unwrap_err();
    assert!(matches!(err, SproutError::MalformedVersion { .. }));

    let err = registry
        .register_package("bad", &["1.0"], [("1.0", vec![("dep", "=>1")])])
        .unwrap_err();
    assert!(matches!(err, SproutError::MalformedConstraint { .. }));

    assert!(!registry.contains("bad"));
}

#[test]
fn test_register_rejects_names_a_lockfile_cannot_hold() {
    let registry = Registry::new();

    let err = registry
        .register_package("my pkg", &["1.0"], NO_DEPENDENCIES)
        .unwrap_err();
    assert!(matches!(err, SproutError::MalformedPackageName { ref name } if name == "my pkg"));

    let err = registry
        .register_package("app", &["1.0"], [("1.0", vec![("left==pad", "")])])
        .unwrap_err();
    assert!(matches!(err, SproutError::MalformedPackageName { ref name } if name == "left==pad"));

    let err = registry
        .register(PackageSpec::leaf("", vec![v("1.0")]))
        .unwrap_err();
    assert_eq!(err.kind(), "malformed-package-name");

    assert!(registry.is_empty());
}

#[test]
fn test_latest_and_find_compatible() {
    let registry = create_test_registry();

    assert_eq!(registry.latest_version("urllib3"), Some(v("2.0.0")));
    assert_eq!(registry.latest_version("unknown"), None);

    let below_two = Constraint::parse("<2.0.0").unwrap();
    assert_eq!(registry.find_compatible("urllib3", &below_two), Some(v("1.26.0")));

    let impossible = Constraint::parse(">=3").unwrap();
    assert_eq!(registry.find_compatible("urllib3", &impossible), None);
}

#[test]
fn test_package_names_and_stats() {
    let registry = create_test_registry();

    assert_eq!(registry.package_names(), vec!["requests", "urllib3"]);
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());

    let stats = registry.stats();
    assert_eq!(stats.packages, 2);
    assert_eq!(stats.versions, 5);
    assert_eq!(stats.dependency_edges, 3);
}

#[test]
fn test_snapshot_is_frozen() {
    let registry = create_test_registry();
    let snapshot = registry.snapshot();

    registry
        .register(PackageSpec::leaf("urllib3", vec![v("9.0.0")]))
        .unwrap();

    assert_eq!(snapshot.versions_of("urllib3").len(), 3);
    assert_eq!(registry.versions_of("urllib3"), vec![v("9.0.0")]);
    assert_eq!(snapshot.dependencies_of("requests", &v("2.27.0")).len(), 1);
    assert!(snapshot.versions_of("unknown").is_empty());
    assert_eq!(snapshot.len(), 2);
}

#[test]
fn test_concurrent_readers_and_writer() {
    let registry = Arc::new(create_test_registry());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                if i % 4 == 0 {
                    registry
                        .register(PackageSpec::leaf(format!("pkg{i}"), vec![v("1.0")]))
                        .unwrap();
                }
                registry.versions_of("urllib3").len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
    assert_eq!(registry.len(), 4);
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn registered_versions_are_sorted_and_unique(
            raw in prop::collection::vec(prop::collection::vec(0u64..5, 1..4), 0..20)
        ) {
            let texts: Vec<String> = raw
                .iter()
                .map(|components| {
                    components.iter().map(ToString::to_string).collect::<Vec<_>>().join(".")
                })
                .collect();

            let registry = Registry::new();
            registry.register_package("pkg", &texts, NO_DEPENDENCIES).unwrap();
            let versions = registry.versions_of("pkg");

            prop_assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert_eq!(registry.latest_version("pkg"), versions.iter().max().cloned());
            for text in &texts {
                prop_assert!(versions.contains(&v(text)));
            }
        }
    }
}
