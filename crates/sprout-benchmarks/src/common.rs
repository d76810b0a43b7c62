//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};
use sprout_core::types::{ResolvedVersionMap, Version};
use sprout_registry::{Registry, RegistryResult};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// `count` ascending versions: 0.0.0, 0.1.0, ... wrapping into new majors
pub fn version_strings(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{}.{}.{}", i / 100, (i / 10) % 10, i % 10))
        .collect()
}

/// Registry of `width * depth` packages in `depth` layers.
///
/// Every package in layer `d` depends on every package in layer `d + 1` with
/// a lower bound, and on one package there with an upper bound, so each
/// package collects several rows and selection has to intersect them.
pub fn layered_registry(
    width: usize,
    depth: usize,
    versions_per_package: usize,
) -> RegistryResult<Registry> {
    let registry = Registry::new();
    let versions = version_strings(versions_per_package);
    let middle = &versions[versions.len() / 2];

    for layer in 0..depth {
        for slot in 0..width {
            let dependencies: Vec<(String, String)> = if layer + 1 < depth {
                (0..width)
                    .map(|next| {
                        let constraint = if next == slot {
                            format!("<={middle}")
                        } else {
                            ">=0.1".to_string()
                        };
                        (package_name(layer + 1, next), constraint)
                    })
                    .collect()
            } else {
                Vec::new()
            };

            let table: Vec<(String, Vec<(String, String)>)> = versions
                .iter()
                .map(|version| (version.clone(), dependencies.clone()))
                .collect();

            registry.register_package(&package_name(layer, slot), &versions, table)?;
        }
    }

    let roots: Vec<(String, String)> = (0..width)
        .map(|slot| (package_name(0, slot), String::new()))
        .collect();
    registry.register_package("root-app", &["1.0.0"], [("1.0.0", roots)])?;
    Ok(registry)
}

/// Name of the package at `slot` in `layer`
pub fn package_name(layer: usize, slot: usize) -> String {
    format!("pkg-{layer}-{slot}")
}

/// Resolved map with `count` packages
pub fn resolved_map(count: usize) -> ResolvedVersionMap {
    (0..count)
        .map(|i| (format!("package-{i:05}"), Version::new(vec![1, (i % 50) as u64, 0])))
        .collect()
}
