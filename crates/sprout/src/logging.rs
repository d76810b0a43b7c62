//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Crates whose events the default filter enables
const CRATES: [&str; 7] = [
    "sprout",
    "sprout_core",
    "sprout_registry",
    "sprout_resolver",
    "sprout_lockfile",
    "sprout_ledger",
    "sprout_config",
];

/// Filter directive enabling `level` for every sprout crate
pub fn filter_directive(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global fmt subscriber at `debug` when verbose, `info` otherwise.
///
/// `RUST_LOG` takes precedence when set. Returns false if a subscriber was
/// already installed.
pub fn init(verbose: bool) -> bool {
    let level = if verbose { "debug" } else { "info" };
    init_with_filter(&filter_directive(level))
}

/// Install the global fmt subscriber from a configured log setting.
///
/// A bare level such as `warn` applies to every sprout crate; anything else
/// is used as a full filter directive.
pub fn init_from_setting(log: &str) -> bool {
    if log.contains(['=', ',']) {
        init_with_filter(log)
    } else {
        init_with_filter(&filter_directive(log))
    }
}

fn init_with_filter(directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
