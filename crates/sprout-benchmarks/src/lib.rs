//! Sprout benchmarking suite
//!
//! Benchmarks for version and constraint parsing, version selection,
//! resolution over synthetic registries, and the lockfile codec.

pub mod common;

pub use common::*;
