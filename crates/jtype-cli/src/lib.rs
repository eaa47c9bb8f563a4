//! Command-line driver for the jtype generic type engine.
//!
//! A universe file declares classes in JSON and lists queries against them;
//! `jtype run` answers each query with one JSON object.

pub mod args;
pub mod driver;
pub mod query;
pub mod tracing_config;
pub mod universe;

#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
