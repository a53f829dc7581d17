//! Shared test utilities used across rdfcube crates.

pub mod fixtures;
pub mod tracing;
