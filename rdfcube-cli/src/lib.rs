//! Library surface for the `rdfcube` command-line tool.
//!
//! Exposes argument parsing, command dispatch and logging setup so the binary
//! stays a thin shell and the commands can be exercised from tests.

pub mod cli;
pub mod logging;
