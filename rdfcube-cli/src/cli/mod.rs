//! Command-line interface orchestration for rdfcube.
//!
//! `serialize` turns a directory holding `data.csv` and a cube description
//! into a Turtle file; `frictionless` converts a data package into such a
//! directory.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, FrictionlessArgs, SerializeArgs,
    description_path, render_summary, run_cli,
};
