use std::path::PathBuf;

use rdfcube_core::DescriptionError;
use thiserror::Error;

/// Failures while converting a data package into a cube directory.
#[derive(Debug, Error)]
pub enum FrictionlessError {
    #[error("failed to fetch `{location}`: {message}")]
    Fetch { location: String, message: String },
    #[error("i/o error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{location}` is not a valid data package descriptor: {source}")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("data package `{location}` has no CSV resource")]
    NoTabularResource { location: String },
    #[error("resource `{resource}` has no inline table schema")]
    MissingSchema { resource: String },
    #[error("resource `{resource}` declares no primary key")]
    MissingPrimaryKey { resource: String },
    #[error("primary key field `{field}` is not declared in the schema")]
    UnknownKeyField { field: String },
    #[error("schema field `{field}` has no column in the CSV header")]
    MissingColumn { field: String },
    #[error("CSV delimiter `{delimiter}` must be a single ASCII character")]
    InvalidDelimiter { delimiter: String },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Description(#[from] DescriptionError),
}
