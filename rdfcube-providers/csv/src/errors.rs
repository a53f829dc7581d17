use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvTableError {
    #[error("failed to open `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("separator `{value}` must be a single ASCII character")]
    InvalidSeparator { value: char },
    #[error("decimal marker `{value}` must differ from the separator")]
    DecimalClashesWithSeparator { value: char },
    #[error("row {row} has {actual} fields but the header declares {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("column `{column}` appears more than once in the header")]
    DuplicateColumn { column: String },
}
