//! CSV provider implementing the core `Table` abstraction.

mod errors;
mod options;
mod table;

pub use errors::CsvTableError;
pub use options::{CsvOptions, DEFAULT_NA_VALUES};
pub use table::CsvTable;
