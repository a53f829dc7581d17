//! Converts Frictionless data packages into cube directories.
//!
//! The output holds `data.csv` and `description.yml`, the layout the
//! `serialize` command of the CLI reads.

mod convert;
mod errors;
mod fetch;
mod package;

pub use convert::{
    Conversion, ConvertOptions, DEFAULT_BASE_URI, convert_from_url, convert_with_fetcher,
};
pub use errors::FrictionlessError;
pub use fetch::{Fetcher, UreqFetcher};
