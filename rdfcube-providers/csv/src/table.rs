//! CSV-backed table implementation.
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rdfcube_core::{Table, TableError, Value};
use tracing::{Span, debug, field, instrument};

use crate::errors::CsvTableError;
use crate::options::CsvOptions;

/// Table read from a delimited text file.
///
/// Cells are typed individually: NA tokens become [`Value::Missing`], whole
/// numbers [`Value::Integer`], other numbers [`Value::Decimal`], `true`/`false`
/// in any of the usual casings [`Value::Boolean`], and the rest stays text.
#[derive(Debug, Clone)]
pub struct CsvTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl CsvTable {
    /// Reads the file at `path`. The table is named after the file.
    ///
    /// # Errors
    /// Returns [`CsvTableError::Io`] when the file cannot be opened and the
    /// errors of [`Self::from_reader`] otherwise.
    #[instrument(
        name = "csv.read",
        err,
        skip(path, options),
        fields(path = field::Empty, rows = field::Empty),
    )]
    pub fn from_path(path: &Path, options: &CsvOptions) -> Result<Self, CsvTableError> {
        let span = Span::current();
        span.record("path", field::display(path.display()));
        let file = File::open(path).map_err(|source| CsvTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        let table = Self::from_reader(name, file, options)?;
        span.record("rows", table.rows.len());
        Ok(table)
    }

    /// Reads CSV text from `reader`.
    ///
    /// # Errors
    /// Returns [`CsvTableError::InvalidSeparator`] or
    /// [`CsvTableError::DecimalClashesWithSeparator`] for unusable options,
    /// [`CsvTableError::DuplicateColumn`] for repeated header names,
    /// [`CsvTableError::RaggedRow`] when a record's width differs from the
    /// header, and [`CsvTableError::Csv`] for malformed input.
    ///
    /// # Examples
    /// ```
    /// use rdfcube_core::{Table, Value};
    /// use rdfcube_providers_csv::{CsvOptions, CsvTable};
    ///
    /// let csv = "year;value\n2020;1,5\n2021;-\n";
    /// let options = CsvOptions::new()
    ///     .with_separator(';')
    ///     .with_decimal(',')
    ///     .with_na_values(["-"]);
    /// let table = CsvTable::from_reader("inline", csv.as_bytes(), &options)?;
    /// assert_eq!(table.cell(0, 1)?, &Value::Decimal(1.5));
    /// assert_eq!(table.cell(1, 1)?, &Value::Missing);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
        options: &CsvOptions,
    ) -> Result<Self, CsvTableError> {
        let separator = separator_byte(options)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(column) = columns.iter().find(|column| !seen.insert(column.as_str())) {
            return Err(CsvTableError::DuplicateColumn {
                column: column.clone(),
            });
        }

        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != columns.len() {
                return Err(CsvTableError::RaggedRow {
                    row,
                    expected: columns.len(),
                    actual: record.len(),
                });
            }
            rows.push(record.iter().map(|raw| parse_cell(raw, options)).collect());
        }

        let name = name.into();
        debug!(table = %name, columns = columns.len(), rows = rows.len(), "csv parsed");
        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    /// Returns the parsed rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

impl Table for CsvTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, row: usize, column: usize) -> Result<&Value, TableError> {
        self.rows
            .get(row)
            .ok_or(TableError::RowOutOfBounds { row })?
            .get(column)
            .ok_or(TableError::ColumnOutOfBounds { column })
    }
}

fn separator_byte(options: &CsvOptions) -> Result<u8, CsvTableError> {
    let separator = options.separator();
    if options.decimal() == separator {
        return Err(CsvTableError::DecimalClashesWithSeparator { value: separator });
    }
    u8::try_from(separator)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(CsvTableError::InvalidSeparator { value: separator })
}

pub(crate) fn parse_cell(raw: &str, options: &CsvOptions) -> Value {
    if options.is_na(raw) {
        return Value::Missing;
    }
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Value::Integer(value);
    }
    if let Some(value) = parse_decimal(trimmed, options.decimal()) {
        return Value::Decimal(value);
    }
    match trimmed {
        "true" | "True" | "TRUE" => Value::Boolean(true),
        "false" | "False" | "FALSE" => Value::Boolean(false),
        _ => Value::Text(raw.to_owned()),
    }
}

fn parse_decimal(raw: &str, decimal: char) -> Option<f64> {
    if !raw.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let normalised = if decimal == '.' {
        raw.to_owned()
    } else {
        if raw.contains('.') {
            return None;
        }
        raw.replace(decimal, ".")
    };
    normalised.parse::<f64>().ok().filter(|value| value.is_finite())
}
