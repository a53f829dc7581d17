//! Tabular data abstractions consumed by the cube builder.

use std::cmp::Ordering;
use std::fmt;

use crate::error::TableError;

/// A single parsed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The cell matched one of the configured NA tokens.
    Missing,
    /// Whole number.
    Integer(i64),
    /// Number with a fractional part or exponent.
    Decimal(f64),
    /// `true` / `false`.
    Boolean(bool),
    /// Anything else.
    Text(String),
}

impl Value {
    /// Returns whether the cell is missing.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Orders two numeric cells by value.
    ///
    /// Integers are compared as `i64`, so values beyond 2^53 keep their
    /// order. Returns `None` when either cell is not numeric or is NaN.
    ///
    /// # Examples
    /// ```
    /// use std::cmp::Ordering;
    /// use rdfcube_core::Value;
    ///
    /// let big = Value::Integer(9_007_199_254_740_993);
    /// assert_eq!(big.numeric_cmp(&Value::Integer(9_007_199_254_740_992)), Some(Ordering::Greater));
    /// assert_eq!(Value::Integer(2).numeric_cmp(&Value::Decimal(2.5)), Some(Ordering::Less));
    /// assert_eq!(Value::Text("2".into()).numeric_cmp(&Value::Integer(2)), None);
    /// ```
    #[must_use]
    pub fn numeric_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => Some(left.cmp(right)),
            (Self::Decimal(left), Self::Decimal(right)) => left.partial_cmp(right),
            (Self::Integer(left), Self::Decimal(right)) => cmp_integer_decimal(*left, *right),
            (Self::Decimal(left), Self::Integer(right)) => {
                cmp_integer_decimal(*right, *left).map(Ordering::reverse)
            }
            _ => None,
        }
    }
}

/// Compares without converting the integer to `f64`.
fn cmp_integer_decimal(integer: i64, decimal: f64) -> Option<Ordering> {
    // 2^63; every i64 lies in [-2^63, 2^63)
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if decimal.is_nan() {
        return None;
    }
    if decimal >= BOUND {
        return Some(Ordering::Less);
    }
    if decimal.is_sign_negative() && decimal.abs() > BOUND {
        return Some(Ordering::Greater);
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the truncated value is integral and within i64 range"
    )]
    let whole = decimal.trunc() as i64;
    match integer.cmp(&whole) {
        Ordering::Equal => 0.0_f64.partial_cmp(&decimal.fract()),
        unequal => Some(unequal),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Column-oriented read access to a parsed table.
///
/// # Examples
/// ```
/// use rdfcube_core::{MemoryTable, Table, Value};
///
/// let table = MemoryTable::try_new(
///     "demo",
///     vec!["year".into(), "value".into()],
///     vec![vec![Value::Integer(2020), Value::Decimal(1.5)]],
/// )?;
/// assert_eq!(table.row_count(), 1);
/// assert_eq!(table.column_index("value"), Some(1));
/// assert_eq!(table.cell(0, 1)?, &Value::Decimal(1.5));
/// # Ok::<(), rdfcube_core::TableError>(())
/// ```
pub trait Table {
    /// Returns a human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Returns the header, in file order.
    fn columns(&self) -> &[String];

    /// Returns the number of data rows.
    fn row_count(&self) -> usize;

    /// Returns the cell at `row`, `column`.
    ///
    /// # Errors
    /// Returns [`TableError`] when either index is out of bounds.
    fn cell(&self, row: usize, column: usize) -> Result<&Value, TableError>;

    /// Returns whether the table holds no data rows.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Returns the index of the column called `name`.
    #[must_use]
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|column| column == name)
    }
}

/// Row-major in-memory table.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    /// Creates a table after checking every row matches the header width.
    ///
    /// # Errors
    /// Returns [`TableError::RaggedRow`] for the first row whose width differs.
    pub fn try_new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, TableError> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(TableError::RaggedRow {
                row,
                expected: columns.len(),
                actual: cells.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows,
        })
    }

    /// Returns the rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

impl Table for MemoryTable {
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
        let cells = self
            .rows
            .get(row)
            .ok_or(TableError::RowOutOfBounds { row })?;
        cells
            .get(column)
            .ok_or(TableError::ColumnOutOfBounds { column })
    }
}
