use rdfcube_core::{Table, TableError, Value};

/// Column-major table, to exercise [`Table`] through a foreign implementation.
#[derive(Debug, Clone)]
pub struct Columns {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl Columns {
    #[must_use]
    pub fn new(columns: Vec<(&str, Vec<Value>)>) -> Self {
        let (names, columns) = columns
            .into_iter()
            .map(|(name, values)| (name.to_owned(), values))
            .unzip();
        Self { names, columns }
    }

    /// Two years, one station, one measure.
    #[must_use]
    pub fn minimal() -> Self {
        Self::new(vec![
            ("year", vec![Value::Integer(2020), Value::Integer(2021)]),
            (
                "station",
                vec![Value::Text("Bern".into()), Value::Text("Bern".into())],
            ),
            ("mm", vec![Value::Integer(812), Value::Integer(790)]),
        ])
    }
}

impl Table for Columns {
    fn name(&self) -> &str {
        "columns"
    }

    fn columns(&self) -> &[String] {
        &self.names
    }

    fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    fn cell(&self, row: usize, column: usize) -> Result<&Value, TableError> {
        self.columns
            .get(column)
            .ok_or(TableError::ColumnOutOfBounds { column })?
            .get(row)
            .ok_or(TableError::RowOutOfBounds { row })
    }
}

pub const MINIMAL_DESCRIPTION: &str = r"Name: { en: Rainfall }
Creator: [{ IRI: 'https://example.org/org/meteo' }]
Date Created: 2024-01-31
Base-URI: https://example.org
Identifier: rain fall
Version: 3
Work Status: Published
dimensions:
  year:
    name: { en: Year }
    dimension-type: Key Dimension
    scale-type: ordinal
    path: year
  station:
    name: { en: Station }
    dimension-type: Key Dimension
    scale-type: nominal
    path: station
  mm:
    name: { en: Rainfall }
    dimension-type: Measure Dimension
    scale-type: ratio
    path: rainfall
";
