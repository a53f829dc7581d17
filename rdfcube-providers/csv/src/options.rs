//! Parsing conventions for delimited files.

/// Tokens read as missing cells unless told otherwise. The list mirrors what
/// common dataframe tooling treats as NA, so files exported from it load
/// without extra flags.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Separator, decimal marker and missing-value tokens for a CSV file.
///
/// # Examples
/// ```
/// use rdfcube_providers_csv::CsvOptions;
///
/// let options = CsvOptions::new()
///     .with_separator(';')
///     .with_decimal(',')
///     .with_na_values(["-"]);
/// assert!(options.is_na("-"));
/// assert!(options.is_na("NA"));
/// assert!(!options.is_na("0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    separator: char,
    decimal: char,
    extra_na_values: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            decimal: '.',
            extra_na_values: Vec::new(),
        }
    }
}

impl CsvOptions {
    /// Comma separated, `.` decimals, default NA tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field separator.
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Returns the field separator.
    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Sets the decimal marker used by numeric cells.
    #[must_use]
    pub fn with_decimal(mut self, decimal: char) -> Self {
        self.decimal = decimal;
        self
    }

    /// Returns the decimal marker.
    #[must_use]
    pub fn decimal(&self) -> char {
        self.decimal
    }

    /// Adds tokens read as missing on top of [`DEFAULT_NA_VALUES`].
    #[must_use]
    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_na_values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Returns the tokens added through [`Self::with_na_values`].
    #[must_use]
    pub fn extra_na_values(&self) -> &[String] {
        &self.extra_na_values
    }

    /// Returns whether `raw` denotes a missing cell.
    #[must_use]
    pub fn is_na(&self, raw: &str) -> bool {
        DEFAULT_NA_VALUES.contains(&raw) || self.extra_na_values.iter().any(|na| na == raw)
    }
}
