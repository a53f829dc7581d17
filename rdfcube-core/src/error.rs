//! Error types for the rdfcube core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, io, path::PathBuf, sync::Arc};

use oxrdf::{IriParseError, LanguageTagParseError};
use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by [`crate::Table`] accessors.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableError {
    /// Requested row was outside the table's bounds.
    #[error("row {row} is out of bounds")]
    RowOutOfBounds {
        /// The requested row index.
        row: usize,
    },
    /// Requested column was outside the table's bounds.
    #[error("column {column} is out of bounds")]
    ColumnOutOfBounds {
        /// The requested column index.
        column: usize,
    },
    /// A row held a different number of cells than the header.
    #[error("row {row} has {actual} cells but the header declares {expected}")]
    RaggedRow {
        /// Offending row index.
        row: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of cells found.
        actual: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`TableError`] variants.
    enum TableErrorCode for TableError {
        /// Requested row was outside the table's bounds.
        RowOutOfBounds => RowOutOfBounds { .. } => "TABLE_ROW_OUT_OF_BOUNDS",
        /// Requested column was outside the table's bounds.
        ColumnOutOfBounds => ColumnOutOfBounds { .. } => "TABLE_COLUMN_OUT_OF_BOUNDS",
        /// A row held a different number of cells than the header.
        RaggedRow => RaggedRow { .. } => "TABLE_RAGGED_ROW",
    }
}

/// Errors raised while parsing or validating a cube description.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// The description document was not valid YAML or JSON.
    #[error("failed to parse cube description: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The description could not be read from disk.
    #[error("failed to read cube description `{path}`: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A required field was empty.
    #[error("cube description field `{field}` must not be empty")]
    EmptyField {
        /// YAML key of the empty field.
        field: &'static str,
    },
    /// The creation date was not an ISO-8601 calendar date.
    #[error("`Date Created` must be a YYYY-MM-DD date (got `{value}`)")]
    InvalidDate {
        /// Raw value supplied by the description.
        value: String,
    },
    /// The description did not declare a dimension of the required kind.
    #[error("cube description must declare at least one {kind}")]
    MissingDimensionKind {
        /// Human-readable dimension kind.
        kind: &'static str,
    },
    /// Two dimensions shared the same property path.
    #[error("dimensions `{first}` and `{second}` share the path `{path}`")]
    DuplicatePath {
        /// Shared path.
        path: String,
        /// First dimension declaring the path.
        first: String,
        /// Second dimension declaring the path.
        second: String,
    },
    /// An annotation dimension referenced an unknown measure path.
    #[error("dimension `{dimension}` relates to unknown measure path `{relates_to}`")]
    UnknownRelation {
        /// Annotation dimension name.
        dimension: String,
        /// Referenced path.
        relates_to: String,
    },
    /// An annotation dimension did not say which measure it refers to.
    #[error("dimension `{dimension}` must declare `relates-to`")]
    MissingRelation {
        /// Annotation dimension name.
        dimension: String,
    },
    /// A text was keyed by something that is not a BCP 47 language tag.
    #[error("`{tag}` is not a valid language tag: {source}")]
    InvalidLanguageTag {
        /// Offending tag.
        tag: String,
        /// Parser diagnostic.
        #[source]
        source: LanguageTagParseError,
    },
    /// A field, alone or joined with `Base-URI`, did not form a valid IRI.
    #[error("`{field}` does not form a valid IRI (`{iri}`): {source}")]
    InvalidIri {
        /// Description field the IRI came from.
        field: &'static str,
        /// The rejected IRI.
        iri: String,
        /// Parser diagnostic.
        #[source]
        source: IriParseError,
    },
}

define_error_codes! {
    /// Stable codes describing [`DescriptionError`] variants.
    enum DescriptionErrorCode for DescriptionError {
        /// The description document was not valid YAML or JSON.
        Parse => Parse(..) => "DESCRIPTION_PARSE",
        /// The description could not be read from disk.
        Io => Io { .. } => "DESCRIPTION_IO",
        /// A required field was empty.
        EmptyField => EmptyField { .. } => "DESCRIPTION_EMPTY_FIELD",
        /// The creation date was invalid.
        InvalidDate => InvalidDate { .. } => "DESCRIPTION_INVALID_DATE",
        /// A required dimension kind was absent.
        MissingDimensionKind => MissingDimensionKind { .. } => "DESCRIPTION_MISSING_DIMENSION_KIND",
        /// Two dimensions shared the same property path.
        DuplicatePath => DuplicatePath { .. } => "DESCRIPTION_DUPLICATE_PATH",
        /// An annotation dimension referenced an unknown measure path.
        UnknownRelation => UnknownRelation { .. } => "DESCRIPTION_UNKNOWN_RELATION",
        /// An annotation dimension lacked `relates-to`.
        MissingRelation => MissingRelation { .. } => "DESCRIPTION_MISSING_RELATION",
        /// A language tag was malformed.
        InvalidLanguageTag => InvalidLanguageTag { .. } => "DESCRIPTION_INVALID_LANGUAGE_TAG",
        /// A description field did not form a valid IRI.
        InvalidIri => InvalidIri { .. } => "DESCRIPTION_INVALID_IRI",
    }
}

/// Error type produced while building or serializing a [`crate::Cube`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CubeError {
    /// A write step ran before [`crate::Cube::prepare_data`].
    #[error("`{step}` requires prepare_data to run first")]
    NotPrepared {
        /// Lifecycle step that was attempted.
        step: &'static str,
    },
    /// The description supplied to the cube was invalid.
    #[error(transparent)]
    Description(#[from] DescriptionError),
    /// A dimension had no matching table column.
    #[error("table `{table}` has no column for dimension `{dimension}`")]
    MissingColumn {
        /// Name of the table.
        table: Arc<str>,
        /// Dimension without a column.
        dimension: String,
    },
    /// A key dimension cell was missing.
    #[error("key dimension `{dimension}` is missing a value in row {row}")]
    MissingKeyValue {
        /// Key dimension name.
        dimension: String,
        /// Zero-based data row.
        row: usize,
    },
    /// A non-key cell was missing and the cube rejects missing values.
    #[error("dimension `{dimension}` is missing a value in row {row}")]
    MissingValue {
        /// Dimension name.
        dimension: String,
        /// Zero-based data row.
        row: usize,
    },
    /// A cell did not satisfy the declared datatype.
    #[error("value `{value}` in row {row} of `{dimension}` is not a valid {datatype}")]
    InvalidValue {
        /// Dimension name.
        dimension: String,
        /// Zero-based data row.
        row: usize,
        /// Offending cell rendered as text.
        value: String,
        /// Expected datatype label.
        datatype: &'static str,
    },
    /// An IRI minted for the cube, or the configured observer, was invalid.
    #[error("`{iri}` is not a valid IRI: {source}")]
    InvalidIri {
        /// The rejected IRI.
        iri: String,
        /// Parser diagnostic.
        #[source]
        source: IriParseError,
    },
    /// Two rows produced the same observation identifier.
    #[error("rows {first} and {second} share the key combination `{key}`")]
    DuplicateObservation {
        /// Escaped key values joined as in the observation IRI.
        key: String,
        /// First row with the key.
        first: usize,
        /// Second row with the key.
        second: usize,
    },
    /// Table access failed.
    #[error("table `{table}` failed: {error}")]
    Table {
        /// Name of the table.
        table: Arc<str>,
        /// Underlying table error.
        #[source]
        error: TableError,
    },
    /// Writing the serialization failed.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// Target file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

define_error_codes! {
    /// Stable codes describing [`CubeError`] variants.
    enum CubeErrorCode for CubeError {
        /// A write step ran before preparation.
        NotPrepared => NotPrepared { .. } => "CUBE_NOT_PREPARED",
        /// The description supplied to the cube was invalid.
        Description => Description(..) => "CUBE_INVALID_DESCRIPTION",
        /// A dimension had no matching table column.
        MissingColumn => MissingColumn { .. } => "CUBE_MISSING_COLUMN",
        /// A key dimension cell was missing.
        MissingKeyValue => MissingKeyValue { .. } => "CUBE_MISSING_KEY_VALUE",
        /// A non-key cell was missing under the rejecting policy.
        MissingValue => MissingValue { .. } => "CUBE_MISSING_VALUE",
        /// A cell did not satisfy the declared datatype.
        InvalidValue => InvalidValue { .. } => "CUBE_INVALID_VALUE",
        /// An IRI minted for the cube was invalid.
        InvalidIri => InvalidIri { .. } => "CUBE_INVALID_IRI",
        /// Two rows produced the same observation identifier.
        DuplicateObservation => DuplicateObservation { .. } => "CUBE_DUPLICATE_OBSERVATION",
        /// Table access failed.
        TableFailure => Table { .. } => "CUBE_TABLE_FAILURE",
        /// Writing the serialization failed.
        Io => Io { .. } => "CUBE_IO",
    }
}

impl CubeError {
    /// Retrieve the inner [`DescriptionErrorCode`] when the failure came from the description.
    pub const fn description_code(&self) -> Option<DescriptionErrorCode> {
        match self {
            Self::Description(error) => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`TableErrorCode`] when the failure came from the table.
    pub const fn table_code(&self) -> Option<TableErrorCode> {
        match self {
            Self::Table { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, CubeError>;

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(CubeError::NotPrepared { step: "write_cube" }, "CUBE_NOT_PREPARED")]
    #[case(
        CubeError::MissingKeyValue { dimension: "year".into(), row: 3 },
        "CUBE_MISSING_KEY_VALUE"
    )]
    #[case(
        CubeError::Description(DescriptionError::EmptyField { field: "Name" }),
        "CUBE_INVALID_DESCRIPTION"
    )]
    fn cube_error_codes_are_stable(#[case] error: CubeError, #[case] expected: &str) {
        assert_eq!(error.code().as_str(), expected);
        assert_eq!(error.code().to_string(), expected);
    }

    #[test]
    fn nested_codes_surface_through_cube_error() {
        let err = CubeError::Table {
            table: Arc::from("data"),
            error: TableError::RowOutOfBounds { row: 9 },
        };
        assert_eq!(err.table_code(), Some(TableErrorCode::RowOutOfBounds));
        assert_eq!(err.description_code(), None);

        let err = CubeError::Description(DescriptionError::InvalidDate {
            value: "yesterday".into(),
        });
        assert_eq!(
            err.description_code(),
            Some(DescriptionErrorCode::InvalidDate)
        );
    }
}
