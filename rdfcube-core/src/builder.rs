//! Builder utilities for configuring [`Cube`] construction.
//!
//! The builder owns the options that are not part of the description file:
//! who observed the data and what to do with missing measure values.

use crate::{Result, cube::Cube, description::CubeDescription, table::Table};

/// How missing cells in non-key dimensions are represented.
///
/// # Examples
/// ```
/// use rdfcube_core::MissingValuePolicy;
///
/// assert_eq!(MissingValuePolicy::default(), MissingValuePolicy::Undefined);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingValuePolicy {
    /// Emit `""^^cube:Undefined` and allow it in the shape.
    #[default]
    Undefined,
    /// Fail preparation with [`crate::CubeError::MissingValue`].
    Reject,
}

/// Configures and constructs [`Cube`] instances.
///
/// # Examples
/// ```
/// use rdfcube_core::{CubeBuilder, MissingValuePolicy};
///
/// let builder = CubeBuilder::new()
///     .with_observer("https://example.org/org/observer")
///     .with_missing_values(MissingValuePolicy::Reject);
/// assert_eq!(builder.observer(), Some("https://example.org/org/observer"));
/// assert_eq!(builder.missing_values(), MissingValuePolicy::Reject);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CubeBuilder {
    observer: Option<String>,
    missing_values: MissingValuePolicy,
}

impl CubeBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the `cube:observedBy` IRI, which otherwise is the first creator.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Into<String>) -> Self {
        self.observer = Some(observer.into());
        self
    }

    /// Returns the configured observer override.
    #[must_use]
    pub fn observer(&self) -> Option<&str> {
        self.observer.as_deref()
    }

    /// Sets the policy for missing non-key cells.
    #[must_use]
    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_values = policy;
        self
    }

    /// Returns the configured missing value policy.
    #[must_use]
    pub fn missing_values(&self) -> MissingValuePolicy {
        self.missing_values
    }

    /// Validates `description` and constructs a [`Cube`] over `table`.
    ///
    /// # Errors
    /// Returns [`crate::CubeError::Description`] when the description fails
    /// validation and [`crate::CubeError::InvalidIri`] when the observer is
    /// not an absolute IRI.
    pub fn build<T: Table>(self, table: T, description: CubeDescription) -> Result<Cube<T>> {
        let description = description.validated()?;
        let observer = match self.observer {
            Some(observer) => observer,
            None => description
                .creator
                .first()
                .map(|agent| agent.iri.clone())
                .ok_or(crate::DescriptionError::EmptyField { field: "Creator" })?,
        };
        Cube::new(table, description, observer, self.missing_values)
    }
}
