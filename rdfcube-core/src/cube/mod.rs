//! Cube lifecycle: prepare the table, then write metadata, observations and
//! the SHACL constraint into a graph that is finally serialized as Turtle.
//!
//! The steps are meant to run in order (`prepare_data`, `write_cube`,
//! `write_observations`, `write_shape`, `serialize`). Every write step needs
//! prepared data; repeating a write step is a no-op, and a failed step leaves
//! the graph untouched.

mod metadata;
mod observations;
mod prepare;
mod shape;

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use oxrdf::NamedNode;
use tracing::{Span, debug, field, info, instrument};

use crate::builder::MissingValuePolicy;
use crate::description::{CubeDescription, DimensionType};
use crate::error::{CubeError, DescriptionError, Result};
use crate::rdf::{Graph, Node, write_turtle};
use crate::table::Table;

use prepare::PreparedData;

/// IRIs minted for a cube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeIris {
    /// The cube itself: `<Base-URI>cube/<Identifier>/<Version>`.
    pub cube: NamedNode,
    /// The SHACL constraint.
    pub shape: NamedNode,
    /// The observation set.
    pub observation_set: NamedNode,
}

impl CubeIris {
    fn for_description(description: &CubeDescription) -> Result<Self> {
        let cube = format!(
            "{}cube/{}/{}",
            description.base_uri,
            prepare::escape_segment(description.identifier.trim()),
            description.version
        );
        Ok(Self {
            shape: named(format!("{cube}/shape"))?,
            observation_set: named(format!("{cube}/ObservationSet"))?,
            cube: named(cube)?,
        })
    }
}

/// Parses an IRI assembled from description or table content.
fn named(iri: String) -> Result<NamedNode> {
    NamedNode::new(iri.as_str()).map_err(|source| CubeError::InvalidIri { iri, source })
}

/// Language-tagged literal for one entry of a description text map.
fn language_text(text: &str, tag: &str) -> Result<Node> {
    Node::lang(text, tag).map_err(|source| {
        CubeError::Description(DescriptionError::InvalidLanguageTag {
            tag: tag.to_owned(),
            source,
        })
    })
}

#[derive(Debug, Default, Clone, Copy)]
struct Written {
    cube: bool,
    observations: bool,
    shape: bool,
}

/// A statistical data cube built from a [`Table`] and a [`CubeDescription`].
///
/// Construct it with [`crate::CubeBuilder`].
///
/// # Examples
/// ```
/// use rdfcube_core::{CubeBuilder, CubeDescription, MemoryTable, Value};
///
/// let description = CubeDescription::from_yaml_str(r#"
/// Name: { en: Rainfall }
/// Creator: [{ IRI: "https://example.org/org/meteo" }]
/// Date Created: 2024-01-31
/// Base-URI: https://example.org/
/// Identifier: rainfall
/// Version: 1
/// Work Status: Draft
/// dimensions:
///   year: { name: { en: Year }, dimension-type: Key Dimension, scale-type: interval, path: year }
///   mm: { name: { en: Rainfall }, dimension-type: Measure Dimension, scale-type: ratio, path: rainfall }
/// "#)?;
/// let table = MemoryTable::try_new(
///     "data",
///     vec!["year".into(), "mm".into()],
///     vec![vec![Value::Integer(2020), Value::Decimal(812.5)]],
/// )?;
/// let mut cube = CubeBuilder::new().build(table, description)?;
/// cube.prepare_data()?;
/// cube.write_cube()?;
/// cube.write_observations()?;
/// cube.write_shape()?;
/// assert_eq!(cube.iris().cube.as_str(), "https://example.org/cube/rainfall/1");
/// assert!(cube.to_turtle_string()?.contains("cube:Observation"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Cube<T> {
    table: T,
    description: CubeDescription,
    observer: NamedNode,
    missing_values: MissingValuePolicy,
    iris: CubeIris,
    prepared: Option<PreparedData>,
    graph: Graph,
    written: Written,
}

impl<T: Table> Cube<T> {
    pub(crate) fn new(
        table: T,
        description: CubeDescription,
        observer: String,
        missing_values: MissingValuePolicy,
    ) -> Result<Self> {
        let iris = CubeIris::for_description(&description)?;
        Ok(Self {
            table,
            description,
            observer: named(observer)?,
            missing_values,
            iris,
            prepared: None,
            graph: Graph::default(),
            written: Written::default(),
        })
    }

    /// Returns the minted IRIs.
    #[must_use]
    pub fn iris(&self) -> &CubeIris {
        &self.iris
    }

    /// Returns the validated description.
    #[must_use]
    pub fn description(&self) -> &CubeDescription {
        &self.description
    }

    /// Returns the graph accumulated so far.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the `cube:observedBy` IRI.
    #[must_use]
    pub fn observer(&self) -> &str {
        self.observer.as_str()
    }

    /// Returns whether [`Self::prepare_data`] has completed.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Returns the observation IRIs in table order once prepared.
    #[must_use]
    pub fn observation_iris(&self) -> &[NamedNode] {
        self.prepared
            .as_ref()
            .map(|prepared| prepared.observations.as_slice())
            .unwrap_or(&[])
    }

    /// Resolves dimensions against the table: maps values, fixes datatypes,
    /// and mints one observation IRI per row.
    ///
    /// # Errors
    /// Returns [`CubeError::MissingColumn`], [`CubeError::MissingKeyValue`],
    /// [`CubeError::MissingValue`], [`CubeError::InvalidValue`] or
    /// [`CubeError::DuplicateObservation`] when the table does not fit the
    /// description.
    #[instrument(
        name = "cube.prepare_data",
        err,
        skip(self),
        fields(table = field::Empty, rows = field::Empty),
    )]
    pub fn prepare_data(&mut self) -> Result<()> {
        let span = Span::current();
        span.record("table", field::display(self.table.name()));
        span.record("rows", self.table.row_count());
        let prepared = prepare::prepare(
            &self.table,
            &self.description,
            &self.iris,
            self.missing_values,
        )?;
        debug!(
            observations = prepared.observations.len(),
            dimensions = prepared.columns.len(),
            "data prepared"
        );
        self.prepared = Some(prepared);
        Ok(())
    }

    /// Writes the cube's descriptive metadata.
    ///
    /// # Errors
    /// Returns [`CubeError::NotPrepared`] before [`Self::prepare_data`], and
    /// [`CubeError::InvalidIri`] when an agent IRI is malformed.
    #[instrument(name = "cube.write_cube", err, skip(self))]
    pub fn write_cube(&mut self) -> Result<()> {
        self.require_prepared("write_cube")?;
        if self.written.cube {
            debug!("cube metadata already written");
            return Ok(());
        }
        let mut part = Graph::default();
        metadata::write(&mut part, &self.description, &self.iris)?;
        let triples = part.len();
        self.graph.append(part);
        self.written.cube = true;
        debug!(triples, "cube metadata written");
        Ok(())
    }

    /// Writes the observation set and one observation per row.
    ///
    /// # Errors
    /// Returns [`CubeError::NotPrepared`] before [`Self::prepare_data`].
    #[instrument(name = "cube.write_observations", err, skip(self))]
    pub fn write_observations(&mut self) -> Result<()> {
        let prepared = self
            .prepared
            .as_ref()
            .ok_or(CubeError::NotPrepared {
                step: "write_observations",
            })?;
        if self.written.observations {
            debug!("observations already written");
            return Ok(());
        }
        let before = self.graph.len();
        observations::write(&mut self.graph, prepared, &self.iris, &self.observer);
        self.written.observations = true;
        debug!(
            observations = prepared.observations.len(),
            triples = self.graph.len() - before,
            "observations written"
        );
        Ok(())
    }

    /// Writes the SHACL constraint describing every dimension.
    ///
    /// # Errors
    /// Returns [`CubeError::NotPrepared`] before [`Self::prepare_data`], and
    /// [`CubeError::InvalidIri`] when a unit or relation does not form an IRI.
    #[instrument(name = "cube.write_shape", err, skip(self))]
    pub fn write_shape(&mut self) -> Result<()> {
        let prepared = self
            .prepared
            .as_ref()
            .ok_or(CubeError::NotPrepared {
                step: "write_shape",
            })?;
        if self.written.shape {
            debug!("shape already written");
            return Ok(());
        }
        let mut part = Graph::default();
        shape::write(
            &mut part,
            prepared,
            &self.description,
            &self.iris,
            &self.observer,
        )?;
        let triples = part.len();
        self.graph.append(part);
        self.written.shape = true;
        debug!(triples, "shape written");
        Ok(())
    }

    /// Writes the accumulated graph to `path` as Turtle.
    ///
    /// # Errors
    /// Returns [`CubeError::NotPrepared`] before [`Self::prepare_data`] and
    /// [`CubeError::Io`] when the file cannot be written.
    #[instrument(
        name = "cube.serialize",
        err,
        skip(self, path),
        fields(path = field::Empty),
    )]
    pub fn serialize(&self, path: &Path) -> Result<()> {
        Span::current().record("path", field::display(path.display()));
        self.require_prepared("serialize")?;
        let io_error = |source| CubeError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        write_turtle(&self.graph, BufWriter::new(file)).map_err(io_error)?;
        info!(triples = self.graph.len(), "cube serialized");
        Ok(())
    }

    /// Renders the accumulated graph as a Turtle string.
    ///
    /// # Errors
    /// Returns [`CubeError::NotPrepared`] before [`Self::prepare_data`].
    pub fn to_turtle_string(&self) -> Result<String> {
        self.require_prepared("serialize")?;
        let mut buffer = Vec::new();
        write_turtle(&self.graph, &mut buffer).map_err(|source| CubeError::Io {
            path: "<memory>".into(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn require_prepared(&self, step: &'static str) -> Result<()> {
        if self.prepared.is_none() {
            return Err(CubeError::NotPrepared { step });
        }
        Ok(())
    }
}

impl<T: Table> fmt::Display for Cube<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .description
            .name
            .get("en")
            .or_else(|| self.description.name.values().next())
            .map_or("<unnamed>", String::as_str);
        let (mut keys, mut measures, mut annotations) = (0_usize, 0_usize, 0_usize);
        for (_, dimension) in self.description.dimensions.iter() {
            match dimension.dimension_type {
                DimensionType::Key => keys += 1,
                DimensionType::Measure => measures += 1,
                _ => annotations += 1,
            }
        }
        writeln!(f, "Cube <{}>", self.iris.cube)?;
        writeln!(f, "  name: {name}")?;
        writeln!(f, "  table: {}", self.table.name())?;
        writeln!(f, "  observations: {}", self.table.row_count())?;
        writeln!(
            f,
            "  dimensions: {keys} key, {measures} measure, {annotations} annotation"
        )?;
        write!(f, "  triples: {}", self.graph.len())
    }
}

#[cfg(test)]
mod tests;
