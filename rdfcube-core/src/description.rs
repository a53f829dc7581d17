//! Cube description documents.
//!
//! A description is the YAML (or JSON) mapping that accompanies `data.csv`. It
//! names the cube, its provenance and one entry per table column describing
//! how that column becomes a cube dimension. Keys use the spelling of the
//! upstream publishing tooling (`Base-URI`, `dimension-type`, ...) so existing
//! description files load unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use oxrdf::{Literal, NamedNode};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DescriptionError;
use crate::rdf::vocab::UNIT;

/// Language tag to text.
pub type LangMap = BTreeMap<String, String>;

/// Top-level cube metadata plus dimension definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeDescription {
    /// Cube title per language.
    #[serde(rename = "Name")]
    pub name: LangMap,
    /// Cube abstract per language.
    #[serde(rename = "Description", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: LangMap,
    /// Publishing organisations.
    #[serde(rename = "Publisher", default, skip_serializing_if = "Vec::is_empty")]
    pub publisher: Vec<Agent>,
    /// Creating organisations; the first one observes every observation.
    #[serde(rename = "Creator", default)]
    pub creator: Vec<Agent>,
    /// Contributing people or organisations.
    #[serde(rename = "Contributor", default, skip_serializing_if = "Vec::is_empty")]
    pub contributor: Vec<Agent>,
    /// Creation date as `YYYY-MM-DD`.
    #[serde(rename = "Date Created")]
    pub date_created: String,
    /// Contact details.
    #[serde(rename = "Contact Point", default, skip_serializing_if = "Option::is_none")]
    pub contact_point: Option<ContactPoint>,
    /// Base IRI for every resource minted for the cube.
    #[serde(rename = "Base-URI")]
    pub base_uri: String,
    /// Cube identifier, unique per base IRI.
    #[serde(rename = "Identifier")]
    pub identifier: String,
    /// Cube version.
    #[serde(rename = "Version")]
    pub version: u32,
    /// Publication status.
    #[serde(rename = "Work Status")]
    pub work_status: WorkStatus,
    /// Whether the cube should be offered to the visualisation application.
    #[serde(rename = "Visualize", default)]
    pub visualize: bool,
    /// Update frequency.
    #[serde(
        rename = "Accrual Periodicity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub accrual_periodicity: Option<AccrualPeriodicity>,
    /// Dimension definitions keyed by table column name.
    pub dimensions: Dimensions,
}

/// An organisation or person referenced by IRI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Identifier of the agent.
    #[serde(rename = "IRI")]
    pub iri: String,
    /// Optional display name.
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Contact details published with the cube.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    /// Contact e-mail address.
    #[serde(rename = "E-Mail")]
    pub email: String,
    /// Contact name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// Publication status of a cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    /// Work in progress.
    Draft,
    /// Released.
    Published,
}

/// Update frequency, mapped onto the EU frequency authority table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccrualPeriodicity {
    /// Updated every day.
    Daily,
    /// Updated every week.
    Weekly,
    /// Updated every month.
    Monthly,
    /// Updated every quarter.
    Quarterly,
    /// Updated every year.
    Yearly,
    /// Updated every other year.
    Biennial,
    /// Updated at irregular intervals.
    Irregular,
    /// Updated continuously.
    Continuous,
}

/// Role a column plays in the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionType {
    /// Part of the observation identifier.
    #[serde(rename = "Key Dimension")]
    Key,
    /// A measured value.
    #[serde(rename = "Measure Dimension")]
    Measure,
    /// Standard error of a measure.
    #[serde(rename = "Standard Error")]
    StandardError,
    /// Upper bound of a confidence interval around a measure.
    #[serde(rename = "Upper uncertainty")]
    UpperUncertainty,
    /// Lower bound of a confidence interval around a measure.
    #[serde(rename = "Lower uncertainty")]
    LowerUncertainty,
}

impl DimensionType {
    /// Returns whether the dimension annotates another measure.
    #[must_use]
    pub const fn is_annotation(self) -> bool {
        matches!(
            self,
            Self::StandardError | Self::UpperUncertainty | Self::LowerUncertainty
        )
    }

    /// Returns whether the dimension contributes to observation identity.
    #[must_use]
    pub const fn is_key(self) -> bool {
        matches!(self, Self::Key)
    }
}

/// Level of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    /// Unordered categories.
    Nominal,
    /// Ordered categories.
    Ordinal,
    /// Ordered with meaningful differences.
    Interval,
    /// Interval with a true zero.
    Ratio,
}

/// Declared literal datatype, or IRI values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Datatype {
    /// `xsd:string`.
    #[serde(rename = "string")]
    String,
    /// `xsd:integer`.
    #[serde(rename = "integer")]
    Integer,
    /// `xsd:decimal`.
    #[serde(rename = "decimal")]
    Decimal,
    /// `xsd:double`.
    #[serde(rename = "double")]
    Double,
    /// `xsd:boolean`.
    #[serde(rename = "boolean")]
    Boolean,
    /// `xsd:date`.
    #[serde(rename = "date")]
    Date,
    /// `xsd:gYear`.
    #[serde(rename = "gYear")]
    GYear,
    /// Values are IRIs.
    #[serde(rename = "URI")]
    Uri,
}

impl Datatype {
    /// Returns whether values of this datatype are compared numerically.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Double)
    }
}

/// Granularity of a temporal dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Years.
    Year,
    /// Months.
    Month,
    /// Weeks.
    Week,
    /// Days.
    Day,
    /// Hours.
    Hour,
    /// Minutes.
    Minute,
    /// Seconds.
    Second,
}

/// What kind of real-world thing the dimension values denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataKind {
    /// Points or periods in time.
    #[serde(rename = "temporal")]
    Temporal {
        /// Granularity of the values.
        unit: TimeUnit,
    },
    /// Geographic shapes.
    #[serde(rename = "spatial-shape")]
    SpatialShape,
    /// Geographic coordinates.
    #[serde(rename = "spatial-coordinates")]
    SpatialCoordinates,
}

/// Converts cell values into IRIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Mapping {
    /// Append the escaped cell value to `base`.
    Additive {
        /// IRI prefix.
        base: String,
    },
    /// Look the cell value up in `replacements`.
    Replace {
        /// Cell value to IRI.
        replacements: BTreeMap<String, String>,
    },
}

/// Definition of one table column as a cube dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Label per language.
    pub name: LangMap,
    /// Explanation per language.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: LangMap,
    /// Role in the cube.
    #[serde(rename = "dimension-type")]
    pub dimension_type: DimensionType,
    /// Level of measurement.
    #[serde(rename = "scale-type")]
    pub scale_type: ScaleType,
    /// Local name of the dimension property below `Base-URI`.
    pub path: String,
    /// Declared datatype; inferred from the data when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Datatype>,
    /// QUDT unit local name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Kind of values.
    #[serde(rename = "data-kind", default, skip_serializing_if = "Option::is_none")]
    pub data_kind: Option<DataKind>,
    /// Conversion of values into IRIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Mapping>,
    /// Measure path an annotation dimension refers to.
    #[serde(rename = "relates-to", default, skip_serializing_if = "Option::is_none")]
    pub relates_to: Option<String>,
}

/// Dimensions in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions(Vec<(String, Dimension)>);

impl Dimensions {
    /// Creates an ordered dimension list.
    #[must_use]
    pub fn new(entries: Vec<(String, Dimension)>) -> Self {
        Self(entries)
    }

    /// Iterates `(column name, dimension)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dimension)> {
        self.0.iter().map(|(name, dimension)| (name.as_str(), dimension))
    }

    /// Looks a dimension up by column name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, dimension)| dimension)
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no dimension is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Dimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, dimension) in &self.0 {
            map.serialize_entry(name, dimension)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dimensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DimensionsVisitor;

        impl<'de> Visitor<'de> for DimensionsVisitor {
            type Value = Dimensions;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a mapping of column names to dimensions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, dimension)) = access.next_entry::<String, Dimension>()? {
                    entries.push((name, dimension));
                }
                Ok(Dimensions(entries))
            }
        }

        deserializer.deserialize_map(DimensionsVisitor)
    }
}

impl CubeDescription {
    /// Parses and validates a YAML or JSON document.
    ///
    /// # Errors
    /// Returns [`DescriptionError`] when the document cannot be parsed or
    /// fails validation.
    ///
    /// # Examples
    /// ```
    /// use rdfcube_core::CubeDescription;
    ///
    /// let yaml = r#"
    /// Name: { en: Rainfall }
    /// Creator: [{ IRI: "https://example.org/org/meteo" }]
    /// Date Created: 2024-01-31
    /// Base-URI: https://example.org
    /// Identifier: rainfall
    /// Version: 2
    /// Work Status: Draft
    /// dimensions:
    ///   year:
    ///     name: { en: Year }
    ///     dimension-type: Key Dimension
    ///     scale-type: interval
    ///     path: year
    ///   mm:
    ///     name: { en: Rainfall }
    ///     dimension-type: Measure Dimension
    ///     scale-type: ratio
    ///     path: rainfall
    /// "#;
    /// let description = CubeDescription::from_yaml_str(yaml)?;
    /// assert_eq!(description.base_uri, "https://example.org/");
    /// assert_eq!(description.dimensions.len(), 2);
    /// # Ok::<(), rdfcube_core::DescriptionError>(())
    /// ```
    pub fn from_yaml_str(raw: &str) -> Result<Self, DescriptionError> {
        let description: Self = serde_yaml::from_str(raw)?;
        description.validated()
    }

    /// Reads, parses and validates the description stored at `path`.
    ///
    /// # Errors
    /// Returns [`DescriptionError::Io`] when the file cannot be read, and the
    /// errors of [`Self::from_yaml_str`] otherwise.
    pub fn from_path(path: &Path) -> Result<Self, DescriptionError> {
        let raw = fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Renders the description as YAML.
    ///
    /// # Errors
    /// Returns [`DescriptionError::Parse`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, DescriptionError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks structural rules and normalises the base IRI to end with `/`.
    ///
    /// # Errors
    /// Returns the first [`DescriptionError`] found.
    pub fn validated(mut self) -> Result<Self, DescriptionError> {
        if self.name.values().all(|text| text.trim().is_empty()) {
            return Err(DescriptionError::EmptyField { field: "Name" });
        }
        if self.creator.is_empty() {
            return Err(DescriptionError::EmptyField { field: "Creator" });
        }
        if self.identifier.trim().is_empty() {
            return Err(DescriptionError::EmptyField { field: "Identifier" });
        }
        if self.base_uri.trim().is_empty() {
            return Err(DescriptionError::EmptyField { field: "Base-URI" });
        }
        if !self.base_uri.ends_with('/') {
            self.base_uri.push('/');
        }
        self.creation_date()?;
        self.validate_dimensions()?;
        self.validate_terms()?;
        Ok(self)
    }

    /// Parses `Date Created`.
    ///
    /// # Errors
    /// Returns [`DescriptionError::InvalidDate`] when the value is not `YYYY-MM-DD`.
    pub fn creation_date(&self) -> Result<NaiveDate, DescriptionError> {
        NaiveDate::parse_from_str(self.date_created.trim(), "%Y-%m-%d").map_err(|_| {
            DescriptionError::InvalidDate {
                value: self.date_created.clone(),
            }
        })
    }

    /// Iterates the key dimensions in document order.
    pub fn key_dimensions(&self) -> impl Iterator<Item = (&str, &Dimension)> {
        self.dimensions
            .iter()
            .filter(|(_, dimension)| dimension.dimension_type.is_key())
    }

    fn validate_dimensions(&self) -> Result<(), DescriptionError> {
        if self.key_dimensions().next().is_none() {
            return Err(DescriptionError::MissingDimensionKind {
                kind: "key dimension",
            });
        }
        let mut measure_paths = Vec::new();
        for (_, dimension) in self.dimensions.iter() {
            if dimension.dimension_type == DimensionType::Measure {
                measure_paths.push(dimension.path.as_str());
            }
        }
        if measure_paths.is_empty() {
            return Err(DescriptionError::MissingDimensionKind {
                kind: "measure dimension",
            });
        }

        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (name, dimension) in self.dimensions.iter() {
            if dimension.path.trim().is_empty() {
                return Err(DescriptionError::EmptyField { field: "path" });
            }
            if let Some(first) = seen.insert(dimension.path.as_str(), name) {
                return Err(DescriptionError::DuplicatePath {
                    path: dimension.path.clone(),
                    first: first.to_owned(),
                    second: name.to_owned(),
                });
            }
            if dimension.dimension_type.is_annotation() {
                let relates_to =
                    dimension
                        .relates_to
                        .as_deref()
                        .ok_or_else(|| DescriptionError::MissingRelation {
                            dimension: name.to_owned(),
                        })?;
                if !measure_paths.contains(&relates_to) {
                    return Err(DescriptionError::UnknownRelation {
                        dimension: name.to_owned(),
                        relates_to: relates_to.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks that every language tag and every IRI the cube will mint from
    /// this description is well formed.
    fn validate_terms(&self) -> Result<(), DescriptionError> {
        check_iri("Base-URI", &self.base_uri)?;
        for (field, agents) in [
            ("Publisher", &self.publisher),
            ("Creator", &self.creator),
            ("Contributor", &self.contributor),
        ] {
            for agent in agents {
                check_iri(field, &agent.iri)?;
            }
        }
        check_languages(&self.name)?;
        check_languages(&self.description)?;

        for (_, dimension) in self.dimensions.iter() {
            check_languages(&dimension.name)?;
            check_languages(&dimension.description)?;
            check_iri("path", &format!("{}{}", self.base_uri, dimension.path))?;
            if let Some(unit) = &dimension.unit {
                check_iri("unit", &format!("{UNIT}{unit}"))?;
            }
            match &dimension.mapping {
                Some(Mapping::Additive { base }) => check_iri("mapping", base)?,
                Some(Mapping::Replace { replacements }) => {
                    for iri in replacements.values() {
                        check_iri("mapping", iri)?;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }
}

fn check_iri(field: &'static str, iri: &str) -> Result<(), DescriptionError> {
    NamedNode::new(iri)
        .map(drop)
        .map_err(|source| DescriptionError::InvalidIri {
            field,
            iri: iri.to_owned(),
            source,
        })
}

fn check_languages(texts: &LangMap) -> Result<(), DescriptionError> {
    for tag in texts.keys() {
        Literal::new_language_tagged_literal("", tag.as_str()).map_err(|source| {
            DescriptionError::InvalidLanguageTag {
                tag: tag.clone(),
                source,
            }
        })?;
    }
    Ok(())
}
