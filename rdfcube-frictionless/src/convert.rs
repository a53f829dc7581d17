//! Conversion of a data package into `data.csv` plus `description.yml`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use rdfcube_core::{
    Agent, ContactPoint, CubeDescription, DataKind, Datatype, Dimension, DimensionType,
    Dimensions, LangMap, ScaleType, TimeUnit, WorkStatus,
};
use tracing::{Span, debug, field, info, instrument};

use crate::errors::FrictionlessError;
use crate::fetch::{Fetcher, UreqFetcher, descriptor_location, resolve};
use crate::package::{Contributor, DataPackage, Field, Resource, Schema};

/// Base IRI used when none is configured.
pub const DEFAULT_BASE_URI: &str = "https://example.org/";

const CREATOR_ROLES: &[&str] = &["author", "creator"];
const PUBLISHER_ROLES: &[&str] = &["publisher"];

/// Settings the descriptor cannot provide.
///
/// # Examples
/// ```
/// use rdfcube_frictionless::{ConvertOptions, DEFAULT_BASE_URI};
///
/// assert_eq!(ConvertOptions::default().base_uri(), DEFAULT_BASE_URI);
/// let options = ConvertOptions::default().with_base_uri("https://lindas.example/");
/// assert_eq!(options.base_uri(), "https://lindas.example/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    base_uri: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_owned(),
        }
    }
}

impl ConvertOptions {
    /// Sets the `Base-URI` written into the description.
    #[must_use]
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    /// Returns the configured base IRI.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }
}

/// Files written by a conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Path of the rewritten CSV.
    pub data_path: PathBuf,
    /// Path of the generated description.
    pub description_path: PathBuf,
    /// Number of data rows written.
    pub rows: usize,
    /// The generated description.
    pub description: CubeDescription,
}

/// Converts the data package at `url` into a cube directory at `output`.
///
/// # Errors
/// Returns [`FrictionlessError`] when fetching, parsing or writing fails, or
/// when the package does not describe a keyed CSV table.
pub fn convert_from_url(
    url: &str,
    output: &Path,
    options: &ConvertOptions,
) -> Result<Conversion, FrictionlessError> {
    convert_with_fetcher(url, output, options, &UreqFetcher)
}

/// Like [`convert_from_url`] with a caller-supplied [`Fetcher`].
///
/// # Errors
/// See [`convert_from_url`].
#[instrument(
    name = "frictionless.convert",
    err,
    skip(output, options, fetcher),
    fields(descriptor = field::Empty, rows = field::Empty),
)]
pub fn convert_with_fetcher(
    url: &str,
    output: &Path,
    options: &ConvertOptions,
    fetcher: &dyn Fetcher,
) -> Result<Conversion, FrictionlessError> {
    let span = Span::current();
    let location = descriptor_location(url);
    span.record("descriptor", field::display(&location));

    let raw = fetcher.fetch(&location)?;
    let package: DataPackage =
        serde_json::from_slice(&raw).map_err(|source| FrictionlessError::Json {
            location: location.clone(),
            source,
        })?;
    let resource = package
        .resources
        .iter()
        .find(|resource| resource.is_tabular())
        .ok_or_else(|| FrictionlessError::NoTabularResource {
            location: location.clone(),
        })?;
    let schema = resource
        .inline_schema()
        .ok_or_else(|| FrictionlessError::MissingSchema {
            resource: resource.label(),
        })?;
    let key = primary_key(resource, schema)?;
    debug!(resource = %resource.label(), fields = schema.fields.len(), "resource selected");

    fs::create_dir_all(output).map_err(|source| FrictionlessError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    let data = fetch_resource(resource, &location, fetcher)?;
    let data_path = output.join("data.csv");
    let rows = rewrite_csv(&data, resource, schema, &data_path)?;
    span.record("rows", rows);

    let description = describe(&package, schema, &key, &location, options)?;
    let description_path = output.join("description.yml");
    let yaml = description.to_yaml_string()?;
    fs::write(&description_path, yaml).map_err(|source| FrictionlessError::Io {
        path: description_path.clone(),
        source,
    })?;
    info!(rows, output = %output.display(), "data package converted");

    Ok(Conversion {
        data_path,
        description_path,
        rows,
        description,
    })
}

fn primary_key(resource: &Resource, schema: &Schema) -> Result<Vec<String>, FrictionlessError> {
    let key: Vec<String> = schema
        .primary_key
        .as_ref()
        .map(|key| key.fields().to_vec())
        .unwrap_or_default();
    if key.is_empty() {
        return Err(FrictionlessError::MissingPrimaryKey {
            resource: resource.label(),
        });
    }
    if let Some(unknown) = key
        .iter()
        .find(|name| !schema.fields.iter().any(|field| &field.name == *name))
    {
        return Err(FrictionlessError::UnknownKeyField {
            field: unknown.clone(),
        });
    }
    Ok(key)
}

fn fetch_resource(
    resource: &Resource,
    location: &str,
    fetcher: &dyn Fetcher,
) -> Result<Vec<u8>, FrictionlessError> {
    let mut data = Vec::new();
    let parts = resource.path.as_ref().map(|path| path.parts()).unwrap_or_default();
    for part in parts {
        let bytes = fetcher.fetch(&resolve(location, part))?;
        if !data.is_empty() && !data.ends_with(b"\n") {
            data.push(b'\n');
        }
        data.extend_from_slice(&bytes);
    }
    Ok(data)
}

fn delimiter(resource: &Resource) -> Result<u8, FrictionlessError> {
    let Some(delimiter) = resource.dialect.as_ref().and_then(|d| d.delimiter.as_deref()) else {
        return Ok(b',');
    };
    match delimiter.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(FrictionlessError::InvalidDelimiter {
            delimiter: delimiter.to_owned(),
        }),
    }
}

/// Copies `data` to `target` with `,` separators, blanking missing-value
/// tokens and normalising number formatting. Returns the row count.
fn rewrite_csv(
    data: &[u8],
    resource: &Resource,
    schema: &Schema,
    target: &Path,
) -> Result<usize, FrictionlessError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter(resource)?)
        .from_reader(data);
    let header: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    if let Some(field) = schema
        .fields
        .iter()
        .find(|field| !header.contains(&field.name))
    {
        return Err(FrictionlessError::MissingColumn {
            field: field.name.clone(),
        });
    }
    let columns: Vec<Option<&Field>> = header
        .iter()
        .map(|name| schema.fields.iter().find(|field| &field.name == name))
        .collect();

    let mut writer = csv::Writer::from_path(target)?;
    writer.write_record(&header)?;
    let mut rows = 0_usize;
    for record in reader.records() {
        let record = record?;
        let cells = record.iter().zip(columns.iter().copied()).map(|(cell, field)| {
            if schema.missing_values.iter().any(|token| token == cell) {
                String::new()
            } else {
                field.map_or_else(|| cell.to_owned(), |field| normalise_number(cell, field))
            }
        });
        writer.write_record(cells)?;
        rows += 1;
    }
    writer.flush().map_err(|source| FrictionlessError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(rows)
}

fn normalise_number(cell: &str, field: &Field) -> String {
    if !matches!(field.field_type.as_str(), "number" | "integer") {
        return cell.to_owned();
    }
    let mut value = cell.to_owned();
    if let Some(group) = field.group_char.as_deref().filter(|group| !group.is_empty()) {
        value = value.replace(group, "");
    }
    if let Some(decimal) = field.decimal_char.as_deref().filter(|decimal| *decimal != ".") {
        value = value.replace(decimal, ".");
    }
    value
}

fn describe(
    package: &DataPackage,
    schema: &Schema,
    key: &[String],
    location: &str,
    options: &ConvertOptions,
) -> Result<CubeDescription, FrictionlessError> {
    let identifier = package
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "cube".to_owned());
    let title = package.title.clone().unwrap_or_else(|| identifier.clone());

    let mut creator = agents(&package.contributors, CREATOR_ROLES);
    if creator.is_empty() {
        creator.push(Agent {
            iri: fallback_iri(location),
            name: None,
        });
    }
    let publisher = agents(&package.contributors, PUBLISHER_ROLES);
    let contributor: Vec<Agent> = package
        .contributors
        .iter()
        .filter(|c| !c.has_role(CREATOR_ROLES) && !c.has_role(PUBLISHER_ROLES))
        .filter_map(agent)
        .collect();
    let contact_point = package.contributors.iter().find_map(|c| {
        c.email.as_ref().map(|email| ContactPoint {
            email: email.clone(),
            name: c.title.clone().unwrap_or_else(|| email.clone()),
        })
    });

    let description = CubeDescription {
        name: english(&title),
        description: package.description.as_deref().map(english).unwrap_or_default(),
        publisher,
        creator,
        contributor,
        date_created: creation_date(package.created.as_deref()),
        contact_point,
        base_uri: options.base_uri.clone(),
        identifier,
        version: major_version(package.version.as_deref()),
        work_status: WorkStatus::Draft,
        visualize: false,
        accrual_periodicity: None,
        dimensions: dimensions(schema, key),
    };
    Ok(description.validated()?)
}

fn agents(contributors: &[Contributor], roles: &[&str]) -> Vec<Agent> {
    contributors
        .iter()
        .filter(|c| c.has_role(roles))
        .filter_map(agent)
        .collect()
}

/// Contributors are only usable when they carry an IRI in `path`.
fn agent(contributor: &Contributor) -> Option<Agent> {
    let iri = contributor.path.as_ref().filter(|path| path.contains("://"))?;
    Some(Agent {
        iri: iri.clone(),
        name: contributor.title.clone(),
    })
}

fn fallback_iri(location: &str) -> String {
    if location.contains("://") {
        location.to_owned()
    } else {
        format!("file://{location}")
    }
}

fn english(text: &str) -> LangMap {
    BTreeMap::from([("en".to_owned(), text.to_owned())])
}

fn creation_date(created: Option<&str>) -> String {
    created
        .and_then(|created| created.get(..10))
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

fn major_version(version: Option<&str>) -> u32 {
    version
        .map(|version| version.trim().trim_start_matches(['v', 'V']))
        .and_then(|version| version.split('.').next())
        .and_then(|major| major.parse().ok())
        .unwrap_or(1)
}

fn dimensions(schema: &Schema, key: &[String]) -> Dimensions {
    let mut paths = HashSet::new();
    let entries = schema
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let is_key = key.contains(&field.name);
            let (datatype, temporal) = match field.field_type.as_str() {
                "integer" => (Some(Datatype::Integer), None),
                "number" => (Some(Datatype::Decimal), None),
                "boolean" => (Some(Datatype::Boolean), None),
                "date" => (Some(Datatype::Date), Some(TimeUnit::Day)),
                "year" => (Some(Datatype::GYear), Some(TimeUnit::Year)),
                "string" => (Some(Datatype::String), None),
                _ => (None, None),
            };
            let numeric = datatype.is_some_and(Datatype::is_numeric);
            let scale_type = match (is_key, temporal.is_some(), numeric) {
                (_, true, _) => ScaleType::Interval,
                (false, false, true) => ScaleType::Ratio,
                _ => ScaleType::Nominal,
            };
            let dimension = Dimension {
                name: english(field.title.as_deref().unwrap_or(&field.name)),
                description: field.description.as_deref().map(english).unwrap_or_default(),
                dimension_type: if is_key {
                    DimensionType::Key
                } else {
                    DimensionType::Measure
                },
                scale_type,
                path: unique_path(&field.name, index, &mut paths),
                datatype,
                unit: None,
                data_kind: temporal.map(|unit| DataKind::Temporal { unit }),
                mapping: None,
                relates_to: None,
            };
            (field.name.clone(), dimension)
        })
        .collect();
    Dimensions::new(entries)
}

/// Lower-case, hyphen-separated path segment, unique within the cube.
fn unique_path(name: &str, index: usize, taken: &mut HashSet<String>) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let base = if slug.is_empty() {
        format!("field-{index}")
    } else {
        slug.to_owned()
    };
    let mut candidate = base.clone();
    let mut suffix = 2_usize;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(Some("2.1.0"), 2)]
    #[case(Some("v3"), 3)]
    #[case(Some("draft"), 1)]
    #[case(None, 1)]
    fn versions_keep_their_major_component(#[case] version: Option<&str>, #[case] expected: u32) {
        assert_eq!(major_version(version), expected);
    }

    #[rstest]
    #[case(Some("2023-05-04T10:00:00Z"), "2023-05-04")]
    #[case(Some("2023-05-04"), "2023-05-04")]
    fn creation_dates_keep_the_date_part(#[case] created: Option<&str>, #[case] expected: &str) {
        assert_eq!(creation_date(created), expected);
    }

    #[test]
    fn unparseable_creation_dates_fall_back_to_today() {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(creation_date(Some("last spring")), today);
        assert_eq!(creation_date(None), today);
    }

    #[test]
    fn paths_are_slugged_and_deduplicated() {
        let mut taken = HashSet::new();
        assert_eq!(unique_path("Rainfall (mm)", 0, &mut taken), "rainfall-mm");
        assert_eq!(unique_path("rainfall mm", 1, &mut taken), "rainfall-mm-2");
        assert_eq!(unique_path("äöü", 2, &mut taken), "field-2");
    }

    #[rstest]
    #[case("1'234,5", Some("'"), Some(","), "1234.5")]
    #[case("1234.5", None, None, "1234.5")]
    fn numbers_are_normalised(
        #[case] cell: &str,
        #[case] group: Option<&str>,
        #[case] decimal: Option<&str>,
        #[case] expected: &str,
    ) {
        let field = Field {
            name: "mm".into(),
            title: None,
            description: None,
            field_type: "number".into(),
            decimal_char: decimal.map(str::to_owned),
            group_char: group.map(str::to_owned),
        };
        assert_eq!(normalise_number(cell, &field), expected);
    }
}
