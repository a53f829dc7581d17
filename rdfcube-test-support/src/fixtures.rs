//! Cube input fixtures.
//!
//! A small rainfall cube: two key dimensions (year, station), one measure and
//! its standard error. The JSON description differs from the YAML one only by
//! its identifier so tests can tell which file was picked up.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// YAML description matching [`DATA_CSV`].
pub const DESCRIPTION_YAML: &str = r"Name: { de: Niederschlag, en: Rainfall }
Description:
  de: Jährlicher Niederschlag pro Messstation
  en: Yearly rainfall per station
Publisher:
  - IRI: https://example.org/org/publisher
Creator:
  - IRI: https://example.org/org/creator
Contributor:
  - IRI: https://example.org/person/ada
    Name: Ada
Date Created: 2024-08-26
Contact Point:
  E-Mail: contact@example.org
  Name: Data Desk
Base-URI: https://example.org/
Identifier: rainfall
Version: 1
Work Status: Draft
Visualize: true
Accrual Periodicity: yearly
dimensions:
  Jahr:
    name: { de: Jahr, en: Year }
    dimension-type: Key Dimension
    scale-type: interval
    path: year
    datatype: gYear
    data-kind:
      type: temporal
      unit: year
  Station:
    name: { de: Station, en: Station }
    dimension-type: Key Dimension
    scale-type: nominal
    path: station
    mapping:
      type: additive
      base: https://example.org/station/
  Wert:
    name: { de: Niederschlag, en: Rainfall }
    description: { en: Total rainfall in millimetres }
    dimension-type: Measure Dimension
    scale-type: ratio
    path: value
    unit: MilliM
  Standardfehler:
    name: { de: Standardfehler, en: Standard error }
    dimension-type: Standard Error
    scale-type: ratio
    path: standard-error
    unit: MilliM
    relates-to: value
";

/// JSON rendition of [`DESCRIPTION_YAML`] with identifier `rainfall-json`.
pub const DESCRIPTION_JSON: &str = r#"{
  "Name": { "de": "Niederschlag", "en": "Rainfall" },
  "Creator": [{ "IRI": "https://example.org/org/creator" }],
  "Date Created": "2024-08-26",
  "Base-URI": "https://example.org/",
  "Identifier": "rainfall-json",
  "Version": 1,
  "Work Status": "Published",
  "dimensions": {
    "Jahr": {
      "name": { "en": "Year" },
      "dimension-type": "Key Dimension",
      "scale-type": "interval",
      "path": "year",
      "datatype": "gYear"
    },
    "Station": {
      "name": { "en": "Station" },
      "dimension-type": "Key Dimension",
      "scale-type": "nominal",
      "path": "station",
      "mapping": { "type": "additive", "base": "https://example.org/station/" }
    },
    "Wert": {
      "name": { "en": "Rainfall" },
      "dimension-type": "Measure Dimension",
      "scale-type": "ratio",
      "path": "value"
    },
    "Standardfehler": {
      "name": { "en": "Standard error" },
      "dimension-type": "Standard Error",
      "scale-type": "ratio",
      "path": "standard-error",
      "relates-to": "value"
    }
  }
}
"#;

/// Observations with a missing measure (`""`) and a missing standard error (`NA`).
pub const DATA_CSV: &str = "Jahr,Station,Wert,Standardfehler
2020,Bern,812.5,1.2
2020,Zürich,1000,NA
2021,Bern,790.25,1.1
2021,Zürich,,0.9
";

/// [`DATA_CSV`] with `;` separators, `,` decimals and `-` as the NA marker.
pub const DATA_CSV_SEMICOLON: &str = "Jahr;Station;Wert;Standardfehler
2020;Bern;812,5;1,2
2020;Zürich;1000;-
2021;Bern;790,25;1,1
2021;Zürich;-;0,9
";

/// Which description files [`write_cube_directory`] creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFiles {
    /// Only `description.yml`.
    Yaml,
    /// Only `description.json`.
    Json,
    /// Both files.
    Both,
    /// Neither file.
    None,
}

/// Writes `data.csv` and the requested description files into `dir`.
///
/// # Errors
/// Returns any I/O error raised while writing.
///
/// # Examples
/// ```
/// use rdfcube_test_support::fixtures::{DescriptionFiles, write_cube_directory};
///
/// let dir = tempfile::tempdir()?;
/// let root = write_cube_directory(dir.path(), DescriptionFiles::Yaml)?;
/// assert!(root.join("data.csv").exists());
/// assert!(!root.join("description.json").exists());
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_cube_directory(dir: &Path, files: DescriptionFiles) -> io::Result<PathBuf> {
    write_cube_directory_with(dir, files, DATA_CSV)
}

/// Like [`write_cube_directory`] but with custom CSV contents.
///
/// # Errors
/// Returns any I/O error raised while writing.
pub fn write_cube_directory_with(
    dir: &Path,
    files: DescriptionFiles,
    csv: &str,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join("data.csv"), csv)?;
    if matches!(files, DescriptionFiles::Yaml | DescriptionFiles::Both) {
        fs::write(dir.join("description.yml"), DESCRIPTION_YAML)?;
    }
    if matches!(files, DescriptionFiles::Json | DescriptionFiles::Both) {
        fs::write(dir.join("description.json"), DESCRIPTION_JSON)?;
    }
    Ok(dir.to_path_buf())
}
