//! The subset of the data package descriptor the converter reads.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DataPackage {
    pub(crate) name: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) created: Option<String>,
    #[serde(default)]
    pub(crate) contributors: Vec<Contributor>,
    #[serde(default)]
    pub(crate) resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Contributor {
    pub(crate) title: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) email: Option<String>,
    /// Data package v1.
    pub(crate) role: Option<String>,
    /// Data package v2.
    #[serde(default)]
    pub(crate) roles: Vec<String>,
}

impl Contributor {
    pub(crate) fn has_role(&self, wanted: &[&str]) -> bool {
        self.role
            .iter()
            .chain(&self.roles)
            .any(|role| wanted.contains(&role.to_ascii_lowercase().as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ResourcePath {
    Single(String),
    /// Chunks of one file; only the first carries the header.
    Parts(Vec<String>),
}

impl ResourcePath {
    pub(crate) fn parts(&self) -> &[String] {
        match self {
            Self::Single(path) => std::slice::from_ref(path),
            Self::Parts(parts) => parts,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Resource {
    pub(crate) name: Option<String>,
    pub(crate) path: Option<ResourcePath>,
    pub(crate) format: Option<String>,
    pub(crate) dialect: Option<Dialect>,
    pub(crate) schema: Option<SchemaRef>,
}

impl Resource {
    pub(crate) fn is_tabular(&self) -> bool {
        let csv_format = self
            .format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("csv"));
        let csv_path = self.path.as_ref().is_some_and(|path| {
            path.parts()
                .first()
                .is_some_and(|part| part.to_ascii_lowercase().ends_with(".csv"))
        });
        csv_format || csv_path
    }

    /// The schema when it is given inline; references are not fetched.
    pub(crate) fn inline_schema(&self) -> Option<&Schema> {
        match self.schema.as_ref()? {
            SchemaRef::Inline(schema) => Some(schema),
            SchemaRef::Reference(_) => None,
        }
    }

    pub(crate) fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| {
                self.path
                    .as_ref()
                    .and_then(|path| path.parts().first().cloned())
            })
            .unwrap_or_else(|| "<unnamed>".to_owned())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Dialect {
    pub(crate) delimiter: Option<String>,
}

/// A table schema, inline or as a path/URL to a separate JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum SchemaRef {
    Inline(Schema),
    Reference(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Schema {
    #[serde(default)]
    pub(crate) fields: Vec<Field>,
    pub(crate) primary_key: Option<PrimaryKey>,
    #[serde(default = "default_missing_values")]
    pub(crate) missing_values: Vec<String>,
}

fn default_missing_values() -> Vec<String> {
    vec![String::new()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKey {
    pub(crate) fn fields(&self) -> &[String] {
        match self {
            Self::Single(field) => std::slice::from_ref(field),
            Self::Composite(fields) => fields,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Field {
    pub(crate) name: String,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    #[serde(rename = "type", default = "default_field_type")]
    pub(crate) field_type: String,
    pub(crate) decimal_char: Option<String>,
    pub(crate) group_char: Option<String>,
}

fn default_field_type() -> String {
    "string".to_owned()
}
