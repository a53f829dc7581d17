//! Resolution of table cells into RDF objects.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use oxrdf::NamedNode;

use super::{CubeIris, named};
use crate::builder::MissingValuePolicy;
use crate::description::{CubeDescription, Datatype, Dimension, Mapping, ScaleType};
use crate::error::{CubeError, Result, TableError};
use crate::rdf::Node;
use crate::rdf::vocab::{CUBE, XSD, term};
use crate::table::{Table, Value};

/// Table contents resolved against the description.
#[derive(Debug, Clone)]
pub(super) struct PreparedData {
    /// One entry per dimension, in description order.
    pub(super) columns: Vec<PreparedColumn>,
    /// One observation IRI per table row.
    pub(super) observations: Vec<NamedNode>,
}

/// Whether a column holds IRIs or literals of one datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ValueKind {
    Iri,
    Literal(Datatype),
}

#[derive(Debug, Clone)]
pub(super) struct PreparedColumn {
    pub(super) property: NamedNode,
    pub(super) kind: ValueKind,
    pub(super) values: Vec<Node>,
    pub(super) has_missing: bool,
    /// Smallest and largest value of numeric literal columns.
    pub(super) range: Option<(Node, Node)>,
    /// Distinct values of nominal and ordinal key dimensions, first-seen order.
    pub(super) distinct: Vec<Node>,
}

pub(super) fn prepare<T: Table>(
    table: &T,
    description: &CubeDescription,
    iris: &CubeIris,
    policy: MissingValuePolicy,
) -> Result<PreparedData> {
    let table_name: Arc<str> = Arc::from(table.name());
    let rows = table.row_count();
    let mut columns = Vec::with_capacity(description.dimensions.len());
    let mut key_segments: Vec<Vec<String>> = vec![Vec::new(); rows];

    for (name, dimension) in description.dimensions.iter() {
        let index = table
            .column_index(name)
            .ok_or_else(|| CubeError::MissingColumn {
                table: Arc::clone(&table_name),
                dimension: name.to_owned(),
            })?;
        let cells = (0..rows)
            .map(|row| table.cell(row, index))
            .collect::<core::result::Result<Vec<&Value>, TableError>>()
            .map_err(|error| CubeError::Table {
                table: Arc::clone(&table_name),
                error,
            })?;

        if dimension.dimension_type.is_key() {
            for (row, (cell, segments)) in cells.iter().zip(key_segments.iter_mut()).enumerate() {
                if cell.is_missing() {
                    return Err(CubeError::MissingKeyValue {
                        dimension: name.to_owned(),
                        row,
                    });
                }
                segments.push(escape_key_segment(&cell.to_string()));
            }
        }

        columns.push(prepare_column(
            name,
            dimension,
            &cells,
            &description.base_uri,
            policy,
        )?);
    }

    let observations = mint_observations(iris.cube.as_str(), &key_segments)?;
    Ok(PreparedData {
        columns,
        observations,
    })
}

/// Joins the escaped key values of each row with `_`. Key segments never
/// contain a raw `_`, so distinct key combinations give distinct IRIs.
fn mint_observations(cube: &str, key_segments: &[Vec<String>]) -> Result<Vec<NamedNode>> {
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(key_segments.len());
    let mut observations = Vec::with_capacity(key_segments.len());
    for (row, segments) in key_segments.iter().enumerate() {
        let key = segments.join("_");
        if let Some(first) = seen.insert(key.clone(), row) {
            return Err(CubeError::DuplicateObservation {
                key,
                first,
                second: row,
            });
        }
        observations.push(named(format!("{cube}/observation/{key}"))?);
    }
    Ok(observations)
}

fn prepare_column(
    name: &str,
    dimension: &Dimension,
    cells: &[&Value],
    base_uri: &str,
    policy: MissingValuePolicy,
) -> Result<PreparedColumn> {
    let kind = resolve_kind(dimension, cells);
    let numeric = matches!(kind, ValueKind::Literal(datatype) if datatype.is_numeric());
    let collect_distinct = dimension.dimension_type.is_key()
        && matches!(dimension.scale_type, ScaleType::Nominal | ScaleType::Ordinal);

    let mut values = Vec::with_capacity(cells.len());
    let mut has_missing = false;
    let mut distinct = Vec::new();
    let mut distinct_seen: HashSet<String> = HashSet::new();
    let mut range: Option<((&Value, Node), (&Value, Node))> = None;

    for (row, cell) in cells.iter().enumerate() {
        if cell.is_missing() {
            if policy == MissingValuePolicy::Reject {
                return Err(CubeError::MissingValue {
                    dimension: name.to_owned(),
                    row,
                });
            }
            has_missing = true;
            values.push(undefined());
            continue;
        }
        let node = convert(name, dimension, kind, cell, row)?;
        if numeric && matches!(cell, Value::Integer(_) | Value::Decimal(_)) {
            range = Some(match range.take() {
                None => ((*cell, node.clone()), (*cell, node.clone())),
                Some((min, max)) => (
                    if cell.numeric_cmp(min.0) == Some(Ordering::Less) {
                        (*cell, node.clone())
                    } else {
                        min
                    },
                    if cell.numeric_cmp(max.0) == Some(Ordering::Greater) {
                        (*cell, node.clone())
                    } else {
                        max
                    },
                ),
            });
        }
        if collect_distinct && distinct_seen.insert(cell.to_string()) {
            distinct.push(node.clone());
        }
        values.push(node);
    }

    Ok(PreparedColumn {
        property: named(format!("{base_uri}{}", dimension.path))?,
        kind,
        values,
        has_missing,
        range: range.map(|((_, min), (_, max))| (min, max)),
        distinct,
    })
}

fn resolve_kind(dimension: &Dimension, cells: &[&Value]) -> ValueKind {
    if dimension.mapping.is_some() {
        return ValueKind::Iri;
    }
    match dimension.datatype {
        Some(Datatype::Uri) => ValueKind::Iri,
        Some(datatype) => ValueKind::Literal(datatype),
        None => ValueKind::Literal(infer_datatype(cells)),
    }
}

/// Narrowest datatype that fits every present cell.
fn infer_datatype(cells: &[&Value]) -> Datatype {
    let mut present = cells.iter().filter(|cell| !cell.is_missing()).peekable();
    if present.peek().is_none() {
        return Datatype::String;
    }
    let (mut integers, mut numbers, mut booleans) = (true, true, true);
    for cell in present {
        match cell {
            Value::Integer(_) => booleans = false,
            Value::Decimal(_) => {
                integers = false;
                booleans = false;
            }
            Value::Boolean(_) => {
                integers = false;
                numbers = false;
            }
            Value::Text(_) | Value::Missing => return Datatype::String,
        }
    }
    if integers {
        Datatype::Integer
    } else if numbers {
        Datatype::Decimal
    } else if booleans {
        Datatype::Boolean
    } else {
        Datatype::String
    }
}

fn convert(
    name: &str,
    dimension: &Dimension,
    kind: ValueKind,
    cell: &Value,
    row: usize,
) -> Result<Node> {
    let invalid = |datatype: &'static str| CubeError::InvalidValue {
        dimension: name.to_owned(),
        row,
        value: cell.to_string(),
        datatype,
    };
    let datatype = match kind {
        ValueKind::Iri => {
            let text = cell.to_string();
            let iri = match &dimension.mapping {
                Some(Mapping::Additive { base }) => format!("{base}{}", escape_segment(&text)),
                Some(Mapping::Replace { replacements }) => replacements
                    .get(&text)
                    .cloned()
                    .ok_or_else(|| invalid("mapped value"))?,
                None => text,
            };
            return NamedNode::new(iri)
                .map(Node::Iri)
                .map_err(|_| invalid("IRI"));
        }
        ValueKind::Literal(datatype) => datatype,
    };

    let iri = datatype_iri(datatype);
    match (datatype, cell) {
        (Datatype::String, _) => Ok(Node::string(cell.to_string())),
        (Datatype::Integer, Value::Integer(value)) => Ok(Node::integer(*value)),
        (Datatype::Decimal | Datatype::Double, Value::Integer(_) | Value::Decimal(_)) => {
            Ok(Node::typed(cell.to_string(), iri))
        }
        (Datatype::Boolean, Value::Boolean(value)) => Ok(Node::boolean(*value)),
        (Datatype::Date, Value::Text(text))
            if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() =>
        {
            Ok(Node::typed(text.clone(), iri))
        }
        (Datatype::GYear, Value::Integer(year)) if (0..=9999).contains(year) => {
            Ok(Node::typed(format!("{year:04}"), iri))
        }
        (Datatype::GYear, Value::Text(text))
            if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Ok(Node::typed(text.clone(), iri))
        }
        _ => Err(invalid(datatype_label(datatype))),
    }
}

pub(super) fn datatype_iri(datatype: Datatype) -> NamedNode {
    term(XSD, datatype_label(datatype))
}

const fn datatype_label(datatype: Datatype) -> &'static str {
    match datatype {
        Datatype::String => "string",
        Datatype::Integer => "integer",
        Datatype::Decimal => "decimal",
        Datatype::Double => "double",
        Datatype::Boolean => "boolean",
        Datatype::Date => "date",
        Datatype::GYear => "gYear",
        Datatype::Uri => "anyURI",
    }
}

pub(super) fn undefined() -> Node {
    Node::typed("", term(CUBE, "Undefined"))
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub(super) fn escape_segment(raw: &str) -> String {
    percent_encode(raw, |byte| {
        byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
    })
}

/// Like [`escape_segment`], but `_` is encoded as well since it joins the
/// key segments of an observation IRI.
fn escape_key_segment(raw: &str) -> String {
    percent_encode(raw, |byte| {
        byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'~')
    })
}

fn percent_encode(raw: &str, keep: impl Fn(u8) -> bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if keep(byte) {
            out.push(char::from(byte));
        } else {
            out.push('%');
            for nibble in [byte >> 4, byte & 0x0F] {
                out.extend(
                    char::from_digit(u32::from(nibble), 16).map(|digit| digit.to_ascii_uppercase()),
                );
            }
        }
    }
    out
}
