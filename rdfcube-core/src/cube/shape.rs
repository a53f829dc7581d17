//! SHACL constraint describing every observation of a cube.

use oxrdf::NamedNode;

use super::prepare::{PreparedColumn, PreparedData, ValueKind, datatype_iri};
use super::{CubeIris, language_text, named};
use crate::description::{
    CubeDescription, DataKind, Dimension, DimensionType, LangMap, ScaleType, TimeUnit,
};
use crate::error::Result;
use crate::rdf::vocab::{CUBE, META, QUDT, RELATION, SCHEMA, SH, TIME, UNIT, rdf_type, term};
use crate::rdf::{Graph, Node};

type Properties = Vec<(NamedNode, Node)>;

pub(super) fn write(
    graph: &mut Graph,
    prepared: &PreparedData,
    description: &CubeDescription,
    iris: &CubeIris,
    observer: &NamedNode,
) -> Result<()> {
    let shape = &iris.shape;
    let a = rdf_type();
    graph.add(shape, &a, term(CUBE, "Constraint"));
    graph.add(shape, &a, term(SH, "NodeShape"));
    graph.add(shape, &term(SH, "closed"), Node::boolean(true));

    let property = term(SH, "property");
    graph.add(
        shape,
        &property,
        fixed_property(a.clone(), term(CUBE, "Observation")),
    );
    graph.add(
        shape,
        &property,
        fixed_property(term(CUBE, "observedBy"), observer.clone()),
    );

    for ((_, dimension), column) in description.dimensions.iter().zip(&prepared.columns) {
        graph.add(
            shape,
            &property,
            Node::Blank(dimension_properties(dimension, column, &description.base_uri)?),
        );
    }
    Ok(())
}

/// Property shape admitting exactly one IRI, `value`.
fn fixed_property(path: NamedNode, value: NamedNode) -> Node {
    Node::Blank(vec![
        (term(SH, "path"), Node::from(path)),
        (term(SH, "nodeKind"), Node::from(term(SH, "IRI"))),
        (term(SH, "in"), Node::Collection(vec![Node::from(value)])),
        (term(SH, "minCount"), Node::integer(1)),
        (term(SH, "maxCount"), Node::integer(1)),
    ])
}

fn dimension_properties(
    dimension: &Dimension,
    column: &PreparedColumn,
    base_uri: &str,
) -> Result<Properties> {
    let mut properties = Properties::new();
    match dimension.dimension_type {
        DimensionType::Key => properties.push((rdf_type(), Node::from(term(CUBE, "KeyDimension")))),
        DimensionType::Measure => {
            properties.push((rdf_type(), Node::from(term(CUBE, "MeasureDimension"))));
        }
        DimensionType::StandardError
        | DimensionType::UpperUncertainty
        | DimensionType::LowerUncertainty => {}
    }
    properties.push((term(SH, "path"), Node::from(column.property.clone())));
    push_lang_map(&mut properties, &term(SCHEMA, "name"), &dimension.name)?;
    push_lang_map(&mut properties, &term(SCHEMA, "description"), &dimension.description)?;
    properties.push((term(SH, "minCount"), Node::integer(1)));
    properties.push((term(SH, "maxCount"), Node::integer(1)));
    properties.push((
        term(QUDT, "scaleType"),
        Node::from(term(QUDT, scale_type(dimension.scale_type))),
    ));

    let value_constraint = match column.kind {
        ValueKind::Iri => (term(SH, "nodeKind"), Node::from(term(SH, "IRI"))),
        ValueKind::Literal(datatype) => (term(SH, "datatype"), Node::from(datatype_iri(datatype))),
    };
    if column.has_missing {
        properties.push((
            term(SH, "or"),
            Node::Collection(vec![
                Node::Blank(vec![value_constraint]),
                Node::Blank(vec![(
                    term(SH, "datatype"),
                    Node::from(term(CUBE, "Undefined")),
                )]),
            ]),
        ));
    } else {
        properties.push(value_constraint);
    }

    if !column.distinct.is_empty() {
        properties.push((term(SH, "in"), Node::Collection(column.distinct.clone())));
    }
    if let Some((min, max)) = &column.range {
        properties.push((term(SH, "minInclusive"), min.clone()));
        properties.push((term(SH, "maxInclusive"), max.clone()));
    }
    if let Some(unit) = &dimension.unit {
        properties.push((term(QUDT, "hasUnit"), Node::from(named(format!("{UNIT}{unit}"))?)));
    }
    if let Some(kind) = dimension.data_kind {
        properties.push((term(META, "dataKind"), data_kind(kind)));
    }
    if let Some(relation) = relation_class(dimension.dimension_type) {
        if let Some(relates_to) = &dimension.relates_to {
            properties.push((
                term(META, "dimensionRelation"),
                Node::Blank(vec![
                    (rdf_type(), Node::from(term(RELATION, relation))),
                    (
                        term(META, "relatesTo"),
                        Node::from(named(format!("{base_uri}{relates_to}"))?),
                    ),
                ]),
            ));
        }
    }
    Ok(properties)
}

fn push_lang_map(properties: &mut Properties, predicate: &NamedNode, texts: &LangMap) -> Result<()> {
    for (language, text) in texts {
        if !text.trim().is_empty() {
            properties.push((predicate.clone(), language_text(text, language)?));
        }
    }
    Ok(())
}

const fn scale_type(scale: ScaleType) -> &'static str {
    match scale {
        ScaleType::Nominal => "NominalScale",
        ScaleType::Ordinal => "OrdinalScale",
        ScaleType::Interval => "IntervalScale",
        ScaleType::Ratio => "RatioScale",
    }
}

const fn relation_class(dimension_type: DimensionType) -> Option<&'static str> {
    match dimension_type {
        DimensionType::StandardError => Some("StandardError"),
        DimensionType::UpperUncertainty => Some("ConfidenceUpperBound"),
        DimensionType::LowerUncertainty => Some("ConfidenceLowerBound"),
        DimensionType::Key | DimensionType::Measure => None,
    }
}

fn data_kind(kind: DataKind) -> Node {
    match kind {
        DataKind::Temporal { unit } => Node::Blank(vec![
            (
                rdf_type(),
                Node::from(term(TIME, "GeneralDateTimeDescription")),
            ),
            (term(TIME, "unitType"), Node::from(term(TIME, time_unit(unit)))),
        ]),
        DataKind::SpatialShape => {
            Node::Blank(vec![(rdf_type(), Node::from(term(SCHEMA, "GeoShape")))])
        }
        DataKind::SpatialCoordinates => {
            Node::Blank(vec![(rdf_type(), Node::from(term(SCHEMA, "GeoCoordinates")))])
        }
    }
}

const fn time_unit(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Year => "unitYear",
        TimeUnit::Month => "unitMonth",
        TimeUnit::Week => "unitWeek",
        TimeUnit::Day => "unitDay",
        TimeUnit::Hour => "unitHour",
        TimeUnit::Minute => "unitMinute",
        TimeUnit::Second => "unitSecond",
    }
}
