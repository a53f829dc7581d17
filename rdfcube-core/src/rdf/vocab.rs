//! Namespaces used by cube graphs and their Turtle prefixes.

use oxrdf::NamedNode;

/// RDF syntax namespace.
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// XML Schema datatypes.
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
/// schema.org.
pub const SCHEMA: &str = "http://schema.org/";
/// cube.link core vocabulary.
pub const CUBE: &str = "https://cube.link/";
/// cube.link metadata extensions.
pub const META: &str = "https://cube.link/meta/";
/// cube.link dimension relations.
pub const RELATION: &str = "https://cube.link/relation/";
/// SHACL.
pub const SH: &str = "http://www.w3.org/ns/shacl#";
/// QUDT schema.
pub const QUDT: &str = "http://qudt.org/schema/qudt/";
/// QUDT units.
pub const UNIT: &str = "http://qudt.org/vocab/unit/";
/// OWL-Time.
pub const TIME: &str = "http://www.w3.org/2006/time#";
/// DCAT.
pub const DCAT: &str = "http://www.w3.org/ns/dcat#";
/// Dublin Core terms.
pub const DCT: &str = "http://purl.org/dc/terms/";
/// EU frequency authority table.
pub const FREQ: &str = "http://publications.europa.eu/resource/authority/frequency/";
/// Creative work status vocabulary used by the LINDAS platform.
pub const WORK_STATUS: &str = "https://ld.admin.ch/vocabulary/CreativeWorkStatus/";

/// IRI of the visualisation application advertised through `schema:workExample`.
pub const VISUALIZE_APPLICATION: &str = "https://ld.admin.ch/application/visualize";

/// Prefixes the Turtle writer may abbreviate, in header order.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF),
    ("xsd", XSD),
    ("schema", SCHEMA),
    ("cube", CUBE),
    ("meta", META),
    ("relation", RELATION),
    ("sh", SH),
    ("qudt", QUDT),
    ("unit", UNIT),
    ("time", TIME),
    ("dcat", DCAT),
    ("dct", DCT),
    ("freq", FREQ),
];

/// Joins one of the namespaces above with a local name of its vocabulary.
///
/// The result is not checked; `local` must be a plain vocabulary term such as
/// `Observation`. IRIs built from description or table content go through
/// [`NamedNode::new`] instead.
#[must_use]
pub fn term(namespace: &str, local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{namespace}{local}"))
}

/// `rdf:type`.
#[must_use]
pub fn rdf_type() -> NamedNode {
    oxrdf::vocab::rdf::TYPE.into_owned()
}

/// Finds the longest known namespace that `iri` starts with.
#[must_use]
pub fn split_prefix(iri: &str) -> Option<(&'static str, &'static str, &str)> {
    PREFIXES
        .iter()
        .filter_map(|(prefix, namespace)| {
            iri.strip_prefix(namespace)
                .map(|local| (*prefix, *namespace, local))
        })
        .max_by_key(|(_, namespace, _)| namespace.len())
}
