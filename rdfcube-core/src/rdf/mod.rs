//! RDF graph of a cube and its Turtle writer.
//!
//! Terms are `oxrdf` values; the graph only adds the subject grouping and
//! nesting the writer needs for a readable layout.

mod graph;
mod node;
mod turtle;
pub mod vocab;

pub use graph::{Graph, SubjectStatements};
pub use node::Node;
pub use oxrdf::{IriParseError, LanguageTagParseError, Literal, NamedNode, NamedNodeRef};
pub use turtle::write_turtle;
