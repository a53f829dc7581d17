//! Turtle serialization of a [`Graph`].
//!
//! Terms are printed through their `oxrdf` N-Triples form, which is valid
//! Turtle; this module only chooses the layout and the prefixed names.

use std::collections::BTreeSet;
use std::io::{self, Write};

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Literal, LiteralRef, NamedNodeRef};

use crate::rdf::graph::{Graph, SubjectStatements};
use crate::rdf::node::Node;
use crate::rdf::vocab::{PREFIXES, split_prefix};

const INDENT: &str = "    ";

/// Writes `graph` as a Turtle document.
///
/// Only prefixes that are actually used are declared.
///
/// # Errors
/// Returns any I/O error raised by `writer`.
///
/// # Examples
/// ```
/// use rdfcube_core::rdf::{Graph, NamedNode, Node, vocab, write_turtle};
///
/// let mut graph = Graph::default();
/// graph.add(
///     &NamedNode::new("https://example.org/cube")?,
///     &vocab::rdf_type(),
///     vocab::term(vocab::CUBE, "Cube"),
/// );
/// let mut out = Vec::new();
/// write_turtle(&graph, &mut out)?;
/// let text = String::from_utf8(out)?;
/// assert!(text.starts_with("@prefix cube: <https://cube.link/> ."));
/// assert!(text.contains("<https://example.org/cube>\n    a cube:Cube ."));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_turtle<W: Write>(graph: &Graph, mut writer: W) -> io::Result<()> {
    let mut renderer = Renderer::default();
    for statements in graph.subjects() {
        renderer.subject(statements);
    }
    for (prefix, namespace) in PREFIXES {
        if renderer.used.contains(prefix) {
            writeln!(writer, "@prefix {prefix}: <{namespace}> .")?;
        }
    }
    if !renderer.used.is_empty() {
        writeln!(writer)?;
    }
    writer.write_all(renderer.body.as_bytes())?;
    writer.flush()
}

#[derive(Default)]
struct Renderer {
    body: String,
    used: BTreeSet<&'static str>,
}

impl Renderer {
    fn subject(&mut self, statements: &SubjectStatements) {
        let subject = self.iri(statements.subject().as_ref());
        self.body.push_str(&subject);
        self.body.push('\n');
        let count = statements.predicates().len();
        for (index, (predicate, objects)) in statements.predicates().iter().enumerate() {
            self.body.push_str(INDENT);
            self.predicate(predicate.as_ref());
            for (position, object) in objects.iter().enumerate() {
                if position > 0 {
                    self.body.push_str(", ");
                }
                self.node(object, 1);
            }
            self.body
                .push_str(if index + 1 == count { " .\n\n" } else { " ;\n" });
        }
    }

    /// Writes the predicate followed by a space.
    fn predicate(&mut self, predicate: NamedNodeRef<'_>) {
        if predicate == rdf::TYPE {
            self.body.push('a');
        } else {
            let rendered = self.iri(predicate);
            self.body.push_str(&rendered);
        }
        self.body.push(' ');
    }

    fn node(&mut self, node: &Node, depth: usize) {
        match node {
            Node::Iri(iri) => {
                let rendered = self.iri(iri.as_ref());
                self.body.push_str(&rendered);
            }
            Node::Literal(literal) => {
                let rendered = self.literal(literal.as_ref());
                self.body.push_str(&rendered);
            }
            Node::Blank(properties) if properties.is_empty() => self.body.push_str("[]"),
            Node::Blank(properties) => {
                self.body.push_str("[\n");
                for (index, (predicate, object)) in properties.iter().enumerate() {
                    self.body.push_str(&INDENT.repeat(depth + 1));
                    self.predicate(predicate.as_ref());
                    self.node(object, depth + 1);
                    self.body
                        .push_str(if index + 1 == properties.len() { "\n" } else { " ;\n" });
                }
                self.body.push_str(&INDENT.repeat(depth));
                self.body.push(']');
            }
            Node::Collection(items) => {
                self.body.push('(');
                for item in items {
                    self.body.push(' ');
                    self.node(item, depth);
                }
                self.body.push_str(" )");
            }
        }
    }

    fn iri(&mut self, iri: NamedNodeRef<'_>) -> String {
        if let Some((prefix, _, local)) = split_prefix(iri.as_str()) {
            if is_prefixable_local(local) {
                self.used.insert(prefix);
                return format!("{prefix}:{local}");
            }
        }
        iri.to_string()
    }

    fn literal(&mut self, literal: LiteralRef<'_>) -> String {
        let lexical = literal.value();
        if literal.language().is_some() {
            return literal.to_string();
        }
        let quoted = Literal::new_simple_literal(lexical).to_string();
        let datatype = literal.datatype();
        if datatype == xsd::STRING {
            quoted
        } else if (datatype == xsd::INTEGER && is_canonical_integer(lexical))
            || (datatype == xsd::BOOLEAN && matches!(lexical, "true" | "false"))
        {
            lexical.to_owned()
        } else {
            format!("{quoted}^^{}", self.iri(datatype))
        }
    }
}

/// Conservative subset of Turtle's `PN_LOCAL`.
fn is_prefixable_local(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphanumeric() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_canonical_integer(lexical: &str) -> bool {
    let digits = lexical.strip_prefix('-').unwrap_or(lexical);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    use oxrdf::NamedNode;
    use oxttl::TurtleParser;
    use rstest::rstest;

    use crate::rdf::vocab::{CUBE, SCHEMA, SH, XSD, rdf_type, term};

    fn iri(raw: &str) -> NamedNode {
        NamedNode::new(raw).expect("test IRIs are valid")
    }

    fn render(graph: &Graph) -> String {
        let mut out = Vec::new();
        write_turtle(graph, &mut out).expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("turtle is UTF-8")
    }

    fn parsed_triples(text: &str) -> Vec<oxrdf::Triple> {
        TurtleParser::new()
            .for_slice(text.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("output is valid Turtle")
    }

    #[rstest]
    #[case(Node::string("plain"), "\"plain\"")]
    #[case(Node::lang("Jahr", "de").expect("valid tag"), "\"Jahr\"@de")]
    #[case(Node::integer(-42), "-42")]
    #[case(Node::boolean(true), "true")]
    #[case(Node::typed("007", term(XSD, "integer")), "\"007\"^^xsd:integer")]
    #[case(Node::typed("1.5", term(XSD, "decimal")), "\"1.5\"^^xsd:decimal")]
    #[case(Node::typed("", term(CUBE, "Undefined")), "\"\"^^cube:Undefined")]
    #[case(Node::string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"")]
    #[case(Node::from(iri("https://example.org/a%20b")), "<https://example.org/a%20b>")]
    #[case(Node::from(term(SCHEMA, "Dataset")), "schema:Dataset")]
    fn objects_render_as_turtle_terms(#[case] object: Node, #[case] expected: &str) {
        let mut graph = Graph::default();
        graph.add(&iri("https://example.org/s"), &iri("https://example.org/p"), object);
        let text = render(&graph);
        assert!(
            text.contains(&format!("<https://example.org/p> {expected} .")),
            "unexpected rendering:\n{text}"
        );
        assert_eq!(parsed_triples(&text).len(), 1);
    }

    #[test]
    fn statements_group_by_subject_and_predicate() {
        let mut graph = Graph::default();
        let subject = iri("https://example.org/cube");
        let name = term(SCHEMA, "name");
        graph.add(&subject, &rdf_type(), term(CUBE, "Cube"));
        graph.add(&subject, &name, Node::lang("Regen", "de").expect("valid tag"));
        graph.add(&subject, &name, Node::lang("Rain", "en").expect("valid tag"));
        let text = render(&graph);
        assert_eq!(
            text,
            "@prefix schema: <http://schema.org/> .\n\
             @prefix cube: <https://cube.link/> .\n\
             \n\
             <https://example.org/cube>\n    \
             a cube:Cube ;\n    \
             schema:name \"Regen\"@de, \"Rain\"@en .\n\n"
        );
    }

    #[test]
    fn blank_nodes_and_collections_render_inline() {
        let mut graph = Graph::default();
        graph.add(
            &iri("https://example.org/shape"),
            &term(SH, "property"),
            Node::Blank(vec![
                (term(SH, "path"), Node::from(iri("https://example.org/year"))),
                (
                    term(SH, "in"),
                    Node::Collection(vec![Node::integer(2020), Node::integer(2021)]),
                ),
            ]),
        );
        let text = render(&graph);
        assert!(text.contains(
            "    sh:property [\n        sh:path <https://example.org/year> ;\n        sh:in ( 2020 2021 )\n    ] .\n"
        ));
        assert_eq!(graph.len(), 1 + 2 + 4);
        assert_eq!(parsed_triples(&text).len(), graph.len());
    }

    #[test]
    fn control_characters_and_unicode_survive_a_parse() {
        let mut graph = Graph::default();
        let subject = iri("https://example.org/station/Z%C3%BCrich");
        let label = "Zürich\tStadt \\ \"Nord\"\r\n";
        graph.add(&subject, &term(SCHEMA, "name"), Node::string(label));
        let triples = parsed_triples(&render(&graph));
        assert!(matches!(
            triples.first().map(|triple| &triple.object),
            Some(oxrdf::Term::Literal(literal)) if literal.value() == label
        ));
    }

    #[test]
    fn empty_graph_renders_nothing() {
        assert_eq!(render(&Graph::default()), "");
    }
}
