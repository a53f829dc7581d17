//! Subject-grouped statement store.

use std::collections::HashMap;

use oxrdf::NamedNode;

use crate::rdf::node::Node;

/// Statements grouped by subject in insertion order.
///
/// # Examples
/// ```
/// use rdfcube_core::rdf::{Graph, NamedNode, Node};
///
/// let subject = NamedNode::new("https://example.org/s")?;
/// let predicate = NamedNode::new("https://example.org/p")?;
/// let mut graph = Graph::default();
/// graph.add(&subject, &predicate, Node::integer(1));
/// graph.add(&subject, &predicate, Node::integer(2));
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.objects("https://example.org/s", "https://example.org/p").len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    subjects: Vec<SubjectStatements>,
    index: HashMap<String, usize>,
    triples: usize,
}

/// Every predicate/object pair stated about one subject.
#[derive(Debug, Clone)]
pub struct SubjectStatements {
    subject: NamedNode,
    predicates: Vec<(NamedNode, Vec<Node>)>,
}

impl SubjectStatements {
    /// Subject IRI.
    #[must_use]
    pub fn subject(&self) -> &NamedNode {
        &self.subject
    }

    /// Predicates in first-use order with their objects.
    #[must_use]
    pub fn predicates(&self) -> &[(NamedNode, Vec<Node>)] {
        &self.predicates
    }
}

impl Graph {
    /// Adds one statement. Blank node and collection objects add their nested
    /// triples to the count as well.
    pub fn add(&mut self, subject: &NamedNode, predicate: &NamedNode, object: impl Into<Node>) {
        let object = object.into();
        self.triples += 1 + object.nested_triples();
        let position = match self.index.get(subject.as_str()).copied() {
            Some(position) => position,
            None => {
                self.subjects.push(SubjectStatements {
                    subject: subject.clone(),
                    predicates: Vec::new(),
                });
                let position = self.subjects.len() - 1;
                self.index.insert(subject.as_str().to_owned(), position);
                position
            }
        };
        let Some(statements) = self.subjects.get_mut(position) else {
            return;
        };
        match statements
            .predicates
            .iter_mut()
            .find(|(candidate, _)| candidate == predicate)
        {
            Some((_, objects)) => objects.push(object),
            None => statements
                .predicates
                .push((predicate.clone(), vec![object])),
        }
    }

    /// Moves every statement of `other` into `self`, keeping `other`'s order.
    pub fn append(&mut self, other: Self) {
        for statements in other.subjects {
            for (predicate, objects) in statements.predicates {
                for object in objects {
                    self.add(&statements.subject, &predicate, object);
                }
            }
        }
    }

    /// Returns the total number of triples, nested ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples
    }

    /// Returns whether no statement was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples == 0
    }

    /// Iterates subjects in insertion order.
    pub fn subjects(&self) -> impl Iterator<Item = &SubjectStatements> {
        self.subjects.iter()
    }

    /// Returns the objects stated for `subject` and `predicate`.
    #[must_use]
    pub fn objects(&self, subject: &str, predicate: &str) -> &[Node] {
        self.index
            .get(subject)
            .and_then(|position| self.subjects.get(*position))
            .and_then(|statements| {
                statements
                    .predicates
                    .iter()
                    .find(|(candidate, _)| candidate.as_str() == predicate)
            })
            .map(|(_, objects)| objects.as_slice())
            .unwrap_or(&[])
    }

    /// Returns whether `subject` appears as a subject.
    #[must_use]
    pub fn contains_subject(&self, subject: &str) -> bool {
        self.index.contains_key(subject)
    }
}
