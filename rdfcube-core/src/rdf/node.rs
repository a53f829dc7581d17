//! RDF terms as they appear in object position.

use oxrdf::{LanguageTagParseError, Literal, NamedNode};

/// An object in a statement.
///
/// IRIs and literals are `oxrdf` terms, so they are valid by construction.
/// Blank nodes and collections are kept nested so the Turtle writer can
/// render them inline as `[ ... ]` and `( ... )`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Named resource.
    Iri(NamedNode),
    /// Literal value.
    Literal(Literal),
    /// Anonymous resource described by its predicate/object pairs.
    Blank(Vec<(NamedNode, Node)>),
    /// RDF list.
    Collection(Vec<Node>),
}

impl Node {
    /// Literal with an explicit datatype IRI.
    #[must_use]
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<NamedNode>) -> Self {
        Self::Literal(Literal::new_typed_literal(lexical, datatype))
    }

    /// Plain `xsd:string` literal.
    #[must_use]
    pub fn string(lexical: impl Into<String>) -> Self {
        Self::Literal(Literal::new_simple_literal(lexical))
    }

    /// Language-tagged string. The tag is normalised to lower case.
    ///
    /// # Errors
    /// Returns [`LanguageTagParseError`] when `language` is not a BCP 47 tag.
    pub fn lang(
        lexical: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, LanguageTagParseError> {
        Literal::new_language_tagged_literal(lexical, language).map(Self::Literal)
    }

    /// `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::Literal(Literal::from(value))
    }

    /// `xsd:boolean` literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Literal(Literal::from(value))
    }

    /// Number of triples this object contributes beyond its own statement.
    #[must_use]
    pub fn nested_triples(&self) -> usize {
        match self {
            Self::Iri(_) | Self::Literal(_) => 0,
            Self::Blank(properties) => properties
                .iter()
                .map(|(_, object)| 1 + object.nested_triples())
                .sum(),
            // rdf:first and rdf:rest per item
            Self::Collection(items) => items.iter().map(|item| 2 + item.nested_triples()).sum(),
        }
    }
}

impl From<NamedNode> for Node {
    fn from(iri: NamedNode) -> Self {
        Self::Iri(iri)
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}
