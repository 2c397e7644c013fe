//! The supplier graph handle.
//!
//! [`SupplierGraph`] wraps an in-memory oxigraph [`Store`]. It is created by the
//! [`builder`] or loaded from Turtle by [`persist`], and only offers read
//! operations to the rest of the crate: there is no process-wide graph.

pub mod builder;
pub mod persist;

pub use builder::{BuildOptions, BuildStats, GraphBuilder};
pub use persist::{load_turtle, write_turtle};

use crate::error::{GraphLoadError, GraphWriteError, ReportError};
use crate::ontology::PREFIXES;
use crate::sparql::{ResultTable, execute_select};
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{GraphName, GraphNameRef, NamedNode, NamedNodeRef, Quad, Term};
use oxigraph::store::{StorageError, Store};

pub struct SupplierGraph {
    store: Store,
}

impl SupplierGraph {
    pub(crate) fn empty() -> Result<Self, StorageError> {
        Ok(Self {
            store: Store::new()?,
        })
    }

    /// Parse a Turtle document into a new graph.
    pub fn from_turtle(content: &str) -> Result<Self, GraphLoadError> {
        let graph = Self::empty()?;
        graph
            .store
            .load_from_reader(RdfFormat::Turtle, content.as_bytes())
            .map_err(|e| GraphLoadError::Parse(e.to_string()))?;
        Ok(graph)
    }

    pub(crate) fn insert(
        &self,
        subject: &NamedNode,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) -> Result<(), StorageError> {
        let quad = Quad::new(
            subject.clone(),
            predicate,
            object,
            GraphName::DefaultGraph,
        );
        self.store.insert(&quad)
    }

    /// Number of statements.
    pub fn len(&self) -> Result<usize, StorageError> {
        self.store.len()
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        self.store.is_empty()
    }

    pub fn contains(
        &self,
        subject: &NamedNode,
        predicate: NamedNodeRef<'_>,
        object: impl Into<Term>,
    ) -> Result<bool, StorageError> {
        let quad = Quad::new(
            subject.clone(),
            predicate,
            object,
            GraphName::DefaultGraph,
        );
        self.store.contains(&quad)
    }

    /// Objects of every `subject predicate ?o` statement.
    pub fn objects(
        &self,
        subject: &NamedNode,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Vec<Term>, StorageError> {
        self.store
            .quads_for_pattern(
                Some(subject.as_ref().into()),
                Some(predicate),
                None,
                Some(GraphNameRef::DefaultGraph),
            )
            .map(|quad| quad.map(|q| q.object))
            .collect()
    }

    /// Evaluate a read-only SELECT query.
    pub fn query(&self, name: &str, sparql: &str) -> Result<ResultTable, ReportError> {
        execute_select(&self.store, name, sparql)
    }

    /// Serialize the default graph as Turtle with the supplier prefixes bound.
    ///
    /// Statements are sorted so the same graph always yields the same text.
    pub fn to_turtle(&self) -> Result<String, GraphWriteError> {
        let mut quads = self.store.iter().collect::<Result<Vec<_>, _>>()?;
        quads.sort_by_cached_key(|quad| {
            (
                quad.subject.to_string(),
                quad.predicate.to_string(),
                quad.object.to_string(),
            )
        });

        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
        for (prefix, iri) in PREFIXES {
            serializer = serializer
                .with_prefix(*prefix, *iri)
                .map_err(|e| GraphWriteError::Serialize(e.to_string()))?;
        }

        let mut writer = serializer.for_writer(Vec::new());
        for quad in &quads {
            writer
                .serialize_quad(quad)
                .map_err(|e| GraphWriteError::Serialize(e.to_string()))?;
        }
        let bytes = writer
            .finish()
            .map_err(|e| GraphWriteError::Serialize(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| GraphWriteError::Serialize(e.to_string()))
    }
}

impl std::fmt::Debug for SupplierGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupplierGraph")
            .field("statements", &self.store.len().ok())
            .finish()
    }
}
