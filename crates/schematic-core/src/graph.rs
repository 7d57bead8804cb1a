//! The canonical diagram graph.
//!
//! A [`Graph`] is an ordered collection of [`Node`]s and [`Edge`]s. Order is
//! significant: exporters walk nodes and edges in insertion order, which keeps
//! their output stable. The mutating helpers enforce the graph invariants:
//!
//! - node ids are unique,
//! - edge ids are unique,
//! - every edge endpoint names a node of the same graph.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;

use crate::{
    attribute::{Attribute, AttributeList},
    error::GraphError,
    geometry::Position,
    kind::{EdgeKind, NodeKind},
    notation::Notation,
};

/// Unrecognized fields carried through an import/export cycle verbatim.
pub type Extensions = IndexMap<String, serde_json::Value>;

/// A diagram node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    kind: NodeKind,
    label: String,
    position: Option<Position>,
    extensions: Extensions,
}

impl Node {
    /// Creates a node without position or extensions.
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            position: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Shorthand for `self.kind().notation()`.
    pub fn notation(&self) -> Notation {
        self.kind.notation()
    }
}

/// A directed diagram edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: String,
    source: String,
    target: String,
    kind: EdgeKind,
    label: Option<String>,
    extensions: Extensions,
}

impl Edge {
    /// Creates an unlabeled edge.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            label: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Returns `true` if this edge starts and ends at the same node.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// An ordered diagram graph.
///
/// # Example
///
/// ```
/// # use schematic_core::{Edge, EdgeKind, EventStage, Graph, Node, NodeKind, TaskKind};
/// let mut graph = Graph::new();
/// graph.add_node(Node::new("start", NodeKind::event(EventStage::Start), "Start")).unwrap();
/// graph.add_node(Node::new("review", NodeKind::Task(TaskKind::User), "Review")).unwrap();
/// graph.add_edge(Edge::new("f1", "start", "review", EdgeKind::SequenceFlow)).unwrap();
///
/// assert!(graph.add_edge(Edge::new("f2", "start", "ghost", EdgeKind::SequenceFlow)).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    name: Option<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    extensions: Extensions,
    node_index: HashMap<String, usize>,
    edge_ids: HashSet<String>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_ids.contains(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = *self.node_index.get(id)?;
        self.nodes.get_mut(index)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Appends a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if a node with the same id exists.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Appends an edge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateEdge`] if the id is taken, or
    /// [`GraphError::UnknownEndpoint`] if either endpoint is not a node of
    /// this graph.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edge_ids.contains(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::UnknownEndpoint {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        self.edge_ids.insert(edge.id.clone());
        self.edges.push(edge);
        Ok(())
    }

    /// Entity nodes in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Entity { .. }))
    }

    /// Attributes of the entity `id`, in declared order.
    pub fn entity_attributes(&self, id: &str) -> Option<&AttributeList> {
        self.node(id).and_then(|node| node.kind.attributes())
    }

    /// Renames an attribute of an entity and rewrites every foreign key in
    /// the graph that referenced it.
    ///
    /// # Errors
    ///
    /// Returns an error if `entity_id` is not an entity, has no attribute
    /// `old`, or already has an attribute `new`.
    pub fn rename_attribute(
        &mut self,
        entity_id: &str,
        old: &str,
        new: &str,
    ) -> Result<(), GraphError> {
        let node = self
            .node_mut(entity_id)
            .ok_or_else(|| GraphError::NotAnEntity(entity_id.to_string()))?;
        let attributes = node
            .kind
            .attributes_mut()
            .ok_or_else(|| GraphError::NotAnEntity(entity_id.to_string()))?;

        if old != new && attributes.contains(new) {
            return Err(GraphError::DuplicateAttribute {
                entity: entity_id.to_string(),
                attribute: new.to_string(),
            });
        }
        let attribute = attributes
            .get_mut(old)
            .ok_or_else(|| GraphError::UnknownAttribute {
                entity: entity_id.to_string(),
                attribute: old.to_string(),
            })?;
        attribute.set_name(new);

        let mut rewritten = 0usize;
        for node in &mut self.nodes {
            let Some(attributes) = node.kind.attributes_mut() else {
                continue;
            };
            for foreign_key in attributes.iter_mut().filter_map(Attribute::foreign_key_mut) {
                if foreign_key.entity_id() == entity_id && foreign_key.attribute_name() == old {
                    foreign_key.set_attribute_name(new);
                    rewritten += 1;
                }
            }
        }
        debug!(
            entity = entity_id,
            old = old,
            new = new,
            rewritten = rewritten;
            "Renamed attribute"
        );

        Ok(())
    }

    /// The notation most nodes belong to.
    ///
    /// Ties resolve as process, then entity-relationship, then data-flow.
    /// An empty graph has no notation.
    pub fn notation_guess(&self) -> Option<Notation> {
        let mut counts = [0usize; 3];
        for node in &self.nodes {
            let slot = match node.notation() {
                Notation::Process => 0,
                Notation::EntityRelationship => 1,
                Notation::DataFlow => 2,
            };
            counts[slot] += 1;
        }

        let notations = [
            Notation::Process,
            Notation::EntityRelationship,
            Notation::DataFlow,
        ];
        let mut best: Option<(usize, Notation)> = None;
        for (count, notation) in counts.into_iter().zip(notations) {
            if count > 0 && best.is_none_or(|(top, _)| count > top) {
                best = Some((count, notation));
            }
        }
        best.map(|(_, notation)| notation)
    }
}
