//! Schematic Core Types and Definitions
//!
//! This crate provides the canonical in-memory model shared by every
//! Schematic importer, exporter and the validator. It includes:
//!
//! - **Graph**: The ordered node/edge container ([`graph::Graph`])
//! - **Kinds**: Closed node and edge kind unions per notation ([`kind`] module)
//! - **Attributes**: Entity attribute bags with key invariants ([`attribute`] module)
//! - **Adjacency**: One-pass incoming/outgoing edge index ([`adjacency::Adjacency`])
//! - **Geometry**: Canvas positions ([`geometry::Position`])
//! - **Notation** and **Severity** vocabulary shared across crates

#[macro_use]
mod keyword;

pub mod adjacency;
pub mod attribute;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod kind;
pub mod notation;
pub mod severity;

pub use adjacency::Adjacency;
pub use attribute::{Attribute, AttributeList, ForeignKey};
pub use error::{GraphError, UnknownKeywordError};
pub use geometry::Position;
pub use graph::{Edge, Extensions, Graph, Node};
pub use kind::{
    Cardinality, EdgeKind, EventStage, EventTrigger, GatewayKind, NodeKind, Relationship,
    RelationshipEnd, RelationshipKind, TaskKind,
};
pub use notation::Notation;
pub use severity::Severity;
