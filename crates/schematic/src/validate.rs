//! Notation-specific well-formedness rules.
//!
//! [`validate`] runs the fixed rule set of one notation over a node and edge
//! slice and returns every finding as data. It never fails and never
//! modifies its input; nodes and edges of other notations are ignored.
//!
//! Issues come back grouped by rule, in the order the rules are listed in
//! the rule modules, and in element order within a rule.
//!
//! # Example
//!
//! ```
//! use schematic::validate::validate;
//! use schematic_core::{Edge, EdgeKind, EventStage, Node, NodeKind, Notation, TaskKind};
//!
//! let nodes = [
//!     Node::new("start", NodeKind::event(EventStage::Start), "Start"),
//!     Node::new("work", NodeKind::Task(TaskKind::Task), "Work"),
//! ];
//! let edges = [Edge::new("f1", "start", "work", EdgeKind::SequenceFlow)];
//!
//! let result = validate(Notation::Process, &nodes, &edges);
//! assert!(!result.is_valid());
//! assert_eq!(result.errors().count(), 1);
//! ```

mod data_flow;
mod entity_relationship;
mod process;

use std::{collections::HashMap, fmt};

use log::{debug, info};
use serde::{Serialize, Serializer, ser::SerializeStruct};

use schematic_core::{Adjacency, Edge, Node, Notation, Severity};

/// What an [`Issue`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Edge,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Node => write!(f, "node"),
            ElementType::Edge => write!(f, "edge"),
        }
    }
}

/// A single rule finding.
///
/// Graph-level findings (a missing start event, say) carry no element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_type: Option<ElementType>,
}

impl Issue {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            element_id: None,
            element_type: None,
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub(crate) fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub(crate) fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub(crate) fn on_node(mut self, id: &str) -> Self {
        self.element_id = Some(id.to_string());
        self.element_type = Some(ElementType::Node);
        self
    }

    pub(crate) fn on_edge(mut self, id: &str) -> Self {
        self.element_id = Some(id.to_string());
        self.element_type = Some(ElementType::Edge);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Id of the node or edge the issue is about.
    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    pub fn element_type(&self) -> Option<ElementType> {
        self.element_type
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let (Some(kind), Some(id)) = (self.element_type, &self.element_id) {
            write!(f, " ({kind} `{id}`)")?;
        }
        Ok(())
    }
}

/// Everything one [`validate`] call found.
///
/// Serializes as `{ issues, errors, warnings, infos, isValid }`, the last
/// four being counts and the validity flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    issues: Vec<Issue>,
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 5)?;
        state.serialize_field("issues", &self.issues)?;
        state.serialize_field("errors", &self.errors().count())?;
        state.serialize_field("warnings", &self.warnings().count())?;
        state.serialize_field("infos", &self.infos().count())?;
        state.serialize_field("isValid", &self.is_valid())?;
        state.end()
    }
}

impl ValidationResult {
    /// All issues in report order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Info)
    }

    /// Returns `true` when no issue has error severity.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity == severity)
    }
}

/// Lookup tables shared by every rule of one run.
pub(crate) struct Context<'g> {
    nodes: &'g [Node],
    edges: &'g [Edge],
    by_id: HashMap<&'g str, &'g Node>,
    adjacency: Adjacency<'g>,
}

impl<'g> Context<'g> {
    fn new(nodes: &'g [Node], edges: &'g [Edge]) -> Self {
        // First node wins when ids repeat; the input is not assumed to be a
        // checked graph.
        let mut by_id = HashMap::with_capacity(nodes.len());
        for node in nodes {
            by_id.entry(node.id()).or_insert(node);
        }

        Self {
            nodes,
            edges,
            by_id,
            adjacency: Adjacency::new(edges),
        }
    }

    pub(crate) fn node(&self, id: &str) -> Option<&'g Node> {
        self.by_id.get(id).copied()
    }
}

/// Check `nodes` and `edges` against the rules of `notation`.
///
/// # Arguments
///
/// * `notation` - Selects the rule set.
/// * `nodes` - Nodes to check, in report order.
/// * `edges` - Edges to check, in report order. Endpoints that name no node
///   are tolerated.
pub fn validate(notation: Notation, nodes: &[Node], edges: &[Edge]) -> ValidationResult {
    info!(
        notation:% = notation,
        nodes = nodes.len(),
        edges = edges.len();
        "Validating"
    );

    let context = Context::new(nodes, edges);
    let mut issues = Vec::new();
    match notation {
        Notation::Process => process::check(&context, &mut issues),
        Notation::EntityRelationship => entity_relationship::check(&context, &mut issues),
        Notation::DataFlow => data_flow::check(&context, &mut issues),
    }

    let result = ValidationResult { issues };
    debug!(
        errors = result.errors().count(),
        warnings = result.warnings().count(),
        infos = result.infos().count();
        "Validation finished"
    );
    result
}
