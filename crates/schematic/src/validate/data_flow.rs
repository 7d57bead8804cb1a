//! Data-flow rules.
//!
//! 1. A data flow connects two external entities (error).
//! 2. A process has no incoming, or no outgoing, data flow (warning each).
//! 3. A data flow connects two data stores directly (warning).
//! 4. A data flow has no label (warning).
//! 5. A data store or external entity has no data flow at all (warning).
//! 6. A connected data store exchanges no data flow with any process
//!    (warning).

use schematic_core::{Edge, EdgeKind, Node, NodeKind};

use super::{Context, Issue};

fn is_data_flow(edge: &Edge) -> bool {
    edge.kind() == &EdgeKind::DataFlow
}

pub(super) fn check(context: &Context<'_>, issues: &mut Vec<Issue>) {
    let flows: Vec<&Edge> = context.edges.iter().filter(|edge| is_data_flow(edge)).collect();
    let endpoint_kinds = |edge: &Edge| {
        (
            context.node(edge.source()).map(Node::kind),
            context.node(edge.target()).map(Node::kind),
        )
    };

    for &edge in &flows {
        if let (Some(NodeKind::ExternalEntity), Some(NodeKind::ExternalEntity)) =
            endpoint_kinds(edge)
        {
            issues.push(
                Issue::error(format!(
                    "data flow `{}` connects two external entities; data must pass through a process",
                    edge.id()
                ))
                .on_edge(edge.id()),
            );
        }
    }

    for node in context.nodes {
        if node.kind() != &NodeKind::Process {
            continue;
        }
        if !context.adjacency.incoming(node.id()).any(is_data_flow) {
            issues.push(
                Issue::warning(format!("process `{}` has no incoming data flow", node.id()))
                    .on_node(node.id()),
            );
        }
        if !context.adjacency.outgoing(node.id()).any(is_data_flow) {
            issues.push(
                Issue::warning(format!("process `{}` has no outgoing data flow", node.id()))
                    .on_node(node.id()),
            );
        }
    }

    for &edge in &flows {
        if let (Some(NodeKind::DataStore), Some(NodeKind::DataStore)) = endpoint_kinds(edge) {
            issues.push(
                Issue::warning(format!(
                    "data flow `{}` connects two data stores directly",
                    edge.id()
                ))
                .on_edge(edge.id()),
            );
        }
    }

    for &edge in &flows {
        if edge.label().is_none_or(|label| label.trim().is_empty()) {
            issues.push(
                Issue::warning(format!("data flow `{}` has no label", edge.id()))
                    .on_edge(edge.id()),
            );
        }
    }

    for node in context.nodes {
        if !matches!(node.kind(), NodeKind::DataStore | NodeKind::ExternalEntity) {
            continue;
        }
        if !context.adjacency.incident(node.id()).any(is_data_flow) {
            issues.push(
                Issue::warning(format!(
                    "isolated element `{}`: no data flows in or out",
                    node.id()
                ))
                .on_node(node.id()),
            );
        }
    }

    for node in context.nodes {
        if node.kind() != &NodeKind::DataStore {
            continue;
        }
        let mut connected = context
            .adjacency
            .incident(node.id())
            .filter(|edge| is_data_flow(edge))
            .peekable();
        if connected.peek().is_none() {
            continue;
        }
        let touches_process = connected.any(|edge| {
            let other = if edge.source() == node.id() {
                edge.target()
            } else {
                edge.source()
            };
            context
                .node(other)
                .is_some_and(|other| other.kind() == &NodeKind::Process)
        });
        if !touches_process {
            issues.push(
                Issue::warning(format!(
                    "data store `{}` is not read or written by any process",
                    node.id()
                ))
                .on_node(node.id()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use schematic_core::Notation;

    use crate::validate::{ElementType, ValidationResult, validate};

    use super::*;

    fn node(id: &str, kind: NodeKind) -> Node {
        Node::new(id, kind, id)
    }

    fn flow(id: &str, source: &str, target: &str) -> Edge {
        Edge::new(id, source, target, EdgeKind::DataFlow).with_label(id)
    }

    fn check(nodes: &[Node], edges: &[Edge]) -> ValidationResult {
        validate(Notation::DataFlow, nodes, edges)
    }

    fn warnings(result: &ValidationResult) -> Vec<&str> {
        result.warnings().map(|issue| issue.message()).collect()
    }

    #[test]
    fn test_well_formed_diagram() {
        let nodes = [
            node("customer", NodeKind::ExternalEntity),
            node("orders", NodeKind::Process),
            node("db", NodeKind::DataStore),
        ];
        let edges = [
            flow("order", "customer", "orders"),
            flow("save", "orders", "db"),
            flow("receipt", "orders", "customer"),
        ];
        assert!(check(&nodes, &edges).is_empty());
    }

    #[test]
    fn test_external_to_external_is_one_error() {
        let nodes = [
            node("a", NodeKind::ExternalEntity),
            node("b", NodeKind::ExternalEntity),
        ];
        let edges = [flow("gossip", "a", "b")];
        let result = check(&nodes, &edges);

        let errors: Vec<_> = result.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].element_id(), Some("gossip"));
        assert_eq!(errors[0].element_type(), Some(ElementType::Edge));
        assert!(result.warnings().next().is_none());
    }

    #[test]
    fn test_process_needs_input_and_output() {
        let nodes = [
            node("sink", NodeKind::Process),
            node("idle", NodeKind::Process),
            node("user", NodeKind::ExternalEntity),
        ];
        let edges = [flow("in", "user", "sink")];
        let result = check(&nodes, &edges);

        assert_eq!(
            warnings(&result),
            [
                "process `sink` has no outgoing data flow",
                "process `idle` has no incoming data flow",
                "process `idle` has no outgoing data flow",
            ]
        );
    }

    #[test]
    fn test_store_to_store_and_unlabelled_flow() {
        let nodes = [
            node("a", NodeKind::DataStore),
            node("b", NodeKind::DataStore),
        ];
        let edges = [Edge::new("copy", "a", "b", EdgeKind::DataFlow)];
        let result = check(&nodes, &edges);

        assert_eq!(
            warnings(&result),
            [
                "data flow `copy` connects two data stores directly",
                "data flow `copy` has no label",
                "data store `a` is not read or written by any process",
                "data store `b` is not read or written by any process",
            ]
        );
    }

    #[test]
    fn test_isolated_elements() {
        let nodes = [
            node("archive", NodeKind::DataStore),
            node("auditor", NodeKind::ExternalEntity),
        ];
        let result = check(&nodes, &[]);

        assert_eq!(
            warnings(&result),
            [
                "isolated element `archive`: no data flows in or out",
                "isolated element `auditor`: no data flows in or out",
            ]
        );
        assert!(result.is_valid());
    }
}
