//! Process-notation rules.
//!
//! 1. Flow nodes exist but none is a start event (error).
//! 2. Flow nodes exist but none is an end event (error).
//! 3. A start event has incoming sequence flow (error).
//! 4. An end event has outgoing sequence flow (error).
//! 5. A flow node cannot be reached from any start event along control
//!    flow (warning). Skipped when there is no start event.
//! 6. A gateway lacks incoming or outgoing control flow (warning).
//! 7. A parallel gateway neither splits nor joins (warning).
//! 8. A node has more than one outgoing default flow (warning).
//! 9. A pool or lane lists a member that is not a node (warning).

use std::collections::{HashSet, VecDeque};

use schematic_core::{Edge, EdgeKind, EventStage, GatewayKind, Node, NodeKind};

use super::{Context, Issue};

pub(super) fn check(context: &Context<'_>, issues: &mut Vec<Issue>) {
    let flow_nodes: Vec<&Node> = context
        .nodes
        .iter()
        .filter(|node| node.kind().is_flow_node())
        .collect();
    let starts: Vec<&Node> = flow_nodes
        .iter()
        .copied()
        .filter(|node| node.kind().is_event_at(EventStage::Start))
        .collect();

    if !flow_nodes.is_empty() {
        if starts.is_empty() {
            issues.push(Issue::error("process has no start event"));
        }
        if !flow_nodes
            .iter()
            .any(|node| node.kind().is_event_at(EventStage::End))
        {
            issues.push(Issue::error("missing end event"));
        }
    }

    for start in &starts {
        if context
            .adjacency
            .incoming(start.id())
            .any(|edge| edge.kind().is_sequence_flow())
        {
            issues.push(
                Issue::error(format!(
                    "start event `{}` has incoming sequence flow",
                    start.id()
                ))
                .on_node(start.id()),
            );
        }
    }

    for node in &flow_nodes {
        if node.kind().is_event_at(EventStage::End)
            && context
                .adjacency
                .outgoing(node.id())
                .any(|edge| edge.kind().is_sequence_flow())
        {
            issues.push(
                Issue::error(format!(
                    "end event `{}` has outgoing sequence flow",
                    node.id()
                ))
                .on_node(node.id()),
            );
        }
    }

    if !starts.is_empty() {
        let reached = reachable(context, &starts);
        for node in &flow_nodes {
            if !node.kind().is_event_at(EventStage::Start) && !reached.contains(node.id()) {
                issues.push(
                    Issue::warning(format!(
                        "unreachable element `{}`: no control flow leads here from a start event",
                        node.id()
                    ))
                    .on_node(node.id()),
                );
            }
        }
    }

    for node in &flow_nodes {
        if !matches!(node.kind(), NodeKind::Gateway(_)) {
            continue;
        }
        let incoming = control_flows(context.adjacency.incoming(node.id()));
        let outgoing = control_flows(context.adjacency.outgoing(node.id()));
        let missing = match (incoming, outgoing) {
            (0, 0) => "incoming or outgoing",
            (0, _) => "incoming",
            (_, 0) => "outgoing",
            _ => continue,
        };
        issues.push(
            Issue::warning(format!("gateway `{}` has no {missing} flow", node.id()))
                .on_node(node.id()),
        );
    }

    for node in &flow_nodes {
        if node.kind() == &NodeKind::Gateway(GatewayKind::Parallel)
            && control_flows(context.adjacency.incoming(node.id())) == 1
            && control_flows(context.adjacency.outgoing(node.id())) == 1
        {
            issues.push(
                Issue::warning(format!(
                    "parallel gateway `{}` neither splits nor joins",
                    node.id()
                ))
                .on_node(node.id()),
            );
        }
    }

    for node in context.nodes {
        let defaults = context
            .adjacency
            .outgoing(node.id())
            .filter(|edge| edge.kind() == &EdgeKind::DefaultFlow)
            .count();
        if defaults > 1 {
            issues.push(
                Issue::warning(format!(
                    "`{}` has {defaults} default flows; at most one is taken",
                    node.id()
                ))
                .on_node(node.id()),
            );
        }
    }

    for node in context.nodes {
        let Some(members) = node.kind().members() else {
            continue;
        };
        for member in members {
            if context.node(member).is_none() {
                issues.push(
                    Issue::warning(format!(
                        "{} `{}` lists unknown member `{member}`",
                        node.kind().tag(),
                        node.id()
                    ))
                    .on_node(node.id()),
                );
            }
        }
    }
}

fn control_flows<'g>(edges: impl Iterator<Item = &'g Edge>) -> usize {
    edges.filter(|edge| edge.kind().is_control_flow()).count()
}

/// Ids reachable from `starts` along control flow, starts included.
fn reachable<'g>(context: &Context<'g>, starts: &[&'g Node]) -> HashSet<&'g str> {
    let mut seen: HashSet<&'g str> = starts.iter().map(|node| node.id()).collect();
    let mut queue: VecDeque<&'g str> = seen.iter().copied().collect();

    while let Some(id) = queue.pop_front() {
        for edge in context.adjacency.outgoing(id) {
            if edge.kind().is_control_flow() && seen.insert(edge.target()) {
                queue.push_back(edge.target());
            }
        }
    }
    seen
}
