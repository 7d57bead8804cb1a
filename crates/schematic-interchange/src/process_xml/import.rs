//! Process XML to graph.
//!
//! Import runs in two passes over the element tree. The first adds nodes
//! (pools, then each process's lanes and flow nodes); the second adds edges,
//! so a flow may reference a node declared after it.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use schematic_core::{Edge, EdgeKind, EventTrigger, Graph, Node, NodeKind, Position};

use crate::{
    Imported,
    error::{Diagnostic, DiagnosticCode, MalformedInputError},
    process_xml::{
        EVENT_DEFINITIONS, EVENT_ELEMENTS, GATEWAY_ELEMENTS, IGNORED_CHILDREN, TASK_ELEMENTS,
        tree::{self, Element},
    },
    span::Span,
};

/// Root-level definitions that flow elements may point at but the graph
/// does not keep.
const GLOBAL_DEFINITIONS: &[&str] = &[
    "message",
    "signal",
    "error",
    "escalation",
    "itemDefinition",
    "dataStore",
    "import",
    "documentation",
    "extensionElements",
];

pub(crate) fn import(text: &str) -> Result<Imported, MalformedInputError> {
    let root = match tree::parse(text)? {
        Some(root) if root.name == "definitions" => root,
        Some(root) => {
            return Err(no_process_body(
                root.span,
                format!("document root is `{}`, expected `definitions`", root.name),
            ));
        }
        None => {
            return Err(no_process_body(
                Span::at(0),
                "document has no root element".to_string(),
            ));
        }
    };

    let processes: Vec<&Element> = root.children_named("process").collect();
    if processes.is_empty() {
        return Err(no_process_body(
            root.span,
            "no process body: `definitions` holds no `process` element".to_string(),
        ));
    }
    let collaborations: Vec<&Element> = root.children_named("collaboration").collect();

    let mut importer = Importer::default();
    importer.read_positions(&root);

    let name = root
        .attribute("name")
        .or_else(|| processes.iter().find_map(|process| process.attribute("name")));
    importer.graph.set_name(name.map(str::to_string));

    for child in &root.children {
        let name = child.name.as_str();
        let known = matches!(name, "process" | "collaboration" | "BPMNDiagram")
            || GLOBAL_DEFINITIONS.contains(&name);
        if !known {
            importer.unsupported(child);
        }
    }

    let mut participants = Vec::new();
    for collaboration in &collaborations {
        participants.extend(importer.participants(collaboration));
    }

    let mut contents = HashMap::new();
    for process in &processes {
        let members = importer.process_nodes(process);
        if let Some(id) = process.attribute("id") {
            contents.entry(id).or_insert(members);
        }
    }
    importer.assign_pools(&participants, contents);

    for process in &processes {
        importer.process_edges(process);
    }
    for collaboration in &collaborations {
        importer.message_flows(collaboration);
    }

    let Importer {
        graph, warnings, ..
    } = importer;
    debug!(
        processes = processes.len(),
        pools = participants.len(),
        nodes = graph.nodes().len(),
        edges = graph.edges().len();
        "Imported process XML"
    );
    Ok(Imported::new(graph, warnings))
}

fn no_process_body(span: Span, message: String) -> MalformedInputError {
    Diagnostic::error(message)
        .with_code(DiagnosticCode::E002)
        .with_label(span, "expected `definitions` with at least one `process`")
        .into()
}

fn lookup<T: Copy>(table: &[(T, &str)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(_, tag)| *tag == name)
        .map(|(value, _)| *value)
}

/// Maps a process child to a node kind, or `None` if it is not a node.
fn node_kind(element: &Element) -> Option<NodeKind> {
    let name = element.name.as_str();
    if let Some(stage) = lookup(EVENT_ELEMENTS, name) {
        let trigger = element
            .children
            .iter()
            .find_map(|child| lookup(EVENT_DEFINITIONS, &child.name))
            .unwrap_or(EventTrigger::None);
        return Some(NodeKind::Event { stage, trigger });
    }
    if let Some(task) = lookup(TASK_ELEMENTS, name) {
        return Some(NodeKind::Task(task));
    }
    if let Some(gateway) = lookup(GATEWAY_ELEMENTS, name) {
        return Some(NodeKind::Gateway(gateway));
    }
    match name {
        "dataObjectReference" => Some(NodeKind::DataObject),
        "dataStoreReference" => Some(NodeKind::DataStoreReference),
        _ => None,
    }
}

fn coordinate(bounds: &Element, key: &str) -> Option<f64> {
    bounds
        .attribute(key)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// A collaboration participant waiting for its process.
struct Participant<'e> {
    pool: String,
    process: Option<&'e str>,
    span: Span,
}

/// Nodes contributed by one process.
#[derive(Default)]
struct ProcessMembers {
    lanes: Vec<String>,
    nodes: Vec<String>,
    laned: HashSet<String>,
}

#[derive(Default)]
struct Importer {
    graph: Graph,
    warnings: Vec<Diagnostic>,
    positions: HashMap<String, Position>,
    /// Every id claimed so far. Nodes and flows share one id space.
    ids: HashSet<String>,
    default_flows: HashSet<String>,
}

impl Importer {
    fn warn(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }

    fn unsupported(&mut self, element: &Element) {
        debug!(element = element.name.as_str(); "Skipping unsupported element");
        self.warn(
            Diagnostic::warning(format!("unsupported element `{}` skipped", element.name))
                .with_code(DiagnosticCode::W001)
                .with_label(element.span, "skipped with its content")
                .with_help("only flow nodes, data references, lanes, pools and flows are imported"),
        );
    }

    /// Collects shape positions from every diagram plane.
    fn read_positions(&mut self, root: &Element) {
        let shapes = root
            .children_named("BPMNDiagram")
            .flat_map(|diagram| diagram.children_named("BPMNPlane"))
            .flat_map(|plane| plane.children_named("BPMNShape"));

        for shape in shapes {
            let (Some(element), Some(bounds)) = (shape.attribute("bpmnElement"), shape.child("Bounds"))
            else {
                continue;
            };
            match (coordinate(bounds, "x"), coordinate(bounds, "y")) {
                (Some(x), Some(y)) => {
                    self.positions
                        .entry(element.to_string())
                        .or_insert(Position::new(x, y));
                }
                _ => self.warn(
                    Diagnostic::warning(format!(
                        "shape for `{element}` has unreadable bounds; position dropped"
                    ))
                    .with_code(DiagnosticCode::W004)
                    .with_label(bounds.span, "expected numeric `x` and `y`"),
                ),
            }
        }
    }

    /// Reads the element's id, skipping the element with a warning when the
    /// id is missing or already taken.
    fn claim_id(&mut self, element: &Element) -> Option<String> {
        let Some(id) = element.attribute("id").filter(|id| !id.is_empty()) else {
            self.warn(
                Diagnostic::warning(format!("`{}` without an `id` skipped", element.name))
                    .with_code(DiagnosticCode::W001)
                    .with_label(element.span, "no `id` attribute"),
            );
            return None;
        };
        if !self.ids.insert(id.to_string()) {
            self.warn(
                Diagnostic::warning(format!("duplicate id `{id}`; `{}` skipped", element.name))
                    .with_code(DiagnosticCode::W003)
                    .with_label(element.span, "id already used"),
            );
            return None;
        }
        Some(id.to_string())
    }

    fn add_node(&mut self, element: &Element, kind: NodeKind) -> Option<String> {
        let id = self.claim_id(element)?;
        let mut node = Node::new(
            id.as_str(),
            kind,
            element.attribute("name").unwrap_or_default(),
        );
        if let Some(position) = self.positions.get(&id) {
            node = node.with_position(*position);
        }

        match self.graph.add_node(node) {
            Ok(()) => {
                trace!(id = id.as_str(), element = element.name.as_str(); "Imported node");
                Some(id)
            }
            Err(err) => {
                self.warn(
                    Diagnostic::warning(format!("{err}; `{}` skipped", element.name))
                        .with_code(DiagnosticCode::W003)
                        .with_label(element.span, "skipped"),
                );
                None
            }
        }
    }

    fn participants<'e>(&mut self, collaboration: &'e Element) -> Vec<Participant<'e>> {
        let mut participants = Vec::new();
        for child in &collaboration.children {
            match child.name.as_str() {
                "participant" => {
                    let kind = NodeKind::Pool {
                        members: Vec::new(),
                    };
                    if let Some(pool) = self.add_node(child, kind) {
                        participants.push(Participant {
                            pool,
                            process: child.attribute("processRef"),
                            span: child.span,
                        });
                    }
                }
                "messageFlow" | "documentation" | "extensionElements" => {}
                _ => self.unsupported(child),
            }
        }
        participants
    }

    fn process_nodes(&mut self, process: &Element) -> ProcessMembers {
        let mut members = ProcessMembers::default();
        for lane_set in process.children_named("laneSet") {
            self.lane_set(lane_set, &mut members);
        }

        for child in &process.children {
            let name = child.name.as_str();
            if let Some(kind) = node_kind(child) {
                self.node_children(child);
                if let Some(id) = self.add_node(child, kind) {
                    if let Some(default) = child.attribute("default") {
                        self.default_flows.insert(default.to_string());
                    }
                    members.nodes.push(id);
                }
            } else if !matches!(name, "laneSet" | "sequenceFlow" | "association")
                && !IGNORED_CHILDREN.contains(&name)
            {
                self.unsupported(child);
            }
        }
        members
    }

    /// Warns about children of a flow node that are neither helpers nor
    /// handled by the importer. The node itself is kept.
    fn node_children(&mut self, element: &Element) {
        for child in &element.children {
            let name = child.name.as_str();
            let known = IGNORED_CHILDREN.contains(&name)
                || matches!(name, "dataInputAssociation" | "dataOutputAssociation")
                || lookup(EVENT_DEFINITIONS, name).is_some();
            if !known {
                self.unsupported(child);
            }
        }
    }

    fn lane_set(&mut self, lane_set: &Element, members: &mut ProcessMembers) {
        for lane in &lane_set.children {
            if lane.name != "lane" {
                if !IGNORED_CHILDREN.contains(&lane.name.as_str()) {
                    self.unsupported(lane);
                }
                continue;
            }

            for child in &lane.children {
                if child.name != "flowNodeRef" && !IGNORED_CHILDREN.contains(&child.name.as_str()) {
                    self.unsupported(child);
                }
            }
            let refs: Vec<String> = lane
                .children_named("flowNodeRef")
                .map(|node_ref| node_ref.text.clone())
                .filter(|node_ref| !node_ref.is_empty())
                .collect();
            members.laned.extend(refs.iter().cloned());

            if let Some(id) = self.add_node(lane, NodeKind::Lane { members: refs }) {
                members.lanes.push(id);
            }
        }
    }

    /// Gives each pool the lanes and lane-less nodes of its process.
    fn assign_pools(
        &mut self,
        participants: &[Participant<'_>],
        mut contents: HashMap<&str, ProcessMembers>,
    ) {
        let mut claimed = HashSet::new();
        for participant in participants {
            let Some(process) = participant.process else {
                continue;
            };
            let Some(members) = contents.remove(process) else {
                let message = if claimed.contains(process) {
                    format!(
                        "pool `{}` shares process `{process}` with another pool; left empty",
                        participant.pool
                    )
                } else {
                    format!(
                        "pool `{}` references unknown process `{process}`; left empty",
                        participant.pool
                    )
                };
                self.warn(
                    Diagnostic::warning(message)
                        .with_code(DiagnosticCode::W005)
                        .with_label(participant.span, "participant declared here"),
                );
                continue;
            };
            claimed.insert(process);

            let ProcessMembers {
                lanes,
                nodes,
                laned,
            } = members;
            let mut owned = lanes;
            owned.extend(nodes.into_iter().filter(|id| !laned.contains(id)));

            if let Some(node) = self.graph.node_mut(&participant.pool) {
                if let NodeKind::Pool { members } = node.kind_mut() {
                    *members = owned;
                }
            }
        }
    }

    fn process_edges(&mut self, process: &Element) {
        for child in &process.children {
            match child.name.as_str() {
                "sequenceFlow" => self.sequence_flow(child),
                "association" => self.association(child),
                _ => {
                    if node_kind(child).is_some() {
                        if let Some(owner) = child.attribute("id") {
                            if self.graph.contains_node(owner) {
                                self.data_associations(owner, child);
                            }
                        }
                    }
                }
            }
        }
    }

    fn message_flows(&mut self, collaboration: &Element) {
        for flow in collaboration.children_named("messageFlow") {
            let Some(id) = self.claim_id(flow) else {
                continue;
            };
            self.connect(
                flow,
                id,
                flow.attribute("sourceRef"),
                flow.attribute("targetRef"),
                EdgeKind::MessageFlow,
            );
        }
    }

    fn sequence_flow(&mut self, element: &Element) {
        let Some(id) = self.claim_id(element) else {
            return;
        };
        let condition = element
            .child("conditionExpression")
            .map(|expression| expression.text.trim())
            .filter(|expression| !expression.is_empty());

        let kind = if self.default_flows.contains(&id) {
            EdgeKind::DefaultFlow
        } else if let Some(condition) = condition {
            EdgeKind::ConditionalFlow {
                condition: condition.to_string(),
            }
        } else {
            EdgeKind::SequenceFlow
        };
        self.connect(
            element,
            id,
            element.attribute("sourceRef"),
            element.attribute("targetRef"),
            kind,
        );
    }

    fn association(&mut self, element: &Element) {
        let Some(id) = self.claim_id(element) else {
            return;
        };
        let source = element.attribute("sourceRef");
        let from_compensation = source
            .and_then(|source| self.graph.node(source))
            .is_some_and(|node| {
                matches!(
                    node.kind(),
                    NodeKind::Event {
                        trigger: EventTrigger::Compensation,
                        ..
                    }
                )
            });

        let kind = if from_compensation && element.attribute("associationDirection") == Some("One")
        {
            EdgeKind::CompensationFlow
        } else {
            EdgeKind::Association
        };
        self.connect(element, id, source, element.attribute("targetRef"), kind);
    }

    /// Data associations nested in the flow node `owner`.
    fn data_associations(&mut self, owner: &str, element: &Element) {
        for (index, child) in element.children.iter().enumerate() {
            let (source, target) = match child.name.as_str() {
                "dataInputAssociation" => (
                    child.child("sourceRef").map(|node_ref| node_ref.text.as_str()),
                    Some(owner),
                ),
                "dataOutputAssociation" => (
                    Some(owner),
                    child.child("targetRef").map(|node_ref| node_ref.text.as_str()),
                ),
                _ => continue,
            };

            let id = if child.attribute("id").is_some() {
                self.claim_id(child)
            } else {
                let generated = format!("{owner}_{}_{index}", child.name);
                self.ids.insert(generated.clone()).then_some(generated)
            };
            if let Some(id) = id {
                self.connect(child, id, source, target, EdgeKind::DataAssociation);
            }
        }
    }

    fn connect(
        &mut self,
        element: &Element,
        id: String,
        source: Option<&str>,
        target: Option<&str>,
        kind: EdgeKind,
    ) {
        let missing = [("source", source), ("target", target)]
            .into_iter()
            .find(|(_, node)| !node.is_some_and(|node| self.graph.contains_node(node)));
        if let Some((end, node)) = missing {
            let message = match node {
                Some(node) => {
                    format!("`{}` `{id}` references unknown {end} `{node}`; skipped", element.name)
                }
                None => format!("`{}` `{id}` has no {end}; skipped", element.name),
            };
            self.warn(
                Diagnostic::warning(message)
                    .with_code(DiagnosticCode::W002)
                    .with_label(element.span, "skipped"),
            );
            return;
        }
        let (Some(source), Some(target)) = (source, target) else {
            return;
        };

        let mut edge = Edge::new(id, source, target, kind);
        if let Some(name) = element.attribute("name").filter(|name| !name.is_empty()) {
            edge = edge.with_label(name);
        }
        if let Err(err) = self.graph.add_edge(edge) {
            self.warn(
                Diagnostic::warning(format!("{err}; `{}` skipped", element.name))
                    .with_code(DiagnosticCode::W003)
                    .with_label(element.span, "skipped"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use schematic_core::{EventStage, GatewayKind, TaskKind};

    use super::*;

    fn definitions(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
    xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
    xmlns:dc="http://www.omg.org/spec/DD/20100524/DC" id="Definitions_1">
{body}
</bpmn:definitions>"#
        )
    }

    fn codes(imported: &Imported) -> Vec<DiagnosticCode> {
        imported
            .warnings
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_import_simple_process() {
        let xml = definitions(
            r#"  <bpmn:process id="Process_1" name="Order handling">
    <bpmn:startEvent id="start" name="Order received">
      <bpmn:outgoing>f1</bpmn:outgoing>
    </bpmn:startEvent>
    <bpmn:exclusiveGateway id="gw" name="In stock?" default="f3"/>
    <bpmn:userTask id="ship" name="Ship"/>
    <bpmn:task id="order" name="Reorder"/>
    <bpmn:endEvent id="end"><bpmn:terminateEventDefinition/></bpmn:endEvent>
    <bpmn:sequenceFlow id="f1" sourceRef="start" targetRef="gw"/>
    <bpmn:sequenceFlow id="f2" name="yes" sourceRef="gw" targetRef="ship">
      <bpmn:conditionExpression>stock &gt; 0</bpmn:conditionExpression>
    </bpmn:sequenceFlow>
    <bpmn:sequenceFlow id="f3" sourceRef="gw" targetRef="order"/>
    <bpmn:sequenceFlow id="f4" sourceRef="ship" targetRef="end"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="d">
    <bpmndi:BPMNPlane id="p" bpmnElement="Process_1">
      <bpmndi:BPMNShape id="start_di" bpmnElement="start">
        <dc:Bounds x="10.5" y="20" width="40" height="40"/>
      </bpmndi:BPMNShape>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>"#,
        );

        let imported = import(&xml).unwrap();
        assert!(imported.warnings.is_empty(), "{:?}", imported.warnings);
        let graph = &imported.graph;
        assert_eq!(graph.name(), Some("Order handling"));

        let ids: Vec<_> = graph.nodes().iter().map(Node::id).collect();
        assert_eq!(ids, ["start", "gw", "ship", "order", "end"]);
        assert_eq!(
            graph.node("gw").unwrap().kind(),
            &NodeKind::Gateway(GatewayKind::Exclusive)
        );
        assert_eq!(
            graph.node("ship").unwrap().kind(),
            &NodeKind::Task(TaskKind::User)
        );
        assert_eq!(
            graph.node("end").unwrap().kind(),
            &NodeKind::Event {
                stage: EventStage::End,
                trigger: EventTrigger::Terminate
            }
        );
        assert_eq!(graph.node("end").unwrap().label(), "");

        let start = graph.node("start").unwrap().position().unwrap();
        assert_approx_eq!(f64, start.x, 10.5);
        assert_approx_eq!(f64, start.y, 20.0);
        assert!(graph.node("ship").unwrap().position().is_none());

        let f2 = graph.edge("f2").unwrap();
        assert_eq!(
            f2.kind(),
            &EdgeKind::ConditionalFlow {
                condition: "stock > 0".to_string()
            }
        );
        assert_eq!(f2.label(), Some("yes"));
        assert_eq!(graph.edge("f3").unwrap().kind(), &EdgeKind::DefaultFlow);
        assert_eq!(graph.edge("f4").unwrap().kind(), &EdgeKind::SequenceFlow);
    }

    #[test]
    fn test_import_skips_unknown_element_with_warning() {
        let xml = definitions(
            r#"  <bpmn:process id="P">
    <bpmn:task id="t" name="Do it"/>
    <bpmn:customThing id="c"><bpmn:task id="hidden"/></bpmn:customThing>
  </bpmn:process>"#,
        );

        let imported = import(&xml).unwrap();
        assert_eq!(imported.graph.nodes().len(), 1);
        assert_eq!(imported.warnings.len(), 1);
        let warning = &imported.warnings[0];
        assert_eq!(warning.code(), Some(DiagnosticCode::W001));
        assert!(warning.message().contains("customThing"));
        assert!(!imported.graph.contains_node("hidden"));
    }

    #[test]
    fn test_import_requires_process_body() {
        let err = import(&definitions("")).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(DiagnosticCode::E002));
        assert!(err.message().contains("no process body"));

        let err = import("<model><process id=\"p\"/></model>").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(DiagnosticCode::E002));

        let err = import("").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(DiagnosticCode::E002));
    }

    #[test]
    fn test_import_malformed_xml() {
        let err = import("<definitions><process id=\"p\"></definitions>").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(DiagnosticCode::E001));
        assert!(err.offset().is_some());
    }

    #[test]
    fn test_import_pools_lanes_and_message_flows() {
        let xml = definitions(
            r#"  <bpmn:collaboration id="Collaboration_1">
    <bpmn:participant id="customer" name="Customer" processRef="P_customer"/>
    <bpmn:participant id="shop" name="Shop" processRef="P_shop"/>
    <bpmn:messageFlow id="m1" name="order" sourceRef="send" targetRef="receive"/>
  </bpmn:collaboration>
  <bpmn:process id="P_customer">
    <bpmn:sendTask id="send" name="Send order"/>
  </bpmn:process>
  <bpmn:process id="P_shop">
    <bpmn:laneSet id="ls">
      <bpmn:lane id="sales" name="Sales">
        <bpmn:flowNodeRef>receive</bpmn:flowNodeRef>
      </bpmn:lane>
    </bpmn:laneSet>
    <bpmn:receiveTask id="receive" name="Receive order"/>
    <bpmn:dataStoreReference id="db" name="Orders"/>
  </bpmn:process>"#,
        );

        let imported = import(&xml).unwrap();
        assert!(imported.warnings.is_empty(), "{:?}", imported.warnings);
        let graph = &imported.graph;

        let ids: Vec<_> = graph.nodes().iter().map(Node::id).collect();
        assert_eq!(ids, ["customer", "shop", "send", "sales", "receive", "db"]);

        assert_eq!(
            graph.node("customer").unwrap().kind().members(),
            Some(&["send".to_string()][..])
        );
        assert_eq!(
            graph.node("shop").unwrap().kind().members(),
            Some(&["sales".to_string(), "db".to_string()][..])
        );
        assert_eq!(
            graph.node("sales").unwrap().kind().members(),
            Some(&["receive".to_string()][..])
        );

        let message = graph.edge("m1").unwrap();
        assert_eq!(message.kind(), &EdgeKind::MessageFlow);
        assert_eq!(message.label(), Some("order"));
    }

    #[test]
    fn test_import_data_associations() {
        let xml = definitions(
            r#"  <bpmn:process id="P">
    <bpmn:dataObjectReference id="invoice" name="Invoice"/>
    <bpmn:task id="check" name="Check">
      <bpmn:dataInputAssociation id="in1">
        <bpmn:sourceRef>invoice</bpmn:sourceRef>
        <bpmn:targetRef>property_1</bpmn:targetRef>
      </bpmn:dataInputAssociation>
      <bpmn:dataOutputAssociation>
        <bpmn:targetRef>archive</bpmn:targetRef>
      </bpmn:dataOutputAssociation>
    </bpmn:task>
    <bpmn:dataStoreReference id="archive"/>
  </bpmn:process>"#,
        );

        let imported = import(&xml).unwrap();
        assert!(imported.warnings.is_empty(), "{:?}", imported.warnings);
        let edges: Vec<_> = imported
            .graph
            .edges()
            .iter()
            .map(|edge| (edge.id(), edge.source(), edge.target(), edge.kind().clone()))
            .collect();
        assert_eq!(
            edges,
            [
                ("in1", "invoice", "check", EdgeKind::DataAssociation),
                (
                    "check_dataOutputAssociation_1",
                    "check",
                    "archive",
                    EdgeKind::DataAssociation
                ),
            ]
        );
    }

    #[test]
    fn test_import_compensation_association() {
        let xml = definitions(
            r#"  <bpmn:process id="P">
    <bpmn:intermediateCatchEvent id="comp"><bpmn:compensateEventDefinition/></bpmn:intermediateCatchEvent>
    <bpmn:task id="undo"/>
    <bpmn:task id="note"/>
    <bpmn:association id="a1" associationDirection="One" sourceRef="comp" targetRef="undo"/>
    <bpmn:association id="a2" associationDirection="One" sourceRef="note" targetRef="undo"/>
  </bpmn:process>"#,
        );

        let graph = import(&xml).unwrap().graph;
        assert_eq!(graph.edge("a1").unwrap().kind(), &EdgeKind::CompensationFlow);
        assert_eq!(graph.edge("a2").unwrap().kind(), &EdgeKind::Association);
    }

    #[test]
    fn test_import_skips_bad_references() {
        let xml = definitions(
            r#"  <bpmn:process id="P">
    <bpmn:task id="a"/>
    <bpmn:task id="a"/>
    <bpmn:task name="anonymous"/>
    <bpmn:sequenceFlow id="f1" sourceRef="a" targetRef="ghost"/>
    <bpmn:sequenceFlow id="f2" sourceRef="a"/>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="d">
    <bpmndi:BPMNPlane id="p">
      <bpmndi:BPMNShape id="a_di" bpmnElement="a"><dc:Bounds x="left" y="1"/></bpmndi:BPMNShape>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>"#,
        );

        let imported = import(&xml).unwrap();
        assert_eq!(imported.graph.nodes().len(), 1);
        assert!(imported.graph.edges().is_empty());
        assert_eq!(
            codes(&imported),
            [
                DiagnosticCode::W004,
                DiagnosticCode::W003,
                DiagnosticCode::W001,
                DiagnosticCode::W002,
                DiagnosticCode::W002,
            ]
        );
        assert!(imported.warnings[3].message().contains("unknown target `ghost`"));
        assert!(imported.warnings[4].message().contains("has no target"));
    }

    #[test]
    fn test_import_pool_with_unknown_process() {
        let xml = definitions(
            r#"  <bpmn:collaboration id="c">
    <bpmn:participant id="pool" processRef="missing"/>
    <bpmn:participant id="external" name="Bank"/>
  </bpmn:collaboration>
  <bpmn:process id="P"/>"#,
        );

        let imported = import(&xml).unwrap();
        assert_eq!(codes(&imported), [DiagnosticCode::W005]);
        assert_eq!(
            imported.graph.node("external").unwrap().kind().members(),
            Some(&[][..])
        );
    }

    #[test]
    fn test_graph_name_prefers_definitions() {
        let xml = r#"<definitions name="Top"><process id="P" name="Inner"/></definitions>"#;
        assert_eq!(import(xml).unwrap().graph.name(), Some("Top"));

        let xml = r#"<definitions><process id="P"/></definitions>"#;
        assert_eq!(import(xml).unwrap().graph.name(), None);
    }
}
