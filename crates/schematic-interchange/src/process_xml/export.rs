//! Graph to process XML.
//!
//! Every pool gets its own process holding its lanes and the nodes assigned
//! to it directly or through a lane. Everything else goes into a default
//! process. Nodes and flows are written in graph order, so exporting the
//! same graph twice yields the same document.

use std::collections::HashMap;

use log::debug;

use schematic_core::{
    Edge, EdgeKind, EventTrigger, Graph, Node, NodeKind, Notation, Position, geometry::round_to,
};

use crate::{
    error::ExportError,
    process_xml::{
        EVENT_DEFINITIONS, EVENT_ELEMENTS, FORMAT, GATEWAY_ELEMENTS, TASK_ELEMENTS, shape_size,
        tree::{self, Element},
    },
};

const MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
const DI_NS: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
const DC_NS: &str = "http://www.omg.org/spec/DD/20100524/DC";
const DD_DI_NS: &str = "http://www.omg.org/spec/DD/20100524/DI";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const TARGET_NS: &str = "http://bpmn.io/schema/bpmn";

const COLLABORATION_ID: &str = "Collaboration_1";
const DEFAULT_PROCESS_ID: &str = "Process_1";

pub(crate) fn export(graph: &Graph) -> Result<String, ExportError> {
    check(graph)?;

    let processes = Processes::assign(graph);
    let owners = data_association_owners(graph)?;

    let mut definitions = Element::new("bpmn:definitions")
        .with_attribute("xmlns:bpmn", MODEL_NS)
        .with_attribute("xmlns:bpmndi", DI_NS)
        .with_attribute("xmlns:dc", DC_NS)
        .with_attribute("xmlns:di", DD_DI_NS)
        .with_attribute("xmlns:xsi", XSI_NS)
        .with_attribute("id", "Definitions_1")
        .with_attribute("targetNamespace", TARGET_NS);
    if let Some(name) = graph.name() {
        definitions = definitions.with_attribute("name", name);
    }

    let collaboration = collaboration(graph, &processes);
    let plane_element = match &collaboration {
        Some(_) => COLLABORATION_ID.to_string(),
        None => processes.ids[0].clone(),
    };
    if let Some(collaboration) = collaboration {
        definitions.push(collaboration);
    }
    for index in 0..processes.ids.len() {
        definitions.push(process(graph, &processes, &owners, index));
    }
    definitions.push(diagram(graph, plane_element));

    let xml = tree::write(&definitions)?;
    debug!(
        processes = processes.ids.len(),
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        bytes = xml.len();
        "Exported process XML"
    );
    Ok(xml)
}

fn check(graph: &Graph) -> Result<(), ExportError> {
    if let Some(node) = graph
        .nodes()
        .iter()
        .find(|node| node.notation() != Notation::Process)
    {
        return Err(ExportError::precondition(
            FORMAT,
            format!(
                "node `{}` is a {} node ({} notation)",
                node.id(),
                node.kind().tag(),
                node.notation()
            ),
        ));
    }
    if let Some(edge) = graph
        .edges()
        .iter()
        .find(|edge| edge.kind().notation() != Notation::Process)
    {
        return Err(ExportError::precondition(
            FORMAT,
            format!(
                "edge `{}` is a {} edge ({} notation)",
                edge.id(),
                edge.kind().tag(),
                edge.kind().notation()
            ),
        ));
    }
    Ok(())
}

/// Which process each node is written into.
struct Processes<'g> {
    /// Process ids in output order: one per pool, then the default process
    /// when it is needed.
    ids: Vec<String>,
    pools: Vec<&'g Node>,
    owner: HashMap<&'g str, usize>,
    default: usize,
}

impl<'g> Processes<'g> {
    fn assign(graph: &'g Graph) -> Self {
        let pools: Vec<&Node> = graph
            .nodes()
            .iter()
            .filter(|node| matches!(node.kind(), NodeKind::Pool { .. }))
            .collect();

        let mut ids = Vec::with_capacity(pools.len() + 1);
        let mut owner: HashMap<&str, usize> = HashMap::new();
        for (index, pool) in pools.iter().enumerate() {
            ids.push(format!("Process_{}", pool.id()));
            owner.entry(pool.id()).or_insert(index);
            for member in pool.kind().members().unwrap_or_default() {
                owner.entry(member.as_str()).or_insert(index);
                let lane_members = graph
                    .node(member)
                    .filter(|node| matches!(node.kind(), NodeKind::Lane { .. }))
                    .and_then(|lane| lane.kind().members())
                    .unwrap_or_default();
                for lane_member in lane_members {
                    owner.entry(lane_member.as_str()).or_insert(index);
                }
            }
        }

        let default = ids.len();
        let needs_default =
            pools.is_empty() || graph.nodes().iter().any(|node| !owner.contains_key(node.id()));
        if needs_default {
            let mut id = DEFAULT_PROCESS_ID.to_string();
            while ids.contains(&id) {
                id.push('_');
            }
            ids.push(id);

            // Lanes outside every pool bring their members along.
            for node in graph.nodes() {
                if let NodeKind::Lane { members } = node.kind() {
                    if !owner.contains_key(node.id()) {
                        owner.insert(node.id(), default);
                        for member in members {
                            owner.entry(member.as_str()).or_insert(default);
                        }
                    }
                }
            }
        }

        Self {
            ids,
            pools,
            owner,
            default,
        }
    }

    fn of(&self, id: &str) -> usize {
        self.owner.get(id).copied().unwrap_or(self.default)
    }
}

/// Maps each data-association edge to the flow node it is nested in.
fn data_association_owners(graph: &Graph) -> Result<HashMap<&str, &str>, ExportError> {
    let is_flow_node = |id: &str| graph.node(id).is_some_and(|node| node.kind().is_flow_node());

    let mut owners = HashMap::new();
    for edge in graph.edges() {
        if *edge.kind() != EdgeKind::DataAssociation {
            continue;
        }
        let owner = if is_flow_node(edge.target()) {
            edge.target()
        } else if is_flow_node(edge.source()) {
            edge.source()
        } else {
            return Err(ExportError::precondition(
                FORMAT,
                format!(
                    "data association `{}` must start or end at an event, task or gateway",
                    edge.id()
                ),
            ));
        };
        owners.insert(edge.id(), owner);
    }
    Ok(owners)
}

fn collaboration(graph: &Graph, processes: &Processes<'_>) -> Option<Element> {
    let message_flows: Vec<&Edge> = graph
        .edges()
        .iter()
        .filter(|edge| *edge.kind() == EdgeKind::MessageFlow)
        .collect();
    if processes.pools.is_empty() && message_flows.is_empty() {
        return None;
    }

    let mut collaboration = Element::new("bpmn:collaboration").with_attribute("id", COLLABORATION_ID);
    for (index, pool) in processes.pools.iter().enumerate() {
        let participant = named(Element::new("bpmn:participant"), pool.id(), pool.label())
            .with_attribute("processRef", processes.ids[index].as_str());
        collaboration.push(participant);
    }
    for edge in message_flows {
        collaboration.push(flow(edge, "bpmn:messageFlow"));
    }
    Some(collaboration)
}

fn process(
    graph: &Graph,
    processes: &Processes<'_>,
    owners: &HashMap<&str, &str>,
    index: usize,
) -> Element {
    let id = processes.ids[index].as_str();
    let mut process = Element::new("bpmn:process")
        .with_attribute("id", id)
        .with_attribute("isExecutable", "false");

    let owned = graph
        .nodes()
        .iter()
        .filter(|node| processes.of(node.id()) == index);

    let lanes: Vec<&Node> = owned
        .clone()
        .filter(|node| matches!(node.kind(), NodeKind::Lane { .. }))
        .collect();
    if !lanes.is_empty() {
        let mut lane_set = Element::new("bpmn:laneSet").with_attribute("id", format!("LaneSet_{id}"));
        for lane in lanes {
            let mut element = named(Element::new("bpmn:lane"), lane.id(), lane.label());
            for member in lane.kind().members().unwrap_or_default() {
                element.push(Element::new("bpmn:flowNodeRef").with_text(member.as_str()));
            }
            lane_set.push(element);
        }
        process.push(lane_set);
    }

    for node in owned {
        if let Some(element) = flow_node(graph, owners, node) {
            process.push(element);
        }
    }

    for edge in graph.edges() {
        let tag = match edge.kind() {
            EdgeKind::SequenceFlow | EdgeKind::DefaultFlow | EdgeKind::ConditionalFlow { .. } => {
                "bpmn:sequenceFlow"
            }
            EdgeKind::Association | EdgeKind::CompensationFlow => "bpmn:association",
            _ => continue,
        };
        if processes.of(edge.source()) == index {
            process.push(flow(edge, tag));
        }
    }

    process
}

/// The element for a node inside a process; `None` for pools and lanes.
fn flow_node(graph: &Graph, owners: &HashMap<&str, &str>, node: &Node) -> Option<Element> {
    let tag = match node.kind() {
        NodeKind::Event { stage, .. } => lookup(EVENT_ELEMENTS, stage),
        NodeKind::Task(task) => lookup(TASK_ELEMENTS, task),
        NodeKind::Gateway(gateway) => lookup(GATEWAY_ELEMENTS, gateway),
        NodeKind::DataObject => "dataObjectReference",
        NodeKind::DataStoreReference => "dataStoreReference",
        _ => return None,
    };
    let mut element = named(Element::new(format!("bpmn:{tag}")), node.id(), node.label());

    let default_flow = graph.edges().iter().find(|edge| {
        edge.source() == node.id() && *edge.kind() == EdgeKind::DefaultFlow
    });
    if let Some(edge) = default_flow {
        element = element.with_attribute("default", edge.id());
    }

    for edge in graph.edges() {
        if owners.get(edge.id()) != Some(&node.id()) {
            continue;
        }
        let association = if edge.target() == node.id() {
            Element::new("bpmn:dataInputAssociation")
                .with_attribute("id", edge.id())
                .with_child(Element::new("bpmn:sourceRef").with_text(edge.source()))
        } else {
            Element::new("bpmn:dataOutputAssociation")
                .with_attribute("id", edge.id())
                .with_child(Element::new("bpmn:targetRef").with_text(edge.target()))
        };
        element.push(association);
    }

    if let NodeKind::Event { trigger, .. } = node.kind() {
        if *trigger != EventTrigger::None {
            let definition = lookup(EVENT_DEFINITIONS, trigger);
            element.push(Element::new(format!("bpmn:{definition}")));
        }
    }

    Some(element)
}

fn flow(edge: &Edge, tag: &str) -> Element {
    let mut element = Element::new(tag).with_attribute("id", edge.id());
    if let Some(label) = edge.label() {
        element = element.with_attribute("name", label);
    }
    element = element
        .with_attribute("sourceRef", edge.source())
        .with_attribute("targetRef", edge.target());

    match edge.kind() {
        EdgeKind::ConditionalFlow { condition } => element.with_child(
            Element::new("bpmn:conditionExpression")
                .with_attribute("xsi:type", "bpmn:tFormalExpression")
                .with_text(condition.as_str()),
        ),
        EdgeKind::CompensationFlow => element.with_attribute("associationDirection", "One"),
        _ => element,
    }
}

fn diagram(graph: &Graph, plane_element: String) -> Element {
    let mut plane = Element::new("bpmndi:BPMNPlane")
        .with_attribute("id", "BPMNPlane_1")
        .with_attribute("bpmnElement", plane_element);

    let mut centres = HashMap::new();
    for node in graph.nodes() {
        let Some(position) = node.position() else {
            continue;
        };
        let position = position.rounded(2);
        let (width, height) = shape_size(node.kind());
        centres.insert(node.id(), position.offset(width / 2.0, height / 2.0));

        let mut shape = Element::new("bpmndi:BPMNShape")
            .with_attribute("id", format!("{}_di", node.id()))
            .with_attribute("bpmnElement", node.id());
        if matches!(node.kind(), NodeKind::Pool { .. } | NodeKind::Lane { .. }) {
            shape = shape.with_attribute("isHorizontal", "true");
        }
        plane.push(shape.with_child(
            Element::new("dc:Bounds")
                .with_attribute("x", coordinate(position.x))
                .with_attribute("y", coordinate(position.y))
                .with_attribute("width", coordinate(width))
                .with_attribute("height", coordinate(height)),
        ));
    }

    for edge in graph.edges() {
        let (Some(source), Some(target)) = (centres.get(edge.source()), centres.get(edge.target()))
        else {
            continue;
        };
        plane.push(
            Element::new("bpmndi:BPMNEdge")
                .with_attribute("id", format!("{}_di", edge.id()))
                .with_attribute("bpmnElement", edge.id())
                .with_child(waypoint(*source))
                .with_child(waypoint(*target)),
        );
    }

    Element::new("bpmndi:BPMNDiagram")
        .with_attribute("id", "BPMNDiagram_1")
        .with_child(plane)
}

fn waypoint(point: Position) -> Element {
    Element::new("di:waypoint")
        .with_attribute("x", coordinate(point.x))
        .with_attribute("y", coordinate(point.y))
}

fn named(element: Element, id: &str, label: &str) -> Element {
    let element = element.with_attribute("id", id);
    if label.is_empty() {
        element
    } else {
        element.with_attribute("name", label)
    }
}

fn lookup<T: PartialEq>(table: &[(T, &'static str)], value: &T) -> &'static str {
    table
        .iter()
        .find(|(candidate, _)| candidate == value)
        .map_or("task", |(_, tag)| *tag)
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
fn coordinate(value: f64) -> String {
    format!("{}", round_to(value, 2))
}

#[cfg(test)]
mod tests {
    use schematic_core::{Attribute, EventStage, GatewayKind, TaskKind};

    use super::*;

    fn node(id: &str, kind: NodeKind) -> Node {
        Node::new(id, kind, id.to_uppercase())
    }

    fn simple_graph() -> Graph {
        let mut graph = Graph::named("Orders");
        graph
            .add_node(
                node("start", NodeKind::event(EventStage::Start))
                    .with_position(Position::new(10.004, 20.0)),
            )
            .unwrap();
        graph
            .add_node(
                node("gw", NodeKind::Gateway(GatewayKind::Exclusive))
                    .with_position(Position::new(100.0, 15.0)),
            )
            .unwrap();
        graph
            .add_node(node("ship", NodeKind::Task(TaskKind::User)))
            .unwrap();
        graph
            .add_node(node(
                "end",
                NodeKind::Event {
                    stage: EventStage::End,
                    trigger: EventTrigger::Message,
                },
            ))
            .unwrap();
        graph
            .add_edge(Edge::new("f1", "start", "gw", EdgeKind::SequenceFlow))
            .unwrap();
        graph
            .add_edge(
                Edge::new(
                    "f2",
                    "gw",
                    "ship",
                    EdgeKind::ConditionalFlow {
                        condition: "qty < 5".to_string(),
                    },
                )
                .with_label("few"),
            )
            .unwrap();
        graph
            .add_edge(Edge::new("f3", "gw", "end", EdgeKind::DefaultFlow))
            .unwrap();
        graph
    }

    #[test]
    fn test_export_simple_process() {
        let xml = export(&simple_graph()).unwrap();

        assert!(xml.contains(r#"name="Orders""#));
        assert!(!xml.contains("bpmn:collaboration"));
        assert!(xml.contains(r#"<bpmn:process id="Process_1" isExecutable="false">"#));
        assert!(xml.contains(r#"<bpmn:startEvent id="start" name="START"/>"#));
        assert!(xml.contains(r#"<bpmn:exclusiveGateway id="gw" name="GW" default="f3"/>"#));
        assert!(xml.contains(r#"<bpmn:userTask id="ship" name="SHIP"/>"#));
        assert!(xml.contains("<bpmn:messageEventDefinition/>"));
        assert!(xml.contains(
            r#"<bpmn:sequenceFlow id="f2" name="few" sourceRef="gw" targetRef="ship">"#
        ));
        assert!(xml.contains("qty &lt; 5</bpmn:conditionExpression>"));
    }

    #[test]
    fn test_export_diagram_section() {
        let xml = export(&simple_graph()).unwrap();

        assert!(xml.contains(r#"<bpmndi:BPMNPlane id="BPMNPlane_1" bpmnElement="Process_1">"#));
        assert!(xml.contains(r#"<dc:Bounds x="10" y="20" width="40" height="40"/>"#));
        assert!(xml.contains(r#"<dc:Bounds x="100" y="15" width="50" height="50"/>"#));
        // Only f1 has both endpoints positioned.
        assert!(xml.contains(r#"<bpmndi:BPMNEdge id="f1_di" bpmnElement="f1">"#));
        assert!(!xml.contains(r#"bpmnElement="f2""#));
        assert!(xml.contains(r#"<di:waypoint x="30" y="40"/>"#));
        assert!(xml.contains(r#"<di:waypoint x="125" y="40"/>"#));
    }

    #[test]
    fn test_export_pools_and_lanes() {
        let mut graph = Graph::new();
        graph
            .add_node(node(
                "shop",
                NodeKind::Pool {
                    members: vec!["sales".to_string(), "db".to_string()],
                },
            ))
            .unwrap();
        graph
            .add_node(node(
                "sales",
                NodeKind::Lane {
                    members: vec!["receive".to_string()],
                },
            ))
            .unwrap();
        graph
            .add_node(node("receive", NodeKind::Task(TaskKind::Receive)))
            .unwrap();
        graph
            .add_node(node("db", NodeKind::DataStoreReference))
            .unwrap();
        graph
            .add_node(node("customer", NodeKind::Task(TaskKind::Send)))
            .unwrap();
        graph
            .add_edge(Edge::new("m1", "customer", "receive", EdgeKind::MessageFlow))
            .unwrap();
        graph
            .add_edge(Edge::new("d1", "receive", "db", EdgeKind::DataAssociation))
            .unwrap();

        let xml = export(&graph).unwrap();
        assert!(xml.contains(r#"<bpmndi:BPMNPlane id="BPMNPlane_1" bpmnElement="Collaboration_1"/>"#));
        assert!(xml.contains(
            r#"<bpmn:participant id="shop" name="SHOP" processRef="Process_shop"/>"#
        ));
        assert!(xml.contains(
            r#"<bpmn:messageFlow id="m1" sourceRef="customer" targetRef="receive"/>"#
        ));
        assert!(xml.contains(r#"<bpmn:process id="Process_shop" isExecutable="false">"#));
        assert!(xml.contains(r#"<bpmn:laneSet id="LaneSet_Process_shop">"#));
        assert!(xml.contains("<bpmn:flowNodeRef>receive</bpmn:flowNodeRef>"));
        assert!(xml.contains(r#"<bpmn:dataOutputAssociation id="d1">"#));
        assert!(xml.contains("<bpmn:targetRef>db</bpmn:targetRef>"));

        // The send task belongs to no pool and lands in the default process,
        // which comes after the pool's process.
        let shop = xml.find(r#"id="Process_shop""#).unwrap();
        let default = xml.find(r#"id="Process_1""#).unwrap();
        let customer = xml.find(r#"<bpmn:sendTask id="customer""#).unwrap();
        assert!(shop < default && default < customer);
    }

    #[test]
    fn test_export_rejects_other_notations() {
        let mut graph = simple_graph();
        graph
            .add_node(Node::new(
                "author",
                NodeKind::entity(vec![Attribute::new("id", "INT").with_primary(true)]),
                "Author",
            ))
            .unwrap();
        let err = export(&graph).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("`author`"));

        let mut graph = simple_graph();
        graph
            .add_node(node("p", NodeKind::Process))
            .unwrap();
        assert!(export(&graph).unwrap_err().is_precondition());
    }

    #[test]
    fn test_export_rejects_detached_data_association() {
        let mut graph = Graph::new();
        graph.add_node(node("a", NodeKind::DataObject)).unwrap();
        graph
            .add_node(node("b", NodeKind::DataStoreReference))
            .unwrap();
        graph
            .add_edge(Edge::new("d", "a", "b", EdgeKind::DataAssociation))
            .unwrap();

        let err = export(&graph).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("data association `d`"));
    }

    #[test]
    fn test_coordinate_formatting() {
        assert_eq!(coordinate(100.0), "100");
        assert_eq!(coordinate(10.125_1), "10.13");
        assert_eq!(coordinate(-0.001), "0");
    }
}
