//! The process-notation XML interchange dialect.
//!
//! Only the subset needed to exchange process diagrams is read and written:
//! flow nodes, data references, lanes, pools (as collaboration participants),
//! the flows between them, and the diagram-interchange section holding shape
//! positions. Namespace prefixes are not checked; elements are matched by
//! local name.
//!
//! Anything else is skipped with a warning naming the element, so a document
//! produced by a richer modeling tool still imports.

mod export;
mod import;
mod tree;

use schematic_core::{EventStage, EventTrigger, GatewayKind, Graph, NodeKind, TaskKind};

use crate::{
    Imported,
    error::{ExportError, MalformedInputError},
};

const FORMAT: &str = "process XML";

const EVENT_ELEMENTS: &[(EventStage, &str)] = &[
    (EventStage::Start, "startEvent"),
    (EventStage::IntermediateCatch, "intermediateCatchEvent"),
    (EventStage::IntermediateThrow, "intermediateThrowEvent"),
    (EventStage::End, "endEvent"),
];

const EVENT_DEFINITIONS: &[(EventTrigger, &str)] = &[
    (EventTrigger::Message, "messageEventDefinition"),
    (EventTrigger::Timer, "timerEventDefinition"),
    (EventTrigger::Error, "errorEventDefinition"),
    (EventTrigger::Signal, "signalEventDefinition"),
    (EventTrigger::Conditional, "conditionalEventDefinition"),
    (EventTrigger::Escalation, "escalationEventDefinition"),
    (EventTrigger::Compensation, "compensateEventDefinition"),
    (EventTrigger::Terminate, "terminateEventDefinition"),
    (EventTrigger::Link, "linkEventDefinition"),
];

const TASK_ELEMENTS: &[(TaskKind, &str)] = &[
    (TaskKind::Task, "task"),
    (TaskKind::User, "userTask"),
    (TaskKind::Service, "serviceTask"),
    (TaskKind::Script, "scriptTask"),
    (TaskKind::Manual, "manualTask"),
    (TaskKind::Send, "sendTask"),
    (TaskKind::Receive, "receiveTask"),
    (TaskKind::BusinessRule, "businessRuleTask"),
    (TaskKind::CallActivity, "callActivity"),
];

const GATEWAY_ELEMENTS: &[(GatewayKind, &str)] = &[
    (GatewayKind::Exclusive, "exclusiveGateway"),
    (GatewayKind::Parallel, "parallelGateway"),
    (GatewayKind::Inclusive, "inclusiveGateway"),
    (GatewayKind::Complex, "complexGateway"),
    (GatewayKind::EventBased, "eventBasedGateway"),
];

/// Helper children that carry nothing the graph keeps.
const IGNORED_CHILDREN: &[&str] = &[
    "incoming",
    "outgoing",
    "documentation",
    "extensionElements",
    "dataObject",
    "property",
    "ioSpecification",
];

/// Shape width and height written for each node kind.
fn shape_size(kind: &NodeKind) -> (f64, f64) {
    match kind {
        NodeKind::Event { .. } => (40.0, 40.0),
        NodeKind::Gateway(_) => (50.0, 50.0),
        NodeKind::Pool { .. } => (600.0, 250.0),
        NodeKind::Lane { .. } => (570.0, 125.0),
        _ => (100.0, 80.0),
    }
}

/// Import a process XML document.
///
/// # Errors
///
/// Returns [`MalformedInputError`] if the document is not well-formed XML or
/// has no `definitions` root holding at least one `process`.
pub fn import(text: &str) -> Result<Imported, MalformedInputError> {
    import::import(text)
}

/// Export a process graph as an XML document.
///
/// # Errors
///
/// Returns [`ExportError::Precondition`] if the graph holds elements of
/// another notation, or a data association with no flow node at either end.
pub fn export(graph: &Graph) -> Result<String, ExportError> {
    export::export(graph)
}
