//! Node and edge kinds.
//!
//! Kinds are closed tagged unions: each variant carries exactly the data its
//! element needs. A kind always belongs to one [`Notation`], which lets the
//! exporters reject graphs they cannot represent before writing anything.

use crate::{attribute::AttributeList, notation::Notation};

keyword_enum! {
    /// Where an event sits in the flow.
    pub enum EventStage as "event stage" {
        Start => "start",
        IntermediateCatch => "intermediate-catch",
        IntermediateThrow => "intermediate-throw",
        End => "end",
    }
}

keyword_enum! {
    /// What triggers (or is thrown by) an event.
    pub enum EventTrigger as "event trigger" {
        None => "none",
        Message => "message",
        Timer => "timer",
        Error => "error",
        Signal => "signal",
        Conditional => "conditional",
        Escalation => "escalation",
        Compensation => "compensation",
        Terminate => "terminate",
        Link => "link",
    }
}

keyword_enum! {
    /// Activity flavors.
    pub enum TaskKind as "task kind" {
        Task => "task",
        User => "user",
        Service => "service",
        Script => "script",
        Manual => "manual",
        Send => "send",
        Receive => "receive",
        BusinessRule => "business-rule",
        CallActivity => "call-activity",
    }
}

keyword_enum! {
    /// Gateway flavors.
    pub enum GatewayKind as "gateway kind" {
        Exclusive => "exclusive",
        Parallel => "parallel",
        Inclusive => "inclusive",
        Complex => "complex",
        EventBased => "event-based",
    }
}

keyword_enum! {
    /// How many instances may sit at one end of a relationship.
    pub enum Cardinality as "cardinality" {
        One => "one",
        Many => "many",
    }
}

keyword_enum! {
    /// The overall shape of a relationship, derived from both ends.
    pub enum RelationshipKind as "relationship kind" {
        OneToOne => "one-to-one",
        OneToMany => "one-to-many",
        ManyToMany => "many-to-many",
    }
}

/// The kind of a [`Node`](crate::Node).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Process notation
    Event {
        stage: EventStage,
        trigger: EventTrigger,
    },
    Task(TaskKind),
    Gateway(GatewayKind),
    DataObject,
    DataStoreReference,
    /// A participant. `members` lists the lanes and lane-less nodes it owns.
    Pool {
        members: Vec<String>,
    },
    Lane {
        members: Vec<String>,
    },

    // Entity-relationship notation
    Entity {
        attributes: AttributeList,
    },
    /// A Chen-style relationship diamond.
    Relationship,

    // Data-flow notation
    Process,
    DataStore,
    ExternalEntity,
}

impl NodeKind {
    /// Shorthand for an untriggered event.
    pub fn event(stage: EventStage) -> Self {
        NodeKind::Event {
            stage,
            trigger: EventTrigger::None,
        }
    }

    /// Shorthand for an entity with the given attributes.
    pub fn entity(attributes: impl Into<AttributeList>) -> Self {
        NodeKind::Entity {
            attributes: attributes.into(),
        }
    }

    /// The notation this kind belongs to.
    pub fn notation(&self) -> Notation {
        match self {
            NodeKind::Event { .. }
            | NodeKind::Task(_)
            | NodeKind::Gateway(_)
            | NodeKind::DataObject
            | NodeKind::DataStoreReference
            | NodeKind::Pool { .. }
            | NodeKind::Lane { .. } => Notation::Process,
            NodeKind::Entity { .. } | NodeKind::Relationship => Notation::EntityRelationship,
            NodeKind::Process | NodeKind::DataStore | NodeKind::ExternalEntity => {
                Notation::DataFlow
            }
        }
    }

    /// The discriminant keyword used by the JSON package.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Event { .. } => "event",
            NodeKind::Task(_) => "task",
            NodeKind::Gateway(_) => "gateway",
            NodeKind::DataObject => "data-object",
            NodeKind::DataStoreReference => "data-store-reference",
            NodeKind::Pool { .. } => "pool",
            NodeKind::Lane { .. } => "lane",
            NodeKind::Entity { .. } => "entity",
            NodeKind::Relationship => "relationship",
            NodeKind::Process => "process",
            NodeKind::DataStore => "data-store",
            NodeKind::ExternalEntity => "external-entity",
        }
    }

    /// Returns `true` for the nodes that take part in sequence flow:
    /// events, tasks and gateways.
    pub fn is_flow_node(&self) -> bool {
        matches!(
            self,
            NodeKind::Event { .. } | NodeKind::Task(_) | NodeKind::Gateway(_)
        )
    }

    /// Returns `true` if this is an event at the given stage.
    pub fn is_event_at(&self, at: EventStage) -> bool {
        matches!(self, NodeKind::Event { stage, .. } if *stage == at)
    }

    /// Members of a pool or lane; `None` for every other kind.
    pub fn members(&self) -> Option<&[String]> {
        match self {
            NodeKind::Pool { members } | NodeKind::Lane { members } => Some(members),
            _ => None,
        }
    }

    /// Attributes of an entity; `None` for every other kind.
    pub fn attributes(&self) -> Option<&AttributeList> {
        match self {
            NodeKind::Entity { attributes } => Some(attributes),
            _ => None,
        }
    }

    /// Mutable attributes of an entity; `None` for every other kind.
    pub fn attributes_mut(&mut self) -> Option<&mut AttributeList> {
        match self {
            NodeKind::Entity { attributes } => Some(attributes),
            _ => None,
        }
    }
}

/// One end of an entity relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipEnd {
    pub cardinality: Cardinality,
    pub optional: bool,
}

impl RelationshipEnd {
    /// Creates a new relationship end.
    pub fn new(cardinality: Cardinality, optional: bool) -> Self {
        Self {
            cardinality,
            optional,
        }
    }
}

/// Cardinality and optionality of an entity relationship edge.
///
/// The `source` end describes how many source-entity instances relate to a
/// single target instance, and vice versa for `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub source: RelationshipEnd,
    pub target: RelationshipEnd,
    /// The source entity's identity depends on the target.
    pub identifying: bool,
}

impl Relationship {
    /// Creates a relationship from its two ends.
    pub fn new(source: RelationshipEnd, target: RelationshipEnd, identifying: bool) -> Self {
        Self {
            source,
            target,
            identifying,
        }
    }

    /// Derives the relationship shape from the two cardinalities.
    pub fn kind(&self) -> RelationshipKind {
        match (self.source.cardinality, self.target.cardinality) {
            (Cardinality::One, Cardinality::One) => RelationshipKind::OneToOne,
            (Cardinality::Many, Cardinality::Many) => RelationshipKind::ManyToMany,
            _ => RelationshipKind::OneToMany,
        }
    }
}

impl Default for Relationship {
    /// A plain optional many-to-one relationship.
    fn default() -> Self {
        Self {
            source: RelationshipEnd::new(Cardinality::Many, true),
            target: RelationshipEnd::new(Cardinality::One, false),
            identifying: false,
        }
    }
}

/// The kind of an [`Edge`](crate::Edge).
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    // Process notation
    SequenceFlow,
    /// The flow taken when no other outgoing condition holds.
    DefaultFlow,
    ConditionalFlow {
        condition: String,
    },
    MessageFlow,
    Association,
    DataAssociation,
    CompensationFlow,

    // Entity-relationship notation
    Relationship(Relationship),

    // Data-flow notation
    DataFlow,
}

impl EdgeKind {
    /// The notation this kind belongs to.
    pub fn notation(&self) -> Notation {
        match self {
            EdgeKind::SequenceFlow
            | EdgeKind::DefaultFlow
            | EdgeKind::ConditionalFlow { .. }
            | EdgeKind::MessageFlow
            | EdgeKind::Association
            | EdgeKind::DataAssociation
            | EdgeKind::CompensationFlow => Notation::Process,
            EdgeKind::Relationship(_) => Notation::EntityRelationship,
            EdgeKind::DataFlow => Notation::DataFlow,
        }
    }

    /// The discriminant keyword used by the JSON package.
    pub fn tag(&self) -> &'static str {
        match self {
            EdgeKind::SequenceFlow => "sequence-flow",
            EdgeKind::DefaultFlow => "default-flow",
            EdgeKind::ConditionalFlow { .. } => "conditional-flow",
            EdgeKind::MessageFlow => "message-flow",
            EdgeKind::Association => "association",
            EdgeKind::DataAssociation => "data-association",
            EdgeKind::CompensationFlow => "compensation-flow",
            EdgeKind::Relationship(_) => "relationship",
            EdgeKind::DataFlow => "data-flow",
        }
    }

    /// Returns `true` for the edges that carry control flow between flow
    /// nodes: sequence, default, conditional and message flows.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            EdgeKind::SequenceFlow
                | EdgeKind::DefaultFlow
                | EdgeKind::ConditionalFlow { .. }
                | EdgeKind::MessageFlow
        )
    }

    /// Returns `true` for the flows that live inside a single process:
    /// sequence, default and conditional flows.
    pub fn is_sequence_flow(&self) -> bool {
        matches!(
            self,
            EdgeKind::SequenceFlow | EdgeKind::DefaultFlow | EdgeKind::ConditionalFlow { .. }
        )
    }

    /// The relationship data of an entity-relationship edge.
    pub fn relationship(&self) -> Option<&Relationship> {
        match self {
            EdgeKind::Relationship(relationship) => Some(relationship),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.as_str().parse::<TaskKind>(), Ok(*kind));
        }
        for kind in GatewayKind::ALL {
            assert_eq!(kind.to_string().parse::<GatewayKind>(), Ok(*kind));
        }
        assert_eq!(
            "intermediate-catch".parse::<EventStage>(),
            Ok(EventStage::IntermediateCatch)
        );
    }

    #[test]
    fn test_keyword_unknown() {
        let err = "diamond".parse::<GatewayKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown gateway kind `diamond`");
    }

    #[test]
    fn test_node_kind_notation() {
        assert_eq!(NodeKind::Task(TaskKind::User).notation(), Notation::Process);
        assert_eq!(
            NodeKind::Pool { members: vec![] }.notation(),
            Notation::Process
        );
        assert_eq!(
            NodeKind::entity(AttributeList::new()).notation(),
            Notation::EntityRelationship
        );
        assert_eq!(NodeKind::ExternalEntity.notation(), Notation::DataFlow);
    }

    #[test]
    fn test_flow_node() {
        assert!(NodeKind::event(EventStage::Start).is_flow_node());
        assert!(NodeKind::Gateway(GatewayKind::Parallel).is_flow_node());
        assert!(!NodeKind::DataObject.is_flow_node());
        assert!(!NodeKind::Lane { members: vec![] }.is_flow_node());
    }

    #[test]
    fn test_is_event_at() {
        let kind = NodeKind::Event {
            stage: EventStage::End,
            trigger: EventTrigger::Terminate,
        };
        assert!(kind.is_event_at(EventStage::End));
        assert!(!kind.is_event_at(EventStage::Start));
        assert!(!NodeKind::Process.is_event_at(EventStage::End));
    }

    #[test]
    fn test_relationship_kind() {
        let one = RelationshipEnd::new(Cardinality::One, false);
        let many = RelationshipEnd::new(Cardinality::Many, true);

        assert_eq!(
            Relationship::new(one, one, false).kind(),
            RelationshipKind::OneToOne
        );
        assert_eq!(
            Relationship::new(many, one, false).kind(),
            RelationshipKind::OneToMany
        );
        assert_eq!(
            Relationship::new(one, many, false).kind(),
            RelationshipKind::OneToMany
        );
        assert_eq!(
            Relationship::new(many, many, false).kind(),
            RelationshipKind::ManyToMany
        );
    }

    #[test]
    fn test_edge_kind_flow_classes() {
        let conditional = EdgeKind::ConditionalFlow {
            condition: "amount > 10".to_string(),
        };
        assert!(conditional.is_control_flow());
        assert!(conditional.is_sequence_flow());
        assert!(EdgeKind::MessageFlow.is_control_flow());
        assert!(!EdgeKind::MessageFlow.is_sequence_flow());
        assert!(!EdgeKind::Association.is_control_flow());
        assert!(!EdgeKind::DataFlow.is_control_flow());
    }
}
