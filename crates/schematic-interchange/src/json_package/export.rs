//! Graph to JSON package.

use log::{debug, warn};

use schematic_core::{Attribute, Edge, EdgeKind, Extensions, Graph, Node, NodeKind};

use crate::{
    error::ExportError,
    json_package::{
        FORMAT,
        record::{
            ATTRIBUTE_FIELDS, AttributeRecord, EDGE_FIELDS, EdgeRecord, ForeignKeyRecord, NODE_FIELDS,
            NodeRecord, PACKAGE_FIELDS, PACKAGE_FORMAT, PACKAGE_VERSION, PackageRecord,
        },
    },
};

pub(crate) fn export(graph: &Graph, pretty: bool) -> Result<String, ExportError> {
    let package = PackageRecord {
        format: Some(PACKAGE_FORMAT.to_string()),
        version: Some(PACKAGE_VERSION),
        name: graph.name().map(str::to_string),
        nodes: graph.nodes().iter().map(node_record).collect(),
        edges: graph.edges().iter().map(edge_record).collect(),
        extensions: extensions(graph.extensions(), PACKAGE_FIELDS, "package"),
    };

    let mut json = if pretty {
        serde_json::to_string_pretty(&package)
    } else {
        serde_json::to_string(&package)
    }
    .map_err(|err| ExportError::write(FORMAT, err))?;
    json.push('\n');

    debug!(pretty = pretty, bytes = json.len(); "Exported JSON package");
    Ok(json)
}

/// Copies extensions, dropping keys that would collide with a record field.
fn extensions(source: &Extensions, reserved: &[&str], owner: &str) -> Extensions {
    source
        .iter()
        .filter(|(key, _)| {
            let collides = reserved.contains(&key.as_str());
            if collides {
                warn!(owner = owner, key = key.as_str(); "Dropping extension that shadows a package field");
            }
            !collides
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn node_record(node: &Node) -> NodeRecord {
    let mut record = NodeRecord {
        id: node.id().to_string(),
        kind: node.kind().tag().to_string(),
        stage: None,
        trigger: None,
        task: None,
        gateway: None,
        members: None,
        attributes: None,
        label: node.label().to_string(),
        position: node.position(),
        extensions: extensions(node.extensions(), NODE_FIELDS, node.id()),
    };

    match node.kind() {
        NodeKind::Event { stage, trigger } => {
            record.stage = Some(stage.to_string());
            record.trigger = Some(trigger.to_string());
        }
        NodeKind::Task(task) => record.task = Some(task.to_string()),
        NodeKind::Gateway(gateway) => record.gateway = Some(gateway.to_string()),
        NodeKind::Pool { members } | NodeKind::Lane { members } => {
            record.members = Some(members.clone());
        }
        NodeKind::Entity { attributes } => {
            record.attributes = Some(attributes.iter().map(attribute_record).collect());
        }
        NodeKind::DataObject
        | NodeKind::DataStoreReference
        | NodeKind::Relationship
        | NodeKind::Process
        | NodeKind::DataStore
        | NodeKind::ExternalEntity => {}
    }
    record
}

fn attribute_record(attribute: &Attribute) -> AttributeRecord {
    AttributeRecord {
        name: attribute.name().to_string(),
        data_type: attribute.data_type().to_string(),
        size: attribute.size().map(str::to_string),
        primary: attribute.is_primary(),
        unique: attribute.is_unique(),
        nullable: attribute.is_nullable(),
        default: attribute.default().map(str::to_string),
        foreign_key: attribute.foreign_key().map(|foreign_key| ForeignKeyRecord {
            entity_id: foreign_key.entity_id().to_string(),
            entity_name: foreign_key.entity_name().to_string(),
            attribute_name: foreign_key.attribute_name().to_string(),
        }),
        extensions: extensions(attribute.extensions(), ATTRIBUTE_FIELDS, attribute.name()),
    }
}

fn edge_record(edge: &Edge) -> EdgeRecord {
    let mut record = EdgeRecord {
        id: edge.id().to_string(),
        source: edge.source().to_string(),
        target: edge.target().to_string(),
        kind: edge.kind().tag().to_string(),
        condition: None,
        source_cardinality: None,
        source_optional: None,
        target_cardinality: None,
        target_optional: None,
        identifying: None,
        label: edge.label().map(str::to_string),
        extensions: extensions(edge.extensions(), EDGE_FIELDS, edge.id()),
    };

    match edge.kind() {
        EdgeKind::ConditionalFlow { condition } => record.condition = Some(condition.clone()),
        EdgeKind::Relationship(relationship) => {
            record.source_cardinality = Some(relationship.source.cardinality.to_string());
            record.source_optional = Some(relationship.source.optional);
            record.target_cardinality = Some(relationship.target.cardinality.to_string());
            record.target_optional = Some(relationship.target.optional);
            record.identifying = Some(relationship.identifying);
        }
        _ => {}
    }
    record
}
