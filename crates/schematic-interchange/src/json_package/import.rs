//! JSON package to graph.

use std::str::FromStr;

use log::debug;
use serde_json::error::Category;

use schematic_core::{
    Attribute, AttributeList, Cardinality, Edge, EdgeKind, EventTrigger, ForeignKey, Graph,
    GraphError, Node, NodeKind, Relationship, RelationshipEnd, UnknownKeywordError,
};

use crate::{
    Imported,
    error::{Diagnostic, DiagnosticCode, MalformedInputError},
    json_package::record::{
        AttributeRecord, EdgeRecord, NodeRecord, PACKAGE_FORMAT, PACKAGE_VERSION, PackageRecord,
    },
    span::{Span, offset_of},
};

/// A record that does not describe a valid graph element.
struct RecordError {
    code: DiagnosticCode,
    message: String,
}

impl RecordError {
    fn missing(owner: &str, id: &str, field: &str) -> Self {
        Self {
            code: DiagnosticCode::E201,
            message: format!("{owner} `{id}` has no `{field}`"),
        }
    }

    fn keyword(owner: &str, id: &str, err: &UnknownKeywordError) -> Self {
        Self {
            code: DiagnosticCode::E202,
            message: format!("{owner} `{id}`: {err}"),
        }
    }
}

pub(crate) fn import(text: &str) -> Result<Imported, MalformedInputError> {
    let package: PackageRecord =
        serde_json::from_str(text).map_err(|err| parse_error(text, &err))?;

    let mut warnings = Vec::new();
    if package.format.as_deref() != Some(PACKAGE_FORMAT) {
        let found = match package.format.as_deref() {
            Some(format) => format!("`{format}`"),
            None => "missing".to_string(),
        };
        warnings.push(
            Diagnostic::warning(format!(
                "package format is {found}, expected `{PACKAGE_FORMAT}`; reading anyway"
            ))
            .with_code(DiagnosticCode::W201),
        );
    }
    if package.version != Some(PACKAGE_VERSION) {
        let found = package
            .version
            .map_or_else(|| "missing".to_string(), |version| version.to_string());
        warnings.push(
            Diagnostic::warning(format!(
                "package version is {found}, expected {PACKAGE_VERSION}; reading anyway"
            ))
            .with_code(DiagnosticCode::W201),
        );
    }

    let mut graph = Graph::new();
    graph.set_name(package.name);
    *graph.extensions_mut() = package.extensions;

    for record in package.nodes {
        let id = record.id.clone();
        let node = node(record).map_err(|err| record_error(text, &id, err))?;
        graph
            .add_node(node)
            .map_err(|err| graph_error(text, &id, &err))?;
    }
    for record in package.edges {
        let id = record.id.clone();
        let edge = edge(record).map_err(|err| record_error(text, &id, err))?;
        graph
            .add_edge(edge)
            .map_err(|err| graph_error(text, &id, &err))?;
    }

    debug!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        extensions = graph.extensions().len();
        "Imported JSON package"
    );
    Ok(Imported::new(graph, warnings))
}

fn parse_error(text: &str, err: &serde_json::Error) -> MalformedInputError {
    let offset = offset_of(text, err.line(), err.column());
    let (code, what) = match err.classify() {
        Category::Data => (DiagnosticCode::E201, "invalid package structure"),
        Category::Syntax | Category::Eof | Category::Io => (DiagnosticCode::E200, "invalid JSON"),
    };
    Diagnostic::error(format!("{what}: {err}"))
        .with_code(code)
        .with_label(Span::at(offset), code.description())
        .into()
}

fn record_error(text: &str, id: &str, err: RecordError) -> MalformedInputError {
    located(text, id, 0, Diagnostic::error(err.message).with_code(err.code))
}

fn graph_error(text: &str, id: &str, err: &GraphError) -> MalformedInputError {
    let (code, occurrence) = match err {
        GraphError::UnknownEndpoint { .. } => (DiagnosticCode::E204, 0),
        _ => (DiagnosticCode::E203, 1),
    };
    located(
        text,
        id,
        occurrence,
        Diagnostic::error(err.to_string()).with_code(code),
    )
}

/// Labels the `occurrence`-th `"id": <id>` pair in `text`, falling back to
/// the first one.
fn located(text: &str, id: &str, occurrence: usize, diagnostic: Diagnostic) -> MalformedInputError {
    let spans = id_spans(text, id);
    match spans.get(occurrence).or_else(|| spans.first()) {
        Some(span) => diagnostic.with_label(*span, "in this record").into(),
        None => diagnostic.into(),
    }
}

/// Spans of every `"id": <id>` value in `text`.
fn id_spans(text: &str, id: &str) -> Vec<Span> {
    let Ok(quoted) = serde_json::to_string(id) else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(found) = text[from..].find("\"id\"") {
        let key_end = from + found + "\"id\"".len();
        from = key_end;

        let after_key = text[key_end..].trim_start();
        let Some(after_colon) = after_key.strip_prefix(':') else {
            continue;
        };
        let value = after_colon.trim_start();
        if value.starts_with(&quoted) {
            let start = text.len() - value.len();
            spans.push(Span::new(start..start + quoted.len()));
        }
    }
    spans
}

fn required<T>(value: Option<&str>, owner: &str, id: &str, field: &str) -> Result<T, RecordError>
where
    T: FromStr<Err = UnknownKeywordError>,
{
    let value = value.ok_or_else(|| RecordError::missing(owner, id, field))?;
    value
        .parse()
        .map_err(|err| RecordError::keyword(owner, id, &err))
}

fn node(record: NodeRecord) -> Result<Node, RecordError> {
    let id = record.id.as_str();
    let kind = match record.kind.as_str() {
        "event" => {
            let stage = required(record.stage.as_deref(), "node", id, "stage")?;
            let trigger = match record.trigger.as_deref() {
                Some(trigger) => trigger
                    .parse()
                    .map_err(|err| RecordError::keyword("node", id, &err))?,
                None => EventTrigger::None,
            };
            NodeKind::Event { stage, trigger }
        }
        "task" => NodeKind::Task(required(record.task.as_deref(), "node", id, "task")?),
        "gateway" => NodeKind::Gateway(required(record.gateway.as_deref(), "node", id, "gateway")?),
        "data-object" => NodeKind::DataObject,
        "data-store-reference" => NodeKind::DataStoreReference,
        "pool" => NodeKind::Pool {
            members: record.members.clone().unwrap_or_default(),
        },
        "lane" => NodeKind::Lane {
            members: record.members.clone().unwrap_or_default(),
        },
        "entity" => {
            let attributes: AttributeList = record
                .attributes
                .iter()
                .flatten()
                .map(attribute)
                .collect();
            NodeKind::Entity { attributes }
        }
        "relationship" => NodeKind::Relationship,
        "process" => NodeKind::Process,
        "data-store" => NodeKind::DataStore,
        "external-entity" => NodeKind::ExternalEntity,
        other => {
            return Err(RecordError {
                code: DiagnosticCode::E202,
                message: format!("node `{id}` has unknown kind `{other}`"),
            });
        }
    };

    let mut node = Node::new(record.id, kind, record.label).with_extensions(record.extensions);
    node.set_position(record.position);
    Ok(node)
}

fn attribute(record: &AttributeRecord) -> Attribute {
    let mut attribute = Attribute::new(record.name.as_str(), record.data_type.as_str())
        .with_primary(record.primary)
        .with_unique(record.unique)
        .with_nullable(record.nullable);
    attribute.set_size(record.size.clone());
    attribute.set_default(record.default.clone());
    attribute.set_foreign_key(record.foreign_key.as_ref().map(|foreign_key| {
        ForeignKey::new(
            foreign_key.entity_id.as_str(),
            foreign_key.entity_name.as_str(),
            foreign_key.attribute_name.as_str(),
        )
    }));
    *attribute.extensions_mut() = record.extensions.clone();
    attribute
}

fn edge(record: EdgeRecord) -> Result<Edge, RecordError> {
    let id = record.id.as_str();
    let kind = match record.kind.as_str() {
        "sequence-flow" => EdgeKind::SequenceFlow,
        "default-flow" => EdgeKind::DefaultFlow,
        "conditional-flow" => EdgeKind::ConditionalFlow {
            condition: record
                .condition
                .clone()
                .ok_or_else(|| RecordError::missing("edge", id, "condition"))?,
        },
        "message-flow" => EdgeKind::MessageFlow,
        "association" => EdgeKind::Association,
        "data-association" => EdgeKind::DataAssociation,
        "compensation-flow" => EdgeKind::CompensationFlow,
        "relationship" => EdgeKind::Relationship(relationship(&record)?),
        "data-flow" => EdgeKind::DataFlow,
        other => {
            return Err(RecordError {
                code: DiagnosticCode::E202,
                message: format!("edge `{id}` has unknown kind `{other}`"),
            });
        }
    };

    let mut edge = Edge::new(record.id, record.source, record.target, kind)
        .with_extensions(record.extensions);
    edge.set_label(record.label);
    Ok(edge)
}

/// Missing relationship fields fall back to [`Relationship::default`].
fn relationship(record: &EdgeRecord) -> Result<Relationship, RecordError> {
    let defaults = Relationship::default();
    let cardinality = |value: Option<&str>, fallback: Cardinality| match value {
        Some(value) => value
            .parse()
            .map_err(|err| RecordError::keyword("edge", &record.id, &err)),
        None => Ok(fallback),
    };

    Ok(Relationship::new(
        RelationshipEnd::new(
            cardinality(
                record.source_cardinality.as_deref(),
                defaults.source.cardinality,
            )?,
            record.source_optional.unwrap_or(defaults.source.optional),
        ),
        RelationshipEnd::new(
            cardinality(
                record.target_cardinality.as_deref(),
                defaults.target.cardinality,
            )?,
            record.target_optional.unwrap_or(defaults.target.optional),
        ),
        record.identifying.unwrap_or(defaults.identifying),
    ))
}
