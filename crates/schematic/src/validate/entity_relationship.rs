//! Entity-relationship rules.
//!
//! 1. An entity declares no primary key (error).
//! 2. An entity declares an attribute name twice, ignoring case (error).
//! 3. Two entities share a name, ignoring case (error).
//! 4. A foreign key names a missing entity or attribute, or an attribute
//!    that is not a primary key (error).
//! 5. A relationship edge touches a node that is neither an entity nor a
//!    relationship (error).
//! 6. A relationship edge contradicts a foreign key between its two
//!    entities (warning).
//! 7. A relationship edge is many-to-many (info).

use std::collections::{HashMap, HashSet};

use schematic_core::{
    Attribute, AttributeList, Cardinality, Edge, Node, NodeKind, Relationship, RelationshipKind,
};

use super::{Context, Issue};

/// The name an entity is known by: its label, or its id when unlabeled.
fn entity_name(node: &Node) -> &str {
    let label = node.label().trim();
    if label.is_empty() { node.id() } else { label }
}

pub(super) fn check(context: &Context<'_>, issues: &mut Vec<Issue>) {
    let entities: Vec<(&Node, &AttributeList)> = context
        .nodes
        .iter()
        .filter_map(|node| node.kind().attributes().map(|attributes| (node, attributes)))
        .collect();
    let relationships: Vec<(&Edge, &Relationship)> = context
        .edges
        .iter()
        .filter_map(|edge| edge.kind().relationship().map(|rel| (edge, rel)))
        .collect();

    for (node, attributes) in &entities {
        if attributes.primary_keys().next().is_none() {
            issues.push(
                Issue::error(format!(
                    "entity `{}` has no primary key",
                    entity_name(node)
                ))
                .on_node(node.id()),
            );
        }
    }

    for (node, attributes) in &entities {
        let mut seen = HashSet::new();
        for attribute in attributes.iter() {
            if !seen.insert(attribute.name().to_lowercase()) {
                issues.push(
                    Issue::error(format!(
                        "entity `{}` declares attribute `{}` more than once",
                        entity_name(node),
                        attribute.name()
                    ))
                    .on_node(node.id()),
                );
            }
        }
    }

    let mut names: HashMap<String, &str> = HashMap::new();
    for (node, _) in &entities {
        let name = entity_name(node);
        if let Some(first) = names.get(&name.to_lowercase()) {
            issues.push(
                Issue::error(format!(
                    "duplicate entity name `{name}`; `{first}` already uses it"
                ))
                .on_node(node.id()),
            );
        } else {
            names.insert(name.to_lowercase(), node.id());
        }
    }

    for (node, attributes) in &entities {
        for attribute in attributes.iter() {
            let Some(foreign_key) = attribute.foreign_key() else {
                continue;
            };
            let target = context
                .node(foreign_key.entity_id())
                .and_then(|target| target.kind().attributes())
                .and_then(|target| target.get(foreign_key.attribute_name()));
            if target.is_some_and(|target| target.is_primary()) {
                continue;
            }

            let target_name = context
                .node(foreign_key.entity_id())
                .filter(|target| matches!(target.kind(), NodeKind::Entity { .. }))
                .map_or(foreign_key.entity_name(), entity_name);
            issues.push(
                Issue::error(format!(
                    "dangling or non-key foreign key reference: `{}.{}` references `{}.{}`",
                    entity_name(node),
                    attribute.name(),
                    target_name,
                    foreign_key.attribute_name()
                ))
                .on_node(node.id()),
            );
        }
    }

    for (edge, _) in &relationships {
        let invalid: Vec<&str> = [edge.source(), edge.target()]
            .into_iter()
            .filter(|id| {
                !context.node(id).is_some_and(|node| {
                    matches!(node.kind(), NodeKind::Entity { .. } | NodeKind::Relationship)
                })
            })
            .collect();
        if let Some(first) = invalid.first() {
            issues.push(
                Issue::error(format!(
                    "relationship `{}` connects `{first}`, which is not an entity or relationship",
                    edge.id()
                ))
                .on_edge(edge.id()),
            );
        }
    }

    for (edge, relationship) in &relationships {
        if let Some(message) = contradiction(context, edge, relationship) {
            issues.push(Issue::warning(message).on_edge(edge.id()));
        }
    }

    for (edge, relationship) in &relationships {
        if relationship.kind() == RelationshipKind::ManyToMany {
            issues.push(
                Issue::info(format!(
                    "relationship `{}` is many-to-many and requires a junction table",
                    edge.id()
                ))
                .on_edge(edge.id()),
            );
        }
    }
}

/// Cardinalities a foreign key implies for an edge, as (source, target).
struct Implied {
    reference: String,
    source: Cardinality,
    target: Cardinality,
}

/// A foreign key reads as "many owning rows to one referenced row", or
/// one-to-one when the key column is unique on its own. Members of a
/// composite primary key are not.
fn owner_side(attributes: &AttributeList, attribute: &Attribute) -> Cardinality {
    let composite_key = attribute.is_primary() && attributes.primary_keys().nth(1).is_some();
    if attribute.is_unique() && !composite_key {
        Cardinality::One
    } else {
        Cardinality::Many
    }
}

/// Describes the mismatch when no foreign key between the edge's entities
/// agrees with its cardinalities.
fn contradiction(context: &Context<'_>, edge: &Edge, relationship: &Relationship) -> Option<String> {
    let source = context.node(edge.source())?;
    let target = context.node(edge.target())?;
    let source_attributes = source.kind().attributes()?;
    let target_attributes = target.kind().attributes()?;

    let mut implied = Vec::new();
    for attribute in source_attributes.iter() {
        if attribute
            .foreign_key()
            .is_some_and(|foreign_key| foreign_key.entity_id() == target.id())
        {
            implied.push(Implied {
                reference: format!("{}.{}", entity_name(source), attribute.name()),
                source: owner_side(source_attributes, attribute),
                target: Cardinality::One,
            });
        }
    }
    for attribute in target_attributes.iter() {
        if attribute
            .foreign_key()
            .is_some_and(|foreign_key| foreign_key.entity_id() == source.id())
        {
            implied.push(Implied {
                reference: format!("{}.{}", entity_name(target), attribute.name()),
                source: Cardinality::One,
                target: owner_side(target_attributes, attribute),
            });
        }
    }

    let declared = (relationship.source.cardinality, relationship.target.cardinality);
    if implied.is_empty()
        || implied
            .iter()
            .any(|implied| (implied.source, implied.target) == declared)
    {
        return None;
    }

    let first = &implied[0];
    Some(format!(
        "relationship `{}` is {}-to-{} but foreign key `{}` implies {}-to-{}",
        edge.id(),
        declared.0,
        declared.1,
        first.reference,
        first.source,
        first.target
    ))
}

#[cfg(test)]
mod tests {
    use schematic_core::{EdgeKind, ForeignKey, Notation, RelationshipEnd};

    use crate::validate::{ElementType, ValidationResult, validate};

    use super::*;

    fn entity(id: &str, attributes: Vec<Attribute>) -> Node {
        Node::new(id, NodeKind::entity(attributes), id)
    }

    fn key(name: &str) -> Attribute {
        Attribute::new(name, "INT").with_primary(true)
    }

    fn reference(name: &str, entity: &str, attribute: &str) -> Attribute {
        Attribute::new(name, "INT").with_foreign_key(ForeignKey::new(entity, entity, attribute))
    }

    fn relationship(id: &str, source: &str, target: &str, rel: Relationship) -> Edge {
        Edge::new(id, source, target, EdgeKind::Relationship(rel))
    }

    fn many_to_one() -> Relationship {
        Relationship::default()
    }

    fn check(nodes: &[Node], edges: &[Edge]) -> ValidationResult {
        validate(Notation::EntityRelationship, nodes, edges)
    }

    fn order_and_item(target_attribute: &str) -> Vec<Node> {
        vec![
            entity(
                "Order",
                vec![key("id"), Attribute::new("notes", "TEXT")],
            ),
            entity(
                "Item",
                vec![key("id"), reference("order_ref", "Order", target_attribute)],
            ),
        ]
    }

    #[test]
    fn test_foreign_key_to_primary_key_is_valid() {
        let result = check(&order_and_item("id"), &[]);
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn test_foreign_key_to_non_key_attribute() {
        let result = check(&order_and_item("notes"), &[]);

        let errors: Vec<_> = result.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message().contains("dangling or non-key foreign key reference"));
        assert!(errors[0].message().contains("Item.order_ref"));
        assert_eq!(errors[0].element_id(), Some("Item"));
    }

    #[test]
    fn test_dangling_foreign_key() {
        let nodes = [entity("Item", vec![key("id"), reference("order_ref", "Order", "id")])];
        let result = check(&nodes, &[]);
        assert_eq!(
            result.errors().next().unwrap().message(),
            "dangling or non-key foreign key reference: `Item.order_ref` references `Order.id`"
        );
    }

    #[test]
    fn test_missing_primary_key() {
        let nodes = [entity("Log", vec![Attribute::new("line", "TEXT")])];
        let result = check(&nodes, &[]);
        assert_eq!(
            result.errors().next().unwrap().message(),
            "entity `Log` has no primary key"
        );
    }

    #[test]
    fn test_duplicate_names_ignore_case() {
        let nodes = [
            entity("a", vec![key("id"), Attribute::new("Name", "TEXT"), Attribute::new("name", "TEXT")]),
            Node::new("b", NodeKind::entity(vec![key("id")]), "A"),
        ];
        let result = check(&nodes, &[]);

        let messages: Vec<_> = result.errors().map(|issue| issue.message()).collect();
        assert_eq!(
            messages,
            [
                "entity `a` declares attribute `name` more than once",
                "duplicate entity name `A`; `a` already uses it",
            ]
        );
    }

    #[test]
    fn test_relationship_endpoint_kinds() {
        let nodes = [
            entity("a", vec![key("id")]),
            Node::new("diamond", NodeKind::Relationship, "owns"),
            Node::new("p", NodeKind::Process, "Process"),
        ];
        let edges = [
            relationship("ok", "a", "diamond", many_to_one()),
            relationship("bad", "a", "p", many_to_one()),
            relationship("ghost", "nowhere", "a", many_to_one()),
        ];
        let result = check(&nodes, &edges);

        let errors: Vec<_> = result.errors().collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].element_id(), Some("bad"));
        assert_eq!(errors[0].element_type(), Some(ElementType::Edge));
        assert!(errors[1].message().contains("`nowhere`"));
    }

    #[test]
    fn test_cardinality_contradicting_foreign_key() {
        let nodes = [
            entity("Author", vec![key("id")]),
            entity("Book", vec![key("id"), reference("author_id", "Author", "id")]),
        ];
        let consistent = relationship("r1", "Book", "Author", many_to_one());
        let reversed = relationship(
            "r2",
            "Author",
            "Book",
            Relationship::new(
                RelationshipEnd::new(Cardinality::One, false),
                RelationshipEnd::new(Cardinality::Many, true),
                false,
            ),
        );
        let wrong = relationship(
            "r3",
            "Book",
            "Author",
            Relationship::new(
                RelationshipEnd::new(Cardinality::One, false),
                RelationshipEnd::new(Cardinality::One, false),
                false,
            ),
        );
        let result = check(&nodes, &[consistent, reversed, wrong]);

        let warnings: Vec<_> = result.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message(),
            "relationship `r3` is one-to-one but foreign key `Book.author_id` implies many-to-one"
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_composite_key_member_reads_as_many() {
        let nodes = [
            entity("student", vec![key("id")]),
            entity("course", vec![key("id")]),
            entity(
                "enrollment",
                vec![
                    key("student_id")
                        .with_foreign_key(ForeignKey::new("student", "student", "id")),
                    key("course_id").with_foreign_key(ForeignKey::new("course", "course", "id")),
                ],
            ),
        ];
        let edges = [relationship("r", "enrollment", "student", many_to_one())];
        assert!(check(&nodes, &edges).is_empty());
    }

    #[test]
    fn test_relationship_without_foreign_key_is_not_checked() {
        let nodes = [entity("a", vec![key("id")]), entity("b", vec![key("id")])];
        let edges = [relationship("r", "a", "b", many_to_one())];
        assert!(check(&nodes, &edges).is_empty());
    }

    #[test]
    fn test_many_to_many_needs_junction_table() {
        let nodes = [entity("a", vec![key("id")]), entity("b", vec![key("id")])];
        let edges = [relationship(
            "r",
            "a",
            "b",
            Relationship::new(
                RelationshipEnd::new(Cardinality::Many, true),
                RelationshipEnd::new(Cardinality::Many, true),
                false,
            ),
        )];
        let result = check(&nodes, &edges);

        let infos: Vec<_> = result.infos().collect();
        assert_eq!(infos.len(), 1);
        assert!(infos[0].message().contains("junction table"));
        assert!(result.is_valid());
    }
}
