//! Writes entity-relationship graphs as `CREATE TABLE` scripts.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use log::debug;
use petgraph::{
    Direction,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};

use schematic_core::{Attribute, AttributeList, EdgeKind, Graph, NodeKind};

use crate::{ExportOptions, error::ExportError, sql::Dialect};

const FORMAT: &str = "SQL DDL";
const INDENT: &str = "    ";

/// One `FOREIGN KEY` clause. References that together cover a composite
/// primary key share a clause.
struct ForeignKeyClause {
    columns: Vec<String>,
    target_table: String,
    target_columns: Vec<String>,
    /// Position of the referenced table in [`Schema::tables`].
    target_index: Option<usize>,
}

struct Table<'g> {
    name: String,
    attributes: &'g AttributeList,
    foreign_keys: Vec<ForeignKeyClause>,
}

struct Schema<'g> {
    dialect: Dialect,
    tables: Vec<Table<'g>>,
    /// Table names that differ from another only in case; quoted so
    /// PostgreSQL does not fold them together.
    case_sensitive: HashSet<String>,
}

/// The table name of an entity node: its label, or its id when unlabeled.
fn table_name(id: &str, label: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        id.to_string()
    } else {
        label.to_string()
    }
}

fn check_preconditions(graph: &Graph) -> Result<(), ExportError> {
    if let Some(node) = graph.nodes().iter().find(|node| {
        !matches!(
            node.kind(),
            NodeKind::Entity { .. } | NodeKind::Relationship
        )
    }) {
        return Err(ExportError::precondition(
            FORMAT,
            format!(
                "node `{}` is a {} node; only entity-relationship diagrams can be written as SQL",
                node.id(),
                node.kind().tag()
            ),
        ));
    }

    if let Some(edge) = graph
        .edges()
        .iter()
        .find(|edge| !matches!(edge.kind(), EdgeKind::Relationship(_)))
    {
        return Err(ExportError::precondition(
            FORMAT,
            format!(
                "edge `{}` is a {} edge; only relationships can be written as SQL",
                edge.id(),
                edge.kind().tag()
            ),
        ));
    }

    Ok(())
}

impl<'g> Schema<'g> {
    fn new(graph: &'g Graph, dialect: Dialect) -> Self {
        let mut tables = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for node in graph.nodes() {
            let Some(attributes) = node.kind().attributes() else {
                debug!(node = node.id(); "Omitting relationship node from SQL");
                continue;
            };
            positions.insert(node.id(), tables.len());
            tables.push(Table {
                name: table_name(node.id(), node.label()),
                attributes,
                foreign_keys: Vec::new(),
            });
        }

        let names: Vec<String> = tables.iter().map(|t| t.name.clone()).collect();
        let primary_keys: Vec<Vec<String>> = tables
            .iter()
            .map(|t| t.attributes.primary_keys().map(|a| a.name().to_string()).collect())
            .collect();
        for table in &mut tables {
            let single = table
                .attributes
                .iter()
                .filter_map(|attribute| {
                    let fk = attribute.foreign_key()?;
                    let target_index = positions.get(fk.entity_id()).copied();
                    let target_table = match target_index {
                        Some(index) => names[index].clone(),
                        None if !fk.entity_name().is_empty() => fk.entity_name().to_string(),
                        None => fk.entity_id().to_string(),
                    };
                    Some(ForeignKeyClause {
                        columns: vec![attribute.name().to_string()],
                        target_table,
                        target_columns: vec![fk.attribute_name().to_string()],
                        target_index,
                    })
                })
                .collect();
            table.foreign_keys = group_composite_references(single, &primary_keys);
        }

        let mut case_sensitive = HashSet::new();
        if dialect == Dialect::Postgresql {
            let mut folded: HashMap<String, &str> = HashMap::new();
            for name in &names {
                if let Some(other) = folded.insert(name.to_lowercase(), name) {
                    case_sensitive.insert(other.to_string());
                    case_sensitive.insert(name.clone());
                }
            }
        }

        Self {
            dialect,
            tables,
            case_sensitive,
        }
    }

    fn quote(&self, ident: &str) -> String {
        self.dialect.quote_identifier(ident)
    }

    fn quote_table(&self, name: &str) -> String {
        if self.case_sensitive.contains(name) {
            self.dialect.quote_exact(name)
        } else {
            self.quote(name)
        }
    }

    fn quote_list(&self, idents: &[String]) -> String {
        idents
            .iter()
            .map(|ident| self.quote(ident))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Table order that creates referenced tables first, or `None` if the
    /// references form a cycle.
    fn dependency_order(&self) -> Option<Vec<usize>> {
        let mut deps: DiGraph<usize, ()> = DiGraph::new();
        let indices: Vec<NodeIndex> = (0..self.tables.len()).map(|i| deps.add_node(i)).collect();

        for (owner, table) in self.tables.iter().enumerate() {
            for fk in &table.foreign_keys {
                match fk.target_index {
                    Some(target) if target != owner => {
                        deps.update_edge(indices[target], indices[owner], ());
                    }
                    _ => {}
                }
            }
        }

        if let Err(cycle) = toposort(&deps, None) {
            let table = &self.tables[deps[cycle.node_id()]];
            debug!(
                table = table.name.as_str();
                "Referential cycle, foreign keys are added with ALTER TABLE"
            );
            return None;
        }

        // Kahn's algorithm, always releasing the earliest-defined table, so
        // independent tables keep their graph order.
        let mut in_degree: Vec<usize> = indices
            .iter()
            .map(|&index| deps.neighbors_directed(index, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.tables.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for next in deps.neighbors_directed(indices[i], Direction::Outgoing) {
                let j = deps[next];
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    ready.push(Reverse(j));
                }
            }
        }
        Some(order)
    }

    fn column_definition(&self, attribute: &Attribute, single_key: bool) -> String {
        let data_type = if attribute.data_type().trim().is_empty() {
            "TEXT".to_string()
        } else {
            self.dialect
                .render_type(attribute.data_type(), attribute.size())
        };

        let mut line = format!("{} {}", self.quote(attribute.name()), data_type);
        if attribute.is_primary() && single_key {
            line.push_str(" PRIMARY KEY");
        } else if !attribute.is_nullable() {
            line.push_str(" NOT NULL");
        }
        if attribute.is_unique() && !attribute.is_primary() {
            line.push_str(" UNIQUE");
        }
        if let Some(default) = attribute.default() {
            line.push_str(" DEFAULT ");
            line.push_str(default);
        }
        line
    }

    fn references(&self, fk: &ForeignKeyClause) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_list(&fk.columns),
            self.quote_table(&fk.target_table),
            self.quote_list(&fk.target_columns)
        )
    }

    fn create_table(&self, table: &Table<'_>, inline_foreign_keys: bool) -> String {
        let keys: Vec<&Attribute> = table.attributes.primary_keys().collect();
        let single_key = keys.len() == 1;

        let mut lines: Vec<String> = table
            .attributes
            .iter()
            .map(|attribute| self.column_definition(attribute, single_key))
            .collect();

        if keys.len() > 1 {
            let columns: Vec<String> = keys.iter().map(|a| self.quote(a.name())).collect();
            lines.push(format!("PRIMARY KEY ({})", columns.join(", ")));
        }
        if inline_foreign_keys {
            lines.extend(table.foreign_keys.iter().map(|fk| self.references(fk)));
        }

        let name = self.quote_table(&table.name);
        if lines.is_empty() {
            return format!("CREATE TABLE {name} ();");
        }

        let body: Vec<String> = lines.iter().map(|line| format!("{INDENT}{line}")).collect();
        format!("CREATE TABLE {name} (\n{}\n);", body.join(",\n"))
    }

    fn alter_table(&self, table: &Table<'_>, fk: &ForeignKeyClause) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {};",
            self.quote_table(&table.name),
            self.quote(&format!("fk_{}_{}", table.name, fk.columns.join("_"))),
            self.references(fk)
        )
    }

    fn create_index(&self, table: &Table<'_>, fk: &ForeignKeyClause) -> String {
        format!(
            "CREATE INDEX {} ON {} ({});",
            self.quote(&format!("idx_{}_{}", table.name, fk.columns.join("_"))),
            self.quote_table(&table.name),
            self.quote_list(&fk.columns)
        )
    }
}

/// Merges single-column references into one clause wherever they reach the
/// same table and together cover its composite primary key. The merged
/// clause takes the place of its first member and lists columns in key
/// order.
fn group_composite_references(
    single: Vec<ForeignKeyClause>,
    primary_keys: &[Vec<String>],
) -> Vec<ForeignKeyClause> {
    let mut slots: Vec<Option<ForeignKeyClause>> = single.into_iter().map(Some).collect();
    let mut clauses = Vec::with_capacity(slots.len());

    for first in 0..slots.len() {
        let Some(clause) = slots[first].take() else {
            continue;
        };
        let keys = clause
            .target_index
            .map(|index| primary_keys[index].as_slice())
            .unwrap_or_default();
        if keys.len() < 2 || !keys.contains(&clause.target_columns[0]) {
            clauses.push(clause);
            continue;
        }

        let target_index = clause.target_index;
        let target_table = clause.target_table.clone();
        slots[first] = Some(clause);

        // For each key column, the earliest unclaimed reference to it.
        let members: Option<Vec<usize>> = keys
            .iter()
            .map(|key| {
                (first..slots.len()).find(|&i| {
                    slots[i].as_ref().is_some_and(|c| {
                        c.target_index == target_index && c.target_columns[0] == *key
                    })
                })
            })
            .collect();

        match members {
            Some(members) => {
                let mut columns = Vec::with_capacity(members.len());
                for i in members {
                    if let Some(member) = slots[i].take() {
                        columns.extend(member.columns);
                    }
                }
                clauses.push(ForeignKeyClause {
                    columns,
                    target_table,
                    target_columns: keys.to_vec(),
                    target_index,
                });
            }
            None => {
                if let Some(clause) = slots[first].take() {
                    clauses.push(clause);
                }
            }
        }
    }
    clauses
}

/// Export an entity-relationship graph as a DDL script.
pub(crate) fn export(
    graph: &Graph,
    dialect: Dialect,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    check_preconditions(graph)?;

    let schema = Schema::new(graph, dialect);

    let (order, inline_foreign_keys) = if dialect.allows_forward_references() {
        ((0..schema.tables.len()).collect(), true)
    } else {
        match schema.dependency_order() {
            Some(order) => (order, true),
            None => ((0..schema.tables.len()).collect::<Vec<_>>(), false),
        }
    };

    let mut statements: Vec<String> = order
        .iter()
        .map(|&i| schema.create_table(&schema.tables[i], inline_foreign_keys))
        .collect();

    if !inline_foreign_keys {
        for &i in &order {
            let table = &schema.tables[i];
            statements.extend(table.foreign_keys.iter().map(|fk| schema.alter_table(table, fk)));
        }
    }

    if options.emit_indexes() {
        for &i in &order {
            let table = &schema.tables[i];
            statements.extend(table.foreign_keys.iter().map(|fk| schema.create_index(table, fk)));
        }
    }

    let mut out = String::new();
    if options.header() {
        out.push_str("-- Generated by schematic\n");
        out.push_str(&format!("-- Dialect: {dialect}\n"));
        if let Some(name) = graph.name() {
            out.push_str(&format!("{} {}\n", super::import::DIAGRAM_COMMENT, name));
        }
        out.push('\n');
    }
    out.push_str(&statements.join("\n\n"));
    out.push('\n');

    debug!(
        dialect:% = dialect,
        tables = schema.tables.len(),
        inline_foreign_keys = inline_foreign_keys;
        "DDL written"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schematic_core::{Edge, ForeignKey, Node, Relationship, TaskKind};

    fn entity(id: &str, attributes: Vec<Attribute>) -> Node {
        Node::new(id, NodeKind::entity(attributes), id)
    }

    fn key(name: &str) -> Attribute {
        Attribute::new(name, "INT").with_primary(true)
    }

    fn reference(name: &str, entity: &str) -> Attribute {
        Attribute::new(name, "INT")
            .with_nullable(false)
            .with_foreign_key(ForeignKey::new(entity, entity, "id"))
    }

    fn library() -> Graph {
        let mut graph = Graph::named("Library");
        graph
            .add_node(entity("Book", vec![key("id"), reference("author_id", "Author")]))
            .unwrap();
        graph
            .add_node(entity(
                "Author",
                vec![key("id"), Attribute::new("name", "VARCHAR").with_size("80").with_nullable(false)],
            ))
            .unwrap();
        graph
            .add_edge(Edge::new(
                "fk_Book_author_id",
                "Book",
                "Author",
                EdgeKind::Relationship(Relationship::default()),
            ))
            .unwrap();
        graph
    }

    fn export_default(graph: &Graph, dialect: Dialect) -> String {
        export(graph, dialect, &ExportOptions::default()).unwrap()
    }

    #[test]
    fn test_referenced_table_comes_first() {
        let sql = export_default(&library(), Dialect::Postgresql);
        let author = sql.find("CREATE TABLE Author").unwrap();
        let book = sql.find("CREATE TABLE Book").unwrap();
        assert!(author < book);
        assert!(sql.contains("FOREIGN KEY (author_id) REFERENCES Author (id)"));
    }

    #[test]
    fn test_postgresql_output() {
        let sql = export_default(&library(), Dialect::Postgresql);
        assert_eq!(
            sql,
            "-- Generated by schematic\n\
             -- Dialect: postgresql\n\
             -- Diagram: Library\n\
             \n\
             CREATE TABLE Author (\n    \
                 id INTEGER PRIMARY KEY,\n    \
                 name VARCHAR(80) NOT NULL\n\
             );\n\
             \n\
             CREATE TABLE Book (\n    \
                 id INTEGER PRIMARY KEY,\n    \
                 author_id INTEGER NOT NULL,\n    \
                 FOREIGN KEY (author_id) REFERENCES Author (id)\n\
             );\n"
        );
    }

    #[test]
    fn test_sqlite_keeps_graph_order() {
        let sql = export_default(&library(), Dialect::Sqlite);
        assert!(sql.find("CREATE TABLE Book").unwrap() < sql.find("CREATE TABLE Author").unwrap());
    }

    #[test]
    fn test_cycle_uses_alter_table() {
        let mut graph = Graph::new();
        graph
            .add_node(entity("a", vec![key("id"), reference("b_id", "b")]))
            .unwrap();
        graph
            .add_node(entity("b", vec![key("id"), reference("a_id", "a")]))
            .unwrap();

        let sql = export(&graph, Dialect::Mysql, &ExportOptions::default().with_header(false)).unwrap();
        assert!(!sql.contains("-- Generated"));
        assert!(sql.starts_with("CREATE TABLE a"));
        assert!(!sql.contains(",\n    FOREIGN KEY"));
        assert!(sql.contains("ALTER TABLE a ADD CONSTRAINT fk_a_b_id FOREIGN KEY (b_id) REFERENCES b (id);"));
        assert!(sql.contains("ALTER TABLE b ADD CONSTRAINT fk_b_a_id FOREIGN KEY (a_id) REFERENCES a (id);"));
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let mut graph = Graph::new();
        graph
            .add_node(entity(
                "employee",
                vec![key("id"), reference("manager_id", "employee").with_nullable(true)],
            ))
            .unwrap();
        let sql = export_default(&graph, Dialect::Postgresql);
        assert!(sql.contains("FOREIGN KEY (manager_id) REFERENCES employee (id)"));
        assert!(!sql.contains("ALTER TABLE"));
    }

    #[test]
    fn test_composite_key_and_quoting() {
        let mut graph = Graph::new();
        graph
            .add_node(Node::new(
                "e1",
                NodeKind::entity(vec![
                    key("order"),
                    key("line no"),
                    Attribute::new("flag", "BOOLEAN").with_default("0"),
                    Attribute::new("code", "VARCHAR").with_unique(true),
                ]),
                "line item",
            ))
            .unwrap();

        let sql = export(&graph, Dialect::Mysql, &ExportOptions::default().with_header(false)).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE `line item` (\n    \
                 `order` INT NOT NULL,\n    \
                 `line no` INT NOT NULL,\n    \
                 flag TINYINT(1) DEFAULT 0,\n    \
                 code VARCHAR(255) UNIQUE,\n    \
                 PRIMARY KEY (`order`, `line no`)\n\
             );\n"
        );
    }

    fn part(name: &str, entity: &str, column: &str) -> Attribute {
        Attribute::new(name, "INT")
            .with_nullable(false)
            .with_foreign_key(ForeignKey::new(entity, entity, column))
    }

    fn composite() -> Graph {
        let mut graph = Graph::new();
        graph
            .add_node(entity(
                "line",
                vec![
                    key("id"),
                    part("part_b", "part", "b"),
                    part("part_a", "part", "a"),
                    part("origin", "part", "a").with_nullable(true),
                ],
            ))
            .unwrap();
        graph
            .add_node(entity("part", vec![key("a"), key("b")]))
            .unwrap();
        graph
    }

    #[test]
    fn test_composite_reference_is_one_clause() {
        let sql = export_default(&composite(), Dialect::Postgresql);
        assert!(sql.contains("FOREIGN KEY (part_a, part_b) REFERENCES part (a, b)"));
        assert!(!sql.contains("FOREIGN KEY (part_b)"));
        // Covers only half of the key, so it stays on its own.
        assert!(sql.contains("FOREIGN KEY (origin) REFERENCES part (a)"));
        assert_eq!(sql.matches("FOREIGN KEY").count(), 2);
    }

    #[test]
    fn test_composite_reference_in_alter_table_and_index() {
        let mut graph = composite();
        graph
            .node_mut("part")
            .unwrap()
            .kind_mut()
            .attributes_mut()
            .unwrap()
            .push(part("line_id", "line", "id").with_nullable(true));

        let sql = export(
            &graph,
            Dialect::Mysql,
            &ExportOptions::default().with_header(false).with_emit_indexes(true),
        )
        .unwrap();
        assert!(sql.contains(
            "ALTER TABLE line ADD CONSTRAINT fk_line_part_a_part_b \
             FOREIGN KEY (part_a, part_b) REFERENCES part (a, b);"
        ));
        assert!(sql.contains("CREATE INDEX idx_line_part_a_part_b ON line (part_a, part_b);"));
    }

    #[test]
    fn test_table_names_differing_in_case_are_quoted_on_postgresql() {
        let mut graph = Graph::new();
        graph.add_node(entity("users", vec![key("id")])).unwrap();
        graph
            .add_node(entity("Users", vec![key("id"), reference("peer", "users")]))
            .unwrap();

        let sql = export_default(&graph, Dialect::Postgresql);
        assert!(sql.contains("CREATE TABLE \"users\" ("));
        assert!(sql.contains("CREATE TABLE \"Users\" ("));
        assert!(sql.contains("REFERENCES \"users\" (id)"));

        let sql = export_default(&graph, Dialect::Sqlite);
        assert!(sql.contains("CREATE TABLE Users ("));
    }

    #[test]
    fn test_table_without_primary_key_is_emitted() {
        let mut graph = Graph::new();
        graph
            .add_node(entity("log", vec![Attribute::new("message", "TEXT")]))
            .unwrap();
        let sql = export_default(&graph, Dialect::Sqlite);
        assert!(sql.contains("CREATE TABLE log (\n    message TEXT\n);"));
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_emit_indexes() {
        let sql = export(
            &library(),
            Dialect::Postgresql,
            &ExportOptions::default().with_emit_indexes(true),
        )
        .unwrap();
        assert!(sql.ends_with("CREATE INDEX idx_Book_author_id ON Book (author_id);\n"));
    }

    #[test]
    fn test_relationship_nodes_are_omitted() {
        let mut graph = library();
        graph
            .add_node(Node::new("writes", NodeKind::Relationship, "writes"))
            .unwrap();
        let sql = export_default(&graph, Dialect::Postgresql);
        assert!(!sql.contains("writes"));
    }

    #[test]
    fn test_process_nodes_fail_precondition() {
        let mut graph = library();
        graph
            .add_node(Node::new("t1", NodeKind::Task(TaskKind::User), "Review"))
            .unwrap();
        let err = export(&graph, Dialect::Postgresql, &ExportOptions::default()).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("`t1`"));
    }
}
