//! Builds an entity-relationship graph from DDL statements.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use schematic_core::{
    Attribute, AttributeList, Cardinality, Edge, EdgeKind, ForeignKey, Graph, Node, NodeKind,
    Relationship, RelationshipEnd,
};

use crate::{
    Imported,
    error::{Diagnostic, DiagnosticCode, DiagnosticCollector, MalformedInputError},
    span::Span,
    sql::{
        Dialect,
        ast::{ColumnConstraint, ColumnDef, CreateTable, Ident, Statement, TableConstraint},
        lexer, parser,
        tokens::Token,
    },
};

/// Line comment that names the diagram, as written by the exporter.
pub(crate) const DIAGRAM_COMMENT: &str = "-- Diagram:";

struct Table {
    /// Node id: the table name, suffixed when another table already uses it.
    id: String,
    name: Ident,
    attributes: AttributeList,
    /// Columns that are unique on their own (a sole primary key or `UNIQUE`).
    individually_unique: HashSet<String>,
}

/// A foreign-key column waiting for every table to be known.
struct PendingForeignKey {
    table: String,
    column: Ident,
    reference_table: Ident,
    reference_column: Option<Ident>,
    /// Position of the column inside a composite key.
    position: usize,
}

/// Finds a column by exact name, then ignoring case.
fn find_column(attributes: &AttributeList, name: &str) -> Option<String> {
    attributes
        .get(name)
        .or_else(|| attributes.iter().find(|a| a.name().eq_ignore_ascii_case(name)))
        .map(|a| a.name().to_string())
}

/// `base`, or `base_2`, `base_3`, ... when `base` is taken.
fn unique_id(taken: &mut HashSet<String>, base: &str) -> String {
    let mut id = base.to_string();
    let mut suffix = 2;
    while !taken.insert(id.clone()) {
        id = format!("{base}_{suffix}");
        suffix += 1;
    }
    id
}

/// `10, 2` -> `10,2`
fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Lookup key of a table name. PostgreSQL folds unquoted names to lower
/// case and matches quoted ones exactly; MySQL and SQLite table names are
/// case-insensitive either way.
fn table_key(name: &Ident, dialect: Dialect) -> String {
    if name.quoted && dialect == Dialect::Postgresql {
        name.value.clone()
    } else {
        name.value.to_lowercase()
    }
}

struct SchemaBuilder<'src> {
    src: &'src str,
    dialect: Dialect,
    /// Tables keyed by [`table_key`], in definition order.
    tables: IndexMap<String, Table>,
    foreign_keys: Vec<PendingForeignKey>,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
    diagnostics: DiagnosticCollector,
}

impl<'src> SchemaBuilder<'src> {
    fn new(src: &'src str, dialect: Dialect) -> Self {
        Self {
            src,
            dialect,
            tables: IndexMap::new(),
            foreign_keys: Vec::new(),
            node_ids: HashSet::new(),
            edge_ids: HashSet::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn apply(&mut self, statement: Statement) {
        match statement {
            Statement::CreateTable(create) => self.create_table(create),
            Statement::AlterTable(alter) => {
                let key = table_key(&alter.table, self.dialect);
                if !self.tables.contains_key(&key) {
                    self.diagnostics.emit(
                        Diagnostic::warning(format!(
                            "ALTER TABLE targets unknown table `{}`",
                            alter.table.value
                        ))
                        .with_code(DiagnosticCode::W103)
                        .with_label(alter.table.span, "not defined before this statement"),
                    );
                    return;
                }
                for constraint in alter.constraints {
                    self.table_constraint(&key, constraint);
                }
            }
            Statement::CreateIndex => debug!("Ignoring CREATE INDEX statement"),
            Statement::Other { summary, span } => {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("unsupported statement `{summary}` skipped"))
                        .with_code(DiagnosticCode::W101)
                        .with_label(span, "skipped")
                        .with_help("only CREATE TABLE and foreign-key ALTER TABLE statements are imported"),
                );
            }
        }
    }

    fn create_table(&mut self, create: CreateTable) {
        let key = table_key(&create.name, self.dialect);
        if let Some(existing) = self.tables.get(&key) {
            self.diagnostics.emit(
                Diagnostic::warning(format!("duplicate table `{}` skipped", create.name.value))
                    .with_code(DiagnosticCode::W104)
                    .with_label(create.name.span, "defined again here")
                    .with_secondary_label(existing.name.span, "first defined here"),
            );
            return;
        }

        let mut table = Table {
            id: unique_id(&mut self.node_ids, &create.name.value),
            name: create.name,
            attributes: AttributeList::new(),
            individually_unique: HashSet::new(),
        };
        for column in create.columns {
            self.column(&mut table, &key, column);
        }
        trace!(table = table.name.value.as_str(), columns = table.attributes.len(); "Table defined");

        self.tables.insert(key.clone(), table);
        for constraint in create.constraints {
            self.table_constraint(&key, constraint);
        }
    }

    fn column(&mut self, table: &mut Table, key: &str, column: ColumnDef) {
        let (data_type, size) = match &column.data_type {
            Some(data_type) => {
                let size = data_type.size.map(|span| compact(span.slice(self.src)));
                self.dialect.canonical_type(&data_type.name, size.as_deref())
            }
            // SQLite's default column affinity.
            None => ("TEXT".to_string(), None),
        };

        let name = column.name.value.clone();
        let mut attribute = Attribute::new(name.clone(), data_type);
        attribute.set_size(size);

        for constraint in column.constraints {
            match constraint {
                ColumnConstraint::NotNull => attribute.set_nullable(false),
                ColumnConstraint::Null | ColumnConstraint::Ignored => {}
                ColumnConstraint::PrimaryKey => {
                    attribute.set_primary(true);
                    table.individually_unique.insert(name.clone());
                }
                ColumnConstraint::Unique => {
                    attribute.set_unique(true);
                    table.individually_unique.insert(name.clone());
                }
                ColumnConstraint::Default(span) => {
                    attribute.set_default(Some(span.slice(self.src).to_string()));
                }
                ColumnConstraint::References(reference) => {
                    self.foreign_keys.push(PendingForeignKey {
                        table: key.to_string(),
                        column: column.name.clone(),
                        reference_table: reference.table,
                        reference_column: reference.columns.into_iter().next(),
                        position: 0,
                    });
                }
                ColumnConstraint::Check(span) => self.unsupported_constraint(span, "CHECK constraint"),
            }
        }

        table.attributes.push(attribute);
    }

    fn table_constraint(&mut self, key: &str, constraint: TableConstraint) {
        match constraint {
            TableConstraint::PrimaryKey(columns) => {
                let sole = columns.len() == 1;
                for column in &columns {
                    let Some(name) = self.resolve_column(key, column) else {
                        continue;
                    };
                    if let Some(table) = self.tables.get_mut(key) {
                        if let Some(attribute) = table.attributes.get_mut(&name) {
                            attribute.set_primary(true);
                        }
                        if sole {
                            table.individually_unique.insert(name);
                        }
                    }
                }
            }
            TableConstraint::Unique(columns) => {
                let [column] = columns.as_slice() else {
                    let span = columns
                        .iter()
                        .map(|c| c.span)
                        .reduce(|a, b| a.union(b))
                        .unwrap_or_default();
                    self.unsupported_constraint(span, "composite UNIQUE constraint");
                    return;
                };
                let Some(name) = self.resolve_column(key, column) else {
                    return;
                };
                if let Some(table) = self.tables.get_mut(key) {
                    if let Some(attribute) = table.attributes.get_mut(&name) {
                        attribute.set_unique(true);
                    }
                    table.individually_unique.insert(name);
                }
            }
            TableConstraint::ForeignKey { columns, reference } => {
                for (position, column) in columns.into_iter().enumerate() {
                    self.foreign_keys.push(PendingForeignKey {
                        table: key.to_string(),
                        column,
                        reference_table: reference.table.clone(),
                        reference_column: reference.columns.get(position).cloned(),
                        position,
                    });
                }
            }
            TableConstraint::Check(span) => self.unsupported_constraint(span, "CHECK constraint"),
            TableConstraint::Index => debug!(table = key; "Ignoring inline index"),
        }
    }

    /// Actual name of `column` in table `key`, or a warning if it is unknown.
    fn resolve_column(&mut self, key: &str, column: &Ident) -> Option<String> {
        let table = self.tables.get(key)?;
        let found = find_column(&table.attributes, &column.value);
        if found.is_none() {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "constraint names unknown column `{}` of table `{}`",
                    column.value, table.name.value
                ))
                .with_code(DiagnosticCode::W102)
                .with_label(column.span, "no such column"),
            );
        }
        found
    }

    fn unsupported_constraint(&mut self, span: Span, what: &str) {
        self.diagnostics.emit(
            Diagnostic::warning(format!("{what} not imported"))
                .with_code(DiagnosticCode::W102)
                .with_label(span, "skipped"),
        );
    }

    /// Record the foreign key on its attribute and build the relationship
    /// edge. Returns `None` when no edge can be drawn.
    fn resolve_foreign_key(&mut self, fk: PendingForeignKey) -> Option<Edge> {
        let owner = self.tables.get(&fk.table)?;
        let Some(column) = find_column(&owner.attributes, &fk.column.value) else {
            let message = format!(
                "foreign key names unknown column `{}` of table `{}`",
                fk.column.value, owner.name.value
            );
            self.diagnostics.emit(
                Diagnostic::warning(message)
                    .with_code(DiagnosticCode::W102)
                    .with_label(fk.column.span, "no such column"),
            );
            return None;
        };
        let owner_id = owner.id.clone();
        let owner_name = owner.name.value.clone();

        let Some(target) = self.tables.get(&table_key(&fk.reference_table, self.dialect)) else {
            // Keep the reference on the attribute; there is no node to connect.
            let referenced = fk
                .reference_column
                .as_ref()
                .map_or_else(|| "id".to_string(), |c| c.value.clone());
            let table_name = fk.reference_table.value.clone();
            if let Some(attribute) = self
                .tables
                .get_mut(&fk.table)
                .and_then(|t| t.attributes.get_mut(&column))
            {
                attribute.set_foreign_key(Some(ForeignKey::new(
                    table_name.clone(),
                    table_name.clone(),
                    referenced,
                )));
            }
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "foreign key `{owner_name}.{column}` references unknown table `{table_name}`"
                ))
                .with_code(DiagnosticCode::W103)
                .with_label(fk.reference_table.span, "not defined in this script"),
            );
            return None;
        };

        let target_id = target.id.clone();
        let target_name = target.name.value.clone();
        let mut unresolved = None;
        let referenced = match &fk.reference_column {
            Some(reference) => match find_column(&target.attributes, &reference.value) {
                Some(name) => name,
                None => {
                    unresolved = Some(
                        Diagnostic::warning(format!(
                            "referenced column `{target_name}.{}` does not exist",
                            reference.value
                        ))
                        .with_code(DiagnosticCode::W105)
                        .with_label(reference.span, "no such column"),
                    );
                    reference.value.clone()
                }
            },
            None => {
                let keys: Vec<&Attribute> = target.attributes.primary_keys().collect();
                match keys.get(fk.position).or(keys.first()) {
                    Some(key) => key.name().to_string(),
                    None => {
                        unresolved = Some(
                            Diagnostic::warning(format!(
                                "table `{target_name}` has no primary key; assuming column `id`"
                            ))
                            .with_code(DiagnosticCode::W105)
                            .with_label(fk.reference_table.span, "referenced here"),
                        );
                        "id".to_string()
                    }
                }
            }
        };
        if let Some(diagnostic) = unresolved {
            self.diagnostics.emit(diagnostic);
        }

        let owner = self.tables.get_mut(&fk.table)?;
        let source_cardinality = if owner.individually_unique.contains(&column) {
            Cardinality::One
        } else {
            Cardinality::Many
        };
        let attribute = owner.attributes.get_mut(&column)?;
        attribute.set_foreign_key(Some(ForeignKey::new(
            target_id.clone(),
            target_name,
            referenced,
        )));

        let relationship = Relationship::new(
            RelationshipEnd::new(source_cardinality, true),
            RelationshipEnd::new(Cardinality::One, attribute.is_nullable()),
            attribute.is_primary(),
        );

        // `a_b.c` and `a.b_c` share a base id.
        let id = unique_id(&mut self.edge_ids, &format!("fk_{owner_name}_{column}"));
        Some(Edge::new(
            id,
            owner_id,
            target_id,
            EdgeKind::Relationship(relationship),
        ))
    }

    fn finish(mut self, name: Option<String>) -> Result<Imported, MalformedInputError> {
        let pending = std::mem::take(&mut self.foreign_keys);
        let edges: Vec<Edge> = pending
            .into_iter()
            .filter_map(|fk| self.resolve_foreign_key(fk))
            .collect();

        let mut graph = match name {
            Some(name) => Graph::named(name),
            None => Graph::new(),
        };

        for table in std::mem::take(&mut self.tables).into_values() {
            let node = Node::new(table.id, NodeKind::entity(table.attributes), table.name.value);
            if let Err(err) = graph.add_node(node) {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("table skipped: {err}"))
                        .with_code(DiagnosticCode::W106)
                        .with_label(table.name.span, "conflicts with an earlier table"),
                );
            }
        }
        for edge in edges {
            let id = edge.id().to_string();
            if let Err(err) = graph.add_edge(edge) {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("relationship `{id}` skipped: {err}"))
                        .with_code(DiagnosticCode::W106),
                );
            }
        }

        let warnings = self.diagnostics.finish()?;
        Ok(Imported::new(graph, warnings))
    }
}

/// Import a DDL script as an entity-relationship graph.
pub(crate) fn import(text: &str, dialect: Dialect) -> Result<Imported, MalformedInputError> {
    let tokens = lexer::tokenize(text, dialect)?;

    let name = tokens
        .iter()
        .find_map(|t| match t.token {
            Token::LineComment(comment) => comment
                .strip_prefix(DIAGRAM_COMMENT)
                .map(|name| name.trim().to_string()),
            _ => None,
        })
        .filter(|name| !name.is_empty());

    let significant: Vec<_> = tokens
        .into_iter()
        .filter(|t| !t.token.is_trivia())
        .collect();

    let mut builder = SchemaBuilder::new(text, dialect);
    for statement in significant.split(|t| matches!(t.token, Token::Semicolon)) {
        if statement.is_empty() {
            continue;
        }
        match parser::parse_statement(statement, text) {
            Ok(statement) => builder.apply(statement),
            Err(diagnostic) => builder.diagnostics.emit(diagnostic),
        }
    }

    debug!(
        dialect:% = dialect,
        tables = builder.tables.len(),
        foreign_keys = builder.foreign_keys.len();
        "DDL parsed"
    );
    builder.finish(name)
}
