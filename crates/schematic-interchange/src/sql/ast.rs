//! Statement types produced by the DDL parser.
//!
//! Expression text (defaults, type arguments) is kept as spans into the
//! script so importers can copy it verbatim.

use crate::span::Span;

/// An identifier with its location. Quoted identifiers are unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ident {
    pub value: String,
    pub span: Span,
    /// Written in quotes, so no case folding applies.
    pub quoted: bool,
}

impl Ident {
    pub(crate) fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
            quoted: false,
        }
    }

    pub(crate) fn quoted(value: impl Into<String>, span: Span) -> Self {
        Self {
            quoted: true,
            ..Self::new(value, span)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Statement {
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    CreateIndex,
    /// Any statement outside the supported subset.
    Other { summary: String, span: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CreateTable {
    pub name: Ident,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AlterTable {
    pub table: Ident,
    pub constraints: Vec<TableConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnDef {
    pub name: Ident,
    /// SQLite columns may omit the type.
    pub data_type: Option<DataType>,
    pub constraints: Vec<ColumnConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataType {
    /// Upper-cased words joined by single spaces (`DOUBLE PRECISION`).
    pub name: String,
    /// Text between the parentheses of `VARCHAR(255)` or `DECIMAL(10, 2)`.
    pub size: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey,
    Unique,
    Default(Span),
    References(ForeignRef),
    Check(Span),
    /// Accepted and dropped: `AUTO_INCREMENT`, `COLLATE`, `COMMENT`, ...
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ForeignRef {
    pub table: Ident,
    /// Empty when the referenced columns are omitted.
    pub columns: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TableConstraint {
    PrimaryKey(Vec<Ident>),
    Unique(Vec<Ident>),
    ForeignKey {
        columns: Vec<Ident>,
        reference: ForeignRef,
    },
    Check(Span),
    /// MySQL inline `KEY name (..)` / `INDEX name (..)`.
    Index,
}
