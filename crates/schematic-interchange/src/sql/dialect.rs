//! SQL dialects and their type alias tables.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use schematic_core::UnknownKeywordError;

/// Words that must be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "EXISTS", "FOREIGN", "FROM",
    "FULL", "GRANT", "GROUP", "HAVING", "IN", "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN",
    "KEY", "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY",
    "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "UNION", "UNIQUE", "UPDATE",
    "USER", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// A supported SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "postgres", alias = "pg")]
    Postgresql,
    #[serde(alias = "mariadb")]
    Mysql,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl Dialect {
    pub const ALL: &'static [Dialect] = &[Dialect::Postgresql, Dialect::Mysql, Dialect::Sqlite];

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Postgresql => "postgresql",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// The character used to quote identifiers on export.
    pub fn quote_char(self) -> char {
        match self {
            Dialect::Mysql => '`',
            Dialect::Postgresql | Dialect::Sqlite => '"',
        }
    }

    /// Whether the dialect resolves foreign keys to tables created later in
    /// the script.
    pub fn allows_forward_references(self) -> bool {
        self == Dialect::Sqlite
    }

    /// Map an imported type name (upper-cased, multi-word types joined by a
    /// single space) and its size arguments to the canonical type.
    pub(crate) fn canonical_type(self, name: &str, size: Option<&str>) -> (String, Option<String>) {
        let size = size.map(str::to_string);
        let canonical = match name {
            "INT" | "INTEGER" | "INT4" | "SERIAL" | "MEDIUMINT" => "INT",
            "BIGINT" | "INT8" | "BIGSERIAL" => "BIGINT",
            "SMALLINT" | "INT2" | "SMALLSERIAL" => "SMALLINT",
            "TINYINT" if self == Dialect::Mysql && size.as_deref() == Some("1") => {
                return ("BOOLEAN".to_string(), None);
            }
            "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" | "VARCHAR2" => "VARCHAR",
            "CHAR" | "CHARACTER" | "NCHAR"
                if self == Dialect::Mysql && size.as_deref() == Some("36") =>
            {
                return ("UUID".to_string(), None);
            }
            "CHAR" | "CHARACTER" | "NCHAR" => "CHAR",
            "TEXT" | "LONGTEXT" | "MEDIUMTEXT" | "TINYTEXT" | "CLOB" => "TEXT",
            "BOOLEAN" | "BOOL" => "BOOLEAN",
            "TIME" | "TIME WITHOUT TIME ZONE" => "TIME",
            "TIMETZ" | "TIME WITH TIME ZONE" => "TIMETZ",
            "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => "TIMESTAMP",
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => "TIMESTAMPTZ",
            "FLOAT" | "FLOAT4" => "FLOAT",
            "REAL" if self == Dialect::Sqlite => "DOUBLE",
            "REAL" => "FLOAT",
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => "DOUBLE",
            "DECIMAL" | "NUMERIC" | "DEC" => "DECIMAL",
            "JSON" | "JSONB" => "JSON",
            "BLOB" | "BYTEA" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => "BLOB",
            other => other,
        };
        (canonical.to_string(), size)
    }

    /// Render a canonical type in this dialect's spelling.
    pub(crate) fn render_type(self, name: &str, size: Option<&str>) -> String {
        if let Some(base) = name
            .strip_suffix("TZ")
            .filter(|base| matches!(*base, "TIME" | "TIMESTAMP"))
        {
            return match (self, size) {
                (Dialect::Postgresql, Some(size)) => format!("{base}({size}) WITH TIME ZONE"),
                (Dialect::Postgresql, None) => format!("{base} WITH TIME ZONE"),
                // Neither keeps a zone; the value is stored as given.
                (_, Some(size)) => format!("{base}({size})"),
                (_, None) => base.to_string(),
            };
        }

        let name = match (self, name) {
            (Dialect::Postgresql, "INT") => "INTEGER",
            (Dialect::Postgresql, "DOUBLE") => "DOUBLE PRECISION",
            (Dialect::Postgresql, "FLOAT") => "REAL",
            (Dialect::Postgresql, "DATETIME") => "TIMESTAMP",
            (Dialect::Postgresql, "BLOB") => "BYTEA",
            (Dialect::Postgresql, "JSON") => "JSONB",
            (Dialect::Postgresql, "TINYINT") => "SMALLINT",
            (Dialect::Mysql, "BOOLEAN") => return "TINYINT(1)".to_string(),
            (Dialect::Mysql, "UUID") => return "CHAR(36)".to_string(),
            (Dialect::Mysql, "VARCHAR") if size.is_none() => return "VARCHAR(255)".to_string(),
            (Dialect::Sqlite, "INT") => "INTEGER",
            (Dialect::Sqlite, "DOUBLE") => "REAL",
            (_, other) => other,
        };

        // Display widths on integer types are a MySQL extension.
        let integer = matches!(name, "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT");
        match size {
            Some(size) if !(integer && self != Dialect::Mysql) => format!("{name}({size})"),
            _ => name.to_string(),
        }
    }

    /// Quote `ident` when it is not a plain identifier or is a reserved
    /// word. The quote character is escaped by doubling.
    pub(crate) fn quote_identifier(self, ident: &str) -> String {
        if is_plain_identifier(ident) && !is_reserved(ident) {
            return ident.to_string();
        }
        self.quote_exact(ident)
    }

    /// Quote `ident` unconditionally, so PostgreSQL keeps its case.
    pub(crate) fn quote_exact(self, ident: &str) -> String {
        let quote = self.quote_char();
        let escaped = ident.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = UnknownKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgresql),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(UnknownKeywordError::new("SQL dialect", s)),
        }
    }
}

fn is_plain_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_reserved(ident: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(ident))
}
