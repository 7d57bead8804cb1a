//! Parser for DDL statements.
//!
//! Works on the significant tokens of a single statement (trivia removed,
//! split on `;`). [`parse_statement`] classifies the statement by its
//! leading keywords and parses the supported ones into [`ast`](super::ast)
//! types. Statements outside the subset come back as
//! [`Statement::Other`]; a `CREATE TABLE` or foreign-key `ALTER TABLE`
//! that does not match the grammar is an error.

use winnow::{
    Parser,
    combinator::{alt, delimited, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, DiagnosticCode},
    span::Span,
    sql::{
        ast::{
            AlterTable, ColumnConstraint, ColumnDef, CreateTable, DataType, ForeignRef, Ident,
            Statement, TableConstraint,
        },
        tokens::{PositionedToken, Token},
    },
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type Error = ErrMode<ContextError<Context>>;
type IResult<O> = Result<O, Error>;

/// Words that end an expression inside a column definition.
const EXPRESSION_STOP: &[&str] = &[
    "AUTOINCREMENT",
    "AUTO_INCREMENT",
    "CHARSET",
    "CHECK",
    "COLLATE",
    "COMMENT",
    "CONSTRAINT",
    "GENERATED",
    "NOT",
    "NULL",
    "ON",
    "PRIMARY",
    "REFERENCES",
    "UNIQUE",
];

/// Words that cannot start a data type because they start a constraint.
const CONSTRAINT_START: &[&str] = &[
    "AUTOINCREMENT",
    "AUTO_INCREMENT",
    "CHARSET",
    "CHECK",
    "COLLATE",
    "COMMENT",
    "CONSTRAINT",
    "DEFAULT",
    "GENERATED",
    "NOT",
    "NULL",
    "ON",
    "PRIMARY",
    "REFERENCES",
    "UNIQUE",
];

/// Words that extend a multi-word type name.
const TYPE_CONTINUATIONS: &[&str] = &["PRECISION", "VARYING", "WITH", "WITHOUT", "TIME", "ZONE"];

/// Numeric modifiers that do not change the canonical type.
const TYPE_MODIFIERS: &[&str] = &["UNSIGNED", "SIGNED", "ZEROFILL"];

/// Modifiers between `CREATE` and the object kind.
const CREATE_MODIFIERS: &[&str] = &["OR", "REPLACE", "TEMP", "TEMPORARY", "UNIQUE", "UNLOGGED"];

fn expected(label: &'static str) -> Error {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    ErrMode::Cut(e)
}

/// Parse the bare word `keyword`, ignoring case.
fn kw<'src>(keyword: &'static str) -> impl Parser<Input<'src>, Span, Error> {
    any.verify_map(move |token: &PositionedToken<'_>| {
        token.is_keyword(keyword).then_some(token.span)
    })
    .context(Context::Label(keyword))
}

fn left_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| {
        matches!(token.token, Token::LeftParen).then_some(token.span)
    })
    .context(Context::Label("`(`"))
    .parse_next(input)
}

fn right_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| {
        matches!(token.token, Token::RightParen).then_some(token.span)
    })
    .context(Context::Label("`)`"))
    .parse_next(input)
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Comma))
        .void()
        .context(Context::Label("`,`"))
        .parse_next(input)
}

fn dot<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Dot))
        .void()
        .context(Context::Label("`.`"))
        .parse_next(input)
}

/// Any bare word; used for option values such as `MATCH FULL`.
fn any_word<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Word(_)))
        .void()
        .context(Context::Label("word"))
        .parse_next(input)
}

fn string_literal<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::StringLiteral(_)))
        .void()
        .context(Context::Label("string literal"))
        .parse_next(input)
}

/// Bare or quoted identifier. Keywords are accepted; the grammar tries
/// constraint forms before column names.
fn identifier<'src>(input: &mut Input<'src>) -> IResult<Ident> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Word(word) => Some(Ident::new(*word, token.span)),
        Token::Quoted(name) => Some(Ident::quoted(name.clone(), token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// `schema.table` resolves to `table`; the span covers the whole name.
fn qualified_name<'src>(input: &mut Input<'src>) -> IResult<Ident> {
    let first = identifier.parse_next(input)?;
    let rest: Vec<Ident> = repeat(0.., preceded(dot, identifier)).parse_next(input)?;

    match rest.into_iter().last() {
        Some(last) => {
            let span = first.span.union(last.span);
            Ok(Ident { span, ..last })
        }
        None => Ok(first),
    }
}

/// A balanced parenthesized group. Returns the whole span and the span of
/// the contents (`None` for `()`).
fn paren_group<'src>(input: &mut Input<'src>) -> IResult<(Span, Option<Span>)> {
    let open = left_paren.parse_next(input)?;
    let mut depth = 1usize;
    let mut inner: Option<Span> = None;

    loop {
        let Some(token) = input.next_token() else {
            return Err(expected("`)`"));
        };
        match token.token {
            Token::LeftParen => depth += 1,
            Token::RightParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok((open.union(token.span), inner));
                }
            }
            _ => {}
        }
        inner = Some(inner.map_or(token.span, |span| span.union(token.span)));
    }
}

/// A run of tokens forming an expression: `DEFAULT now()`, `DEFAULT 'a'::text`.
///
/// Stops before a top-level `,` or `)` or a word in `stop`. The first token
/// is always taken, so `DEFAULT NULL` works.
fn expression<'src>(input: &mut Input<'src>, stop: &[&str]) -> IResult<Span> {
    let first = any::<_, Error>
        .verify(|token: &PositionedToken<'_>| {
            !matches!(token.token, Token::Comma | Token::RightParen)
        })
        .context(Context::Label("expression"))
        .parse_next(input)?;

    let mut span = first.span;
    let mut depth = usize::from(matches!(first.token, Token::LeftParen));

    loop {
        let checkpoint = input.checkpoint();
        let Some(token) = input.next_token() else {
            break;
        };
        match token.token {
            Token::LeftParen => depth += 1,
            Token::RightParen | Token::Comma if depth == 0 => {
                input.reset(&checkpoint);
                break;
            }
            Token::RightParen => depth -= 1,
            _ if depth == 0 && token.is_any_keyword(stop) => {
                input.reset(&checkpoint);
                break;
            }
            _ => {}
        }
        span = span.union(token.span);
    }

    if depth > 0 {
        return Err(expected("`)`"));
    }
    Ok(span)
}

fn default_expression<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expression(input, EXPRESSION_STOP)
}

/// Upper-cased text of a bare word token.
fn upper_word(token: &PositionedToken<'_>) -> Option<String> {
    match token.token {
        Token::Word(word) => Some(word.to_ascii_uppercase()),
        _ => None,
    }
}

/// Parse a data type: `INT`, `VARCHAR(255)`, `DOUBLE PRECISION`,
/// `TIMESTAMP(3) WITH TIME ZONE`, `INT UNSIGNED`, `TEXT[]`.
fn data_type<'src>(input: &mut Input<'src>) -> IResult<DataType> {
    let mut name = any::<_, Error>
        .verify_map(|token: &PositionedToken<'_>| {
            if token.is_any_keyword(CONSTRAINT_START) {
                None
            } else {
                upper_word(token)
            }
        })
        .context(Context::Label("data type"))
        .parse_next(input)?;

    let mut size = None;
    let mut sized = false;

    loop {
        let checkpoint = input.checkpoint();
        let Some(token) = input.next_token() else {
            break;
        };

        if token.is_any_keyword(TYPE_CONTINUATIONS) {
            if let Some(word) = upper_word(token) {
                name.push(' ');
                name.push_str(&word);
            }
        } else if token.is_any_keyword(TYPE_MODIFIERS) {
            // Dropped.
        } else if matches!(token.token, Token::LeftParen) && !sized {
            input.reset(&checkpoint);
            let (_, inner) = paren_group.parse_next(input)?;
            size = inner;
            sized = true;
        } else if matches!(token.token, Token::Symbol('[')) {
            loop {
                match input.next_token() {
                    Some(t) if matches!(t.token, Token::Symbol(']')) => break,
                    Some(_) => {}
                    None => return Err(expected("`]`")),
                }
            }
            name.push_str("[]");
        } else {
            input.reset(&checkpoint);
            break;
        }
    }

    Ok(DataType { name, size })
}

/// `ON DELETE CASCADE`, `MATCH FULL`, `DEFERRABLE INITIALLY DEFERRED`, ...
fn referential_action<'src>(input: &mut Input<'src>) -> IResult<()> {
    alt((
        (
            kw("ON"),
            alt((kw("DELETE"), kw("UPDATE"))),
            alt((
                (kw("SET"), alt((kw("NULL"), kw("DEFAULT")))).void(),
                (kw("NO"), kw("ACTION")).void(),
                kw("CASCADE").void(),
                kw("RESTRICT").void(),
            )),
        )
            .void(),
        (kw("MATCH"), any_word).void(),
        (opt(kw("NOT")), kw("DEFERRABLE")).void(),
        (kw("INITIALLY"), any_word).void(),
    ))
    .parse_next(input)
}

/// `REFERENCES table [(columns)] [actions]`
fn references<'src>(input: &mut Input<'src>) -> IResult<ForeignRef> {
    kw("REFERENCES").parse_next(input)?;
    let table = qualified_name.parse_next(input)?;
    let columns = opt(column_list).parse_next(input)?.unwrap_or_default();
    let _: () = repeat(0.., referential_action).parse_next(input)?;

    Ok(ForeignRef { table, columns })
}

/// A column inside a key list: `name`, `name(10)` (prefix length), `name DESC`.
fn key_column<'src>(input: &mut Input<'src>) -> IResult<Ident> {
    let name = identifier.parse_next(input)?;
    opt(paren_group).parse_next(input)?;
    opt(alt((kw("ASC"), kw("DESC")))).parse_next(input)?;
    Ok(name)
}

fn column_list<'src>(input: &mut Input<'src>) -> IResult<Vec<Ident>> {
    delimited(left_paren, separated(1.., key_column, comma), right_paren)
        .context(Context::Label("column list"))
        .parse_next(input)
}

fn column_constraint<'src>(input: &mut Input<'src>) -> IResult<ColumnConstraint> {
    preceded(
        opt((kw("CONSTRAINT"), identifier)),
        alt((
            (kw("NOT"), kw("NULL")).value(ColumnConstraint::NotNull),
            kw("NULL").value(ColumnConstraint::Null),
            (kw("PRIMARY"), kw("KEY"), opt(alt((kw("ASC"), kw("DESC")))))
                .value(ColumnConstraint::PrimaryKey),
            (kw("UNIQUE"), opt(kw("KEY"))).value(ColumnConstraint::Unique),
            preceded(kw("DEFAULT"), default_expression).map(ColumnConstraint::Default),
            references.map(ColumnConstraint::References),
            preceded(kw("CHECK"), paren_group).map(|(span, _)| ColumnConstraint::Check(span)),
            alt((kw("AUTO_INCREMENT"), kw("AUTOINCREMENT"))).value(ColumnConstraint::Ignored),
            (kw("COLLATE"), alt((identifier.void(), string_literal)))
                .value(ColumnConstraint::Ignored),
            (kw("COMMENT"), string_literal).value(ColumnConstraint::Ignored),
            (kw("ON"), kw("UPDATE"), default_expression).value(ColumnConstraint::Ignored),
            (
                kw("GENERATED"),
                |input: &mut Input<'src>| expression(input, EXPRESSION_STOP),
            )
                .value(ColumnConstraint::Ignored),
            (
                alt(((kw("CHARACTER"), kw("SET")).void(), kw("CHARSET").void())),
                identifier,
            )
                .value(ColumnConstraint::Ignored),
        )),
    )
    .context(Context::Label("column constraint"))
    .parse_next(input)
}

fn column_def<'src>(input: &mut Input<'src>) -> IResult<ColumnDef> {
    let name = identifier.parse_next(input)?;
    let data_type = opt(data_type).parse_next(input)?;
    let constraints = repeat(0.., column_constraint).parse_next(input)?;

    Ok(ColumnDef {
        name,
        data_type,
        constraints,
    })
}

fn table_constraint<'src>(input: &mut Input<'src>) -> IResult<TableConstraint> {
    preceded(
        opt((kw("CONSTRAINT"), identifier)),
        alt((
            preceded((kw("PRIMARY"), kw("KEY")), column_list).map(TableConstraint::PrimaryKey),
            preceded(
                (
                    kw("UNIQUE"),
                    opt(alt((kw("KEY"), kw("INDEX")))),
                    opt(identifier),
                ),
                column_list,
            )
            .map(TableConstraint::Unique),
            (
                preceded((kw("FOREIGN"), kw("KEY"), opt(identifier)), column_list),
                references,
            )
                .map(|(columns, reference)| TableConstraint::ForeignKey { columns, reference }),
            preceded(kw("CHECK"), paren_group).map(|(span, _)| TableConstraint::Check(span)),
            (
                opt(alt((kw("FULLTEXT"), kw("SPATIAL")))),
                alt((kw("KEY"), kw("INDEX"))),
                opt(identifier),
                column_list,
            )
                .value(TableConstraint::Index),
        )),
    )
    .context(Context::Label("table constraint"))
    .parse_next(input)
}

enum Element {
    Column(ColumnDef),
    Constraint(TableConstraint),
}

fn table_element<'src>(input: &mut Input<'src>) -> IResult<Element> {
    alt((
        table_constraint.map(Element::Constraint),
        column_def.map(Element::Column),
    ))
    .context(Context::Label("column definition or table constraint"))
    .parse_next(input)
}

/// `CREATE [TEMP] TABLE [IF NOT EXISTS] name ( element, ... ) [options]`
fn create_table<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    kw("CREATE").parse_next(input)?;
    opt(alt((kw("TEMP"), kw("TEMPORARY"), kw("UNLOGGED")))).parse_next(input)?;
    kw("TABLE").parse_next(input)?;
    opt((kw("IF"), kw("NOT"), kw("EXISTS"))).parse_next(input)?;
    let name = qualified_name.parse_next(input)?;

    // `CREATE TABLE t AS SELECT ...` and `CREATE TABLE t LIKE u` copy another
    // table's shape, which a script alone cannot tell us.
    let checkpoint = input.checkpoint();
    if let Some(token) = input.next_token() {
        if token.is_any_keyword(&["AS", "LIKE"]) {
            let keyword = upper_word(token).unwrap_or_default();
            return Ok(Statement::Other {
                summary: format!("CREATE TABLE ... {keyword}"),
                span: name.span.union(token.span),
            });
        }
    }
    input.reset(&checkpoint);

    left_paren.parse_next(input)?;

    let mut columns = Vec::new();
    let mut constraints = Vec::new();

    // PostgreSQL accepts a table without columns.
    if opt(right_paren).parse_next(input)?.is_some() {
        return Ok(Statement::CreateTable(CreateTable {
            name,
            columns,
            constraints,
        }));
    }

    loop {
        match table_element.parse_next(input)? {
            Element::Column(column) => columns.push(column),
            Element::Constraint(constraint) => constraints.push(constraint),
        }

        let checkpoint = input.checkpoint();
        match input.next_token().map(|token| &token.token) {
            Some(Token::Comma) => {}
            Some(Token::RightParen) => break,
            _ => {
                input.reset(&checkpoint);
                return Err(expected("`,` or `)`"));
            }
        }
    }

    // Table options (`ENGINE=InnoDB`, `WITHOUT ROWID`, ...) are ignored.
    Ok(Statement::CreateTable(CreateTable {
        name,
        columns,
        constraints,
    }))
}

/// `ALTER TABLE [ONLY] [IF EXISTS] t ADD <table constraint>, ...`
fn alter_table<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    (kw("ALTER"), kw("TABLE")).parse_next(input)?;
    opt(kw("ONLY")).parse_next(input)?;
    opt((kw("IF"), kw("EXISTS"))).parse_next(input)?;
    opt(kw("ONLY")).parse_next(input)?;
    let table = qualified_name.parse_next(input)?;

    let constraints = separated(1.., preceded(kw("ADD"), table_constraint), comma)
        .parse_next(input)?;
    opt((kw("NOT"), kw("VALID"))).parse_next(input)?;

    if input.eof_offset() > 0 {
        return Err(expected("end of statement"));
    }

    Ok(Statement::AlterTable(AlterTable { table, constraints }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    CreateTable,
    CreateIndex,
    AlterTable,
    Other,
}

/// Classify a statement by its leading keywords.
fn classify(tokens: &[PositionedToken<'_>]) -> Kind {
    let Some(first) = tokens.first() else {
        return Kind::Other;
    };

    if first.is_keyword("CREATE") {
        let object = tokens
            .iter()
            .skip(1)
            .find(|token| !token.is_any_keyword(CREATE_MODIFIERS));
        return match object {
            Some(token) if token.is_keyword("TABLE") => Kind::CreateTable,
            Some(token) if token.is_keyword("INDEX") => Kind::CreateIndex,
            _ => Kind::Other,
        };
    }

    if first.is_keyword("ALTER") && tokens.get(1).is_some_and(|t| t.is_keyword("TABLE")) {
        let adds_key = tokens.iter().enumerate().any(|(i, token)| {
            if !token.is_keyword("ADD") {
                return false;
            }
            // ADD [CONSTRAINT name] FOREIGN|PRIMARY|UNIQUE
            let next = match tokens.get(i + 1) {
                Some(next) if next.is_keyword("CONSTRAINT") => tokens.get(i + 3),
                next => next,
            };
            next.is_some_and(|t| t.is_any_keyword(&["FOREIGN", "PRIMARY", "UNIQUE"]))
        });
        if adds_key {
            return Kind::AlterTable;
        }
    }

    Kind::Other
}

/// A short name for an unsupported statement: `INSERT`, `CREATE VIEW`.
fn summarize(tokens: &[PositionedToken<'_>]) -> String {
    let mut words = tokens.iter().filter_map(upper_word);
    let Some(first) = words.next() else {
        return tokens
            .first()
            .map(|token| token.token.to_string())
            .unwrap_or_default();
    };

    if matches!(first.as_str(), "CREATE" | "ALTER" | "DROP") {
        let object = words.find(|word| !CREATE_MODIFIERS.contains(&word.as_str()));
        if let Some(object) = object {
            return format!("{first} {object}");
        }
    }
    first
}

/// Statement text on one line, shortened for messages.
fn excerpt(text: &str) -> String {
    const MAX_CHARS: usize = 60;

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_CHARS {
        collapsed
    } else {
        let mut shortened: String = collapsed.chars().take(MAX_CHARS - 3).collect();
        shortened.push_str("...");
        shortened
    }
}

/// Convert a winnow error into a diagnostic.
///
/// The primary label points at the token the parser stopped on; a secondary
/// label covers the whole statement.
fn convert_error(
    error: Error,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
    src: &str,
    code: DiagnosticCode,
    what: &str,
) -> Diagnostic {
    let statement_span = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.union(last.span),
        _ => Span::default(),
    };

    let expected = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
        }),
        ErrMode::Incomplete(_) => None,
    };

    let position = tokens.len().saturating_sub(current_remaining);
    let (span, found) = match tokens.get(position) {
        Some(token) => (token.span, format!("found `{}`", token.token)),
        None => (
            Span::at(statement_span.end()),
            "found end of statement".to_string(),
        ),
    };

    let label = match expected {
        Some(expected) => format!("expected {expected}, {found}"),
        None => found,
    };

    Diagnostic::error(format!(
        "invalid {what} statement at offset {}: `{}`",
        statement_span.start(),
        excerpt(statement_span.slice(src))
    ))
    .with_code(code)
    .with_label(span, label)
    .with_secondary_label(statement_span, "in this statement")
    .with_help("supported statements are CREATE TABLE, ALTER TABLE ... ADD FOREIGN KEY and CREATE INDEX")
}

fn run<'src>(
    mut parser: impl FnMut(&mut Input<'src>) -> IResult<Statement>,
    tokens: &'src [PositionedToken<'src>],
    src: &str,
    code: DiagnosticCode,
    what: &str,
) -> Result<Statement, Diagnostic> {
    let mut input = TokenSlice::new(tokens);
    parser(&mut input).map_err(|e| convert_error(e, tokens, input.eof_offset(), src, code, what))
}

/// Parse the significant tokens of one statement.
///
/// # Errors
///
/// Returns an E110/E111 diagnostic for a `CREATE TABLE` or foreign-key
/// `ALTER TABLE` statement that does not match the grammar.
pub(crate) fn parse_statement<'src>(
    tokens: &'src [PositionedToken<'src>],
    src: &str,
) -> Result<Statement, Diagnostic> {
    match classify(tokens) {
        Kind::CreateTable => run(create_table, tokens, src, DiagnosticCode::E110, "CREATE TABLE"),
        Kind::AlterTable => run(alter_table, tokens, src, DiagnosticCode::E111, "ALTER TABLE"),
        Kind::CreateIndex => Ok(Statement::CreateIndex),
        Kind::Other => {
            let span = match (tokens.first(), tokens.last()) {
                (Some(first), Some(last)) => first.span.union(last.span),
                _ => Span::default(),
            };
            Ok(Statement::Other {
                summary: summarize(tokens),
                span,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{Dialect, lexer::tokenize};

    fn parse(src: &str) -> Result<Statement, Diagnostic> {
        parse_with(src, Dialect::Postgresql)
    }

    fn parse_with(src: &str, dialect: Dialect) -> Result<Statement, Diagnostic> {
        let tokens: Vec<PositionedToken<'_>> = tokenize(src, dialect)
            .unwrap()
            .into_iter()
            .filter(|t| !t.token.is_trivia() && !matches!(t.token, Token::Semicolon))
            .collect();
        parse_statement(&tokens, src)
    }

    fn create(src: &str) -> CreateTable {
        match parse(src).unwrap() {
            Statement::CreateTable(table) => table,
            other => panic!("expected CREATE TABLE, got {other:?}"),
        }
    }

    fn names(idents: &[Ident]) -> Vec<&str> {
        idents.iter().map(|i| i.value.as_str()).collect()
    }

    #[test]
    fn test_simple_create_table() {
        let table = create("CREATE TABLE author (id INT PRIMARY KEY, name VARCHAR(80) NOT NULL)");
        assert_eq!(table.name.value, "author");
        assert_eq!(table.columns.len(), 2);

        let id = &table.columns[0];
        assert_eq!(id.name.value, "id");
        assert_eq!(id.data_type.as_ref().map(|t| t.name.as_str()), Some("INT"));
        assert_eq!(id.constraints, vec![ColumnConstraint::PrimaryKey]);

        let name = &table.columns[1];
        let size = name.data_type.as_ref().and_then(|t| t.size).unwrap();
        assert_eq!(
            size.slice("CREATE TABLE author (id INT PRIMARY KEY, name VARCHAR(80) NOT NULL)"),
            "80"
        );
        assert_eq!(name.constraints, vec![ColumnConstraint::NotNull]);
    }

    #[test]
    fn test_qualified_and_quoted_names() {
        let table = create(r#"CREATE TABLE IF NOT EXISTS public."Order Line" ("from" TEXT)"#);
        assert_eq!(table.name.value, "Order Line");
        assert!(table.name.quoted);
        assert_eq!(table.columns[0].name.value, "from");

        let table = create("CREATE TABLE public.Users (id INT)");
        assert_eq!(table.name.value, "Users");
        assert!(!table.name.quoted);
    }

    #[test]
    fn test_multi_word_types() {
        let table = create(
            "CREATE TABLE t (a DOUBLE PRECISION, b TIMESTAMP WITH TIME ZONE, \
             c CHARACTER VARYING(20), d INT UNSIGNED, e TEXT[])",
        );
        let types: Vec<&str> = table
            .columns
            .iter()
            .map(|c| c.data_type.as_ref().map_or("", |t| t.name.as_str()))
            .collect();
        assert_eq!(
            types,
            vec![
                "DOUBLE PRECISION",
                "TIMESTAMP WITH TIME ZONE",
                "CHARACTER VARYING",
                "INT",
                "TEXT[]"
            ]
        );
    }

    #[test]
    fn test_untyped_sqlite_column() {
        let src = "CREATE TABLE t (id PRIMARY KEY, note)";
        let Statement::CreateTable(table) = parse_with(src, Dialect::Sqlite).unwrap() else {
            panic!("expected CREATE TABLE");
        };
        assert!(table.columns[0].data_type.is_none());
        assert_eq!(table.columns[0].constraints, vec![ColumnConstraint::PrimaryKey]);
        assert!(table.columns[1].data_type.is_none());
    }

    #[test]
    fn test_default_expressions() {
        let src = "CREATE TABLE t (a INT DEFAULT -1 NOT NULL, b TEXT DEFAULT 'x'::text, \
                   c TIMESTAMP DEFAULT now() ON UPDATE CURRENT_TIMESTAMP, d INT DEFAULT NULL)";
        let table = create(src);

        let defaults: Vec<&str> = table
            .columns
            .iter()
            .filter_map(|c| {
                c.constraints.iter().find_map(|k| match k {
                    ColumnConstraint::Default(span) => Some(span.slice(src)),
                    _ => None,
                })
            })
            .collect();
        assert_eq!(defaults, vec!["-1", "'x'::text", "now()", "NULL"]);
        assert!(table.columns[0].constraints.contains(&ColumnConstraint::NotNull));
    }

    #[test]
    fn test_inline_references() {
        let table = create(
            "CREATE TABLE book (author_id INT NOT NULL REFERENCES author(id) ON DELETE CASCADE)",
        );
        let reference = table.columns[0]
            .constraints
            .iter()
            .find_map(|c| match c {
                ColumnConstraint::References(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert_eq!(reference.table.value, "author");
        assert_eq!(names(&reference.columns), vec!["id"]);
        assert!(table.columns[0].constraints.contains(&ColumnConstraint::NotNull));
    }

    #[test]
    fn test_table_constraints() {
        let table = create(
            "CREATE TABLE enrollment (\
               student_id INT, course_id INT, \
               CONSTRAINT pk_enrollment PRIMARY KEY (student_id, course_id), \
               UNIQUE (course_id), \
               FOREIGN KEY (student_id) REFERENCES student, \
               CHECK (course_id > 0))",
        );
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.constraints.len(), 4);
        assert!(matches!(
            &table.constraints[0],
            TableConstraint::PrimaryKey(cols) if names(cols) == ["student_id", "course_id"]
        ));
        assert!(matches!(
            &table.constraints[2],
            TableConstraint::ForeignKey { reference, .. } if reference.columns.is_empty()
        ));
        assert!(matches!(table.constraints[3], TableConstraint::Check(_)));
    }

    #[test]
    fn test_mysql_table() {
        let src = "CREATE TABLE `user` (\
                     `id` INT(11) NOT NULL AUTO_INCREMENT COMMENT 'key', \
                     `key` VARCHAR(10) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin, \
                     PRIMARY KEY (`id`), \
                     KEY `idx_key` (`key`(4)), \
                     UNIQUE KEY `uq_key` (`key`)\
                   ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";
        let Statement::CreateTable(table) = parse_with(src, Dialect::Mysql).unwrap() else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(table.name.value, "user");
        let columns: Vec<&str> = table.columns.iter().map(|c| c.name.value.as_str()).collect();
        assert_eq!(columns, ["id", "key"]);
        assert_eq!(table.constraints.len(), 3);
        assert!(matches!(table.constraints[1], TableConstraint::Index));
    }

    #[test]
    fn test_alter_table_foreign_key() {
        let statement = parse(
            "ALTER TABLE ONLY public.book ADD CONSTRAINT fk_author FOREIGN KEY (author_id) \
             REFERENCES public.author (id) DEFERRABLE INITIALLY DEFERRED",
        )
        .unwrap();
        let Statement::AlterTable(alter) = statement else {
            panic!("expected ALTER TABLE");
        };
        assert_eq!(alter.table.value, "book");
        assert!(matches!(
            &alter.constraints[0],
            TableConstraint::ForeignKey { columns, reference }
                if names(columns) == ["author_id"] && reference.table.value == "author"
        ));
    }

    #[test]
    fn test_other_statements() {
        assert!(matches!(
            parse("INSERT INTO t VALUES (1)").unwrap(),
            Statement::Other { summary, .. } if summary == "INSERT"
        ));
        assert!(matches!(
            parse("CREATE OR REPLACE VIEW v AS SELECT 1").unwrap(),
            Statement::Other { summary, .. } if summary == "CREATE VIEW"
        ));
        assert!(matches!(
            parse("ALTER TABLE t ADD COLUMN x INT").unwrap(),
            Statement::Other { summary, .. } if summary == "ALTER TABLE"
        ));
        assert!(matches!(
            parse("CREATE TABLE t2 AS SELECT * FROM t").unwrap(),
            Statement::Other { .. }
        ));
        assert_eq!(
            parse("CREATE UNIQUE INDEX idx ON t (a)").unwrap(),
            Statement::CreateIndex
        );
    }

    #[test]
    fn test_invalid_create_table_is_an_error() {
        let src = "CREATE TABLE t (id INT, name VARCHAR(20) NOT NULL foo)";
        let diag = parse(src).unwrap_err();
        assert_eq!(diag.code(), Some(DiagnosticCode::E110));
        assert!(diag.message().contains("CREATE TABLE t (id INT"));
        // Points at `foo`.
        assert_eq!(diag.offset(), src.find("foo"));
    }

    #[test]
    fn test_unclosed_create_table() {
        let diag = parse("CREATE TABLE t (id INT").unwrap_err();
        assert_eq!(diag.code(), Some(DiagnosticCode::E110));
    }

    #[test]
    fn test_invalid_alter_table_is_an_error() {
        let diag = parse("ALTER TABLE book ADD FOREIGN KEY author_id REFERENCES author").unwrap_err();
        assert_eq!(diag.code(), Some(DiagnosticCode::E111));
    }

    #[test]
    fn test_excerpt_is_shortened() {
        let long = format!("CREATE TABLE t ({})", "a INT, ".repeat(20));
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), 60);
        assert!(short.ends_with("..."));
        assert_eq!(excerpt("A\n   B"), "A B");
    }
}
