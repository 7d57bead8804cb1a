//! Lexical analyzer for SQL DDL scripts.
//!
//! The lexer converts script text into [`PositionedToken`]s. It recovers
//! from errors by skipping one character and continuing, so a single pass
//! reports every unterminated literal or stray character at once.
//!
//! Dialect differences handled here:
//! - MySQL string literals accept `\'` and `\\` escapes.
//! - SQLite accepts `[bracketed]` identifiers; elsewhere `[` is punctuation
//!   (PostgreSQL array types).

use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{none_of, one_of, take_till, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, DiagnosticCode, MalformedInputError},
    span::Span,
    sql::{
        Dialect,
        tokens::{PositionedToken, Token},
    },
};

/// Diagnostic information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: DiagnosticCode,
    message: &'static str,
    help: Option<&'static str>,
    /// Where the offending construct starts.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., char::is_whitespace)
        .value(Token::Whitespace)
        .parse_next(input)
}

/// `-- ...` and MySQL `# ...` comments, up to (not including) the newline.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (alt(("--", "#")), take_till(0.., '\n'))
        .take()
        .map(Token::LineComment)
        .parse_next(input)
}

fn block_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    preceded(
        "/*",
        cut_err(terminated(take_until(0.., "*/"), "*/")).context(LexerDiagnostic {
            code: DiagnosticCode::E102,
            message: "unterminated block comment",
            help: Some("add a closing `*/`"),
            start,
        }),
    )
    .value(Token::BlockComment)
    .parse_next(input)
}

/// Single-quoted string literal. `''` is an escaped quote in every dialect.
fn string_literal<'a>(input: &mut Input<'a>, dialect: Dialect) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let backslash_escapes = dialect == Dialect::Mysql;

    let escaped_backslash = move |input: &mut Input<'a>| -> IResult<char> {
        if !backslash_escapes {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        preceded('\\', one_of(['\'', '\\'])).parse_next(input)
    };

    let content = repeat(
        0..,
        alt(("''".value('\''), escaped_backslash, none_of('\''))),
    )
    .fold(String::new, |mut acc, c| {
        acc.push(c);
        acc
    });

    preceded(
        '\'',
        cut_err(terminated(content, '\'')).context(LexerDiagnostic {
            code: DiagnosticCode::E100,
            message: "unterminated string literal",
            help: Some("add a closing `'`"),
            start,
        }),
    )
    .map(Token::StringLiteral)
    .parse_next(input)
}

/// Body of a quoted identifier where the quote is escaped by doubling it.
fn doubled_quote_body<'a>(input: &mut Input<'a>, quote: char) -> IResult<String> {
    let doubled: &'static str = if quote == '`' { "``" } else { "\"\"" };

    repeat(0.., alt((doubled.value(quote), none_of(quote))))
        .fold(String::new, |mut acc, c| {
            acc.push(c);
            acc
        })
        .parse_next(input)
}

fn quoted_identifier<'a>(input: &mut Input<'a>, dialect: Dialect) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let unterminated = LexerDiagnostic {
        code: DiagnosticCode::E101,
        message: "unterminated quoted identifier",
        help: Some("close the identifier with the quote it was opened with"),
        start,
    };

    let double_quoted = preceded(
        '"',
        cut_err(terminated(
            |i: &mut Input<'a>| doubled_quote_body(i, '"'),
            '"',
        ))
        .context(unterminated.clone()),
    );
    let backquoted = preceded(
        '`',
        cut_err(terminated(
            |i: &mut Input<'a>| doubled_quote_body(i, '`'),
            '`',
        ))
        .context(unterminated.clone()),
    );
    let bracketed = move |input: &mut Input<'a>| -> IResult<String> {
        if dialect != Dialect::Sqlite {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        preceded(
            '[',
            cut_err(terminated(take_till(0.., ']'), ']')).context(unterminated.clone()),
        )
        .map(str::to_string)
        .parse_next(input)
    };

    alt((double_quoted, backquoted, bracketed))
        .map(Token::Quoted)
        .parse_next(input)
}

fn number<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        digit1,
        opt(('.', digit0)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .map(Token::Number)
        .parse_next(input)
}

/// Bare identifiers and keywords. Unicode letters are accepted.
fn word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$')
        .verify(|s: &str| {
            s.chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
        })
        .map(Token::Word)
        .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        ','.value(Token::Comma),
        ';'.value(Token::Semicolon),
        '.'.value(Token::Dot),
        one_of(|c: char| c.is_ascii_punctuation()).map(Token::Symbol),
    ))
    .parse_next(input)
}

/// Parse a single token with position tracking.
fn positioned_token<'a>(input: &mut Input<'a>, dialect: Dialect) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        whitespace,
        line_comment,  // Must come before punctuation ('-', '#')
        block_comment, // Must come before punctuation ('/')
        |i: &mut Input<'a>| string_literal(i, dialect),
        |i: &mut Input<'a>| quoted_identifier(i, dialect),
        number, // Must come before word
        word,
        punctuation,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    dialect: Dialect,
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input, self.dialect) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, MalformedInputError> {
        let tokens = self.tokens;
        self.diagnostics.finish().map(|_| tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E103 (unexpected character) if no diagnostic context
    /// is attached.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(DiagnosticCode::E103)
            .with_label(span, DiagnosticCode::E103.description())
    }
}

/// Tokenize a DDL script, collecting every lexical error.
///
/// # Errors
///
/// Returns [`MalformedInputError`] holding one diagnostic per lexical error.
pub(crate) fn tokenize(
    input: &str,
    dialect: Dialect,
) -> Result<Vec<PositionedToken<'_>>, MalformedInputError> {
    let mut lexer = Lexer::new(dialect);
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
