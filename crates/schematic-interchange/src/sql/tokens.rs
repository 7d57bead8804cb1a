//! Token definitions for the SQL DDL lexer.

use std::fmt;

use crate::span::Span;

/// A lexical token of a DDL script.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    /// Bare identifier or keyword, as written.
    Word(&'a str),
    /// Quoted identifier (`"x"`, `` `x` `` or `[x]`), unescaped.
    Quoted(String),
    /// Single-quoted string literal, unescaped.
    StringLiteral(String),
    /// Numeric literal, as written.
    Number(&'a str),

    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Dot,
    /// Any other punctuation character (`=`, `:`, `-`, ...).
    Symbol(char),

    Whitespace,
    LineComment(&'a str),
    BlockComment,
}

impl Token<'_> {
    /// Whitespace and comments carry no meaning for the parser.
    pub(crate) fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::LineComment(_) | Token::BlockComment
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "{word}"),
            Token::Quoted(name) => write!(f, "\"{name}\""),
            Token::StringLiteral(text) => write!(f, "'{text}'"),
            Token::Number(number) => write!(f, "{number}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Symbol(c) => write!(f, "{c}"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::LineComment(_) | Token::BlockComment => write!(f, "comment"),
        }
    }
}

/// A token together with its location in the script.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PositionedToken<'a> {
    pub token: Token<'a>,
    pub span: Span,
}

impl<'a> PositionedToken<'a> {
    pub(crate) fn new(token: Token<'a>, span: Span) -> Self {
        Self { token, span }
    }

    /// Returns `true` if this is the bare word `keyword`, ignoring case.
    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.token, Token::Word(word) if word.eq_ignore_ascii_case(keyword))
    }

    /// Returns `true` if this is a bare word matching any of `keywords`.
    pub(crate) fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| self.is_keyword(keyword))
    }
}
