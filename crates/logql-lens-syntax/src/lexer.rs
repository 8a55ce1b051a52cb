//! # Lexer - Tokenizing LogQL Source
//!
//! This module provides the first stage of parsing: breaking query text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! **Every byte in the input appears in exactly one token**. Whitespace and
//! comments become trivia tokens, and characters no rule accepts become
//! `UNKNOWN` tokens, so round-tripping always works:
//!
//! ```
//! use logql_lens_syntax::lexer::lex;
//!
//! let input = "{app=\"api\"} |= `timeout` # slow ones";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Keywords
//!
//! The lexer knows no keywords. `json`, `by`, `sum` and friends are lexed as
//! `IDENTIFIER` and the grammar remaps them where they are legal, so a label
//! may still be called `json` inside a stream selector.
//!
//! [`TokenKind::to_syntax_kind`] converts the Logos enum into [`SyntaxKind`].
//!
//! [`SyntaxKind`]: crate::syntax_kind::SyntaxKind

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// Nothing is skipped: trivia is kept so the tree stays lossless.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    Comment,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    /// Double quotes allow escapes, backticks are raw.
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"`[^`]*`")]
    String,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"([0-9]+(\.[0-9]+)?(ns|us|µs|ms|s|m|h|d|w|y))+")]
    Duration,

    #[regex(r"[0-9]+(\.[0-9]+)?([kKmMgGtTpPeE]i?)?[bB]")]
    Bytes,

    #[regex(r"--[a-zA-Z][a-zA-Z-]*")]
    ParserFlag,

    #[token("=")]
    Eq,

    #[token("!=")]
    Neq,

    #[token("=~")]
    Re,

    #[token("!~")]
    Nre,

    #[token("!>")]
    Npa,

    /// A `!` that starts no operator. Kept apart from lexer errors so it
    /// never swallows the quote that follows it.
    #[token("!")]
    Bang,

    #[token("==")]
    Eql,

    #[token(">")]
    Gtr,

    #[token(">=")]
    Gte,

    #[token("<")]
    Lss,

    #[token("<=")]
    Lte,

    #[token("|")]
    Pipe,

    #[token("|=")]
    PipeExact,

    #[token("|~")]
    PipeMatch,

    #[token("|>")]
    PipePattern,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    Mul,

    #[token("/")]
    Div,

    #[token("%")]
    Mod,

    #[token("^")]
    Pow,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Identifier => SyntaxKind::IDENTIFIER,
            TokenKind::String => SyntaxKind::STRING,
            TokenKind::Number => SyntaxKind::NUMBER,
            TokenKind::Duration => SyntaxKind::DURATION,
            TokenKind::Bytes => SyntaxKind::BYTES,
            TokenKind::ParserFlag => SyntaxKind::PARSER_FLAG,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Neq => SyntaxKind::NEQ,
            TokenKind::Re => SyntaxKind::RE,
            TokenKind::Nre => SyntaxKind::NRE,
            TokenKind::Npa => SyntaxKind::NPA,
            TokenKind::Bang => SyntaxKind::UNKNOWN,
            TokenKind::Eql => SyntaxKind::EQL,
            TokenKind::Gtr => SyntaxKind::GTR,
            TokenKind::Gte => SyntaxKind::GTE,
            TokenKind::Lss => SyntaxKind::LSS,
            TokenKind::Lte => SyntaxKind::LTE,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::PipeExact => SyntaxKind::PIPE_EXACT,
            TokenKind::PipeMatch => SyntaxKind::PIPE_MATCH,
            TokenKind::PipePattern => SyntaxKind::PIPE_PATTERN,
            TokenKind::Add => SyntaxKind::ADD,
            TokenKind::Sub => SyntaxKind::SUB,
            TokenKind::Mul => SyntaxKind::MUL,
            TokenKind::Div => SyntaxKind::DIV,
            TokenKind::Mod => SyntaxKind::MOD,
            TokenKind::Pow => SyntaxKind::POW,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Unrecognised input, e.g. `@` or an unterminated quote
            Err(()) => SyntaxKind::UNKNOWN,
        };
        tokens.push(Token { kind, text });
    }

    tokens
}
