use std::fmt;

use crate::{location::Position, span::Span};

/// Token kinds of the TaskFlow language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Task,
    Priority,
    Depends,
    Let,
    If,
    Else,
    Repeat,
    While,
    Times,
    Run,
    Log,
    True,
    False,
    And,
    Or,
    Not,

    // Literals
    Identifier,
    Number,
    String,

    // Comparison operators
    EqualEqual,   // ==
    NotEqual,     // !=
    LessEqual,    // <=
    GreaterEqual, // >=
    Less,         // <
    Greater,      // >

    // Arithmetic operators
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Colon,        // :
    Equals,       // =
}

impl TokenKind {
    /// Classify a word as a keyword, or `None` for a plain identifier.
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "task" => TokenKind::Task,
            "priority" => TokenKind::Priority,
            "depends" => TokenKind::Depends,
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "repeat" => TokenKind::Repeat,
            "while" => TokenKind::While,
            "times" => TokenKind::Times,
            "run" => TokenKind::Run,
            "log" => TokenKind::Log,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            _ => return None,
        };
        Some(kind)
    }

    /// Human description used in expected-token lists.
    pub fn description(&self) -> &'static str {
        match self {
            TokenKind::Task => "`task`",
            TokenKind::Priority => "`priority`",
            TokenKind::Depends => "`depends`",
            TokenKind::Let => "`let`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::Repeat => "`repeat`",
            TokenKind::While => "`while`",
            TokenKind::Times => "`times`",
            TokenKind::Run => "`run`",
            TokenKind::Log => "`log`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::And => "`and`",
            TokenKind::Or => "`or`",
            TokenKind::Not => "`not`",

            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",

            TokenKind::EqualEqual => "`==`",
            TokenKind::NotEqual => "`!=`",
            TokenKind::LessEqual => "`<=`",
            TokenKind::GreaterEqual => "`>=`",
            TokenKind::Less => "`<`",
            TokenKind::Greater => "`>`",

            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",

            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Equals => "`=`",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A classified lexical unit with its source text and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// The exact source text of the token, quotes included for strings
    pub lexeme: &'src str,
    pub span: Span,
    pub position: Position,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, lexeme: &'src str, span: Span, position: Position) -> Self {
        Self {
            kind,
            lexeme,
            span,
            position,
        }
    }

    /// 1-based line of the first character
    pub fn line(&self) -> usize {
        self.position.line
    }

    /// 1-based column of the first character
    pub fn column(&self) -> usize {
        self.position.column
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme)
    }
}
