use std::fmt;

/// The class of failure a [`Diagnostic`](super::Diagnostic) describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The lexer met a character that starts no token.
    UnexpectedCharacter,

    /// The parser met a token that continues no production.
    UnexpectedToken,

    /// Input ended while a token or production needed more.
    UnexpectedEndOfInput,

    /// A literal was well-formed but its value cannot be represented.
    InvalidLiteral,

    /// Blocks or expressions nest deeper than the parser allows.
    NestingTooDeep,
}

impl DiagnosticKind {
    /// Returns `true` for the kinds only the lexer raises.
    ///
    /// This classifies the kind, not the phase: an unterminated string is
    /// raised by the lexer but has kind [`UnexpectedEndOfInput`], which is
    /// shared with the parser. Use [`ErrorCode`](super::ErrorCode) (`E0xx`
    /// lexer, `E1xx` parser) to tell the phases apart.
    ///
    /// [`UnexpectedEndOfInput`]: DiagnosticKind::UnexpectedEndOfInput
    pub fn is_lexical(&self) -> bool {
        matches!(self, DiagnosticKind::UnexpectedCharacter)
    }

    /// Returns `true` for failures raised while parsing tokens.
    pub fn is_syntax(&self) -> bool {
        !self.is_lexical()
    }

    /// Human description of the failure kind.
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticKind::UnexpectedCharacter => "unexpected character",
            DiagnosticKind::UnexpectedToken => "unexpected token",
            DiagnosticKind::UnexpectedEndOfInput => "unexpected end of input",
            DiagnosticKind::InvalidLiteral => "invalid literal",
            DiagnosticKind::NestingTooDeep => "nesting too deep",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
