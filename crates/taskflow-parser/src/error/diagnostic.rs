//! The diagnostic type reported for a failed parse.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::{
    error::{DiagnosticKind, ErrorCode},
    location::{LineIndex, Position},
    span::Span,
};

/// A structured description of a lexical or syntactic failure.
///
/// A diagnostic records:
/// - the failure [`DiagnosticKind`] and its [`ErrorCode`]
/// - a primary message
/// - the byte [`Span`] and 1-based [`Position`] of the offending input, when known
/// - the full text of the offending source line
/// - for token-class failures, the sorted set of acceptable token descriptions
///   and the text of the token actually found
/// - optional help text
///
/// Location fields are absent when the input ended before any token was
/// seen (for example an empty source).
///
/// # Example
///
/// ```text
/// error[E100]: unexpected token `10`
///  --> 1:16
///   |
/// 1 | task t { let x 10 }
///   |                ^^ unexpected token
///   |
///   = expected: `=`
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error[{code}]: {message}")]
pub struct Diagnostic {
    kind: DiagnosticKind,
    code: ErrorCode,
    message: String,
    span: Option<Span>,
    position: Option<Position>,
    source_line: Option<String>,
    expected: Vec<String>,
    found: Option<String>,
    character: Option<char>,
    help: Option<String>,
}

impl Diagnostic {
    /// A character that starts no token.
    pub(crate) fn unexpected_character(character: char, span: Span) -> Self {
        Self::new(
            DiagnosticKind::UnexpectedCharacter,
            ErrorCode::E002,
            format!("unexpected character `{character}`"),
        )
        .with_span(span)
        .with_found(character.to_string())
        .with_character(character)
        .with_help("remove this character or move it into a string literal")
    }

    /// A string literal still open when the source ends.
    pub(crate) fn unterminated_string(end_of_input: Span) -> Self {
        Self::new(
            DiagnosticKind::UnexpectedEndOfInput,
            ErrorCode::E001,
            "unterminated string literal",
        )
        .with_span(end_of_input)
        .with_expected(["`\"`"])
        .with_help("add closing `\"`")
    }

    /// A token that continues none of the `expected` productions.
    pub(crate) fn unexpected_token<'a>(
        found: &str,
        expected: impl IntoIterator<Item = &'a str>,
        span: Span,
    ) -> Self {
        Self::new(
            DiagnosticKind::UnexpectedToken,
            ErrorCode::E100,
            format!("unexpected token `{found}`"),
        )
        .with_span(span)
        .with_found(found)
        .with_expected(expected)
    }

    /// Input ended while one of `expected` was still required.
    ///
    /// `span` is `None` when the source holds no tokens at all.
    pub(crate) fn unexpected_end_of_input<'a>(
        expected: impl IntoIterator<Item = &'a str>,
        span: Option<Span>,
    ) -> Self {
        let diag = Self::new(
            DiagnosticKind::UnexpectedEndOfInput,
            ErrorCode::E101,
            "unexpected end of input",
        )
        .with_expected(expected)
        .with_help("the source may be incomplete");

        match span {
            Some(span) => diag.with_span(span),
            None => diag,
        }
    }

    /// A number literal whose value cannot be represented.
    pub(crate) fn number_out_of_range(lexeme: &str, span: Span) -> Self {
        Self::new(
            DiagnosticKind::InvalidLiteral,
            ErrorCode::E102,
            format!("number literal `{lexeme}` is out of range"),
        )
        .with_span(span)
        .with_found(lexeme)
        .with_help(format!(
            "integer literals must be between {} and {}",
            i64::MIN,
            i64::MAX
        ))
    }

    /// Nesting past `limit` levels, reported at the token that opened the
    /// level over the limit.
    pub(crate) fn nesting_too_deep(limit: usize, span: Option<Span>) -> Self {
        let diag = Self::new(
            DiagnosticKind::NestingTooDeep,
            ErrorCode::E103,
            format!("nesting exceeds the limit of {limit} levels"),
        )
        .with_help("move part of the expression into a `let` binding");

        match span {
            Some(span) => diag.with_span(span),
            None => diag,
        }
    }

    /// Fill in line, column and source line text from the span.
    pub(crate) fn locate(mut self, index: &LineIndex<'_>) -> Self {
        if let Some(span) = self.span {
            let position = index.position(span.start());
            self.source_line = index.line_text(position.line).map(str::to_string);
            self.position = Some(position);
        }
        self
    }

    /// Get the failure kind.
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the byte span of the offending input, if known.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Get the 1-based line and column, if known.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Get the 1-based line, if known.
    pub fn line(&self) -> Option<usize> {
        self.position.map(|p| p.line)
    }

    /// Get the 1-based column, if known.
    pub fn column(&self) -> Option<usize> {
        self.position.map(|p| p.column)
    }

    /// Get the full text of the offending source line, if known.
    pub fn source_line(&self) -> Option<&str> {
        self.source_line.as_deref()
    }

    /// Get the sorted descriptions of the tokens that would have been accepted.
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Get the text of the token or character actually found.
    pub fn found(&self) -> Option<&str> {
        self.found.as_deref()
    }

    /// Get the offending character of an unexpected-character failure.
    pub fn character(&self) -> Option<char> {
        self.character
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    fn new(kind: DiagnosticKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            span: None,
            position: None,
            source_line: None,
            expected: Vec::new(),
            found: None,
            character: None,
            help: None,
        }
    }

    fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    fn with_expected<'a>(mut self, expected: impl IntoIterator<Item = &'a str>) -> Self {
        self.expected = expected
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        self
    }

    fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    fn with_character(mut self, character: char) -> Self {
        self.character = Some(character);
        self
    }

    fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}
