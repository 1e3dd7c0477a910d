//! Lexical analyzer for TaskFlow source text.
//!
//! The lexer converts source text into a sequence of located [`Token`]s.
//! Whitespace and `//` line comments are consumed here and never reach the
//! parser. Lexing is fail-fast: the first character that starts no token
//! ends the run with a [`Diagnostic`].
//!
//! The public entry point is [`tokenize`].

use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, one_of, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    location::LineIndex,
    span::Span,
    tokens::{Token, TokenKind},
};

/// Diagnostic context attached to winnow errors via `.context()`.
///
/// Only failures that have committed to a token (currently just an open
/// string literal) carry a context; a context-free failure means the
/// current character starts no token at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse line comment starting with '//'
fn line_comment(input: &mut Input<'_>) -> IResult<()> {
    preceded("//", take_while(0.., |c: char| c != '\n'))
        .void()
        .parse_next(input)
}

/// Parse whitespace: spaces, tabs, newlines and carriage returns
fn whitespace(input: &mut Input<'_>) -> IResult<()> {
    take_while(1.., |c: char| matches!(c, ' ' | '\t' | '\n' | '\r'))
        .void()
        .parse_next(input)
}

/// Skip any run of whitespace and comments
fn trivia(input: &mut Input<'_>) -> IResult<()> {
    repeat(0.., alt((whitespace, line_comment))).parse_next(input)
}

/// Parse a string literal: `"` up to the next `"`, verbatim.
///
/// There are no escape sequences, and the content may span lines. Once the
/// opening quote is seen the parser commits, so a missing closing quote is
/// reported as an unterminated string instead of an unexpected character.
fn string_literal(input: &mut Input<'_>) -> IResult<TokenKind> {
    preceded(
        '"',
        cut_err(terminated(take_while(0.., |c: char| c != '"'), '"')).context(
            LexerDiagnostic {
                code: ErrorCode::E001,
            },
        ),
    )
    .value(TokenKind::String)
    .parse_next(input)
}

/// Parse a number: digits, optionally followed by `.` and more digits
fn number_literal(input: &mut Input<'_>) -> IResult<TokenKind> {
    (digit1, opt(('.', digit1)))
        .value(TokenKind::Number)
        .parse_next(input)
}

/// Parse an identifier or keyword.
///
/// Keywords are recognized on the whole word, so `tasks` and `iffy` are
/// identifiers.
fn word(input: &mut Input<'_>) -> IResult<TokenKind> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(|word: &str| TokenKind::keyword(word).unwrap_or(TokenKind::Identifier))
        .parse_next(input)
}

/// Parse two-character comparison operators (must come before single chars)
fn multi_char_operator(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((
        literal("==").value(TokenKind::EqualEqual),
        literal("!=").value(TokenKind::NotEqual),
        literal("<=").value(TokenKind::LessEqual),
        literal(">=").value(TokenKind::GreaterEqual),
    ))
    .parse_next(input)
}

/// Parse single character tokens
fn single_char_token(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((
        '<'.value(TokenKind::Less),
        '>'.value(TokenKind::Greater),
        '='.value(TokenKind::Equals),
        '+'.value(TokenKind::Plus),
        '-'.value(TokenKind::Minus),
        '*'.value(TokenKind::Star),
        '/'.value(TokenKind::Slash),
        '{'.value(TokenKind::LeftBrace),
        '}'.value(TokenKind::RightBrace),
        '('.value(TokenKind::LeftParen),
        ')'.value(TokenKind::RightParen),
        '['.value(TokenKind::LeftBracket),
        ']'.value(TokenKind::RightBracket),
        ','.value(TokenKind::Comma),
        ':'.value(TokenKind::Colon),
    ))
    .parse_next(input)
}

/// Parse a single token kind at the current position
fn token_kind(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((
        string_literal,      // Must come before any single char
        number_literal,      // Digits never start a word
        word,                // Keywords and identifiers
        multi_char_operator, // Must come before single char operators
        single_char_token,   // Single character tokens
    ))
    .parse_next(input)
}

/// Lexer state for one tokenization run.
struct Lexer<'a> {
    source: &'a str,
    index: LineIndex<'a>,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            index: LineIndex::new(source),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole source, stopping at the first error.
    fn tokenize(mut self) -> Result<Vec<Token<'a>>> {
        let mut input = LocatingSlice::new(self.source);

        loop {
            let trivia_start = input.current_token_start();
            trivia(&mut input).map_err(|err| self.convert_err_mode(err, trivia_start))?;

            if input.eof_offset() == 0 {
                break;
            }

            let start = input.current_token_start();
            let kind = token_kind(&mut input).map_err(|err| self.convert_err_mode(err, start))?;
            let end = input.current_token_start();

            self.push(kind, start..end);
        }

        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, range: std::ops::Range<usize>) {
        let source = self.source;
        let position = self.index.position(range.start);
        let lexeme = &source[range.clone()];
        self.tokens.push(Token::new(kind, lexeme, Span::new(range), position));
    }

    /// Convert a winnow error raised for the token starting at `start`.
    ///
    /// An error carrying an `E001` context is an unterminated string, located
    /// at the end of input. Anything else means the character at `start`
    /// begins no token.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        start: usize,
    ) -> Diagnostic {
        let context = match &err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx.context().next().copied(),
            ErrMode::Incomplete(_) => None,
        };

        let diagnostic = match context {
            Some(LexerDiagnostic {
                code: ErrorCode::E001,
            }) => {
                let end = self.source.len();
                Diagnostic::unterminated_string(Span::new(end..end))
            }
            _ => match self.source[start..].chars().next() {
                Some(character) => Diagnostic::unexpected_character(
                    character,
                    Span::new(start..start + character.len_utf8()),
                ),
                // Every token alternative fails only on a character, never on
                // empty input, so this arm is not reached by `tokenize`.
                None => Diagnostic::unexpected_end_of_input(std::iter::empty(), None),
            },
        };

        diagnostic.locate(&self.index)
    }
}

/// Convert source text into located tokens.
///
/// Whitespace and comments are discarded. The first character that starts no
/// token, or a string literal missing its closing quote, ends tokenization
/// with a [`Diagnostic`].
///
/// # Example
///
/// ```
/// # use taskflow_parser::{tokenize, TokenKind};
///
/// let tokens = tokenize("task build { run \"make\" }").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
///
/// assert_eq!(kinds, [
///     TokenKind::Task,
///     TokenKind::Identifier,
///     TokenKind::LeftBrace,
///     TokenKind::Run,
///     TokenKind::String,
///     TokenKind::RightBrace,
/// ]);
/// assert_eq!(tokens[4].lexeme, "\"make\"");
/// ```
pub fn tokenize(source: &str) -> std::result::Result<Vec<Token<'_>>, Diagnostic> {
    Lexer::new(source).tokenize()
}
