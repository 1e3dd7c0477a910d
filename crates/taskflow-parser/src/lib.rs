//! # TaskFlow Parser
//!
//! Front end for the TaskFlow task description language. This crate turns
//! source text describing named tasks, their options and their statement
//! bodies into a typed syntax tree, or into a single located [`Diagnostic`]
//! when the text is malformed.
//!
//! ## Usage
//!
//! ```
//! # use taskflow_parser::{parse, Diagnostic, ast::{Priority, Statement}};
//!
//! fn main() -> Result<(), Diagnostic> {
//!     let source = r#"
//!         task build {
//!             priority: high
//!             depends: [fetch]
//!             repeat 3 times {
//!                 run "make"
//!             }
//!         }
//!     "#;
//!
//!     let program = parse(source)?;
//!     let build = program.task("build").unwrap();
//!
//!     assert_eq!(build.priority, Some(Priority::High));
//!     assert_eq!(build.depends, Some(vec!["fetch".to_string()]));
//!     assert!(matches!(build.statements[0], Statement::Repeat { .. }));
//!     Ok(())
//! }
//! ```
//!
//! Failures are structured data. Use [`report::Reporter`] for a plain-text
//! rendering, or [`report::GraphicalReport`] to hand the diagnostic to a
//! `miette` report handler.

pub mod ast;
pub mod error;
mod lexer;
mod location;
mod parser;
pub mod report;
mod span;
mod tokens;

pub use error::{Diagnostic, DiagnosticKind, ErrorCode};
pub use lexer::tokenize;
pub use location::{LineIndex, Position};
pub use span::Span;
pub use tokens::{Token, TokenKind};

use log::{debug, trace};

use ast::Program;

/// Parse source text into a [`Program`].
///
/// This is the main entry point. It runs the whole pipeline:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Parse** - Build the syntax tree from tokens
///
/// The first failure in either step ends the run; no partial tree is
/// returned. The resulting [`Diagnostic`] carries the line, column and text
/// of the offending source line whenever a location is known.
///
/// # Example
///
/// ```
/// # use taskflow_parser::{parse, DiagnosticKind};
///
/// let program = parse("task a { } task b { }").unwrap();
/// assert_eq!(program.len(), 2);
///
/// let err = parse("task broken { log \"x\"").unwrap_err();
/// assert_eq!(err.kind(), DiagnosticKind::UnexpectedEndOfInput);
/// assert_eq!((err.line(), err.column()), (Some(1), Some(22)));
/// assert!(err.expected().iter().any(|e| e == "`}`"));
/// ```
pub fn parse(source: &str) -> Result<Program, Diagnostic> {
    let tokens = lexer::tokenize(source).inspect_err(|err| {
        debug!(code:? = err.code(); "Tokenization failed");
    })?;
    debug!(tokens = tokens.len(); "Tokenized source");

    let program = parser::build_program(&tokens).map_err(|err| {
        let err = err.locate(&LineIndex::new(source));
        debug!(code:? = err.code(), kind:? = err.kind(); "Parsing failed");
        err
    })?;

    debug!(tasks = program.len(); "Parsed program");
    trace!(program:?; "Syntax tree");

    Ok(program)
}
