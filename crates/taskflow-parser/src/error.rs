//! Diagnostics for the TaskFlow front end.
//!
//! Every failed lexing or parsing run produces exactly one [`Diagnostic`].
//! The diagnostic is plain structured data (kind, error code, location,
//! expected tokens, found token) so callers and tests can inspect it
//! without looking at rendered text. Rendering lives in
//! [`report`](crate::report).
//!
//! # Example
//!
//! ```
//! # use taskflow_parser::{parse, error::{DiagnosticKind, ErrorCode}};
//!
//! let err = parse("task t { let x 10 }").unwrap_err();
//!
//! assert_eq!(err.kind(), DiagnosticKind::UnexpectedToken);
//! assert_eq!(err.code(), ErrorCode::E100);
//! assert_eq!(err.expected(), ["`=`"]);
//! assert_eq!(err.found(), Some("10"));
//! assert_eq!((err.line(), err.column()), (Some(1), Some(16)));
//! ```

mod diagnostic;
mod error_code;
mod kind;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use kind::DiagnosticKind;

/// A type alias for `Result<T, Diagnostic>`.
pub(crate) type Result<T> = std::result::Result<T, Diagnostic>;
