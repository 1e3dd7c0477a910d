//! Adapter from [`Diagnostic`] to `miette` diagnostics.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceCode};

use crate::error::Diagnostic;

/// A [`Diagnostic`] paired with its source text, renderable by any `miette`
/// report handler.
///
/// # Example
///
/// ```
/// # use taskflow_parser::{parse, report::GraphicalReport};
///
/// let source = "task t { priority: urgent }";
/// let err = parse(source).unwrap_err();
/// let report = GraphicalReport::new(&err, source);
///
/// assert_eq!(report.to_string(), "unexpected token `urgent`");
/// ```
pub struct GraphicalReport<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
}

impl<'a> GraphicalReport<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }

    /// Label text under the primary span.
    fn label(&self) -> String {
        match self.diag.expected() {
            [] => self.diag.kind().description().to_string(),
            [only] => format!("expected {only}"),
            expected => format!("expected one of {}", expected.join(", ")),
        }
    }
}

impl fmt::Debug for GraphicalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicalReport")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for GraphicalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for GraphicalReport<'_> {}

impl MietteDiagnostic for GraphicalReport<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.diag.code()) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.diag.span()?;
        let label = LabeledSpan::new_primary_with_span(Some(self.label()), span);
        Some(Box::new(std::iter::once(label)))
    }
}
