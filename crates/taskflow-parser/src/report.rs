//! Human-readable rendering of diagnostics.
//!
//! [`Reporter`] produces a compact rustc-like plain-text report. For richer
//! terminal output, wrap the diagnostic in a [`GraphicalReport`] and hand it
//! to any `miette` report handler.
//!
//! Rendering only reads the [`Diagnostic`]; its structured fields are the
//! same before and after.

mod graphical;

pub use graphical::GraphicalReport;

use std::fmt;

use crate::error::Diagnostic;

/// Options controlling which sections [`Reporter`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// Include the offending source line with a caret under the column.
    pub show_source_line: bool,
    /// Include the list of tokens that would have been accepted.
    pub show_expected: bool,
    /// Include help text.
    pub show_help: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_source_line: true,
            show_expected: true,
            show_help: true,
        }
    }
}

/// Plain-text diagnostic renderer.
///
/// # Example
///
/// ```
/// # use taskflow_parser::{parse, report::Reporter};
///
/// let err = parse("task t { let x 10 }").unwrap_err();
/// let text = Reporter::default().render(&err);
///
/// assert_eq!(text, "\
/// error[E100]: unexpected token `10`
///  --> 1:16
///   |
/// 1 | task t { let x 10 }
///   |                ^^ unexpected token
///   |
///   = expected: `=`");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Render `diag` to a string without a trailing newline.
    pub fn render(&self, diag: &Diagnostic) -> String {
        self.display(diag).to_string()
    }

    /// A [`fmt::Display`] view of the rendered report.
    pub fn display<'a>(&'a self, diag: &'a Diagnostic) -> impl fmt::Display + 'a {
        Rendered {
            config: &self.config,
            diag,
        }
    }
}

struct Rendered<'a> {
    config: &'a ReportConfig,
    diag: &'a Diagnostic,
}

impl Rendered<'_> {
    fn snippet(&self, f: &mut fmt::Formatter<'_>, pad: &str) -> fmt::Result {
        let (Some(position), Some(line_text)) = (self.diag.position(), self.diag.source_line())
        else {
            return Ok(());
        };

        let before = line_text.chars().take(position.column - 1);
        let indent: String = before.map(|c| if c == '\t' { '\t' } else { ' ' }).collect();
        let carets = "^".repeat(self.caret_width(line_text, position.column));

        write!(f, "\n{pad} |")?;
        write!(f, "\n{} | {line_text}", position.line)?;
        write!(
            f,
            "\n{pad} | {indent}{carets} {}",
            self.diag.kind().description()
        )
    }

    /// Characters of the span on its first line, at least one.
    fn caret_width(&self, line_text: &str, column: usize) -> usize {
        let Some(span) = self.diag.span() else {
            return 1;
        };

        let mut bytes = 0;
        let width = line_text
            .chars()
            .skip(column - 1)
            .take_while(|c| {
                bytes += c.len_utf8();
                bytes <= span.len()
            })
            .count();

        width.max(1)
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diag = self.diag;
        let gutter = diag.line().map_or(1, |line| line.to_string().len());
        let pad = " ".repeat(gutter);

        write!(f, "{diag}")?;

        if let Some(position) = diag.position() {
            write!(f, "\n{pad}--> {position}")?;
        }

        let show_snippet = self.config.show_source_line && diag.source_line().is_some();
        if show_snippet {
            self.snippet(f, &pad)?;
        }

        let show_expected = self.config.show_expected && !diag.expected().is_empty();
        let help = diag.help().filter(|_| self.config.show_help);

        if show_snippet && (show_expected || help.is_some()) {
            write!(f, "\n{pad} |")?;
        }
        if show_expected {
            write!(f, "\n{pad} = expected: {}", diag.expected().join(", "))?;
        }
        if let Some(help) = help {
            write!(f, "\n{pad} = help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn without_help() -> Reporter {
        Reporter::new(ReportConfig {
            show_help: false,
            ..ReportConfig::default()
        })
    }

    #[test]
    fn test_default_config_shows_everything() {
        let config = ReportConfig::default();
        assert!(config.show_source_line);
        assert!(config.show_expected);
        assert!(config.show_help);
        assert_eq!(Reporter::default().config(), &config);
    }

    #[test]
    fn test_render_unexpected_character() {
        let err = parse("task t {\n  log 10 % 3\n}").unwrap_err();
        let text = Reporter::default().render(&err);

        assert_eq!(
            text,
            "error[E002]: unexpected character `%`\n \
             --> 2:10\n  \
             |\n\
             2 |   log 10 % 3\n  \
             |          ^ unexpected character\n  \
             |\n  \
             = help: remove this character or move it into a string literal"
        );
    }

    #[test]
    fn test_render_end_of_input_points_past_last_token() {
        let err = parse("task broken { log \"x\"").unwrap_err();
        let text = without_help().render(&err);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "error[E101]: unexpected end of input");
        assert_eq!(lines[1], " --> 1:22");
        assert_eq!(lines[3], "1 | task broken { log \"x\"");
        assert_eq!(lines[4], "  |                      ^ unexpected end of input");
        assert!(lines[6].starts_with("  = expected: "));
        assert!(lines[6].contains("`}`"));
    }

    #[test]
    fn test_render_without_location() {
        let err = parse("  // nothing here\n").unwrap_err();
        let text = Reporter::default().render(&err);

        assert_eq!(
            text,
            "error[E101]: unexpected end of input\n  \
             = expected: `task`\n  \
             = help: the source may be incomplete"
        );
    }

    #[test]
    fn test_render_preserves_tabs_before_caret() {
        let err = parse("task t {\n\tlet x = @\n}").unwrap_err();
        let text = without_help().render(&err);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[3], "2 | \tlet x = @");
        assert_eq!(lines[4], "  | \t        ^ unexpected character");
    }

    #[test]
    fn test_caret_covers_multi_byte_token() {
        let err = parse("task t { run 42 }").unwrap_err();
        let lines: Vec<_> = without_help().render(&err).lines().map(String::from).collect();
        assert_eq!(lines[4], "  |              ^^ unexpected token");

        let err = parse("task t { log \"ü\" \"é\" }").unwrap_err();
        let lines: Vec<_> = without_help().render(&err).lines().map(String::from).collect();
        assert_eq!(lines[4], "  |                  ^^^ unexpected token");
    }

    #[test]
    fn test_render_sections_can_be_disabled() {
        let err = parse("task t { let x 10 }").unwrap_err();
        let reporter = Reporter::new(ReportConfig {
            show_source_line: false,
            show_expected: false,
            show_help: false,
        });

        assert_eq!(
            reporter.render(&err),
            "error[E100]: unexpected token `10`\n --> 1:16"
        );
    }

    #[test]
    fn test_render_multi_digit_line_numbers() {
        let source = format!("{}task t {{ log }}", "\n".repeat(11));
        let err = parse(&source).unwrap_err();
        let text = without_help().render(&err);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[1], "  --> 12:14");
        assert_eq!(lines[2], "   |");
        assert_eq!(lines[3], "12 | task t { log }");
        assert_eq!(lines[4], "   |              ^ unexpected token");
    }

    #[test]
    fn test_render_does_not_change_diagnostic() {
        let err = parse("task t { priority: urgent }").unwrap_err();
        let before = err.clone();
        let _ = Reporter::default().render(&err);
        assert_eq!(err, before);
    }
}
