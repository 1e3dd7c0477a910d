use proptest::prelude::*;
use taskflow_parser::report::{GraphicalReport, ReportConfig, Reporter};
use taskflow_parser::{DiagnosticKind, ErrorCode, Position, parse, tokenize};

#[test]
fn test_missing_equals() {
    let err = parse("task t { let x 10 }").expect_err("should fail");

    assert_eq!(err.kind(), DiagnosticKind::UnexpectedToken);
    assert_eq!(err.code(), ErrorCode::E100);
    assert_eq!(err.expected(), ["`=`"]);
    assert_eq!(err.found(), Some("10"));
    assert_eq!(err.position(), Some(Position::new(1, 16)));
    assert_eq!(err.source_line(), Some("task t { let x 10 }"));
}

#[test]
fn test_invalid_priority() {
    let err = parse("task t { priority: invalid }").expect_err("should fail");

    assert_eq!(err.kind(), DiagnosticKind::UnexpectedToken);
    assert_eq!(err.found(), Some("invalid"));
    assert_eq!(err.expected(), ["`high`", "`low`", "`medium`"]);
    assert_eq!(err.position(), Some(Position::new(1, 20)));
}

#[test]
fn test_missing_closing_brace() {
    let err = parse("task broken { log \"x\"").expect_err("should fail");

    assert_eq!(err.kind(), DiagnosticKind::UnexpectedEndOfInput);
    assert_eq!(err.code(), ErrorCode::E101);
    assert_eq!(err.found(), None);
    assert_eq!(err.position(), Some(Position::new(1, 22)));
    assert!(err.expected().iter().any(|e| e == "`}`"));
}

#[test]
fn test_unterminated_string_is_reproducible() {
    let source = "task t { log \"hello }";

    for _ in 0..3 {
        let err = parse(source).expect_err("should fail");

        assert_eq!(err.kind(), DiagnosticKind::UnexpectedEndOfInput);
        assert_eq!(err.code(), ErrorCode::E001);
        assert_eq!(err.expected(), ["`\"`"]);
        assert_eq!(err.position(), Some(Position::new(1, 22)));
        assert_eq!(err.span().map(|s| s.start()), Some(source.len()));
    }
}

#[test]
fn test_unterminated_string_phase_is_in_the_code() {
    let err = parse("task t { log \"open").expect_err("should fail");

    assert_eq!(err.code(), ErrorCode::E001);
    assert!(err.code().as_str().starts_with("E0"));
    assert!(!err.kind().is_lexical());
    assert!(err.kind().is_syntax());
}

#[test]
fn test_unexpected_character_location() {
    let source = "task t {\n  let total = 10\n  log total % 3\n}";
    let err = parse(source).expect_err("should fail");

    assert_eq!(err.kind(), DiagnosticKind::UnexpectedCharacter);
    assert!(err.kind().is_lexical());
    assert_eq!(err.code(), ErrorCode::E002);
    assert_eq!(err.character(), Some('%'));
    assert_eq!(err.position(), Some(Position::new(3, 13)));
    assert_eq!(err.source_line(), Some("  log total % 3"));
}

#[test]
fn test_lexer_error_wins_over_syntax_error() {
    let err = parse("task { } @").expect_err("should fail");
    assert_eq!(err.kind(), DiagnosticKind::UnexpectedCharacter);
}

#[test]
fn test_comment_only_source_has_no_location() {
    let err = parse("// nothing to do\n").expect_err("should fail");

    assert_eq!(err.kind(), DiagnosticKind::UnexpectedEndOfInput);
    assert_eq!(err.expected(), ["`task`"]);
    assert_eq!(err.line(), None);
    assert_eq!(err.column(), None);
    assert_eq!(err.source_line(), None);
}

#[test]
fn test_error_on_later_line_with_unicode() {
    let source = "task t {\n  log \"größe\" ]\n}";
    let err = parse(source).expect_err("should fail");

    assert_eq!(err.found(), Some("]"));
    assert_eq!(err.position(), Some(Position::new(2, 15)));
}

#[test]
fn test_diagnostic_display() {
    let err = parse("task t { run 1 }").expect_err("should fail");
    assert_eq!(err.to_string(), "error[E100]: unexpected token `1`");
}

#[test]
fn test_rendered_report_keeps_structured_fields() {
    let source = "task t {\n  repeat 3 {\n  }\n}";
    let err = parse(source).expect_err("should fail");
    let before = err.clone();

    let text = Reporter::new(ReportConfig::default()).render(&err);

    assert!(text.starts_with("error[E100]: unexpected token `{`"));
    assert!(text.contains(" --> 2:12"));
    assert!(text.contains("2 |   repeat 3 {"));
    assert!(text.contains("`times`"));
    assert_eq!(err, before);

    let report = GraphicalReport::new(&err, source);
    assert_eq!(report.to_string(), "unexpected token `{`");
}

#[test]
fn test_deeply_nested_input_fails_cleanly() {
    let depth = 2000;
    let sources = [
        format!("task t {{ log {}1{} }}", "(".repeat(depth), ")".repeat(depth)),
        format!("task t {{ log {}x }}", "not ".repeat(depth)),
        format!("task t {{ log {}1 }}", "-".repeat(depth)),
        format!("task t {{ log {}{} }}", "[".repeat(depth), "]".repeat(depth)),
        format!("task t {{ {}{} }}", "while x { ".repeat(depth), "}".repeat(depth)),
    ];

    for source in &sources {
        let err = parse(source).expect_err("should fail");

        assert_eq!(err.kind(), DiagnosticKind::NestingTooDeep);
        assert_eq!(err.code(), ErrorCode::E103);
        assert_eq!(err.line(), Some(1));
        assert!(err.help().is_some());
    }
}

#[test]
fn test_long_operator_chain_fails_cleanly() {
    let source = format!("task t {{ log {} }}", vec!["x"; 100_000].join(" + "));
    let err = parse(&source).expect_err("should fail");

    assert_eq!(err.code(), ErrorCode::E103);
    assert!(
        Reporter::new(ReportConfig::default())
            .render(&err)
            .starts_with("error[E103]: nesting exceeds the limit")
    );
}

#[test]
fn test_nesting_within_limits_parses_and_drops() {
    let parens = format!("{}x{}", "(".repeat(60), ")".repeat(60));
    let chain = vec![parens.as_str(); 1000].join(" * ");
    let source = format!("task t {{ if {chain} {{ log {chain} }} }}");

    let program = parse(&source).expect("should parse");
    assert_eq!(program.tasks[0].statements.len(), 1);

    let copy = program.clone();
    assert_eq!(copy, program);
}

#[test]
fn test_tokenize_is_public() {
    let tokens = tokenize("task t { }").expect("should tokenize");
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[1].lexeme, "t");
    assert_eq!(tokens[1].column(), 6);
}

proptest! {
    #[test]
    fn diagnostics_are_located_inside_source(source in "\\PC{0,80}") {
        if let Err(err) = parse(&source) {
            if let Some(span) = err.span() {
                prop_assert!(span.end() <= source.len());
                prop_assert!(err.position().is_some());
                prop_assert!(err.source_line().is_some());
            } else {
                prop_assert_eq!(err.kind(), DiagnosticKind::UnexpectedEndOfInput);
            }
        }
    }

    #[test]
    fn nested_parens_parse_or_report_nesting(depth in 0usize..200) {
        let source = format!("task t {{ log {}1{} }}", "(".repeat(depth), ")".repeat(depth));

        match parse(&source) {
            Ok(program) => prop_assert!(depth <= 64 && program.len() == 1),
            Err(err) => {
                prop_assert!(depth > 64);
                prop_assert_eq!(err.kind(), DiagnosticKind::NestingTooDeep);
            }
        }
    }

    #[test]
    fn truncated_programs_fail_at_end_of_input(cut in 1usize..40) {
        let source = "task t { let x = (1 + 2) * 3 log x }";
        let truncated = &source[..source.len() - cut.min(source.len() - 1)];

        let err = parse(truncated).expect_err("truncated source should fail");
        prop_assert!(matches!(
            err.kind(),
            DiagnosticKind::UnexpectedEndOfInput | DiagnosticKind::UnexpectedToken
        ));
    }
}
