use fsdir::command::{Command, Param};
use fsdir::parser::lexer::{TokenKind, tokenize};
use fsdir::parser::structural::{ElementKind, aggregate};
use fsdir::parser::{ParseErrorKind, Parser};

fn parse(source: &str) -> Vec<Command> {
    Parser::new(source.to_string(), 0)
        .parse()
        .expect("parse failed")
        .commands
}

fn parse_err(source: &str) -> fsdir::parser::ParseError {
    Parser::new(source.to_string(), 0)
        .parse()
        .expect_err("expected a parse error")
}

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source, 0)
        .expect("tokenize failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[test]
fn lexer_token_kinds() {
    assert_eq!(
        kinds("EDIT 'a.txt' APPEND('x') {y}\n"),
        vec![
            TokenKind::Identifier,
            TokenKind::FilePath,
            TokenKind::Identifier,
            TokenKind::Parameter,
            TokenKind::TextParameter,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn lexer_excludes_delimiters() {
    let source = "READ 'dir/file name.txt'";
    let tokens = tokenize(source, 0).unwrap();
    assert_eq!(tokens[0].text(source), "READ");
    assert_eq!(tokens[1].text(source), "dir/file name.txt");
}

#[test]
fn lexer_collapses_newline_runs() {
    assert_eq!(
        kinds("CREATE 'a'\n\n\n\rCREATE 'b'"),
        vec![
            TokenKind::Identifier,
            TokenKind::FilePath,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::FilePath,
        ]
    );
}

#[test]
fn lexer_comment_keeps_line_terminator() {
    assert_eq!(
        kinds("# header\nCREATE 'a' # trailing\n"),
        vec![
            TokenKind::Comment,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::FilePath,
            TokenKind::Comment,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn lexer_rejects_unknown_character() {
    let err = tokenize("CREATE 'a'\nedit 'b'", 0).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.span, 11..12);
    assert!(err.message.contains("edit 'b'"), "got: {}", err.message);
}

#[test]
fn lexer_rejects_unterminated_path() {
    let err = tokenize("CREATE 'a.txt", 0).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert!(err.message.contains("unterminated file path"));
}

#[test]
fn text_parameter_strips_surrounding_blank_lines() {
    let source = "{\nfoo\nbar\n}";
    let tokens = tokenize(source, 0).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].text(source), "foo\nbar");
}

#[test]
fn text_parameter_strips_only_one_blank_line() {
    let source = "{\n\nfoo\n\n}";
    let tokens = tokenize(source, 0).unwrap();
    assert_eq!(tokens[0].text(source), "\nfoo\n");
}

#[test]
fn text_parameter_on_one_line_is_untouched() {
    let source = "{hello world}";
    let tokens = tokenize(source, 0).unwrap();
    assert_eq!(tokens[0].text(source), "hello world");
}

#[test]
fn text_parameter_with_indented_closing_brace() {
    let source = "{\n    foo\n    }";
    let tokens = tokenize(source, 0).unwrap();
    assert_eq!(tokens[0].text(source), "    foo");
}

#[test]
fn blank_text_parameter_is_empty() {
    for source in ["{\n    }", "{\n}", "{\r\n  }", "{  \n\t}"] {
        let tokens = tokenize(source, 0).unwrap();
        assert_eq!(tokens[0].text(source), "", "{:?}", source);
    }

    let commands = parse("EDIT 'a' SET{\n    }\n");
    assert_eq!(commands[0].procedure_params, vec![Param::Text(vec![])]);
}

// ---------------------------------------------------------------------------
// Structural aggregation
// ---------------------------------------------------------------------------

#[test]
fn aggregate_statement_shape() {
    let tokens = tokenize("EDIT 'a' 'b' REPLACE('x')(y)\n", 0).unwrap();
    let elements = aggregate(&tokens, 0).unwrap();
    let shape: Vec<(ElementKind, usize)> = elements.iter().map(|e| (e.kind, e.len)).collect();
    assert_eq!(
        shape,
        vec![
            (ElementKind::Directive, 1),
            (ElementKind::DirectiveParams, 2),
            (ElementKind::Procedure, 1),
            (ElementKind::ProcedureParams, 2),
            (ElementKind::EndCommand, 1),
        ]
    );
}

#[test]
fn aggregate_mixed_parameter_run() {
    let tokens = tokenize("EDIT 'a' REPLACE('x'){\ny\n}", 0).unwrap();
    let elements = aggregate(&tokens, 0).unwrap();
    assert_eq!(elements.last().map(|e| (e.kind, e.len)), Some((ElementKind::ProcedureParams, 2)));
}

#[test]
fn directive_without_path_is_semantic_error() {
    let err = parse_err("CREATE\n");
    assert_eq!(err.kind, ParseErrorKind::Semantic);
    assert!(err.message.contains("directive needs at least one argument"));
    assert_eq!(err.span, 0..6);
}

#[test]
fn directive_at_end_of_input_is_semantic_error() {
    let err = parse_err("CREATE 'a'\nREAD");
    assert_eq!(err.kind, ParseErrorKind::Semantic);
}

// ---------------------------------------------------------------------------
// Command assembly
// ---------------------------------------------------------------------------

#[test]
fn assembles_statements_in_order() {
    let commands = parse("CREATE 'a.txt'\nEDIT 'a.txt' APPEND('line1')\n");
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].directive, "CREATE");
    assert_eq!(commands[0].directive_params, vec!["a.txt"]);
    assert_eq!(commands[0].procedure, None);
    assert_eq!(commands[1].directive, "EDIT");
    assert_eq!(commands[1].procedure.as_deref(), Some("APPEND"));
    assert_eq!(commands[1].procedure_params, vec![Param::Line("line1".into())]);
}

#[test]
fn multi_line_body_becomes_line_list() {
    let commands = parse("EDIT 'a' SET{\nfoo\nbar\n}\n");
    assert_eq!(
        commands[0].procedure_params,
        vec![Param::Text(vec!["foo".into(), "bar".into()])]
    );
}

#[test]
fn line_and_text_params_stay_distinct() {
    let commands = parse("EDIT 'a' REPLACE(^x)(y){y}\n");
    assert_eq!(
        commands[0].procedure_params,
        vec![
            Param::Line("^x".into()),
            Param::Line("y".into()),
            Param::Text(vec!["y".into()]),
        ]
    );
}

#[test]
fn blank_and_comment_lines_make_no_statements() {
    let source = "\n# setup\n\nCREATE 'a'   # make it\n\n\n# done\n";
    let commands = parse(source);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].directive_params, vec!["a"]);
}

#[test]
fn last_statement_without_newline_is_kept() {
    let commands = parse("CREATE 'a'\nREMOVE 'a'");
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[1].directive, "REMOVE");
}

#[test]
fn command_span_covers_statement() {
    let source = "CREATE 'a'\nEDIT 'a' APPEND(x)\n";
    let commands = parse(source);
    assert_eq!(commands[1].span.start, 11);
    assert!(source[commands[1].span.clone()].starts_with("EDIT 'a' APPEND("));
}

#[test]
fn second_procedure_is_rejected() {
    let err = parse_err("EDIT 'a' APPEND(x) SET(y)\n");
    assert_eq!(err.kind, ParseErrorKind::Semantic);
    assert!(err.message.contains("at most one procedure"));
}

#[test]
fn path_after_procedure_is_rejected() {
    let err = parse_err("EDIT 'a' APPEND(x) 'b'\n");
    assert!(err.message.contains("before the procedure"));
}

#[test]
fn statement_starting_with_path_is_rejected() {
    let err = parse_err("'a.txt'\n");
    assert!(err.message.contains("must start with a directive"));
}

#[test]
fn params_without_procedure_are_rejected() {
    let err = parse_err("EDIT 'a' (x)\n");
    assert!(err.message.contains("need a procedure"));
}

#[test]
fn crlf_script() {
    let commands = parse("CREATE 'a'\r\nEDIT 'a' SET{\r\nfoo\r\nbar\r\n}\r\n");
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[1].procedure_params,
        vec![Param::Text(vec!["foo".into(), "bar".into()])]
    );
}
