// Parser tests: statement shapes, precedence via canonical rendering,
// and diagnostic accumulation with per-statement recovery.

use mink::error::MinkError;
use mink::lexer::Lexer;
use mink::parser::Parser;
use mink::{Expr, Program, Stmt};

fn parse(input: &str) -> (Program, Vec<MinkError>) {
    let tokens = Lexer::new(input.to_string()).scan_tokens();
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

fn parse_clean(input: &str) -> Program {
    let (program, diagnostics) = parse(input);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        input,
        diagnostics
    );
    program
}

#[test]
fn let_statements() {
    let tests = [
        ("let x = 5;", "x", "5"),
        ("let y = true;", "y", "true"),
        ("let foobar = y;", "foobar", "y"),
    ];

    for (input, expected_name, expected_value) in tests {
        let program = parse_clean(input);
        assert_eq!(program.statements.len(), 1, "input: {}", input);
        match &program.statements[0] {
            Stmt::Let { name, value, .. } => {
                assert_eq!(name, expected_name);
                assert_eq!(value.to_string(), expected_value);
            }
            other => panic!("expected let statement, got {:?}", other),
        }
    }
}

#[test]
fn return_statements() {
    let tests = [
        ("return 5;", "5"),
        ("return true;", "true"),
        ("return x + y;", "(x + y)"),
    ];

    for (input, expected_value) in tests {
        let program = parse_clean(input);
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Stmt::Return { value, .. } => assert_eq!(value.to_string(), expected_value),
            other => panic!("expected return statement, got {:?}", other),
        }
    }
}

#[test]
fn operator_precedence_rendering() {
    let tests = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        (
            "3 + 4 * 5 == 3 * 1 + 4 * 5",
            "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
        ),
        ("true", "true"),
        ("false", "false"),
        ("3 > 5 == false", "((3 > 5) == false)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        (
            "a * [1, 2, 3, 4][b * c] * d",
            "((a * ([1, 2, 3, 4][(b * c)])) * d)",
        ),
        (
            "add(a * b[2], b[1], 2 * [1, 2][1])",
            "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
        ),
    ];

    for (input, expected) in tests {
        let program = parse_clean(input);
        assert_eq!(program.to_string(), expected, "input: {}", input);
    }
}

#[test]
fn call_and_index_chaining() {
    let tests = [
        ("f(x)(y)", "f(x)(y)"),
        ("a[0][1]", "((a[0])[1])"),
        ("f(x)[0]", "(f(x)[0])"),
    ];

    for (input, expected) in tests {
        let program = parse_clean(input);
        assert_eq!(program.to_string(), expected, "input: {}", input);
    }
}

#[test]
fn if_expression_shape() {
    let program = parse_clean("if (x < y) { x } else { y }");
    assert_eq!(program.to_string(), "if (x < y) x else y");

    let program = parse_clean("if (x < y) { x }");
    assert_eq!(program.statements.len(), 1);
    match &program.statements[0] {
        Stmt::Expression {
            expr: Expr::If { alternative, .. },
            ..
        } => assert!(alternative.is_none()),
        other => panic!("expected if expression, got {:?}", other),
    }
}

#[test]
fn function_literal_parameters() {
    let tests: [(&str, &[&str]); 3] = [
        ("fn() { 5 };", &[]),
        ("fn(x) { x };", &["x"]),
        ("fn(x, y, z) { x };", &["x", "y", "z"]),
    ];

    for (input, expected) in tests {
        let program = parse_clean(input);
        match &program.statements[0] {
            Stmt::Expression {
                expr: Expr::Function { parameters, .. },
                ..
            } => assert_eq!(parameters, expected, "input: {}", input),
            other => panic!("expected function literal, got {:?}", other),
        }
    }
}

#[test]
fn composite_literals() {
    let program = parse_clean("[1, 2 * 2, 3 + 3]");
    assert_eq!(program.to_string(), "[1, (2 * 2), (3 + 3)]");

    let program = parse_clean("{\"one\": 1, \"two\": 2}");
    assert_eq!(program.to_string(), "{one: 1, two: 2}");

    // An empty brace pair is an empty hash, not a block.
    let program = parse_clean("{}");
    match &program.statements[0] {
        Stmt::Expression {
            expr: Expr::HashLit { pairs, .. },
            ..
        } => assert!(pairs.is_empty()),
        other => panic!("expected hash literal, got {:?}", other),
    }
}

#[test]
fn string_literal_lexeme_excludes_quotes() {
    let program = parse_clean("\"hello world\";");
    match &program.statements[0] {
        Stmt::Expression {
            expr: Expr::StringLit { value, .. },
            ..
        } => assert_eq!(value, "hello world"),
        other => panic!("expected string literal, got {:?}", other),
    }
}

#[test]
fn diagnostics_name_expected_and_found() {
    let (_, diagnostics) = parse("let = 5;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "expected identifier after 'let', found '='"
    );

    let (_, diagnostics) = parse("let x 5;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "expected '=' after binding name, found '5'"
    );

    let (_, diagnostics) = parse("(1 + 2");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "expected ')' after expression, found end of input"
    );
}

#[test]
fn diagnostics_accumulate_and_recovery_continues() {
    let (program, diagnostics) = parse("let x 5; let = 7; let y = 3;");
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(program.statements.len(), 1);
    assert_eq!(program.statements[0].to_string(), "let y = 3;");
}

#[test]
fn malformed_expressions_report_found_token() {
    let tests = [
        ("1 + 2)", "expected expression, found ')'"),
        ("1 +", "expected expression, found end of input"),
        ("+ 1", "expected expression, found '+'"),
        ("let x = @;", "expected expression, found '@'"),
    ];

    for (input, expected) in tests {
        let (_, diagnostics) = parse(input);
        assert!(
            diagnostics.iter().any(|d| d.message == expected),
            "input {:?}: diagnostics {:?} missing {:?}",
            input,
            diagnostics,
            expected
        );
    }
}

#[test]
fn unterminated_string_is_a_diagnostic() {
    // The lexer hands the parser one illegal token spanning the rest
    // of the input; the parser reports it, nothing panics.
    let (program, diagnostics) = parse("\"abc");
    assert!(program.statements.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "expected expression, found '\"abc'");

    let (_, diagnostics) = parse("let s = \"hello");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.starts_with("expected expression, found"));
}

#[test]
fn integer_overflow_is_a_diagnostic() {
    let (_, diagnostics) = parse("92233720368547758089");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("as integer"));
}

#[test]
fn trailing_comma_in_call_is_rejected() {
    let (_, diagnostics) = parse("add(1, 2,)");
    assert!(!diagnostics.is_empty());
}

#[test]
fn deeply_nested_grouping_parses() {
    let input = "(".repeat(100) + "1" + &")".repeat(100);
    let program = parse_clean(&input);
    assert_eq!(program.to_string(), "1");
}
