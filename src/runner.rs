use crate::error::{MinkError, Span};
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;

/// Runs a whole script: lex, parse, report every diagnostic, then
/// evaluate only if the program parsed cleanly.
pub fn run(source: &str, filename: Option<&str>) {
    let tokens = Lexer::new(source.to_string()).scan_tokens();

    let mut parser = Parser::new(tokens);
    let (program, diagnostics) = parser.parse_program();

    if !diagnostics.is_empty() {
        for diagnostic in &diagnostics {
            diagnostic.report(source, filename);
        }
        return;
    }

    let evaluator = Evaluator::new();
    if let Value::Error(message) = evaluator.eval_program(&program) {
        MinkError::runtime_error(Span::new(0, source.len()), message).report(source, filename);
    }
}
