use crate::error::{MinkError, Span};
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;
use std::io::{self, Write};

pub fn start() {
    println!("mink v0.1.0");
    println!("Type 'exit' or press Ctrl+C to quit");
    println!();

    // One evaluator for the whole session so bindings persist between
    // lines.
    let evaluator = Evaluator::new();

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_line(line, &evaluator);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_line(source: &str, evaluator: &Evaluator) {
    let tokens = Lexer::new(source.to_string()).scan_tokens();

    let mut parser = Parser::new(tokens);
    let (program, diagnostics) = parser.parse_program();

    // A line with any diagnostics is not evaluated.
    if !diagnostics.is_empty() {
        for diagnostic in &diagnostics {
            diagnostic.report(source, None);
        }
        return;
    }

    match evaluator.eval_program(&program) {
        Value::Null => {}
        Value::Error(message) => {
            MinkError::runtime_error(Span::new(0, source.len()), message).report(source, None);
        }
        value => println!("{}", value),
    }
}
