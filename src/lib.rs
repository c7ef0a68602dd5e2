// mink language interpreter library
//
// A small dynamically-typed scripting language: a Pratt parser builds
// an AST which a tree-walking evaluator executes against a chain of
// lexical environments.

// Public modules
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use environment::Environment;
pub use error::{MinkError, Span};
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use value::{Builtin, HashKey, Value};

// Re-export main entry points
pub use repl::start as start_repl;
pub use runner::run;
