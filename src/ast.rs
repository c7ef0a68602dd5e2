use crate::error::Span;
use std::fmt;

/// AST nodes own their children outright and are never mutated after
/// parsing. Every node renders a canonical, fully parenthesized text
/// form via `Display`, which the precedence tests lean on.

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let {
        name: String,
        value: Expr,
        span: Span,
    },
    Return {
        value: Expr,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Let { span, .. } => span,
            Stmt::Return { span, .. } => span,
            Stmt::Expression { span, .. } => span,
        }
    }
}

/// A brace-delimited statement sequence, used by `if` arms and
/// function bodies.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Identifier {
        name: String,
        span: Span,
    },
    IntegerLit {
        value: i64,
        span: Span,
    },
    StringLit {
        value: String,
        span: Span,
    },
    BooleanLit {
        value: bool,
        span: Span,
    },
    ArrayLit {
        elements: Vec<Expr>,
        span: Span,
    },
    HashLit {
        pairs: Vec<(Expr, Expr)>,
        span: Span,
    },
    Prefix {
        operator: PrefixOp,
        operand: Box<Expr>,
        span: Span,
    },
    Infix {
        left: Box<Expr>,
        operator: InfixOp,
        right: Box<Expr>,
        span: Span,
    },
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    If {
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
        span: Span,
    },
    Function {
        parameters: Vec<String>,
        body: Block,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Identifier { span, .. } => span,
            Expr::IntegerLit { span, .. } => span,
            Expr::StringLit { span, .. } => span,
            Expr::BooleanLit { span, .. } => span,
            Expr::ArrayLit { span, .. } => span,
            Expr::HashLit { span, .. } => span,
            Expr::Prefix { span, .. } => span,
            Expr::Infix { span, .. } => span,
            Expr::Index { span, .. } => span,
            Expr::If { span, .. } => span,
            Expr::Function { span, .. } => span,
            Expr::Call { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrefixOp {
    Bang,
    Minus,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrefixOp::Bang => write!(f, "!"),
            PrefixOp::Minus => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InfixOp {
    Plus,
    Minus,
    Star,
    Slash,
    Less,
    Greater,
    Equal,
    NotEqual,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self {
            InfixOp::Plus => "+",
            InfixOp::Minus => "-",
            InfixOp::Star => "*",
            InfixOp::Slash => "/",
            InfixOp::Less => "<",
            InfixOp::Greater => ">",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
        };
        write!(f, "{}", op)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::Let { name, value, .. } => write!(f, "let {} = {};", name, value),
            Stmt::Return { value, .. } => write!(f, "return {};", value),
            Stmt::Expression { expr, .. } => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Identifier { name, .. } => write!(f, "{}", name),
            Expr::IntegerLit { value, .. } => write!(f, "{}", value),
            Expr::StringLit { value, .. } => write!(f, "{}", value),
            Expr::BooleanLit { value, .. } => write!(f, "{}", value),
            Expr::ArrayLit { elements, .. } => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Expr::HashLit { pairs, .. } => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Expr::Prefix {
                operator, operand, ..
            } => write!(f, "({}{})", operator, operand),
            Expr::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expr::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Expr::Function {
                parameters, body, ..
            } => write!(f, "fn({}) {}", parameters.join(", "), body),
            Expr::Call { callee, args, .. } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
