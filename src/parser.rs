use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::error::{MinkError, Span};
use crate::lexer::{Token, TokenType};

/// Binding strength for infix positions, low to high. Derived ordering
/// drives the precedence-climbing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

/// Infix precedence of a token type. Anything not listed cannot
/// continue an expression and stops the climbing loop.
fn precedence_of(token_type: &TokenType) -> Precedence {
    match token_type {
        TokenType::EqualEqual | TokenType::BangEqual => Precedence::Equals,
        TokenType::Less | TokenType::Greater => Precedence::LessGreater,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Star | TokenType::Slash => Precedence::Product,
        TokenType::LeftParen => Precedence::Call,
        TokenType::LeftBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses every top-level statement, accumulating a diagnostic per
    /// failed statement instead of aborting. The returned program holds
    /// whatever parsed cleanly; callers decide whether a program with
    /// diagnostics is still worth evaluating.
    pub fn parse_program(&mut self) -> (Program, Vec<MinkError>) {
        let mut statements = Vec::new();
        let mut diagnostics = Vec::new();

        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    diagnostics.push(err);
                    self.synchronize();
                }
            }
        }

        (Program { statements }, diagnostics)
    }

    /// Skips to the next statement boundary: past the nearest ';', or
    /// up to a token that can begin a statement.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.match_types(&[TokenType::Semicolon]) {
                return;
            }
            if matches!(
                self.peek().token_type,
                TokenType::Let | TokenType::Return
            ) {
                return;
            }
            self.advance();
        }
    }

    fn statement(&mut self) -> Result<Stmt, MinkError> {
        if self.match_types(&[TokenType::Let]) {
            self.let_statement()
        } else if self.match_types(&[TokenType::Return]) {
            self.return_statement()
        } else {
            self.expression_statement()
        }
    }

    fn let_statement(&mut self) -> Result<Stmt, MinkError> {
        let start = self.previous().span.start;

        let name = self
            .consume_with_help(
                TokenType::Identifier,
                "after 'let'",
                "A let statement binds a name: let x = 5;".to_string(),
            )?
            .lexeme
            .clone();
        self.consume_with_help(
            TokenType::Equal,
            "after binding name",
            "A let statement binds a name: let x = 5;".to_string(),
        )?;

        let value = self.parse_expression(Precedence::Lowest)?;
        if self.check(&TokenType::Semicolon) {
            self.advance();
        }
        let end = self.previous().span.end;

        Ok(Stmt::Let {
            name,
            value,
            span: Span::new(start, end),
        })
    }

    fn return_statement(&mut self) -> Result<Stmt, MinkError> {
        let start = self.previous().span.start;

        let value = self.parse_expression(Precedence::Lowest)?;
        if self.check(&TokenType::Semicolon) {
            self.advance();
        }
        let end = self.previous().span.end;

        Ok(Stmt::Return {
            value,
            span: Span::new(start, end),
        })
    }

    fn expression_statement(&mut self) -> Result<Stmt, MinkError> {
        let start = self.peek().span.start;

        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.check(&TokenType::Semicolon) {
            self.advance();
        }
        let end = self.previous().span.end;

        Ok(Stmt::Expression {
            expr,
            span: Span::new(start, end),
        })
    }

    /// Precedence climbing: a prefix handler produces the left-hand
    /// expression, then infix handlers fold it while the peeked token
    /// binds tighter than the threshold passed in by the caller.
    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, MinkError> {
        let mut left = self.parse_prefix()?;

        while !self.check(&TokenType::Semicolon) && precedence < self.peek_precedence() {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(&self.peek().token_type)
    }

    fn parse_prefix(&mut self) -> Result<Expr, MinkError> {
        let token = self.advance().clone();

        match token.token_type {
            TokenType::Identifier => Ok(Expr::Identifier {
                name: token.lexeme,
                span: token.span,
            }),
            TokenType::Integer => {
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    MinkError::parse_error(
                        token.span.clone(),
                        format!("could not parse '{}' as integer", token.lexeme),
                    )
                })?;
                Ok(Expr::IntegerLit {
                    value,
                    span: token.span,
                })
            }
            TokenType::String => Ok(Expr::StringLit {
                value: token.lexeme,
                span: token.span,
            }),
            TokenType::True => Ok(Expr::BooleanLit {
                value: true,
                span: token.span,
            }),
            TokenType::False => Ok(Expr::BooleanLit {
                value: false,
                span: token.span,
            }),
            TokenType::Bang | TokenType::Minus => {
                let operator = match token.token_type {
                    TokenType::Bang => PrefixOp::Bang,
                    _ => PrefixOp::Minus,
                };
                let operand = self.parse_expression(Precedence::Prefix)?;
                let span = token.span.join(operand.span());
                Ok(Expr::Prefix {
                    operator,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenType::LeftParen => {
                // Grouping parses at the lowest threshold and leaves no
                // node behind; the tree shape already encodes it.
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.consume_with_help(
                    TokenType::RightParen,
                    "after expression",
                    "Every opening '(' needs a matching ')'.".to_string(),
                )?;
                Ok(expr)
            }
            TokenType::If => self.if_expression(token.span),
            TokenType::Fn => self.function_literal(token.span),
            TokenType::LeftBracket => {
                let (elements, end) = self.expression_list(
                    TokenType::RightBracket,
                    "after array elements",
                    "Array literals are closed with ']'. Example: [1, 2, 3]",
                )?;
                Ok(Expr::ArrayLit {
                    elements,
                    span: token.span.join(&end),
                })
            }
            TokenType::LeftBrace => self.hash_literal(token.span),
            _ => {
                let help = match token.token_type {
                    TokenType::RightParen => "Found ')' without a matching '('.",
                    TokenType::RightBrace => "Found '}' without a matching '{'.",
                    TokenType::RightBracket => "Found ']' without a matching '['.",
                    TokenType::Eof => "Reached end of input while expecting an expression.",
                    TokenType::Illegal => "This character sequence is not part of the language.",
                    _ => "Expected a literal, identifier, prefix operator, or '(' here.",
                };
                Err(MinkError::parse_error_with_help(
                    token.span.clone(),
                    format!("expected expression, found {}", describe(&token)),
                    help.to_string(),
                ))
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, MinkError> {
        let token = self.advance().clone();

        match token.token_type {
            TokenType::LeftParen => {
                let (args, end) = self.expression_list(
                    TokenType::RightParen,
                    "after arguments",
                    "Calls are closed with ')'. Example: add(1, 2)",
                )?;
                let span = left.span().join(&end);
                Ok(Expr::Call {
                    callee: Box::new(left),
                    args,
                    span,
                })
            }
            TokenType::LeftBracket => {
                let index = self.parse_expression(Precedence::Lowest)?;
                let end = self
                    .consume_with_help(
                        TokenType::RightBracket,
                        "after index",
                        "Index expressions are closed with ']'. Example: items[0]".to_string(),
                    )?
                    .span
                    .clone();
                let span = left.span().join(&end);
                Ok(Expr::Index {
                    left: Box::new(left),
                    index: Box::new(index),
                    span,
                })
            }
            _ => {
                let operator = match token.token_type {
                    TokenType::Plus => InfixOp::Plus,
                    TokenType::Minus => InfixOp::Minus,
                    TokenType::Star => InfixOp::Star,
                    TokenType::Slash => InfixOp::Slash,
                    TokenType::Less => InfixOp::Less,
                    TokenType::Greater => InfixOp::Greater,
                    TokenType::EqualEqual => InfixOp::Equal,
                    TokenType::BangEqual => InfixOp::NotEqual,
                    // The climbing loop only dispatches tokens with an
                    // infix precedence.
                    _ => unreachable!("token without infix handler: {:?}", token.token_type),
                };
                let right = self.parse_expression(precedence_of(&token.token_type))?;
                let span = left.span().join(right.span());
                Ok(Expr::Infix {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                    span,
                })
            }
        }
    }

    fn if_expression(&mut self, start: Span) -> Result<Expr, MinkError> {
        self.consume_with_help(
            TokenType::LeftParen,
            "after 'if'",
            "Conditions are parenthesized: if (x < y) { ... }".to_string(),
        )?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.consume_with_help(
            TokenType::RightParen,
            "after condition",
            "Conditions are parenthesized: if (x < y) { ... }".to_string(),
        )?;

        self.consume_with_help(
            TokenType::LeftBrace,
            "before if body",
            "The consequence of an if is a block: if (x < y) { ... }".to_string(),
        )?;
        let consequence = self.block()?;

        let alternative = if self.match_types(&[TokenType::Else]) {
            self.consume_with_help(
                TokenType::LeftBrace,
                "after 'else'",
                "The alternative of an if is a block: ... else { ... }".to_string(),
            )?;
            Some(self.block()?)
        } else {
            None
        };

        let end = self.previous().span.end;
        Ok(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
            span: Span::new(start.start, end),
        })
    }

    fn function_literal(&mut self, start: Span) -> Result<Expr, MinkError> {
        self.consume_with_help(
            TokenType::LeftParen,
            "after 'fn'",
            "Function literals take a parameter list: fn(x, y) { ... }".to_string(),
        )?;

        let mut parameters = Vec::new();
        if !self.check(&TokenType::RightParen) {
            loop {
                let param = self
                    .consume_with_help(
                        TokenType::Identifier,
                        "in parameter list",
                        "Parameters are identifiers separated by commas: fn(x, y) { ... }"
                            .to_string(),
                    )?
                    .lexeme
                    .clone();
                parameters.push(param);
                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        self.consume_with_help(
            TokenType::RightParen,
            "after parameters",
            "Function literals take a parameter list: fn(x, y) { ... }".to_string(),
        )?;

        self.consume_with_help(
            TokenType::LeftBrace,
            "before function body",
            "A function body is a block: fn(x) { x + 1 }".to_string(),
        )?;
        let body = self.block()?;

        let end = self.previous().span.end;
        Ok(Expr::Function {
            parameters,
            body,
            span: Span::new(start.start, end),
        })
    }

    /// Statements up to the matching '}'. The opening brace has already
    /// been consumed.
    fn block(&mut self) -> Result<Block, MinkError> {
        let start = self.previous().span.start;

        let mut statements = Vec::new();
        while !self.check(&TokenType::RightBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }

        let end = self
            .consume_with_help(
                TokenType::RightBrace,
                "after block",
                "Blocks are closed with '}' after the opening '{'.".to_string(),
            )?
            .span
            .end;

        Ok(Block {
            statements,
            span: Span::new(start, end),
        })
    }

    fn hash_literal(&mut self, start: Span) -> Result<Expr, MinkError> {
        let mut pairs = Vec::new();

        if !self.check(&TokenType::RightBrace) {
            loop {
                let key = self.parse_expression(Precedence::Lowest)?;
                self.consume_with_help(
                    TokenType::Colon,
                    "after hash key",
                    "Hash entries pair a key and a value: {\"key\": value}".to_string(),
                )?;
                let value = self.parse_expression(Precedence::Lowest)?;
                pairs.push((key, value));

                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let end = self
            .consume_with_help(
                TokenType::RightBrace,
                "after hash entries",
                "Hash literals are closed with '}'. Example: {\"a\": 1}".to_string(),
            )?
            .span
            .clone();

        Ok(Expr::HashLit {
            pairs,
            span: start.join(&end),
        })
    }

    /// Comma-separated expressions up to `end` (empty allowed). Returns
    /// the items and the span of the closing delimiter.
    fn expression_list(
        &mut self,
        end: TokenType,
        context: &str,
        help: &str,
    ) -> Result<(Vec<Expr>, Span), MinkError> {
        let mut items = Vec::new();

        if !self.check(&end) {
            loop {
                items.push(self.parse_expression(Precedence::Lowest)?);
                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let end_span = self
            .consume_with_help(end, context, help.to_string())?
            .span
            .clone();
        Ok((items, end_span))
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        &self.peek().token_type == token_type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Consumes the expected token or reports a diagnostic naming both
    /// the expected and the found token.
    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        context: &str,
        help: String,
    ) -> Result<&Token, MinkError> {
        if self.check(&token_type) {
            return Ok(self.advance());
        }

        // Point at the end of the last real token when input ran out.
        let error_span = if self.is_at_end() && self.current > 0 {
            Span::single(self.tokens[self.current - 1].span.end)
        } else {
            self.peek().span.clone()
        };

        Err(MinkError::parse_error_with_help(
            error_span,
            format!(
                "expected {} {}, found {}",
                token_type,
                context,
                describe(self.peek())
            ),
            help,
        ))
    }
}

fn describe(token: &Token) -> String {
    match token.token_type {
        TokenType::Eof => "end of input".to_string(),
        _ => format!("'{}'", token.lexeme),
    }
}
