use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::environment::Environment;
use crate::value::{Builtin, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Tree-walking evaluator. Runtime errors are ordinary `Value::Error`
/// results flowing through the same channel as successes; once one is
/// produced, every enclosing step returns it unchanged. `Value::Return`
/// is the other marker and is unwrapped at the program and call
/// boundaries, never observed outside them.
pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            env: Rc::new(RefCell::new(Environment::new())),
        }
    }

    pub fn eval_program(&self, program: &Program) -> Value {
        let env = Rc::clone(&self.env);
        let mut result = Value::Null;

        for stmt in &program.statements {
            result = self.eval_statement(stmt, &env);
            match result {
                Value::Return(value) => return *value,
                Value::Error(_) => return result,
                _ => {}
            }
        }

        result
    }

    fn eval_statement(&self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Value {
        match stmt {
            Stmt::Expression { expr, .. } => self.eval_expression(expr, env),
            Stmt::Let { name, value, .. } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                env.borrow_mut().set(name, value);
                Value::Null
            }
            Stmt::Return { value, .. } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                Value::Return(Box::new(value))
            }
        }
    }

    /// Unlike the program, a block passes `Return` markers through
    /// untouched so they unwind to the nearest call boundary.
    fn eval_block(&self, block: &Block, env: &Rc<RefCell<Environment>>) -> Value {
        let mut result = Value::Null;

        for stmt in &block.statements {
            result = self.eval_statement(stmt, env);
            if matches!(result, Value::Return(_) | Value::Error(_)) {
                return result;
            }
        }

        result
    }

    fn eval_expression(&self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Value {
        match expr {
            Expr::IntegerLit { value, .. } => Value::Int(*value),
            Expr::StringLit { value, .. } => Value::Str(value.clone()),
            Expr::BooleanLit { value, .. } => Value::Bool(*value),
            Expr::Identifier { name, .. } => self.eval_identifier(name, env),
            Expr::Prefix {
                operator, operand, ..
            } => {
                let operand = self.eval_expression(operand, env);
                if operand.is_error() {
                    return operand;
                }
                eval_prefix(*operator, operand)
            }
            Expr::Infix {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                eval_infix(*operator, left, right)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expression(condition, env);
                if condition.is_error() {
                    return condition;
                }
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_block(alt, env)
                } else {
                    Value::Null
                }
            }
            Expr::Function {
                parameters, body, ..
            } => Value::Function {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            },
            Expr::Call { callee, args, .. } => {
                let function = self.eval_expression(callee, env);
                if function.is_error() {
                    return function;
                }
                let args = match self.eval_expressions(args, env) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                self.apply_function(function, args)
            }
            Expr::ArrayLit { elements, .. } => match self.eval_expressions(elements, env) {
                Ok(elements) => Value::Array(elements),
                Err(err) => err,
            },
            Expr::HashLit { pairs, .. } => self.eval_hash_literal(pairs, env),
            Expr::Index { left, index, .. } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(index, env);
                if index.is_error() {
                    return index;
                }
                eval_index(left, index)
            }
        }
    }

    fn eval_identifier(&self, name: &str, env: &Rc<RefCell<Environment>>) -> Value {
        if let Some(value) = env.borrow().get(name) {
            return value;
        }
        if let Some(builtin) = Builtin::lookup(name) {
            return Value::Builtin(builtin);
        }
        Value::Error(format!("identifier not found: {}", name))
    }

    /// Evaluates left to right, short-circuiting on the first error.
    fn eval_expressions(
        &self,
        exprs: &[Expr],
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = self.eval_expression(expr, env);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn eval_hash_literal(
        &self,
        pairs: &[(Expr, Expr)],
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        let mut map = HashMap::new();

        for (key_expr, value_expr) in pairs {
            let key = self.eval_expression(key_expr, env);
            if key.is_error() {
                return key;
            }
            let Some(hash_key) = key.hash_key() else {
                return Value::Error(format!("unusable as hash key: {}", key.type_name()));
            };
            let value = self.eval_expression(value_expr, env);
            if value.is_error() {
                return value;
            }
            map.insert(hash_key, (key, value));
        }

        Value::Hash(map)
    }

    fn apply_function(&self, function: Value, args: Vec<Value>) -> Value {
        match function {
            Value::Function {
                parameters,
                body,
                env,
            } => {
                if args.len() != parameters.len() {
                    return Value::Error(format!(
                        "wrong number of arguments. got={}, want={}",
                        args.len(),
                        parameters.len()
                    ));
                }

                let call_env = Rc::new(RefCell::new(Environment::new_enclosed(Rc::clone(&env))));
                for (param, arg) in parameters.iter().zip(args) {
                    call_env.borrow_mut().set(param, arg);
                }

                match self.eval_block(&body, &call_env) {
                    Value::Return(value) => *value,
                    other => other,
                }
            }
            Value::Builtin(builtin) => builtin.apply(args),
            other => Value::Error(format!("not a function: {}", other.type_name())),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_prefix(operator: PrefixOp, operand: Value) -> Value {
    match operator {
        PrefixOp::Bang => Value::Bool(!operand.is_truthy()),
        PrefixOp::Minus => match operand {
            Value::Int(n) => Value::Int(n.wrapping_neg()),
            other => Value::Error(format!("unknown operator: -{}", other.type_name())),
        },
    }
}

fn eval_infix(operator: InfixOp, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Int(l), Value::Int(r)) => eval_integer_infix(operator, *l, *r),
        (Value::Str(l), Value::Str(r)) => match operator {
            InfixOp::Plus => Value::Str(format!("{}{}", l, r)),
            _ => Value::Error(format!("unknown operator: STRING {} STRING", operator)),
        },
        // ==/!= on the remaining kinds compare the canonical singletons
        // (true/false/null); anything else is simply unequal.
        _ if operator == InfixOp::Equal => Value::Bool(singleton_eq(&left, &right)),
        _ if operator == InfixOp::NotEqual => Value::Bool(!singleton_eq(&left, &right)),
        _ if left.type_name() != right.type_name() => Value::Error(format!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
        _ => Value::Error(format!(
            "unknown operator: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
    }
}

fn singleton_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

// Arithmetic wraps on overflow rather than faulting; the evaluator
// never halts the process.
fn eval_integer_infix(operator: InfixOp, left: i64, right: i64) -> Value {
    match operator {
        InfixOp::Plus => Value::Int(left.wrapping_add(right)),
        InfixOp::Minus => Value::Int(left.wrapping_sub(right)),
        InfixOp::Star => Value::Int(left.wrapping_mul(right)),
        InfixOp::Slash => {
            if right == 0 {
                Value::Error("division by zero".to_string())
            } else {
                // Truncates toward zero; wrapping covers i64::MIN / -1.
                Value::Int(left.wrapping_div(right))
            }
        }
        InfixOp::Less => Value::Bool(left < right),
        InfixOp::Greater => Value::Bool(left > right),
        InfixOp::Equal => Value::Bool(left == right),
        InfixOp::NotEqual => Value::Bool(left != right),
    }
}

fn eval_index(left: Value, index: Value) -> Value {
    match (left, index) {
        (Value::Array(elements), Value::Int(i)) => {
            if i < 0 || i as usize >= elements.len() {
                Value::Null
            } else {
                elements[i as usize].clone()
            }
        }
        (Value::Hash(pairs), index) => match index.hash_key() {
            Some(key) => pairs
                .get(&key)
                .map(|(_, value)| value.clone())
                .unwrap_or(Value::Null),
            None => Value::Error(format!("unusable as hash key: {}", index.type_name())),
        },
        (left, _) => Value::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}
