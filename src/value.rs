use crate::ast::Block;
use crate::environment::Environment;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Runtime value produced by evaluation. `Return` and `Error` are
/// control-flow markers that exist only while a statement sequence is
/// unwinding; they are never stored inside an `Array` or `Hash`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    Str(String),
    Array(Vec<Value>),
    Hash(HashMap<HashKey, (Value, Value)>),
    Function {
        parameters: Vec<String>,
        body: Block,
        env: Rc<RefCell<Environment>>,
    },
    Builtin(Builtin),
    Return(Box<Value>),
    Error(String),
}

/// Key digest for values usable as hash keys. Equal-valued integers,
/// booleans, and strings always digest equally; every other kind is
/// unhashable and reported as a runtime error by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    Str(u64),
}

/// FNV-1a, 64-bit.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Int(_) => "INTEGER",
            Value::Bool(_) => "BOOLEAN",
            Value::Str(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function { .. } => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    /// Everything is truthy except `false` and `null`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(n) => Some(HashKey::Integer(*n)),
            Value::Bool(b) => Some(HashKey::Boolean(*b)),
            Value::Str(s) => Some(HashKey::Str(fnv1a(s.as_bytes()))),
            _ => None,
        }
    }
}

// Functions capture their environment by shared reference, which can
// point back at a frame holding the function itself. Comparing them by
// Rc identity keeps equality from recursing through that cycle.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(l), Value::Int(r)) => l == r,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Array(l), Value::Array(r)) => l == r,
            (Value::Hash(l), Value::Hash(r)) => l == r,
            (Value::Function { env: l, .. }, Value::Function { env: r, .. }) => Rc::ptr_eq(l, r),
            (Value::Builtin(l), Value::Builtin(r)) => l == r,
            (Value::Return(l), Value::Return(r)) => l == r,
            (Value::Error(l), Value::Error(r)) => l == r,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function {
                parameters, body, ..
            } => write!(f, "fn({}) {{ {} }}", parameters.join(", "), body),
            Value::Builtin(builtin) => write!(f, "builtin function {}", builtin.name()),
            Value::Return(value) => write!(f, "{}", value),
            Value::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

/// The closed set of native functions. Dispatch is an exhaustive
/// match, so adding a builtin without an implementation fails to
/// compile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            "puts" => Some(Builtin::Puts),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Puts => "puts",
        }
    }

    pub fn apply(&self, args: Vec<Value>) -> Value {
        match self {
            Builtin::Len => {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match &args[0] {
                    Value::Str(s) => Value::Int(s.len() as i64),
                    Value::Array(elements) => Value::Int(elements.len() as i64),
                    other => Value::Error(format!(
                        "argument to `len` not supported, got {}",
                        other.type_name()
                    )),
                }
            }
            Builtin::First => {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match &args[0] {
                    Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
                    other => array_arg_error("first", other),
                }
            }
            Builtin::Last => {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match &args[0] {
                    Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
                    other => array_arg_error("last", other),
                }
            }
            Builtin::Rest => {
                if args.len() != 1 {
                    return wrong_arg_count(args.len(), 1);
                }
                match &args[0] {
                    Value::Array(elements) => {
                        if elements.is_empty() {
                            Value::Null
                        } else {
                            Value::Array(elements[1..].to_vec())
                        }
                    }
                    other => array_arg_error("rest", other),
                }
            }
            Builtin::Push => {
                if args.len() != 2 {
                    return wrong_arg_count(args.len(), 2);
                }
                match &args[0] {
                    Value::Array(elements) => {
                        let mut extended = elements.clone();
                        extended.push(args[1].clone());
                        Value::Array(extended)
                    }
                    other => array_arg_error("push", other),
                }
            }
            Builtin::Puts => {
                for arg in &args {
                    println!("{}", arg);
                }
                Value::Null
            }
        }
    }
}

fn wrong_arg_count(got: usize, want: usize) -> Value {
    Value::Error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn array_arg_error(builtin: &str, got: &Value) -> Value {
    Value::Error(format!(
        "argument to `{}` must be ARRAY, got {}",
        builtin,
        got.type_name()
    ))
}
