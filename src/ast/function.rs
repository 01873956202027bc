//! Function objects, overload tables, and the unification algorithm.
//!
//! A function is a name plus an ordered list of typed definitions.
//! Dispatch walks the definitions in declaration order and invokes the
//! first one whose signature unifies with the argument types. The
//! built-in operators live here under their sentinel names (`_+_`,
//! `_&&_`, ...), which a parser rewrites to; they are not callable by
//! those names from user code.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::ast::types::{deterministic_type, FunctionType, ValueType};
use crate::ast::value::{ListValue, Value};

pub const LOGICAL_AND: &str = "_&&_";
pub const LOGICAL_OR: &str = "_||_";
pub const LOGICAL_NOT: &str = "!_";
pub const EQUALS: &str = "_==_";
pub const NOT_EQUALS: &str = "_!=_";
pub const LESS: &str = "_<_";
pub const LESS_EQUALS: &str = "_<=_";
pub const GREATER: &str = "_>_";
pub const GREATER_EQUALS: &str = "_>=_";
pub const ADD: &str = "_+_";
pub const SUBTRACT: &str = "_-_";
pub const MULTIPLY: &str = "_*_";
pub const DIVIDE: &str = "_/_";
pub const MODULO: &str = "_%_";
pub const NEGATE: &str = "-_";
pub const IN: &str = "_in_";

pub const SIZE: &str = "size";
pub const TYPE: &str = "type";
pub const BOOL: &str = "bool";
pub const BYTES: &str = "bytes";
pub const DOUBLE: &str = "double";
pub const INT: &str = "int";
pub const STRING: &str = "string";
pub const UINT: &str = "uint";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure inside a function callback or during dispatch. The evaluator
/// wraps these with the offending AST node.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct FnError(pub String);

impl FnError {
    pub fn new(message: impl Into<String>) -> FnError {
        FnError(message.into())
    }
}

pub type FnResult = Result<Value, FnError>;

// ---------------------------------------------------------------------------
// Definition / Function
// ---------------------------------------------------------------------------

pub type CallFn = Arc<dyn Fn(&[Value]) -> FnResult + Send + Sync>;

/// One overload: a full signature and the callback implementing it.
#[derive(Clone)]
pub struct Definition {
    pub signature: FunctionType,
    pub call: CallFn,
}

impl Definition {
    pub fn new(
        signature: FunctionType,
        call: impl Fn(&[Value]) -> FnResult + Send + Sync + 'static,
    ) -> Definition {
        Definition {
            signature,
            call: Arc::new(call),
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Definition({})", self.signature)
    }
}

/// A named, multi-overload callable.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    definitions: Vec<Definition>,
}

impl Function {
    pub fn new(name: impl Into<String>, definitions: Vec<Definition>) -> Function {
        Function {
            name: name.into(),
            definitions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Dispatch: walk definitions in declaration order, invoke the
    /// first whose signature unifies with the argument types.
    pub fn call(&self, args: &[Value]) -> FnResult {
        let arg_types: Vec<ValueType> = args.iter().map(Value::value_type).collect();

        for definition in &self.definitions {
            if match_signature(definition.signature.params(), &arg_types).is_none() {
                continue;
            }
            tracing::trace!(function = %self.name, signature = %definition.signature, "dispatch");
            return (definition.call)(args);
        }

        let rendered: Vec<String> = arg_types.iter().map(|t| t.to_string()).collect();
        Err(FnError::new(format!(
            "no matching function definition found, with args [{}]",
            rendered.join(", ")
        )))
    }

    /// Add an overload, rejecting a structurally duplicate signature.
    pub fn add_definition(&mut self, definition: Definition) -> Result<(), FnError> {
        for existing in &self.definitions {
            if existing.signature.equals(&definition.signature) {
                return Err(FnError::new("function definition already exists"));
            }
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// Append all of another function's definitions. Conflicts are
    /// registration-time programmer errors and panic.
    pub fn combine(&mut self, other: &Function) {
        for definition in &other.definitions {
            if let Err(err) = self.add_definition(definition.clone()) {
                panic!("combine {}: {}", self.name, err);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unification
// ---------------------------------------------------------------------------

/// Bindings from type-parameter name to concrete type, built per call.
pub type TypeBindings = HashMap<String, ValueType>;

/// Resolve a dyn type against an actual type (or against the bindings
/// alone when `actual` is `None`, as for return types). Recurses
/// through list and map parameters; bare parameters bind in `bindings`.
pub fn resolve_dynamic_type(
    bindings: &mut TypeBindings,
    dyn_type: &ValueType,
    actual: Option<&ValueType>,
) -> Result<ValueType, FnError> {
    if !dyn_type.is_dyn() {
        return Ok(dyn_type.clone());
    }

    match dyn_type {
        ValueType::List(element) => {
            let inner = match actual {
                Some(ValueType::List(actual_element)) => Some(actual_element.as_ref()),
                Some(other) => {
                    return Err(FnError::new(format!(
                        "cannot resolve dynamic type {} to {}",
                        dyn_type, other
                    )))
                }
                None => None,
            };
            let resolved = resolve_dynamic_type(bindings, element, inner)?;
            Ok(ValueType::list(resolved))
        }
        ValueType::Map(key, value) => {
            let (actual_key, actual_value) = match actual {
                Some(ValueType::Map(k, v)) => (Some(k.as_ref()), Some(v.as_ref())),
                Some(other) => {
                    return Err(FnError::new(format!(
                        "cannot resolve dynamic type {} to {}",
                        dyn_type, other
                    )))
                }
                None => (None, None),
            };
            let key = resolve_dynamic_type(bindings, key, actual_key)?;
            let value = resolve_dynamic_type(bindings, value, actual_value)?;
            Ok(ValueType::map(key, value))
        }
        _ => {
            let name = dyn_type.kind().to_string();
            match actual {
                None => bindings
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| FnError::new(format!("dynamic type {} not found", dyn_type))),
                Some(actual) => {
                    if let Some(bound) = bindings.get(&name).cloned() {
                        if !bound.equals(actual) {
                            return Err(FnError::new(format!(
                                "dynamic type should {} but got {}",
                                bound, actual
                            )));
                        }
                        // One side may be `any`; keep the concrete one.
                        bindings.insert(name.clone(), deterministic_type(&[&bound, actual]));
                    } else {
                        bindings.insert(name.clone(), actual.clone());
                    }
                    Ok(bindings[&name].clone())
                }
            }
        }
    }
}

/// Unify a signature's parameter vector against concrete argument
/// types. Returns the final bindings on success.
pub fn match_signature(params: &[ValueType], args: &[ValueType]) -> Option<TypeBindings> {
    if params.len() != args.len() {
        return None;
    }

    let mut bindings = TypeBindings::new();
    for (param, arg) in params.iter().zip(args) {
        let param = if param.is_dyn() {
            match resolve_dynamic_type(&mut bindings, param, Some(arg)) {
                Ok(resolved) => resolved,
                Err(_) => return None,
            }
        } else {
            param.clone()
        };
        if !arg.equals(&param) {
            return None;
        }
    }
    Some(bindings)
}

// ---------------------------------------------------------------------------
// Built-in operators and globals
// ---------------------------------------------------------------------------

fn bad_args(name: &str) -> FnError {
    FnError::new(format!("unexpected argument types for {}", name))
}

fn promote(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Uint(u) => Some(*u as f64),
        Value::Double(d) => Some(*d),
        _ => None,
    }
}

/// The 9 int/uint/double pairings of one ordering operator. Same-type
/// int and uint pairs compare exactly; every other pairing promotes
/// both sides to double.
fn ordering_function(
    name: &'static str,
    int_cmp: fn(&i64, &i64) -> bool,
    uint_cmp: fn(&u64, &u64) -> bool,
    double_cmp: fn(f64, f64) -> bool,
) -> Function {
    let pairings = [
        (ValueType::Int, ValueType::Int),
        (ValueType::Int, ValueType::Double),
        (ValueType::Int, ValueType::Uint),
        (ValueType::Uint, ValueType::Uint),
        (ValueType::Uint, ValueType::Int),
        (ValueType::Uint, ValueType::Double),
        (ValueType::Double, ValueType::Double),
        (ValueType::Double, ValueType::Int),
        (ValueType::Double, ValueType::Uint),
    ];

    let mut definitions = Vec::with_capacity(pairings.len());
    for (left, right) in pairings {
        let call: CallFn = match (&left, &right) {
            (ValueType::Int, ValueType::Int) => Arc::new(move |args: &[Value]| {
                match (&args[0], &args[1]) {
                    (Value::Int(x), Value::Int(y)) => Ok(Value::Bool(int_cmp(x, y))),
                    _ => Err(bad_args(name)),
                }
            }),
            (ValueType::Uint, ValueType::Uint) => Arc::new(move |args: &[Value]| {
                match (&args[0], &args[1]) {
                    (Value::Uint(x), Value::Uint(y)) => Ok(Value::Bool(uint_cmp(x, y))),
                    _ => Err(bad_args(name)),
                }
            }),
            _ => Arc::new(move |args: &[Value]| {
                let x = promote(&args[0]).ok_or_else(|| bad_args(name))?;
                let y = promote(&args[1]).ok_or_else(|| bad_args(name))?;
                Ok(Value::Bool(double_cmp(x, y)))
            }),
        };
        definitions.push(Definition {
            signature: FunctionType::new(name, vec![left, right], ValueType::Bool),
            call,
        });
    }
    Function::new(name, definitions)
}

/// One explicit conversion function: an overload per accepted source
/// kind, all routed through the type's conversion table.
fn conversion_function(name: &'static str, target: ValueType, sources: &[ValueType]) -> Function {
    let definitions = sources
        .iter()
        .map(|source| {
            let target = target.clone();
            Definition::new(
                FunctionType::new(name, vec![source.clone()], target.clone()),
                move |args: &[Value]| args[0].value_type().convert_to(&args[0], &target),
            )
        })
        .collect();
    Function::new(name, definitions)
}

fn logical_functions() -> Vec<Function> {
    vec![
        Function::new(
            LOGICAL_AND,
            vec![Definition::new(
                FunctionType::new(
                    LOGICAL_AND,
                    vec![ValueType::Bool, ValueType::Bool],
                    ValueType::Bool,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(*x && *y)),
                    _ => Err(bad_args(LOGICAL_AND)),
                },
            )],
        ),
        Function::new(
            LOGICAL_OR,
            vec![Definition::new(
                FunctionType::new(
                    LOGICAL_OR,
                    vec![ValueType::Bool, ValueType::Bool],
                    ValueType::Bool,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(*x || *y)),
                    _ => Err(bad_args(LOGICAL_OR)),
                },
            )],
        ),
        Function::new(
            LOGICAL_NOT,
            vec![Definition::new(
                FunctionType::new(LOGICAL_NOT, vec![ValueType::Bool], ValueType::Bool),
                |args| match &args[0] {
                    Value::Bool(x) => Ok(Value::Bool(!*x)),
                    _ => Err(bad_args(LOGICAL_NOT)),
                },
            )],
        ),
    ]
}

fn equality_functions() -> Vec<Function> {
    let param_a = ValueType::param("A");
    vec![
        Function::new(
            EQUALS,
            vec![Definition::new(
                FunctionType::new(
                    EQUALS,
                    vec![param_a.clone(), param_a.clone()],
                    ValueType::Bool,
                ),
                |args| Ok(Value::Bool(args[0].equal(&args[1]))),
            )],
        ),
        Function::new(
            NOT_EQUALS,
            vec![Definition::new(
                FunctionType::new(
                    NOT_EQUALS,
                    vec![param_a.clone(), param_a],
                    ValueType::Bool,
                ),
                |args| Ok(Value::Bool(!args[0].equal(&args[1]))),
            )],
        ),
    ]
}

fn add_function() -> Function {
    let param_a = ValueType::param("A");
    let list_a = ValueType::list(param_a);
    Function::new(
        ADD,
        vec![
            Definition::new(
                FunctionType::new(
                    ADD,
                    vec![ValueType::Bytes, ValueType::Bytes],
                    ValueType::Bytes,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Bytes(x), Value::Bytes(y)) => {
                        let mut joined = x.clone();
                        joined.extend_from_slice(y);
                        Ok(Value::Bytes(joined))
                    }
                    _ => Err(bad_args(ADD)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    ADD,
                    vec![ValueType::Double, ValueType::Double],
                    ValueType::Double,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Double(x), Value::Double(y)) => Ok(Value::Double(x + y)),
                    _ => Err(bad_args(ADD)),
                },
            ),
            Definition::new(
                FunctionType::new(ADD, vec![ValueType::Int, ValueType::Int], ValueType::Int),
                |args| match (&args[0], &args[1]) {
                    (Value::Int(x), Value::Int(y)) => x
                        .checked_add(*y)
                        .map(Value::Int)
                        .ok_or_else(|| FnError::new("int overflow")),
                    _ => Err(bad_args(ADD)),
                },
            ),
            Definition::new(
                FunctionType::new(ADD, vec![ValueType::Uint, ValueType::Uint], ValueType::Uint),
                |args| match (&args[0], &args[1]) {
                    (Value::Uint(x), Value::Uint(y)) => x
                        .checked_add(*y)
                        .map(Value::Uint)
                        .ok_or_else(|| FnError::new("uint overflow")),
                    _ => Err(bad_args(ADD)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    ADD,
                    vec![ValueType::String, ValueType::String],
                    ValueType::String,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::String(x), Value::String(y)) => {
                        Ok(Value::String(format!("{}{}", x, y)))
                    }
                    _ => Err(bad_args(ADD)),
                },
            ),
            Definition::new(
                FunctionType::new(ADD, vec![list_a.clone(), list_a.clone()], list_a),
                |args| match (&args[0], &args[1]) {
                    (Value::List(x), Value::List(y)) => {
                        let mut items = x.items.clone();
                        items.extend(y.items.iter().cloned());
                        Ok(Value::List(ListValue::new(items, x.element_type.clone())))
                    }
                    _ => Err(bad_args(ADD)),
                },
            ),
        ],
    )
}

fn subtract_function() -> Function {
    Function::new(
        SUBTRACT,
        vec![
            Definition::new(
                FunctionType::new(
                    SUBTRACT,
                    vec![ValueType::Int, ValueType::Int],
                    ValueType::Int,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Int(x), Value::Int(y)) => x
                        .checked_sub(*y)
                        .map(Value::Int)
                        .ok_or_else(|| FnError::new("int overflow")),
                    _ => Err(bad_args(SUBTRACT)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    SUBTRACT,
                    vec![ValueType::Uint, ValueType::Uint],
                    ValueType::Uint,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Uint(x), Value::Uint(y)) => x
                        .checked_sub(*y)
                        .map(Value::Uint)
                        .ok_or_else(|| FnError::new("uint overflow")),
                    _ => Err(bad_args(SUBTRACT)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    SUBTRACT,
                    vec![ValueType::Double, ValueType::Double],
                    ValueType::Double,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Double(x), Value::Double(y)) => Ok(Value::Double(x - y)),
                    _ => Err(bad_args(SUBTRACT)),
                },
            ),
        ],
    )
}

fn multiply_function() -> Function {
    Function::new(
        MULTIPLY,
        vec![
            Definition::new(
                FunctionType::new(
                    MULTIPLY,
                    vec![ValueType::Int, ValueType::Int],
                    ValueType::Int,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Int(x), Value::Int(y)) => x
                        .checked_mul(*y)
                        .map(Value::Int)
                        .ok_or_else(|| FnError::new("int overflow")),
                    _ => Err(bad_args(MULTIPLY)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    MULTIPLY,
                    vec![ValueType::Uint, ValueType::Uint],
                    ValueType::Uint,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Uint(x), Value::Uint(y)) => x
                        .checked_mul(*y)
                        .map(Value::Uint)
                        .ok_or_else(|| FnError::new("uint overflow")),
                    _ => Err(bad_args(MULTIPLY)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    MULTIPLY,
                    vec![ValueType::Double, ValueType::Double],
                    ValueType::Double,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Double(x), Value::Double(y)) => Ok(Value::Double(x * y)),
                    _ => Err(bad_args(MULTIPLY)),
                },
            ),
        ],
    )
}

fn divide_function() -> Function {
    Function::new(
        DIVIDE,
        vec![
            Definition::new(
                FunctionType::new(DIVIDE, vec![ValueType::Int, ValueType::Int], ValueType::Int),
                |args| match (&args[0], &args[1]) {
                    (Value::Int(_), Value::Int(0)) => Err(FnError::new("divide by zero")),
                    (Value::Int(x), Value::Int(y)) => x
                        .checked_div(*y)
                        .map(Value::Int)
                        .ok_or_else(|| FnError::new("int overflow")),
                    _ => Err(bad_args(DIVIDE)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    DIVIDE,
                    vec![ValueType::Uint, ValueType::Uint],
                    ValueType::Uint,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Uint(_), Value::Uint(0)) => Err(FnError::new("divide by zero")),
                    (Value::Uint(x), Value::Uint(y)) => Ok(Value::Uint(x / y)),
                    _ => Err(bad_args(DIVIDE)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    DIVIDE,
                    vec![ValueType::Double, ValueType::Double],
                    ValueType::Double,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Double(x), Value::Double(y)) => Ok(Value::Double(x / y)),
                    _ => Err(bad_args(DIVIDE)),
                },
            ),
        ],
    )
}

fn modulo_function() -> Function {
    Function::new(
        MODULO,
        vec![
            Definition::new(
                FunctionType::new(MODULO, vec![ValueType::Int, ValueType::Int], ValueType::Int),
                |args| match (&args[0], &args[1]) {
                    (Value::Int(_), Value::Int(0)) => Err(FnError::new("modulo by zero")),
                    (Value::Int(x), Value::Int(y)) => x
                        .checked_rem(*y)
                        .map(Value::Int)
                        .ok_or_else(|| FnError::new("int overflow")),
                    _ => Err(bad_args(MODULO)),
                },
            ),
            Definition::new(
                FunctionType::new(
                    MODULO,
                    vec![ValueType::Uint, ValueType::Uint],
                    ValueType::Uint,
                ),
                |args| match (&args[0], &args[1]) {
                    (Value::Uint(_), Value::Uint(0)) => Err(FnError::new("modulo by zero")),
                    (Value::Uint(x), Value::Uint(y)) => Ok(Value::Uint(x % y)),
                    _ => Err(bad_args(MODULO)),
                },
            ),
        ],
    )
}

fn negate_function() -> Function {
    Function::new(
        NEGATE,
        vec![
            Definition::new(
                FunctionType::new(NEGATE, vec![ValueType::Int], ValueType::Int),
                |args| match &args[0] {
                    Value::Int(x) => x
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| FnError::new("int overflow")),
                    _ => Err(bad_args(NEGATE)),
                },
            ),
            Definition::new(
                FunctionType::new(NEGATE, vec![ValueType::Double], ValueType::Double),
                |args| match &args[0] {
                    Value::Double(x) => Ok(Value::Double(-x)),
                    _ => Err(bad_args(NEGATE)),
                },
            ),
        ],
    )
}

fn in_function() -> Function {
    let param_a = ValueType::param("A");
    let param_b = ValueType::param("B");
    let list_a = ValueType::list(param_a.clone());
    let map_ab = ValueType::map(param_a.clone(), param_b);
    Function::new(
        IN,
        vec![
            Definition::new(
                FunctionType::new(IN, vec![param_a.clone(), list_a], ValueType::Bool),
                |args| match &args[1] {
                    Value::List(list) => {
                        Ok(Value::Bool(list.items.iter().any(|item| item.equal(&args[0]))))
                    }
                    other => Err(FnError::new(format!(
                        "in expects list argument, got {}",
                        other.value_type()
                    ))),
                },
            ),
            Definition::new(
                FunctionType::new(IN, vec![param_a, map_ab], ValueType::Bool),
                |args| match &args[1] {
                    Value::Map(map) => Ok(Value::Bool(map.get(&args[0]).is_some())),
                    other => Err(FnError::new(format!(
                        "in expects map argument, got {}",
                        other.value_type()
                    ))),
                },
            ),
        ],
    )
}

fn size_function() -> Function {
    let param_a = ValueType::param("A");
    let param_b = ValueType::param("B");
    Function::new(
        SIZE,
        vec![
            Definition::new(
                FunctionType::new(SIZE, vec![ValueType::Bytes], ValueType::Int),
                |args| match &args[0] {
                    Value::Bytes(b) => Ok(Value::Int(b.len() as i64)),
                    _ => Err(bad_args(SIZE)),
                },
            ),
            Definition::new(
                FunctionType::new(SIZE, vec![ValueType::String], ValueType::Int),
                |args| match &args[0] {
                    Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
                    _ => Err(bad_args(SIZE)),
                },
            ),
            Definition::new(
                FunctionType::new(SIZE, vec![ValueType::list(param_a.clone())], ValueType::Int),
                |args| match &args[0] {
                    Value::List(list) => Ok(Value::Int(list.items.len() as i64)),
                    _ => Err(bad_args(SIZE)),
                },
            ),
            Definition::new(
                FunctionType::new(SIZE, vec![ValueType::map(param_a, param_b)], ValueType::Int),
                |args| match &args[0] {
                    Value::Map(map) => Ok(Value::Int(map.len() as i64)),
                    _ => Err(bad_args(SIZE)),
                },
            ),
        ],
    )
}

fn type_function() -> Function {
    Function::new(
        TYPE,
        vec![Definition::new(
            FunctionType::new(TYPE, vec![ValueType::param("A")], ValueType::Type),
            |args| Ok(Value::Type(args[0].value_type().kind().to_string())),
        )],
    )
}

/// The complete built-in table: operators under their sentinel names
/// plus the `size`/`type` globals and the explicit conversions.
pub fn builtin_functions() -> IndexMap<String, Function> {
    let mut functions = IndexMap::new();

    let mut install = |function: Function| {
        functions.insert(function.name().to_string(), function);
    };

    for function in logical_functions() {
        install(function);
    }
    for function in equality_functions() {
        install(function);
    }
    install(ordering_function(LESS, |x, y| x < y, |x, y| x < y, |x, y| x < y));
    install(ordering_function(
        LESS_EQUALS,
        |x, y| x <= y,
        |x, y| x <= y,
        |x, y| x <= y,
    ));
    install(ordering_function(
        GREATER,
        |x, y| x > y,
        |x, y| x > y,
        |x, y| x > y,
    ));
    install(ordering_function(
        GREATER_EQUALS,
        |x, y| x >= y,
        |x, y| x >= y,
        |x, y| x >= y,
    ));
    install(add_function());
    install(subtract_function());
    install(multiply_function());
    install(divide_function());
    install(modulo_function());
    install(negate_function());
    install(in_function());

    install(size_function());
    install(type_function());
    install(conversion_function(
        BOOL,
        ValueType::Bool,
        &[ValueType::Bool, ValueType::String],
    ));
    install(conversion_function(
        BYTES,
        ValueType::Bytes,
        &[ValueType::Bytes, ValueType::String],
    ));
    install(conversion_function(
        DOUBLE,
        ValueType::Double,
        &[
            ValueType::Int,
            ValueType::Uint,
            ValueType::Double,
            ValueType::String,
        ],
    ));
    install(conversion_function(
        INT,
        ValueType::Int,
        &[
            ValueType::Double,
            ValueType::Uint,
            ValueType::Int,
            ValueType::String,
        ],
    ));
    install(conversion_function(
        UINT,
        ValueType::Uint,
        &[
            ValueType::Double,
            ValueType::Uint,
            ValueType::Int,
            ValueType::String,
        ],
    ));
    install(conversion_function(
        STRING,
        ValueType::String,
        &[
            ValueType::String,
            ValueType::Bytes,
            ValueType::Bool,
            ValueType::Double,
            ValueType::Int,
            ValueType::Uint,
        ],
    ));

    functions
}
