//! Native adapter: express plain Rust functions as registry overloads.
//!
//! The original bridge was reflection-based; here the calling
//! convention is a pair of conversion traits plus arity-typed
//! builders. `with_default` registers additional lower-arity overloads
//! that pad the trailing arguments before the call, rightmost first.
use std::sync::Arc;

use crate::ast::function::{CallFn, Definition, FnError, FnResult, Function};
use crate::ast::types::{FunctionType, ValueType};
use crate::ast::value::{ListValue, Value};

// ---------------------------------------------------------------------------
// Conversion traits
// ---------------------------------------------------------------------------

/// A host argument slot: its declared type and how to read it from a
/// language value.
pub trait FromValue: Sized {
    fn value_type() -> ValueType;
    fn from_value(value: &Value) -> Result<Self, FnError>;
}

/// A host return slot: its declared type and how to turn it into a
/// language value.
pub trait IntoValue {
    fn value_type() -> ValueType;
    fn into_value(self) -> Value;
}

fn mismatch(expected: &ValueType, got: &Value) -> FnError {
    FnError::new(format!(
        "expected {} argument, got {}",
        expected,
        got.value_type()
    ))
}

impl FromValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }
    fn from_value(value: &Value) -> Result<bool, FnError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch(&<Self as FromValue>::value_type(), other)),
        }
    }
}

impl FromValue for i64 {
    fn value_type() -> ValueType {
        ValueType::Int
    }
    fn from_value(value: &Value) -> Result<i64, FnError> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch(&<Self as FromValue>::value_type(), other)),
        }
    }
}

impl FromValue for u64 {
    fn value_type() -> ValueType {
        ValueType::Uint
    }
    fn from_value(value: &Value) -> Result<u64, FnError> {
        match value {
            Value::Uint(u) => Ok(*u),
            other => Err(mismatch(&<Self as FromValue>::value_type(), other)),
        }
    }
}

impl FromValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Double
    }
    fn from_value(value: &Value) -> Result<f64, FnError> {
        match value {
            Value::Double(d) => Ok(*d),
            other => Err(mismatch(&<Self as FromValue>::value_type(), other)),
        }
    }
}

impl FromValue for String {
    fn value_type() -> ValueType {
        ValueType::String
    }
    fn from_value(value: &Value) -> Result<String, FnError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch(&<Self as FromValue>::value_type(), other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn value_type() -> ValueType {
        ValueType::Bytes
    }
    fn from_value(value: &Value) -> Result<Vec<u8>, FnError> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(mismatch(&<Self as FromValue>::value_type(), other)),
        }
    }
}

impl FromValue for Vec<String> {
    fn value_type() -> ValueType {
        ValueType::list(ValueType::String)
    }
    fn from_value(value: &Value) -> Result<Vec<String>, FnError> {
        match value {
            Value::List(list) => list.items.iter().map(String::from_value).collect(),
            other => Err(mismatch(&<Self as FromValue>::value_type(), other)),
        }
    }
}

impl IntoValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    fn value_type() -> ValueType {
        ValueType::Int
    }
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for u64 {
    fn value_type() -> ValueType {
        ValueType::Uint
    }
    fn into_value(self) -> Value {
        Value::Uint(self)
    }
}

impl IntoValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Double
    }
    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl IntoValue for String {
    fn value_type() -> ValueType {
        ValueType::String
    }
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for Vec<u8> {
    fn value_type() -> ValueType {
        ValueType::Bytes
    }
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl IntoValue for Vec<String> {
    fn value_type() -> ValueType {
        ValueType::list(ValueType::String)
    }
    fn into_value(self) -> Value {
        let items = self.into_iter().map(Value::String).collect();
        Value::List(ListValue::new(items, ValueType::String))
    }
}

// ---------------------------------------------------------------------------
// NativeFunction
// ---------------------------------------------------------------------------

/// A Rust function wrapped for the registry: the full-arity signature,
/// the converted call, and the defaults for optional trailing
/// arguments (rightmost first).
pub struct NativeFunction {
    name: String,
    params: Vec<ValueType>,
    result: ValueType,
    call: CallFn,
    defaults: Vec<Value>,
}

impl NativeFunction {
    pub fn unary<A, R>(
        name: impl Into<String>,
        f: impl Fn(A) -> Result<R, FnError> + Send + Sync + 'static,
    ) -> NativeFunction
    where
        A: FromValue,
        R: IntoValue,
    {
        let call: CallFn = Arc::new(move |args: &[Value]| -> FnResult {
            let a = A::from_value(&args[0])?;
            f(a).map(IntoValue::into_value)
        });
        NativeFunction {
            name: name.into(),
            params: vec![A::value_type()],
            result: R::value_type(),
            call,
            defaults: Vec::new(),
        }
    }

    pub fn binary<A, B, R>(
        name: impl Into<String>,
        f: impl Fn(A, B) -> Result<R, FnError> + Send + Sync + 'static,
    ) -> NativeFunction
    where
        A: FromValue,
        B: FromValue,
        R: IntoValue,
    {
        let call: CallFn = Arc::new(move |args: &[Value]| -> FnResult {
            let a = A::from_value(&args[0])?;
            let b = B::from_value(&args[1])?;
            f(a, b).map(IntoValue::into_value)
        });
        NativeFunction {
            name: name.into(),
            params: vec![A::value_type(), B::value_type()],
            result: R::value_type(),
            call,
            defaults: Vec::new(),
        }
    }

    pub fn ternary<A, B, C, R>(
        name: impl Into<String>,
        f: impl Fn(A, B, C) -> Result<R, FnError> + Send + Sync + 'static,
    ) -> NativeFunction
    where
        A: FromValue,
        B: FromValue,
        C: FromValue,
        R: IntoValue,
    {
        let call: CallFn = Arc::new(move |args: &[Value]| -> FnResult {
            let a = A::from_value(&args[0])?;
            let b = B::from_value(&args[1])?;
            let c = C::from_value(&args[2])?;
            f(a, b, c).map(IntoValue::into_value)
        });
        NativeFunction {
            name: name.into(),
            params: vec![A::value_type(), B::value_type(), C::value_type()],
            result: R::value_type(),
            call,
            defaults: Vec::new(),
        }
    }

    pub fn quaternary<A, B, C, D, R>(
        name: impl Into<String>,
        f: impl Fn(A, B, C, D) -> Result<R, FnError> + Send + Sync + 'static,
    ) -> NativeFunction
    where
        A: FromValue,
        B: FromValue,
        C: FromValue,
        D: FromValue,
        R: IntoValue,
    {
        let call: CallFn = Arc::new(move |args: &[Value]| -> FnResult {
            let a = A::from_value(&args[0])?;
            let b = B::from_value(&args[1])?;
            let c = C::from_value(&args[2])?;
            let d = D::from_value(&args[3])?;
            f(a, b, c, d).map(IntoValue::into_value)
        });
        NativeFunction {
            name: name.into(),
            params: vec![
                A::value_type(),
                B::value_type(),
                C::value_type(),
                D::value_type(),
            ],
            result: R::value_type(),
            call,
            defaults: Vec::new(),
        }
    }

    /// Make the trailing argument optional with the given default.
    /// Repeated calls work backwards through the parameter list.
    pub fn with_default(mut self, value: Value) -> NativeFunction {
        self.defaults.push(value);
        self
    }

    /// One definition per supported arity: the full signature plus one
    /// shortened signature per registered default.
    pub fn definitions(&self) -> Vec<Definition> {
        let full = self.params.len();
        let mut definitions = Vec::with_capacity(self.defaults.len() + 1);

        for dropped in 0..=self.defaults.len() {
            let arity = full - dropped;
            let call = self.call.clone();
            let defaults = self.defaults.clone();
            let padded: CallFn = Arc::new(move |args: &[Value]| -> FnResult {
                let needed = full - args.len();
                let mut full_args = args.to_vec();
                let mut pad: Vec<Value> = defaults[..needed].to_vec();
                pad.reverse();
                full_args.append(&mut pad);
                (call)(&full_args)
            });
            definitions.push(Definition {
                signature: FunctionType::new(
                    &self.name,
                    self.params[..arity].to_vec(),
                    self.result.clone(),
                ),
                call: padded,
            });
        }
        definitions
    }

    pub fn into_function(self) -> Function {
        let definitions = self.definitions();
        Function::new(self.name, definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary_conversion() {
        let f = NativeFunction::unary("shout", |s: String| Ok(s.to_uppercase())).into_function();
        assert_eq!(
            f.call(&[Value::String("hi".to_string())]).unwrap(),
            Value::String("HI".to_string())
        );
        assert!(f.call(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_default_argument_registers_both_arities() {
        let f = NativeFunction::binary("plus", |a: i64, b: i64| Ok(a + b))
            .with_default(Value::Int(10))
            .into_function();
        assert_eq!(f.definitions().len(), 2);
        assert_eq!(
            f.call(&[Value::Int(1), Value::Int(2)]).unwrap(),
            Value::Int(3)
        );
        assert_eq!(f.call(&[Value::Int(1)]).unwrap(), Value::Int(11));
    }

    #[test]
    fn test_two_defaults_pad_rightmost_first() {
        let f = NativeFunction::ternary("tag", |s: String, open: String, close: String| {
            Ok(format!("{}{}{}", open, s, close))
        })
        .with_default(Value::String(">".to_string()))
        .with_default(Value::String("<".to_string()))
        .into_function();
        assert_eq!(f.definitions().len(), 3);
        assert_eq!(
            f.call(&[Value::String("b".to_string())]).unwrap(),
            Value::String("<b>".to_string())
        );
        assert_eq!(
            f.call(&[
                Value::String("b".to_string()),
                Value::String("[".to_string())
            ])
            .unwrap(),
            Value::String("[b>".to_string())
        );
    }

    #[test]
    fn test_string_list_round_trip() {
        let f = NativeFunction::unary("idlist", |items: Vec<String>| Ok(items)).into_function();
        let list = Value::List(ListValue::new(
            vec![Value::String("a".to_string())],
            ValueType::String,
        ));
        assert_eq!(f.call(&[list.clone()]).unwrap(), list);
    }
}
