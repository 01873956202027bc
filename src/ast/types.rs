//! Sable static type representation.
//!
//! Every value in the language has a type; types know their kind tag,
//! their trait set, how they compare for equality (`any` matches
//! everything), whether they mention a type parameter, and how to
//! convert values between kinds.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::function::FnError;
use crate::ast::value::Value;

pub const KIND_BOOL: &str = "bool";
pub const KIND_INT: &str = "int";
pub const KIND_UINT: &str = "uint";
pub const KIND_DOUBLE: &str = "double";
pub const KIND_STRING: &str = "string";
pub const KIND_BYTES: &str = "bytes";
pub const KIND_LIST: &str = "list";
pub const KIND_MAP: &str = "map";
pub const KIND_FUNCTION: &str = "function";
pub const KIND_NULL: &str = "null_type";
pub const KIND_TYPE: &str = "type";
pub const KIND_ANY: &str = "any";

/// Trait bit: the type supports named-member lookup (`obj.field`).
pub const SELECTOR: u32 = 1 << 0;

// ---------------------------------------------------------------------------
// ValueType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ValueType {
    Bool,
    Int,
    Uint,
    Double,
    String,
    Bytes,
    Null,
    Type,
    Any,
    List(Box<ValueType>),
    Map(Box<ValueType>, Box<ValueType>),
    Function(Box<FunctionType>),
    /// A type parameter inside an overload signature (`A`, `B`, ...).
    /// Its kind *is* its name; it never appears in user expressions.
    Param(String),
    /// Host- or library-registered kind (timestamp, duration, ...).
    External(Arc<ExternalType>),
}

impl ValueType {
    pub fn list(element: ValueType) -> ValueType {
        ValueType::List(Box::new(element))
    }

    pub fn map(key: ValueType, value: ValueType) -> ValueType {
        ValueType::Map(Box::new(key), Box::new(value))
    }

    pub fn param(name: impl Into<String>) -> ValueType {
        ValueType::Param(name.into())
    }

    pub fn kind(&self) -> &str {
        match self {
            ValueType::Bool => KIND_BOOL,
            ValueType::Int => KIND_INT,
            ValueType::Uint => KIND_UINT,
            ValueType::Double => KIND_DOUBLE,
            ValueType::String => KIND_STRING,
            ValueType::Bytes => KIND_BYTES,
            ValueType::Null => KIND_NULL,
            ValueType::Type => KIND_TYPE,
            ValueType::Any => KIND_ANY,
            ValueType::List(_) => KIND_LIST,
            ValueType::Map(_, _) => KIND_MAP,
            ValueType::Function(_) => KIND_FUNCTION,
            ValueType::Param(name) => name,
            ValueType::External(t) => t.kind(),
        }
    }

    fn trait_mask(&self) -> u32 {
        match self {
            ValueType::Map(_, _) => SELECTOR,
            ValueType::External(t) => t.trait_mask,
            _ => 0,
        }
    }

    pub fn has_trait(&self, traits: u32) -> bool {
        self.trait_mask() & traits == traits
    }

    /// Type equality. `any` is equal to every type; parameterized kinds
    /// compare their parameters pairwise.
    pub fn equals(&self, other: &ValueType) -> bool {
        if matches!(self, ValueType::Any) || matches!(other, ValueType::Any) {
            return true;
        }
        match (self, other) {
            (ValueType::List(a), ValueType::List(b)) => a.equals(b),
            (ValueType::Map(k1, v1), ValueType::Map(k2, v2)) => k1.equals(k2) && v1.equals(v2),
            (ValueType::Function(a), ValueType::Function(b)) => a.equals(b),
            _ => self.kind() == other.kind(),
        }
    }

    /// True iff the type mentions a type parameter anywhere inside.
    pub fn is_dyn(&self) -> bool {
        match self {
            ValueType::Param(_) => true,
            ValueType::List(elem) => elem.is_dyn(),
            ValueType::Map(key, value) => key.is_dyn() || value.is_dyn(),
            ValueType::Function(f) => f.params.iter().any(ValueType::is_dyn) || f.result.is_dyn(),
            _ => false,
        }
    }

    /// Declared type of a named member, for types carrying the
    /// `SELECTOR` trait. A map answers its value type for any name.
    pub fn member(&self, name: &str) -> Option<ValueType> {
        match self {
            ValueType::Map(_, value) => Some((**value).clone()),
            ValueType::External(t) => t.members.get(name).cloned(),
            _ => None,
        }
    }

    /// Convert `value` (of this type) to `target`. Identity conversions
    /// always succeed; everything else follows the conversion table.
    pub fn convert_to(&self, value: &Value, target: &ValueType) -> Result<Value, FnError> {
        if value.value_type().equals(target) {
            return Ok(value.clone());
        }
        match (value, target) {
            (Value::Bool(b), ValueType::String) => Ok(Value::String(b.to_string())),

            (Value::Int(i), ValueType::Double) => Ok(Value::Double(*i as f64)),
            (Value::Int(i), ValueType::Uint) => {
                if *i < 0 {
                    return Err(FnError::new(format!(
                        "int value {} is too small to convert to uint",
                        i
                    )));
                }
                Ok(Value::Uint(*i as u64))
            }
            (Value::Int(i), ValueType::String) => Ok(Value::String(i.to_string())),

            (Value::Uint(u), ValueType::Int) => {
                if *u > i64::MAX as u64 {
                    return Err(FnError::new(format!(
                        "uint value {} is too large to convert to int",
                        u
                    )));
                }
                Ok(Value::Int(*u as i64))
            }
            (Value::Uint(u), ValueType::Double) => Ok(Value::Double(*u as f64)),
            (Value::Uint(u), ValueType::String) => Ok(Value::String(u.to_string())),

            (Value::Double(d), ValueType::Int) => {
                if *d >= i64::MAX as f64 {
                    return Err(FnError::new(format!(
                        "double value {} is too large to convert to int",
                        d
                    )));
                }
                if *d <= i64::MIN as f64 {
                    return Err(FnError::new(format!(
                        "double value {} is too small to convert to int",
                        d
                    )));
                }
                Ok(Value::Int(*d as i64))
            }
            (Value::Double(d), ValueType::Uint) => {
                if *d < 0.0 {
                    return Err(FnError::new(format!(
                        "double value {} is too small to convert to uint",
                        d
                    )));
                }
                if *d >= u64::MAX as f64 {
                    return Err(FnError::new(format!(
                        "double value {} is too large to convert to uint",
                        d
                    )));
                }
                Ok(Value::Uint(*d as u64))
            }
            (Value::Double(d), ValueType::String) => Ok(Value::String(d.to_string())),

            (Value::String(s), ValueType::Bool) => match s.as_str() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(Value::Bool(true)),
                "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(Value::Bool(false)),
                _ => Err(FnError::new(format!("invalid bool string: {:?}", s))),
            },
            (Value::String(s), ValueType::Bytes) => Ok(Value::Bytes(s.clone().into_bytes())),
            (Value::String(s), ValueType::Double) => s
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|err| FnError::new(format!("invalid double string {:?}: {}", s, err))),
            (Value::String(s), ValueType::Int) => s
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|err| FnError::new(format!("invalid int string {:?}: {}", s, err))),
            (Value::String(s), ValueType::Uint) => s
                .parse::<u64>()
                .map(Value::Uint)
                .map_err(|err| FnError::new(format!("invalid uint string {:?}: {}", s, err))),

            (Value::Bytes(b), ValueType::String) => String::from_utf8(b.clone())
                .map(Value::String)
                .map_err(|_| FnError::new("invalid UTF-8 in bytes, cannot convert to string")),

            _ => Err(FnError::new(format!(
                "cannot convert {} to {}",
                value.value_type(),
                target
            ))),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::List(elem) => write!(f, "list<{}>", elem),
            ValueType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            ValueType::Function(ft) => ft.fmt(f),
            ValueType::Param(name) => write!(f, "dyn_{}", name),
            other => f.write_str(other.kind()),
        }
    }
}

// ---------------------------------------------------------------------------
// FunctionType
// ---------------------------------------------------------------------------

/// The full signature of one overload: name, parameter types, result.
#[derive(Debug, Clone)]
pub struct FunctionType {
    name: String,
    params: Vec<ValueType>,
    result: ValueType,
}

impl FunctionType {
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, result: ValueType) -> FunctionType {
        FunctionType {
            name: name.into(),
            params,
            result,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn result(&self) -> &ValueType {
        &self.result
    }

    pub fn equals(&self, other: &FunctionType) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.equals(b))
            && self.result.equals(&other.result)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({}) -> {}", self.name, params.join(", "), self.result)
    }
}

// ---------------------------------------------------------------------------
// ExternalType
// ---------------------------------------------------------------------------

/// Type object for a host- or library-registered kind. Carries the kind
/// tag, the trait mask, and (for selector kinds) the declared member
/// types.
#[derive(Debug, Clone)]
pub struct ExternalType {
    kind: String,
    trait_mask: u32,
    members: IndexMap<String, ValueType>,
}

impl ExternalType {
    pub fn new(kind: impl Into<String>, trait_mask: u32) -> ExternalType {
        ExternalType {
            kind: kind.into(),
            trait_mask,
            members: IndexMap::new(),
        }
    }

    pub fn with_member(mut self, name: impl Into<String>, member: ValueType) -> ExternalType {
        self.members.insert(name.into(), member);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// The first non-`any` of the given types, `any` when there is none.
pub fn deterministic_type(types: &[&ValueType]) -> ValueType {
    for t in types {
        if t.kind() != KIND_ANY {
            return (*t).clone();
        }
    }
    ValueType::Any
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_reflexive_and_symmetric() {
        let types = [
            ValueType::Bool,
            ValueType::Int,
            ValueType::String,
            ValueType::list(ValueType::Int),
            ValueType::map(ValueType::String, ValueType::Double),
        ];
        for a in &types {
            assert!(a.equals(a));
            for b in &types {
                assert_eq!(a.equals(b), b.equals(a));
            }
        }
    }

    #[test]
    fn test_any_equals_everything() {
        assert!(ValueType::Any.equals(&ValueType::Int));
        assert!(ValueType::list(ValueType::Int).equals(&ValueType::Any));
        assert!(ValueType::Any.equals(&ValueType::map(ValueType::String, ValueType::Int)));
    }

    #[test]
    fn test_parameterized_equality() {
        assert!(ValueType::list(ValueType::Int).equals(&ValueType::list(ValueType::Int)));
        assert!(!ValueType::list(ValueType::Int).equals(&ValueType::list(ValueType::String)));
        assert!(ValueType::list(ValueType::Any).equals(&ValueType::list(ValueType::String)));
        assert!(!ValueType::map(ValueType::String, ValueType::Int)
            .equals(&ValueType::map(ValueType::Int, ValueType::Int)));
    }

    #[test]
    fn test_is_dyn() {
        assert!(ValueType::param("A").is_dyn());
        assert!(ValueType::list(ValueType::param("A")).is_dyn());
        assert!(ValueType::map(ValueType::param("A"), ValueType::param("B")).is_dyn());
        assert!(!ValueType::list(ValueType::Int).is_dyn());
        assert!(!ValueType::Int.is_dyn());
    }

    #[test]
    fn test_map_member_is_value_type() {
        let ty = ValueType::map(ValueType::String, ValueType::Int);
        assert!(ty.has_trait(SELECTOR));
        assert!(ty.member("anything").unwrap().equals(&ValueType::Int));
        assert!(!ValueType::Int.has_trait(SELECTOR));
    }

    #[test]
    fn test_int_conversions() {
        let v = Value::Int(42);
        assert_eq!(
            ValueType::Int.convert_to(&v, &ValueType::Double).unwrap(),
            Value::Double(42.0)
        );
        assert_eq!(
            ValueType::Int.convert_to(&v, &ValueType::Uint).unwrap(),
            Value::Uint(42)
        );
        assert!(ValueType::Int
            .convert_to(&Value::Int(-1), &ValueType::Uint)
            .is_err());
        assert_eq!(
            ValueType::Int.convert_to(&v, &ValueType::String).unwrap(),
            Value::String("42".to_string())
        );
    }

    #[test]
    fn test_double_conversion_bounds() {
        assert!(ValueType::Double
            .convert_to(&Value::Double(1e300), &ValueType::Int)
            .is_err());
        assert!(ValueType::Double
            .convert_to(&Value::Double(-0.5), &ValueType::Uint)
            .is_err());
        assert_eq!(
            ValueType::Double
                .convert_to(&Value::Double(3.9), &ValueType::Int)
                .unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn test_bytes_to_string_requires_utf8() {
        let ok = Value::Bytes(b"abc".to_vec());
        assert_eq!(
            ValueType::Bytes.convert_to(&ok, &ValueType::String).unwrap(),
            Value::String("abc".to_string())
        );
        let bad = Value::Bytes(vec![0xff, 0xfe]);
        assert!(ValueType::Bytes
            .convert_to(&bad, &ValueType::String)
            .is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueType::list(ValueType::Int).to_string(), "list<int>");
        assert_eq!(
            ValueType::map(ValueType::String, ValueType::Any).to_string(),
            "map<string, any>"
        );
        assert_eq!(ValueType::param("A").to_string(), "dyn_A");
    }
}
