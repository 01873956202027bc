//! Sable runtime values.
//!
//! A closed sum of primitive values plus list, map, and externally
//! registered variants. Every value reports its type; equality is
//! semantic (content comparison within a kind, false across kinds).
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::ast::types::ValueType;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Null,
    /// A type as a first-class value; the content is the kind name.
    Type(String),
    List(ListValue),
    Map(MapValue),
    /// Host- or library-registered variant carrying its own record.
    External(Arc<dyn ExternalValue>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Uint(_) => ValueType::Uint,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Null => ValueType::Null,
            Value::Type(_) => ValueType::Type,
            Value::List(list) => ValueType::list(list.element_type.clone()),
            Value::Map(map) => ValueType::map(map.key_type.clone(), map.value_type.clone()),
            Value::External(ext) => ext.value_type(),
        }
    }

    /// Semantic equality: content comparison within a kind, false
    /// across kinds. Doubles compare by IEEE `==`.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.items.len() == b.items.len()
                    && a.items.iter().zip(&b.items).all(|(x, y)| x.equal(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.entries.len() == b.entries.len()
                    && a.entries
                        .iter()
                        .all(|(key, value)| b.get(key).is_some_and(|v| value.equal(v)))
            }
            (Value::External(a), Value::External(b)) => a.equal(b.as_ref()),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.equal(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::Null => f.write_str("null"),
            Value::Type(kind) => write!(f, "type<{}>", kind),
            Value::List(list) => {
                let items: Vec<String> = list.items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Map(map) => {
                let entries: Vec<String> = map
                    .entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::External(ext) => f.write_str(&ext.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// ListValue / MapValue
// ---------------------------------------------------------------------------

/// Ordered sequence plus its declared element type.
#[derive(Debug, Clone)]
pub struct ListValue {
    pub items: Vec<Value>,
    pub element_type: ValueType,
}

impl ListValue {
    pub fn new(items: Vec<Value>, element_type: ValueType) -> ListValue {
        ListValue {
            items,
            element_type,
        }
    }
}

/// Key/value entries plus their declared key and value types. Keys are
/// compared by semantic equality, so lookup is a linear scan.
#[derive(Debug, Clone)]
pub struct MapValue {
    pub entries: Vec<(Value, Value)>,
    pub key_type: ValueType,
    pub value_type: ValueType,
}

impl MapValue {
    pub fn new(entries: Vec<(Value, Value)>, key_type: ValueType, value_type: ValueType) -> MapValue {
        MapValue {
            entries,
            key_type,
            value_type,
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.equal(key))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ExternalValue
// ---------------------------------------------------------------------------

/// Contract for host- or library-registered value variants: report a
/// type, compare semantically, render a string form. Selector-typed
/// records additionally answer member lookups.
pub trait ExternalValue: fmt::Debug + Send + Sync {
    fn value_type(&self) -> ValueType;
    fn equal(&self, other: &dyn ExternalValue) -> bool;
    fn display(&self) -> String;
    fn as_any(&self) -> &dyn Any;

    /// Runtime member lookup for selector-typed records.
    fn member(&self, _name: &str) -> Option<Value> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_reports_kind() {
        assert_eq!(Value::Bool(true).value_type().kind(), "bool");
        assert_eq!(Value::Int(1).value_type().kind(), "int");
        assert_eq!(Value::Null.value_type().kind(), "null_type");
        let list = Value::List(ListValue::new(vec![Value::Int(1)], ValueType::Int));
        assert_eq!(list.value_type().kind(), "list");
    }

    #[test]
    fn test_cross_kind_equality_is_false() {
        assert_ne!(Value::Int(1), Value::Uint(1));
        assert_ne!(Value::Int(1), Value::Double(1.0));
        assert_ne!(Value::String("1".to_string()), Value::Int(1));
    }

    #[test]
    fn test_map_get_uses_semantic_equality() {
        let map = MapValue::new(
            vec![
                (Value::String("k".to_string()), Value::Int(1)),
                (Value::String("j".to_string()), Value::Int(2)),
            ],
            ValueType::String,
            ValueType::Int,
        );
        assert_eq!(map.get(&Value::String("j".to_string())), Some(&Value::Int(2)));
        assert_eq!(map.get(&Value::String("z".to_string())), None);
    }

    #[test]
    fn test_map_equality_ignores_entry_order() {
        let a = Value::Map(MapValue::new(
            vec![
                (Value::Int(1), Value::String("a".to_string())),
                (Value::Int(2), Value::String("b".to_string())),
            ],
            ValueType::Int,
            ValueType::String,
        ));
        let b = Value::Map(MapValue::new(
            vec![
                (Value::Int(2), Value::String("b".to_string())),
                (Value::Int(1), Value::String("a".to_string())),
            ],
            ValueType::Int,
            ValueType::String,
        ));
        assert_eq!(a, b);
    }
}
