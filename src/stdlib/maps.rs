//! Map helpers: membership test and lookup with an optional default.
use crate::ast::function::{Definition, FnError, Function};
use crate::ast::types::{FunctionType, ValueType};
use crate::ast::value::Value;

pub(crate) fn functions() -> Vec<Function> {
    let param_a = ValueType::param("A");
    let param_b = ValueType::param("B");
    let map_ab = ValueType::map(param_a.clone(), param_b.clone());

    vec![
        Function::new(
            "has",
            vec![Definition::new(
                FunctionType::new("has", vec![map_ab.clone(), param_a.clone()], ValueType::Bool),
                |args| match &args[0] {
                    Value::Map(map) => Ok(Value::Bool(map.get(&args[1]).is_some())),
                    other => Err(FnError::new(format!(
                        "has expects map argument, got {}",
                        other.value_type()
                    ))),
                },
            )],
        ),
        Function::new(
            "get",
            vec![
                Definition::new(
                    FunctionType::new(
                        "get",
                        vec![map_ab.clone(), param_a.clone()],
                        param_b.clone(),
                    ),
                    |args| match &args[0] {
                        Value::Map(map) => map
                            .get(&args[1])
                            .cloned()
                            .ok_or_else(|| FnError::new(format!("no such key {}", args[1]))),
                        other => Err(FnError::new(format!(
                            "get expects map argument, got {}",
                            other.value_type()
                        ))),
                    },
                ),
                Definition::new(
                    FunctionType::new("get", vec![map_ab, param_a, param_b.clone()], param_b),
                    |args| match &args[0] {
                        Value::Map(map) => {
                            Ok(map.get(&args[1]).cloned().unwrap_or_else(|| args[2].clone()))
                        }
                        other => Err(FnError::new(format!(
                            "get expects map argument, got {}",
                            other.value_type()
                        ))),
                    },
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::value::MapValue;

    fn sample_map() -> Value {
        Value::Map(MapValue::new(
            vec![
                (Value::String("k".to_string()), Value::Int(1)),
                (Value::String("j".to_string()), Value::Int(2)),
            ],
            ValueType::String,
            ValueType::Int,
        ))
    }

    fn lookup(name: &str) -> Function {
        functions()
            .into_iter()
            .find(|f| f.name() == name)
            .expect("function not registered")
    }

    #[test]
    fn test_has() {
        let has = lookup("has");
        assert_eq!(
            has.call(&[sample_map(), Value::String("k".to_string())]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            has.call(&[sample_map(), Value::String("z".to_string())]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_get_two_args() {
        let get = lookup("get");
        assert_eq!(
            get.call(&[sample_map(), Value::String("j".to_string())]).unwrap(),
            Value::Int(2)
        );
        assert!(get
            .call(&[sample_map(), Value::String("z".to_string())])
            .is_err());
    }

    #[test]
    fn test_get_with_default_returns_stored_value_when_present() {
        let get = lookup("get");
        assert_eq!(
            get.call(&[sample_map(), Value::String("k".to_string()), Value::Int(99)])
                .unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            get.call(&[sample_map(), Value::String("z".to_string()), Value::Int(99)])
                .unwrap(),
            Value::Int(99)
        );
    }
}
