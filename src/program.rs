//! A program binds a parsed expression to its declared variable types.
//!
//! Declaring a name-to-type map is the compile-time contract; supplying
//! a name-to-value map is the runtime contract. `check_variables`
//! verifies the latter against the former before evaluation.
use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{Node, Value, ValueType};

pub type VariablesType = HashMap<String, ValueType>;
pub type Variables = HashMap<String, Value>;

/// Derive the type map of a concrete binding set.
pub fn variable_types(variables: &Variables) -> VariablesType {
    variables
        .iter()
        .map(|(name, value)| (name.clone(), value.value_type()))
        .collect()
}

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("variable {0} is not defined")]
    Missing(String),
    #[error("variable {name} is not compatible with {expected}")]
    TypeMismatch { name: String, expected: ValueType },
}

pub struct Program {
    node: Node,
    variables_type: VariablesType,
}

impl Program {
    pub fn new(node: Node, variables_type: VariablesType) -> Program {
        Program {
            node,
            variables_type,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn set_variable(&mut self, name: impl Into<String>, ty: ValueType) {
        self.variables_type.insert(name.into(), ty);
    }

    pub fn get_variable(&self, name: &str) -> Option<&ValueType> {
        self.variables_type.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables_type.keys().map(String::as_str)
    }

    /// Verify that every declared variable is supplied and that its
    /// value's type equals the declared type.
    pub fn check_variables(&self, variables: &Variables) -> Result<(), BindingError> {
        for (name, declared) in &self.variables_type {
            let value = variables
                .get(name)
                .ok_or_else(|| BindingError::Missing(name.clone()))?;
            if !declared.equals(&value.value_type()) {
                return Err(BindingError::TypeMismatch {
                    name: name.clone(),
                    expected: declared.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_variables() {
        let mut program = Program::new(Node::ident("a"), VariablesType::new());
        program.set_variable("a", ValueType::Int);

        let mut variables = Variables::new();
        assert!(matches!(
            program.check_variables(&variables),
            Err(BindingError::Missing(_))
        ));

        variables.insert("a".to_string(), Value::String("x".to_string()));
        assert!(matches!(
            program.check_variables(&variables),
            Err(BindingError::TypeMismatch { .. })
        ));

        variables.insert("a".to_string(), Value::Int(1));
        assert!(program.check_variables(&variables).is_ok());
    }

    #[test]
    fn test_variable_types_derivation() {
        let mut variables = Variables::new();
        variables.insert("a".to_string(), Value::Int(1));
        variables.insert("b".to_string(), Value::Bool(true));
        let types = variable_types(&variables);
        assert!(types["a"].equals(&ValueType::Int));
        assert!(types["b"].equals(&ValueType::Bool));
    }
}
