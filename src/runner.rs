//! Evaluator: a tree walk producing a value for every node.
//!
//! Identifiers resolve against the runtime binding map, calls dispatch
//! through the environment's registry. Conditionals evaluate only the
//! chosen branch. Logical-or has one deliberate quirk: an argument
//! whose evaluation fails is replaced by `false` before dispatch, for
//! that operator only.
use thiserror::Error;

use crate::ast::function::LOGICAL_OR;
use crate::ast::{ListValue, MapEntry, MapValue, Node, Value, ValueType};
use crate::env::Env;
use crate::program::{Program, Variables};

#[derive(Debug, Error)]
#[error("runtime error: {message}")]
pub struct RuntimeError {
    pub message: String,
    /// The offending node, for source mapping.
    pub node: Node,
}

pub struct Runner<'a> {
    env: &'a Env,
    program: &'a Program,
    variables: &'a Variables,
}

impl<'a> Runner<'a> {
    pub fn new(env: &'a Env, program: &'a Program, variables: &'a Variables) -> Runner<'a> {
        Runner {
            env,
            program,
            variables,
        }
    }

    pub fn eval(&self) -> Result<Value, RuntimeError> {
        self.eval_node(self.program.node())
    }

    fn error(&self, node: &Node, message: impl Into<String>) -> RuntimeError {
        RuntimeError {
            message: message.into(),
            node: node.clone(),
        }
    }

    fn eval_node(&self, node: &Node) -> Result<Value, RuntimeError> {
        match node {
            Node::Literal(value) => Ok(value.clone()),
            Node::Ident { name, .. } => self.eval_ident(name, node),
            Node::MemberAccess {
                object,
                member,
                optional,
            } => self.eval_member_access(object, member, *optional, node),
            Node::FunctionCall { function, args } => self.eval_function_call(function, args, node),
            Node::Index {
                object,
                index,
                optional,
            } => self.eval_index(object, index, *optional, node),
            Node::Conditional {
                condition,
                true_expr,
                false_expr,
            } => self.eval_conditional(condition, true_expr, false_expr, node),
            Node::List { elements } => self.eval_list(elements),
            Node::Map { entries } => self.eval_map(entries, node),
            Node::Struct { .. } => Err(self.error(node, "struct is not supported")),
        }
    }

    fn eval_ident(&self, name: &str, node: &Node) -> Result<Value, RuntimeError> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| self.error(node, format!("undefined identifier: {}", name)))
    }

    fn eval_member_access(
        &self,
        object: &Node,
        member: &str,
        optional: bool,
        node: &Node,
    ) -> Result<Value, RuntimeError> {
        let object = self.eval_node(object)?;

        match &object {
            Value::Map(map) => {
                if let Some(value) = map.get(&Value::String(member.to_string())) {
                    return Ok(value.clone());
                }
                if optional {
                    return Ok(Value::Null);
                }
                Err(self.error(node, format!("map does not have member: {}", member)))
            }
            Value::External(ext) => {
                if let Some(value) = ext.member(member) {
                    return Ok(value);
                }
                if optional {
                    return Ok(Value::Null);
                }
                Err(self.error(
                    node,
                    format!("member {} not found in {}", member, object.value_type()),
                ))
            }
            other => {
                if optional {
                    return Ok(Value::Null);
                }
                Err(self.error(
                    node,
                    format!(
                        "cannot access member {} on type {}",
                        member,
                        other.value_type()
                    ),
                ))
            }
        }
    }

    fn eval_function_call(
        &self,
        function: &Node,
        args: &[Node],
        node: &Node,
    ) -> Result<Value, RuntimeError> {
        let (fn_name, arg_nodes): (&str, Vec<&Node>) = match function {
            Node::Ident { name, .. } => (name, args.iter().collect()),
            Node::MemberAccess { object, member, .. } => (
                member,
                std::iter::once(object.as_ref()).chain(args.iter()).collect(),
            ),
            other => {
                return Err(self.error(
                    node,
                    format!(
                        "function call must be an identifier or member access, got {}",
                        other
                    ),
                ))
            }
        };

        let function = self
            .env
            .get_function(fn_name)
            .ok_or_else(|| self.error(node, format!("function {} not found", fn_name)))?;

        let mut arg_values = Vec::with_capacity(arg_nodes.len());
        for arg in &arg_nodes {
            let value = match self.eval_node(arg) {
                Ok(value) => value,
                // Logical-or masks a failing argument to false. This is
                // the only operator with that behavior.
                Err(_) if function.name() == LOGICAL_OR => Value::Bool(false),
                Err(err) => return Err(err),
            };
            arg_values.push(value);
        }

        function
            .call(&arg_values)
            .map_err(|err| self.error(node, err.to_string()))
    }

    fn eval_index(
        &self,
        object: &Node,
        index: &Node,
        optional: bool,
        node: &Node,
    ) -> Result<Value, RuntimeError> {
        let object = self.eval_node(object)?;
        let index = self.eval_node(index)?;

        match &object {
            Value::List(list) => {
                let idx = match &index {
                    Value::Int(i) => usize::try_from(*i).ok(),
                    Value::Uint(u) => usize::try_from(*u).ok(),
                    other => {
                        return Err(self.error(
                            node,
                            format!("list index must be integer, got {}", other.value_type()),
                        ))
                    }
                };
                match idx.and_then(|i| list.items.get(i)) {
                    Some(value) => Ok(value.clone()),
                    None if optional => Ok(Value::Null),
                    None => Err(self.error(node, format!("list index out of range: {}", index))),
                }
            }
            Value::Map(map) => match map.get(&index) {
                Some(value) => Ok(value.clone()),
                None if optional => Ok(Value::Null),
                None => Err(self.error(node, format!("map does not have key: {}", index))),
            },
            other => Err(self.error(
                node,
                format!("cannot index type {}", other.value_type()),
            )),
        }
    }

    fn eval_conditional(
        &self,
        condition: &Node,
        true_expr: &Node,
        false_expr: &Node,
        node: &Node,
    ) -> Result<Value, RuntimeError> {
        let condition = self.eval_node(condition)?;

        match condition {
            // Only the chosen branch is evaluated.
            Value::Bool(true) => self.eval_node(true_expr),
            Value::Bool(false) => self.eval_node(false_expr),
            other => Err(self.error(
                node,
                format!("condition must be boolean, got {}", other.value_type()),
            )),
        }
    }

    fn eval_list(&self, elements: &[Node]) -> Result<Value, RuntimeError> {
        let mut items = Vec::with_capacity(elements.len());
        let mut element_type = ValueType::Any;

        for (i, element) in elements.iter().enumerate() {
            let value = self.eval_node(element)?;
            if i == 0 {
                element_type = value.value_type();
            }
            if !value.value_type().equals(&element_type) {
                element_type = ValueType::Any;
            }
            items.push(value);
        }

        Ok(Value::List(ListValue::new(items, element_type)))
    }

    fn eval_map(&self, entries: &[MapEntry], node: &Node) -> Result<Value, RuntimeError> {
        let mut values: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
        let mut key_type = ValueType::Any;
        let mut value_type = ValueType::Any;

        for (i, entry) in entries.iter().enumerate() {
            let key = self.eval_node(&entry.key)?;
            let value = self.eval_node(&entry.value)?;

            if values.iter().any(|(existing, _)| existing.equal(&key)) {
                return Err(self.error(node, format!("map has repeated key: {}", key)));
            }

            if i == 0 {
                key_type = key.value_type();
                value_type = value.value_type();
            }
            if !key.value_type().equals(&key_type) {
                key_type = ValueType::Any;
            }
            if !value.value_type().equals(&value_type) {
                value_type = ValueType::Any;
            }

            values.push((key, value));
        }

        Ok(Value::Map(MapValue::new(values, key_type, value_type)))
    }
}
