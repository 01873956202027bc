//! Static type checker: a tree walk assigning a type to every node.
//!
//! Identifiers resolve against the program's declared variable types,
//! calls against the environment's function registry. Conditional
//! branches and literal collections merge through type equality, with
//! `any` as the heterogeneous fallback.
use thiserror::Error;

use crate::ast::function::{match_signature, resolve_dynamic_type, TypeBindings};
use crate::ast::{FunctionType, MapEntry, Node, ValueType, SELECTOR};
use crate::env::Env;
use crate::program::Program;

#[derive(Debug, Error)]
#[error("type check error: {message}")]
pub struct CheckError {
    pub message: String,
    /// The offending node, for source mapping.
    pub node: Node,
}

pub struct Checker<'a> {
    env: &'a Env,
    program: &'a Program,
}

impl<'a> Checker<'a> {
    pub fn new(env: &'a Env, program: &'a Program) -> Checker<'a> {
        Checker { env, program }
    }

    pub fn check(&self) -> Result<ValueType, CheckError> {
        self.check_node(self.program.node())
    }

    fn error(&self, node: &Node, message: impl Into<String>) -> CheckError {
        CheckError {
            message: message.into(),
            node: node.clone(),
        }
    }

    fn check_node(&self, node: &Node) -> Result<ValueType, CheckError> {
        match node {
            Node::Literal(value) => Ok(value.value_type()),
            Node::Ident { name, .. } => self.check_ident(name, node),
            Node::MemberAccess { object, member, .. } => {
                self.check_member_access(object, member, node)
            }
            Node::FunctionCall { function, args } => self.check_function_call(function, args, node),
            Node::Index { object, index, .. } => self.check_index(object, index, node),
            Node::Conditional {
                condition,
                true_expr,
                false_expr,
            } => self.check_conditional(condition, true_expr, false_expr, node),
            Node::List { elements } => self.check_list(elements),
            Node::Map { entries } => self.check_map(entries, node),
            Node::Struct { .. } => Err(self.error(node, "struct is not supported")),
        }
    }

    fn check_ident(&self, name: &str, node: &Node) -> Result<ValueType, CheckError> {
        self.program
            .get_variable(name)
            .cloned()
            .ok_or_else(|| self.error(node, format!("undefined identifier: {}", name)))
    }

    fn check_member_access(
        &self,
        object: &Node,
        member: &str,
        node: &Node,
    ) -> Result<ValueType, CheckError> {
        let object_type = self.check_node(object)?;

        if !object_type.has_trait(SELECTOR) {
            return Err(self.error(
                node,
                format!("cannot access member of type {}", object_type),
            ));
        }

        object_type.member(member).ok_or_else(|| {
            self.error(
                node,
                format!("member {} not found in type {}", member, object_type),
            )
        })
    }

    fn check_function_call(
        &self,
        function: &Node,
        args: &[Node],
        node: &Node,
    ) -> Result<ValueType, CheckError> {
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

        let mut arg_types = Vec::with_capacity(arg_nodes.len());
        for arg in &arg_nodes {
            arg_types.push(self.check_node(arg)?);
        }

        let mut found: Option<(&FunctionType, TypeBindings)> = None;
        for definition in function.definitions() {
            if let Some(bindings) = match_signature(definition.signature.params(), &arg_types) {
                found = Some((&definition.signature, bindings));
                break;
            }
        }

        let (signature, mut bindings) = found.ok_or_else(|| {
            let rendered: Vec<String> = arg_types.iter().map(|t| t.to_string()).collect();
            self.error(
                node,
                format!(
                    "function {} not found with args [{}]",
                    function.name(),
                    rendered.join(", ")
                ),
            )
        })?;

        let result = signature.result();
        if result.is_dyn() {
            resolve_dynamic_type(&mut bindings, result, None)
                .map_err(|err| self.error(node, err.to_string()))
        } else {
            Ok(result.clone())
        }
    }

    fn check_index(
        &self,
        object: &Node,
        index: &Node,
        node: &Node,
    ) -> Result<ValueType, CheckError> {
        let object_type = self.check_node(object)?;
        let index_type = self.check_node(index)?;

        match object_type {
            ValueType::List(element) => {
                if !matches!(index_type, ValueType::Int | ValueType::Uint) {
                    return Err(self.error(
                        node,
                        format!("list index must be integer, got {}", index_type),
                    ));
                }
                Ok(*element)
            }
            ValueType::Map(key, value) => {
                if !index_type.equals(&key) {
                    return Err(self.error(
                        node,
                        format!("map key type mismatch: expected {}, got {}", key, index_type),
                    ));
                }
                Ok(*value)
            }
            other => Err(self.error(node, format!("cannot index type {}", other))),
        }
    }

    fn check_conditional(
        &self,
        condition: &Node,
        true_expr: &Node,
        false_expr: &Node,
        node: &Node,
    ) -> Result<ValueType, CheckError> {
        let condition_type = self.check_node(condition)?;
        if !matches!(condition_type, ValueType::Bool) {
            return Err(self.error(
                node,
                format!(
                    "conditional expression requires bool condition, got {}",
                    condition_type
                ),
            ));
        }

        let true_type = self.check_node(true_expr)?;
        let false_type = self.check_node(false_expr)?;

        if true_type.equals(&false_type) {
            Ok(true_type)
        } else if false_type.equals(&true_type) {
            Ok(false_type)
        } else {
            Err(self.error(
                node,
                format!(
                    "conditional branches have incompatible types: {} and {}",
                    true_type, false_type
                ),
            ))
        }
    }

    fn check_list(&self, elements: &[Node]) -> Result<ValueType, CheckError> {
        if elements.is_empty() {
            return Ok(ValueType::list(ValueType::Any));
        }

        let mut element_type = self.check_node(&elements[0])?;
        for element in &elements[1..] {
            let ty = self.check_node(element)?;
            if !ty.equals(&element_type) {
                element_type = ValueType::Any;
            }
        }

        Ok(ValueType::list(element_type))
    }

    fn check_map(&self, entries: &[MapEntry], node: &Node) -> Result<ValueType, CheckError> {
        if entries.is_empty() {
            return Ok(ValueType::map(ValueType::Any, ValueType::Any));
        }

        let key_type = self.check_node(&entries[0].key)?;
        let mut value_type = self.check_node(&entries[0].value)?;

        for (i, entry) in entries[1..].iter().enumerate() {
            let entry_key_type = self.check_node(&entry.key)?;
            let entry_value_type = self.check_node(&entry.value)?;

            if !entry_key_type.equals(&key_type) {
                return Err(self.error(
                    node,
                    format!(
                        "map entry {} key has type {}, expected {}",
                        i + 1,
                        entry_key_type,
                        key_type
                    ),
                ));
            }
            if !entry_value_type.equals(&value_type) {
                value_type = ValueType::Any;
            }
        }

        Ok(ValueType::map(key_type, value_type))
    }
}
