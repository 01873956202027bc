//! Expression AST: the nine node kinds a parser produces and the
//! checker and runner walk. Nodes are immutable after construction.
pub mod function;
pub mod types;
pub mod value;

use std::fmt;

pub use function::{
    match_signature, resolve_dynamic_type, CallFn, Definition, FnError, FnResult, Function,
    TypeBindings,
};
pub use types::{ExternalType, FunctionType, ValueType, SELECTOR};
pub use value::{ExternalValue, ListValue, MapValue, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Value),
    Ident {
        name: String,
        leading_dot: bool,
    },
    MemberAccess {
        object: Box<Node>,
        member: String,
        optional: bool,
    },
    /// The callee is an `Ident` or a `MemberAccess`; the latter is
    /// method-call sugar, desugared by prepending the receiver to the
    /// arguments.
    FunctionCall {
        function: Box<Node>,
        args: Vec<Node>,
    },
    Index {
        object: Box<Node>,
        index: Box<Node>,
        optional: bool,
    },
    Conditional {
        condition: Box<Node>,
        true_expr: Box<Node>,
        false_expr: Box<Node>,
    },
    List {
        elements: Vec<Node>,
    },
    Map {
        entries: Vec<MapEntry>,
    },
    Struct {
        type_name: String,
        fields: Vec<StructField>,
        receiver_style: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Node,
    pub value: Node,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub value: Node,
    pub optional: bool,
}

impl Node {
    pub fn literal(value: Value) -> Node {
        Node::Literal(value)
    }

    pub fn ident(name: impl Into<String>) -> Node {
        Node::Ident {
            name: name.into(),
            leading_dot: false,
        }
    }

    pub fn member_access(object: Node, member: impl Into<String>, optional: bool) -> Node {
        Node::MemberAccess {
            object: Box::new(object),
            member: member.into(),
            optional,
        }
    }

    pub fn function_call(function: Node, args: Vec<Node>) -> Node {
        Node::FunctionCall {
            function: Box::new(function),
            args,
        }
    }

    /// Call a globally named function: `call("size", vec![...])`.
    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Node {
        Node::function_call(Node::ident(name), args)
    }

    /// Receiver-style call: `method_call(recv, "f", vec![b])` models
    /// `recv.f(b)`, which dispatches as `f(recv, b)`.
    pub fn method_call(receiver: Node, name: impl Into<String>, args: Vec<Node>) -> Node {
        Node::function_call(Node::member_access(receiver, name, false), args)
    }

    pub fn index(object: Node, index: Node, optional: bool) -> Node {
        Node::Index {
            object: Box::new(object),
            index: Box::new(index),
            optional,
        }
    }

    pub fn conditional(condition: Node, true_expr: Node, false_expr: Node) -> Node {
        Node::Conditional {
            condition: Box::new(condition),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
        }
    }

    pub fn list(elements: Vec<Node>) -> Node {
        Node::List { elements }
    }

    pub fn map(entries: Vec<(Node, Node)>) -> Node {
        Node::Map {
            entries: entries
                .into_iter()
                .map(|(key, value)| MapEntry {
                    key,
                    value,
                    optional: false,
                })
                .collect(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => value.fmt(f),
            Node::Ident { name, leading_dot } => {
                if *leading_dot {
                    write!(f, ".{}", name)
                } else {
                    f.write_str(name)
                }
            }
            Node::MemberAccess {
                object,
                member,
                optional,
            } => {
                let op = if *optional { ".?" } else { "." };
                write!(f, "({}{}{})", object, op, member)
            }
            Node::FunctionCall { function, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, rendered.join(", "))
            }
            Node::Index {
                object,
                index,
                optional,
            } => {
                let op = if *optional { "[?" } else { "[" };
                write!(f, "({}{}{}])", object, op, index)
            }
            Node::Conditional {
                condition,
                true_expr,
                false_expr,
            } => write!(f, "({} ? {} : {})", condition, true_expr, false_expr),
            Node::List { elements } => {
                let rendered: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Node::Map { entries } => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|entry| {
                        let opt = if entry.optional { "?" } else { "" };
                        format!("{}{}: {}", opt, entry.key, entry.value)
                    })
                    .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
            Node::Struct {
                type_name,
                fields,
                receiver_style,
            } => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|field| {
                        let opt = if field.optional { "?" } else { "" };
                        format!("{}{}: {}", opt, field.name, field.value)
                    })
                    .collect();
                let dot = if *receiver_style { "." } else { "" };
                write!(f, "{}{}{{{}}}", dot, type_name, rendered.join(", "))
            }
        }
    }
}
