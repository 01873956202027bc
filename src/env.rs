//! Environment: the facade a host interacts with.
//!
//! An environment carries the function registry and exposes the
//! check/run entry points. Register additional functions before
//! sharing; afterwards the registry is read-only and an `&Env` may be
//! used concurrently from any number of threads.
use indexmap::IndexMap;
use tracing::debug;

use crate::ast::function::builtin_functions;
use crate::ast::{Function, Value, ValueType};
use crate::checker::{CheckError, Checker};
use crate::program::{Program, Variables};
use crate::runner::{Runner, RuntimeError};
use crate::stdlib;

pub struct Env {
    functions: IndexMap<String, Function>,
}

impl Env {
    /// Operators, `size`/`type`, and the explicit conversions only.
    pub fn builtin() -> Env {
        Env {
            functions: builtin_functions(),
        }
    }

    /// Builtins plus the standard library (strings, maps, encoding,
    /// time, and the operator extensions the time library brings).
    pub fn standard() -> Env {
        let mut env = Env::builtin();
        stdlib::install(&mut env);
        env
    }

    /// Register or replace a function. Must happen before the
    /// environment is shared across threads.
    pub fn set_function(&mut self, function: Function) {
        self.functions
            .insert(function.name().to_string(), function);
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.get_mut(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Statically type-check a program, yielding its result type.
    pub fn check(&self, program: &Program) -> Result<ValueType, CheckError> {
        debug!(node = %program.node(), "check");
        Checker::new(self, program).check()
    }

    /// Evaluate a program against concrete bindings. The bindings are
    /// verified against the program's declared variable types first.
    pub fn run(&self, program: &Program, variables: &Variables) -> Result<Value, RuntimeError> {
        debug!(node = %program.node(), "run");
        if let Err(err) = program.check_variables(variables) {
            return Err(RuntimeError {
                message: err.to_string(),
                node: program.node().clone(),
            });
        }
        Runner::new(self, program, variables).eval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_env_has_operators_but_no_stdlib() {
        let env = Env::builtin();
        assert!(env.get_function("_+_").is_some());
        assert!(env.get_function("size").is_some());
        assert!(env.get_function("contains").is_none());
    }

    #[test]
    fn test_standard_env_extends_builtin() {
        let env = Env::standard();
        assert!(env.get_function("contains").is_some());
        assert!(env.get_function("duration").is_some());
        // The time library extends `_+_` in place.
        assert!(env.get_function("_+_").unwrap().definitions().len() > 6);
    }

    #[test]
    fn test_env_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Env>();
    }
}
