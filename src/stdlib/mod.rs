//! Standard library: the functions `Env::standard` layers on top of
//! the builtins, plus the operator extensions the time library brings.
pub mod encoding;
pub mod maps;
pub mod strings;
pub mod time;

use crate::env::Env;

pub(crate) fn install(env: &mut Env) {
    for function in strings::functions()
        .into_iter()
        .chain(maps::functions())
        .chain(encoding::functions())
        .chain(time::functions())
    {
        env.set_function(function);
    }

    // Teach the built-in operators about timestamps and durations.
    for extension in time::operator_extensions() {
        match env.get_function_mut(extension.name()) {
            Some(existing) => existing.combine(&extension),
            None => env.set_function(extension),
        }
    }
}
