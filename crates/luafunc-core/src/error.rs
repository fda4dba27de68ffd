//! Error types for value conversion, Lua sessions, and function dispatch.

use thiserror::Error;

use crate::value::HostKind;

/// Errors that can occur while running a Lua function call.
///
/// Every variant is terminal for the call in progress.
#[derive(Error, Debug)]
pub enum LuaFuncError {
    /// A host number could not be narrowed to a finite `f64` (or a Lua float
    /// could not be widened back into a host number).
    #[error("numeric conversion error: {0}")]
    NumericConversion(String),

    /// A host value kind has no mapping into Lua.
    #[error("unsupported parameter type {0}")]
    UnsupportedType(HostKind),

    /// The snippet failed to compile or raised while being executed.
    #[error("failed to load Lua code: {0}")]
    EngineLoad(#[source] mlua::Error),

    /// The entry point is missing, not callable, or raised during the call.
    #[error("call to Lua function '{entry_point}' failed: {source}")]
    EngineCall {
        entry_point: String,
        #[source]
        source: mlua::Error,
    },

    /// A returned table contained a key Lua cannot turn into a string.
    #[error("bad table index: {0} key cannot be converted to a string")]
    BadTableKey(String),

    /// Lua returned a value with no host representation.
    #[error("unhandled return type {0}")]
    UnsupportedReturnType(String),

    /// A returned table nests deeper than the converter follows (usually a
    /// table that contains itself).
    #[error("returned table nests deeper than {0} levels")]
    NestingTooDeep(usize),

    /// The entry point returned no values at all.
    #[error("Lua function '{entry_point}' returned no value")]
    MissingReturnValue { entry_point: String },

    /// Any other engine failure (e.g. allocating a table past the memory limit).
    #[error("Lua engine error: {0}")]
    Engine(#[from] mlua::Error),

    /// No function is registered under this name.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Arguments do not satisfy the declared signature.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Convenience alias used throughout luafunc-core.
pub type Result<T> = std::result::Result<T, LuaFuncError>;
