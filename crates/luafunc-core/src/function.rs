//! Declared function signatures and the `lua` function.
//!
//! A [`FunctionSpec`] is a plain record: a description, the ordered parameter
//! list, an optional variadic tail, the result type, and the implementation.
//! The [`crate::registry::FunctionRegistry`] checks arguments against the
//! declaration before the implementation sees them.

use std::fmt;

use serde::Serialize;

use crate::error::{LuaFuncError, Result};
use crate::session::{ScriptSession, SessionConfig};
use crate::value::HostValue;

/// The type a parameter or result is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Bool,
    /// Any value; the implementation inspects it at runtime.
    Dynamic,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::String => f.write_str("string"),
            ParamType::Number => f.write_str("number"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Whether a null argument is passed through instead of rejected.
    pub allow_null: bool,
    /// Whether an unknown argument reaches the implementation. When false, the
    /// call returns an unknown result without running.
    pub allow_unknown: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, ty: ParamType) -> Self {
        Parameter {
            name: name.into(),
            description: description.into(),
            ty,
            allow_null: false,
            allow_unknown: false,
        }
    }

    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }
}

/// Implementation of a function, called with arguments that already match
/// the declared parameters.
pub type FunctionImpl = Box<dyn Fn(&[HostValue]) -> Result<HostValue> + Send + Sync>;

/// A callable function with its declared signature.
#[derive(Serialize)]
pub struct FunctionSpec {
    pub description: String,
    pub params: Vec<Parameter>,
    pub var_param: Option<Parameter>,
    pub return_type: ParamType,
    #[serde(skip)]
    pub implementation: FunctionImpl,
}

impl FunctionSpec {
    /// Render the signature as `name(a: string, rest...: dynamic) -> dynamic`.
    pub fn signature(&self, name: &str) -> String {
        let mut params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        if let Some(var) = &self.var_param {
            params.push(format!("{}...: {}", var.name, var.ty));
        }
        format!("{}({}) -> {}", name, params.join(", "), self.return_type)
    }

    /// Run the implementation directly, without argument validation.
    pub fn call(&self, args: &[HostValue]) -> Result<HostValue> {
        (self.implementation)(args)
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("description", &self.description)
            .field("params", &self.params)
            .field("var_param", &self.var_param)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// The `lua` function with the default session configuration.
pub fn lua_function() -> FunctionSpec {
    lua_function_with(SessionConfig::default())
}

/// The `lua` function: `lua(code, function, parameters...)`.
///
/// Loads `code` into a fresh Lua state, calls the global named `function` with
/// the remaining arguments, and returns its single result. Every call compiles
/// the code again.
pub fn lua_function_with(config: SessionConfig) -> FunctionSpec {
    FunctionSpec {
        description: "This function executes a lua main function with the given parameters"
            .to_string(),
        params: vec![
            Parameter::new("code", "Lua Code", ParamType::String),
            Parameter::new("function", "Lua function name", ParamType::String),
        ],
        var_param: Some(Parameter::new(
            "parameters",
            "Variable parameters passed into the main function",
            ParamType::Dynamic,
        )),
        return_type: ParamType::Dynamic,
        implementation: Box::new(move |args: &[HostValue]| run_lua(&config, args)),
    }
}

fn run_lua(config: &SessionConfig, args: &[HostValue]) -> Result<HostValue> {
    let (code, function, rest) = match args {
        [HostValue::String(code), HostValue::String(function), rest @ ..] => {
            (code, function, rest)
        }
        _ => {
            return Err(LuaFuncError::InvalidArguments(
                "lua expects code and function name strings first".to_string(),
            ))
        }
    };

    ScriptSession::load_with(code, config)?
        .bind(function.as_str())
        .invoke(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lua_signature() {
        assert_eq!(
            lua_function().signature("lua"),
            "lua(code: string, function: string, parameters...: dynamic) -> dynamic"
        );
    }

    #[test]
    fn signature_without_params() {
        let spec = FunctionSpec {
            description: "always true".to_string(),
            params: vec![],
            var_param: None,
            return_type: ParamType::Bool,
            implementation: Box::new(|_: &[HostValue]| Ok(HostValue::Bool(true))),
        };
        assert_eq!(spec.signature("yes"), "yes() -> bool");
        assert_eq!(spec.call(&[]).unwrap(), HostValue::Bool(true));
    }

    #[test]
    fn lua_rejects_missing_code() {
        let err = lua_function().call(&[HostValue::from(1)]).unwrap_err();
        assert!(matches!(err, LuaFuncError::InvalidArguments(_)));
    }
}
