//! Function registry: advertises functions and validates calls against their
//! declared signatures.
//!
//! Validation happens before an implementation runs:
//!
//! - argument count must match the fixed parameters, plus any number of
//!   variadic arguments if the function declares a tail;
//! - null is rejected unless the parameter allows it;
//! - an argument containing an unknown value short-circuits the call to an
//!   unknown result unless the parameter allows unknowns;
//! - arguments are coerced to the declared type (`"3"` → `3` for a number
//!   parameter, `true` → `"true"` for a string parameter).

use std::collections::BTreeMap;

use serde_json::Number;
use tracing::debug;

use crate::error::{LuaFuncError, Result};
use crate::function::{lua_function_with, FunctionSpec, ParamType, Parameter};
use crate::session::SessionConfig;
use crate::value::HostValue;

/// Named functions with their signatures.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, FunctionSpec>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the `lua` function.
    pub fn with_defaults() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// A registry holding the `lua` function, creating sessions with `config`.
    pub fn with_config(config: SessionConfig) -> Self {
        let mut registry = Self::new();
        registry.add_function("lua", lua_function_with(config));
        registry
    }

    /// Register `spec` under `name`, returning any function it replaces.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        spec: FunctionSpec,
    ) -> Option<FunctionSpec> {
        self.functions.insert(name.into(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionSpec)> {
        self.functions.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Validate `args` against the function's signature and run it.
    pub fn call(&self, name: &str, args: &[HostValue]) -> Result<HostValue> {
        let spec = self
            .get(name)
            .ok_or_else(|| LuaFuncError::UnknownFunction(name.to_string()))?;

        let Some(args) = check_arguments(name, spec, args)? else {
            debug!(function = name, "unknown argument, returning unknown result");
            return Ok(HostValue::Unknown);
        };

        debug!(function = name, args = args.len(), "calling function");
        spec.call(&args)
    }
}

/// Coerce `args` to the declared parameters. `Ok(None)` means an unknown
/// argument short-circuits the call.
fn check_arguments(
    name: &str,
    spec: &FunctionSpec,
    args: &[HostValue],
) -> Result<Option<Vec<HostValue>>> {
    let fixed = spec.params.len();
    if args.len() < fixed {
        return Err(LuaFuncError::InvalidArguments(format!(
            "{name} expects at least {fixed} arguments, got {}",
            args.len()
        )));
    }

    let mut coerced = Vec::with_capacity(args.len());
    let mut short_circuit = false;
    for (index, arg) in args.iter().enumerate() {
        let param = spec
            .params
            .get(index)
            .or(spec.var_param.as_ref())
            .ok_or_else(|| {
                LuaFuncError::InvalidArguments(format!(
                    "{name} expects {fixed} arguments, got {}",
                    args.len()
                ))
            })?;

        if arg.is_null() && !param.allow_null {
            return Err(LuaFuncError::InvalidArguments(format!(
                "argument '{}' of {name} must not be null",
                param.name
            )));
        }
        if arg.contains_unknown() && !param.allow_unknown {
            short_circuit = true;
            continue;
        }
        coerced.push(coerce(param, arg)?);
    }

    Ok(if short_circuit { None } else { Some(coerced) })
}

fn coerce(param: &Parameter, value: &HostValue) -> Result<HostValue> {
    let converted = match (param.ty, value) {
        (_, HostValue::Null) | (ParamType::Dynamic, _) => Some(value.clone()),
        (ParamType::String, HostValue::String(_)) => Some(value.clone()),
        (ParamType::String, HostValue::Number(n)) => Some(HostValue::String(n.to_string())),
        (ParamType::String, HostValue::Bool(b)) => Some(HostValue::String(b.to_string())),
        (ParamType::Number, HostValue::Number(_)) => Some(value.clone()),
        (ParamType::Number, HostValue::String(s)) => {
            s.parse::<Number>().ok().map(HostValue::Number)
        }
        (ParamType::Bool, HostValue::Bool(_)) => Some(value.clone()),
        (ParamType::Bool, HostValue::String(s)) => match s.as_str() {
            "true" => Some(HostValue::Bool(true)),
            "false" => Some(HostValue::Bool(false)),
            _ => None,
        },
        _ => None,
    };

    converted.ok_or_else(|| {
        LuaFuncError::InvalidArguments(format!(
            "argument '{}' must be {}, got {}",
            param.name,
            param.ty,
            value.kind()
        ))
    })
}
