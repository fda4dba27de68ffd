//! Single-use Lua sessions.
//!
//! A session owns one fresh `mlua::Lua` state and moves through
//! load → bind → invoke, each step consuming the previous one:
//!
//! ```
//! use luafunc_core::{HostValue, ScriptSession};
//!
//! let result = ScriptSession::load("function main(a, b) return a + b end")
//!     .unwrap()
//!     .bind("main")
//!     .invoke(&[HostValue::from(3), HostValue::from(4)])
//!     .unwrap();
//! assert_eq!(result, HostValue::from(7));
//! ```
//!
//! Nothing is shared between sessions, so concurrent callers each build their
//! own state and no locking is needed.

use mlua::{Lua, MultiValue, Value};
use tracing::debug;

use crate::bridge::{host_to_script, script_to_host};
use crate::error::{LuaFuncError, Result};
use crate::value::HostValue;

/// Calls its first argument with the rest, returning every result.
const CALL_TRAMPOLINE: &str = "local f = ...\nreturn f(select(2, ...))";

/// Settings applied to each new Lua state.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cap on the bytes the Lua state may allocate. `None` means unlimited.
    pub memory_limit: Option<usize>,
    /// Chunk name shown in Lua error messages.
    pub chunk_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            memory_limit: None,
            chunk_name: "code".to_string(),
        }
    }
}

/// A Lua state with a snippet loaded into its globals.
pub struct ScriptSession {
    lua: Lua,
}

impl ScriptSession {
    /// Load `code` into a fresh Lua state with the default configuration.
    pub fn load(code: &str) -> Result<Self> {
        Self::load_with(code, &SessionConfig::default())
    }

    /// Load `code` into a fresh Lua state.
    ///
    /// The snippet is compiled and executed once, which is where it defines
    /// its global functions. Compile errors and errors raised at the top
    /// level are both reported as [`LuaFuncError::EngineLoad`].
    pub fn load_with(code: &str, config: &SessionConfig) -> Result<Self> {
        let lua = Lua::new();
        if let Some(limit) = config.memory_limit {
            lua.set_memory_limit(limit)
                .map_err(LuaFuncError::EngineLoad)?;
        }

        lua.load(code)
            .set_name(config.chunk_name.as_str())
            .exec()
            .map_err(LuaFuncError::EngineLoad)?;

        debug!(
            chunk = %config.chunk_name,
            bytes = code.len(),
            memory_limit = ?config.memory_limit,
            "lua code loaded"
        );
        Ok(ScriptSession { lua })
    }

    /// Select the global to call. Whether it exists is only checked by
    /// [`BoundEntryPoint::invoke`].
    pub fn bind(self, entry_point: impl Into<String>) -> BoundEntryPoint {
        BoundEntryPoint {
            lua: self.lua,
            entry_point: entry_point.into(),
        }
    }
}

/// A loaded session with a chosen entry point, ready to be called once.
pub struct BoundEntryPoint {
    lua: Lua,
    entry_point: String,
}

impl BoundEntryPoint {
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Call the entry point with `args` and convert its first return value.
    ///
    /// Arguments are converted in order before the call. Extra return values
    /// are discarded; no return value at all is
    /// [`LuaFuncError::MissingReturnValue`].
    pub fn invoke(self, args: &[HostValue]) -> Result<HostValue> {
        let script_args = args
            .iter()
            .map(|arg| host_to_script(&self.lua, arg))
            .collect::<Result<Vec<_>>>()?;

        let call_error = |source| LuaFuncError::EngineCall {
            entry_point: self.entry_point.clone(),
            source,
        };

        // Lua performs the call: `__call` tables are callable and failures
        // carry the engine's own message.
        let entry = self
            .lua
            .globals()
            .get::<Value>(self.entry_point.as_str())
            .map_err(call_error)?;
        let trampoline = self
            .lua
            .load(CALL_TRAMPOLINE)
            .set_name("=entry point")
            .into_function()
            .map_err(call_error)?;

        let mut call_args = Vec::with_capacity(script_args.len() + 1);
        call_args.push(entry);
        call_args.extend(script_args);

        debug!(entry_point = %self.entry_point, args = args.len(), "invoking lua entry point");
        let results = trampoline
            .call::<MultiValue>(MultiValue::from_vec(call_args))
            .map_err(call_error)?;
        debug!(entry_point = %self.entry_point, returned = results.len(), "lua entry point returned");

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| LuaFuncError::MissingReturnValue {
                entry_point: self.entry_point.clone(),
            })?;
        script_to_host(&self.lua, first)
    }
}
