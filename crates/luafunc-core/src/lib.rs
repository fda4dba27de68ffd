//! # luafunc-core
//!
//! Call a named function in a Lua snippet with host values as arguments and
//! get a host value back.
//!
//! The interesting part is the value bridge. The host side has null, bools,
//! arbitrary-precision numbers, strings, lists and keyed maps. Lua has one
//! aggregate, the table, which is an array, a map or both. Host lists go into
//! Lua as 0-indexed tables; tables coming back are read as lists when their keys
//! form a dense run from 0 or 1 and as objects otherwise.
//!
//! ## Quick start
//!
//! ```rust
//! use luafunc_core::{FunctionRegistry, HostValue};
//! use serde_json::json;
//!
//! let registry = FunctionRegistry::with_defaults();
//! let code = "function main(t) return { t.a + t.b, t.a * t.b } end";
//! let result = registry
//!     .call(
//!         "lua",
//!         &[
//!             HostValue::from(code),
//!             HostValue::from("main"),
//!             HostValue::from(json!({"a": 3, "b": 4})),
//!         ],
//!     )
//!     .unwrap();
//! assert_eq!(result, HostValue::from(json!([7, 12])));
//! ```
//!
//! ## Modules
//!
//! - [`value`]: `HostValue` and `HostKind`, JSON interop
//! - [`bridge`]: host ↔ Lua value conversion
//! - [`session`]: single-use Lua state: load → bind → invoke
//! - [`function`]: declared signatures and the `lua` function
//! - [`registry`]: named functions, argument validation and coercion
//! - [`error`]: Error types

pub mod bridge;
pub mod error;
pub mod function;
pub mod registry;
pub mod session;
pub mod value;

pub use bridge::{host_to_script, script_to_host};
pub use error::LuaFuncError;
pub use function::{lua_function, lua_function_with, FunctionSpec, ParamType, Parameter};
pub use registry::FunctionRegistry;
pub use session::{BoundEntryPoint, ScriptSession, SessionConfig};
pub use value::{HostKind, HostValue};
