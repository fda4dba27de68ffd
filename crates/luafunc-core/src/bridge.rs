//! Value bridge between [`HostValue`] and Lua values.
//!
//! Host → Lua is lossless for every kind Lua can hold. Lua → host is a
//! reconstruction: Lua has a single table type, so a returned table is read
//! into a string-keyed map first and only then, if its keys prove to be a
//! dense run of integers, turned into a list.
//!
//! # List reconstruction
//!
//! The offset is `0` when the table has a `"0"` key and `1` otherwise, so both
//! tables built by [`host_to_script`] (0-based) and ordinary Lua sequences
//! (1-based) come back as lists:
//!
//! | Lua table               | Host value                  |
//! |-------------------------|-----------------------------|
//! | `{[0]="a", [1]="b"}`    | `["a", "b"]`                |
//! | `{"a", "b"}`            | `["a", "b"]`                |
//! | `{[1]=1, [2]=2, [5]=5}` | `{"1": 1, "2": 2, "5": 5}`  |
//! | `{}`                    | `[]`                        |

use std::collections::BTreeMap;

use mlua::{Lua, Table, Value};
use tracing::trace;

use crate::error::{LuaFuncError, Result};
use crate::value::HostValue;

/// How deep [`script_to_host`] follows nested tables before giving up.
pub const MAX_TABLE_DEPTH: usize = 128;

/// Convert a host value into a Lua value owned by `lua`.
///
/// Lists, sets and tuples become tables keyed by their 0-based index. Maps and
/// objects become tables keyed by their string keys. `Null` and `Unknown`
/// cannot be stored in a Lua table and are rejected.
pub fn host_to_script(lua: &Lua, value: &HostValue) -> Result<Value> {
    match value {
        HostValue::Bool(b) => Ok(Value::Boolean(*b)),
        HostValue::Number(n) => {
            let f = n.as_f64().filter(|f| f.is_finite()).ok_or_else(|| {
                LuaFuncError::NumericConversion(format!(
                    "{n} cannot be represented as a 64-bit float"
                ))
            })?;
            Ok(Value::Number(f))
        }
        HostValue::String(s) => Ok(Value::String(lua.create_string(s)?)),
        HostValue::Map(entries) | HostValue::Object(entries) => {
            let table = lua.create_table()?;
            for (key, item) in entries {
                table.raw_set(key.as_str(), host_to_script(lua, item)?)?;
            }
            trace!(kind = %value.kind(), entries = entries.len(), "built keyed table");
            Ok(Value::Table(table))
        }
        HostValue::List(items) | HostValue::Set(items) | HostValue::Tuple(items) => {
            let table = lua.create_table()?;
            for (index, item) in items.iter().enumerate() {
                table.raw_set(index as i64, host_to_script(lua, item)?)?;
            }
            trace!(kind = %value.kind(), items = items.len(), "built indexed table");
            Ok(Value::Table(table))
        }
        HostValue::Null | HostValue::Unknown => Err(LuaFuncError::UnsupportedType(value.kind())),
    }
}

/// Convert a Lua value back into a host value.
///
/// Floats are taken as they are, except that NaN and infinities (such as
/// `math.huge`) fail with [`LuaFuncError::NumericConversion`] because host
/// numbers are finite decimals.
pub fn script_to_host(lua: &Lua, value: Value) -> Result<HostValue> {
    to_host(lua, value, 0)
}

fn to_host(lua: &Lua, value: Value, depth: usize) -> Result<HostValue> {
    match value {
        Value::Nil => Ok(HostValue::Null),
        Value::Boolean(b) => Ok(HostValue::Bool(b)),
        Value::Integer(i) => Ok(HostValue::from(i)),
        Value::Number(f) => float_to_host(f),
        Value::String(s) => Ok(HostValue::String(String::from(s.to_string_lossy()))),
        Value::Table(table) => table_to_host(lua, table, depth),
        other => Err(LuaFuncError::UnsupportedReturnType(
            other.type_name().to_string(),
        )),
    }
}

fn float_to_host(f: f64) -> Result<HostValue> {
    HostValue::from_f64(f)
        .ok_or_else(|| LuaFuncError::NumericConversion(format!("{f} is not a finite number")))
}

fn table_to_host(lua: &Lua, table: Table, depth: usize) -> Result<HostValue> {
    if depth >= MAX_TABLE_DEPTH {
        return Err(LuaFuncError::NestingTooDeep(MAX_TABLE_DEPTH));
    }

    let mut entries = BTreeMap::new();
    for pair in table.pairs::<Value, Value>() {
        let (key, item) = pair?;
        let key_type = key.type_name();
        let key = match lua.coerce_string(key)? {
            Some(s) => String::from(s.to_string_lossy()),
            None => return Err(LuaFuncError::BadTableKey(key_type.to_string())),
        };
        let item = to_host(lua, item, depth + 1)?;
        entries.insert(key, item);
    }

    Ok(reconstruct_list(entries))
}

/// Turn a string-keyed map into a list if its keys are exactly
/// `offset..offset + len`, otherwise return it as an object.
pub fn reconstruct_list(mut entries: BTreeMap<String, HostValue>) -> HostValue {
    let offset = if entries.contains_key("0") { 0 } else { 1 };
    let len = entries.len();

    let mut items = Vec::with_capacity(len);
    for i in offset..offset + len {
        match entries.remove(&i.to_string()) {
            Some(item) => items.push(item),
            None => {
                for (position, item) in items.into_iter().enumerate() {
                    entries.insert((offset + position).to_string(), item);
                }
                trace!(keys = len, missing = i, "table is not a coherent list");
                return HostValue::Object(entries);
            }
        }
    }

    trace!(items = len, offset, "table reconstructed as list");
    HostValue::List(items)
}
