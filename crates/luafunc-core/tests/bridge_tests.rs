use luafunc_core::{host_to_script, script_to_host, HostKind, HostValue, LuaFuncError};
use mlua::{Lua, Value};
use serde_json::json;

/// Evaluate a Lua expression chunk and convert the result to a host value.
fn eval(lua: &Lua, chunk: &str) -> luafunc_core::error::Result<HostValue> {
    let value: Value = lua.load(chunk).eval().expect("chunk should evaluate");
    script_to_host(lua, value)
}

/// Assert that host → Lua → host gives back `host` unchanged.
fn assert_roundtrip(host: HostValue) {
    let lua = Lua::new();
    let script = host_to_script(&lua, &host).expect("host_to_script failed");
    let back = script_to_host(&lua, script).expect("script_to_host failed");
    assert_eq!(host, back, "Roundtrip failed for {host:?}");
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn roundtrip_bool() {
    assert_roundtrip(HostValue::Bool(true));
    assert_roundtrip(HostValue::Bool(false));
}

#[test]
fn roundtrip_string() {
    assert_roundtrip(HostValue::from("hello"));
    assert_roundtrip(HostValue::from(""));
    assert_roundtrip(HostValue::from("caf\u{00e9} \u{4f60}\u{597d}"));
}

#[test]
fn roundtrip_numbers() {
    assert_roundtrip(HostValue::from(42));
    assert_roundtrip(HostValue::from(-7));
    assert_roundtrip(HostValue::from(0));
    assert_roundtrip(HostValue::from_f64(3.25).unwrap());
    assert_roundtrip(HostValue::from_f64(-0.001).unwrap());
}

#[test]
fn numbers_cross_as_floats() {
    let lua = Lua::new();
    let script = host_to_script(&lua, &HostValue::from(3)).unwrap();
    assert!(matches!(script, Value::Number(f) if f == 3.0));
}

#[test]
fn number_too_large_for_f64_fails() {
    let big: serde_json::Value = serde_json::from_str("1e400").unwrap();
    let lua = Lua::new();
    let err = host_to_script(&lua, &HostValue::from(big)).unwrap_err();
    assert!(
        matches!(err, LuaFuncError::NumericConversion(_)),
        "unexpected error: {err}"
    );
}

#[test]
fn lua_nil_is_null() {
    let lua = Lua::new();
    assert_eq!(eval(&lua, "return nil").unwrap(), HostValue::Null);
}

#[test]
fn lua_integer_and_float_results() {
    let lua = Lua::new();
    assert_eq!(eval(&lua, "return 7").unwrap(), HostValue::from(7));
    assert_eq!(eval(&lua, "return 3.0 + 4.0").unwrap(), HostValue::from(7));
    assert_eq!(eval(&lua, "return 1 / 4").unwrap(), HostValue::from_f64(0.25).unwrap());
}

#[test]
fn lua_non_finite_result_fails() {
    let lua = Lua::new();
    assert!(matches!(
        eval(&lua, "return 1 / 0"),
        Err(LuaFuncError::NumericConversion(_))
    ));
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn host_list_becomes_zero_indexed_table() {
    let lua = Lua::new();
    let host = HostValue::from(json!(["a", "b", "c"]));
    let Value::Table(table) = host_to_script(&lua, &host).unwrap() else {
        panic!("expected a table");
    };
    assert_eq!(table.get::<String>(0).unwrap(), "a");
    assert_eq!(table.get::<String>(1).unwrap(), "b");
    assert_eq!(table.get::<String>(2).unwrap(), "c");
    assert!(table.get::<Value>(3).unwrap().is_nil());
}

#[test]
fn roundtrip_list() {
    assert_roundtrip(HostValue::from(json!(["a", "b", "c"])));
    assert_roundtrip(HostValue::from(json!([1, 2.5, true, "x"])));
    assert_roundtrip(HostValue::from(json!([[1, 2], [3, 4]])));
}

#[test]
fn roundtrip_long_list_keeps_order() {
    let items: Vec<HostValue> = (0..25).map(HostValue::from).collect();
    assert_roundtrip(HostValue::List(items));
}

#[test]
fn set_and_tuple_come_back_as_lists() {
    let lua = Lua::new();
    for host in [
        HostValue::Set(vec!["x".into(), "y".into()]),
        HostValue::Tuple(vec!["x".into(), "y".into()]),
    ] {
        let script = host_to_script(&lua, &host).unwrap();
        assert_eq!(
            script_to_host(&lua, script).unwrap(),
            HostValue::from(json!(["x", "y"]))
        );
    }
}

#[test]
fn lua_sequence_is_list() {
    let lua = Lua::new();
    assert_eq!(
        eval(&lua, "return {10, 20, 30}").unwrap(),
        HostValue::from(json!([10, 20, 30]))
    );
}

#[test]
fn lua_zero_based_table_is_list() {
    let lua = Lua::new();
    assert_eq!(
        eval(&lua, "return {[0] = 'a', [1] = 'b', [2] = 'c'}").unwrap(),
        HostValue::from(json!(["a", "b", "c"]))
    );
}

#[test]
fn string_and_integer_keys_are_interchangeable() {
    let lua = Lua::new();
    assert_eq!(
        eval(&lua, "return {'a', ['2'] = 'b'}").unwrap(),
        HostValue::from(json!(["a", "b"]))
    );
}

#[test]
fn empty_table_is_empty_list() {
    let lua = Lua::new();
    assert_eq!(eval(&lua, "return {}").unwrap(), HostValue::List(vec![]));
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn sparse_table_is_object() {
    let lua = Lua::new();
    assert_eq!(
        eval(&lua, "return {[1] = 'a', [2] = 'b', [5] = 'e'}").unwrap(),
        HostValue::from(json!({"1": "a", "2": "b", "5": "e"}))
    );
}

#[test]
fn mixed_table_is_object() {
    let lua = Lua::new();
    assert_eq!(
        eval(&lua, "return {'a', 'b', x = 'c'}").unwrap(),
        HostValue::from(json!({"1": "a", "2": "b", "x": "c"}))
    );
}

#[test]
fn float_keys_are_stringified_by_lua() {
    let lua = Lua::new();
    assert_eq!(
        eval(&lua, "return {[1.5] = 'x'}").unwrap(),
        HostValue::from(json!({"1.5": "x"}))
    );
}

#[test]
fn roundtrip_object() {
    assert_roundtrip(HostValue::from(json!({"a": 1, "b": 2})));
    assert_roundtrip(HostValue::from(json!({
        "name": "Alice",
        "active": true,
        "tags": ["x", "y"],
        "address": {"city": "Paris", "zip": "75001"}
    })));
}

#[test]
fn map_comes_back_as_object() {
    let lua = Lua::new();
    let host = HostValue::Map([("k".to_string(), HostValue::from(1))].into());
    let script = host_to_script(&lua, &host).unwrap();
    assert_eq!(
        script_to_host(&lua, script).unwrap(),
        HostValue::object([("k", HostValue::from(1))])
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unknown_is_unsupported() {
    let lua = Lua::new();
    let err = host_to_script(&lua, &HostValue::Unknown).unwrap_err();
    assert!(matches!(err, LuaFuncError::UnsupportedType(HostKind::Unknown)));
}

#[test]
fn nested_unsupported_value_aborts_whole_conversion() {
    let lua = Lua::new();
    let host = HostValue::object([
        ("ok", HostValue::from(1)),
        ("bad", HostValue::List(vec![HostValue::from(2), HostValue::Unknown])),
    ]);
    let err = host_to_script(&lua, &host).unwrap_err();
    assert!(matches!(err, LuaFuncError::UnsupportedType(HostKind::Unknown)));
}

#[test]
fn nested_null_is_unsupported() {
    let lua = Lua::new();
    let err = host_to_script(&lua, &HostValue::from(json!([1, null]))).unwrap_err();
    assert!(matches!(err, LuaFuncError::UnsupportedType(HostKind::Null)));
}

#[test]
fn boolean_key_is_bad_table_key() {
    let lua = Lua::new();
    let err = eval(&lua, "return {[true] = 1}").unwrap_err();
    assert!(matches!(err, LuaFuncError::BadTableKey(ref t) if t == "boolean"));
}

#[test]
fn table_key_is_bad_table_key() {
    let lua = Lua::new();
    let err = eval(&lua, "return {[{}] = 1}").unwrap_err();
    assert!(matches!(err, LuaFuncError::BadTableKey(ref t) if t == "table"));
}

#[test]
fn function_result_is_unsupported() {
    let lua = Lua::new();
    let err = eval(&lua, "return print").unwrap_err();
    assert!(matches!(err, LuaFuncError::UnsupportedReturnType(ref t) if t == "function"));
}

#[test]
fn nested_function_is_unsupported() {
    let lua = Lua::new();
    let err = eval(&lua, "return {f = function() end}").unwrap_err();
    assert!(matches!(err, LuaFuncError::UnsupportedReturnType(_)));
}

#[test]
fn self_referencing_table_fails() {
    let lua = Lua::new();
    let err = eval(&lua, "local t = {} t.me = t return t").unwrap_err();
    assert!(matches!(err, LuaFuncError::NestingTooDeep(_)));
}
