use serde_ziggy::{to_string, ziggy, Number, Value, ZiggyMap};

#[test]
fn test_ziggy_macro_scalars() {
    assert_eq!(ziggy!(null), Value::Null);
    assert_eq!(ziggy!(false), Value::Bool(false));
    assert_eq!(ziggy!(-123), Value::Number(Number::Integer(-123)));
    assert_eq!(ziggy!(""), Value::String(String::new()));
}

#[test]
fn test_ziggy_macro_arrays() {
    assert_eq!(ziggy!([]), Value::Array(vec![]));
    assert_eq!(
        ziggy!([1, "two", null]),
        Value::Array(vec![Value::from(1), Value::from("two"), Value::Null])
    );
}

#[test]
fn test_ziggy_macro_maps_keep_order() {
    let value = ziggy!({
        "zeta": 1,
        "alpha": {"inner": [true, false]},
    });
    let map = value.as_map().unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

    let mut inner = ZiggyMap::new();
    inner.insert(
        "inner".to_string(),
        Value::Array(vec![Value::Bool(true), Value::Bool(false)]),
    );
    assert_eq!(map.get("alpha"), Some(&Value::Map(inner)));
}

#[test]
fn test_ziggy_macro_output_renders() {
    let value = ziggy!({"title": "Ruy Blas", "year": 1838});
    assert_eq!(
        to_string(&value).unwrap(),
        "{\n    \"title\": \"Ruy Blas\",\n    \"year\": 1838,\n}"
    );
}

#[test]
fn test_ziggy_macro_expression_fallback() {
    let items = vec![1u8, 2];
    assert_eq!(
        ziggy!(items),
        Value::Array(vec![Value::from(1u8), Value::from(2u8)])
    );
}
