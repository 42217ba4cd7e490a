/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Brace blocks with string keys build maps. Any other expression goes through
/// [`to_value`](crate::to_value) and becomes `null` if it has no Ziggy representation.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::{ziggy, Value};
///
/// let book = ziggy!({
///     "title": "Ruy Blas",
///     "tags": ["drama", 1838],
///     "sequel": null
/// });
/// assert_eq!(book.get("title").and_then(Value::as_str), Some("Ruy Blas"));
/// ```
#[macro_export]
macro_rules! ziggy {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::ziggy!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::ZiggyMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ZiggyMap::new();
        $(
            map.insert($key.to_string(), $crate::ziggy!($value));
        )*
        $crate::Value::Map(map)
    }};

    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Number, TaggedLiteral, Value, ZiggyMap};

    #[test]
    fn test_ziggy_macro_primitives() {
        assert_eq!(ziggy!(null), Value::Null);
        assert_eq!(ziggy!(true), Value::Bool(true));
        assert_eq!(ziggy!(42), Value::Number(Number::Integer(42)));
        assert_eq!(ziggy!(3.5), Value::Number(Number::Float(3.5)));
        assert_eq!(ziggy!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_ziggy_macro_nesting() {
        let value = ziggy!({
            "list": [1, [true], {}],
            "name": "x",
        });
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["list", "name"]);
        assert_eq!(
            map.get("list"),
            Some(&Value::Array(vec![
                Value::from(1),
                Value::Array(vec![Value::Bool(true)]),
                Value::Map(ZiggyMap::new()),
            ]))
        );
    }

    #[test]
    fn test_ziggy_macro_expressions() {
        let uuid = TaggedLiteral::new("uuid", "abc");
        assert_eq!(ziggy!(uuid), Value::Tagged(TaggedLiteral::new("uuid", "abc")));
        assert_eq!(ziggy!(f64::NAN.is_nan()), Value::Bool(true));
    }
}
