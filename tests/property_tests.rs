//! Property-based tests for the round trip from text to values and back.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_ziggy::{from_str, parse, to_string, Value, ZiggyMap};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1e12f64..1e12).prop_map(Value::from),
        "[a-zA-Z0-9 _'\"\\\\\t\n-]{0,24}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z_][a-z0-9_]{0,8}", inner), 0..6).prop_map(|entries| {
                Value::Map(entries.into_iter().collect::<ZiggyMap>())
            }),
        ]
    })
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    id: u64,
    label: String,
    score: f64,
    flags: Vec<bool>,
    parent: Option<i32>,
}

proptest! {
    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i128(n in any::<i128>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_f64(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        prop_assert!(roundtrip(&f));
    }

    #[test]
    fn prop_string(s in any::<String>()) {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_record(
        id in any::<u64>(),
        label in ".{0,32}",
        score in -1e6f64..1e6,
        flags in prop::collection::vec(any::<bool>(), 0..8),
        parent in any::<Option<i32>>(),
    ) {
        let record = Record { id, label, score, flags, parent };
        prop_assert!(roundtrip(&record));
    }

    #[test]
    fn prop_value_survives_text(value in arb_value()) {
        let text = to_string(&value).unwrap();
        let parsed = parse(&text).unwrap();
        prop_assert_eq!(parsed, value);
    }

    #[test]
    fn prop_parse_never_panics(source in "[\\[\\]{}.=,:@()\"a-z0-9 \n\\\\-]{0,64}") {
        let _ = parse(&source);
    }
}
