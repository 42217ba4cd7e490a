//! Encoding mixed data with type names, tab indentation and tagged literals.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_ziggy::{literal, to_string_with_options, ZiggyOptions};
use std::collections::BTreeMap;

#[derive(Serialize)]
struct Data {
    foo: (bool, &'static str, i32),
    bar: f64,
}

#[derive(Serialize)]
enum Action {
    Send,
    #[allow(dead_code)]
    Clear,
}

#[derive(Serialize)]
struct Stamp(NaiveDateTime);

#[derive(Serialize)]
struct Event {
    command: Action,
    datetime: Stamp,
}

fn main() -> serde_ziggy::Result<()> {
    let datetime = literal::parse_datetime("2024-11-27T22:32:25")?;

    let mut map = BTreeMap::new();
    map.insert("a", serde_json::json!("OK\"you\" lucky \n\tboy's"));
    map.insert("b", serde_json::json!([true, false, null, 1]));

    let document = (
        1,
        2,
        Event {
            command: Action::Send,
            datetime: Stamp(datetime),
        },
        map,
        Data {
            foo: (true, "A", 1),
            bar: 3.25,
        },
    );

    let options = ZiggyOptions::new()
        .with_indent("\t")
        .with_type_name(true)
        .with_function("Action", "user_action", |v| {
            Ok(v.as_str().unwrap_or_default().to_lowercase())
        })
        .with_function("Stamp", "timestamp", |v| {
            Ok(v.as_str().unwrap_or_default().replace('T', " "))
        });

    println!("{}", to_string_with_options(&document, options)?);
    Ok(())
}
