//! Format-level behavior: syntax coverage, diagnostics and encoding rules.

use serde::Serialize;
use serde_ziggy::syntax::SyntaxTree;
use serde_ziggy::{
    parse, to_string, to_string_with_options, Error, Parser, TaggedLiteral, Value, ZiggyOptions,
};

#[test]
fn test_literals() {
    assert_eq!(parse("true").unwrap(), Value::Bool(true));
    assert_eq!(parse("null").unwrap(), Value::Null);
    assert_eq!(parse("-42").unwrap(), Value::from(-42));
    assert_eq!(parse("0o17").unwrap(), Value::from(15));
    assert_eq!(parse("0b1010").unwrap(), Value::from(10));
    assert_eq!(parse("1_000_000").unwrap(), Value::from(1_000_000));
    assert_eq!(parse("12.5e-1").unwrap(), Value::from(1.25));
    assert_eq!(parse("-0x1.8").unwrap(), Value::from(-1.08));
}

#[test]
fn test_huge_exponents_saturate() {
    assert_eq!(parse("0x1p99999999999").unwrap(), parse("1e99999999999").unwrap());
    assert_eq!(parse("0x1p99999999999").unwrap(), Value::from(f64::INFINITY));
    assert_eq!(parse("0x1p-99999999999").unwrap(), Value::from(0.0));
}

#[test]
fn test_byte_escapes_above_ascii_are_kept() {
    assert_eq!(parse(r#""\xff\x41""#).unwrap(), Value::from("\\xffA"));
}

#[test]
fn test_strings() {
    assert_eq!(
        parse(r#""tab\there \"quoted\" \x41\u{1F600}""#).unwrap(),
        Value::from("tab\there \"quoted\" A\u{1F600}")
    );

    let multiline = "\\\\first line\n  \\\\  second line\n\\\\";
    assert_eq!(
        parse(multiline).unwrap(),
        Value::from("first line\n  second line\n")
    );
}

#[test]
fn test_comments_and_trailing_commas() {
    let text = "// header\n[\n    1, // one\n    2,\n]\n// trailer\n";
    assert_eq!(
        parse(text).unwrap(),
        Value::Array(vec![Value::from(1), Value::from(2)])
    );
}

#[test]
fn test_braces_decide_struct_or_map() {
    let map = parse(r#"{ "a": 1 }"#).unwrap();
    assert!(map.is_map());

    let unnamed = parse("{ .a = 1 }").unwrap();
    assert!(unnamed.is_map());

    let named = parse("Point { .x = 1 }").unwrap();
    assert!(named.is_struct());
    assert_eq!(named.struct_name(), Some("Point"));

    let empty_named = parse("Unit {}").unwrap();
    assert_eq!(empty_named.struct_name(), Some("Unit"));
    assert_eq!(empty_named.as_map().map(|m| m.len()), Some(0));
}

#[test]
fn test_tag_strings() {
    let text = r#"[@date("2025-10-25"), @color("red")]"#;
    assert_eq!(
        parse(text).unwrap(),
        Value::Array(vec![Value::from("2025-10-25"), Value::from("red")])
    );

    let parser = Parser::new()
        .preserve_tag("date")
        .literal("color", |payload| Ok(Value::from(payload.len() as u64)));
    assert_eq!(
        parser.parse(text).unwrap(),
        Value::Array(vec![
            Value::Tagged(TaggedLiteral::new("date", "2025-10-25")),
            Value::from(3u64),
        ])
    );
}

#[test]
fn test_error_message_layout() {
    let err = parse("[1, 2,\n  3 4]").unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    assert_eq!(
        err.to_string(),
        "Parse error:\nError at line 2, column 5:\n    3 4]\n      ^"
    );
}

#[test]
fn test_unclosed_container_reports_end() {
    let err = parse("{\n  \"a\": 1,\n").unwrap_err();
    let last = err.diagnostics().last().unwrap();
    assert_eq!(last.line, 3);
}

#[test]
fn test_error_nodes_in_syntax_tree() {
    let tree = SyntaxTree::parse("[1, ?, 3]");
    assert!(tree.has_errors());
    assert!(!SyntaxTree::parse("[1, 2, 3]").has_errors());
}

#[test]
fn test_default_deny_for_enums_with_data() {
    #[derive(Serialize)]
    enum Payload {
        Text(String),
    }

    let err = to_string(&Payload::Text("hi".to_string())).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));

    let options = ZiggyOptions::new().with_function("Payload", "payload", |v| {
        Ok(v.get("Text").and_then(Value::as_str).unwrap_or_default().to_string())
    });
    assert_eq!(
        to_string_with_options(&Payload::Text("hi".to_string()), options).unwrap(),
        r#"@payload("hi")"#
    );
}

#[test]
fn test_register_string_renders_plain() {
    #[derive(Serialize)]
    struct Secret {
        value: String,
    }

    let functions = serde_ziggy::SerializationFunctions::new()
        .register_string("Secret", |_| Ok("***".to_string()));
    let options = ZiggyOptions::new().with_functions(functions);
    assert_eq!(
        to_string_with_options(&vec![Secret { value: "pw".to_string() }], options).unwrap(),
        "[\n    \"***\",\n]"
    );
}

#[test]
fn test_fixed_string_layouts() {
    #[derive(Serialize)]
    struct Poem(&'static str);
    #[derive(Serialize)]
    struct Label(&'static str);
    #[derive(Serialize)]
    struct Page {
        poem: Poem,
        label: Label,
    }

    let functions = serde_ziggy::SerializationFunctions::new()
        .register_quoted("Poem", |v| Ok(v.as_str().unwrap_or_default().to_string()))
        .register_multiline("Label", |v| Ok(v.as_str().unwrap_or_default().to_string()));
    let options = ZiggyOptions::new().with_functions(functions.clone());
    let page = Page {
        poem: Poem("roses\nviolets"),
        label: Label("title"),
    };
    let text = to_string_with_options(&page, options).unwrap();
    assert_eq!(
        text,
        "{\n    .poem = \"roses\\nviolets\",\n    .label =\n    \\\\title\n    ,\n}"
    );
    let back = parse(&text).unwrap();
    assert_eq!(back.get("poem"), Some(&Value::from("roses\nviolets")));
    assert_eq!(back.get("label"), Some(&Value::from("title")));

    let options = ZiggyOptions::new().with_functions(functions);
    assert_eq!(
        to_string_with_options(&Label("bell\u{7}"), options).unwrap(),
        r#""bell\x07""#
    );
}

#[test]
fn test_custom_indent() {
    let options = ZiggyOptions::new().with_indent("  ");
    assert_eq!(
        to_string_with_options(&vec![vec![1]], options).unwrap(),
        "[\n  [\n    1,\n  ],\n]"
    );
}
