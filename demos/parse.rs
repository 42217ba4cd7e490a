//! Decoding a document, first as a dynamic value, then into a typed struct.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_ziggy::literal::{self, date_converter};
use serde_ziggy::{parse, Parser};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Message {
    sender: String,
    content: String,
    #[serde(with = "literal::date")]
    timestamp: NaiveDateTime,
}

const DATA: &str = r#"Message {
    .sender = "Allocgator",
    .content = "Hello World!",
    .timestamp = @date("2025-10-25T11:34")
}
"#;

fn main() -> serde_ziggy::Result<()> {
    println!("Without registrations, `Message` is a generic struct value:");
    println!("{:#?}", parse(DATA)?);
    println!();

    let parser = Parser::new().literal(literal::DATE_TAG, date_converter);
    println!("With a date converter, the same document decodes into `Message`:");
    let message: Message = parser.parse_as(DATA)?;
    println!("{:#?}", message);

    match parse("{\n    \"a\": 1,\n    \"b\" 2,\n}") {
        Ok(_) => {}
        Err(err) => {
            println!();
            println!("{}", err);
        }
    }
    Ok(())
}
