use std::io::Read;

use raw_results::{ResultDeserializer, parse_result_set};

use crate::config::DecodeArgs;
use crate::error::CliError;

pub fn run(args: &DecodeArgs) -> Result<(), CliError> {
    let text = read_input(&args.input)?;
    let out = decode_text(&text, args.raw, &args.namespace)?;
    println!("{out}");
    Ok(())
}

fn read_input(input: &str) -> Result<String, CliError> {
    let result = if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(input)
    };
    result.map_err(|source| CliError::Input {
        path: input.to_string(),
        source,
    })
}

/// Decode a JSON array of tagged rows into pretty-printed plain JSON.
pub fn decode_text(text: &str, raw: bool, namespace: &str) -> Result<String, CliError> {
    let rows = parse_result_set(text)?;
    let deserializer = if raw {
        ResultDeserializer::raw()
    } else {
        ResultDeserializer::default()
    }
    .with_namespace(namespace);

    let records = deserializer.deserialize_result_set(&rows)?;
    tracing::debug!(rows = records.len(), raw, "decoded result set");
    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ROWS: &str = r#"[
        {
            "id": {"prisma__type": "bigint", "prisma__value": "123456789012345678901234567890"},
            "price": {"prisma__type": "decimal", "prisma__value": "10.005"},
            "tags": {"prisma__type": "array", "prisma__value": [
                {"prisma__type": "string", "prisma__value": "a"},
                {"prisma__type": "int", "prisma__value": 2}
            ]}
        }
    ]"#;

    fn parse(out: &str) -> serde_json::Value {
        serde_json::from_str(out).unwrap()
    }

    #[test]
    fn typed_decode() {
        let out = decode_text(ROWS, false, "prisma").unwrap();
        assert_eq!(
            parse(&out),
            json!([{"id": "123456789012345678901234567890", "price": "10.005", "tags": ["a", 2]}])
        );
    }

    #[test]
    fn raw_decode_only_unwraps_arrays() {
        let rows = r#"[{"n": {"prisma__type": "bigint", "prisma__value": "42"},
                        "xs": {"prisma__type": "array", "prisma__value": [{"prisma__type": "int", "prisma__value": 1}]}}]"#;
        let out = decode_text(rows, true, "prisma").unwrap();
        assert_eq!(parse(&out), json!([{"n": "42", "xs": [1]}]));
    }

    #[test]
    fn field_order_is_kept() {
        let out = decode_text(ROWS, false, "prisma").unwrap();
        let id = out.find("\"id\"").unwrap();
        let price = out.find("\"price\"").unwrap();
        let tags = out.find("\"tags\"").unwrap();
        assert!(id < price && price < tags);
    }

    #[test]
    fn custom_namespace() {
        let rows = r#"[{"n": {"app__type": "bigint", "app__value": "7"}}]"#;
        assert_eq!(parse(&decode_text(rows, false, "app").unwrap()), json!([{"n": 7}]));
        assert!(matches!(decode_text(rows, false, "prisma"), Err(CliError::Deserialize(_))));
    }

    #[test]
    fn missing_input_file() {
        let err = read_input("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().starts_with("read '/definitely/not/here.json'"));
    }
}
