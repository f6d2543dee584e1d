use crate::error::DeserializeError;
use crate::tag::TypeTag;

/// One row as sent by the engine: field name → tagged leaf.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_NAMESPACE: &str = "prisma";

/// Reserved sub-keys of a tagged leaf: `{ns}__type` and `{ns}__value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireKeys {
    type_key: String,
    value_key: String,
}

impl WireKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            type_key: format!("{namespace}__type"),
            value_key: format!("{namespace}__value"),
        }
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn value_key(&self) -> &str {
        &self.value_key
    }

    /// Split a leaf into its tag and (borrowed) raw value.
    ///
    /// A tag string outside [`TypeTag`] is kept as-is with `type_tag: None`.
    /// `field` is only used for error reporting.
    pub fn split<'v>(
        &self,
        field: &str,
        leaf: &'v serde_json::Value,
    ) -> Result<TaggedValue<'v>, DeserializeError> {
        let obj = leaf.as_object().ok_or_else(|| {
            DeserializeError::malformed(field, format!("expected an object, got {}", kind_of(leaf)))
        })?;

        let tag = obj
            .get(&self.type_key)
            .ok_or_else(|| DeserializeError::malformed(field, format!("missing '{}'", self.type_key)))?;
        let value = obj
            .get(&self.value_key)
            .ok_or_else(|| DeserializeError::malformed(field, format!("missing '{}'", self.value_key)))?;

        let tag = tag.as_str().ok_or_else(|| {
            DeserializeError::malformed(field, format!("'{}' must be a string, got {}", self.type_key, kind_of(tag)))
        })?;

        Ok(TaggedValue {
            tag,
            type_tag: tag.parse::<TypeTag>().ok(),
            value,
        })
    }

    /// Build a tagged leaf. Inverse of [`WireKeys::split`].
    pub fn wrap(&self, type_tag: TypeTag, value: serde_json::Value) -> serde_json::Value {
        let mut obj = serde_json::Map::with_capacity(2);
        obj.insert(self.type_key.clone(), serde_json::Value::String(type_tag.as_str().into()));
        obj.insert(self.value_key.clone(), value);
        serde_json::Value::Object(obj)
    }
}

impl Default for WireKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

/// A leaf split into tag and value. Borrows from the leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedValue<'a> {
    /// Tag string as sent.
    pub tag: &'a str,
    /// `None` for tags this crate does not know.
    pub type_tag: Option<TypeTag>,
    pub value: &'a serde_json::Value,
}

/// Parse the engine's JSON text (a list of row objects).
pub fn parse_result_set(text: &str) -> Result<Vec<RawRow>, DeserializeError> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_result_set_slice(bytes: &[u8]) -> Result<Vec<RawRow>, DeserializeError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_reads_namespaced_keys() {
        let keys = WireKeys::new("acme");
        let leaf = json!({"acme__type": "int", "acme__value": 7});
        let tagged = keys.split("n", &leaf).unwrap();
        assert_eq!(tagged.type_tag, Some(TypeTag::Int));
        assert_eq!(tagged.tag, "int");
        assert_eq!(tagged.value, &json!(7));
    }

    #[test]
    fn null_value_is_present() {
        let leaf = json!({"prisma__type": "null", "prisma__value": null});
        let tagged = WireKeys::default().split("x", &leaf).unwrap();
        assert_eq!(tagged.type_tag, Some(TypeTag::Null));
        assert!(tagged.value.is_null());
    }

    #[test]
    fn split_reports_missing_sub_keys() {
        let keys = WireKeys::default();

        let err = keys.split("id", &json!({"prisma__type": "int"})).unwrap_err();
        assert_eq!(err.to_string(), "malformed tagged value at 'id': missing 'prisma__value'");

        let err = keys.split("id", &json!({"prisma__value": 1})).unwrap_err();
        assert_eq!(err.to_string(), "malformed tagged value at 'id': missing 'prisma__type'");

        let err = keys.split("id", &json!(1)).unwrap_err();
        assert!(matches!(err, DeserializeError::MalformedTag { .. }));
    }

    #[test]
    fn split_rejects_non_string_tags() {
        let keys = WireKeys::default();
        let err = keys.split("f", &json!({"prisma__type": 3, "prisma__value": 1})).unwrap_err();
        assert_eq!(err.field(), Some("f"));
        assert!(matches!(err, DeserializeError::MalformedTag { .. }));
    }

    #[test]
    fn split_keeps_unrecognised_tags() {
        let leaf = json!({"prisma__type": "vector", "prisma__value": [1.0, 2.0]});
        let tagged = WireKeys::default().split("v", &leaf).unwrap();
        assert_eq!(tagged.tag, "vector");
        assert_eq!(tagged.type_tag, None);
        assert_eq!(tagged.value, &json!([1.0, 2.0]));
    }

    #[test]
    fn wrap_then_split() {
        let keys = WireKeys::default();
        let leaf = keys.wrap(TypeTag::Decimal, json!("1.50"));
        assert_eq!(leaf, json!({"prisma__type": "decimal", "prisma__value": "1.50"}));
    }

    #[test]
    fn parse_result_set_keeps_row_and_field_order() {
        let rows = parse_result_set(
            r#"[{"b": {"prisma__type": "int", "prisma__value": 1},
                 "a": {"prisma__type": "int", "prisma__value": 2}},
                {"c": {"prisma__type": "null", "prisma__value": null}}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), ["b", "a"]);
        assert!(rows[1].contains_key("c"));

        assert!(matches!(parse_result_set("{}"), Err(DeserializeError::Json(_))));
    }
}
