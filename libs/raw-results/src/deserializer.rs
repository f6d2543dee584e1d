use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;

use crate::convert;
use crate::error::{DeserializeError, ModelError};
use crate::record::Record;
use crate::tag::TypeTag;
use crate::value::Value;
use crate::wire::{RawRow, WireKeys};

/// Arrays nested deeper than this are rejected as malformed.
pub const MAX_ARRAY_DEPTH: usize = 128;

/// Converter for one tag: raw wire value → native value.
pub type Deserializer = fn(&Context<'_>, &serde_json::Value) -> Result<Value, DeserializeError>;

// ════════════════════════════════════════════════════════════════
//  Dispatch table
// ════════════════════════════════════════════════════════════════

/// Tag → converter lookup. Tags without an entry are passed through as-is.
#[derive(Clone, Default)]
pub struct Deserializers {
    converters: HashMap<TypeTag, Deserializer>,
}

impl Deserializers {
    /// No converters: every tag passes through, arrays included.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Full conversion to native types.
    pub fn builtin() -> Self {
        Self::empty()
            .with(TypeTag::BigInt, convert::deserialize_bigint)
            .with(TypeTag::Bytes, convert::deserialize_bytes)
            .with(TypeTag::Decimal, convert::deserialize_decimal)
            .with(TypeTag::DateTime, convert::deserialize_datetime)
            .with(TypeTag::Date, convert::deserialize_date)
            .with(TypeTag::Time, convert::deserialize_time)
            .with(TypeTag::Array, convert::deserialize_array)
            .with(TypeTag::Json, convert::deserialize_json)
    }

    /// Array unwrapping only; every other tag keeps its wire value.
    pub fn raw() -> Self {
        Self::empty().with(TypeTag::Array, convert::deserialize_array)
    }

    pub fn with(mut self, tag: TypeTag, converter: Deserializer) -> Self {
        self.insert(tag, converter);
        self
    }

    /// Register (or replace) the converter for `tag`.
    pub fn insert(&mut self, tag: TypeTag, converter: Deserializer) -> Option<Deserializer> {
        self.converters.insert(tag, converter)
    }

    pub fn remove(&mut self, tag: TypeTag) -> Option<Deserializer> {
        self.converters.remove(&tag)
    }

    pub fn get(&self, tag: TypeTag) -> Option<Deserializer> {
        self.converters.get(&tag).copied()
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.converters.contains_key(&tag)
    }
}

impl fmt::Debug for Deserializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.converters.keys().map(TypeTag::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("Deserializers").field("tags", &tags).finish()
    }
}

// ════════════════════════════════════════════════════════════════
//  Conversion context
// ════════════════════════════════════════════════════════════════

/// State threaded through one field's conversion, including array recursion.
pub struct Context<'a> {
    table: &'a Deserializers,
    keys: &'a WireKeys,
    field: Cow<'a, str>,
    for_model: bool,
    depth: usize,
}

impl<'a> Context<'a> {
    fn new(table: &'a Deserializers, keys: &'a WireKeys, field: &'a str, for_model: bool) -> Self {
        Self {
            table,
            keys,
            field: Cow::Borrowed(field),
            for_model,
            depth: 0,
        }
    }

    /// Path of the value being converted: `name`, `name[0]`, `name[0][2]`...
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the output is headed for a model constructor.
    pub fn for_model(&self) -> bool {
        self.for_model
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Convert one tagged leaf through the table. Tags without a converter,
    /// including ones this crate does not know, keep their wire value.
    pub fn deserialize(&self, leaf: &serde_json::Value) -> Result<Value, DeserializeError> {
        let tagged = self.keys.split(&self.field, leaf)?;
        match tagged.type_tag.and_then(|tag| self.table.get(tag)) {
            Some(converter) => converter(self, tagged.value),
            None => {
                if tagged.type_tag.is_none() {
                    tracing::trace!(field = %self.field, tag = tagged.tag, "unrecognised tag passed through");
                }
                Ok(Value::Json(tagged.value.clone()))
            }
        }
    }

    /// Context for the `index`-th element of the array being converted.
    pub fn element(&self, index: usize) -> Result<Context<'_>, DeserializeError> {
        if self.depth >= MAX_ARRAY_DEPTH {
            return Err(DeserializeError::malformed(
                &self.field,
                format!("arrays nested deeper than {MAX_ARRAY_DEPTH} levels"),
            ));
        }
        Ok(Context {
            table: self.table,
            keys: self.keys,
            field: Cow::Owned(format!("{}[{index}]", self.field)),
            for_model: self.for_model,
            depth: self.depth + 1,
        })
    }

    /// Conversion failure for the current field.
    pub fn conversion(&self, tag: TypeTag, value: &serde_json::Value, reason: impl Into<String>) -> DeserializeError {
        DeserializeError::Conversion {
            field: self.field.to_string(),
            tag,
            value: value.clone(),
            reason: reason.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  ResultDeserializer
// ════════════════════════════════════════════════════════════════

/// A dispatch table bound to a wire namespace.
#[derive(Debug, Clone)]
pub struct ResultDeserializer {
    table: Deserializers,
    keys: WireKeys,
}

impl ResultDeserializer {
    pub fn new(table: Deserializers, keys: WireKeys) -> Self {
        Self { table, keys }
    }

    /// Array unwrapping only, for display/debug paths.
    pub fn raw() -> Self {
        Self::new(Deserializers::raw(), WireKeys::default())
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.keys = WireKeys::new(namespace);
        self
    }

    pub fn table(&self) -> &Deserializers {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Deserializers {
        &mut self.table
    }

    pub fn keys(&self) -> &WireKeys {
        &self.keys
    }

    /// Convert one row. The first bad leaf fails the whole row.
    pub fn deserialize_record(&self, row: &RawRow, for_model: bool) -> Result<Record, DeserializeError> {
        let mut record = Record::with_capacity(row.len());
        for (field, leaf) in row {
            let value = Context::new(&self.table, &self.keys, field, for_model).deserialize(leaf)?;
            record.push(field.clone(), value);
        }
        Ok(record)
    }

    pub fn deserialize_result_set(&self, rows: &[RawRow]) -> Result<Vec<Record>, DeserializeError> {
        tracing::trace!(rows = rows.len(), "deserializing raw results");
        rows.iter().map(|row| self.deserialize_record(row, false)).collect()
    }

    /// Convert each row for model output, then hand it to `parse`.
    ///
    /// Errors from `parse` are returned unmodified as [`ModelError::Validation`].
    pub fn deserialize_result_set_as_model<T, E, F>(&self, rows: &[RawRow], mut parse: F) -> Result<Vec<T>, ModelError<E>>
    where
        F: FnMut(Record) -> Result<T, E>,
    {
        tracing::trace!(rows = rows.len(), "deserializing raw results into models");
        let mut models = Vec::with_capacity(rows.len());
        for row in rows {
            let record = self.deserialize_record(row, true)?;
            models.push(parse(record).map_err(ModelError::Validation)?);
        }
        Ok(models)
    }
}

impl Default for ResultDeserializer {
    fn default() -> Self {
        Self::new(Deserializers::builtin(), WireKeys::default())
    }
}

// ════════════════════════════════════════════════════════════════
//  Entry points (default namespace)
// ════════════════════════════════════════════════════════════════

static BUILTIN: LazyLock<ResultDeserializer> = LazyLock::new(ResultDeserializer::default);
static RAW: LazyLock<ResultDeserializer> = LazyLock::new(ResultDeserializer::raw);

/// Convert every row into a [`Record`] of native values.
pub fn deserialize_result_set(rows: &[RawRow]) -> Result<Vec<Record>, DeserializeError> {
    BUILTIN.deserialize_result_set(rows)
}

/// Convert every row and build a model from it with `parse`.
pub fn deserialize_result_set_as_model<T, E, F>(rows: &[RawRow], parse: F) -> Result<Vec<T>, ModelError<E>>
where
    F: FnMut(Record) -> Result<T, E>,
{
    BUILTIN.deserialize_result_set_as_model(rows, parse)
}

/// [`deserialize_result_set_as_model`] with serde as the model constructor.
pub fn deserialize_result_set_into<T: DeserializeOwned>(rows: &[RawRow]) -> Result<Vec<T>, ModelError<serde_json::Error>> {
    BUILTIN.deserialize_result_set_as_model(rows, Record::into_model)
}

/// Like [`deserialize_result_set`] but only unwraps arrays.
pub fn parse_raw_results(rows: &[RawRow]) -> Result<Vec<Record>, DeserializeError> {
    RAW.deserialize_result_set(rows)
}

pub fn parse_raw_results_as_model<T, E, F>(rows: &[RawRow], parse: F) -> Result<Vec<T>, ModelError<E>>
where
    F: FnMut(Record) -> Result<T, E>,
{
    RAW.deserialize_result_set_as_model(rows, parse)
}
