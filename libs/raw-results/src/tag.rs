use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownTag;

/// Semantic type of a wire value, as reported by the query engine.
///
/// Closed set. Only `BigInt`, `Bytes`, `Decimal`, `DateTime`, `Date`, `Time`,
/// `Array` and `Json` carry a wire encoding that needs bespoke parsing; the
/// rest arrive in their JSON-native form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Int,
    BigInt,
    Float,
    Double,
    String,
    Enum,
    Bytes,
    Bool,
    Char,
    Decimal,
    Json,
    Xml,
    Uuid,
    DateTime,
    Date,
    Time,
    Array,
    Null,
}

impl TypeTag {
    pub const ALL: [TypeTag; 18] = [
        TypeTag::Int,
        TypeTag::BigInt,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::String,
        TypeTag::Enum,
        TypeTag::Bytes,
        TypeTag::Bool,
        TypeTag::Char,
        TypeTag::Decimal,
        TypeTag::Json,
        TypeTag::Xml,
        TypeTag::Uuid,
        TypeTag::DateTime,
        TypeTag::Date,
        TypeTag::Time,
        TypeTag::Array,
        TypeTag::Null,
    ];

    /// Wire spelling of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::BigInt => "bigint",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Enum => "enum",
            TypeTag::Bytes => "bytes",
            TypeTag::Bool => "bool",
            TypeTag::Char => "char",
            TypeTag::Decimal => "decimal",
            TypeTag::Json => "json",
            TypeTag::Xml => "xml",
            TypeTag::Uuid => "uuid",
            TypeTag::DateTime => "datetime",
            TypeTag::Date => "date",
            TypeTag::Time => "time",
            TypeTag::Array => "array",
            TypeTag::Null => "null",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}
