use crate::tag::TypeTag;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type tag '{0}'")]
pub struct UnknownTag(pub String);

/// Failure while turning raw engine results into native values.
///
/// Always aborts the whole call: no partially converted rows are returned.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    /// A leaf is not a `{type, value}` pair the engine could have produced.
    #[error("malformed tagged value at '{field}': {reason}")]
    MalformedTag { field: String, reason: String },

    /// A converter could not parse the literal it was handed.
    #[error("cannot convert '{field}' as {tag} from {value}: {reason}")]
    Conversion {
        field: String,
        tag: TypeTag,
        value: serde_json::Value,
        reason: String,
    },

    #[error("wire json: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeserializeError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTag {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Field path (`name` or `name[i]...`) the error points at, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedTag { field, .. } | Self::Conversion { field, .. } => Some(field),
            Self::Json(_) => None,
        }
    }
}

/// Failure of a model-producing call.
///
/// `Validation` carries the model constructor's own error untouched.
#[derive(Debug, thiserror::Error)]
pub enum ModelError<E> {
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),

    #[error("model validation: {0}")]
    Validation(E),
}

impl<E> ModelError<E> {
    /// The constructor's error, if that is what failed.
    pub fn into_validation(self) -> Option<E> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Deserialize(_) => None,
        }
    }
}
