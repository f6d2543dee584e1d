//! Typed deserialization of raw query-engine results.
//!
//! The engine returns rows whose leaves are tagged pairs:
//!
//! ```json
//! [{"id": {"prisma__type": "bigint", "prisma__value": "9007199254740993"}}]
//! ```
//!
//! [`deserialize_result_set`] dispatches on the tag through a
//! [`Deserializers`] table and produces [`Record`]s of native [`Value`]s.
//! [`parse_raw_results`] only unwraps arrays.

pub mod convert;
pub mod deserializer;
pub mod error;
pub mod record;
pub mod tag;
pub mod value;
pub mod wire;

pub use deserializer::{
    Context, Deserializer, Deserializers, MAX_ARRAY_DEPTH, ResultDeserializer, deserialize_result_set,
    deserialize_result_set_as_model, deserialize_result_set_into, parse_raw_results, parse_raw_results_as_model,
};
pub use error::{DeserializeError, ModelError, UnknownTag};
pub use record::Record;
pub use tag::TypeTag;
pub use value::{Base64, Value};
pub use wire::{DEFAULT_NAMESPACE, RawRow, TaggedValue, WireKeys, parse_result_set, parse_result_set_slice};
