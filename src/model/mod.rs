//! Data model for browser session dumps.
//!
//! The session document is a JSON array of session records, each mapping
//! window identifiers to tab collections. The model extracts the fields
//! the converter needs and carries everything else through untouched, so
//! unknown fields never cause a decode failure.

pub mod entry;
pub mod session;

pub use entry::*;
pub use session::*;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::trace;

/// Raw JSON values for fields the model does not name.
pub type UnknownFields = IndexMap<String, Value>;

/// Deserialize a value, treating an explicit `null` as the type's default.
///
/// Session writers emit `null` for absent titles and favicons; the
/// converter treats those the same as missing fields.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize carried-through metadata, falling back to the default when
/// the JSON type does not match.
///
/// Only malformed JSON fails; a field of an unexpected type never aborts
/// the decode of the whole session.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        trace!(error = %e, "ignoring mistyped metadata field");
        T::default()
    }))
}

/// Deserialize a textual metadata field, keeping numbers and booleans in
/// their JSON spelling.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}
