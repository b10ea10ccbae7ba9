//! Typed JSON column adapter
//!
//! [`JsonAdapter`] converts between one Rust type and raw column values.
//! The registry stores adapters behind the object-safe [`ErasedAdapter`] so
//! that adapters for unrelated types can share one map keyed by `TypeId`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

use crate::codecs::JsonCodec;
use crate::column::{ColumnValue, Parameter, TypeHint};
use crate::dialect::Dialect;
use crate::error::{preview, JsonColumnError, JsonColumnResult};
use crate::traits::ColumnCodec;

/// Output of an encode: the column value plus the dialect hint
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    pub value: ColumnValue,
    pub hint: Option<TypeHint>,
}

impl EncodedColumn {
    /// Bind to a column name
    pub fn into_parameter(self, name: impl Into<String>) -> Parameter {
        Parameter::new(name, self.value).with_hint(self.hint)
    }
}

/// Decode/encode pair for a single type
///
/// # Null handling
///
/// - SQL `NULL` and a JSON `null` payload decode to `None`.
/// - `None`, and any value whose JSON form is `null`, encode to
///   `ColumnValue::Null` rather than the text `"null"`.
///
/// # Known lossy cases
///
/// Non-finite floats (`NaN`, infinities) have no JSON form; `serde_json`
/// writes them as `null`, so they do not survive a round trip.
pub struct JsonAdapter<T, C = JsonCodec> {
    codec: C,
    _type: PhantomData<fn() -> T>,
}

impl<T> JsonAdapter<T, JsonCodec> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            codec: JsonCodec,
            _type: PhantomData,
        }
    }
}

impl<T> Default for JsonAdapter<T, JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> fmt::Debug for JsonAdapter<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonAdapter")
            .field("type", &type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T, C> JsonAdapter<T, C>
where
    T: Serialize + DeserializeOwned,
    C: ColumnCodec,
{
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            _type: PhantomData,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decode a raw column value
    ///
    /// # Errors
    ///
    /// Returns [`JsonColumnError::Decode`] with a payload preview of at most
    /// `preview_len` characters when the payload is malformed or does not
    /// match `T`.
    pub fn decode(&self, raw: &ColumnValue, preview_len: usize) -> JsonColumnResult<Option<T>> {
        let decoded = match raw {
            ColumnValue::Null => return Ok(None),
            ColumnValue::Text(text) => self
                .codec
                .deserialize_str::<Option<T>>(text)
                .map_err(|source| decode_error::<T>(text, preview_len, source)),
            ColumnValue::Blob(bytes) => self
                .codec
                .deserialize_slice::<Option<T>>(bytes)
                .map_err(|source| {
                    decode_error::<T>(&String::from_utf8_lossy(bytes), preview_len, source)
                }),
            ColumnValue::Json(value) => self
                .codec
                .deserialize_value::<Option<T>>(value)
                .map_err(|source| decode_error::<T>(&value.to_string(), preview_len, source)),
        }?;

        debug!(
            type_name = type_name::<T>(),
            kind = raw.kind(),
            present = decoded.is_some(),
            "Decoded JSON column"
        );
        Ok(decoded)
    }

    /// Encode a value for the given dialect
    ///
    /// # Errors
    ///
    /// Returns [`JsonColumnError::Encode`] when the value has no JSON form.
    pub fn encode(&self, value: Option<&T>, dialect: Dialect) -> JsonColumnResult<EncodedColumn> {
        let value = match value {
            None => ColumnValue::Null,
            Some(value) => {
                let text = self
                    .codec
                    .serialize(value)
                    .map_err(|source| JsonColumnError::Encode {
                        type_name: type_name::<T>(),
                        source,
                    })?;
                if text.trim() == "null" {
                    ColumnValue::Null
                } else {
                    ColumnValue::Text(text)
                }
            }
        };
        let hint = dialect.json_hint();

        debug!(
            type_name = type_name::<T>(),
            dialect = %dialect,
            kind = value.kind(),
            "Encoded JSON column"
        );
        Ok(EncodedColumn { value, hint })
    }
}

fn decode_error<T>(payload: &str, preview_len: usize, source: serde_json::Error) -> JsonColumnError {
    JsonColumnError::Decode {
        type_name: type_name::<T>(),
        preview: preview(payload, preview_len),
        source,
    }
}

/// Type-erased view of a [`JsonAdapter`]
pub(crate) trait ErasedAdapter: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn codec_name(&self) -> &'static str;

    fn decode_any(
        &self,
        raw: &ColumnValue,
        preview_len: usize,
    ) -> JsonColumnResult<Option<Box<dyn Any>>>;

    /// `value` must be a `&T` of the adapter's type; anything else is treated
    /// as unregistered
    fn encode_any(&self, value: Option<&dyn Any>, dialect: Dialect) -> JsonColumnResult<EncodedColumn>;
}

impl<T, C> ErasedAdapter for JsonAdapter<T, C>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    C: ColumnCodec + 'static,
{
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    fn decode_any(
        &self,
        raw: &ColumnValue,
        preview_len: usize,
    ) -> JsonColumnResult<Option<Box<dyn Any>>> {
        Ok(self
            .decode(raw, preview_len)?
            .map(|value| Box::new(value) as Box<dyn Any>))
    }

    fn encode_any(&self, value: Option<&dyn Any>, dialect: Dialect) -> JsonColumnResult<EncodedColumn> {
        let typed = match value {
            None => None,
            Some(value) => Some(value.downcast_ref::<T>().ok_or(
                JsonColumnError::NotRegistered {
                    type_name: type_name::<T>(),
                },
            )?),
        };
        self.encode(typed, dialect)
    }
}
