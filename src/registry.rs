//! Adapter Registry - read-only map from type identity to JSON adapter
//!
//! Built once by [`RegistryBuilder`](crate::RegistryBuilder) and immutable
//! afterwards. Cloning is cheap (shared `Arc`), and lookups take no locks, so
//! one registry can serve every task issuing queries.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::{EncodedColumn, ErasedAdapter};
use crate::column::ColumnValue;
use crate::dialect::Dialect;
use crate::error::{JsonColumnError, JsonColumnResult};

/// Configuration for adapter registration and decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Maximum number of payload characters quoted in a decode error
    pub preview_len: usize,
    /// Whether registering `T` also registers `Vec<T>`
    pub register_sequences: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            preview_len: 64,
            register_sequences: true,
        }
    }
}

pub(crate) type AdapterMap = HashMap<TypeId, Box<dyn ErasedAdapter>>;

struct RegistryInner {
    adapters: AdapterMap,
    config: AdapterConfig,
}

/// Immutable registry of JSON column adapters
#[derive(Clone)]
pub struct AdapterRegistry {
    inner: Arc<RegistryInner>,
}

impl AdapterRegistry {
    pub(crate) fn new(adapters: AdapterMap, config: AdapterConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner { adapters, config }),
        }
    }

    fn adapter<T: 'static>(&self) -> JsonColumnResult<&dyn ErasedAdapter> {
        self.inner
            .adapters
            .get(&TypeId::of::<T>())
            .map(|adapter| adapter.as_ref())
            .ok_or(JsonColumnError::NotRegistered {
                type_name: type_name::<T>(),
            })
    }

    /// Decode a raw column value into `T`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - Payload decoded
    /// * `Ok(None)` - Column is `NULL` (or holds a JSON `null`)
    ///
    /// # Errors
    ///
    /// * [`JsonColumnError::NotRegistered`] - No adapter for `T`
    /// * [`JsonColumnError::Decode`] - Malformed payload or shape mismatch
    pub fn decode<T: 'static>(&self, raw: &ColumnValue) -> JsonColumnResult<Option<T>> {
        let adapter = self.adapter::<T>()?;
        match adapter.decode_any(raw, self.inner.config.preview_len)? {
            None => Ok(None),
            Some(value) => value
                .downcast::<T>()
                .map(|value| Some(*value))
                .map_err(|_| JsonColumnError::NotRegistered {
                    type_name: type_name::<T>(),
                }),
        }
    }

    /// Decode a raw column value, mapping `NULL` to `T::default()`
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode).
    pub fn decode_or_default<T: Default + 'static>(&self, raw: &ColumnValue) -> JsonColumnResult<T> {
        Ok(self.decode::<T>(raw)?.unwrap_or_default())
    }

    /// Encode a value for the given dialect
    ///
    /// `None` encodes to `ColumnValue::Null`. The hint follows
    /// [`Dialect::json_hint`]; unrecognized dialects get no hint and the JSON
    /// text is passed through as is.
    ///
    /// # Errors
    ///
    /// * [`JsonColumnError::NotRegistered`] - No adapter for `T`
    /// * [`JsonColumnError::Encode`] - Value has no JSON form
    pub fn encode<T: 'static>(&self, value: Option<&T>, dialect: Dialect) -> JsonColumnResult<EncodedColumn> {
        self.adapter::<T>()?
            .encode_any(value.map(|value| value as &dyn std::any::Any), dialect)
    }

    /// Whether an adapter is registered for `T`
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.inner.adapters.contains_key(&TypeId::of::<T>())
    }

    /// Name of the codec registered for `T`
    #[must_use]
    pub fn codec_name<T: 'static>(&self) -> Option<&'static str> {
        self.adapter::<T>().ok().map(|adapter| adapter.codec_name())
    }

    /// Number of registered adapters
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.adapters.is_empty()
    }

    /// Names of the registered types, sorted
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .inner
            .adapters
            .values()
            .map(|adapter| adapter.type_name())
            .collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("types", &self.type_names())
            .field("config", &self.inner.config)
            .finish()
    }
}
