//! Adapter Registry Builder
//!
//! Provides a builder for constructing an [`AdapterRegistry`] once at
//! startup, either from explicit registrations or from discovery.
//!
//! # Example: Explicit Registration
//!
//! ```rust
//! use json_column::{ColumnValue, Dialect, RegistryBuilder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Response {
//!     #[serde(rename = "StatusCode")]
//!     status_code: u16,
//! }
//!
//! let registry = RegistryBuilder::new().register::<Response>().build();
//!
//! let encoded = registry
//!     .encode(Some(&Response { status_code: 200 }), Dialect::Postgres)
//!     .unwrap();
//! assert_eq!(encoded.value, ColumnValue::from(r#"{"StatusCode":200}"#));
//! ```
//!
//! # Example: Discovery
//!
//! ```rust,ignore
//! let registry = RegistryBuilder::new()
//!     .with_config(AdapterConfig { preview_len: 128, ..AdapterConfig::default() })
//!     .discover(&models)?
//!     .build();
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::adapter::JsonAdapter;
use crate::codecs::JsonCodec;
use crate::discovery::discover;
use crate::error::JsonColumnResult;
use crate::registry::{AdapterConfig, AdapterMap, AdapterRegistry};
use crate::traits::{ColumnCodec, TypeSource};

/// Builder for constructing an `AdapterRegistry`
///
/// # Registration Semantics
///
/// - Registering `T` installs adapters for `T` and, unless
///   [`AdapterConfig::register_sequences`] is off, for `Vec<T>`.
/// - Registering a type again replaces its adapter; the last registration
///   wins.
/// - Registrations read the configuration current at the time of the call,
///   so call [`with_config`](Self::with_config) first.
pub struct RegistryBuilder {
    adapters: AdapterMap,
    config: AdapterConfig,
}

impl RegistryBuilder {
    /// Create a builder with no adapters and the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
            config: AdapterConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// Register `T` (and `Vec<T>`) with the default JSON codec
    #[must_use]
    pub fn register<T>(mut self) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.install::<T>();
        self
    }

    /// Register `T` alone, without its sequence variant
    #[must_use]
    pub fn register_single<T>(mut self) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.insert::<T, JsonCodec>(JsonCodec);
        self
    }

    /// Register `T` (and `Vec<T>`) with a custom codec
    #[must_use]
    pub fn register_with_codec<T, C>(mut self, codec: C) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        C: ColumnCodec + Clone + 'static,
    {
        self.install_with::<T, C>(codec);
        self
    }

    /// Register every type of `source` that opted in
    ///
    /// Candidates are scanned in full before anything is installed, so
    /// nothing is registered from a failing source. The builder is consumed
    /// either way; on error, earlier registrations are dropped with it.
    ///
    /// # Errors
    ///
    /// Returns [`JsonColumnError::Discovery`](crate::JsonColumnError::Discovery)
    /// if the source cannot be scanned.
    pub fn discover<S>(mut self, source: &S) -> JsonColumnResult<Self>
    where
        S: TypeSource + ?Sized,
    {
        let found = discover(source)?;
        for descriptor in &found {
            descriptor.install(&mut self)?;
        }
        info!(
            source = source.source_name(),
            types = found.len(),
            "Registered JSON column types from source"
        );
        Ok(self)
    }

    /// Freeze the registrations into a read-only registry
    #[must_use]
    pub fn build(self) -> AdapterRegistry {
        info!(
            adapters = self.adapters.len(),
            preview_len = self.config.preview_len,
            "JSON column adapter registry built"
        );
        AdapterRegistry::new(self.adapters, self.config)
    }

    pub(crate) fn install<T>(&mut self)
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.install_with::<T, JsonCodec>(JsonCodec);
    }

    fn install_with<T, C>(&mut self, codec: C)
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        C: ColumnCodec + Clone + 'static,
    {
        if self.config.register_sequences {
            self.insert::<Vec<T>, C>(codec.clone());
        }
        self.insert::<T, C>(codec);
    }

    fn insert<T, C>(&mut self, codec: C)
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        C: ColumnCodec + 'static,
    {
        let codec_name = codec.name();
        let replaced = self
            .adapters
            .insert(TypeId::of::<T>(), Box::new(JsonAdapter::<T, C>::with_codec(codec)))
            .is_some();
        debug!(
            type_name = type_name::<T>(),
            codec = codec_name,
            replaced,
            "Registered JSON column adapter"
        );
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Tag {
        label: String,
    }

    #[test]
    fn register_adds_sequence_variant() {
        let registry = RegistryBuilder::new().register::<Tag>().build();
        assert!(registry.contains::<Tag>());
        assert!(registry.contains::<Vec<Tag>>());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn register_single_skips_sequence_variant() {
        let registry = RegistryBuilder::new().register_single::<Tag>().build();
        assert!(registry.contains::<Tag>());
        assert!(!registry.contains::<Vec<Tag>>());
    }

    #[test]
    fn config_can_disable_sequences() {
        let registry = RegistryBuilder::new()
            .with_config(AdapterConfig {
                register_sequences: false,
                ..AdapterConfig::default()
            })
            .register::<Tag>()
            .build();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failing_source_registers_nothing() {
        use crate::{source_fn, DiscoveryError, JsonColumnError};

        let failing = source_fn("plugins", || Err("unreadable".to_string()));
        let err = RegistryBuilder::new()
            .register::<Tag>()
            .discover(&failing)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            JsonColumnError::Discovery(DiscoveryError::Source { .. })
        ));
    }

    #[test]
    fn registering_twice_keeps_one_entry() {
        let registry = RegistryBuilder::new()
            .register::<Tag>()
            .register::<Tag>()
            .build();
        assert_eq!(registry.len(), 2);
    }
}
