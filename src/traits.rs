//! Column Adapter Traits
//!
//! This module defines the trait abstractions at the seams of the crate.
//!
//! # Architecture
//!
//! - `ColumnCodec`: pluggable text codec used by the adapters
//! - `JsonColumn`: marker capability a model type implements to opt in
//! - `TypeSource`: a set of candidate types that discovery can scan
//! - `Driver`: the persistence layer a session binds parameters for
//!
//! # Example: Custom Driver
//!
//! ```rust,ignore
//! use json_column::{ColumnValue, Dialect, Driver, Parameter, Row, async_trait};
//! use anyhow::Result;
//!
//! struct MyPgDriver {
//!     // Your connection pool
//! }
//!
//! #[async_trait]
//! impl Driver for MyPgDriver {
//!     fn dialect(&self) -> Dialect {
//!         Dialect::Postgres
//!     }
//!
//!     async fn insert(&self, table: &str, params: Vec<Parameter>) -> Result<i64> {
//!         // Bind `param.hint` as the parameter type, e.g. jsonb
//!     }
//!
//!     // ... implement the remaining methods
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::column::{ColumnValue, Parameter, Row};
use crate::dialect::Dialect;
use crate::discovery::TypeDescriptor;
use crate::error::DiscoveryError;

/// Trait for JSON column serialization/deserialization
///
/// Adapters are generic over a codec so a registration can choose how values
/// are rendered to and parsed from column payloads. The default is
/// [`JsonCodec`](crate::codecs::JsonCodec).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync + Debug`; a registry is shared across
/// tasks and every adapter holds its own codec instance.
///
/// # Example: Custom Codec
///
/// ```rust
/// use json_column::ColumnCodec;
/// use serde::{Serialize, de::DeserializeOwned};
///
/// #[derive(Debug, Clone, Copy)]
/// struct PrettyCodec;
///
/// impl ColumnCodec for PrettyCodec {
///     fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
///         serde_json::to_string_pretty(value)
///     }
///
///     fn deserialize_str<T: DeserializeOwned>(&self, text: &str) -> serde_json::Result<T> {
///         serde_json::from_str(text)
///     }
///
///     fn name(&self) -> &'static str {
///         "pretty"
///     }
/// }
/// ```
pub trait ColumnCodec: Send + Sync + Debug {
    /// Render a value as a column payload
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no JSON representation.
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String>;

    /// Parse a text payload
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or a shape mismatch.
    fn deserialize_str<T: DeserializeOwned>(&self, text: &str) -> serde_json::Result<T>;

    /// Parse a byte payload
    ///
    /// The default implementation requires UTF-8 and defers to
    /// [`deserialize_str`](Self::deserialize_str).
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or a shape mismatch.
    fn deserialize_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T> {
        let text = std::str::from_utf8(bytes).map_err(<serde_json::Error as serde::de::Error>::custom)?;
        self.deserialize_str(text)
    }

    /// Convert a document a driver already parsed
    ///
    /// # Errors
    ///
    /// Returns an error on a shape mismatch.
    fn deserialize_value<T: DeserializeOwned>(
        &self,
        value: &serde_json::Value,
    ) -> serde_json::Result<T> {
        self.deserialize_str(&value.to_string())
    }

    /// Get the name of the codec
    ///
    /// This is used for logging and debugging purposes.
    fn name(&self) -> &'static str;
}

/// Marker capability for types stored as JSON columns
///
/// Implementing this trait is one of the two ways a type opts in to JSON
/// column treatment; the other is declaring it with
/// [`TypeDescriptor::annotated`](crate::TypeDescriptor::annotated).
///
/// ```rust
/// use json_column::{JsonColumn, TypeDescriptor};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Settings {
///     theme: String,
/// }
///
/// impl JsonColumn for Settings {}
///
/// let descriptor = TypeDescriptor::capable::<Settings>();
/// assert!(descriptor.is_eligible());
/// ```
pub trait JsonColumn: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// A set of candidate types that discovery scans
///
/// Enumerating the candidates may fail; discovery then reports the failure
/// and registers nothing from the source.
pub trait TypeSource {
    /// Name used in logs and errors
    fn source_name(&self) -> &str;

    /// Enumerate candidate descriptors
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Source`] when the candidates cannot be
    /// enumerated.
    fn candidates(&self) -> Result<Vec<TypeDescriptor>, DiscoveryError>;
}

impl TypeSource for [TypeDescriptor] {
    fn source_name(&self) -> &str {
        "descriptors"
    }

    fn candidates(&self) -> Result<Vec<TypeDescriptor>, DiscoveryError> {
        Ok(self.to_vec())
    }
}

impl TypeSource for Vec<TypeDescriptor> {
    fn source_name(&self) -> &str {
        "descriptors"
    }

    fn candidates(&self) -> Result<Vec<TypeDescriptor>, DiscoveryError> {
        Ok(self.clone())
    }
}

/// Persistence driver a session binds parameters for
///
/// A driver owns connections and statement execution. It receives
/// [`Parameter`]s carrying a storage hint and hands back [`Row`]s of raw
/// [`ColumnValue`]s; it never sees typed values.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to support concurrent access across async tasks.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Dialect used to select JSON parameter hints
    fn dialect(&self) -> Dialect;

    /// Insert a row and return its id
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a value.
    async fn insert(&self, table: &str, params: Vec<Parameter>) -> Result<i64>;

    /// Replace columns of an existing row
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No row with that id
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a value.
    async fn update(&self, table: &str, id: i64, params: Vec<Parameter>) -> Result<bool>;

    /// Fetch a row by id
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn fetch(&self, table: &str, id: i64) -> Result<Option<Row>>;

    /// Fetch every row of a table, ordered by id
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn fetch_all(&self, table: &str) -> Result<Vec<Row>>;

    /// Aggregate the non-null values of a JSON column into one JSON array
    ///
    /// Equivalent to `jsonb_agg(column) FILTER (WHERE column IS NOT NULL)`;
    /// yields `ColumnValue::Null` when there is nothing to aggregate.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value is not valid JSON.
    async fn aggregate(&self, table: &str, column: &str) -> Result<ColumnValue>;

    /// Check if the driver is operational
    async fn health_check(&self) -> bool;

    /// Get the name of this driver
    ///
    /// This is used for logging and debugging purposes.
    fn name(&self) -> &'static str {
        "unknown"
    }
}
