//! JSON Column
//!
//! Dialect-aware JSON column adapters for SQL persistence layers:
//! - **Type Discovery**: opt types in through the [`JsonColumn`] capability or
//!   an explicit annotation, and scan candidate sets for them
//! - **Adapter Registry**: typed decode/encode pairs for every opted-in type
//!   and its `Vec<T>` variant, keyed by type identity
//! - **Dialect Hints**: `jsonb` for PostgreSQL, text for SQLite and SQL Server,
//!   pass-through for anything else
//! - **Sessions**: record insert/update/get over any [`Driver`], with an
//!   in-memory reference driver
//!
//! # Quick Start
//!
//! ```rust
//! use json_column::{register_json_adapters, ColumnValue, Dialect, JsonColumn, TypeCatalog, TypeDescriptor};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Response {
//!     status_code: u16,
//!     message: String,
//! }
//!
//! impl JsonColumn for Response {}
//!
//! fn main() -> Result<(), json_column::JsonColumnError> {
//!     // Scan once at startup
//!     let models = TypeCatalog::new("models").with(TypeDescriptor::capable::<Response>());
//!     let registry = register_json_adapters(&models)?;
//!
//!     // Write: JSON text plus a dialect hint
//!     let response = Response { status_code: 200, message: "OK".into() };
//!     let encoded = registry.encode(Some(&response), Dialect::Postgres)?;
//!     assert_eq!(encoded.value, ColumnValue::from(r#"{"StatusCode":200,"Message":"OK"}"#));
//!
//!     // Read: raw column value back into the type
//!     let decoded: Option<Response> = registry.decode(&encoded.value)?;
//!     assert_eq!(decoded, Some(response));
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! TypeSource → discover() → RegistryBuilder → AdapterRegistry (immutable, shared)
//!                                                   ↓ encode / decode
//!                              JsonSession ⇄ Driver (dialect → TypeHint)
//! ```

pub mod adapter;
pub mod builder;
pub mod codecs;
pub mod column;
pub mod dialect;
pub mod discovery;
pub mod drivers;
pub mod error;
pub mod registry;
pub mod session;
pub mod traits;

pub use adapter::{EncodedColumn, JsonAdapter};
pub use builder::RegistryBuilder;
pub use codecs::JsonCodec;
pub use column::{ColumnValue, Parameter, Row, TypeHint};
pub use dialect::Dialect;
pub use discovery::{discover, source_fn, SourceFn, TypeCatalog, TypeDescriptor};
pub use error::{DiscoveryError, JsonColumnError, JsonColumnResult};
pub use registry::{AdapterConfig, AdapterRegistry};
pub use session::{Binder, JsonSession, Record, RowReader, SessionStats};
pub use traits::{ColumnCodec, Driver, JsonColumn, TypeSource};

#[cfg(feature = "memory")]
pub use drivers::MemoryDriver;

// Re-export async_trait for driver implementors
pub use async_trait::async_trait;

/// Scan a candidate set and build a registry of its JSON column types
///
/// Shorthand for `RegistryBuilder::new().discover(source)?.build()`. Call it
/// once at startup and pass the registry to whatever needs it.
///
/// # Errors
///
/// Returns [`JsonColumnError::Discovery`] if the candidates cannot be
/// scanned; nothing is registered in that case.
pub fn register_json_adapters<S>(source: &S) -> JsonColumnResult<AdapterRegistry>
where
    S: TypeSource + ?Sized,
{
    Ok(RegistryBuilder::new().discover(source)?.build())
}
