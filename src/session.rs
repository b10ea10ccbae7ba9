//! JSON Session - record persistence through a driver
//!
//! Pairs an [`AdapterRegistry`] with a [`Driver`]. Records describe which of
//! their fields are JSON columns; the session encodes them with the driver's
//! dialect on write and decodes them on read, so callers never handle raw
//! column values.

use anyhow::Result;
use std::any::type_name;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::column::{ColumnValue, Parameter, Row};
use crate::dialect::Dialect;
use crate::error::JsonColumnResult;
use crate::registry::AdapterRegistry;
use crate::traits::Driver;

/// A model persisted as one row
///
/// # Example
///
/// ```rust,ignore
/// impl Record for ApiResponseHistory {
///     const TABLE: &'static str = "apiresponsehistories";
///
///     fn bind(&self, binder: &Binder<'_>) -> JsonColumnResult<Vec<Parameter>> {
///         Ok(vec![
///             binder.json("parameters", self.parameters.as_ref())?,
///             binder.json("response", self.response.as_ref())?,
///         ])
///     }
///
///     fn from_row(row: &RowReader<'_>) -> JsonColumnResult<Self> {
///         Ok(Self {
///             id: row.id(),
///             parameters: row.json("parameters")?,
///             response: row.json("response")?,
///         })
///     }
/// }
/// ```
pub trait Record: Sized {
    /// Table the record is stored in
    const TABLE: &'static str;

    /// Turn the record's columns into parameters
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON column cannot be encoded.
    fn bind(&self, binder: &Binder<'_>) -> JsonColumnResult<Vec<Parameter>>;

    /// Materialize the record from a row
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON column cannot be decoded.
    fn from_row(row: &RowReader<'_>) -> JsonColumnResult<Self>;
}

#[derive(Default)]
struct Counters {
    encodes: AtomicU64,
    decodes: AtomicU64,
    null_reads: AtomicU64,
    decode_failures: AtomicU64,
}

/// Encodes record fields for the session's dialect
pub struct Binder<'a> {
    registry: &'a AdapterRegistry,
    dialect: Dialect,
    counters: &'a Counters,
}

impl Binder<'_> {
    /// Encode a JSON column
    ///
    /// # Errors
    ///
    /// Returns an error if `T` is not registered or cannot be encoded.
    pub fn json<T: 'static>(&self, column: &str, value: Option<&T>) -> JsonColumnResult<Parameter> {
        let encoded = self.registry.encode(value, self.dialect)?;
        self.counters.encodes.fetch_add(1, Ordering::Relaxed);
        Ok(encoded.into_parameter(column))
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

/// Decodes record fields from a row
pub struct RowReader<'a> {
    registry: &'a AdapterRegistry,
    row: &'a Row,
    counters: &'a Counters,
}

impl RowReader<'_> {
    /// Primary key of the row
    #[must_use]
    pub fn id(&self) -> i64 {
        self.row.id
    }

    /// Raw value of a column
    #[must_use]
    pub fn raw(&self, column: &str) -> Option<&ColumnValue> {
        self.row.get(column)
    }

    /// Decode a JSON column; missing and `NULL` columns read as `None`
    ///
    /// # Errors
    ///
    /// Returns an error if `T` is not registered or the payload does not
    /// decode.
    pub fn json<T: 'static>(&self, column: &str) -> JsonColumnResult<Option<T>> {
        let raw = self.row.get(column).unwrap_or(&ColumnValue::Null);
        match self.registry.decode::<T>(raw) {
            Ok(value) => {
                self.counters.decodes.fetch_add(1, Ordering::Relaxed);
                if value.is_none() {
                    self.counters.null_reads.fetch_add(1, Ordering::Relaxed);
                }
                Ok(value)
            }
            Err(e) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    row_id = self.row.id,
                    column,
                    type_name = type_name::<T>(),
                    error = %e,
                    "Failed to decode JSON column"
                );
                Err(e)
            }
        }
    }

    /// Decode a JSON column, mapping `NULL` to `T::default()`
    ///
    /// # Errors
    ///
    /// Same as [`json`](Self::json).
    pub fn json_or_default<T: Default + 'static>(&self, column: &str) -> JsonColumnResult<T> {
        Ok(self.json::<T>(column)?.unwrap_or_default())
    }
}

/// Session statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub encodes: u64,
    pub decodes: u64,
    pub null_reads: u64,
    pub decode_failures: u64,
}

/// JSON Session - typed record operations over a driver
pub struct JsonSession {
    registry: AdapterRegistry,
    driver: Arc<dyn Driver>,
    counters: Counters,
}

impl JsonSession {
    pub fn new(registry: AdapterRegistry, driver: Arc<dyn Driver>) -> Self {
        info!(
            driver = driver.name(),
            dialect = %driver.dialect(),
            adapters = registry.len(),
            "Opening JSON session"
        );
        Self {
            registry,
            driver,
            counters: Counters::default(),
        }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.driver.dialect()
    }

    #[must_use]
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    fn binder(&self) -> Binder<'_> {
        Binder {
            registry: &self.registry,
            dialect: self.driver.dialect(),
            counters: &self.counters,
        }
    }

    fn materialize<R: Record>(&self, row: &Row) -> JsonColumnResult<R> {
        R::from_row(&RowReader {
            registry: &self.registry,
            row,
            counters: &self.counters,
        })
    }

    /// Encode a single value as a named parameter
    ///
    /// # Errors
    ///
    /// Returns an error if `T` is not registered or cannot be encoded.
    pub fn encode<T: 'static>(&self, column: &str, value: Option<&T>) -> Result<Parameter> {
        Ok(self.binder().json(column, value)?)
    }

    /// Decode a single raw value
    ///
    /// # Errors
    ///
    /// Returns an error if `T` is not registered or the payload does not
    /// decode.
    pub fn decode<T: 'static>(&self, raw: &ColumnValue) -> Result<Option<T>> {
        let row = Row::new(0, vec![("value".to_string(), raw.clone())]);
        let reader = RowReader {
            registry: &self.registry,
            row: &row,
            counters: &self.counters,
        };
        Ok(reader.json("value")?)
    }

    /// Insert a record and return its id
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be encoded or the driver rejects
    /// the row.
    pub async fn insert<R: Record>(&self, record: &R) -> Result<i64> {
        let params = record.bind(&self.binder())?;
        let id = self.driver.insert(R::TABLE, params).await?;
        debug!(table = R::TABLE, id, "Inserted record");
        Ok(id)
    }

    /// Overwrite a record's columns
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Record updated
    /// * `Ok(false)` - No record with that id
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be encoded or the driver rejects
    /// the row.
    pub async fn update<R: Record>(&self, id: i64, record: &R) -> Result<bool> {
        let params = record.bind(&self.binder())?;
        let updated = self.driver.update(R::TABLE, id, params).await?;
        debug!(table = R::TABLE, id, updated, "Updated record");
        Ok(updated)
    }

    /// Fetch a record by id
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails or a column does not decode.
    pub async fn get<R: Record>(&self, id: i64) -> Result<Option<R>> {
        match self.driver.fetch(R::TABLE, id).await? {
            Some(row) => Ok(Some(self.materialize(&row)?)),
            None => Ok(None),
        }
    }

    /// Fetch every record of the table, ordered by id
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails or a column does not decode.
    pub async fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let rows = self.driver.fetch_all(R::TABLE).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(self.materialize(row)?);
        }
        Ok(records)
    }

    /// Aggregate a JSON column across the table into one list
    ///
    /// Requires the `Vec<T>` adapter, which `register::<T>()` installs.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails or the aggregate does not decode.
    pub async fn aggregate<T: 'static>(&self, table: &str, column: &str) -> Result<Vec<T>> {
        let raw = self.driver.aggregate(table, column).await?;
        Ok(self.decode::<Vec<T>>(&raw)?.unwrap_or_default())
    }

    /// Get session statistics
    pub fn get_stats(&self) -> SessionStats {
        SessionStats {
            encodes: self.counters.encodes.load(Ordering::Relaxed),
            decodes: self.counters.decodes.load(Ordering::Relaxed),
            null_reads: self.counters.null_reads.load(Ordering::Relaxed),
            decode_failures: self.counters.decode_failures.load(Ordering::Relaxed),
        }
    }
}
