//! Memory Driver - Concurrent In-Memory Tables
//!
//! A lightweight driver keeping tables in `DashMap` for concurrent access.
//! This is a reference implementation showing how a driver honors the hints
//! attached to JSON parameters.

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::column::{ColumnValue, Parameter, Row, TypeHint};
use crate::dialect::Dialect;
use crate::traits::Driver;

type Table = Arc<RwLock<BTreeMap<i64, Row>>>;

/// Configuration for `MemoryDriver`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDriverConfig {
    /// Dialect the driver reports to sessions
    pub dialect: Dialect,
    /// First id handed out by `insert`
    pub first_id: i64,
}

impl Default for MemoryDriverConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Generic,
            first_id: 1,
        }
    }
}

/// Simple concurrent table store using `DashMap`
///
/// **Storage rules**:
/// - `TypeHint::NativeJson` parameters are parsed and kept as native
///   documents; malformed JSON is rejected like a `jsonb` column would
/// - `TypeHint::Text` parameters are kept as text (native documents are
///   rendered to text)
/// - unhinted parameters are kept exactly as given
///
/// **Limitations**:
/// - No SQL, indexes or transactions
/// - Tables are created on first insert
///
/// **Example**:
/// ```rust
/// use json_column::drivers::MemoryDriver;
/// use json_column::{ColumnValue, Driver, Parameter, TypeHint};
///
/// # async fn example() -> anyhow::Result<()> {
/// let driver = MemoryDriver::postgres();
/// let param = Parameter::new("doc", r#"{"a": 1}"#).with_hint(Some(TypeHint::NativeJson));
///
/// let id = driver.insert("docs", vec![param]).await?;
/// let row = driver.fetch("docs", id).await?.unwrap();
/// assert_eq!(row.get("doc"), Some(&ColumnValue::Json(serde_json::json!({"a": 1}))));
/// # Ok(())
/// # }
/// ```
pub struct MemoryDriver {
    config: MemoryDriverConfig,
    tables: Arc<DashMap<String, Table>>,
    next_id: Arc<AtomicI64>,
    /// Insert counter
    inserts: Arc<AtomicU64>,
    /// Update counter
    updates: Arc<AtomicU64>,
    /// Sequence for health check scratch tables
    probes: Arc<AtomicU64>,
}

impl MemoryDriver {
    /// Create a driver for the given configuration
    pub fn new(config: MemoryDriverConfig) -> Self {
        info!(dialect = %config.dialect, "Initializing Memory Driver (concurrent tables)");

        Self {
            config,
            tables: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(config.first_id)),
            inserts: Arc::new(AtomicU64::new(0)),
            updates: Arc::new(AtomicU64::new(0)),
            probes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a driver for a dialect with default settings
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self::new(MemoryDriverConfig {
            dialect,
            ..MemoryDriverConfig::default()
        })
    }

    /// Create a driver whose dialect follows a connection URL scheme
    pub fn from_url(url: &str) -> Self {
        Self::with_dialect(Dialect::from_url(url))
    }

    pub fn postgres() -> Self {
        Self::with_dialect(Dialect::Postgres)
    }

    pub fn sqlite() -> Self {
        Self::with_dialect(Dialect::Sqlite)
    }

    pub fn sql_server() -> Self {
        Self::with_dialect(Dialect::SqlServer)
    }

    /// Number of rows in a table
    #[must_use]
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |rows| rows.read().len())
    }

    /// Check if a table is empty (or missing)
    #[must_use]
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Drop a table and all of its rows
    pub fn drop_table(&self, table: &str) -> bool {
        self.tables.remove(table).is_some()
    }

    /// Number of inserts and updates served
    #[must_use]
    pub fn write_counts(&self) -> (u64, u64) {
        (
            self.inserts.load(Ordering::Relaxed),
            self.updates.load(Ordering::Relaxed),
        )
    }

    fn table(&self, table: &str) -> Option<Table> {
        self.tables.get(table).map(|rows| Arc::clone(&rows))
    }

    /// Apply a parameter's hint to get the stored value
    fn store(param: Parameter) -> Result<(String, ColumnValue)> {
        let Parameter { name, value, hint } = param;
        let stored = match (hint, value) {
            (_, ColumnValue::Null) => ColumnValue::Null,
            (Some(TypeHint::NativeJson), ColumnValue::Text(text)) => ColumnValue::Json(
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid input syntax for type json (column '{name}')"))?,
            ),
            (Some(TypeHint::NativeJson), ColumnValue::Blob(bytes)) => ColumnValue::Json(
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("invalid input syntax for type json (column '{name}')"))?,
            ),
            (Some(TypeHint::Text), ColumnValue::Json(doc)) => ColumnValue::Text(doc.to_string()),
            (_, value) => value,
        };
        Ok((name, stored))
    }

    fn store_all(params: Vec<Parameter>) -> Result<Vec<(String, ColumnValue)>> {
        params.into_iter().map(Self::store).collect()
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new(MemoryDriverConfig::default())
    }
}

/// Parse a stored value back into a document for aggregation
fn as_document(value: &ColumnValue) -> Result<Option<serde_json::Value>> {
    Ok(match value {
        ColumnValue::Null => None,
        ColumnValue::Json(doc) => Some(doc.clone()),
        ColumnValue::Text(text) => Some(serde_json::from_str(text).context("stored text is not JSON")?),
        ColumnValue::Blob(bytes) => Some(serde_json::from_slice(bytes).context("stored blob is not JSON")?),
    })
}

// ===== Trait Implementations =====

/// Implement `Driver` trait for `MemoryDriver`
#[async_trait]
impl Driver for MemoryDriver {
    fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    async fn insert(&self, table: &str, params: Vec<Parameter>) -> Result<i64> {
        let columns = Self::store_all(params)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let rows = self
            .tables
            .entry(table.to_string())
            .or_insert_with(Table::default)
            .clone();
        rows.write().insert(id, Row::new(id, columns));
        self.inserts.fetch_add(1, Ordering::Relaxed);
        debug!(table = %table, id, "[Memory] Inserted row");
        Ok(id)
    }

    async fn update(&self, table: &str, id: i64, params: Vec<Parameter>) -> Result<bool> {
        let columns = Self::store_all(params)?;
        let Some(rows) = self.table(table) else {
            return Ok(false);
        };
        let mut rows = rows.write();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(false);
        };
        for (name, value) in columns {
            row.set(&name, value);
        }
        self.updates.fetch_add(1, Ordering::Relaxed);
        debug!(table = %table, id, "[Memory] Updated row");
        Ok(true)
    }

    async fn fetch(&self, table: &str, id: i64) -> Result<Option<Row>> {
        Ok(self
            .table(table)
            .and_then(|rows| rows.read().get(&id).cloned()))
    }

    async fn fetch_all(&self, table: &str) -> Result<Vec<Row>> {
        Ok(self
            .table(table)
            .map(|rows| rows.read().values().cloned().collect())
            .unwrap_or_default())
    }

    async fn aggregate(&self, table: &str, column: &str) -> Result<ColumnValue> {
        let Some(rows) = self.table(table) else {
            return Ok(ColumnValue::Null);
        };
        let mut documents = Vec::new();
        for row in rows.read().values() {
            if let Some(doc) = row.get(column).map(as_document).transpose()?.flatten() {
                documents.push(doc);
            }
        }
        if documents.is_empty() {
            return Ok(ColumnValue::Null);
        }

        let array = serde_json::Value::Array(documents);
        Ok(match self.config.dialect.json_hint() {
            Some(TypeHint::NativeJson) => ColumnValue::Json(array),
            _ => ColumnValue::Text(array.to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        // Each check gets its own scratch table; never reuse an existing one
        let test_table = loop {
            let seq = self.probes.fetch_add(1, Ordering::Relaxed);
            let name = format!("__health_check_memory_{seq}");
            if !self.tables.contains_key(&name) {
                break name;
            }
        };
        let param = Parameter::new("probe", "true").with_hint(self.config.dialect.json_hint());

        let healthy = match self.insert(&test_table, vec![param]).await {
            Ok(id) => matches!(self.fetch(&test_table, id).await, Ok(Some(_))),
            Err(_) => false,
        };
        self.drop_table(&test_table);
        healthy
    }

    fn name(&self) -> &'static str {
        "Memory"
    }
}
