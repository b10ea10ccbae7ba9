//! Driver Implementations
//!
//! This module contains the drivers shipped with the crate. Production
//! drivers (PostgreSQL, SQLite, SQL Server) live in the host persistence
//! layer and implement [`Driver`](crate::traits::Driver) there.
//!
//! # Available Drivers
//!
//! - **Memory** - Concurrent in-memory tables for any dialect (feature: `memory`)
//!
//! # Usage
//!
//! ```rust
//! use json_column::drivers::MemoryDriver;
//! use json_column::{Dialect, Driver};
//!
//! let postgres = MemoryDriver::postgres();
//! let sqlite = MemoryDriver::from_url("sqlite::memory:");
//! assert_eq!(postgres.dialect(), Dialect::Postgres);
//! assert_eq!(sqlite.dialect(), Dialect::Sqlite);
//! ```

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub use memory::{MemoryDriver, MemoryDriverConfig};
