//! Column Codec Implementations
//!
//! This module provides the built-in implementation of the
//! [`ColumnCodec`](crate::traits::ColumnCodec) trait.

mod json;
pub use json::JsonCodec;
