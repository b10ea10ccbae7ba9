//! Common utilities for integration tests
//!
//! This module provides shared test infrastructure including:
//! - Tracing setup
//! - Test models mirroring an API audit table
//! - Registry and session helpers

#![allow(dead_code)]

use json_column::{
    AdapterRegistry, Binder, Dialect, JsonColumn, JsonColumnResult, JsonSession, MemoryDriver,
    Parameter, Record, RowReader, TypeCatalog, TypeDescriptor, register_json_adapters,
};
use std::sync::Arc;

/// Route crate logs to the test output; honors `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("json_column=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Generate a unique name to avoid collisions between tests
pub fn unique_name(name: &str) -> String {
    format!("test_{}_{}", name, rand::random::<u32>())
}

/// Test models
pub mod models {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// Response written by an API; opts in through the capability
    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct ApiResponse {
        pub status_code: u16,
        pub message: String,
        pub qty: i32,
        pub amount: f64,
    }

    impl JsonColumn for ApiResponse {}

    impl ApiResponse {
        pub fn new(status_code: u16, message: &str, amount: f64, qty: i32) -> Self {
            Self {
                status_code,
                message: message.to_string(),
                qty,
                amount,
            }
        }
    }

    /// Request parameter; opts in through an annotation only
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct ApiRequestParameter {
        pub parameter_name: String,
        pub parameter_type: String,
        pub parameter_value: serde_json::Value,
    }

    impl ApiRequestParameter {
        pub fn string(name: &str, value: &str) -> Self {
            Self {
                parameter_name: name.to_string(),
                parameter_type: "String".to_string(),
                parameter_value: serde_json::Value::String(value.to_string()),
            }
        }
    }

    /// Audit row with two JSON columns; not a JSON type itself
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct ApiResponseHistory {
        pub id: i64,
        pub parameters: Option<Vec<ApiRequestParameter>>,
        pub response: Option<ApiResponse>,
    }

    impl ApiResponseHistory {
        pub fn new(response: ApiResponse, request_id: Option<&str>, request_path: Option<&str>) -> Self {
            let mut parameters: Option<Vec<ApiRequestParameter>> = None;
            if let Some(request_id) = request_id {
                parameters
                    .get_or_insert_with(Vec::new)
                    .push(ApiRequestParameter::string("RequestID", request_id));
            }
            if let Some(request_path) = request_path {
                parameters
                    .get_or_insert_with(Vec::new)
                    .push(ApiRequestParameter::string("RequestPath", request_path));
            }
            Self {
                id: 0,
                parameters,
                response: Some(response),
            }
        }
    }

    impl Record for ApiResponseHistory {
        const TABLE: &'static str = "apiresponsehistories";

        fn bind(&self, binder: &Binder<'_>) -> JsonColumnResult<Vec<Parameter>> {
            Ok(vec![
                binder.json("parameters", self.parameters.as_ref())?,
                binder.json("response", self.response.as_ref())?,
            ])
        }

        fn from_row(row: &RowReader<'_>) -> JsonColumnResult<Self> {
            Ok(Self {
                id: row.id(),
                parameters: row.json("parameters")?,
                response: row.json("response")?,
            })
        }
    }

    /// Every candidate type of the test "module"
    pub fn catalog() -> TypeCatalog {
        TypeCatalog::new("tests::models")
            .with(TypeDescriptor::capable::<ApiResponse>())
            .with(TypeDescriptor::annotated::<ApiRequestParameter>())
            .with(TypeDescriptor::opaque::<ApiResponseHistory>())
    }
}

/// Registry built from the test models
pub fn setup_registry() -> AdapterRegistry {
    init_tracing();
    register_json_adapters(&models::catalog()).expect("Failed to register test models")
}

/// Session over a fresh in-memory driver of the given dialect
pub fn setup_session(dialect: Dialect) -> (JsonSession, Arc<MemoryDriver>) {
    let driver = Arc::new(MemoryDriver::with_dialect(dialect));
    let session = JsonSession::new(setup_registry(), driver.clone());
    (session, driver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_generation() {
        let name1 = unique_name("user");
        let name2 = unique_name("user");
        assert_ne!(name1, name2, "Names should be unique");
        assert!(name1.starts_with("test_user_"));
    }

    #[test]
    fn test_history_parameters() {
        let response = models::ApiResponse::new(200, "OK", 1.0, 1);
        let history = models::ApiResponseHistory::new(response.clone(), Some("req-123"), None);
        assert_eq!(history.parameters.as_ref().map(Vec::len), Some(1));

        let bare = models::ApiResponseHistory::new(response, None, None);
        assert!(bare.parameters.is_none());
    }
}
