//! JSON Codec using `serde_json`

use crate::traits::ColumnCodec;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Compact JSON codec using `serde_json`
///
/// Produces the canonical form: no whitespace, fields in declaration order.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl ColumnCodec for JsonCodec {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        serde_json::to_string(value)
    }

    fn deserialize_str<T: DeserializeOwned>(&self, text: &str) -> serde_json::Result<T> {
        serde_json::from_str(text)
    }

    fn deserialize_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice(bytes)
    }

    fn deserialize_value<T: DeserializeOwned>(
        &self,
        value: &serde_json::Value,
    ) -> serde_json::Result<T> {
        T::deserialize(value)
    }

    fn name(&self) -> &'static str {
        "serde_json"
    }
}
