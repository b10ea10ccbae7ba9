//! Basic integration tests for adapter registration, decoding and encoding

mod common;

use json_column::{
    AdapterConfig, ColumnCodec, ColumnValue, Dialect, JsonColumnError, RegistryBuilder, TypeHint,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Response {
    status_code: i32,
    message: String,
}

fn ok() -> Response {
    Response {
        status_code: 200,
        message: "OK".to_string(),
    }
}

fn registry() -> json_column::AdapterRegistry {
    common::init_tracing();
    RegistryBuilder::new().register::<Response>().build()
}

/// Test the canonical JSON text and the way back
#[test]
fn test_encode_then_decode_response() {
    let registry = registry();

    let encoded = registry.encode(Some(&ok()), Dialect::Sqlite).unwrap();
    assert_eq!(
        encoded.value,
        ColumnValue::from(r#"{"StatusCode":200,"Message":"OK"}"#)
    );

    let decoded: Option<Response> = registry.decode(&encoded.value).unwrap();
    assert_eq!(decoded, Some(ok()));
}

/// Test that an absent value is a SQL NULL both ways
#[test]
fn test_null_round_trip() {
    let registry = registry();

    let encoded = registry.encode::<Response>(None, Dialect::Postgres).unwrap();
    assert_eq!(encoded.value, ColumnValue::Null);
    assert_ne!(encoded.value, ColumnValue::from("null"));
    assert_eq!(encoded.hint, Some(TypeHint::NativeJson));

    let encoded = registry.encode::<Response>(None, Dialect::SqlServer).unwrap();
    assert_eq!(encoded.hint, Some(TypeHint::Text));

    let decoded: Option<Response> = registry.decode(&ColumnValue::Null).unwrap();
    assert_eq!(decoded, None);
    let decoded: Option<Vec<Response>> = registry.decode(&ColumnValue::Null).unwrap();
    assert_eq!(decoded, None);
}

/// Test that malformed payloads are reported, never defaulted
#[test]
fn test_malformed_payload_names_the_type() {
    let registry = registry();

    let err = registry
        .decode::<Response>(&ColumnValue::from(r#"{"StatusCode":"#))
        .unwrap_err();

    match &err {
        JsonColumnError::Decode { type_name, preview, .. } => {
            assert!(type_name.ends_with("Response"));
            assert_eq!(preview, r#"{"StatusCode":"#);
        }
        other => panic!("expected decode error, got {other:?}"),
    }
    assert!(err.to_string().contains("Response"));
}

/// Test that the preview length follows the configuration
#[test]
fn test_preview_length_is_configurable() {
    let registry = RegistryBuilder::new()
        .with_config(AdapterConfig {
            preview_len: 4,
            ..AdapterConfig::default()
        })
        .register::<Response>()
        .build();

    match registry.decode::<Response>(&ColumnValue::from(r#"{"StatusCode":"#)) {
        Err(JsonColumnError::Decode { preview, .. }) => assert_eq!(preview, r#"{"St…"#),
        other => panic!("expected decode error, got {other:?}"),
    }
}

/// Test the hint selected for each dialect
#[test]
fn test_hint_per_dialect() {
    let registry = registry();
    let expected_text = ColumnValue::from(r#"{"StatusCode":200,"Message":"OK"}"#);

    let cases = [
        (Dialect::Postgres, Some(TypeHint::NativeJson)),
        (Dialect::Sqlite, Some(TypeHint::Text)),
        (Dialect::SqlServer, Some(TypeHint::Text)),
        (Dialect::Generic, None),
    ];

    for (dialect, hint) in cases {
        let encoded = registry.encode(Some(&ok()), dialect).unwrap();
        assert_eq!(encoded.hint, hint, "hint for {dialect}");
        assert_eq!(encoded.value, expected_text, "value for {dialect}");
    }
}

/// Test that lists of the type are registered alongside it
#[test]
fn test_sequence_variant() {
    let registry = registry();
    let list = vec![ok(), Response { status_code: 404, message: "Not Found".to_string() }];

    let encoded = registry.encode(Some(&list), Dialect::Postgres).unwrap();
    let decoded: Option<Vec<Response>> = registry.decode(&encoded.value).unwrap();
    assert_eq!(decoded, Some(list));

    let native = ColumnValue::Json(serde_json::json!([{"StatusCode": 200, "Message": "OK"}]));
    let decoded: Option<Vec<Response>> = registry.decode(&native).unwrap();
    assert_eq!(decoded, Some(vec![ok()]));
}

/// Codec that tags its output so the active registration is observable
#[derive(Debug, Clone, Copy)]
struct PrettyCodec;

impl ColumnCodec for PrettyCodec {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        serde_json::to_string_pretty(value)
    }

    fn deserialize_str<T: DeserializeOwned>(&self, text: &str) -> serde_json::Result<T> {
        serde_json::from_str(text)
    }

    fn name(&self) -> &'static str {
        "pretty"
    }
}

/// Test that re-registering a type replaces its adapter
#[test]
fn test_last_registration_wins() {
    let registry = RegistryBuilder::new()
        .register::<Response>()
        .register_with_codec::<Response, PrettyCodec>(PrettyCodec)
        .build();

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.codec_name::<Response>(), Some("pretty"));
    assert_eq!(registry.codec_name::<Vec<Response>>(), Some("pretty"));

    let encoded = registry.encode(Some(&ok()), Dialect::Generic).unwrap();
    let text = encoded.value.as_text().unwrap();
    assert!(text.contains('\n'), "expected pretty output, got {text}");

    let back = RegistryBuilder::new()
        .register_with_codec::<Response, PrettyCodec>(PrettyCodec)
        .register::<Response>()
        .build();
    assert_eq!(back.codec_name::<Response>(), Some("serde_json"));
}

/// Test default values for NULL columns
#[test]
fn test_decode_or_default() {
    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Settings {
        theme: String,
    }

    let registry = RegistryBuilder::new().register::<Settings>().build();
    let settings: Settings = registry.decode_or_default(&ColumnValue::Null).unwrap();
    assert_eq!(settings, Settings::default());

    let settings: Settings = registry
        .decode_or_default(&ColumnValue::from(r#"{"theme":"dark"}"#))
        .unwrap();
    assert_eq!(settings.theme, "dark");
}
