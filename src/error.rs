//! Error types for discovery, decoding and encoding
//!
//! Every error carries the name of the Rust type it concerns so that a failed
//! column read can be traced back to the model field that produced it.

use thiserror::Error;

/// Result alias used by the registry and adapters
pub type JsonColumnResult<T> = Result<T, JsonColumnError>;

/// Candidate types could not be scanned
///
/// Discovery either succeeds for a whole source or fails as a whole; the
/// builder never installs a subset of a failed source.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot enumerate candidate types of '{source_name}': {reason}")]
    Source {
        source_name: String,
        reason: String,
    },

    #[error("type '{type_name}' opts in to JSON columns but has no serde adapter")]
    MissingAdapter { type_name: &'static str },
}

/// Errors surfaced by registry lookups and column conversions
#[derive(Debug, Error)]
pub enum JsonColumnError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("cannot decode JSON column into '{type_name}' (payload: {preview}): {source}")]
    Decode {
        type_name: &'static str,
        preview: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode '{type_name}' as a JSON column: {source}")]
    Encode {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no JSON column adapter registered for '{type_name}'")]
    NotRegistered { type_name: &'static str },
}

impl JsonColumnError {
    /// Name of the Rust type the error concerns, if any
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Discovery(DiscoveryError::MissingAdapter { type_name })
            | Self::Decode { type_name, .. }
            | Self::Encode { type_name, .. }
            | Self::NotRegistered { type_name } => Some(*type_name),
            Self::Discovery(DiscoveryError::Source { .. }) => None,
        }
    }

    /// Whether this is a decode failure
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Bounded excerpt of a payload for error messages
///
/// Cuts on a character boundary and marks the cut with an ellipsis.
pub(crate) fn preview(payload: &str, max_chars: usize) -> String {
    match payload.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", payload.get(..cut).unwrap_or_default()),
        None => payload.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_payloads() {
        assert_eq!(preview(r#"{"a":1}"#, 64), r#"{"a":1}"#);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let payload = "ééééé";
        assert_eq!(preview(payload, 3), "ééé…");
        assert_eq!(preview(payload, 5), payload);
    }

    #[test]
    fn preview_of_zero_chars() {
        assert_eq!(preview("abc", 0), "…");
    }

    #[test]
    fn type_name_is_reported() {
        let err = JsonColumnError::NotRegistered { type_name: "Response" };
        assert_eq!(err.type_name(), Some("Response"));
        assert!(!err.is_decode());
        assert!(err.to_string().contains("Response"));
    }
}
