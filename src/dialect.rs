//! Database dialects and their JSON parameter hints

use crate::column::TypeHint;
use std::fmt;

/// Dialect of the driver receiving a parameter
///
/// | Dialect     | JSON parameter hint    | Typical column |
/// |-------------|------------------------|----------------|
/// | `Postgres`  | `TypeHint::NativeJson` | `jsonb`        |
/// | `Sqlite`    | `TypeHint::Text`       | `TEXT`         |
/// | `SqlServer` | `TypeHint::Text`       | `NVARCHAR(MAX)`|
/// | `Generic`   | none                   | driver default |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    Postgres,
    Sqlite,
    SqlServer,
    /// Unrecognized driver; JSON text is passed through without a hint
    #[default]
    Generic,
}

impl Dialect {
    /// Hint attached to JSON parameters bound for this dialect
    #[must_use]
    pub fn json_hint(self) -> Option<TypeHint> {
        match self {
            Self::Postgres => Some(TypeHint::NativeJson),
            Self::Sqlite | Self::SqlServer => Some(TypeHint::Text),
            Self::Generic => None,
        }
    }

    /// Map a driver or provider name to a dialect
    ///
    /// Matching is case-insensitive. Unknown names map to `Generic`.
    #[must_use]
    pub fn from_driver_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" | "npgsql" | "tokio-postgres" => Self::Postgres,
            "sqlite" | "sqlite3" | "rusqlite" | "libsql" => Self::Sqlite,
            "sqlserver" | "mssql" | "tiberius" => Self::SqlServer,
            _ => Self::Generic,
        }
    }

    /// Detect the dialect from a connection URL scheme
    ///
    /// ```
    /// use json_column::Dialect;
    ///
    /// assert_eq!(Dialect::from_url("postgres://localhost/app"), Dialect::Postgres);
    /// assert_eq!(Dialect::from_url("sqlite::memory:"), Dialect::Sqlite);
    /// assert_eq!(Dialect::from_url("mysql://localhost/app"), Dialect::Generic);
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let scheme = url.split(':').next().unwrap_or_default();
        Self::from_driver_name(scheme)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::SqlServer => "sqlserver",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
