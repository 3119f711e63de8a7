//! Pagination configuration.

use serde::{Deserialize, Serialize};
use sqlmapper_query::Dialect;

/// Settings for the [`PaginationInterceptor`](crate::PaginationInterceptor).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Dialect used to shape COUNT and page queries
    pub dialect: Dialect,
    /// Return an empty page instead of querying past the last page
    pub overflow: bool,
}

impl PaginationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Enable or disable the overflow guard.
    pub fn overflow(mut self, overflow: bool) -> Self {
        self.overflow = overflow;
        self
    }

    /// Read plugin-style string properties.
    ///
    /// Recognised keys are `dialectType` (or `dialect`) and `overflow`. Unknown
    /// dialect names fall back to mysql; `overflow` is on only for `"true"`
    /// (case-insensitive).
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        let mut dialect_type = None;
        let mut dialect = None;
        for (key, value) in properties {
            let value = value.as_ref();
            match key.as_ref() {
                "dialectType" => dialect_type = Some(Dialect::from_name(value)),
                "dialect" => dialect = Some(Dialect::from_name(value)),
                "overflow" => config.overflow = value.trim().eq_ignore_ascii_case("true"),
                other => tracing::trace!(key = other, "Ignoring pagination property"),
            }
        }
        if let Some(d) = dialect_type.or(dialect) {
            config.dialect = d;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = PaginationConfig::default();
        assert_eq!(config.dialect, Dialect::Mysql);
        assert!(!config.overflow);
    }

    #[test]
    fn setters_chain() {
        let config = PaginationConfig::new().dialect(Dialect::Oracle).overflow(true);
        assert_eq!(config.dialect, Dialect::Oracle);
        assert!(config.overflow);
    }

    #[test]
    fn from_properties_prefers_dialect_type() {
        let props = HashMap::from([
            ("dialect", "oracle"),
            ("dialectType", "PostgreSQL"),
            ("overflow", "TRUE"),
        ]);
        let config = PaginationConfig::from_properties(props);
        assert_eq!(config.dialect, Dialect::Postgresql);
        assert!(config.overflow);

        let config = PaginationConfig::from_properties([("dialect", "informix"), ("overflow", "yes")]);
        assert_eq!(config.dialect, Dialect::Mysql);
        assert!(!config.overflow);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: PaginationConfig = serde_json::from_str(r#"{"dialect":"pg"}"#).unwrap();
        assert_eq!(config, PaginationConfig::new().dialect(Dialect::Postgresql));
    }
}
