//! Dialect settings injected into every statement builder.
//!
//! A [`DbSetting`] is effectively immutable once a builder owns it; builders for
//! different dialects can run concurrently and only share their own setting.

use crate::error::StmtResult;
use serde::{Deserialize, Serialize};

/// Quoting, parameter and capability settings of one SQL dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSetting {
    /// Character(s) opening a quoted identifier, e.g. `[`.
    pub opening_quote: String,
    /// Character(s) closing a quoted identifier, e.g. `]`.
    pub closing_quote: String,
    /// Prefix of every parameter placeholder, e.g. `@`.
    pub parameter_prefix: String,
    /// Separator between schema and table segments.
    pub schema_separator: String,
    /// Whether table hints (`WITH (NOLOCK)`) can be emitted.
    pub are_table_hints_supported: bool,
    /// Whether one command text may hold several statements.
    pub is_multi_statement_executable: bool,
    /// Type that AVG arguments are converted to before averaging.
    pub averageable_type: Option<String>,
}

impl DbSetting {
    /// SQL Server defaults.
    pub fn sql_server() -> Self {
        Self {
            opening_quote: "[".to_string(),
            closing_quote: "]".to_string(),
            parameter_prefix: "@".to_string(),
            schema_separator: ".".to_string(),
            are_table_hints_supported: true,
            is_multi_statement_executable: true,
            averageable_type: Some("FLOAT".to_string()),
        }
    }

    /// PostgreSQL defaults.
    pub fn postgresql() -> Self {
        Self {
            opening_quote: "\"".to_string(),
            closing_quote: "\"".to_string(),
            parameter_prefix: "@".to_string(),
            schema_separator: ".".to_string(),
            are_table_hints_supported: false,
            is_multi_statement_executable: true,
            averageable_type: Some("DOUBLE PRECISION".to_string()),
        }
    }

    /// MySQL defaults.
    pub fn mysql() -> Self {
        Self {
            opening_quote: "`".to_string(),
            closing_quote: "`".to_string(),
            parameter_prefix: "@".to_string(),
            schema_separator: ".".to_string(),
            are_table_hints_supported: false,
            is_multi_statement_executable: true,
            averageable_type: Some("DOUBLE".to_string()),
        }
    }

    /// SQLite defaults.
    pub fn sqlite() -> Self {
        Self {
            opening_quote: "[".to_string(),
            closing_quote: "]".to_string(),
            parameter_prefix: "@".to_string(),
            schema_separator: ".".to_string(),
            are_table_hints_supported: false,
            is_multi_statement_executable: true,
            averageable_type: Some("REAL".to_string()),
        }
    }

    /// Apply overrides from a TOML document on top of this setting.
    ///
    /// Keys missing from the document keep their current value.
    ///
    /// ```ignore
    /// let setting = DbSetting::sql_server().with_toml_overrides(
    ///     "is_multi_statement_executable = false",
    /// )?;
    /// ```
    pub fn with_toml_overrides(self, toml_str: &str) -> StmtResult<Self> {
        let overrides: DbSettingOverrides = toml::from_str(toml_str)?;
        Ok(overrides.apply(self))
    }
}

impl Default for DbSetting {
    fn default() -> Self {
        Self::sql_server()
    }
}

/// Partial [`DbSetting`] used for file-based overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbSettingOverrides {
    pub opening_quote: Option<String>,
    pub closing_quote: Option<String>,
    pub parameter_prefix: Option<String>,
    pub schema_separator: Option<String>,
    pub are_table_hints_supported: Option<bool>,
    pub is_multi_statement_executable: Option<bool>,
    pub averageable_type: Option<String>,
}

impl DbSettingOverrides {
    /// Merge into `base`, overriding only the keys that were given.
    pub fn apply(self, mut base: DbSetting) -> DbSetting {
        if let Some(v) = self.opening_quote {
            base.opening_quote = v;
        }
        if let Some(v) = self.closing_quote {
            base.closing_quote = v;
        }
        if let Some(v) = self.parameter_prefix {
            base.parameter_prefix = v;
        }
        if let Some(v) = self.schema_separator {
            base.schema_separator = v;
        }
        if let Some(v) = self.are_table_hints_supported {
            base.are_table_hints_supported = v;
        }
        if let Some(v) = self.is_multi_statement_executable {
            base.is_multi_statement_executable = v;
        }
        if let Some(v) = self.averageable_type {
            base.averageable_type = Some(v);
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_keep_unlisted_keys() {
        let setting = DbSetting::sql_server()
            .with_toml_overrides("is_multi_statement_executable = false\nparameter_prefix = \":\"")
            .unwrap();
        assert!(!setting.is_multi_statement_executable);
        assert_eq!(setting.parameter_prefix, ":");
        assert_eq!(setting.opening_quote, "[");
        assert!(setting.are_table_hints_supported);
    }

    #[test]
    fn toml_overrides_reject_unknown_keys() {
        let err = DbSetting::sqlite()
            .with_toml_overrides("quote = \"x\"")
            .unwrap_err();
        assert!(err.is_configuration());
        let err = DbSetting::sql_server()
            .with_toml_overrides("default_schema = \"dbo\"")
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
