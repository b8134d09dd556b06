//! Error types for stmtforge

use thiserror::Error;

/// Result type alias for stmtforge operations
pub type StmtResult<T> = Result<T, StmtError>;

/// Error types raised while building predicates or compiling statements.
///
/// Every error is raised before any SQL text is returned; there is no
/// best-effort output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StmtError {
    /// Invalid configuration (key-return policy, key column flags, setting files)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required input (table name, field list, field name) is absent
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// No qualifier could be resolved for an update/merge
    #[error("Missing qualifiers: {0}")]
    MissingQualifiers(String),

    /// Nothing left to write after filtering key columns out
    #[error("Empty field list: {0}")]
    Empty(String),

    /// Field list and schema metadata disagree
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The dialect cannot express the request
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Malformed bag, predicate or operation value
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl StmtError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a missing-input error
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput(message.into())
    }

    /// Create a missing-qualifiers error
    pub fn missing_qualifiers(message: impl Into<String>) -> Self {
        Self::MissingQualifiers(message.into())
    }

    /// Create an empty-result error
    pub fn empty(message: impl Into<String>) -> Self {
        Self::Empty(message.into())
    }

    /// Create a schema-mismatch error
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch(message.into())
    }

    /// Create a not-supported error
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Create an invalid-operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a missing-input error
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput(_))
    }

    /// Check if this is a missing-qualifiers error
    pub fn is_missing_qualifiers(&self) -> bool {
        matches!(self, Self::MissingQualifiers(_))
    }

    /// Check if this is an empty-result error
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// Check if this is a schema-mismatch error
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch(_))
    }

    /// Check if this is a not-supported error
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    /// Check if this is an invalid-operation error
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}

impl From<serde_json::Error> for StmtError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidOperation(err.to_string())
    }
}

impl From<toml::de::Error> for StmtError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_category() {
        let err = StmtError::not_supported("hints");
        assert_eq!(err.to_string(), "Not supported: hints");
        assert!(err.is_not_supported());
        assert!(!err.is_configuration());
    }
}
