//! Column metadata consumed by the statement builders.

use crate::field::Field;
use crate::ident;
use crate::setting::DbSetting;
use crate::value::DbType;
use serde::{Deserialize, Serialize};

/// Schema information about one persisted column.
///
/// Usually produced by schema introspection; the builders only read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbField {
    /// Column name.
    pub name: String,
    /// Whether this column is (part of) the primary key.
    #[serde(default)]
    pub is_primary: bool,
    /// Whether the database generates this column's value.
    #[serde(default)]
    pub is_identity: bool,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default)]
    pub db_type: Option<DbType>,
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub precision: Option<u8>,
    #[serde(default)]
    pub scale: Option<u8>,
    #[serde(default)]
    pub has_default_value: bool,
}

fn default_nullable() -> bool {
    true
}

impl DbField {
    /// A nullable, non-key column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_primary: false,
            is_identity: false,
            is_nullable: true,
            db_type: None,
            size: None,
            precision: None,
            scale: None,
            has_default_value: false,
        }
    }

    /// A non-nullable primary key column.
    pub fn primary(name: impl Into<String>) -> Self {
        Self::new(name).with_primary(true).with_nullable(false)
    }

    /// A non-nullable, database-generated primary key column.
    pub fn identity(name: impl Into<String>) -> Self {
        Self::primary(name).with_identity(true)
    }

    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    pub fn with_identity(mut self, is_identity: bool) -> Self {
        self.is_identity = is_identity;
        self
    }

    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    pub fn with_db_type(mut self, db_type: DbType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn with_default_value(mut self, has_default_value: bool) -> Self {
        self.has_default_value = has_default_value;
        self
    }

    /// The column as a [`Field`] carrying its declared type.
    pub fn as_field(&self) -> Field {
        let field = Field::unchecked(self.name.clone());
        match self.db_type {
            Some(db_type) => field.with_db_type(db_type),
            None => field,
        }
    }

    /// Whether `name` refers to this column (case-insensitive, quotes ignored).
    pub fn matches(&self, name: &str, setting: &DbSetting) -> bool {
        ident::same_name(&self.name, name, setting)
    }
}

/// The first primary column of a schema.
pub fn find_primary(db_fields: &[DbField]) -> Option<&DbField> {
    db_fields.iter().find(|f| f.is_primary)
}

/// The first identity column of a schema.
pub fn find_identity(db_fields: &[DbField]) -> Option<&DbField> {
    db_fields.iter().find(|f| f.is_identity)
}

/// The column `name` resolves to, if any.
pub fn find_by_name<'a>(db_fields: &'a [DbField], name: &str, setting: &DbSetting) -> Option<&'a DbField> {
    db_fields.iter().find(|f| f.matches(name, setting))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_primary_and_generated() {
        let id = DbField::identity("Id").with_db_type(DbType::Int64);
        assert!(id.is_primary && id.is_identity && !id.is_nullable);
        assert_eq!(id.as_field().db_type(), Some(DbType::Int64));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let setting = DbSetting::sql_server();
        let fields = vec![DbField::identity("Id"), DbField::new("Name")];
        assert_eq!(find_by_name(&fields, "[name]", &setting).map(|f| f.name.as_str()), Some("Name"));
        assert!(find_by_name(&fields, "Age", &setting).is_none());
        assert_eq!(find_primary(&fields).map(|f| f.name.as_str()), Some("Id"));
        assert!(find_identity(&fields[1..]).is_none());
    }

    #[test]
    fn deserialize_defaults() {
        let field: DbField = toml::from_str("name = \"Code\"\nis_primary = true").unwrap();
        assert!(field.is_primary);
        assert!(field.is_nullable);
        assert!(!field.is_identity);
    }
}
